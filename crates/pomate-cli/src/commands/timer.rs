use std::io::Write;

use clap::{Subcommand, ValueEnum};
use pomate_core::timer::Tick;
use pomate_core::{Config, Event, Notification, Notifier, TimerEngine, TokioScheduler};
use tokio::sync::mpsc::UnboundedReceiver;

use crate::context::{open_settings, print_json};

#[derive(Subcommand)]
pub enum TimerAction {
    /// Run a live countdown, printing one JSON event per line. Ctrl-C pauses and exits.
    Run {
        /// Which countdown to start with
        #[arg(long, value_enum, default_value_t = StartWith::Work)]
        start: StartWith,
        /// Stop after this many completed work sessions
        #[arg(long)]
        cycles: Option<u32>,
        /// Suppress per-second tick events
        #[arg(long)]
        quiet: bool,
    },
    /// Print the idle timer state built from stored settings
    Status,
}

#[derive(Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum StartWith {
    Work,
    Short,
    Long,
}

/// Rings the terminal bell and prints the notification to stderr.
struct TerminalNotifier;

impl Notifier for TerminalNotifier {
    fn notify(&self, notification: &Notification) {
        let mut stderr = std::io::stderr().lock();
        let _ = writeln!(stderr, "\x07{} {}", notification.title, notification.body);
    }
}

pub fn run(action: TimerAction, config: &Config) -> Result<(), Box<dyn std::error::Error>> {
    match action {
        TimerAction::Run {
            start,
            cycles,
            quiet,
        } => {
            let runtime = tokio::runtime::Builder::new_current_thread()
                .enable_all()
                .build()?;
            let settings = open_settings(config)?;
            let (scheduler, ticks) = TokioScheduler::channel();
            let engine = TimerEngine::new(settings, scheduler, TerminalNotifier);
            runtime.block_on(run_live(engine, ticks, start, cycles, quiet))
        }
        TimerAction::Status => {
            let settings = open_settings(config)?;
            let (scheduler, _ticks) = TokioScheduler::channel();
            let engine = TimerEngine::new(settings, scheduler, TerminalNotifier);
            print_json(&engine.snapshot())
        }
    }
}

async fn run_live(
    mut engine: TimerEngine,
    mut ticks: UnboundedReceiver<Tick>,
    start: StartWith,
    cycles: Option<u32>,
    quiet: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    let started = match start {
        StartWith::Work => engine.start_work_session(),
        StartWith::Short => engine.start_short_break(),
        StartWith::Long => engine.start_long_break(),
    };
    emit(&started, quiet)?;

    let ctrl_c = tokio::signal::ctrl_c();
    tokio::pin!(ctrl_c);

    loop {
        tokio::select! {
            tick = ticks.recv() => {
                let Some(tick) = tick else { break };
                for event in engine.handle_tick(tick) {
                    emit(&event, quiet)?;
                }
                if cycles.is_some_and(|n| engine.sessions_completed() >= n) {
                    emit(&engine.pause(), quiet)?;
                    break;
                }
            }
            _ = &mut ctrl_c => {
                tracing::info!("interrupted, pausing timer");
                emit(&engine.pause(), quiet)?;
                break;
            }
        }
    }
    tracing::debug!(
        sessions_completed = engine.sessions_completed(),
        "timer loop stopped"
    );
    Ok(())
}

fn emit(event: &Event, quiet: bool) -> Result<(), Box<dyn std::error::Error>> {
    if quiet && matches!(event, Event::Tick { .. }) {
        return Ok(());
    }
    println!("{}", serde_json::to_string(event)?);
    Ok(())
}
