use clap::{Parser, Subcommand};
use pomate_core::Config;
use tracing_subscriber::EnvFilter;

mod commands;
mod context;

#[derive(Parser)]
#[command(name = "pomate-cli", version, about = "Pomate CLI")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Timer control
    Timer {
        #[command(subcommand)]
        action: commands::timer::TimerAction,
    },
    /// Task management
    Task {
        #[command(subcommand)]
        action: commands::task::TaskAction,
    },
    /// Configuration and settings management
    Config {
        #[command(subcommand)]
        action: commands::config::ConfigAction,
    },
    /// Focus statistics
    Stats {
        #[command(subcommand)]
        action: commands::stats::StatsAction,
    },
    /// Print the session history as JSON
    History {
        /// Only show the most recent N records
        #[arg(long)]
        limit: Option<usize>,
    },
}

fn init_tracing(config: &Config) {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&config.log_filter))
        .unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn main() {
    let cli = Cli::parse();
    let (config, load_error) = match Config::load() {
        Ok(config) => (config, None),
        Err(e) => (Config::default(), Some(e)),
    };
    init_tracing(&config);
    if let Some(e) = load_error {
        tracing::warn!(error = %e, "falling back to default configuration");
    }

    let result = match cli.command {
        Commands::Timer { action } => commands::timer::run(action, &config),
        Commands::Task { action } => commands::task::run(action, &config),
        Commands::Config { action } => commands::config::run(action, config),
        Commands::Stats { action } => commands::stats::run(action, &config),
        Commands::History { limit } => commands::history::run(limit, &config),
    };

    if let Err(e) = result {
        eprintln!("error: {e}");
        std::process::exit(1);
    }
}
