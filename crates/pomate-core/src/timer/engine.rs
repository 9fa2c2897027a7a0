//! Timer engine implementation.
//!
//! The engine is a countdown state machine driven by one-second ticks from
//! an injected [`Scheduler`]. It owns the runtime state only; durations are
//! read from the [`SettingsStore`] at transition time and finished sessions
//! are written back to it.
//!
//! ## State Transitions
//!
//! ```text
//! any ──start_*──> WorkSession | ShortBreak | LongBreak
//! any ──reset────> Idle
//! WorkSession ──0──> ShortBreak | LongBreak (every Nth)
//! ShortBreak | LongBreak ──0──> WorkSession
//! ```
//!
//! ## Usage
//!
//! ```ignore
//! let (scheduler, mut ticks) = TokioScheduler::channel();
//! let mut engine = TimerEngine::new(settings, scheduler, LogNotifier);
//! engine.start_work_session();
//! while let Some(tick) = ticks.recv().await {
//!     for event in engine.handle_tick(tick) { /* render */ }
//! }
//! ```
//!
//! All calls must come from one thread of control at a time.

use std::ops::{Deref, DerefMut};
use std::time::Duration;

use chrono::Utc;
use serde::{Deserialize, Serialize};

use super::clock::{Scheduler, Tick, TickHandle};
use super::notify::{Notification, Notifier};
use crate::events::Event;
use crate::settings::{SessionKind, SessionRecord, SettingsEvent, SettingsStore, Subscription};

const TICK_INTERVAL: Duration = Duration::from_secs(1);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum TimerState {
    Idle,
    WorkSession,
    ShortBreak,
    LongBreak,
}

impl TimerState {
    /// The session kind this state counts down, `None` for Idle.
    pub fn session_kind(&self) -> Option<SessionKind> {
        match self {
            TimerState::Idle => None,
            TimerState::WorkSession => Some(SessionKind::Work),
            TimerState::ShortBreak => Some(SessionKind::ShortBreak),
            TimerState::LongBreak => Some(SessionKind::LongBreak),
        }
    }

    fn for_kind(kind: SessionKind) -> Self {
        match kind {
            SessionKind::Work => TimerState::WorkSession,
            SessionKind::ShortBreak => TimerState::ShortBreak,
            SessionKind::LongBreak => TimerState::LongBreak,
        }
    }
}

struct ActiveSource {
    tick: Tick,
    handle: TickHandle,
}

/// Core timer engine.
pub struct TimerEngine {
    settings: SettingsStore,
    settings_events: Subscription,
    scheduler: Box<dyn Scheduler>,
    notifier: Box<dyn Notifier>,
    state: TimerState,
    remaining: u32,
    /// Length the current countdown started from; elapsed = initial - remaining.
    initial_duration: u32,
    /// In-memory only; restarts at zero with the process.
    sessions_completed: u32,
    source: Option<ActiveSource>,
    next_source: u64,
}

impl std::fmt::Debug for TimerEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TimerEngine")
            .field("state", &self.state)
            .field("remaining", &self.remaining)
            .field("initial_duration", &self.initial_duration)
            .field("sessions_completed", &self.sessions_completed)
            .field("running", &self.is_running())
            .finish_non_exhaustive()
    }
}

impl TimerEngine {
    /// Create an idle engine showing the configured work duration.
    pub fn new(
        mut settings: SettingsStore,
        scheduler: impl Scheduler + 'static,
        notifier: impl Notifier + 'static,
    ) -> Self {
        let settings_events = settings.subscribe();
        let remaining = settings.work_duration();
        Self {
            settings,
            settings_events,
            scheduler: Box::new(scheduler),
            notifier: Box::new(notifier),
            state: TimerState::Idle,
            remaining,
            initial_duration: remaining,
            sessions_completed: 0,
            source: None,
            next_source: 0,
        }
    }

    // ── Queries ──────────────────────────────────────────────────────

    pub fn state(&self) -> TimerState {
        self.state
    }

    pub fn remaining(&self) -> u32 {
        self.remaining
    }

    pub fn initial_duration(&self) -> u32 {
        self.initial_duration
    }

    pub fn sessions_completed(&self) -> u32 {
        self.sessions_completed
    }

    /// Whether a tick source is currently active.
    pub fn is_running(&self) -> bool {
        self.source.is_some()
    }

    /// Remaining time as `MM:SS`.
    pub fn format_time(&self) -> String {
        super::format_time(self.remaining)
    }

    pub fn settings(&self) -> &SettingsStore {
        &self.settings
    }

    /// Mutable access to the settings. The engine picks up the changes when
    /// the guard is dropped.
    pub fn settings_mut(&mut self) -> SettingsMut<'_> {
        SettingsMut { engine: self }
    }

    /// Build a full state snapshot event.
    pub fn snapshot(&self) -> Event {
        Event::StateSnapshot {
            state: self.state,
            remaining_secs: self.remaining,
            formatted: self.format_time(),
            sessions_completed: self.sessions_completed,
            running: self.is_running(),
            at: Utc::now(),
        }
    }

    // ── Commands ─────────────────────────────────────────────────────

    pub fn start_work_session(&mut self) -> Event {
        self.sync_settings();
        self.begin(SessionKind::Work)
    }

    pub fn start_short_break(&mut self) -> Event {
        self.sync_settings();
        self.begin(SessionKind::ShortBreak)
    }

    pub fn start_long_break(&mut self) -> Event {
        self.sync_settings();
        self.begin(SessionKind::LongBreak)
    }

    /// Stop the clock. State and remaining time are kept.
    pub fn pause(&mut self) -> Event {
        self.sync_settings();
        self.stop_clock();
        tracing::debug!(state = ?self.state, remaining = self.remaining, "paused");
        Event::TimerPaused {
            state: self.state,
            remaining_secs: self.remaining,
            at: Utc::now(),
        }
    }

    /// Restart the clock for a paused countdown. Returns `None` when idle or
    /// already running.
    pub fn resume(&mut self) -> Option<Event> {
        self.sync_settings();
        if self.state == TimerState::Idle || self.is_running() {
            return None;
        }
        self.start_clock();
        tracing::debug!(state = ?self.state, remaining = self.remaining, "resumed");
        Some(Event::TimerResumed {
            state: self.state,
            remaining_secs: self.remaining,
            at: Utc::now(),
        })
    }

    pub fn reset(&mut self) -> Event {
        self.sync_settings();
        self.stop_clock();
        self.state = TimerState::Idle;
        self.remaining = self.settings.work_duration();
        self.initial_duration = self.remaining;
        self.sessions_completed = 0;
        tracing::debug!("reset");
        Event::TimerReset {
            remaining_secs: self.remaining,
            at: Utc::now(),
        }
    }

    /// Advance the countdown by one tick.
    ///
    /// Ticks from a source that has since been stopped are ignored. A tick
    /// that finds the countdown at zero completes the session and starts the
    /// next one.
    pub fn handle_tick(&mut self, tick: Tick) -> Vec<Event> {
        self.sync_settings();
        match &self.source {
            Some(active) if active.tick == tick => {}
            _ => {
                tracing::trace!(source = tick.source(), "dropping stale tick");
                return Vec::new();
            }
        }

        if self.remaining > 0 {
            self.remaining -= 1;
            return vec![Event::Tick {
                state: self.state,
                remaining_secs: self.remaining,
            }];
        }

        self.stop_clock();
        let events = self.complete_session();
        self.sync_settings();
        events
    }

    // ── Internal ─────────────────────────────────────────────────────

    fn begin(&mut self, kind: SessionKind) -> Event {
        let duration = self.settings.duration(kind);
        self.state = TimerState::for_kind(kind);
        self.remaining = duration;
        self.initial_duration = duration;
        self.start_clock();
        tracing::debug!(state = ?self.state, duration, "session started");
        Event::SessionStarted {
            state: self.state,
            duration_secs: duration,
            at: Utc::now(),
        }
    }

    fn complete_session(&mut self) -> Vec<Event> {
        let Some(kind) = self.state.session_kind() else {
            return Vec::new();
        };

        let (record, next) = match kind {
            SessionKind::Work => {
                self.sessions_completed += 1;
                let record = self.record_session(kind);
                if let Some(task_id) = self.settings.current_task().map(|t| t.id) {
                    self.settings.increment_task_sessions(task_id);
                }
                if self.settings.play_sound() {
                    self.notifier.notify(&Notification::work_done());
                }
                let cadence = self.settings.sessions_before_long_break();
                if self.sessions_completed % cadence == 0 {
                    (record, SessionKind::LongBreak)
                } else {
                    (record, SessionKind::ShortBreak)
                }
            }
            SessionKind::ShortBreak | SessionKind::LongBreak => {
                let record = self.record_session(kind);
                if self.settings.play_sound() {
                    self.notifier.notify(&Notification::break_done());
                }
                (record, SessionKind::Work)
            }
        };

        tracing::info!(
            kind = kind.as_str(),
            duration = record.duration_spent,
            sessions_completed = self.sessions_completed,
            "session completed"
        );

        let completed = Event::SessionCompleted {
            record,
            sessions_completed: self.sessions_completed,
            next_state: TimerState::for_kind(next),
        };
        let started = self.begin(next);
        vec![completed, started]
    }

    fn record_session(&mut self, kind: SessionKind) -> SessionRecord {
        let spent = self.initial_duration.saturating_sub(self.remaining);
        let record = SessionRecord::new(kind, spent, true);
        self.settings.append_session_record(record.clone());
        record
    }

    fn start_clock(&mut self) {
        self.stop_clock();
        self.next_source += 1;
        let tick = Tick::new(self.next_source);
        let handle = self.scheduler.start(TICK_INTERVAL, tick);
        self.source = Some(ActiveSource { tick, handle });
    }

    fn stop_clock(&mut self) {
        if let Some(active) = self.source.take() {
            active.handle.cancel();
        }
    }

    /// Apply queued settings changes. Only the work duration matters, and
    /// only while idle; everything else, including the engine's own history
    /// and task writes, is discarded.
    fn sync_settings(&mut self) {
        for event in self.settings_events.drain() {
            if let SettingsEvent::WorkDurationChanged(secs) = event {
                if self.state == TimerState::Idle {
                    self.remaining = secs;
                    self.initial_duration = secs;
                }
            }
        }
    }
}

impl Drop for TimerEngine {
    fn drop(&mut self) {
        self.stop_clock();
    }
}

/// Write access to the engine's settings; syncs the engine on drop.
pub struct SettingsMut<'a> {
    engine: &'a mut TimerEngine,
}

impl Deref for SettingsMut<'_> {
    type Target = SettingsStore;

    fn deref(&self) -> &SettingsStore {
        &self.engine.settings
    }
}

impl DerefMut for SettingsMut<'_> {
    fn deref_mut(&mut self) -> &mut SettingsStore {
        &mut self.engine.settings
    }
}

impl Drop for SettingsMut<'_> {
    fn drop(&mut self) {
        self.engine.sync_settings();
    }
}
