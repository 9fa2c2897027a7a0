use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::settings::SessionRecord;
use crate::timer::TimerState;

/// Every state change in the timer produces an Event.
/// Front-ends render them; the CLI prints them as JSON lines.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Event {
    SessionStarted {
        state: TimerState,
        duration_secs: u32,
        at: DateTime<Utc>,
    },
    TimerPaused {
        state: TimerState,
        remaining_secs: u32,
        at: DateTime<Utc>,
    },
    TimerResumed {
        state: TimerState,
        remaining_secs: u32,
        at: DateTime<Utc>,
    },
    TimerReset {
        remaining_secs: u32,
        at: DateTime<Utc>,
    },
    /// One second elapsed on the running countdown.
    Tick {
        state: TimerState,
        remaining_secs: u32,
    },
    /// A countdown reached zero and was logged.
    SessionCompleted {
        record: SessionRecord,
        sessions_completed: u32,
        next_state: TimerState,
    },
    StateSnapshot {
        state: TimerState,
        remaining_secs: u32,
        formatted: String,
        sessions_completed: u32,
        running: bool,
        at: DateTime<Utc>,
    },
}
