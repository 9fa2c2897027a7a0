use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Which kind of countdown a session was.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum SessionKind {
    Work,
    ShortBreak,
    LongBreak,
}

impl SessionKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            SessionKind::Work => "work",
            SessionKind::ShortBreak => "shortBreak",
            SessionKind::LongBreak => "longBreak",
        }
    }
}

/// One finished countdown in the history log. Never mutated once appended.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionRecord {
    pub id: Uuid,
    /// Completion timestamp.
    pub date: DateTime<Utc>,
    /// Seconds actually elapsed, not the nominal duration.
    #[serde(rename = "duration")]
    pub duration_spent: u32,
    #[serde(rename = "type")]
    pub kind: SessionKind,
    pub completed: bool,
}

impl SessionRecord {
    pub fn new(kind: SessionKind, duration_spent: u32, completed: bool) -> Self {
        Self {
            id: Uuid::new_v4(),
            date: Utc::now(),
            duration_spent,
            kind,
            completed,
        }
    }
}
