use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A to-do item that completed work sessions can be credited to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Task {
    pub id: Uuid,
    pub name: String,
    #[serde(default)]
    pub is_completed: bool,
    pub created_at: DateTime<Utc>,
    /// Set and cleared together with `is_completed`.
    #[serde(default)]
    pub completed_at: Option<DateTime<Utc>>,
    #[serde(default, rename = "associatedSessions")]
    pub associated_session_count: u32,
}

impl Task {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            name: name.into(),
            is_completed: false,
            created_at: Utc::now(),
            completed_at: None,
            associated_session_count: 0,
        }
    }

    pub(crate) fn toggle_completion(&mut self) {
        self.is_completed = !self.is_completed;
        self.completed_at = if self.is_completed {
            Some(Utc::now())
        } else {
            None
        };
    }
}
