mod clock;
mod engine;
mod notify;

pub use clock::{ManualScheduler, Scheduler, Tick, TickHandle, TokioScheduler};
pub use engine::{SettingsMut, TimerEngine, TimerState};
pub use notify::{LogNotifier, Notification, NotificationCategory, Notifier, RecordingNotifier};

/// Format seconds as zero-padded `MM:SS`. Minutes are not capped at 59.
pub fn format_time(secs: u32) -> String {
    format!("{:02}:{:02}", secs / 60, secs % 60)
}
