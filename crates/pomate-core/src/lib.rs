//! # Pomate Core Library
//!
//! This library provides the core logic for the Pomate Pomodoro timer: the
//! work/break state machine, its one-second clock, and the durable session
//! history and task list it writes into. Front-ends (the bundled CLI, a
//! menu-bar app) issue commands and render the events the engine returns.
//!
//! ## Architecture
//!
//! - **Timer Engine**: A countdown state machine fed by an injectable tick
//!   scheduler, so it can be driven by tokio in production and by hand in tests
//! - **Settings Store**: Durations, sound preference, session history and
//!   tasks, persisted on every mutation through a key-value store
//! - **Storage**: SQLite key-value store and TOML-based configuration
//! - **Stats**: Today / all-time / weekly focus summaries over the history
//!
//! ## Key Components
//!
//! - [`TimerEngine`]: Core timer state machine
//! - [`SettingsStore`]: Persisted user settings, history and tasks
//! - [`Database`]: SQLite-backed [`KeyValueStore`]
//! - [`Config`]: Application configuration management

pub mod error;
pub mod events;
pub mod settings;
pub mod stats;
pub mod storage;
pub mod timer;

pub use error::{ConfigError, CoreError, StoreError};
pub use events::Event;
pub use settings::{SessionKind, SessionRecord, SettingsEvent, SettingsStore, Task};
pub use stats::{DailyFocus, Summary};
pub use storage::{Config, Database, KeyValueStore, MemoryStore};
pub use timer::{
    format_time, LogNotifier, ManualScheduler, Notification, Notifier, Scheduler, TimerEngine,
    TimerState, TokioScheduler,
};
