//! User settings, session history and task list.
//!
//! [`SettingsStore`] is the single writer of persisted state. Every mutation
//! updates memory first, then writes the affected key through the
//! [`KeyValueStore`], then notifies subscribers. Write failures are logged
//! and swallowed: memory stays authoritative for the running process and the
//! previously stored bytes are left alone.

mod session;
mod subscription;
mod task;

pub use session::{SessionKind, SessionRecord};
pub use subscription::{SettingsEvent, Subscription, SubscriptionId};
pub use task::Task;

use serde::de::DeserializeOwned;
use serde::Serialize;
use uuid::Uuid;

use crate::storage::{DefaultsConfig, KeyValueStore, MemoryStore};
use subscription::Subscribers;

/// Keys under which each setting is persisted.
pub mod keys {
    pub const WORK_DURATION: &str = "workDuration";
    pub const SHORT_BREAK_DURATION: &str = "shortBreakDuration";
    pub const LONG_BREAK_DURATION: &str = "longBreakDuration";
    pub const SESSIONS_BEFORE_LONG_BREAK: &str = "sessionsBeforeLongBreak";
    pub const PLAY_SOUND: &str = "playSound";
    pub const SESSION_HISTORY: &str = "sessionHistory";
    pub const TASKS: &str = "tasks";
    pub const CURRENT_TASK_ID: &str = "currentTaskId";
}

pub struct SettingsStore {
    store: Box<dyn KeyValueStore>,
    work_duration: u32,
    short_break_duration: u32,
    long_break_duration: u32,
    sessions_before_long_break: u32,
    play_sound: bool,
    history: Vec<SessionRecord>,
    tasks: Vec<Task>,
    current_task_id: Option<Uuid>,
    subscribers: Subscribers,
}

impl std::fmt::Debug for SettingsStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SettingsStore")
            .field("work_duration", &self.work_duration)
            .field("short_break_duration", &self.short_break_duration)
            .field("long_break_duration", &self.long_break_duration)
            .field("sessions_before_long_break", &self.sessions_before_long_break)
            .field("play_sound", &self.play_sound)
            .field("history", &self.history.len())
            .field("tasks", &self.tasks.len())
            .field("current_task_id", &self.current_task_id)
            .finish()
    }
}

impl SettingsStore {
    /// Load every key from `store`, falling back to `defaults` for missing or
    /// unreadable scalars and to empty lists for unreadable collections.
    pub fn load(store: impl KeyValueStore + 'static, defaults: &DefaultsConfig) -> Self {
        let store: Box<dyn KeyValueStore> = Box::new(store);

        let work_duration = at_least_one(
            keys::WORK_DURATION,
            load_or(&*store, keys::WORK_DURATION, defaults.work_duration),
        );
        let short_break_duration = at_least_one(
            keys::SHORT_BREAK_DURATION,
            load_or(&*store, keys::SHORT_BREAK_DURATION, defaults.short_break_duration),
        );
        let long_break_duration = at_least_one(
            keys::LONG_BREAK_DURATION,
            load_or(&*store, keys::LONG_BREAK_DURATION, defaults.long_break_duration),
        );
        let sessions_before_long_break = at_least_one(
            keys::SESSIONS_BEFORE_LONG_BREAK,
            load_or(
                &*store,
                keys::SESSIONS_BEFORE_LONG_BREAK,
                defaults.sessions_before_long_break,
            ),
        );
        let play_sound = load_or(&*store, keys::PLAY_SOUND, defaults.play_sound);
        let history: Vec<SessionRecord> = load_or(&*store, keys::SESSION_HISTORY, Vec::new());
        let tasks: Vec<Task> = load_or(&*store, keys::TASKS, Vec::new());
        let current_task_id: Option<Uuid> = load_or(&*store, keys::CURRENT_TASK_ID, None);

        tracing::info!(
            records = history.len(),
            tasks = tasks.len(),
            "loaded settings"
        );

        Self {
            store,
            work_duration,
            short_break_duration,
            long_break_duration,
            sessions_before_long_break,
            play_sound,
            history,
            tasks,
            current_task_id,
            subscribers: Subscribers::default(),
        }
    }

    /// A fresh store backed by memory only, with built-in defaults.
    pub fn in_memory() -> Self {
        Self::load(MemoryStore::new(), &DefaultsConfig::default())
    }

    // ── Subscriptions ────────────────────────────────────────────────

    pub fn subscribe(&mut self) -> Subscription {
        self.subscribers.subscribe()
    }

    /// Returns false if `id` was not subscribed.
    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        self.subscribers.unsubscribe(id)
    }

    // ── Durations ────────────────────────────────────────────────────

    pub fn duration(&self, kind: SessionKind) -> u32 {
        match kind {
            SessionKind::Work => self.work_duration,
            SessionKind::ShortBreak => self.short_break_duration,
            SessionKind::LongBreak => self.long_break_duration,
        }
    }

    /// Set the nominal length of `kind` in seconds. Zero is clamped to one.
    pub fn set_duration(&mut self, kind: SessionKind, secs: u32) {
        let key = match kind {
            SessionKind::Work => keys::WORK_DURATION,
            SessionKind::ShortBreak => keys::SHORT_BREAK_DURATION,
            SessionKind::LongBreak => keys::LONG_BREAK_DURATION,
        };
        let secs = at_least_one(key, secs);
        let event = match kind {
            SessionKind::Work => {
                self.work_duration = secs;
                SettingsEvent::WorkDurationChanged(secs)
            }
            SessionKind::ShortBreak => {
                self.short_break_duration = secs;
                SettingsEvent::ShortBreakDurationChanged(secs)
            }
            SessionKind::LongBreak => {
                self.long_break_duration = secs;
                SettingsEvent::LongBreakDurationChanged(secs)
            }
        };
        self.persist(key, &secs);
        self.subscribers.emit(event);
    }

    pub fn work_duration(&self) -> u32 {
        self.work_duration
    }

    pub fn set_work_duration(&mut self, secs: u32) {
        self.set_duration(SessionKind::Work, secs);
    }

    pub fn short_break_duration(&self) -> u32 {
        self.short_break_duration
    }

    pub fn set_short_break_duration(&mut self, secs: u32) {
        self.set_duration(SessionKind::ShortBreak, secs);
    }

    pub fn long_break_duration(&self) -> u32 {
        self.long_break_duration
    }

    pub fn set_long_break_duration(&mut self, secs: u32) {
        self.set_duration(SessionKind::LongBreak, secs);
    }

    pub fn sessions_before_long_break(&self) -> u32 {
        self.sessions_before_long_break
    }

    /// Zero is clamped to one.
    pub fn set_sessions_before_long_break(&mut self, count: u32) {
        let count = at_least_one(keys::SESSIONS_BEFORE_LONG_BREAK, count);
        self.sessions_before_long_break = count;
        self.persist(keys::SESSIONS_BEFORE_LONG_BREAK, &count);
        self.subscribers
            .emit(SettingsEvent::SessionsBeforeLongBreakChanged(count));
    }

    pub fn play_sound(&self) -> bool {
        self.play_sound
    }

    pub fn set_play_sound(&mut self, play: bool) {
        self.play_sound = play;
        self.persist(keys::PLAY_SOUND, &play);
        self.subscribers.emit(SettingsEvent::PlaySoundChanged(play));
    }

    // ── History ──────────────────────────────────────────────────────

    /// Session log in insertion order.
    pub fn history(&self) -> &[SessionRecord] {
        &self.history
    }

    pub fn append_session_record(&mut self, record: SessionRecord) {
        self.history.push(record.clone());
        self.persist_history();
        self.subscribers.emit(SettingsEvent::SessionRecorded(record));
    }

    // ── Tasks ────────────────────────────────────────────────────────

    pub fn tasks(&self) -> &[Task] {
        &self.tasks
    }

    pub fn task(&self, id: Uuid) -> Option<&Task> {
        self.tasks.iter().find(|t| t.id == id)
    }

    /// Create a task named `name` (trimmed). Blank names are ignored.
    pub fn add_task(&mut self, name: &str) -> Option<Uuid> {
        let name = name.trim();
        if name.is_empty() {
            tracing::debug!("ignoring task with blank name");
            return None;
        }
        let task = Task::new(name);
        let id = task.id;
        self.tasks.push(task);
        self.tasks_changed();
        Some(id)
    }

    pub fn toggle_task_completion(&mut self, id: Uuid) {
        let Some(task) = self.tasks.iter_mut().find(|t| t.id == id) else {
            return;
        };
        task.toggle_completion();
        self.tasks_changed();
    }

    /// Remove a task, clearing the current-task reference if it pointed here.
    pub fn delete_task(&mut self, id: Uuid) {
        let before = self.tasks.len();
        self.tasks.retain(|t| t.id != id);
        if self.tasks.len() == before {
            return;
        }
        self.tasks_changed();
        if self.current_task_id == Some(id) {
            self.set_current_task_id(None);
        }
    }

    pub fn increment_task_sessions(&mut self, id: Uuid) {
        let Some(task) = self.tasks.iter_mut().find(|t| t.id == id) else {
            return;
        };
        task.associated_session_count += 1;
        self.tasks_changed();
    }

    pub fn current_task_id(&self) -> Option<Uuid> {
        self.current_task_id
    }

    /// The task referenced as current, if it still exists.
    pub fn current_task(&self) -> Option<&Task> {
        self.task(self.current_task_id?)
    }

    /// Point the current-task reference at `id`. Unknown ids are ignored;
    /// `None` clears the reference.
    pub fn set_current_task(&mut self, id: Option<Uuid>) {
        if let Some(id) = id {
            if self.task(id).is_none() {
                return;
            }
        }
        self.set_current_task_id(id);
    }

    // ── Internal ─────────────────────────────────────────────────────

    fn set_current_task_id(&mut self, id: Option<Uuid>) {
        self.current_task_id = id;
        self.persist(keys::CURRENT_TASK_ID, &id);
        self.subscribers.emit(SettingsEvent::CurrentTaskChanged(id));
    }

    fn tasks_changed(&mut self) {
        let bytes = serde_json::to_vec(&self.tasks);
        self.write(keys::TASKS, bytes);
        self.subscribers.emit(SettingsEvent::TasksChanged);
    }

    fn persist_history(&mut self) {
        let bytes = serde_json::to_vec(&self.history);
        self.write(keys::SESSION_HISTORY, bytes);
    }

    fn persist<T: Serialize + ?Sized>(&mut self, key: &str, value: &T) {
        let bytes = serde_json::to_vec(value);
        self.write(key, bytes);
    }

    /// Bytes are only handed to the store once fully serialized.
    fn write(&mut self, key: &str, bytes: serde_json::Result<Vec<u8>>) {
        let bytes = match bytes {
            Ok(b) => b,
            Err(e) => {
                tracing::warn!(key, error = %e, "failed to serialize setting; keeping in-memory value");
                return;
            }
        };
        if let Err(e) = self.store.save(key, &bytes) {
            tracing::warn!(key, error = %e, "failed to persist setting; keeping in-memory value");
        }
    }
}

fn load_or<T: DeserializeOwned>(store: &dyn KeyValueStore, key: &str, default: T) -> T {
    let bytes = match store.load(key) {
        Ok(Some(bytes)) => bytes,
        Ok(None) => return default,
        Err(e) => {
            tracing::warn!(key, error = %e, "failed to read setting; using default");
            return default;
        }
    };
    match serde_json::from_slice(&bytes) {
        Ok(value) => value,
        Err(e) => {
            tracing::warn!(key, error = %e, "stored setting is corrupt; using default");
            default
        }
    }
}

fn at_least_one(key: &str, value: u32) -> u32 {
    if value == 0 {
        tracing::warn!(key, "setting must be at least 1; clamping");
        1
    } else {
        value
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn store_with(mem: &MemoryStore) -> SettingsStore {
        SettingsStore::load(mem.clone(), &DefaultsConfig::default())
    }

    #[test]
    fn defaults_when_store_is_empty() {
        let settings = SettingsStore::in_memory();
        assert_eq!(settings.work_duration(), 1500);
        assert_eq!(settings.short_break_duration(), 300);
        assert_eq!(settings.long_break_duration(), 900);
        assert_eq!(settings.sessions_before_long_break(), 4);
        assert!(settings.play_sound());
        assert!(settings.history().is_empty());
        assert!(settings.tasks().is_empty());
        assert!(settings.current_task().is_none());
    }

    #[test]
    fn setters_persist_immediately() {
        let mem = MemoryStore::new();
        let mut settings = store_with(&mem);
        settings.set_work_duration(1800);
        settings.set_play_sound(false);
        settings.set_sessions_before_long_break(3);

        assert_eq!(mem.get(keys::WORK_DURATION).unwrap(), b"1800");
        assert_eq!(mem.get(keys::PLAY_SOUND).unwrap(), b"false");

        let reloaded = store_with(&mem);
        assert_eq!(reloaded.work_duration(), 1800);
        assert!(!reloaded.play_sound());
        assert_eq!(reloaded.sessions_before_long_break(), 3);
    }

    #[test]
    fn zero_values_are_clamped() {
        let mut settings = SettingsStore::in_memory();
        settings.set_short_break_duration(0);
        settings.set_sessions_before_long_break(0);
        assert_eq!(settings.short_break_duration(), 1);
        assert_eq!(settings.sessions_before_long_break(), 1);
    }

    #[test]
    fn corrupt_values_fall_back() {
        let mem = MemoryStore::new();
        mem.insert(keys::WORK_DURATION, "\"soon\"");
        mem.insert(keys::SESSION_HISTORY, "{not json");
        mem.insert(keys::TASKS, "[{\"id\": 3}]");
        mem.insert(keys::SESSIONS_BEFORE_LONG_BREAK, "0");
        mem.insert(keys::CURRENT_TASK_ID, "\"not-a-uuid\"");
        mem.insert(keys::PLAY_SOUND, "\"loud\"");

        let settings = store_with(&mem);
        assert_eq!(settings.work_duration(), 1500);
        assert!(settings.history().is_empty());
        assert!(settings.tasks().is_empty());
        assert_eq!(settings.sessions_before_long_break(), 1);
        assert!(settings.current_task_id().is_none());
        assert!(settings.play_sound());
    }

    #[test]
    fn setters_notify_subscribers_synchronously() {
        let mut settings = SettingsStore::in_memory();
        let mut sub = settings.subscribe();
        settings.set_work_duration(1800);
        settings.set_long_break_duration(1200);
        assert_eq!(
            sub.drain(),
            vec![
                SettingsEvent::WorkDurationChanged(1800),
                SettingsEvent::LongBreakDurationChanged(1200),
            ]
        );
    }

    #[test]
    fn history_preserves_insertion_order() {
        let mem = MemoryStore::new();
        let mut settings = store_with(&mem);
        let kinds = [SessionKind::Work, SessionKind::ShortBreak, SessionKind::Work];
        for kind in kinds {
            settings.append_session_record(SessionRecord::new(kind, 10, true));
        }

        let reloaded = store_with(&mem);
        let loaded: Vec<_> = reloaded.history().iter().map(|r| r.kind).collect();
        assert_eq!(loaded, kinds);
        assert_eq!(reloaded.history(), settings.history());
    }

    #[test]
    fn failed_write_keeps_memory_and_previous_bytes() {
        let mem = MemoryStore::new();
        let mut settings = store_with(&mem);
        settings.append_session_record(SessionRecord::new(SessionKind::Work, 1500, true));
        let good = mem.get(keys::SESSION_HISTORY).unwrap();

        mem.set_fail_writes(true);
        settings.append_session_record(SessionRecord::new(SessionKind::ShortBreak, 300, true));

        assert_eq!(settings.history().len(), 2);
        assert_eq!(mem.get(keys::SESSION_HISTORY).unwrap(), good);
    }

    #[test]
    fn add_task_trims_and_rejects_blank() {
        let mut settings = SettingsStore::in_memory();
        assert!(settings.add_task("   ").is_none());
        let id = settings.add_task("  write report ").unwrap();

        let task = settings.task(id).unwrap();
        assert_eq!(task.name, "write report");
        assert!(!task.is_completed);
        assert!(task.completed_at.is_none());
        assert_eq!(task.associated_session_count, 0);
        assert_eq!(settings.tasks().len(), 1);
    }

    #[test]
    fn toggle_sets_and_clears_completed_at() {
        let mut settings = SettingsStore::in_memory();
        let id = settings.add_task("review").unwrap();

        settings.toggle_task_completion(id);
        let task = settings.task(id).unwrap();
        assert!(task.is_completed);
        assert!(task.completed_at.is_some());

        settings.toggle_task_completion(id);
        let task = settings.task(id).unwrap();
        assert!(!task.is_completed);
        assert!(task.completed_at.is_none());
    }

    #[test]
    fn unknown_ids_are_no_ops() {
        let mut settings = SettingsStore::in_memory();
        let id = settings.add_task("a").unwrap();
        let before = settings.tasks().to_vec();
        let mut sub = settings.subscribe();

        let stranger = Uuid::new_v4();
        settings.toggle_task_completion(stranger);
        settings.increment_task_sessions(stranger);
        settings.delete_task(stranger);
        settings.set_current_task(Some(stranger));

        assert_eq!(settings.tasks(), before.as_slice());
        assert!(settings.current_task_id().is_none());
        assert!(sub.drain().is_empty());
        assert!(settings.task(id).is_some());
    }

    #[test]
    fn deleting_current_task_clears_reference() {
        let mem = MemoryStore::new();
        let mut settings = store_with(&mem);
        let keep = settings.add_task("keep").unwrap();
        let doomed = settings.add_task("doomed").unwrap();
        settings.set_current_task(Some(doomed));
        assert_eq!(settings.current_task().unwrap().id, doomed);

        settings.delete_task(doomed);
        assert!(settings.current_task_id().is_none());
        assert!(settings.current_task().is_none());
        assert_eq!(settings.tasks().len(), 1);

        let reloaded = store_with(&mem);
        assert!(reloaded.current_task_id().is_none());
        assert!(reloaded.task(keep).is_some());
    }

    #[test]
    fn deleting_other_task_keeps_reference() {
        let mut settings = SettingsStore::in_memory();
        let current = settings.add_task("current").unwrap();
        let other = settings.add_task("other").unwrap();
        settings.set_current_task(Some(current));
        settings.delete_task(other);
        assert_eq!(settings.current_task_id(), Some(current));
    }

    #[test]
    fn increment_only_touches_target() {
        let mut settings = SettingsStore::in_memory();
        let a = settings.add_task("a").unwrap();
        let b = settings.add_task("b").unwrap();
        settings.increment_task_sessions(a);
        settings.increment_task_sessions(a);
        assert_eq!(settings.task(a).unwrap().associated_session_count, 2);
        assert_eq!(settings.task(b).unwrap().associated_session_count, 0);
    }

    #[test]
    fn dangling_current_task_id_resolves_to_none() {
        let mem = MemoryStore::new();
        mem.insert(
            keys::CURRENT_TASK_ID,
            serde_json::to_vec(&Uuid::new_v4()).unwrap(),
        );
        let settings = store_with(&mem);
        assert!(settings.current_task_id().is_some());
        assert!(settings.current_task().is_none());
    }
}
