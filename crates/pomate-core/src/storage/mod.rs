//! Durable key-value storage.
//!
//! The settings store treats persistence as an opaque blob store: every
//! setting, the session history and the task list live under a single key
//! each. [`Database`] is the SQLite-backed store used by the CLI;
//! [`MemoryStore`] backs tests and throwaway runs.

mod config;
pub mod database;
mod memory;

pub use config::{Config, DefaultsConfig};
pub use database::Database;
pub use memory::MemoryStore;

use std::path::PathBuf;

use crate::error::StoreError;

/// A keyed blob store.
///
/// `save` must either replace the value completely or leave the previous
/// bytes untouched; implementations never truncate a key on failure.
pub trait KeyValueStore: Send {
    fn load(&self, key: &str) -> Result<Option<Vec<u8>>, StoreError>;

    fn save(&mut self, key: &str, bytes: &[u8]) -> Result<(), StoreError>;
}

impl<S: KeyValueStore + ?Sized> KeyValueStore for Box<S> {
    fn load(&self, key: &str) -> Result<Option<Vec<u8>>, StoreError> {
        (**self).load(key)
    }

    fn save(&mut self, key: &str, bytes: &[u8]) -> Result<(), StoreError> {
        (**self).save(key, bytes)
    }
}

/// Returns `~/.config/pomate[-dev]/` based on POMATE_ENV.
///
/// Set POMATE_ENV=dev to use development data directory.
///
/// # Errors
/// Returns an error if creating the directory fails.
pub fn data_dir() -> std::io::Result<PathBuf> {
    let base_dir = dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(".config");

    let env = std::env::var("POMATE_ENV").unwrap_or_else(|_| "production".to_string());

    let dir = if env == "dev" {
        base_dir.join("pomate-dev")
    } else {
        base_dir.join("pomate")
    };

    std::fs::create_dir_all(&dir)?;
    Ok(dir)
}
