//! Core error types for pomate-core.
//!
//! Errors only surface at the outer edges of the library (opening the
//! settings database, reading the TOML config); [`CoreError`] is what those
//! entry points hand to front-ends. The settings store and timer engine
//! log and swallow persistence failures instead of returning them.

use std::path::PathBuf;
use thiserror::Error;

/// Core error type for pomate-core.
#[derive(Error, Debug)]
pub enum CoreError {
    /// Key-value store errors
    #[error("Store error: {0}")]
    Store(#[from] StoreError),

    /// Configuration-related errors
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),
}

/// Errors raised by a [`crate::storage::KeyValueStore`] backend.
#[derive(Error, Debug)]
pub enum StoreError {
    /// Failed to open the backing database
    #[error("Failed to open store at {path}: {source}")]
    OpenFailed {
        path: PathBuf,
        #[source]
        source: rusqlite::Error,
    },

    /// Reading a key failed
    #[error("Failed to read key '{key}': {message}")]
    ReadFailed { key: String, message: String },

    /// Writing a key failed; the previous value is left in place
    #[error("Failed to write key '{key}': {message}")]
    WriteFailed { key: String, message: String },

    /// Database is locked
    #[error("Store is locked")]
    Locked,

    #[error("Query failed: {0}")]
    QueryFailed(String),

    /// Could not resolve the data directory
    #[error("Data directory unavailable: {0}")]
    DataDir(#[from] std::io::Error),
}

/// Configuration-specific errors.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// Failed to load configuration
    #[error("Failed to load configuration from {path}: {message}")]
    LoadFailed { path: PathBuf, message: String },

    /// Failed to save configuration
    #[error("Failed to save configuration to {path}: {message}")]
    SaveFailed { path: PathBuf, message: String },

    /// Invalid configuration value
    #[error("Invalid configuration value for '{key}': {message}")]
    InvalidValue { key: String, message: String },

    /// Unknown configuration key
    #[error("Unknown configuration key: {0}")]
    UnknownKey(String),

    /// Failed to parse configuration
    #[error("Failed to parse configuration: {0}")]
    ParseFailed(String),
}

impl From<rusqlite::Error> for StoreError {
    fn from(err: rusqlite::Error) -> Self {
        match &err {
            rusqlite::Error::SqliteFailure(e, _msg) => {
                if e.code == rusqlite::ErrorCode::DatabaseLocked {
                    StoreError::Locked
                } else {
                    StoreError::QueryFailed(err.to_string())
                }
            }
            _ => StoreError::QueryFailed(err.to_string()),
        }
    }
}

impl From<toml::de::Error> for ConfigError {
    fn from(err: toml::de::Error) -> Self {
        ConfigError::ParseFailed(err.to_string())
    }
}

/// Result type alias for CoreError
pub type Result<T, E = CoreError> = std::result::Result<T, E>;
