//! Application layer errors

use thiserror::Error;

/// General bot errors
#[derive(Error, Debug)]
pub enum BotError {
    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),

    #[error("Internal error: {0}")]
    Internal(String),
}

/// Storage errors
#[derive(Error, Debug)]
pub enum StorageError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("Store unavailable: {0}")]
    Unavailable(String),

    #[error("Serialization error: {0}")]
    Serialization(String),

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Store fetch failed for {key}: {source}")]
    FetchFailed {
        key: String,
        #[source]
        source: Box<StorageError>,
    },
}

impl StorageError {
    /// Wrap a backend failure that happened while reading `key`
    pub fn fetch_failed(key: impl Into<String>, source: StorageError) -> Self {
        StorageError::FetchFailed {
            key: key.into(),
            source: Box::new(source),
        }
    }
}

/// Plugin registration errors
#[derive(Error, Debug)]
pub enum PluginError {
    #[error("Plugin '{0}' already registered")]
    AlreadyRegistered(String),
}

/// Configuration errors
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Invalid value: {0}")]
    InvalidValue(String),

    #[error("Parse error: {0}")]
    Parse(String),
}
