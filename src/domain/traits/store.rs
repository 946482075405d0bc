use async_trait::async_trait;
use std::collections::HashMap;
use crate::application::errors::StorageError;

/// Store trait - a key-value store whose values are hashes (field -> value)
#[async_trait]
pub trait HashStore: Send + Sync {
    /// Fetch every field of the hash at `key`.
    ///
    /// Returns `Ok(None)` when the key does not exist. Any other failure
    /// (connection, protocol, backend) is an `Err`.
    async fn hgetall(&self, key: &str) -> Result<Option<HashMap<String, String>>, StorageError>;

    /// Set one field of the hash at `key`, creating the hash if needed
    async fn hset(&self, key: &str, field: &str, value: &str) -> Result<(), StorageError>;

    /// Set one field only if it does not exist yet; returns whether it was set
    async fn hsetnx(&self, key: &str, field: &str, value: &str) -> Result<bool, StorageError>;

    /// Remove one field; returns whether it existed
    async fn hdel(&self, key: &str, field: &str) -> Result<bool, StorageError>;
}
