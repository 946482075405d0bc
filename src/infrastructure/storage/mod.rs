//! Hash store implementations

pub mod sqlite;

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;

use crate::domain::traits::HashStore;
use crate::application::errors::StorageError;

pub use sqlite::SqliteStore;

/// In-memory hash store
#[derive(Default)]
pub struct MemoryStore {
    hashes: Arc<RwLock<HashMap<String, HashMap<String, String>>>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl HashStore for MemoryStore {
    async fn hgetall(&self, key: &str) -> Result<Option<HashMap<String, String>>, StorageError> {
        let hashes = self.hashes.read().await;
        Ok(hashes.get(key).cloned())
    }

    async fn hset(&self, key: &str, field: &str, value: &str) -> Result<(), StorageError> {
        let mut hashes = self.hashes.write().await;
        hashes.entry(key.to_string())
            .or_insert_with(HashMap::new)
            .insert(field.to_string(), value.to_string());
        Ok(())
    }

    async fn hsetnx(&self, key: &str, field: &str, value: &str) -> Result<bool, StorageError> {
        let mut hashes = self.hashes.write().await;
        let hash = hashes.entry(key.to_string()).or_insert_with(HashMap::new);
        if hash.contains_key(field) {
            return Ok(false);
        }
        hash.insert(field.to_string(), value.to_string());
        Ok(true)
    }

    async fn hdel(&self, key: &str, field: &str) -> Result<bool, StorageError> {
        let mut hashes = self.hashes.write().await;
        let Some(hash) = hashes.get_mut(key) else {
            return Ok(false);
        };

        let removed = hash.remove(field).is_some();
        // an emptied hash no longer exists
        if hash.is_empty() {
            hashes.remove(key);
        }
        Ok(removed)
    }
}
