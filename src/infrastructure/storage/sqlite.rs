//! SQLite-backed hash store

use async_trait::async_trait;
use rusqlite::{params, Connection};
use std::collections::HashMap;
use std::path::Path;
use std::sync::{Arc, Mutex};

use crate::application::errors::StorageError;
use crate::domain::traits::HashStore;

/// Hash store persisted in a single SQLite table of (key, field, value) rows
#[derive(Clone)]
pub struct SqliteStore {
    conn: Arc<Mutex<Connection>>,
}

impl SqliteStore {
    pub fn open(path: impl AsRef<Path>) -> Result<Self, StorageError> {
        Self::init(Connection::open(path)?)
    }

    pub fn open_in_memory() -> Result<Self, StorageError> {
        Self::init(Connection::open_in_memory()?)
    }

    fn init(conn: Connection) -> Result<Self, StorageError> {
        conn.execute(
            "CREATE TABLE IF NOT EXISTS hashes (
                key TEXT NOT NULL,
                field TEXT NOT NULL,
                value TEXT NOT NULL,
                PRIMARY KEY (key, field)
            )",
            [],
        )?;

        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    /// Run a blocking query off the async runtime
    async fn with_conn<T, F>(&self, f: F) -> Result<T, StorageError>
    where
        T: Send + 'static,
        F: FnOnce(&Connection) -> Result<T, StorageError> + Send + 'static,
    {
        let conn = Arc::clone(&self.conn);
        tokio::task::spawn_blocking(move || {
            let conn = conn.lock()
                .map_err(|_| StorageError::Unavailable("Lock poisoned".to_string()))?;
            f(&conn)
        })
        .await
        .map_err(|e| StorageError::Unavailable(format!("Query task failed: {}", e)))?
    }
}

#[async_trait]
impl HashStore for SqliteStore {
    async fn hgetall(&self, key: &str) -> Result<Option<HashMap<String, String>>, StorageError> {
        let key = key.to_string();
        self.with_conn(move |conn| {
            let mut stmt = conn.prepare("SELECT field, value FROM hashes WHERE key = ?1")?;
            let rows = stmt.query_map([&key], |row| Ok((row.get::<_, String>(0)?, row.get::<_, String>(1)?)))?;

            let mut hash = HashMap::new();
            for row in rows {
                let (field, value) = row?;
                hash.insert(field, value);
            }

            Ok(if hash.is_empty() { None } else { Some(hash) })
        })
        .await
    }

    async fn hset(&self, key: &str, field: &str, value: &str) -> Result<(), StorageError> {
        let (key, field, value) = (key.to_string(), field.to_string(), value.to_string());
        self.with_conn(move |conn| {
            conn.execute(
                "INSERT OR REPLACE INTO hashes (key, field, value) VALUES (?1, ?2, ?3)",
                params![key, field, value],
            )?;
            Ok(())
        })
        .await
    }

    async fn hsetnx(&self, key: &str, field: &str, value: &str) -> Result<bool, StorageError> {
        let (key, field, value) = (key.to_string(), field.to_string(), value.to_string());
        self.with_conn(move |conn| {
            let inserted = conn.execute(
                "INSERT OR IGNORE INTO hashes (key, field, value) VALUES (?1, ?2, ?3)",
                params![key, field, value],
            )?;
            Ok(inserted > 0)
        })
        .await
    }

    async fn hdel(&self, key: &str, field: &str) -> Result<bool, StorageError> {
        let (key, field) = (key.to_string(), field.to_string());
        self.with_conn(move |conn| {
            let changed = conn.execute(
                "DELETE FROM hashes WHERE key = ?1 AND field = ?2",
                params![key, field],
            )?;
            Ok(changed > 0)
        })
        .await
    }
}
