//! Custom command storage - reads and writes a guild's command hash

use std::collections::HashMap;

use crate::application::errors::StorageError;
use crate::domain::entities::{CustomCommand, TriggerType};
use crate::domain::traits::HashStore;

/// Store key holding one guild's commands
pub fn guild_key(guild_id: &str) -> String {
    format!("custom_commands:{}", guild_id)
}

/// Outcome of decoding one stored field
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DecodedEntry {
    Valid(CustomCommand),
    Corrupt { field: String, reason: String },
}

impl DecodedEntry {
    /// Sort key; corrupt entries sort as id 0
    pub fn id(&self) -> u32 {
        match self {
            DecodedEntry::Valid(cmd) => cmd.id,
            DecodedEntry::Corrupt { .. } => 0,
        }
    }

    /// Collapse to a command, substituting the zero-valued placeholder for
    /// corrupt entries
    pub fn into_command(self) -> CustomCommand {
        match self {
            DecodedEntry::Valid(cmd) => cmd,
            DecodedEntry::Corrupt { .. } => CustomCommand::default(),
        }
    }
}

/// Decode every field of a guild's hash. Failures are logged and kept as
/// `DecodedEntry::Corrupt` so the count always matches the field count.
pub fn decode_entries(guild_id: &str, fields: HashMap<String, String>) -> Vec<DecodedEntry> {
    fields
        .into_iter()
        .map(|(field, raw)| match serde_json::from_str::<CustomCommand>(&raw) {
            Ok(cmd) => DecodedEntry::Valid(cmd),
            Err(e) => {
                tracing::warn!(
                    guild = guild_id,
                    field = %field,
                    "Failed decoding custom command: {}",
                    e
                );
                DecodedEntry::Corrupt { field, reason: e.to_string() }
            }
        })
        .collect()
}

/// Fetch the raw entries for a guild, ordered by id. An absent record is an
/// empty list.
pub async fn get_entries(store: &dyn HashStore, guild_id: &str) -> Result<Vec<DecodedEntry>, StorageError> {
    let fields = fetch_fields(store, guild_id).await?;
    let mut entries = decode_entries(guild_id, fields);
    entries.sort_by_key(DecodedEntry::id);
    Ok(entries)
}

/// Raw field map for a guild; absent records are empty
async fn fetch_fields(store: &dyn HashStore, guild_id: &str) -> Result<HashMap<String, String>, StorageError> {
    let key = guild_key(guild_id);
    match store.hgetall(&key).await {
        Ok(fields) => Ok(fields.unwrap_or_default()),
        Err(e) => Err(StorageError::fetch_failed(key, e)),
    }
}

/// Load all custom commands for a guild.
///
/// Returns the commands sorted ascending by id, and the highest id among the
/// commands that decoded. Corrupt entries show up as placeholder commands.
pub async fn get_commands(store: &dyn HashStore, guild_id: &str) -> Result<(Vec<CustomCommand>, u32), StorageError> {
    let entries = get_entries(store, guild_id).await?;

    let highest = entries
        .iter()
        .filter_map(|e| match e {
            DecodedEntry::Valid(cmd) => Some(cmd.id),
            DecodedEntry::Corrupt { .. } => None,
        })
        .max()
        .unwrap_or(0);

    // entries are already sorted and the placeholder's id is 0, same as the
    // corrupt sort key
    let commands = entries.into_iter().map(DecodedEntry::into_command).collect();
    Ok((commands, highest))
}

/// Fields for a command that has not been assigned an id yet
#[derive(Debug, Clone)]
pub struct NewCommand {
    pub trigger_type: TriggerType,
    pub trigger: String,
    pub response: String,
    pub case_sensitive: bool,
}

/// Store a new command under the next free id and return it.
///
/// The id is one past the highest id in use, counting both decoded commands
/// and numeric field names, so fields that fail to decode are never reused.
/// The write only succeeds if the field is still free; a concurrent add that
/// claimed the same id makes this call fail with `StorageError::Conflict`
/// instead of overwriting it.
pub async fn add_command(store: &dyn HashStore, guild_id: &str, new: NewCommand) -> Result<CustomCommand, StorageError> {
    let fields = fetch_fields(store, guild_id).await?;
    let highest_field = fields.keys().filter_map(|k| k.parse::<u32>().ok()).max().unwrap_or(0);
    let highest_decoded = decode_entries(guild_id, fields)
        .iter()
        .map(DecodedEntry::id)
        .max()
        .unwrap_or(0);

    let id = highest_field
        .max(highest_decoded)
        .checked_add(1)
        .ok_or_else(|| StorageError::Serialization("custom command ids exhausted".to_string()))?;

    let command = CustomCommand {
        trigger_type: new.trigger_type,
        trigger: new.trigger,
        response: new.response,
        case_sensitive: new.case_sensitive,
        id,
    };

    let encoded = serde_json::to_string(&command)
        .map_err(|e| StorageError::Serialization(e.to_string()))?;
    let field = id.to_string();
    if !store.hsetnx(&guild_key(guild_id), &field, &encoded).await? {
        return Err(StorageError::Conflict(format!("custom command #{} already exists in guild {}", id, guild_id)));
    }

    tracing::info!(guild = guild_id, "Added custom command #{}", id);
    Ok(command)
}

/// Remove the command stored under `id`; returns whether it existed
pub async fn delete_command(store: &dyn HashStore, guild_id: &str, id: u32) -> Result<bool, StorageError> {
    let removed = store.hdel(&guild_key(guild_id), &id.to_string()).await?;
    if removed {
        tracing::info!(guild = guild_id, "Deleted custom command #{}", id);
    }
    Ok(removed)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infrastructure::storage::MemoryStore;
    use async_trait::async_trait;

    struct UnreachableStore;

    #[async_trait]
    impl HashStore for UnreachableStore {
        async fn hgetall(&self, _key: &str) -> Result<Option<HashMap<String, String>>, StorageError> {
            Err(StorageError::Unavailable("connection refused".to_string()))
        }

        async fn hset(&self, _key: &str, _field: &str, _value: &str) -> Result<(), StorageError> {
            Err(StorageError::Unavailable("connection refused".to_string()))
        }

        async fn hsetnx(&self, _key: &str, _field: &str, _value: &str) -> Result<bool, StorageError> {
            Err(StorageError::Unavailable("connection refused".to_string()))
        }

        async fn hdel(&self, _key: &str, _field: &str) -> Result<bool, StorageError> {
            Err(StorageError::Unavailable("connection refused".to_string()))
        }
    }

    /// Reads never see anything, as if another writer got in between the
    /// fetch and the write
    struct StaleReadStore {
        inner: MemoryStore,
    }

    #[async_trait]
    impl HashStore for StaleReadStore {
        async fn hgetall(&self, _key: &str) -> Result<Option<HashMap<String, String>>, StorageError> {
            Ok(None)
        }

        async fn hset(&self, key: &str, field: &str, value: &str) -> Result<(), StorageError> {
            self.inner.hset(key, field, value).await
        }

        async fn hsetnx(&self, key: &str, field: &str, value: &str) -> Result<bool, StorageError> {
            self.inner.hsetnx(key, field, value).await
        }

        async fn hdel(&self, key: &str, field: &str) -> Result<bool, StorageError> {
            self.inner.hdel(key, field).await
        }
    }

    fn new_command(trigger: &str) -> NewCommand {
        NewCommand {
            trigger_type: TriggerType::Exact,
            trigger: trigger.to_string(),
            response: "new".to_string(),
            case_sensitive: false,
        }
    }

    fn encoded(id: u32, trigger: &str) -> String {
        serde_json::to_string(&CustomCommand::new(TriggerType::Command, trigger, "reply").with_id(id)).unwrap()
    }

    async fn seed(store: &MemoryStore, guild: &str, fields: &[(&str, String)]) {
        for (field, value) in fields {
            store.hset(&guild_key(guild), field, value).await.unwrap();
        }
    }

    #[test]
    fn test_guild_key_layout() {
        assert_eq!(guild_key("1234"), "custom_commands:1234");
    }

    #[tokio::test]
    async fn test_absent_record_is_empty() {
        let store = MemoryStore::new();
        let (commands, next_id) = get_commands(&store, "42").await.unwrap();
        assert!(commands.is_empty());
        assert_eq!(next_id, 0);
    }

    #[tokio::test]
    async fn test_unreachable_store_is_error() {
        let err = get_commands(&UnreachableStore, "42").await.unwrap_err();
        match err {
            StorageError::FetchFailed { key, .. } => assert_eq!(key, "custom_commands:42"),
            other => panic!("unexpected error: {}", other),
        }
    }

    #[tokio::test]
    async fn test_sorted_by_id_with_highest_id() {
        let store = MemoryStore::new();
        seed(&store, "g", &[("5", encoded(5, "five")), ("1", encoded(1, "one")), ("3", encoded(3, "three"))]).await;

        let (commands, next_id) = get_commands(&store, "g").await.unwrap();
        let ids: Vec<u32> = commands.iter().map(|c| c.id).collect();
        assert_eq!(ids, vec![1, 3, 5]);
        assert_eq!(next_id, 5);
    }

    #[tokio::test]
    async fn test_corrupt_entry_becomes_placeholder() {
        let store = MemoryStore::new();
        seed(&store, "g", &[("7", encoded(7, "seven")), ("x", "{broken".to_string()), ("2", encoded(2, "two"))]).await;

        let (commands, next_id) = get_commands(&store, "g").await.unwrap();
        assert_eq!(commands.len(), 3);
        assert!(commands[0].is_placeholder());
        assert_eq!(commands[1].id, 2);
        assert_eq!(commands[2].id, 7);
        assert_eq!(next_id, 7);
    }

    #[tokio::test]
    async fn test_single_corrupt_entry() {
        let store = MemoryStore::new();
        seed(&store, "g", &[("1", "null-ish".to_string())]).await;

        let (commands, next_id) = get_commands(&store, "g").await.unwrap();
        assert_eq!(commands, vec![CustomCommand::default()]);
        assert_eq!(next_id, 0);
    }

    #[tokio::test]
    async fn test_repeated_fetch_is_stable() {
        let store = MemoryStore::new();
        seed(&store, "g", &[("4", encoded(4, "a")), ("2", encoded(2, "b")), ("9", encoded(9, "c"))]).await;

        let first = get_commands(&store, "g").await.unwrap();
        let second = get_commands(&store, "g").await.unwrap();
        assert_eq!(first, second);
    }

    #[tokio::test]
    async fn test_entries_report_corrupt_fields() {
        let store = MemoryStore::new();
        seed(&store, "g", &[("3", encoded(3, "ok")), ("bad", r#"{"trigger_type":99}"#.to_string())]).await;

        let entries = get_entries(&store, "g").await.unwrap();
        assert_eq!(entries.len(), 2);
        match &entries[0] {
            DecodedEntry::Corrupt { field, reason } => {
                assert_eq!(field, "bad");
                assert!(!reason.is_empty());
            }
            other => panic!("expected corrupt entry, got {:?}", other),
        }
        assert_eq!(entries[1].id(), 3);
    }

    #[tokio::test]
    async fn test_add_assigns_next_id_and_delete_removes() {
        let store = MemoryStore::new();
        seed(&store, "g", &[("3", encoded(3, "three"))]).await;

        let added = add_command(&store, "g", NewCommand {
            trigger_type: TriggerType::Contains,
            trigger: "hello".to_string(),
            response: "hi there".to_string(),
            case_sensitive: false,
        })
        .await
        .unwrap();
        assert_eq!(added.id, 4);

        let (commands, next_id) = get_commands(&store, "g").await.unwrap();
        assert_eq!(commands.len(), 2);
        assert_eq!(commands[1], added);
        assert_eq!(next_id, 4);

        assert!(delete_command(&store, "g", 4).await.unwrap());
        assert!(!delete_command(&store, "g", 4).await.unwrap());
        let (commands, _) = get_commands(&store, "g").await.unwrap();
        assert_eq!(commands.len(), 1);
    }

    #[tokio::test]
    async fn test_add_propagates_store_failure() {
        let result = add_command(&UnreachableStore, "g", NewCommand {
            trigger_type: TriggerType::Exact,
            trigger: "x".to_string(),
            response: "y".to_string(),
            case_sensitive: true,
        })
        .await;
        assert!(result.is_err());
    }

    #[tokio::test]
    async fn test_loosely_encoded_records_keep_their_ids() {
        let store = MemoryStore::new();
        seed(&store, "g", &[
            ("11", encoded(11, "eleven")),
            ("12", r#"{"trigger_type":9,"trigger":"keep me","response":"r","id":12}"#.to_string()),
            ("13", r#"{"trigger_type":0,"trigger":null,"response":"r","case_sensitive":null,"id":13}"#.to_string()),
        ]).await;

        let (commands, next_id) = get_commands(&store, "g").await.unwrap();
        assert_eq!(commands.iter().map(|c| c.id).collect::<Vec<_>>(), vec![11, 12, 13]);
        assert_eq!(next_id, 13);

        let added = add_command(&store, "g", new_command("new")).await.unwrap();
        assert_eq!(added.id, 14);

        let fields = store.hgetall(&guild_key("g")).await.unwrap().unwrap();
        assert!(fields["12"].contains("keep me"));
        assert_eq!(fields.len(), 4);
    }

    #[tokio::test]
    async fn test_add_skips_ids_of_corrupt_fields() {
        let store = MemoryStore::new();
        seed(&store, "g", &[("2", encoded(2, "two")), ("20", "{garbage".to_string())]).await;

        let (_, next_id) = get_commands(&store, "g").await.unwrap();
        assert_eq!(next_id, 2);

        let added = add_command(&store, "g", new_command("fresh")).await.unwrap();
        assert_eq!(added.id, 21);
        let fields = store.hgetall(&guild_key("g")).await.unwrap().unwrap();
        assert_eq!(fields["20"], "{garbage");
    }

    #[tokio::test]
    async fn test_add_refuses_to_overwrite_claimed_id() {
        let store = StaleReadStore { inner: MemoryStore::new() };
        store.inner.hset(&guild_key("g"), "1", &encoded(1, "first")).await.unwrap();

        let err = add_command(&store, "g", new_command("second")).await.unwrap_err();
        assert!(matches!(err, StorageError::Conflict(_)));

        let fields = store.inner.hgetall(&guild_key("g")).await.unwrap().unwrap();
        assert!(fields["1"].contains("first"));
    }
}
