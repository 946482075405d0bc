//! Per-guild custom commands for a chat bot
//!
//! Commands live in a hash store under `custom_commands:<guild_id>`, one field
//! per command. [`get_commands`] loads and orders them; the plugin in
//! [`plugins::custom_commands`] answers messages that match their triggers.

pub mod domain;
pub mod application;
pub mod infrastructure;
pub mod plugins;

pub use application::errors::{BotError, StorageError};
pub use application::services::{get_commands, DecodedEntry};
pub use domain::entities::{CustomCommand, TriggerType};
pub use domain::traits::HashStore;
