//! Application services - Business logic orchestration

pub mod command_store;

pub use command_store::{add_command, delete_command, get_commands, get_entries, DecodedEntry, NewCommand};
