//! Domain entities - Core business objects with no external dependencies

pub mod user;
pub mod message;
pub mod custom_command;

pub use user::User;
pub use message::Message;
pub use custom_command::{CustomCommand, RegexCache, TriggerType};
