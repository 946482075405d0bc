use super::User;
use chrono::{DateTime, Utc};

/// A chat message delivered by the host runtime
#[derive(Debug, Clone)]
pub struct Message {
    pub id: String,
    /// `None` for direct messages
    pub guild_id: Option<String>,
    pub channel_id: String,
    pub author: Option<User>,
    pub content: String,
    pub timestamp: DateTime<Utc>,
}

impl Message {
    pub fn new(channel_id: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            guild_id: None,
            channel_id: channel_id.into(),
            author: None,
            content: content.into(),
            timestamp: Utc::now(),
        }
    }

    pub fn in_guild(mut self, guild_id: impl Into<String>) -> Self {
        self.guild_id = Some(guild_id.into());
        self
    }

    pub fn with_author(mut self, user: User) -> Self {
        self.author = Some(user);
        self
    }

    pub fn from_bot(&self) -> bool {
        self.author.as_ref().is_some_and(|u| u.is_bot)
    }
}
