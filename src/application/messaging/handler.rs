//! Custom command responder - answers messages that match a guild's triggers

use async_trait::async_trait;
use std::sync::Arc;

use crate::application::errors::BotError;
use crate::application::services::command_store;
use crate::domain::entities::{CustomCommand, Message, RegexCache};
use crate::domain::traits::{Bot, HashStore};
use crate::plugins::trait_def::EventHandler;

/// Message-create handler installed by the custom commands plugin
pub struct CustomCommandsHandler {
    store: Arc<dyn HashStore>,
    bot: Arc<dyn Bot>,
    prefix: String,
    regexes: RegexCache,
}

impl CustomCommandsHandler {
    pub fn new(store: Arc<dyn HashStore>, bot: Arc<dyn Bot>, prefix: impl Into<String>) -> Self {
        Self {
            store,
            bot,
            prefix: prefix.into(),
            regexes: RegexCache::default(),
        }
    }

    /// First command, in id order, whose trigger matches `text`
    pub fn find_match<'a>(&self, commands: &'a [CustomCommand], text: &str) -> Option<&'a CustomCommand> {
        commands.iter().find(|c| c.matches_cached(text, &self.prefix, &self.regexes))
    }
}

#[async_trait]
impl EventHandler for CustomCommandsHandler {
    async fn on_message_create(&self, message: Message) -> Result<(), BotError> {
        if message.from_bot() {
            return Ok(());
        }
        let Some(guild_id) = message.guild_id.as_deref() else {
            return Ok(());
        };

        let (commands, _) = command_store::get_commands(self.store.as_ref(), guild_id).await?;
        let Some(command) = self.find_match(&commands, &message.content) else {
            return Ok(());
        };

        tracing::debug!(guild = guild_id, "Custom command #{} triggered", command.id);
        self.bot.send_message(&message.channel_id, &command.response).await?;
        Ok(())
    }
}
