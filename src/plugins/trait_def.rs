//! Plugin trait definitions

use async_trait::async_trait;
use std::sync::Arc;

use crate::application::errors::BotError;
use crate::domain::entities::Message;

/// Core plugin trait that all plugins must implement
pub trait Plugin: Send + Sync {
    /// Unique, human-readable plugin name
    fn name(&self) -> &str;
}

/// Callback invoked by the bot host for every incoming message.
///
/// The host may run many of these concurrently.
#[async_trait]
pub trait EventHandler: Send + Sync {
    async fn on_message_create(&self, message: Message) -> Result<(), BotError>;
}

/// Bot-event runtime a plugin can register with
pub trait BotHost {
    fn register_plugin(&mut self, plugin: Arc<dyn Plugin>);

    fn add_handler(&mut self, handler: Arc<dyn EventHandler>);
}

/// Web-admin runtime a plugin can register with
pub trait WebHost {
    fn register_plugin(&mut self, plugin: Arc<dyn Plugin>);
}
