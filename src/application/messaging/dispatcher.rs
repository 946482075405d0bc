//! Message dispatcher - Routes incoming messages to registered handlers

use std::sync::Arc;

use crate::domain::entities::Message;
use crate::plugins::registry::PluginRegistry;
use crate::plugins::trait_def::{BotHost, EventHandler, Plugin};

/// Bot-side host runtime: owns the bot plugin registry and the message
/// handlers plugins install
#[derive(Default)]
pub struct MessageDispatcher {
    plugins: PluginRegistry,
    handlers: Vec<Arc<dyn EventHandler>>,
}

impl MessageDispatcher {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn plugins(&self) -> &PluginRegistry {
        &self.plugins
    }

    pub fn handler_count(&self) -> usize {
        self.handlers.len()
    }

    /// Run every handler for `message`, one task each, and wait for them.
    /// Handler errors are logged, never returned.
    pub async fn dispatch(&self, message: Message) {
        tracing::debug!(
            "[{}] Dispatching message {} sent at {}",
            message.channel_id,
            message.id,
            message.timestamp.to_rfc3339()
        );

        let mut tasks = Vec::with_capacity(self.handlers.len());

        for handler in &self.handlers {
            let handler = Arc::clone(handler);
            let message = message.clone();
            tasks.push(tokio::spawn(async move { handler.on_message_create(message).await }));
        }

        for task in tasks {
            match task.await {
                Ok(Ok(())) => {}
                Ok(Err(e)) => tracing::error!("[{}] Handler failed: {}", message.channel_id, e),
                Err(e) => tracing::error!("[{}] Handler task panicked: {}", message.channel_id, e),
            }
        }
    }
}

impl BotHost for MessageDispatcher {
    fn register_plugin(&mut self, plugin: Arc<dyn Plugin>) {
        if let Err(e) = self.plugins.register(plugin) {
            tracing::warn!("Bot runtime: {}", e);
        }
    }

    fn add_handler(&mut self, handler: Arc<dyn EventHandler>) {
        self.handlers.push(handler);
    }
}
