//! Custom commands plugin - wires the responder into the host runtimes

use std::sync::Arc;

use crate::application::messaging::CustomCommandsHandler;
use crate::domain::traits::{Bot, HashStore};
use super::trait_def::{BotHost, Plugin, WebHost};

pub const PLUGIN_NAME: &str = "Custom commands";

pub struct CustomCommandsPlugin;

impl Plugin for CustomCommandsPlugin {
    fn name(&self) -> &str {
        PLUGIN_NAME
    }
}

impl CustomCommandsPlugin {
    /// Announce the plugin to both hosts and install the message handler on
    /// the bot host.
    pub fn register(
        bot_host: &mut dyn BotHost,
        web_host: &mut dyn WebHost,
        store: Arc<dyn HashStore>,
        bot: Arc<dyn Bot>,
        prefix: &str,
    ) {
        let plugin: Arc<dyn Plugin> = Arc::new(CustomCommandsPlugin);
        web_host.register_plugin(Arc::clone(&plugin));
        bot_host.register_plugin(plugin);

        bot_host.add_handler(Arc::new(CustomCommandsHandler::new(store, bot, prefix)));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::messaging::MessageDispatcher;
    use crate::infrastructure::adapters::console::ConsoleAdapter;
    use crate::infrastructure::storage::MemoryStore;
    use crate::plugins::registry::AdminRegistry;

    #[test]
    fn test_registers_with_both_hosts() {
        let mut dispatcher = MessageDispatcher::new();
        let mut admin = AdminRegistry::new();
        let store = Arc::new(MemoryStore::new());
        let bot = Arc::new(ConsoleAdapter::new());

        CustomCommandsPlugin::register(&mut dispatcher, &mut admin, store, bot, "!");

        assert!(dispatcher.plugins().is_registered(PLUGIN_NAME));
        assert!(admin.is_registered(PLUGIN_NAME));
        assert_eq!(dispatcher.handler_count(), 1);
    }
}
