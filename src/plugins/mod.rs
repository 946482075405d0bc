//! Plugin system
//! 
//! Host-side plugin traits and registries, plus the custom commands plugin

pub mod trait_def;
pub mod registry;
pub mod custom_commands;

pub use custom_commands::CustomCommandsPlugin;
pub use registry::{AdminRegistry, PluginRegistry};
pub use trait_def::{BotHost, EventHandler, Plugin, WebHost};
