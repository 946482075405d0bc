//! Plugin registry - tracks plugins registered with a host

use std::collections::HashMap;
use std::sync::Arc;

use crate::application::errors::PluginError;
use super::trait_def::{Plugin, WebHost};

/// Registry of named plugins, kept in registration order
#[derive(Default)]
pub struct PluginRegistry {
    plugins: HashMap<String, Arc<dyn Plugin>>,
    order: Vec<String>,
}

impl PluginRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a plugin; names must be unique
    pub fn register(&mut self, plugin: Arc<dyn Plugin>) -> Result<(), PluginError> {
        let name = plugin.name().to_string();

        if self.plugins.contains_key(&name) {
            return Err(PluginError::AlreadyRegistered(name));
        }

        tracing::info!("Registering plugin: {}", name);
        self.order.push(name.clone());
        self.plugins.insert(name, plugin);
        Ok(())
    }

    /// Get a plugin by name
    pub fn get(&self, name: &str) -> Option<Arc<dyn Plugin>> {
        self.plugins.get(name).cloned()
    }

    /// Plugin names in registration order
    pub fn names(&self) -> Vec<String> {
        self.order.clone()
    }

    pub fn is_registered(&self, name: &str) -> bool {
        self.plugins.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.plugins.len()
    }

    pub fn is_empty(&self) -> bool {
        self.plugins.is_empty()
    }
}

/// Web-admin side of the host: only needs to know which plugins exist
#[derive(Default)]
pub struct AdminRegistry {
    registry: PluginRegistry,
}

impl AdminRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn plugin_names(&self) -> Vec<String> {
        self.registry.names()
    }

    pub fn is_registered(&self, name: &str) -> bool {
        self.registry.is_registered(name)
    }
}

impl WebHost for AdminRegistry {
    fn register_plugin(&mut self, plugin: Arc<dyn Plugin>) {
        if let Err(e) = self.registry.register(plugin) {
            tracing::warn!("Web admin: {}", e);
        }
    }
}
