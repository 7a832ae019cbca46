//! In-memory plugin registry with lifecycle events.

use std::collections::BTreeMap;
use std::sync::{Arc, RwLock};
use thiserror::Error;
use tokio::sync::broadcast;
use tracing::debug;

use crate::command::domain::Domain;
use crate::command::locks::{read, write};
use crate::command::ports::{Plugin, PluginLifecycleEvent, PluginRegistry};

const EVENT_CAPACITY: usize = 64;

/// Errors returned when registering plugins.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum PluginRegistrationError {
    /// A plugin with the same identifier is already registered.
    #[error("duplicate plugin identifier: {0}")]
    DuplicatePlugin(String),
}

/// Thread-safe in-memory plugin registry.
///
/// Plugins are keyed by their ASCII-lowercased identifier, matching the
/// agent ids the parser and command registry produce.
///
/// Registration changes are broadcast as [`PluginLifecycleEvent`]s unless the
/// registry was created with [`InMemoryPluginRegistry::without_events`].
#[derive(Clone)]
pub struct InMemoryPluginRegistry {
    plugins: Arc<RwLock<BTreeMap<String, Arc<dyn Plugin>>>>,
    events: Option<broadcast::Sender<PluginLifecycleEvent>>,
}

impl Default for InMemoryPluginRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl InMemoryPluginRegistry {
    /// Creates an empty registry that emits lifecycle events.
    #[must_use]
    pub fn new() -> Self {
        let (sender, _) = broadcast::channel(EVENT_CAPACITY);
        Self {
            plugins: Arc::default(),
            events: Some(sender),
        }
    }

    /// Creates an empty registry that cannot emit lifecycle events.
    #[must_use]
    pub fn without_events() -> Self {
        Self {
            plugins: Arc::default(),
            events: None,
        }
    }

    /// Registers a plugin.
    ///
    /// # Errors
    ///
    /// Returns [`PluginRegistrationError::DuplicatePlugin`] when the
    /// identifier is taken, ignoring ASCII case.
    pub fn register(&self, plugin: Arc<dyn Plugin>) -> Result<(), PluginRegistrationError> {
        let id = plugin.id().to_owned();
        {
            let mut plugins = write(&self.plugins);
            let key = id.to_ascii_lowercase();
            if plugins.contains_key(&key) {
                return Err(PluginRegistrationError::DuplicatePlugin(id));
            }
            plugins.insert(key, plugin);
        }
        self.emit(PluginLifecycleEvent::Registered(id));
        Ok(())
    }

    /// Removes a plugin, returning `true` when it was registered.
    pub fn unregister(&self, id: &str) -> bool {
        let removed = write(&self.plugins)
            .remove(&id.to_ascii_lowercase())
            .is_some();
        if removed {
            self.emit(PluginLifecycleEvent::Unregistered(id.to_owned()));
        }
        removed
    }

    /// Announces that every plugin finished initializing.
    pub fn mark_initialized(&self) {
        self.emit(PluginLifecycleEvent::Initialized);
    }

    /// Returns every registered plugin, enabled or not.
    #[must_use]
    pub fn plugins(&self) -> Vec<Arc<dyn Plugin>> {
        read(&self.plugins).values().cloned().collect()
    }

    fn emit(&self, event: PluginLifecycleEvent) {
        let Some(sender) = &self.events else {
            return;
        };
        let name = event.name();
        if sender.send(event).is_err() {
            debug!(event = name, "no lifecycle subscribers");
        }
    }
}

impl PluginRegistry for InMemoryPluginRegistry {
    fn get_plugin(&self, id: &str) -> Option<Arc<dyn Plugin>> {
        read(&self.plugins).get(&id.to_ascii_lowercase()).cloned()
    }

    fn get_plugin_by_domain(&self, domain: Domain) -> Option<Arc<dyn Plugin>> {
        read(&self.plugins)
            .values()
            .find(|plugin| plugin.domain() == Some(domain))
            .cloned()
    }

    fn enabled_plugins(&self) -> Vec<Arc<dyn Plugin>> {
        read(&self.plugins)
            .values()
            .filter(|plugin| plugin.is_enabled())
            .cloned()
            .collect()
    }

    fn subscribe(&self) -> Option<broadcast::Receiver<PluginLifecycleEvent>> {
        self.events.as_ref().map(broadcast::Sender::subscribe)
    }
}
