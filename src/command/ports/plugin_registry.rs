//! Plugin source consumed by the registry and executor.

use std::sync::Arc;
use tokio::sync::broadcast;

use super::Plugin;
use crate::command::domain::Domain;

/// Lifecycle notifications emitted by a plugin registry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PluginLifecycleEvent {
    /// A plugin was registered.
    Registered(String),
    /// A plugin was unregistered.
    Unregistered(String),
    /// All plugins finished initializing.
    Initialized,
}

impl PluginLifecycleEvent {
    /// Returns the event name as emitted on the wire.
    #[must_use]
    pub const fn name(&self) -> &'static str {
        match self {
            Self::Registered(_) => "plugin-registered",
            Self::Unregistered(_) => "plugin-unregistered",
            Self::Initialized => "plugins-initialized",
        }
    }
}

/// Source of plugins and their lifecycle events.
pub trait PluginRegistry: Send + Sync + 'static {
    /// Finds a plugin by identifier, ignoring ASCII case.
    ///
    /// Agent ids arrive lowercased; implementations must match them against
    /// mixed-case plugin identifiers.
    fn get_plugin(&self, id: &str) -> Option<Arc<dyn Plugin>>;

    /// Finds the plugin serving a domain.
    fn get_plugin_by_domain(&self, domain: Domain) -> Option<Arc<dyn Plugin>>;

    /// Returns every enabled plugin.
    fn enabled_plugins(&self) -> Vec<Arc<dyn Plugin>>;

    /// Subscribes to lifecycle events.
    ///
    /// Registries that cannot emit events return `None`; the command
    /// registry then falls back to a single delayed refresh.
    fn subscribe(&self) -> Option<broadcast::Receiver<PluginLifecycleEvent>> {
        None
    }
}
