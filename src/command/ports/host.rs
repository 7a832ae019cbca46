//! Handle on the host services the command service depends on.

use std::sync::Arc;

use super::{LanguageModel, PluginRegistry};
use crate::command::config::ServiceConfig;

/// Host services consumed by [`crate::command::services::CommandService`].
pub struct CoreServices<P>
where
    P: PluginRegistry,
{
    /// Source of plugins.
    pub plugin_registry: Arc<P>,
    /// Optional model for speculative heuristics.
    pub language_model: Option<Arc<dyn LanguageModel>>,
    /// Service configuration.
    pub config: ServiceConfig,
}

impl<P> CoreServices<P>
where
    P: PluginRegistry,
{
    /// Creates a handle with default configuration and no language model.
    #[must_use]
    pub fn new(plugin_registry: Arc<P>) -> Self {
        Self {
            plugin_registry,
            language_model: None,
            config: ServiceConfig::default(),
        }
    }

    /// Sets the language model.
    #[must_use]
    pub fn with_language_model(mut self, language_model: Arc<dyn LanguageModel>) -> Self {
        self.language_model = Some(language_model);
        self
    }

    /// Sets the service configuration.
    #[must_use]
    pub fn with_config(mut self, config: ServiceConfig) -> Self {
        self.config = config;
        self
    }
}

impl<P> Clone for CoreServices<P>
where
    P: PluginRegistry,
{
    fn clone(&self) -> Self {
        Self {
            plugin_registry: Arc::clone(&self.plugin_registry),
            language_model: self.language_model.clone(),
            config: self.config.clone(),
        }
    }
}
