//! Plugin contract consumed by the registry and executor.

use async_trait::async_trait;
use std::sync::Arc;
use thiserror::Error;

use super::{GitClient, HandlerError, HandlerInvocation};
use crate::command::domain::{
    CommandAddress, CommandError, CommandUsage, Domain, HandlerOutput, PluginAvailability,
};

/// A command declared by a plugin.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PluginCommand {
    /// Command name.
    pub name: String,
    /// Human-readable description.
    pub description: String,
    /// Invocation syntax; derived from the address when absent.
    pub syntax: Option<String>,
    /// Example invocations.
    pub examples: Vec<String>,
    /// Supported flags.
    pub flags: Vec<String>,
    /// Domain the command is registered under, overriding the plugin's.
    pub domain: Option<Domain>,
}

impl PluginCommand {
    /// Creates a command declaration.
    #[must_use]
    pub fn new(name: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
            syntax: None,
            examples: Vec::new(),
            flags: Vec::new(),
            domain: None,
        }
    }

    /// Sets the invocation syntax.
    #[must_use]
    pub fn with_syntax(mut self, syntax: impl Into<String>) -> Self {
        self.syntax = Some(syntax.into());
        self
    }

    /// Sets the example invocations.
    #[must_use]
    pub fn with_examples(mut self, examples: impl IntoIterator<Item = impl Into<String>>) -> Self {
        self.examples = examples.into_iter().map(Into::into).collect();
        self
    }

    /// Sets the supported flags.
    #[must_use]
    pub fn with_flags(mut self, flags: impl IntoIterator<Item = impl Into<String>>) -> Self {
        self.flags = flags.into_iter().map(Into::into).collect();
        self
    }

    /// Registers the command under a specific domain.
    #[must_use]
    pub const fn in_domain(mut self, domain: Domain) -> Self {
        self.domain = Some(domain);
        self
    }

    /// Builds usage metadata for this command at the given address.
    #[must_use]
    pub fn usage(&self, address: CommandAddress) -> CommandUsage {
        let usage = CommandUsage::new(address, &self.name, &self.description)
            .with_examples(self.examples.clone())
            .with_flags(self.flags.clone());
        match &self.syntax {
            Some(syntax) => usage.with_syntax(syntax),
            None => usage,
        }
    }
}

/// Instructions shown when a plugin cannot run commands.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SetupGuide {
    /// Heading of the setup message.
    pub title: String,
    /// Ordered steps the user should follow.
    pub steps: Vec<String>,
    /// Link to further documentation.
    pub docs_url: Option<String>,
}

impl SetupGuide {
    /// Creates a guide with the given title and steps.
    #[must_use]
    pub fn new(title: impl Into<String>, steps: impl IntoIterator<Item = impl Into<String>>) -> Self {
        Self {
            title: title.into(),
            steps: steps.into_iter().map(Into::into).collect(),
            docs_url: None,
        }
    }

    /// Sets the documentation link.
    #[must_use]
    pub fn with_docs_url(mut self, url: impl Into<String>) -> Self {
        self.docs_url = Some(url.into());
        self
    }
}

/// An integration that contributes commands.
#[async_trait]
pub trait Plugin: Send + Sync {
    /// Unique plugin identifier, used as its agent id.
    fn id(&self) -> &str;

    /// Human-readable name.
    fn display_name(&self) -> &str {
        self.id()
    }

    /// Domain the plugin serves, if any.
    fn domain(&self) -> Option<Domain> {
        None
    }

    /// Commands the plugin declares.
    fn commands(&self) -> Vec<PluginCommand>;

    /// Whether the plugin is switched on.
    fn is_enabled(&self) -> bool;

    /// Whether the plugin has finished initializing.
    fn is_initialized(&self) -> bool {
        true
    }

    /// Whether the plugin holds valid credentials.
    fn is_authenticated(&self) -> bool {
        true
    }

    /// Setup instructions shown when the plugin is unavailable.
    fn setup_guide(&self) -> Option<SetupGuide> {
        None
    }

    /// Version-control client used for context refresh.
    fn git_client(&self) -> Option<Arc<dyn GitClient>> {
        None
    }

    /// Summarizes whether the plugin can run commands.
    fn availability(&self) -> PluginAvailability {
        if !self.is_enabled() {
            PluginAvailability::Disabled
        } else if !self.is_initialized() {
            PluginAvailability::Uninitialized
        } else if !self.is_authenticated() {
            PluginAvailability::Unauthenticated
        } else {
            PluginAvailability::Ready
        }
    }

    /// Executes one of the plugin's commands.
    ///
    /// # Errors
    ///
    /// Returns [`PluginError::UnsupportedCommand`] for unknown commands and
    /// other variants when execution fails.
    async fn execute_command(&self, invocation: HandlerInvocation)
    -> Result<HandlerOutput, PluginError>;
}

/// Errors raised by plugins.
#[derive(Debug, Clone, Error)]
pub enum PluginError {
    /// The plugin does not declare the command.
    #[error("{plugin} does not support command '{command}'")]
    UnsupportedCommand {
        /// Plugin identifier.
        plugin: String,
        /// Requested command.
        command: String,
    },

    /// The plugin's handler failed.
    #[error(transparent)]
    Handler(#[from] HandlerError),

    /// Runtime failure inside the plugin.
    #[error("plugin runtime error: {0}")]
    Runtime(Arc<dyn std::error::Error + Send + Sync>),
}

impl PluginError {
    /// Wraps a runtime error raised by the plugin.
    #[must_use]
    pub fn runtime(err: impl std::error::Error + Send + Sync + 'static) -> Self {
        Self::Runtime(Arc::new(err))
    }
}

impl From<PluginError> for CommandError {
    fn from(error: PluginError) -> Self {
        match error {
            PluginError::Handler(inner) => inner.into(),
            other => Self::Execution(other.to_string()),
        }
    }
}
