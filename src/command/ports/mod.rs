//! Port contracts for command handlers and external collaborators.

mod git;
mod handler;
mod host;
mod language_model;
mod plugin;
mod plugin_registry;

pub use git::{GitClient, GitClientError, GitClientResult};
pub use handler::{CommandHandler, HandlerError, HandlerInvocation, HandlerResult};
pub use host::CoreServices;
#[cfg(test)]
pub use language_model::MockLanguageModel;
pub use language_model::{LanguageModel, LanguageModelError};
pub use plugin::{Plugin, PluginCommand, PluginError, SetupGuide};
pub use plugin_registry::{PluginLifecycleEvent, PluginRegistry};
