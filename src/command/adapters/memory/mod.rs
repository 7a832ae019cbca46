//! In-memory adapters for tests and embedding hosts.

mod git;
mod plugin;
mod plugin_registry;

pub use git::InMemoryGitClient;
pub use plugin::StaticPlugin;
pub use plugin_registry::{InMemoryPluginRegistry, PluginRegistrationError};
