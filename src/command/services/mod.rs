//! Registry, executor, and the façade that owns them.

mod builtins;
pub mod contextual;
mod executor;
mod preferences;
mod registry;
mod service;

pub use executor::CommandExecutor;
pub use preferences::PreferenceStore;
pub use registry::{CommandRegistry, RegistryEvent};
pub use service::{CommandService, ServiceEvent};
