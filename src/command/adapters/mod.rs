//! Adapter implementations of the command ports.

mod function;
mod legacy;
pub mod memory;

pub use function::{FnHandler, handler_fn};
pub use legacy::{LegacyHandler, legacy_handler_fn, sniff_output};
pub use memory::{InMemoryGitClient, InMemoryPluginRegistry, PluginRegistrationError, StaticPlugin};
