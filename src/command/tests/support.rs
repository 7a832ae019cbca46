//! Shared fixtures for command unit tests.

use std::sync::Arc;
use std::time::Duration;

use crate::command::{
    adapters::{InMemoryPluginRegistry, StaticPlugin, handler_fn},
    config::RegistryConfig,
    domain::{Domain, HandlerOutput},
    ports::{CommandHandler, PluginCommand},
    services::CommandRegistry,
};

pub(super) type TestRegistry = CommandRegistry<InMemoryPluginRegistry>;

/// Handler that replies with fixed text.
pub(super) fn reply(text: &'static str) -> Arc<dyn CommandHandler> {
    Arc::new(handler_fn(move |_| async move {
        Ok(HandlerOutput::Text(text.to_owned()))
    }))
}

/// Git plugin declaring the common working-copy commands.
pub(super) fn git_plugin() -> StaticPlugin {
    ["status", "commit", "push", "pull"]
        .into_iter()
        .fold(StaticPlugin::new("git").in_domain(Domain::Git), |plugin, name| {
            plugin.with_command(
                PluginCommand::new(name, format!("Run git {name}")),
                handler_fn(move |_| async move { Ok(HandlerOutput::Text(format!("git {name}"))) }),
            )
        })
}

pub(super) fn registry_with(plugins: &Arc<InMemoryPluginRegistry>) -> Arc<TestRegistry> {
    CommandRegistry::new(Arc::clone(plugins), RegistryConfig::default())
}

/// Polls a condition until it holds or two seconds pass.
pub(super) async fn eventually(mut condition: impl FnMut() -> bool) -> bool {
    for _ in 0..200 {
        if condition() {
            return true;
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
    condition()
}
