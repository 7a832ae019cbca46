//! Shared fixtures for in-memory command integration tests.

use std::sync::Arc;
use std::time::Duration;

use command_deck::command::{
    adapters::{InMemoryGitClient, InMemoryPluginRegistry, StaticPlugin, handler_fn},
    domain::{Domain, HandlerOutput},
    ports::{CoreServices, PluginCommand},
    services::CommandService,
};
use mockable::DefaultClock;
use rstest::fixture;

/// Service type used by the integration tests.
pub type TestService = CommandService<InMemoryPluginRegistry, DefaultClock>;

/// Provides an empty plugin registry that emits lifecycle events.
#[fixture]
pub fn plugins() -> Arc<InMemoryPluginRegistry> {
    Arc::new(InMemoryPluginRegistry::new())
}

/// Builds a service over the given plugin registry.
pub fn service_over(plugins: &Arc<InMemoryPluginRegistry>) -> TestService {
    CommandService::new(CoreServices::new(Arc::clone(plugins)), Arc::new(DefaultClock))
}

/// Git plugin backed by the given working copy.
///
/// `commit` echoes its `-m` message, `status` lists changed files, and
/// `push` reports its first argument.
pub fn git_plugin(working_copy: InMemoryGitClient) -> StaticPlugin {
    StaticPlugin::new("git")
        .with_display_name("Git")
        .in_domain(Domain::Git)
        .with_git_client(Arc::new(working_copy))
        .with_command(
            PluginCommand::new("commit", "Record changes")
                .with_syntax("@git:commit -m <message>")
                .with_flags(["-m", "--amend"]),
            handler_fn(|invocation| async move {
                let message = invocation
                    .flags
                    .get("m")
                    .and_then(serde_json::Value::as_str)
                    .unwrap_or("no message")
                    .to_owned();
                Ok(HandlerOutput::Text(format!("Committed: {message}")))
            }),
        )
        .with_command(
            PluginCommand::new("status", "Show working copy status"),
            handler_fn(|_| async { Ok(HandlerOutput::Markdown("## Clean".to_owned())) }),
        )
        .with_command(
            PluginCommand::new("push", "Push to a remote"),
            handler_fn(|invocation| async move {
                Ok(HandlerOutput::Text(format!(
                    "Pushed to {}",
                    invocation.first_arg().unwrap_or_else(|| "origin".to_owned())
                )))
            }),
        )
}

/// Polls a condition until it holds or two seconds pass.
pub async fn eventually(mut condition: impl FnMut() -> bool) -> bool {
    for _ in 0..200 {
        if condition() {
            return true;
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
    condition()
}
