//! Given steps for command dispatch BDD scenarios.

use std::sync::Arc;

use super::world::DispatchWorld;
use command_deck::command::{
    adapters::{StaticPlugin, handler_fn},
    domain::{Domain, HandlerOutput},
    ports::{PluginCommand, SetupGuide},
};
use eyre::WrapErr;
use rstest_bdd_macros::given;

fn git_plugin() -> StaticPlugin {
    StaticPlugin::new("git")
        .in_domain(Domain::Git)
        .with_command(
            PluginCommand::new("commit", "Record changes").with_flags(["-m"]),
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
            handler_fn(|_| async { Ok(HandlerOutput::Text("clean".to_owned())) }),
        )
        .with_command(
            PluginCommand::new("push", "Push to a remote"),
            handler_fn(|invocation| async move {
                Ok(HandlerOutput::Text(format!(
                    "Pushed to {}",
                    invocation.first_arg().unwrap_or_default()
                )))
            }),
        )
}

#[given("a git plugin is installed")]
fn git_plugin_installed(world: &mut DispatchWorld) -> Result<(), eyre::Report> {
    world
        .plugins
        .register(Arc::new(git_plugin()))
        .wrap_err("install git plugin for scenario")
}

#[given(r#"the jira plugin "{id}" is installed without credentials"#)]
fn jira_plugin_without_credentials(
    world: &mut DispatchWorld,
    id: String,
) -> Result<(), eyre::Report> {
    let plugin = StaticPlugin::new(id)
        .with_display_name("Jira")
        .in_domain(Domain::Jira)
        .unauthenticated()
        .with_setup_guide(SetupGuide::new(
            "Connect Jira",
            ["Create an API token", "Paste it in the plugin settings"],
        ));
    world
        .plugins
        .register(Arc::new(plugin))
        .wrap_err("install jira plugin for scenario")
}
