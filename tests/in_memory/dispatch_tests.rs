//! End-to-end dispatch through the in-memory command service.

use std::sync::Arc;

use command_deck::command::{
    adapters::{InMemoryGitClient, InMemoryPluginRegistry, StaticPlugin, handler_fn},
    domain::{DisplayMode, Domain, ExecutionId, HandlerOutput},
    ports::{HandlerError, PluginCommand},
};
use rstest::rstest;
use serde_json::json;
use tokio::sync::mpsc;

use super::helpers::{TestService, git_plugin, plugins, service_over};

fn git_service(plugins: &Arc<InMemoryPluginRegistry>) -> TestService {
    plugins
        .register(Arc::new(git_plugin(InMemoryGitClient::new())))
        .expect("plugin registration should succeed");
    service_over(plugins)
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn quoted_flag_values_reach_the_handler(plugins: Arc<InMemoryPluginRegistry>) {
    let service = git_service(&plugins);

    let result = service
        .execute_command(r#"@git:commit -m "fix: login bug""#)
        .await;

    assert!(result.success);
    assert_eq!(result.content.as_deref(), Some("Committed: fix: login bug"));
    assert_eq!(result.display_mode, DisplayMode::Text);
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn markdown_output_keeps_its_display_mode(plugins: Arc<InMemoryPluginRegistry>) {
    let service = git_service(&plugins);

    let result = service.execute_command("@GIT:status").await;

    assert!(result.success);
    assert_eq!(result.display_mode, DisplayMode::Markdown);
    assert_eq!(result.content.as_deref(), Some("## Clean"));
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn positional_arguments_are_remembered(plugins: Arc<InMemoryPluginRegistry>) {
    let service = git_service(&plugins);

    service.execute_command("@git:push origin").await;
    let result = service.execute_command("@git:push upstream").await;

    assert_eq!(result.content.as_deref(), Some("Pushed to upstream"));
    assert_eq!(
        service.preferred_args("git", "push"),
        vec![vec![json!("upstream")], vec![json!("origin")]]
    );
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn typos_are_answered_with_suggestions(plugins: Arc<InMemoryPluginRegistry>) {
    let service = git_service(&plugins);

    let result = service.execute_command("@git:comit").await;

    assert!(!result.success);
    assert_eq!(
        result.suggested_next_commands.first().map(String::as_str),
        Some("@git:commit")
    );
    assert!(service.preferred_args("git", "comit").is_empty());
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn plain_prose_is_rejected_without_running_anything(plugins: Arc<InMemoryPluginRegistry>) {
    let service = git_service(&plugins);

    let result = service.execute_command("please commit my changes").await;

    assert!(!result.success);
    assert!(service.executor().history().is_empty());
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn help_lists_plugin_commands(plugins: Arc<InMemoryPluginRegistry>) {
    let service = git_service(&plugins);

    let result = service.execute_command("/help").await;
    let listing = result.message.unwrap_or_default();

    assert!(result.success);
    assert!(listing.contains("`@git:commit -m <message>`: Record changes"), "{listing}");
    assert!(listing.contains("/models"), "{listing}");
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn uninitialized_plugins_explain_themselves(plugins: Arc<InMemoryPluginRegistry>) {
    plugins
        .register(Arc::new(
            StaticPlugin::new("pocket")
                .with_display_name("Pocket")
                .in_domain(Domain::Pocket)
                .uninitialized(),
        ))
        .expect("plugin registration should succeed");
    let service = service_over(&plugins);

    let result = service.execute_command("@pocket:load widgets").await;

    assert!(!result.success);
    assert_eq!(result.display_mode, DisplayMode::Markdown);
    assert_eq!(result.error.as_deref(), Some("pocket is not initialized"));
    let data = result.data.expect("setup result should carry data");
    assert_eq!(data.get("reason"), Some(&json!("uninitialized")));
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn executions_are_recorded_in_order(plugins: Arc<InMemoryPluginRegistry>) {
    let service = git_service(&plugins);

    for text in ["@git:status", "/models", "@git:comit"] {
        service.execute_command(text).await;
    }
    let history = service.executor().history();

    let names: Vec<&str> = history
        .iter()
        .map(|record| record.command.command.as_str())
        .collect();
    assert_eq!(names, vec!["status", "models", "comit"]);
    assert!(history.iter().all(|record| record.timestamp <= chrono::Utc::now()));
    let successes: Vec<bool> = history.iter().map(|record| record.result.success).collect();
    assert_eq!(successes, vec![true, true, false]);
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn in_flight_commands_can_be_cancelled(plugins: Arc<InMemoryPluginRegistry>) {
    let (started_tx, mut started_rx) = mpsc::channel::<()>(1);
    plugins
        .register(Arc::new(StaticPlugin::new("deploy").with_command(
            PluginCommand::new("watch", "Follow a rollout"),
            handler_fn(move |invocation| {
                let started = started_tx.clone();
                async move {
                    if started.send(()).await.is_err() {
                        return Err(HandlerError::failed("test receiver dropped"));
                    }
                    invocation.cancellation.cancelled().await;
                    Ok(HandlerOutput::Text("rolled out".to_owned()))
                }
            }),
        )))
        .expect("plugin registration should succeed");
    let service = Arc::new(service_over(&plugins));
    let command = service
        .parser()
        .parse("@deploy:watch")
        .expect("command should parse");
    let id = ExecutionId::new();

    let running = {
        let service = Arc::clone(&service);
        tokio::spawn(async move { service.executor().execute_with_id(id, command).await })
    };
    started_rx.recv().await.expect("handler should start");

    assert_eq!(service.executor().pending_ids(), vec![id]);
    assert!(service.executor().cancel(id));
    let result = running.await.expect("execution task should join");

    assert!(result.is_cancelled());
    assert!(service.executor().pending_ids().is_empty());
}
