//! Tests for command execution, cancellation, and history.

use mockable::DefaultClock;
use rstest::{fixture, rstest};
use serde_json::json;
use std::sync::Arc;
use tokio::sync::mpsc;

use super::support::{git_plugin, registry_with, reply};
use crate::command::{
    adapters::{InMemoryPluginRegistry, StaticPlugin, handler_fn, legacy_handler_fn},
    config::ExecutorConfig,
    domain::{Command, DisplayMode, Domain, ExecutionId, HandlerOutput},
    parser::CommandParser,
    ports::{CommandHandler, HandlerError, PluginCommand, SetupGuide},
    services::CommandExecutor,
};

type TestExecutor = CommandExecutor<InMemoryPluginRegistry, DefaultClock>;

#[fixture]
fn clock() -> DefaultClock {
    DefaultClock
}

fn executor_with(plugins: StaticPlugin, clock: DefaultClock) -> TestExecutor {
    let registry = Arc::new(InMemoryPluginRegistry::new());
    registry
        .register(Arc::new(plugins))
        .expect("plugin registration should succeed");
    CommandExecutor::new(registry_with(&registry), Arc::new(clock), ExecutorConfig::default())
}

fn parse(text: &str) -> Command {
    CommandParser::new()
        .parse(text)
        .unwrap_or_else(|| panic!("'{text}' should parse"))
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn runs_domain_plugin_commands(clock: DefaultClock) {
    let executor = executor_with(git_plugin(), clock);

    let result = executor.execute(parse("@git:status")).await;

    assert!(result.success);
    assert_eq!(result.content.as_deref(), Some("git status"));
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn unknown_domain_command_suggests_siblings(clock: DefaultClock) {
    let executor = executor_with(git_plugin(), clock);

    let result = executor.execute(parse("@git:comit")).await;

    assert!(!result.success);
    assert!(!result.suggested_next_commands.is_empty());
    assert!(result.suggested_next_commands.len() <= 3);
    assert_eq!(
        result.suggested_next_commands.first().map(String::as_str),
        Some("@git:commit")
    );
    assert!(
        result
            .suggested_next_commands
            .iter()
            .all(|suggestion| suggestion.starts_with("@git:"))
    );
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn cancelled_execution_settles_as_cancelled(clock: DefaultClock) {
    let (started_tx, mut started_rx) = mpsc::channel::<()>(1);
    let plugin = StaticPlugin::new("slow").with_command(
        PluginCommand::new("wait", "Waits until cancelled"),
        handler_fn(move |invocation| {
            let started = started_tx.clone();
            async move {
                if started.send(()).await.is_err() {
                    return Err(HandlerError::failed("test receiver dropped"));
                }
                invocation.cancellation.cancelled().await;
                Ok(HandlerOutput::Text("finished".to_owned()))
            }
        }),
    );
    let executor = Arc::new(executor_with(plugin, clock));
    let id = ExecutionId::new();

    let running = {
        let executor = Arc::clone(&executor);
        tokio::spawn(async move { executor.execute_with_id(id, parse("@slow:wait")).await })
    };
    started_rx.recv().await.expect("handler should start");
    assert!(executor.is_pending(id));

    assert!(executor.cancel(id));
    let result = running.await.expect("execution task should join");

    assert!(result.is_cancelled());
    assert!(!executor.is_pending(id));
    assert!(!executor.cancel(id));
    assert_eq!(executor.history().len(), 1);
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn cancel_all_reports_pending_count(clock: DefaultClock) {
    let (started_tx, mut started_rx) = mpsc::channel::<()>(2);
    let plugin = StaticPlugin::new("slow").with_command(
        PluginCommand::new("wait", "Waits until cancelled"),
        handler_fn(move |invocation| {
            let started = started_tx.clone();
            async move {
                if started.send(()).await.is_err() {
                    return Err(HandlerError::failed("test receiver dropped"));
                }
                invocation.cancellation.cancelled().await;
                Ok(HandlerOutput::Empty)
            }
        }),
    );
    let executor = Arc::new(executor_with(plugin, clock));

    let tasks: Vec<_> = (0..2)
        .map(|_| {
            let executor = Arc::clone(&executor);
            tokio::spawn(async move { executor.execute(parse("@slow:wait")).await })
        })
        .collect();
    for _ in 0..2 {
        started_rx.recv().await.expect("handler should start");
    }

    assert_eq!(executor.pending_ids().len(), 2);
    assert_eq!(executor.cancel_all(), 2);
    for task in tasks {
        assert!(task.await.expect("execution task should join").is_cancelled());
    }
    assert!(executor.pending_ids().is_empty());
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn unknown_ids_are_not_cancelled(clock: DefaultClock) {
    let executor = executor_with(git_plugin(), clock);
    assert!(!executor.cancel(ExecutionId::new()));
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn handler_errors_keep_their_message(clock: DefaultClock) {
    let plugin = StaticPlugin::new("tools").with_command(
        PluginCommand::new("fail", "Always fails"),
        handler_fn(|_| async { Err(HandlerError::failed("disk full")) }),
    );
    let executor = executor_with(plugin, clock);

    let result = executor.execute(parse("@tools:fail")).await;

    assert!(!result.success);
    assert_eq!(result.error.as_deref(), Some("disk full"));
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn unauthenticated_plugin_returns_setup_guidance(clock: DefaultClock) {
    let plugin = StaticPlugin::new("jira-cloud")
        .with_display_name("Jira")
        .in_domain(Domain::Jira)
        .unauthenticated()
        .with_setup_guide(
            SetupGuide::new("Connect Jira", ["Create an API token", "Paste it in settings"])
                .with_docs_url("https://example.test/jira"),
        );
    let executor = executor_with(plugin, clock);

    let result = executor.execute(parse("@jira:issue PROJ-1")).await;
    let content = result.content.clone().unwrap_or_default();

    assert!(!result.success);
    assert_eq!(result.display_mode, DisplayMode::Markdown);
    assert_eq!(result.error.as_deref(), Some("jira-cloud is not authenticated"));
    assert!(content.contains("## Connect Jira"), "{content}");
    assert!(content.contains("1. Create an API token"), "{content}");
    assert!(content.contains("https://example.test/jira"), "{content}");
    let data = result.data.expect("setup result should carry data");
    assert_eq!(data.get("type"), Some(&json!("plugin_setup_required")));
    assert_eq!(data.get("reason"), Some(&json!("unauthenticated")));
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn disabled_agent_plugin_gets_default_guide(clock: DefaultClock) {
    let plugin = StaticPlugin::new("swdp")
        .with_command(PluginCommand::new("build", "Build"), reply_handler())
        .disabled();
    let executor = executor_with(plugin, clock);

    let result = executor.execute(parse("@swdp:build")).await;

    assert!(!result.success);
    assert_eq!(result.error.as_deref(), Some("swdp is disabled"));
    assert!(
        result
            .content
            .unwrap_or_default()
            .contains("Enable swdp in your settings.")
    );
}

fn reply_handler() -> impl CommandHandler {
    handler_fn(|_| async { Ok(HandlerOutput::Text("built".to_owned())) })
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn unknown_internal_command_points_at_help(clock: DefaultClock) {
    let executor = executor_with(git_plugin(), clock);

    let result = executor.execute(parse("/nonsense")).await;

    assert!(!result.success);
    assert_eq!(result.suggested_next_commands, vec!["/help".to_owned()]);
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn internal_commands_resolve_with_or_without_slash(clock: DefaultClock) {
    let executor = executor_with(git_plugin(), clock);

    assert!(executor.execute(parse("/help")).await.success);
    assert!(executor.execute(parse("/models")).await.success);
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn parse_failures_short_circuit(clock: DefaultClock) {
    let executor = executor_with(git_plugin(), clock);

    let result = executor.execute_from_string("@git:").await;

    assert!(!result.success);
    assert!(!result.suggested_next_commands.is_empty());
    assert!(executor.history().is_empty());
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn sub_commands_prefer_qualified_handlers(clock: DefaultClock) {
    let executor = executor_with(git_plugin(), clock);
    let registry = executor.registry();
    registry.register_domain_command(Domain::Git, "stash:pop", reply("popped"));
    registry.register_domain_command(
        Domain::Git,
        "stash",
        Arc::new(handler_fn(|invocation| async move {
            Ok(HandlerOutput::Text(format!("stash {}", invocation.first_arg().unwrap_or_default())))
        })),
    );

    let popped = executor.execute(parse("@git:stash:pop")).await;
    let dropped = executor.execute(parse("@git:stash:drop")).await;

    assert_eq!(popped.content.as_deref(), Some("popped"));
    assert_eq!(dropped.content.as_deref(), Some("stash drop"));
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn plugin_declared_sub_commands_reach_the_plugin(clock: DefaultClock) {
    let plugin = StaticPlugin::new("git").in_domain(Domain::Git).with_command(
        PluginCommand::new("stash:pop", "Apply and drop the latest stash"),
        handler_fn(|invocation| async move {
            Ok(HandlerOutput::Text(format!("ran {}", invocation.command)))
        }),
    );
    let executor = executor_with(plugin, clock);

    let result = executor.execute(parse("@git:stash:pop")).await;

    assert!(result.success, "{result:?}");
    assert_eq!(result.content.as_deref(), Some("ran stash:pop"));
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn mixed_case_plugin_ids_still_check_availability(clock: DefaultClock) {
    let plugin = StaticPlugin::new("MyTool")
        .unauthenticated()
        .with_command(
            PluginCommand::new("run", "Run the tool"),
            handler_fn(|_| async { Ok(HandlerOutput::Text("ran anyway".to_owned())) }),
        );
    let executor = executor_with(plugin, clock);

    let result = executor.execute(parse("@MyTool:run")).await;

    assert!(!result.success);
    assert_eq!(result.error.as_deref(), Some("MyTool is not authenticated"));
    let data = result.data.expect("setup result should carry data");
    assert_eq!(data.get("type"), Some(&json!("plugin_setup_required")));
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn legacy_handlers_are_normalised(clock: DefaultClock) {
    let executor = executor_with(git_plugin(), clock);
    executor.registry().register_agent_command(
        "legacy",
        "report",
        Arc::new(legacy_handler_fn(|_| async {
            Ok(json!({ "content": "## Done" }))
        })),
    );

    let result = executor.execute(parse("@legacy:report")).await;

    assert!(result.success);
    assert_eq!(result.display_mode, DisplayMode::Markdown);
    assert_eq!(result.content.as_deref(), Some("## Done"));
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn history_is_bounded(clock: DefaultClock) {
    let registry = Arc::new(InMemoryPluginRegistry::new());
    let executor = CommandExecutor::new(
        registry_with(&registry),
        Arc::new(clock),
        ExecutorConfig::with_history_capacity(2),
    );

    for text in ["/help", "/models", "/debug"] {
        executor.execute(parse(text)).await;
    }
    let history = executor.history();

    assert_eq!(history.len(), 2);
    assert_eq!(
        history.last().map(|record| record.command.command.as_str()),
        Some("debug")
    );
}
