//! Plugin lifecycle and context refresh through the in-memory service.

use std::sync::Arc;
use std::time::Duration;

use command_deck::command::{
    adapters::{InMemoryGitClient, InMemoryPluginRegistry, StaticPlugin},
    config::ServiceConfig,
    domain::{BranchInfo, CommandAddress, ContextDomain, Domain},
    ports::{CoreServices, Plugin},
    services::{CommandService, ServiceEvent},
};
use mockable::DefaultClock;
use rstest::rstest;

use super::helpers::{eventually, git_plugin, plugins, service_over};

fn git_address() -> CommandAddress {
    CommandAddress::Domain(Domain::Git)
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn plugins_registered_later_become_reachable(plugins: Arc<InMemoryPluginRegistry>) {
    let service = service_over(&plugins);
    assert!(!service.registry().has_command(&git_address(), "commit"));

    plugins
        .register(Arc::new(git_plugin(InMemoryGitClient::new())))
        .expect("plugin registration should succeed");

    assert!(eventually(|| service.registry().has_command(&git_address(), "commit")).await);
    assert!(service.execute_command("@git:status").await.success);
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn unregistered_plugins_lose_their_commands(plugins: Arc<InMemoryPluginRegistry>) {
    plugins
        .register(Arc::new(git_plugin(InMemoryGitClient::new())))
        .expect("plugin registration should succeed");
    let service = service_over(&plugins);
    assert!(service.registry().has_command(&git_address(), "push"));

    assert!(plugins.unregister("git"));

    assert!(eventually(|| !service.registry().has_command(&git_address(), "push")).await);
    assert!(!service.execute_command("@git:push").await.success);
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn disabled_plugins_drop_out_after_initialization(plugins: Arc<InMemoryPluginRegistry>) {
    let git = Arc::new(git_plugin(InMemoryGitClient::new()));
    let registered: Arc<dyn Plugin> = Arc::clone(&git) as Arc<dyn Plugin>;
    plugins
        .register(registered)
        .expect("plugin registration should succeed");
    let service = service_over(&plugins);
    assert!(service.registry().has_command(&git_address(), "status"));

    git.set_enabled(false);
    plugins.mark_initialized();

    assert!(eventually(|| !service.registry().has_command(&git_address(), "status")).await);
    let result = service.execute_command("@git:status").await;
    assert!(!result.success);
    assert_eq!(result.error.as_deref(), Some("git is disabled"));
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn generated_commands_follow_the_working_copy(plugins: Arc<InMemoryPluginRegistry>) {
    let working_copy = InMemoryGitClient::new()
        .with_branch(BranchInfo::new("main").current().tracking("origin/main"))
        .with_changed_files(["src/lib.rs"]);
    plugins
        .register(Arc::new(git_plugin(working_copy.clone())))
        .expect("plugin registration should succeed");
    let service = service_over(&plugins);

    assert_eq!(service.refresh_contexts().await, vec![ContextDomain::Git]);
    let commit = service
        .generate_contextual_command("@git:commit", None)
        .await
        .expect("commit command should be generated");
    assert_eq!(commit, r#"@git:commit -m "Update lib.rs""#);
    let committed = service.execute_command(&commit).await;
    assert_eq!(committed.content.as_deref(), Some("Committed: Update lib.rs"));

    working_copy.checkout("feature/PROJ-12-login");
    service.refresh_contexts().await;

    assert_eq!(
        service.generate_contextual_command("git:push", None).await.as_deref(),
        Some("@git:push origin feature/PROJ-12-login --set-upstream")
    );
    assert_eq!(
        service.generate_contextual_command("jira:issue", None).await.as_deref(),
        Some("@jira:issue PROJ-12")
    );
    assert_eq!(service.ranked_checkout_branches(), vec!["main"]);
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn unavailable_repositories_leave_other_integrations_fresh(
    plugins: Arc<InMemoryPluginRegistry>,
) {
    plugins
        .register(Arc::new(git_plugin(InMemoryGitClient::unavailable())))
        .expect("plugin registration should succeed");
    plugins
        .register(Arc::new(StaticPlugin::new("jira").in_domain(Domain::Jira)))
        .expect("plugin registration should succeed");
    let service = service_over(&plugins);
    let mut events = service.subscribe();

    let refreshed = service.refresh_contexts().await;

    assert_eq!(refreshed, vec![ContextDomain::Jira]);
    assert_eq!(
        events.recv().await.expect("refresh should be announced"),
        ServiceEvent::ContextsUpdated {
            domains: vec![ContextDomain::Jira],
        }
    );
    assert!(service.context_snapshot().git.is_none());
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn background_refresh_fills_the_cache(plugins: Arc<InMemoryPluginRegistry>) {
    plugins
        .register(Arc::new(git_plugin(
            InMemoryGitClient::new().with_branch(BranchInfo::new("main").current()),
        )))
        .expect("plugin registration should succeed");
    let core = CoreServices::new(Arc::clone(&plugins)).with_config(
        ServiceConfig::default().with_context_refresh_interval(Duration::from_millis(20)),
    );
    let service = Arc::new(CommandService::new(core, Arc::new(DefaultClock)));

    assert!(service.start_context_refresh());
    assert!(eventually(|| service.context_snapshot().git.is_some()).await);
    assert!(service.stop_context_refresh());
    assert!(!service.stop_context_refresh());
}
