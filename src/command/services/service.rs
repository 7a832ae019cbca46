//! Command service façade.

use chrono::{DateTime, Utc};
use mockable::Clock;
use serde_json::json;
use std::sync::{Arc, Mutex, RwLock};
use std::time::Duration;
use tokio::runtime::Handle;
use tokio::sync::broadcast;
use tokio::task::AbortHandle;
use tracing::{debug, warn};

use super::contextual::{self, IssueKeyExtractor};
use super::{CommandExecutor, CommandRegistry, PreferenceStore};
use crate::command::domain::{
    CommandArgs, CommandContext, CommandPrefix, CommandResult, ContextDomain, Domain, GitContext,
    IntegrationContext,
};
use crate::command::locks::{lock, read, write};
use crate::command::parser::CommandParser;
use crate::command::ports::{CoreServices, GitClientError, Plugin, PluginRegistry};

const EVENT_CAPACITY: usize = 16;
const BUILD_PLUGIN_ID: &str = "swdp";
const MIN_REFRESH_INTERVAL: Duration = Duration::from_millis(10);

/// Notifications emitted by the service.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ServiceEvent {
    /// The context cache was refreshed.
    ContextsUpdated {
        /// Integrations whose state was refreshed.
        domains: Vec<ContextDomain>,
    },
}

#[derive(Debug, Clone)]
struct CachedIssueKey {
    key: String,
    cached_at: DateTime<Utc>,
}

/// Façade owning the parser, registry, and executor.
///
/// The service also keeps a cache of external state, synthesizes
/// ready-to-run commands from it, and remembers recently used arguments.
pub struct CommandService<P, C>
where
    P: PluginRegistry,
    C: Clock + Send + Sync + 'static,
{
    parser: CommandParser,
    registry: Arc<CommandRegistry<P>>,
    executor: CommandExecutor<P, C>,
    core: CoreServices<P>,
    clock: Arc<C>,
    issue_keys: IssueKeyExtractor,
    context_cache: RwLock<CommandContext>,
    issue_key_cache: Mutex<Option<CachedIssueKey>>,
    preferences: Mutex<PreferenceStore>,
    events: broadcast::Sender<ServiceEvent>,
    refresher: Mutex<Option<AbortHandle>>,
}

impl<P, C> CommandService<P, C>
where
    P: PluginRegistry,
    C: Clock + Send + Sync + 'static,
{
    /// Creates a service and its registry and executor.
    #[must_use]
    pub fn new(core: CoreServices<P>, clock: Arc<C>) -> Self {
        let registry = CommandRegistry::new(
            Arc::clone(&core.plugin_registry),
            core.config.registry.clone(),
        );
        let executor =
            CommandExecutor::new(Arc::clone(&registry), Arc::clone(&clock), core.config.executor);
        let preferences = PreferenceStore::new(core.config.preference_capacity);
        let (events, _) = broadcast::channel(EVENT_CAPACITY);
        Self {
            parser: CommandParser::new(),
            registry,
            executor,
            core,
            clock,
            issue_keys: IssueKeyExtractor::new(),
            context_cache: RwLock::new(CommandContext::default()),
            issue_key_cache: Mutex::new(None),
            preferences: Mutex::new(preferences),
            events,
            refresher: Mutex::new(None),
        }
    }

    /// The parser.
    #[must_use]
    pub const fn parser(&self) -> &CommandParser {
        &self.parser
    }

    /// The registry.
    #[must_use]
    pub const fn registry(&self) -> &Arc<CommandRegistry<P>> {
        &self.registry
    }

    /// The executor.
    #[must_use]
    pub const fn executor(&self) -> &CommandExecutor<P, C> {
        &self.executor
    }

    /// Subscribes to service events.
    #[must_use]
    pub fn subscribe(&self) -> broadcast::Receiver<ServiceEvent> {
        self.events.subscribe()
    }

    /// Parses and executes text.
    ///
    /// Parse failures return the same [`CommandResult`] envelope as
    /// execution failures. Successful `@` commands record their arguments
    /// as a preference.
    pub async fn execute_command(&self, text: &str) -> CommandResult {
        let parsed = self.parser.parse_with_suggestions(text);
        let Some(command) = parsed.command.clone() else {
            return parsed.into_failure_result();
        };

        let is_plugin_command = command.prefix == CommandPrefix::At;
        let plugin = command.agent_id.clone();
        let name = command.command.clone();
        let args = command.args.clone();

        let result = self.executor.execute(command).await;
        if result.success && is_plugin_command {
            self.update_preference(&plugin, &name, args);
        }
        result
    }

    /// Records arguments as the most recent for a plugin command.
    pub fn update_preference(&self, plugin: &str, command: &str, args: CommandArgs) -> bool {
        lock(&self.preferences).record(plugin, command, args)
    }

    /// Recently used arguments for a plugin command, most recent first.
    #[must_use]
    pub fn preferred_args(&self, plugin: &str, command: &str) -> Vec<CommandArgs> {
        lock(&self.preferences).recent(plugin, command)
    }

    /// Copy of the cached context.
    #[must_use]
    pub fn context_snapshot(&self) -> CommandContext {
        read(&self.context_cache).clone()
    }

    /// Records the file open in the editor.
    pub fn set_active_file(&self, file: Option<String>) {
        write(&self.context_cache).active_file = file;
    }

    /// Refreshes every integration's cached state.
    ///
    /// Each integration is refreshed independently; a failure is logged and
    /// leaves the others untouched. Returns the integrations refreshed.
    pub async fn refresh_contexts(&self) -> Vec<ContextDomain> {
        let mut refreshed = Vec::new();
        for domain in ContextDomain::ALL {
            match self.refresh_domain(domain).await {
                Ok(true) => refreshed.push(domain),
                Ok(false) => {}
                Err(error) => warn!(%domain, %error, "context refresh failed"),
            }
        }

        debug!(domains = ?refreshed, "contexts refreshed");
        let event = ServiceEvent::ContextsUpdated {
            domains: refreshed.clone(),
        };
        if self.events.send(event).is_err() {
            debug!("no service subscribers");
        }
        refreshed
    }

    async fn refresh_domain(&self, domain: ContextDomain) -> Result<bool, GitClientError> {
        let plugins = &self.core.plugin_registry;
        let now = self.clock.utc();
        match domain {
            ContextDomain::Git => self.refresh_git().await,
            ContextDomain::Jira => {
                let Some(plugin) = plugins.get_plugin_by_domain(Domain::Jira) else {
                    return Ok(false);
                };
                let mut snapshot = integration_snapshot(plugin.as_ref(), now);
                snapshot.current_item = self.cached_issue_key();
                write(&self.context_cache).jira = Some(snapshot);
                Ok(true)
            }
            ContextDomain::Build => {
                let Some(plugin) = plugins.get_plugin(BUILD_PLUGIN_ID) else {
                    return Ok(false);
                };
                write(&self.context_cache).build = Some(integration_snapshot(plugin.as_ref(), now));
                Ok(true)
            }
            ContextDomain::Pocket => {
                let Some(plugin) = plugins.get_plugin_by_domain(Domain::Pocket) else {
                    return Ok(false);
                };
                write(&self.context_cache).pocket =
                    Some(integration_snapshot(plugin.as_ref(), now));
                Ok(true)
            }
        }
    }

    async fn refresh_git(&self) -> Result<bool, GitClientError> {
        let Some(client) = self
            .core
            .plugin_registry
            .get_plugin_by_domain(Domain::Git)
            .and_then(|plugin| plugin.git_client())
        else {
            return Ok(false);
        };

        let state = GitContext {
            branches: client.branches().await?,
            changed_files: client.changed_files().await?,
            user_name: client.user_name().await?,
            remote_url: client.remote_url().await?,
            recent_commits: client
                .recent_commit_messages(self.core.config.recent_commit_limit)
                .await?,
        };
        write(&self.context_cache).git = Some(state);
        Ok(true)
    }

    /// Starts refreshing the context cache on the configured interval.
    ///
    /// The first refresh runs immediately. Returns `false` when no Tokio
    /// runtime is available.
    pub fn start_context_refresh(self: &Arc<Self>) -> bool {
        let Ok(runtime) = Handle::try_current() else {
            warn!("no async runtime; context refresh not started");
            return false;
        };
        let weak = Arc::downgrade(self);
        let period = self
            .core
            .config
            .context_refresh_interval
            .max(MIN_REFRESH_INTERVAL);
        let task = runtime.spawn(async move {
            let mut ticker = tokio::time::interval(period);
            loop {
                ticker.tick().await;
                let Some(service) = weak.upgrade() else {
                    break;
                };
                service.refresh_contexts().await;
            }
        });
        if let Some(previous) = lock(&self.refresher).replace(task.abort_handle()) {
            previous.abort();
        }
        true
    }

    /// Stops the background refresh, returning `true` when it was running.
    pub fn stop_context_refresh(&self) -> bool {
        lock(&self.refresher).take().is_some_and(|task| {
            task.abort();
            true
        })
    }

    /// Synthesizes a ready-to-run command for the pattern.
    ///
    /// Uses the supplied context, or the cached one when `None`. Issue keys
    /// come from the branch name, then a recently cached key, then a
    /// time-bounded language-model guess over recent commits, and finally
    /// the commit-message patterns.
    pub async fn generate_contextual_command(
        &self,
        base: &str,
        context: Option<&CommandContext>,
    ) -> Option<String> {
        let snapshot = context.cloned().unwrap_or_else(|| self.context_snapshot());
        let key = contextual::template_key(base);
        if key == "jira:issue" {
            let issue_key = self.resolve_issue_key(&snapshot).await?;
            return contextual::render(&key, json!({ "key": issue_key }));
        }
        contextual::generate_contextual_command(&key, &snapshot, &*self.clock)
    }

    /// Suggests ready-to-run commands from the cached context.
    #[must_use]
    pub fn suggest_commands(&self, limit: usize) -> Vec<String> {
        contextual::suggest_commands(&self.context_snapshot(), limit, &*self.clock)
    }

    /// Checkout candidates from the cached context, most likely first.
    #[must_use]
    pub fn ranked_checkout_branches(&self) -> Vec<String> {
        read(&self.context_cache)
            .git
            .as_ref()
            .map(|state| contextual::rank_checkout_branches(&state.branches))
            .unwrap_or_default()
    }

    async fn resolve_issue_key(&self, context: &CommandContext) -> Option<String> {
        if let Some(key) = context
            .current_branch_name()
            .and_then(|branch| self.issue_keys.from_branch(branch))
        {
            self.cache_issue_key(&key);
            return Some(key);
        }

        if let Some(key) = self.cached_issue_key() {
            return Some(key);
        }

        let commits: Vec<String> = context
            .git
            .as_ref()
            .map(|state| {
                state
                    .recent_commits
                    .iter()
                    .take(self.core.config.recent_commit_limit)
                    .cloned()
                    .collect()
            })
            .unwrap_or_default();
        if commits.is_empty() {
            return None;
        }

        let key = match self.speculative_issue_key(&commits).await {
            Some(key) => key,
            None => self.issue_keys.from_commits(&commits)?,
        };
        self.cache_issue_key(&key);
        Some(key)
    }

    async fn speculative_issue_key(&self, commits: &[String]) -> Option<String> {
        let model = self.core.language_model.as_ref()?;
        let prompt = contextual::extraction_prompt(commits);
        let timeout = self.core.config.speculative_timeout;
        match tokio::time::timeout(timeout, model.complete(&prompt)).await {
            Ok(Ok(response)) => self.issue_keys.from_model_response(&response),
            Ok(Err(error)) => {
                warn!(%error, "issue key extraction by language model failed");
                None
            }
            Err(_) => {
                warn!(
                    timeout_ms = u64::try_from(timeout.as_millis()).unwrap_or(u64::MAX),
                    "issue key extraction by language model timed out"
                );
                None
            }
        }
    }

    fn cached_issue_key(&self) -> Option<String> {
        let now = self.clock.utc();
        let ttl = self.core.config.issue_key_ttl;
        lock(&self.issue_key_cache)
            .as_ref()
            .filter(|entry| {
                now.signed_duration_since(entry.cached_at)
                    .to_std()
                    .is_ok_and(|age| age < ttl)
            })
            .map(|entry| entry.key.clone())
    }

    fn cache_issue_key(&self, key: &str) {
        *lock(&self.issue_key_cache) = Some(CachedIssueKey {
            key: key.to_owned(),
            cached_at: self.clock.utc(),
        });
    }
}

impl<P, C> Drop for CommandService<P, C>
where
    P: PluginRegistry,
    C: Clock + Send + Sync + 'static,
{
    fn drop(&mut self) {
        if let Some(task) = lock(&self.refresher).take() {
            task.abort();
        }
    }
}

fn integration_snapshot(plugin: &dyn Plugin, now: DateTime<Utc>) -> IntegrationContext {
    IntegrationContext::new(plugin.availability().is_ready(), now)
}
