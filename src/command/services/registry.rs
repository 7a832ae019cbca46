//! Command registry keyed by agent and by domain.

use async_trait::async_trait;
use std::collections::BTreeMap;
use std::sync::{Arc, Mutex, RwLock, Weak};
use tokio::runtime::Handle;
use tokio::sync::broadcast;
use tokio::sync::broadcast::error::RecvError;
use tokio::task::AbortHandle;
use tracing::{debug, info, warn};

use super::builtins::{self, ModelSelection};
use super::contextual;
use crate::command::config::RegistryConfig;
use crate::command::domain::{
    CommandAddress, CommandArgs, CommandContext, CommandError, CommandFlags, CommandResult,
    CommandUsage, Domain, edit_distance,
};
use crate::command::locks::{lock, read, write};
use crate::command::ports::{
    CommandHandler, HandlerError, HandlerInvocation, HandlerResult, Plugin, PluginError,
    PluginLifecycleEvent, PluginRegistry,
};

const EVENT_CAPACITY: usize = 64;
const MAX_SUGGESTIONS: usize = 3;
const MAX_SUGGESTION_DISTANCE: usize = 3;

type HandlerMap = BTreeMap<String, Arc<dyn CommandHandler>>;
type UsageMap = BTreeMap<String, CommandUsage>;

/// Notifications emitted when the registry changes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RegistryEvent {
    /// A domain command was registered.
    CommandRegistered {
        /// Domain the command belongs to.
        domain: Domain,
        /// Command name.
        command: String,
    },
    /// An agent command was registered.
    AgentCommandRegistered {
        /// Agent the command belongs to.
        agent_id: String,
        /// Command name.
        command: String,
    },
    /// The tables were rebuilt from the plugin set.
    CommandsChanged {
        /// Number of plugin commands registered by the rebuild.
        count: usize,
    },
}

/// The four handler and usage maps.
///
/// Tables are immutable once published; changes build a new value and swap
/// it in, so readers never observe a partial rebuild.
#[derive(Clone, Default)]
pub(crate) struct CommandTables {
    agent_handlers: BTreeMap<String, HandlerMap>,
    domain_handlers: BTreeMap<Domain, HandlerMap>,
    agent_usage: BTreeMap<String, UsageMap>,
    domain_usage: BTreeMap<Domain, UsageMap>,
}

impl CommandTables {
    /// Inserts a handler, rejecting duplicates. Usage is optional so aliases
    /// stay out of listings.
    pub(crate) fn insert(
        &mut self,
        address: &CommandAddress,
        command: &str,
        handler: Arc<dyn CommandHandler>,
        usage: Option<CommandUsage>,
    ) -> bool {
        match address {
            CommandAddress::Agent(agent) => insert_into(
                &mut self.agent_handlers,
                &mut self.agent_usage,
                agent.clone(),
                command,
                handler,
                usage,
            ),
            CommandAddress::Domain(domain) => insert_into(
                &mut self.domain_handlers,
                &mut self.domain_usage,
                *domain,
                command,
                handler,
                usage,
            ),
        }
    }

    fn handlers(&self, address: &CommandAddress) -> Option<&HandlerMap> {
        match address {
            CommandAddress::Agent(agent) => self.agent_handlers.get(agent),
            CommandAddress::Domain(domain) => self.domain_handlers.get(domain),
        }
    }

    /// Finds a handler. Core lookups accept the name with or without `/`.
    pub(crate) fn handler(
        &self,
        address: &CommandAddress,
        command: &str,
    ) -> Option<Arc<dyn CommandHandler>> {
        let handlers = self.handlers(address)?;
        let exact = handlers.get(command);
        let alternate = || {
            if !address.is_core() {
                return None;
            }
            match command.strip_prefix('/') {
                Some(bare) => handlers.get(bare),
                None => handlers.get(&format!("/{command}")),
            }
        };
        exact.or_else(alternate).cloned()
    }

    pub(crate) fn command_names(&self, address: &CommandAddress) -> Vec<String> {
        self.handlers(address)
            .map(|handlers| handlers.keys().cloned().collect())
            .unwrap_or_default()
    }

    pub(crate) fn usages(&self, address: &CommandAddress) -> Vec<CommandUsage> {
        let usages = match address {
            CommandAddress::Agent(agent) => self.agent_usage.get(agent),
            CommandAddress::Domain(domain) => self.domain_usage.get(domain),
        };
        usages
            .map(|entries| entries.values().cloned().collect())
            .unwrap_or_default()
    }

    /// Usage for every command: domains first, then agents.
    pub(crate) fn all_usages(&self) -> Vec<CommandUsage> {
        self.domain_usage
            .values()
            .chain(self.agent_usage.values())
            .flat_map(|entries| entries.values().cloned())
            .collect()
    }

    pub(crate) fn agent_ids(&self) -> Vec<String> {
        self.agent_handlers.keys().cloned().collect()
    }

    pub(crate) fn domains(&self) -> Vec<Domain> {
        self.domain_handlers.keys().copied().collect()
    }

    pub(crate) fn handler_count(&self) -> usize {
        self.agent_handlers
            .values()
            .chain(self.domain_handlers.values())
            .map(BTreeMap::len)
            .sum()
    }

    /// Commands in the namespace within edit distance three, closest first.
    fn suggestions(&self, address: &CommandAddress, command: &str) -> Vec<String> {
        let mut scored: Vec<(usize, String)> = self
            .command_names(address)
            .into_iter()
            .map(|name| (edit_distance(command, &name), name))
            .filter(|(distance, _)| *distance <= MAX_SUGGESTION_DISTANCE)
            .collect();
        scored.sort();

        let mut suggestions: Vec<String> = Vec::with_capacity(MAX_SUGGESTIONS);
        for (_, name) in scored {
            let qualified = address.qualify(&name);
            if !suggestions.contains(&qualified) {
                suggestions.push(qualified);
            }
            if suggestions.len() == MAX_SUGGESTIONS {
                break;
            }
        }
        suggestions
    }
}

fn insert_into<K: Ord + Clone>(
    handlers: &mut BTreeMap<K, HandlerMap>,
    usages: &mut BTreeMap<K, UsageMap>,
    key: K,
    command: &str,
    handler: Arc<dyn CommandHandler>,
    usage: Option<CommandUsage>,
) -> bool {
    let entries = handlers.entry(key.clone()).or_default();
    if entries.contains_key(command) {
        return false;
    }
    entries.insert(command.to_owned(), handler);
    if let Some(metadata) = usage {
        usages
            .entry(key)
            .or_default()
            .insert(command.to_owned(), metadata);
    }
    true
}

/// Holder of the published tables, shared with the built-in commands.
#[derive(Default)]
pub(crate) struct CommandCatalog {
    tables: RwLock<Arc<CommandTables>>,
}

impl CommandCatalog {
    pub(crate) fn snapshot(&self) -> Arc<CommandTables> {
        Arc::clone(&read(&self.tables))
    }

    fn update<T>(&self, change: impl FnOnce(&mut CommandTables) -> T) -> T {
        let mut published = write(&self.tables);
        change(Arc::make_mut(&mut *published))
    }

    fn replace(&self, tables: CommandTables) {
        *write(&self.tables) = Arc::new(tables);
    }
}

/// Adapts a plugin's declared command to the handler contract.
struct PluginCommandHandler {
    plugin: Arc<dyn Plugin>,
}

#[async_trait]
impl CommandHandler for PluginCommandHandler {
    async fn handle(&self, invocation: HandlerInvocation) -> HandlerResult {
        self.plugin
            .execute_command(invocation)
            .await
            .map_err(|error| match error {
                PluginError::Handler(inner) => inner,
                other => HandlerError::Failed(other.to_string()),
            })
    }
}

/// Stores handlers and usage metadata under agent and domain addresses.
///
/// The registry rebuilds itself from the enabled plugin set on every plugin
/// lifecycle event. When the plugin registry cannot emit events, a single
/// delayed refresh runs instead.
pub struct CommandRegistry<P>
where
    P: PluginRegistry,
{
    plugins: Arc<P>,
    config: RegistryConfig,
    catalog: Arc<CommandCatalog>,
    models: Arc<ModelSelection>,
    events: broadcast::Sender<RegistryEvent>,
    watcher: Mutex<Option<AbortHandle>>,
}

impl<P> CommandRegistry<P>
where
    P: PluginRegistry,
{
    /// Creates a registry, loads the built-in and plugin commands, and starts
    /// watching plugin lifecycle events when a Tokio runtime is available.
    #[must_use]
    pub fn new(plugins: Arc<P>, config: RegistryConfig) -> Arc<Self> {
        let (events, _) = broadcast::channel(EVENT_CAPACITY);
        let models = Arc::new(ModelSelection::new(
            config.available_models.clone(),
            config.default_model.clone(),
        ));
        let registry = Arc::new(Self {
            plugins,
            config,
            catalog: Arc::default(),
            models,
            events,
            watcher: Mutex::new(None),
        });
        registry.refresh_commands();
        Self::watch_plugin_lifecycle(&registry);
        registry
    }

    fn watch_plugin_lifecycle(registry: &Arc<Self>) {
        let Ok(runtime) = Handle::try_current() else {
            debug!("no async runtime; plugin lifecycle events are not observed");
            return;
        };
        let weak = Arc::downgrade(registry);
        let task = match registry.plugins.subscribe() {
            Some(receiver) => runtime.spawn(Self::follow_lifecycle(receiver, weak)),
            None => {
                let delay = registry.config.fallback_poll_delay;
                runtime.spawn(async move {
                    tokio::time::sleep(delay).await;
                    if let Some(live) = weak.upgrade() {
                        live.refresh_commands();
                    }
                })
            }
        };
        *lock(&registry.watcher) = Some(task.abort_handle());
    }

    async fn follow_lifecycle(
        mut receiver: broadcast::Receiver<PluginLifecycleEvent>,
        registry: Weak<Self>,
    ) {
        loop {
            match receiver.recv().await {
                Ok(event) => debug!(event = event.name(), "plugin lifecycle event"),
                Err(RecvError::Lagged(skipped)) => {
                    debug!(skipped, "plugin lifecycle events lagged");
                }
                Err(RecvError::Closed) => break,
            }
            let Some(live) = registry.upgrade() else {
                break;
            };
            live.refresh_commands();
        }
    }

    /// Rebuilds every table from the built-ins and the enabled plugins, then
    /// publishes the result in one swap.
    ///
    /// Returns the number of plugin commands registered. Commands registered
    /// individually since the last rebuild are discarded.
    pub fn refresh_commands(&self) -> usize {
        let mut tables = CommandTables::default();
        builtins::install(&mut tables, &Arc::downgrade(&self.catalog), &self.models);

        let mut count = 0_usize;
        for plugin in self.plugins.enabled_plugins() {
            for declared in plugin.commands() {
                let address = declared
                    .domain
                    .or_else(|| plugin.domain())
                    .map_or_else(
                        || CommandAddress::Agent(plugin.id().to_ascii_lowercase()),
                        CommandAddress::Domain,
                    );
                let handler: Arc<dyn CommandHandler> = Arc::new(PluginCommandHandler {
                    plugin: Arc::clone(&plugin),
                });
                let usage = declared.usage(address.clone());
                if tables.insert(&address, &declared.name, handler, Some(usage)) {
                    count += 1;
                } else {
                    warn!(
                        plugin = plugin.id(),
                        command = %address.qualify(&declared.name),
                        "duplicate plugin command ignored"
                    );
                }
            }
        }

        self.catalog.replace(tables);
        info!(count, "command registry rebuilt");
        self.emit(RegistryEvent::CommandsChanged { count });
        count
    }

    /// Registers a handler with usage metadata under the usage's address.
    ///
    /// The first registration wins: a duplicate logs a warning and returns
    /// `false`, leaving the original handler active.
    pub fn register_with_usage(&self, usage: CommandUsage, handler: Arc<dyn CommandHandler>) -> bool {
        let address = usage.address.clone();
        let command = usage.command.clone();
        let inserted = self
            .catalog
            .update(|tables| tables.insert(&address, &command, handler, Some(usage)));
        if !inserted {
            warn!(command = %address.qualify(&command), "duplicate command registration rejected");
            return false;
        }

        self.emit(match address {
            CommandAddress::Domain(domain) => RegistryEvent::CommandRegistered { domain, command },
            CommandAddress::Agent(agent_id) => {
                RegistryEvent::AgentCommandRegistered { agent_id, command }
            }
        });
        true
    }

    /// Registers a handler at an address with empty usage metadata.
    pub fn register(
        &self,
        address: CommandAddress,
        command: &str,
        handler: Arc<dyn CommandHandler>,
    ) -> bool {
        self.register_with_usage(CommandUsage::new(address, command, ""), handler)
    }

    /// Registers a domain command.
    pub fn register_domain_command(
        &self,
        domain: Domain,
        command: &str,
        handler: Arc<dyn CommandHandler>,
    ) -> bool {
        self.register(CommandAddress::Domain(domain), command, handler)
    }

    /// Registers an agent command.
    pub fn register_agent_command(
        &self,
        agent_id: &str,
        command: &str,
        handler: Arc<dyn CommandHandler>,
    ) -> bool {
        self.register(
            CommandAddress::Agent(agent_id.trim().to_ascii_lowercase()),
            command,
            handler,
        )
    }

    /// Registers a `/`-prefixed command under the `core` agent.
    pub fn register_system_command(
        &self,
        command: &str,
        description: &str,
        handler: Arc<dyn CommandHandler>,
    ) -> bool {
        let name = if command.starts_with('/') {
            command.to_owned()
        } else {
            format!("/{command}")
        };
        self.register_with_usage(
            CommandUsage::new(CommandAddress::core(), name, description),
            handler,
        )
    }

    /// Resolves and runs a command given in full syntax.
    ///
    /// `/name` runs a `core` command. Otherwise the text before the first
    /// `:` selects a domain when it names one and an agent when it does not.
    /// Unknown commands fail with up to three close alternatives.
    pub async fn execute_command(
        &self,
        full_command: &str,
        args: CommandArgs,
        flags: CommandFlags,
    ) -> CommandResult {
        let (address, command) = resolve_full_command(full_command);
        let Some(handler) = self.handler(&address, &command) else {
            return CommandResult::from_error(&self.lookup_error(&address, &command));
        };

        let invocation = HandlerInvocation::new(command)
            .with_args(args)
            .with_flags(flags);
        match handler.handle(invocation).await {
            Ok(output) => output.into_result(),
            Err(error) => CommandResult::from_error(&CommandError::from(error)),
        }
    }

    /// Builds the lookup error for a missing command, with suggestions.
    #[must_use]
    pub fn lookup_error(&self, address: &CommandAddress, command: &str) -> CommandError {
        CommandError::Lookup {
            command: address.qualify(command),
            suggestions: self.catalog.snapshot().suggestions(address, command),
        }
    }

    /// Finds the handler registered at an address.
    #[must_use]
    pub fn handler(&self, address: &CommandAddress, command: &str) -> Option<Arc<dyn CommandHandler>> {
        self.catalog.snapshot().handler(address, command)
    }

    /// Returns `true` when a handler is registered at the address.
    #[must_use]
    pub fn has_command(&self, address: &CommandAddress, command: &str) -> bool {
        self.handler(address, command).is_some()
    }

    /// Command names registered at an address.
    #[must_use]
    pub fn command_names(&self, address: &CommandAddress) -> Vec<String> {
        self.catalog.snapshot().command_names(address)
    }

    /// Usage metadata for an agent.
    #[must_use]
    pub fn usages_for_agent(&self, agent_id: &str) -> Vec<CommandUsage> {
        self.catalog
            .snapshot()
            .usages(&CommandAddress::Agent(agent_id.to_ascii_lowercase()))
    }

    /// Usage metadata for a domain.
    #[must_use]
    pub fn usages_for_domain(&self, domain: Domain) -> Vec<CommandUsage> {
        self.catalog.snapshot().usages(&CommandAddress::Domain(domain))
    }

    /// Usage metadata for every command.
    #[must_use]
    pub fn all_usages(&self) -> Vec<CommandUsage> {
        self.catalog.snapshot().all_usages()
    }

    /// Agents with at least one registered command.
    #[must_use]
    pub fn agent_ids(&self) -> Vec<String> {
        self.catalog.snapshot().agent_ids()
    }

    /// Model selected through `/model`.
    #[must_use]
    pub fn current_model(&self) -> Option<String> {
        self.models.current()
    }

    /// Subscribes to registry events.
    #[must_use]
    pub fn subscribe(&self) -> broadcast::Receiver<RegistryEvent> {
        self.events.subscribe()
    }

    /// The plugin source this registry rebuilds from.
    #[must_use]
    pub const fn plugin_registry(&self) -> &Arc<P> {
        &self.plugins
    }

    /// Fills a command template from the supplied context.
    #[must_use]
    pub fn generate_contextual_command(
        &self,
        pattern: &str,
        context: &CommandContext,
    ) -> Option<String> {
        contextual::generate_contextual_command(pattern, context, &mockable::DefaultClock)
    }

    /// Suggests ready-to-run commands for the supplied context.
    #[must_use]
    pub fn suggest_commands(&self, context: &CommandContext, limit: usize) -> Vec<String> {
        contextual::suggest_commands(context, limit, &mockable::DefaultClock)
    }

    fn emit(&self, event: RegistryEvent) {
        if self.events.send(event).is_err() {
            debug!("no registry subscribers");
        }
    }
}

impl<P> Drop for CommandRegistry<P>
where
    P: PluginRegistry,
{
    fn drop(&mut self) {
        if let Some(watcher) = lock(&self.watcher).take() {
            watcher.abort();
        }
    }
}

/// Splits full command syntax into an address and command name.
fn resolve_full_command(full_command: &str) -> (CommandAddress, String) {
    let trimmed = full_command.trim();
    if trimmed.starts_with('/') {
        return (CommandAddress::core(), trimmed.to_owned());
    }
    let unprefixed = trimmed.strip_prefix('@').unwrap_or(trimmed);
    match unprefixed.split_once(':') {
        Some((segment, command)) => (CommandAddress::resolve(segment), command.to_owned()),
        None => (CommandAddress::core(), unprefixed.to_owned()),
    }
}
