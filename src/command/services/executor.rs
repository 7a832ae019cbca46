//! Command execution with cancellation, result shaping, and history.

use minijinja::Environment;
use mockable::Clock;
use serde_json::json;
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::Instant;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use super::CommandRegistry;
use crate::command::config::ExecutorConfig;
use crate::command::domain::{
    Command, CommandAddress, CommandError, CommandPrefix, CommandResult, DisplayMode, Domain,
    ExecutionHistory, ExecutionId, ExecutionRecord, HandlerOutput, PluginAvailability,
    edit_distance,
};
use crate::command::locks::lock;
use crate::command::parser::CommandParser;
use crate::command::ports::{
    CommandHandler, HandlerInvocation, Plugin, PluginError, PluginRegistry, SetupGuide,
};

const MAX_SUGGESTIONS: usize = 3;

const SETUP_TEMPLATE: &str = "\
## {{ title }}

{{ plugin }} is {{ reason }} and cannot run `{{ command }}` yet.
{% if steps %}
{% for step in steps %}{{ loop.index }}. {{ step }}
{% endfor %}{% endif %}{% if docs_url %}
See [the setup guide]({{ docs_url }}) for details.
{% endif %}";

struct PendingExecution {
    command: String,
    token: CancellationToken,
}

/// Runs parsed commands against the registry and plugins.
///
/// Each execution is pending until it settles, can be cancelled through its
/// [`ExecutionId`], and is always recorded to a bounded history.
pub struct CommandExecutor<P, C>
where
    P: PluginRegistry,
    C: Clock + Send + Sync,
{
    registry: Arc<CommandRegistry<P>>,
    parser: CommandParser,
    clock: Arc<C>,
    pending: Mutex<HashMap<ExecutionId, PendingExecution>>,
    history: Mutex<ExecutionHistory>,
}

impl<P, C> CommandExecutor<P, C>
where
    P: PluginRegistry,
    C: Clock + Send + Sync,
{
    /// Creates an executor.
    #[must_use]
    pub fn new(registry: Arc<CommandRegistry<P>>, clock: Arc<C>, config: ExecutorConfig) -> Self {
        Self {
            registry,
            parser: CommandParser::new(),
            clock,
            pending: Mutex::new(HashMap::new()),
            history: Mutex::new(ExecutionHistory::new(config.history_capacity)),
        }
    }

    /// The registry commands are resolved against.
    #[must_use]
    pub const fn registry(&self) -> &Arc<CommandRegistry<P>> {
        &self.registry
    }

    /// Executes a command under a fresh execution id.
    pub async fn execute(&self, command: Command) -> CommandResult {
        self.execute_with_id(ExecutionId::new(), command).await
    }

    /// Executes a command under a caller-allocated id so it can be cancelled
    /// while in flight.
    pub async fn execute_with_id(&self, id: ExecutionId, command: Command) -> CommandResult {
        let token = CancellationToken::new();
        lock(&self.pending).insert(
            id,
            PendingExecution {
                command: command.display_name(),
                token: token.clone(),
            },
        );

        let started = Instant::now();
        let outcome = self.dispatch(&command, &token).await;
        let elapsed = started.elapsed();
        lock(&self.pending).remove(&id);

        let result = match outcome {
            Ok(output) => output.into_result(),
            Err(CommandError::PluginUnavailable {
                plugin,
                availability,
            }) => self.setup_required(&command, &plugin, availability),
            Err(error) => CommandResult::from_error(&error),
        };

        debug!(
            %id,
            command = %command.display_name(),
            success = result.success,
            elapsed_ms = u64::try_from(elapsed.as_millis()).unwrap_or(u64::MAX),
            "command executed"
        );
        lock(&self.history).push(ExecutionRecord {
            id,
            command,
            result: result.clone(),
            timestamp: self.clock.utc(),
            elapsed,
        });
        result
    }

    /// Parses text and executes it.
    ///
    /// Parse failures short-circuit with the parser's suggestions, or `/help`
    /// when it has none.
    pub async fn execute_from_string(&self, text: &str) -> CommandResult {
        let parsed = self.parser.parse_with_suggestions(text);
        match parsed.command {
            Some(command) => self.execute(command).await,
            None => parsed.into_failure_result(),
        }
    }

    /// Cancels a pending execution, returning `true` when it was pending.
    pub fn cancel(&self, id: ExecutionId) -> bool {
        let Some(pending) = lock(&self.pending).remove(&id) else {
            return false;
        };
        pending.token.cancel();
        info!(%id, command = %pending.command, "command execution cancelled");
        true
    }

    /// Cancels every pending execution, returning how many were cancelled.
    pub fn cancel_all(&self) -> usize {
        let drained: Vec<(ExecutionId, PendingExecution)> =
            lock(&self.pending).drain().collect();
        for (id, pending) in &drained {
            pending.token.cancel();
            info!(%id, command = %pending.command, "command execution cancelled");
        }
        drained.len()
    }

    /// Identifiers of executions still in flight.
    #[must_use]
    pub fn pending_ids(&self) -> Vec<ExecutionId> {
        lock(&self.pending).keys().copied().collect()
    }

    /// Returns `true` while the execution is in flight.
    #[must_use]
    pub fn is_pending(&self, id: ExecutionId) -> bool {
        lock(&self.pending).contains_key(&id)
    }

    /// Recorded executions, oldest first.
    #[must_use]
    pub fn history(&self) -> Vec<ExecutionRecord> {
        lock(&self.history).iter().cloned().collect()
    }

    async fn dispatch(
        &self,
        command: &Command,
        token: &CancellationToken,
    ) -> Result<HandlerOutput, CommandError> {
        if token.is_cancelled() {
            return Err(CommandError::Cancelled);
        }
        let invocation = HandlerInvocation::new(command.command.clone())
            .with_args(command.args.clone())
            .with_flags(command.flags.clone())
            .with_options(command.options.clone())
            .with_cancellation(token.clone());

        let outcome = match (command.domain, command.prefix) {
            (Some(domain), _) => {
                debug!(%domain, command = %command.command, "dispatching domain command");
                self.execute_domain_command(domain, command, invocation).await
            }
            (None, CommandPrefix::At) => {
                debug!(
                    agent = %command.agent_id,
                    command = %command.command,
                    "dispatching plugin command"
                );
                self.execute_plugin_command(command, invocation).await
            }
            (None, _) => {
                debug!(command = %command.command, "dispatching internal command");
                self.execute_internal_command(command, invocation).await
            }
        };

        if token.is_cancelled() {
            return Err(CommandError::Cancelled);
        }
        outcome
    }

    async fn execute_domain_command(
        &self,
        domain: Domain,
        command: &Command,
        invocation: HandlerInvocation,
    ) -> Result<HandlerOutput, CommandError> {
        let domain_plugin = self.registry.plugin_registry().get_plugin_by_domain(domain);
        if let Some(plugin) = &domain_plugin {
            ensure_available(plugin.as_ref())?;
        }

        let address = CommandAddress::Domain(domain);
        if let Some(sub) = &command.sub_command {
            let qualified = format!("{}:{sub}", command.command);
            if let Some(handler) = self.registry.handler(&address, &qualified) {
                let mut qualified_invocation = invocation;
                qualified_invocation.command = qualified;
                return run(handler.as_ref(), qualified_invocation).await;
            }
        }
        if let Some(handler) = self.registry.handler(&address, &command.command) {
            return run(handler.as_ref(), with_sub_command(invocation, command)).await;
        }
        if let Some(plugin) = domain_plugin {
            return match plugin.execute_command(with_sub_command(invocation, command)).await {
                Err(PluginError::UnsupportedCommand { .. }) => {
                    Err(self.domain_lookup_error(domain, &command.command))
                }
                other => other.map_err(CommandError::from),
            };
        }
        Err(self.domain_lookup_error(domain, &command.command))
    }

    async fn execute_plugin_command(
        &self,
        command: &Command,
        invocation: HandlerInvocation,
    ) -> Result<HandlerOutput, CommandError> {
        let address = CommandAddress::Agent(command.agent_id.clone());
        let handler = self.registry.handler(&address, &command.command);

        if let Some(plugin) = self.registry.plugin_registry().get_plugin(&command.agent_id) {
            ensure_available(plugin.as_ref())?;
            if let Some(registered) = handler {
                return run(registered.as_ref(), invocation).await;
            }
            return match plugin.execute_command(invocation).await {
                Err(PluginError::UnsupportedCommand { .. }) => {
                    Err(self.agent_lookup_error(&address, command))
                }
                other => other.map_err(CommandError::from),
            };
        }

        match handler {
            Some(registered) => run(registered.as_ref(), invocation).await,
            None => Err(self.agent_lookup_error(&address, command)),
        }
    }

    async fn execute_internal_command(
        &self,
        command: &Command,
        invocation: HandlerInvocation,
    ) -> Result<HandlerOutput, CommandError> {
        let core = CommandAddress::core();
        let slashed = format!("/{}", command.command);
        let handler = self
            .registry
            .handler(&core, &slashed)
            .or_else(|| self.registry.handler(&core, &command.command));
        match handler {
            Some(registered) => run(registered.as_ref(), invocation).await,
            None => Err(CommandError::Lookup {
                command: slashed,
                suggestions: vec!["/help".to_owned()],
            }),
        }
    }

    fn domain_lookup_error(&self, domain: Domain, command: &str) -> CommandError {
        let mut siblings: Vec<(usize, String)> = self
            .registry
            .command_names(&CommandAddress::Domain(domain))
            .into_iter()
            .map(|name| (edit_distance(command, &name), name))
            .collect();
        siblings.sort();
        CommandError::Lookup {
            command: format!("@{domain}:{command}"),
            suggestions: siblings
                .into_iter()
                .take(MAX_SUGGESTIONS)
                .map(|(_, name)| format!("@{domain}:{name}"))
                .collect(),
        }
    }

    fn agent_lookup_error(&self, address: &CommandAddress, command: &Command) -> CommandError {
        let error = self.registry.lookup_error(address, &command.command);
        match error {
            CommandError::Lookup {
                command: name,
                suggestions,
            } if suggestions.is_empty() => CommandError::Lookup {
                command: name,
                suggestions: self.parser.suggest_similar_commands(&command.raw_input),
            },
            other => other,
        }
    }

    fn setup_required(
        &self,
        command: &Command,
        plugin_id: &str,
        availability: PluginAvailability,
    ) -> CommandResult {
        let plugin = match command.domain {
            Some(domain) => self.registry.plugin_registry().get_plugin_by_domain(domain),
            None => self.registry.plugin_registry().get_plugin(plugin_id),
        };
        let display_name = plugin
            .as_ref()
            .map_or_else(|| plugin_id.to_owned(), |found| found.display_name().to_owned());
        let guide = plugin
            .as_ref()
            .and_then(|found| found.setup_guide())
            .unwrap_or_else(|| default_guide(&display_name, availability));

        let rendered = Environment::new().render_str(
            SETUP_TEMPLATE,
            json!({
                "title": guide.title,
                "plugin": display_name,
                "reason": availability.as_str(),
                "command": command.display_name(),
                "steps": guide.steps,
                "docs_url": guide.docs_url,
            }),
        );
        match rendered {
            Ok(markdown) => CommandResult {
                success: false,
                message: Some(format!("{display_name} is {availability}")),
                content: Some(markdown),
                data: Some(json!({
                    "type": "plugin_setup_required",
                    "plugin": plugin_id,
                    "reason": availability,
                    "steps": guide.steps,
                })),
                error: Some(format!("{plugin_id} is {availability}")),
                display_mode: DisplayMode::Markdown,
                suggested_next_commands: vec!["/help".to_owned()],
            },
            Err(error) => {
                warn!(plugin = plugin_id, %error, "failed to render setup instructions");
                CommandResult::failure(format!("{plugin_id} is {availability}"))
            }
        }
    }
}

fn ensure_available(plugin: &dyn Plugin) -> Result<(), CommandError> {
    let availability = plugin.availability();
    if availability.is_ready() {
        Ok(())
    } else {
        Err(CommandError::PluginUnavailable {
            plugin: plugin.id().to_owned(),
            availability,
        })
    }
}

fn default_guide(display_name: &str, availability: PluginAvailability) -> SetupGuide {
    let step = match availability {
        PluginAvailability::Disabled => format!("Enable {display_name} in your settings."),
        PluginAvailability::Uninitialized => {
            format!("Wait for {display_name} to finish starting, then try again.")
        }
        PluginAvailability::Unauthenticated | PluginAvailability::Ready => {
            format!("Sign in to {display_name} and try again.")
        }
    };
    SetupGuide::new(format!("Set up {display_name}"), [step])
}

/// Passes the sub-command through as the first positional argument.
fn with_sub_command(mut invocation: HandlerInvocation, command: &Command) -> HandlerInvocation {
    if let Some(sub) = &command.sub_command {
        invocation
            .args
            .insert(0, serde_json::Value::String(sub.clone()));
    }
    invocation
}

async fn run(
    handler: &dyn CommandHandler,
    invocation: HandlerInvocation,
) -> Result<HandlerOutput, CommandError> {
    handler.handle(invocation).await.map_err(CommandError::from)
}
