//! Plugin assembled from handlers at construction time.

use async_trait::async_trait;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use crate::command::domain::{Domain, HandlerOutput};
use crate::command::ports::{
    CommandHandler, GitClient, HandlerInvocation, Plugin, PluginCommand, PluginError, SetupGuide,
};

/// A plugin whose commands are fixed handlers.
///
/// ```
/// use command_deck::command::adapters::{StaticPlugin, handler_fn};
/// use command_deck::command::domain::{Domain, HandlerOutput};
/// use command_deck::command::ports::{Plugin, PluginCommand};
///
/// let plugin = StaticPlugin::new("git-tools")
///     .in_domain(Domain::Git)
///     .with_command(
///         PluginCommand::new("status", "Show working tree status"),
///         handler_fn(|_| async { Ok(HandlerOutput::Text("clean".to_owned())) }),
///     );
/// assert_eq!(plugin.commands().len(), 1);
/// ```
pub struct StaticPlugin {
    id: String,
    display_name: String,
    domain: Option<Domain>,
    commands: Vec<(PluginCommand, Arc<dyn CommandHandler>)>,
    enabled: AtomicBool,
    initialized: bool,
    authenticated: bool,
    setup_guide: Option<SetupGuide>,
    git_client: Option<Arc<dyn GitClient>>,
}

impl StaticPlugin {
    /// Creates an enabled, initialized, authenticated plugin with no
    /// commands.
    #[must_use]
    pub fn new(id: impl Into<String>) -> Self {
        let plugin_id = id.into();
        Self {
            display_name: plugin_id.clone(),
            id: plugin_id,
            domain: None,
            commands: Vec::new(),
            enabled: AtomicBool::new(true),
            initialized: true,
            authenticated: true,
            setup_guide: None,
            git_client: None,
        }
    }

    /// Sets the human-readable name.
    #[must_use]
    pub fn with_display_name(mut self, display_name: impl Into<String>) -> Self {
        self.display_name = display_name.into();
        self
    }

    /// Sets the domain the plugin serves.
    #[must_use]
    pub const fn in_domain(mut self, domain: Domain) -> Self {
        self.domain = Some(domain);
        self
    }

    /// Adds a command and its handler.
    #[must_use]
    pub fn with_command(
        mut self,
        command: PluginCommand,
        handler: impl CommandHandler + 'static,
    ) -> Self {
        self.commands.push((command, Arc::new(handler)));
        self
    }

    /// Starts the plugin switched off.
    #[must_use]
    pub fn disabled(self) -> Self {
        self.enabled.store(false, Ordering::SeqCst);
        self
    }

    /// Marks the plugin as not yet initialized.
    #[must_use]
    pub const fn uninitialized(mut self) -> Self {
        self.initialized = false;
        self
    }

    /// Marks the plugin as lacking credentials.
    #[must_use]
    pub const fn unauthenticated(mut self) -> Self {
        self.authenticated = false;
        self
    }

    /// Sets the setup instructions.
    #[must_use]
    pub fn with_setup_guide(mut self, guide: SetupGuide) -> Self {
        self.setup_guide = Some(guide);
        self
    }

    /// Sets the version-control client.
    #[must_use]
    pub fn with_git_client(mut self, client: Arc<dyn GitClient>) -> Self {
        self.git_client = Some(client);
        self
    }

    /// Switches the plugin on or off.
    pub fn set_enabled(&self, enabled: bool) {
        self.enabled.store(enabled, Ordering::SeqCst);
    }
}

#[async_trait]
impl Plugin for StaticPlugin {
    fn id(&self) -> &str {
        &self.id
    }

    fn display_name(&self) -> &str {
        &self.display_name
    }

    fn domain(&self) -> Option<Domain> {
        self.domain
    }

    fn commands(&self) -> Vec<PluginCommand> {
        self.commands
            .iter()
            .map(|(command, _)| command.clone())
            .collect()
    }

    fn is_enabled(&self) -> bool {
        self.enabled.load(Ordering::SeqCst)
    }

    fn is_initialized(&self) -> bool {
        self.initialized
    }

    fn is_authenticated(&self) -> bool {
        self.authenticated
    }

    fn setup_guide(&self) -> Option<SetupGuide> {
        self.setup_guide.clone()
    }

    fn git_client(&self) -> Option<Arc<dyn GitClient>> {
        self.git_client.clone()
    }

    async fn execute_command(
        &self,
        invocation: HandlerInvocation,
    ) -> Result<HandlerOutput, PluginError> {
        let handler = self
            .commands
            .iter()
            .find(|(command, _)| command.name == invocation.command)
            .map(|(_, handler)| Arc::clone(handler))
            .ok_or_else(|| PluginError::UnsupportedCommand {
                plugin: self.id.clone(),
                command: invocation.command.clone(),
            })?;
        Ok(handler.handle(invocation).await?)
    }
}
