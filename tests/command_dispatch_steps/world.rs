//! Shared world state for command dispatch BDD scenarios.

use std::sync::Arc;

use command_deck::command::{
    adapters::InMemoryPluginRegistry, domain::CommandResult, ports::CoreServices,
    services::CommandService,
};
use mockable::DefaultClock;
use rstest::fixture;

/// Service type used by the BDD world.
pub type TestService = CommandService<InMemoryPluginRegistry, DefaultClock>;

/// Scenario world for command dispatch behaviour tests.
pub struct DispatchWorld {
    /// Plugins installed by the scenario.
    pub plugins: Arc<InMemoryPluginRegistry>,
    /// Service built on first use, after the plugins are installed.
    pub service: Option<TestService>,
    /// Result of the last command sent.
    pub last_result: Option<CommandResult>,
}

impl DispatchWorld {
    /// Creates a world with no plugins installed.
    #[must_use]
    pub fn new() -> Self {
        Self {
            plugins: Arc::new(InMemoryPluginRegistry::new()),
            service: None,
            last_result: None,
        }
    }

    /// Returns the service, building it over the installed plugins.
    pub fn service(&mut self) -> &TestService {
        let plugins = Arc::clone(&self.plugins);
        self.service.get_or_insert_with(|| {
            CommandService::new(CoreServices::new(plugins), Arc::new(DefaultClock))
        })
    }

    /// Returns the result of the last command sent.
    pub fn last_result(&self) -> Result<&CommandResult, eyre::Report> {
        self.last_result
            .as_ref()
            .ok_or_else(|| eyre::eyre!("no command has been sent in this scenario"))
    }
}

impl Default for DispatchWorld {
    fn default() -> Self {
        Self::new()
    }
}

/// Fixture that creates a new scenario world.
#[fixture]
pub fn world() -> DispatchWorld {
    DispatchWorld::default()
}

/// Runs an async operation within sync step definitions.
pub fn run_async<T>(future: impl std::future::Future<Output = T>) -> T {
    tokio::task::block_in_place(|| tokio::runtime::Handle::current().block_on(future))
}
