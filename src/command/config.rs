//! Configuration for the registry, executor, and service façade.
//!
//! Loading configuration from files or the environment is the host's
//! concern; these structs are constructed in code and passed in.

use std::time::Duration;

/// Configuration for [`crate::command::services::CommandRegistry`].
///
/// # Examples
///
/// ```
/// use command_deck::command::config::RegistryConfig;
///
/// let config = RegistryConfig::default();
/// assert_eq!(config.default_model.as_deref(), Some("gpt-4"));
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RegistryConfig {
    /// Delay before the one-shot refresh used when the plugin registry
    /// cannot emit lifecycle events.
    pub fallback_poll_delay: Duration,
    /// Models offered by the built-in `/model` and `models` commands.
    pub available_models: Vec<String>,
    /// Model selected before any `/model` invocation.
    pub default_model: Option<String>,
}

impl Default for RegistryConfig {
    fn default() -> Self {
        Self {
            fallback_poll_delay: Duration::from_secs(1),
            available_models: vec![
                "gpt-4".to_owned(),
                "gpt-4o".to_owned(),
                "claude-3-5-sonnet".to_owned(),
            ],
            default_model: Some("gpt-4".to_owned()),
        }
    }
}

impl RegistryConfig {
    /// Replaces the configured model catalogue.
    #[must_use]
    pub fn with_models(
        mut self,
        models: impl IntoIterator<Item = impl Into<String>>,
        default_model: Option<&str>,
    ) -> Self {
        self.available_models = models.into_iter().map(Into::into).collect();
        self.default_model = default_model.map(str::to_owned);
        self
    }

    /// Sets the fallback poll delay.
    #[must_use]
    pub const fn with_fallback_poll_delay(mut self, delay: Duration) -> Self {
        self.fallback_poll_delay = delay;
        self
    }
}

/// Configuration for [`crate::command::services::CommandExecutor`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExecutorConfig {
    /// Number of execution records retained before the oldest is evicted.
    pub history_capacity: usize,
}

impl Default for ExecutorConfig {
    fn default() -> Self {
        Self {
            history_capacity: 100,
        }
    }
}

impl ExecutorConfig {
    /// Creates a configuration with the given history capacity.
    #[must_use]
    pub const fn with_history_capacity(history_capacity: usize) -> Self {
        Self { history_capacity }
    }
}

/// Configuration for [`crate::command::services::CommandService`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServiceConfig {
    /// Interval of the background context refresh.
    pub context_refresh_interval: Duration,
    /// Upper bound on speculative language-model calls.
    pub speculative_timeout: Duration,
    /// How long a resolved issue key is reused.
    pub issue_key_ttl: Duration,
    /// Number of recent commit messages considered for issue-key extraction.
    pub recent_commit_limit: usize,
    /// Number of recent argument lists remembered per plugin command.
    pub preference_capacity: usize,
    /// Registry configuration.
    pub registry: RegistryConfig,
    /// Executor configuration.
    pub executor: ExecutorConfig,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            context_refresh_interval: Duration::from_secs(30),
            speculative_timeout: Duration::from_secs(5),
            issue_key_ttl: Duration::from_secs(5 * 60),
            recent_commit_limit: 10,
            preference_capacity: 5,
            registry: RegistryConfig::default(),
            executor: ExecutorConfig::default(),
        }
    }
}

impl ServiceConfig {
    /// Sets the speculative language-model timeout.
    #[must_use]
    pub const fn with_speculative_timeout(mut self, timeout: Duration) -> Self {
        self.speculative_timeout = timeout;
        self
    }

    /// Sets the issue-key cache lifetime.
    #[must_use]
    pub const fn with_issue_key_ttl(mut self, ttl: Duration) -> Self {
        self.issue_key_ttl = ttl;
        self
    }

    /// Sets the background refresh interval.
    #[must_use]
    pub const fn with_context_refresh_interval(mut self, interval: Duration) -> Self {
        self.context_refresh_interval = interval;
        self
    }
}
