//! Snapshot of external state consumed by contextual command generation.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Integration whose state is cached for contextual generation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ContextDomain {
    /// Version control state.
    Git,
    /// Issue tracker state.
    Jira,
    /// Build system state.
    Build,
    /// Bookmark state.
    Pocket,
}

impl ContextDomain {
    /// Every cached integration, in refresh order.
    pub const ALL: [Self; 4] = [Self::Git, Self::Jira, Self::Build, Self::Pocket];

    /// Returns the canonical lowercase name.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Git => "git",
            Self::Jira => "jira",
            Self::Build => "swdp",
            Self::Pocket => "pocket",
        }
    }
}

impl fmt::Display for ContextDomain {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter.write_str(self.as_str())
    }
}

/// A local branch.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BranchInfo {
    /// Branch name.
    pub name: String,
    /// Tracked upstream, if any.
    pub upstream: Option<String>,
    /// Whether the branch is checked out.
    pub is_current: bool,
}

impl BranchInfo {
    /// Creates a branch without an upstream.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            upstream: None,
            is_current: false,
        }
    }

    /// Marks the branch as checked out.
    #[must_use]
    pub const fn current(mut self) -> Self {
        self.is_current = true;
        self
    }

    /// Sets the tracked upstream.
    #[must_use]
    pub fn tracking(mut self, upstream: impl Into<String>) -> Self {
        self.upstream = Some(upstream.into());
        self
    }
}

/// Cached version-control state.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct GitContext {
    /// Local branches.
    pub branches: Vec<BranchInfo>,
    /// Paths with uncommitted changes.
    pub changed_files: Vec<String>,
    /// Configured VCS user name.
    pub user_name: Option<String>,
    /// URL of the primary remote.
    pub remote_url: Option<String>,
    /// Recent commit messages, newest first.
    pub recent_commits: Vec<String>,
}

impl GitContext {
    /// Returns the checked-out branch.
    #[must_use]
    pub fn current_branch(&self) -> Option<&BranchInfo> {
        self.branches.iter().find(|branch| branch.is_current)
    }

    /// Returns the checked-out branch name.
    #[must_use]
    pub fn current_branch_name(&self) -> Option<&str> {
        self.current_branch().map(|branch| branch.name.as_str())
    }
}

/// Cached placeholder state for integrations without a rich client.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IntegrationContext {
    /// Whether the integration is ready to run commands.
    pub connected: bool,
    /// When the state was last refreshed.
    pub refreshed_at: DateTime<Utc>,
    /// Most relevant item, such as the active issue key.
    pub current_item: Option<String>,
}

impl IntegrationContext {
    /// Creates a placeholder snapshot.
    #[must_use]
    pub const fn new(connected: bool, refreshed_at: DateTime<Utc>) -> Self {
        Self {
            connected,
            refreshed_at,
            current_item: None,
        }
    }

    /// Sets the most relevant item.
    #[must_use]
    pub fn with_current_item(mut self, item: impl Into<String>) -> Self {
        self.current_item = Some(item.into());
        self
    }
}

/// External state available to contextual command generation.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct CommandContext {
    /// Version-control state.
    pub git: Option<GitContext>,
    /// Issue-tracker state.
    pub jira: Option<IntegrationContext>,
    /// Build-system state.
    pub build: Option<IntegrationContext>,
    /// Bookmark state.
    pub pocket: Option<IntegrationContext>,
    /// File open in the editor.
    pub active_file: Option<String>,
}

impl CommandContext {
    /// Returns the checked-out branch name, if git state is known.
    #[must_use]
    pub fn current_branch_name(&self) -> Option<&str> {
        self.git.as_ref().and_then(GitContext::current_branch_name)
    }
}
