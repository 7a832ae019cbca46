//! Version-control client port used for context refresh.

use async_trait::async_trait;
use std::sync::Arc;
use thiserror::Error;

use crate::command::domain::BranchInfo;

/// Result type for version-control queries.
pub type GitClientResult<T> = Result<T, GitClientError>;

/// Read-only view of a working copy.
#[async_trait]
pub trait GitClient: Send + Sync {
    /// Paths with uncommitted changes.
    async fn changed_files(&self) -> GitClientResult<Vec<String>>;

    /// Local branches, with the checked-out branch flagged.
    async fn branches(&self) -> GitClientResult<Vec<BranchInfo>>;

    /// Configured user name.
    async fn user_name(&self) -> GitClientResult<Option<String>>;

    /// URL of the primary remote.
    async fn remote_url(&self) -> GitClientResult<Option<String>>;

    /// Most recent commit messages, newest first.
    async fn recent_commit_messages(&self, limit: usize) -> GitClientResult<Vec<String>>;
}

/// Errors returned by version-control clients.
#[derive(Debug, Clone, Error)]
pub enum GitClientError {
    /// No repository is open.
    #[error("no repository is available")]
    NoRepository,

    /// Failure inside the client.
    #[error("git client error: {0}")]
    Runtime(Arc<dyn std::error::Error + Send + Sync>),
}

impl GitClientError {
    /// Wraps a runtime error raised by the client.
    pub fn runtime(err: impl std::error::Error + Send + Sync + 'static) -> Self {
        Self::Runtime(Arc::new(err))
    }
}
