//! In-memory version-control client.

use async_trait::async_trait;
use std::sync::{Arc, RwLock};

use crate::command::domain::BranchInfo;
use crate::command::locks::{read, write};
use crate::command::ports::{GitClient, GitClientError, GitClientResult};

#[derive(Debug, Default)]
struct WorkingCopy {
    available: bool,
    branches: Vec<BranchInfo>,
    changed_files: Vec<String>,
    user_name: Option<String>,
    remote_url: Option<String>,
    commits: Vec<String>,
}

/// Thread-safe in-memory working copy.
#[derive(Debug, Clone)]
pub struct InMemoryGitClient {
    state: Arc<RwLock<WorkingCopy>>,
}

impl Default for InMemoryGitClient {
    fn default() -> Self {
        Self::new()
    }
}

impl InMemoryGitClient {
    /// Creates an empty working copy.
    #[must_use]
    pub fn new() -> Self {
        Self {
            state: Arc::new(RwLock::new(WorkingCopy {
                available: true,
                ..WorkingCopy::default()
            })),
        }
    }

    /// Creates a client whose every query fails with
    /// [`GitClientError::NoRepository`].
    #[must_use]
    pub fn unavailable() -> Self {
        Self {
            state: Arc::default(),
        }
    }

    /// Adds a branch.
    #[must_use]
    pub fn with_branch(self, branch: BranchInfo) -> Self {
        write(&self.state).branches.push(branch);
        self
    }

    /// Sets the changed files.
    #[must_use]
    pub fn with_changed_files(self, files: impl IntoIterator<Item = impl Into<String>>) -> Self {
        self.set_changed_files(files);
        self
    }

    /// Sets the user name.
    #[must_use]
    pub fn with_user_name(self, user_name: impl Into<String>) -> Self {
        write(&self.state).user_name = Some(user_name.into());
        self
    }

    /// Sets the remote URL.
    #[must_use]
    pub fn with_remote_url(self, url: impl Into<String>) -> Self {
        write(&self.state).remote_url = Some(url.into());
        self
    }

    /// Sets the commit messages, newest first.
    #[must_use]
    pub fn with_commits(self, commits: impl IntoIterator<Item = impl Into<String>>) -> Self {
        write(&self.state).commits = commits.into_iter().map(Into::into).collect();
        self
    }

    /// Replaces the changed files.
    pub fn set_changed_files(&self, files: impl IntoIterator<Item = impl Into<String>>) {
        write(&self.state).changed_files = files.into_iter().map(Into::into).collect();
    }

    /// Checks out a branch, creating it when missing.
    pub fn checkout(&self, name: &str) {
        let mut state = write(&self.state);
        for branch in &mut state.branches {
            branch.is_current = branch.name == name;
        }
        if !state.branches.iter().any(|branch| branch.is_current) {
            state.branches.push(BranchInfo::new(name).current());
        }
    }

    fn query<T>(&self, select: impl FnOnce(&WorkingCopy) -> T) -> GitClientResult<T> {
        let state = read(&self.state);
        if !state.available {
            return Err(GitClientError::NoRepository);
        }
        Ok(select(&state))
    }
}

#[async_trait]
impl GitClient for InMemoryGitClient {
    async fn changed_files(&self) -> GitClientResult<Vec<String>> {
        self.query(|state| state.changed_files.clone())
    }

    async fn branches(&self) -> GitClientResult<Vec<BranchInfo>> {
        self.query(|state| state.branches.clone())
    }

    async fn user_name(&self) -> GitClientResult<Option<String>> {
        self.query(|state| state.user_name.clone())
    }

    async fn remote_url(&self) -> GitClientResult<Option<String>> {
        self.query(|state| state.remote_url.clone())
    }

    async fn recent_commit_messages(&self, limit: usize) -> GitClientResult<Vec<String>> {
        self.query(|state| state.commits.iter().take(limit).cloned().collect())
    }
}
