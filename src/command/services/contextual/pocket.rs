//! Bookmark defaults derived from the repository.

/// Extracts the repository name from a remote URL.
///
/// Handles both `https://host/owner/name.git` and `git@host:owner/name.git`.
#[must_use]
pub fn repository_name(remote_url: &str) -> Option<String> {
    let trimmed = remote_url.trim().trim_end_matches('/');
    let without_suffix = trimmed.strip_suffix(".git").unwrap_or(trimmed);
    without_suffix
        .rsplit(['/', ':'])
        .next()
        .filter(|name| !name.is_empty())
        .map(str::to_owned)
}
