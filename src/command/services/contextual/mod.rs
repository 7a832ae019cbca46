//! Contextual command generation.
//!
//! Synthesizes ready-to-run commands from cached external state so users do
//! not have to type arguments. Everything here is pure: the only inputs are
//! the context snapshot and the clock.

mod build;
mod git;
mod issue_key;
mod pocket;
mod templates;

pub use build::{BuildTarget, build_target};
pub use git::{branch_name, commit_message, rank_checkout_branches};
pub use issue_key::{IssueKeyExtractor, extraction_prompt};
pub use pocket::repository_name;
pub use templates::{has_template, render};

use mockable::Clock;
use serde_json::json;

use crate::command::domain::CommandContext;

/// Normalizes `@git:commit`, `git:commit`, or `git commit` into the
/// `domain:command` template key.
#[must_use]
pub fn template_key(pattern: &str) -> String {
    let trimmed = pattern.trim();
    let without_sigil = trimmed.strip_prefix('@').unwrap_or(trimmed);
    let mut words = without_sigil.split_whitespace();
    let head = words.next().unwrap_or_default();
    let key = if head.contains(':') {
        head.to_owned()
    } else {
        match words.next() {
            Some(command) => format!("{head}:{command}"),
            None => head.to_owned(),
        }
    };
    key.to_ascii_lowercase()
}

/// Generates a ready-to-run command for the pattern from the context.
///
/// Returns `None` when the pattern has no template or the context lacks
/// the state the template needs. Issue keys are taken from the branch name
/// and then from commit messages.
#[must_use]
pub fn generate_contextual_command(
    pattern: &str,
    context: &CommandContext,
    clock: &impl Clock,
) -> Option<String> {
    let key = template_key(pattern);
    let git = context.git.as_ref();
    let branch = context.current_branch_name();

    match key.as_str() {
        "git:commit" => {
            let changed = git.map(|state| state.changed_files.as_slice()).unwrap_or_default();
            let message = commit_message(changed, context.active_file.as_deref())?;
            render(&key, json!({ "message": message }))
        }
        "git:push" | "git:pull" => {
            let current = git?.current_branch()?;
            render(
                &key,
                json!({ "branch": current.name, "set_upstream": current.upstream.is_none() }),
            )
        }
        "git:checkout" => {
            let target = rank_checkout_branches(&git?.branches).into_iter().next()?;
            render(&key, json!({ "branch": target }))
        }
        "git:branch" => {
            let user_name = git.and_then(|state| state.user_name.as_deref());
            let name = branch_name(branch, user_name, clock.utc());
            render(&key, json!({ "name": name }))
        }
        "jira:issue" => {
            let extractor = IssueKeyExtractor::new();
            let issue_key = branch
                .and_then(|name| extractor.from_branch(name))
                .or_else(|| git.and_then(|state| extractor.from_commits(&state.recent_commits)))?;
            render(&key, json!({ "key": issue_key }))
        }
        "swdp:build" => render(&key, build_target(branch)),
        "pocket:load" | "pocket:search" => {
            let remote = git?.remote_url.as_deref()?;
            render(&key, json!({ "repository": repository_name(remote)? }))
        }
        "doc:search" => {
            let query = context
                .active_file
                .as_deref()
                .map(|file| {
                    std::path::Path::new(file)
                        .file_stem()
                        .and_then(|stem| stem.to_str())
                        .unwrap_or(file)
                        .to_owned()
                })
                .or_else(|| {
                    git.and_then(|state| state.remote_url.as_deref())
                        .and_then(repository_name)
                })?;
            render(&key, json!({ "query": query }))
        }
        _ => None,
    }
}

/// Patterns tried by [`suggest_commands`], most useful first.
pub const SUGGESTION_PATTERNS: [&str; 8] = [
    "git:commit",
    "git:push",
    "jira:issue",
    "swdp:build",
    "git:pull",
    "pocket:load",
    "doc:search",
    "git:checkout",
];

/// Suggests up to `limit` ready-to-run commands for the context.
#[must_use]
pub fn suggest_commands(context: &CommandContext, limit: usize, clock: &impl Clock) -> Vec<String> {
    let has_changes = context
        .git
        .as_ref()
        .is_some_and(|state| !state.changed_files.is_empty());
    let is_tracked = context
        .git
        .as_ref()
        .and_then(|state| state.current_branch())
        .is_some_and(|branch| branch.upstream.is_some());

    SUGGESTION_PATTERNS
        .iter()
        .filter(|pattern| match **pattern {
            "git:commit" => has_changes,
            "git:push" => !is_tracked || has_changes,
            "git:pull" => is_tracked,
            "swdp:build" => context.current_branch_name().is_some(),
            _ => true,
        })
        .filter_map(|pattern| generate_contextual_command(pattern, context, clock))
        .take(limit)
        .collect()
}
