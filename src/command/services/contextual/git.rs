//! Version-control heuristics.

use chrono::{DateTime, Utc};
use std::path::Path;

use crate::command::domain::BranchInfo;

const CHECKOUT_PRIORITY: [&str; 3] = ["main", "develop", "master"];

const CONVENTIONAL_PREFIXES: [&str; 14] = [
    "feature", "feat", "fix", "bugfix", "hotfix", "chore", "docs", "refactor", "release", "test",
    "perf", "ci", "build", "style",
];

const DEFAULT_BRANCH_PREFIX: &str = "feature";
const DEFAULT_INITIALS: &str = "dev";

/// Infers a commit message from the changed files, falling back to the
/// active editor file.
#[must_use]
pub fn commit_message(changed_files: &[String], active_file: Option<&str>) -> Option<String> {
    match changed_files {
        [] => active_file.map(|file| format!("Update {}", file_name(file))),
        [single] => Some(format!("Update {}", file_name(single))),
        several => Some(format!("Update {} files", several.len())),
    }
}

fn file_name(path: &str) -> &str {
    Path::new(path)
        .file_name()
        .and_then(|name| name.to_str())
        .unwrap_or(path)
}

/// Orders checkout candidates: `main`, `develop`, `master`, then the rest in
/// their original order. The checked-out branch is excluded.
#[must_use]
pub fn rank_checkout_branches(branches: &[BranchInfo]) -> Vec<String> {
    let mut candidates: Vec<&BranchInfo> =
        branches.iter().filter(|branch| !branch.is_current).collect();
    candidates.sort_by_key(|branch| {
        CHECKOUT_PRIORITY
            .iter()
            .position(|name| *name == branch.name)
            .unwrap_or(CHECKOUT_PRIORITY.len())
    });
    candidates
        .into_iter()
        .map(|branch| branch.name.clone())
        .collect()
}

/// Synthesizes `prefix/initials/MMDD/` for a new branch.
///
/// The prefix is the conventional prefix of the current branch, the
/// initials come from the VCS user name, and the date is `today`.
#[must_use]
pub fn branch_name(
    current_branch: Option<&str>,
    user_name: Option<&str>,
    today: DateTime<Utc>,
) -> String {
    let prefix = current_branch
        .and_then(|branch| branch.split_once('/'))
        .map(|(head, _)| head.to_ascii_lowercase())
        .filter(|head| CONVENTIONAL_PREFIXES.contains(&head.as_str()))
        .unwrap_or_else(|| DEFAULT_BRANCH_PREFIX.to_owned());

    let initials: String = user_name
        .unwrap_or_default()
        .split_whitespace()
        .filter_map(|word| word.chars().next())
        .flat_map(char::to_lowercase)
        .collect();
    let owner = if initials.is_empty() {
        DEFAULT_INITIALS.to_owned()
    } else {
        initials
    };

    format!("{prefix}/{owner}/{}/", today.format("%m%d"))
}
