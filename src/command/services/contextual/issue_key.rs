//! Issue-key extraction from branch names, commit messages, and model
//! responses.

use regex::Regex;

const KEY: &str = r"[A-Z][A-Z0-9]+-\d+";

/// Finds issue keys such as `PROJ-123`.
#[derive(Debug, Clone)]
pub struct IssueKeyExtractor {
    bare: Option<Regex>,
    commit_patterns: Vec<Regex>,
}

impl Default for IssueKeyExtractor {
    fn default() -> Self {
        Self::new()
    }
}

impl IssueKeyExtractor {
    /// Compiles the key patterns.
    #[must_use]
    pub fn new() -> Self {
        let commit_sources = [
            format!(r"\[({KEY})\]"),
            format!(r"^\w+\(({KEY})\)!?:"),
            format!(r"\(({KEY})\)"),
            format!(r"^({KEY}):"),
            format!(r"#({KEY})\b"),
            format!(r"\b({KEY})\b"),
        ];
        Self {
            bare: Regex::new(&format!(r"\b({KEY})\b")).ok(),
            commit_patterns: commit_sources
                .iter()
                .filter_map(|source| Regex::new(source).ok())
                .collect(),
        }
    }

    /// Extracts a key embedded in a branch name.
    #[must_use]
    pub fn from_branch(&self, branch: &str) -> Option<String> {
        self.bare.as_ref().and_then(|pattern| first_capture(pattern, branch))
    }

    /// Extracts a key from commit messages, newest first.
    ///
    /// Patterns are tried in order of specificity: bracketed, conventional
    /// commit scope, parenthesized, leading colon, hash, then bare.
    #[must_use]
    pub fn from_commits(&self, commits: &[String]) -> Option<String> {
        self.commit_patterns.iter().find_map(|pattern| {
            commits
                .iter()
                .find_map(|commit| first_capture(pattern, commit.trim()))
        })
    }

    /// Extracts a key from a language-model answer.
    #[must_use]
    pub fn from_model_response(&self, response: &str) -> Option<String> {
        self.from_branch(response)
    }
}

fn first_capture(pattern: &Regex, text: &str) -> Option<String> {
    pattern
        .captures(text)
        .and_then(|captures| captures.get(1))
        .map(|key| key.as_str().to_owned())
}

/// Builds the prompt asking a model to find the issue key in commits.
#[must_use]
pub fn extraction_prompt(commits: &[String]) -> String {
    let listing = commits
        .iter()
        .map(|commit| format!("- {commit}"))
        .collect::<Vec<_>>()
        .join("\n");
    format!(
        "Identify the issue tracker key (for example PROJ-123) these commits refer to. \
         Reply with the key only, or NONE if there is none.\n\n{listing}"
    )
}
