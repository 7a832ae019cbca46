//! Command addressing: domains, prefixes, and resolved handler addresses.

use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// Agent identifier reserved for built-in and internal commands.
pub const CORE_AGENT: &str = "core";

/// External-system category addressed as `@domain:command`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Domain {
    /// Version control.
    Git,
    /// Issue tracker.
    Jira,
    /// Documentation search.
    Doc,
    /// Bookmarks and saved snippets.
    Pocket,
    /// Secret storage.
    Vault,
    /// Project rules and conventions.
    Rules,
}

impl Domain {
    /// Every domain, in table order.
    pub const ALL: [Self; 6] = [
        Self::Git,
        Self::Jira,
        Self::Doc,
        Self::Pocket,
        Self::Vault,
        Self::Rules,
    ];

    /// Returns the canonical lowercase name used in `@domain:` syntax.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Git => "git",
            Self::Jira => "jira",
            Self::Doc => "doc",
            Self::Pocket => "pocket",
            Self::Vault => "vault",
            Self::Rules => "rules",
        }
    }

    /// Resolves a domain from its name, ignoring case and surrounding
    /// whitespace.
    ///
    /// This table is the single place domain names are recognised; both the
    /// parser and the registry resolve addresses through it.
    #[must_use]
    pub fn from_name(name: &str) -> Option<Self> {
        let normalized = name.trim();
        Self::ALL
            .into_iter()
            .find(|domain| domain.as_str().eq_ignore_ascii_case(normalized))
    }

    /// Commonly used commands for the domain, used for typo suggestions.
    #[must_use]
    pub const fn common_commands(self) -> &'static [&'static str] {
        match self {
            Self::Git => &[
                "status", "commit", "push", "pull", "checkout", "branch", "log", "diff", "merge",
                "stash",
            ],
            Self::Jira => &["issue", "search", "create", "assign", "comment", "transition"],
            Self::Doc => &["search", "open", "list", "summarize"],
            Self::Pocket => &["load", "search", "list", "save"],
            Self::Vault => &["get", "set", "list"],
            Self::Rules => &["list", "show", "apply"],
        }
    }
}

impl fmt::Display for Domain {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter.write_str(self.as_str())
    }
}

impl TryFrom<&str> for Domain {
    type Error = ParseDomainError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        Self::from_name(value).ok_or_else(|| ParseDomainError(value.to_owned()))
    }
}

/// Error returned when a string does not name a known domain.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("unknown command domain: {0}")]
pub struct ParseDomainError(pub String);

/// Leading sigil of a command.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CommandPrefix {
    /// `@domain:command` or `@agent:command`.
    At,
    /// `/command`.
    Slash,
    /// Constructed programmatically without a sigil.
    None,
}

impl CommandPrefix {
    /// Returns the sigil as written by users.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::At => "@",
            Self::Slash => "/",
            Self::None => "",
        }
    }
}

/// Which addressing scheme a parsed command uses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CommandKind {
    /// Canonical domain-addressed command (`@git:commit`).
    Domain,
    /// Legacy agent-addressed command (`@myplugin:run`).
    Agent,
    /// Internal slash command owned by the `core` agent.
    System,
}

/// Resolved namespace a handler is registered under.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "scheme", content = "name")]
pub enum CommandAddress {
    /// Agent-keyed namespace.
    Agent(String),
    /// Domain-keyed namespace.
    Domain(Domain),
}

impl CommandAddress {
    /// Returns the address of the built-in `core` agent.
    #[must_use]
    pub fn core() -> Self {
        Self::Agent(CORE_AGENT.to_owned())
    }

    /// Resolves a leading address segment to a domain when it names one,
    /// otherwise to an agent.
    #[must_use]
    pub fn resolve(segment: &str) -> Self {
        Domain::from_name(segment).map_or_else(
            || Self::Agent(segment.trim().to_ascii_lowercase()),
            Self::Domain,
        )
    }

    /// Returns `true` for the `core` agent namespace.
    #[must_use]
    pub fn is_core(&self) -> bool {
        matches!(self, Self::Agent(agent) if agent == CORE_AGENT)
    }

    /// Formats a command name in full user-facing syntax for this address.
    ///
    /// Core commands render as `/command`; everything else renders as
    /// `@address:command`.
    #[must_use]
    pub fn qualify(&self, command: &str) -> String {
        if self.is_core() {
            if command.starts_with('/') {
                command.to_owned()
            } else {
                format!("/{command}")
            }
        } else {
            format!("@{self}:{command}")
        }
    }
}

impl fmt::Display for CommandAddress {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Agent(agent) => formatter.write_str(agent),
            Self::Domain(domain) => formatter.write_str(domain.as_str()),
        }
    }
}
