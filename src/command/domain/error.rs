//! Error taxonomy for parsing, lookup, and execution.

use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// Reasons a piece of text is rejected as a command.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ParseError {
    /// Text does not start with `/`, or starts with `@` without any `:`.
    #[error("input is not a command")]
    NotACommand,

    /// An `@` token lacks the `domain:command` separator.
    #[error("'@{0}' is missing a command: use @domain:command")]
    MissingSeparator(String),

    /// The domain or agent segment is empty.
    #[error("command is missing a domain or agent before ':'")]
    EmptyAddress,

    /// The command segment is empty.
    #[error("command name must not be empty")]
    EmptyCommand,
}

/// Why a plugin cannot run commands right now.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PluginAvailability {
    /// The plugin can execute commands.
    Ready,
    /// The plugin is switched off.
    Disabled,
    /// The plugin has not finished initializing.
    Uninitialized,
    /// The plugin lacks credentials.
    Unauthenticated,
}

impl PluginAvailability {
    /// Returns the canonical lowercase representation.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Ready => "ready",
            Self::Disabled => "disabled",
            Self::Uninitialized => "not initialized",
            Self::Unauthenticated => "not authenticated",
        }
    }

    /// Returns `true` when the plugin can execute commands.
    #[must_use]
    pub const fn is_ready(self) -> bool {
        matches!(self, Self::Ready)
    }
}

impl fmt::Display for PluginAvailability {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter.write_str(self.as_str())
    }
}

/// Every way a command can fail between parsing and reporting.
///
/// All variants are converted into a
/// [`CommandResult`](super::CommandResult) at the executor boundary.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum CommandError {
    /// The text could not be parsed.
    #[error(transparent)]
    Parse(#[from] ParseError),

    /// No handler exists for the resolved address.
    #[error("unknown command '{command}'")]
    Lookup {
        /// Command in full user-facing syntax.
        command: String,
        /// Up to three alternatives in full syntax.
        suggestions: Vec<String>,
    },

    /// The handler failed; the message is preserved.
    #[error("{0}")]
    Execution(String),

    /// The execution was cancelled before it settled.
    #[error("command was cancelled")]
    Cancelled,

    /// The integration behind the command is not usable.
    #[error("{plugin} is {availability}")]
    PluginUnavailable {
        /// Plugin identifier.
        plugin: String,
        /// Why the plugin is unusable.
        availability: PluginAvailability,
    },
}
