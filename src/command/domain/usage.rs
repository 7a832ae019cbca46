//! Help and autocomplete metadata registered alongside handlers.

use serde::{Deserialize, Serialize};

use super::CommandAddress;

/// Usage metadata for one registered command.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommandUsage {
    /// Namespace the command is registered under.
    pub address: CommandAddress,
    /// Command name.
    pub command: String,
    /// Human-readable description.
    pub description: String,
    /// Invocation syntax, for example `@git:commit -m <message>`.
    pub syntax: String,
    /// Example invocations.
    #[serde(default)]
    pub examples: Vec<String>,
    /// Supported flags.
    #[serde(default)]
    pub flags: Vec<String>,
}

impl CommandUsage {
    /// Creates usage metadata whose syntax is the qualified command name.
    #[must_use]
    pub fn new(
        address: CommandAddress,
        command: impl Into<String>,
        description: impl Into<String>,
    ) -> Self {
        let name = command.into();
        Self {
            syntax: address.qualify(&name),
            address,
            command: name,
            description: description.into(),
            examples: Vec::new(),
            flags: Vec::new(),
        }
    }

    /// Replaces the invocation syntax.
    #[must_use]
    pub fn with_syntax(mut self, syntax: impl Into<String>) -> Self {
        self.syntax = syntax.into();
        self
    }

    /// Adds example invocations.
    #[must_use]
    pub fn with_examples(mut self, examples: impl IntoIterator<Item = impl Into<String>>) -> Self {
        self.examples.extend(examples.into_iter().map(Into::into));
        self
    }

    /// Adds supported flags.
    #[must_use]
    pub fn with_flags(mut self, flags: impl IntoIterator<Item = impl Into<String>>) -> Self {
        self.flags.extend(flags.into_iter().map(Into::into));
        self
    }
}
