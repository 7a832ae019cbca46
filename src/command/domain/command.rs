//! Parsed command values.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;

use super::{
    CommandAddress, CommandKind, CommandPrefix, CommandResult, Domain, ParseError, CORE_AGENT,
};

/// Positional arguments with inferred types.
pub type CommandArgs = Vec<Value>;

/// Named flag or option values with inferred types.
pub type CommandFlags = BTreeMap<String, Value>;

/// A structured command produced from user text.
///
/// A command is created per parse call and is not retained, except as part
/// of an execution history record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Command {
    /// Leading sigil.
    pub prefix: CommandPrefix,
    /// Addressing scheme.
    pub kind: CommandKind,
    /// Resolved domain for `@domain:` commands.
    pub domain: Option<Domain>,
    /// Agent identifier; `core` for internal commands.
    pub agent_id: String,
    /// Command name.
    pub command: String,
    /// Optional third address segment (`@domain:command:sub`).
    pub sub_command: Option<String>,
    /// Positional arguments.
    pub args: CommandArgs,
    /// `--flag`, `--key=value`, and `-f value` values.
    pub flags: CommandFlags,
    /// Bare `key=value` options.
    pub options: CommandFlags,
    /// Original input text.
    pub raw_input: String,
}

impl Command {
    /// Creates an internal command for the `core` agent with no arguments.
    #[must_use]
    pub fn system(command: impl Into<String>) -> Self {
        let name = command.into();
        Self {
            prefix: CommandPrefix::Slash,
            kind: CommandKind::System,
            domain: None,
            agent_id: CORE_AGENT.to_owned(),
            raw_input: format!("/{name}"),
            command: name,
            sub_command: None,
            args: Vec::new(),
            flags: BTreeMap::new(),
            options: BTreeMap::new(),
        }
    }

    /// Creates a domain-addressed command with no arguments.
    #[must_use]
    pub fn for_domain(domain: Domain, command: impl Into<String>) -> Self {
        let name = command.into();
        Self {
            prefix: CommandPrefix::At,
            kind: CommandKind::Domain,
            domain: Some(domain),
            agent_id: domain.as_str().to_owned(),
            raw_input: format!("@{domain}:{name}"),
            command: name,
            sub_command: None,
            args: Vec::new(),
            flags: BTreeMap::new(),
            options: BTreeMap::new(),
        }
    }

    /// Creates a legacy agent-addressed command with no arguments.
    #[must_use]
    pub fn for_agent(agent_id: impl Into<String>, command: impl Into<String>) -> Self {
        let agent = agent_id.into();
        let name = command.into();
        Self {
            prefix: CommandPrefix::At,
            kind: CommandKind::Agent,
            domain: None,
            raw_input: format!("@{agent}:{name}"),
            agent_id: agent,
            command: name,
            sub_command: None,
            args: Vec::new(),
            flags: BTreeMap::new(),
            options: BTreeMap::new(),
        }
    }

    /// Replaces the positional arguments.
    #[must_use]
    pub fn with_args(mut self, args: CommandArgs) -> Self {
        self.args = args;
        self
    }

    /// Adds a flag value.
    #[must_use]
    pub fn with_flag(mut self, key: impl Into<String>, value: Value) -> Self {
        self.flags.insert(key.into(), value);
        self
    }

    /// Returns the handler namespace this command resolves to.
    #[must_use]
    pub fn address(&self) -> CommandAddress {
        match (self.domain, self.kind) {
            (Some(domain), _) => CommandAddress::Domain(domain),
            (None, CommandKind::System) => CommandAddress::core(),
            (None, _) => CommandAddress::Agent(self.agent_id.clone()),
        }
    }

    /// Returns the user-facing name, for example `@git:commit` or `/help`.
    #[must_use]
    pub fn display_name(&self) -> String {
        let qualified = self.address().qualify(&self.command);
        match &self.sub_command {
            Some(sub_command) => format!("{qualified}:{sub_command}"),
            None => qualified,
        }
    }
}

/// Result of parsing with diagnostics.
///
/// Parsing never fails loudly: malformed input yields an error value plus
/// suggestions that a caller can offer as quick replies.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ParsedCommand {
    /// The parsed command when parsing succeeded.
    pub command: Option<Command>,
    /// The rejection reason when parsing failed.
    pub error: Option<ParseError>,
    /// Close alternatives in full command syntax.
    pub suggestions: Vec<String>,
}

impl ParsedCommand {
    /// Returns `true` when parsing failed.
    #[must_use]
    pub const fn has_error(&self) -> bool {
        self.error.is_some()
    }

    /// Returns the rejection reason as text.
    #[must_use]
    pub fn error_message(&self) -> Option<String> {
        self.error.as_ref().map(ToString::to_string)
    }

    /// Converts a failed parse into the canonical failure envelope.
    ///
    /// Suggestions fall back to `/help` when none were found.
    #[must_use]
    pub fn into_failure_result(self) -> CommandResult {
        let message = self
            .error_message()
            .unwrap_or_else(|| "input is not a command".to_owned());
        let suggestions = if self.suggestions.is_empty() {
            vec!["/help".to_owned()]
        } else {
            self.suggestions
        };
        CommandResult::failure(message).with_suggestions(suggestions)
    }
}
