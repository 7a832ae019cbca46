//! Command parser for the `@domain:command` and `/command` grammar.
//!
//! ```text
//! /command [args...] [--flag | --flag=value | -f [value]] [key=value...]
//! @domain:command[:subCommand] [args...] [flags/options as above]
//! ```
//!
//! Parsing is pure and never fails loudly. Text that is not a command, such
//! as `@someone said hi`, parses to `None` and is treated as prose.

mod arguments;
mod format;
mod suggestions;
mod tokenizer;

pub use arguments::{ExtractedArguments, extract_args_and_flags, infer_value};
pub use format::{format_command, format_command_with_args};
pub(crate) use format::quote;
pub use suggestions::{SYSTEM_COMMANDS, suggest_similar_commands};
pub use tokenizer::tokenize;

use crate::command::domain::{CORE_AGENT, Command, Domain, ParseError, ParsedCommand};

/// Parses chat text into structured commands.
#[derive(Debug, Clone, Copy, Default)]
pub struct CommandParser;

impl CommandParser {
    /// Creates a parser.
    #[must_use]
    pub const fn new() -> Self {
        Self
    }

    /// Returns `true` when the text starts with `/`, or starts with `@` and
    /// contains `:`.
    #[must_use]
    pub fn is_command(&self, text: &str) -> bool {
        let trimmed = text.trim_start();
        trimmed.starts_with('/') || (trimmed.starts_with('@') && trimmed.contains(':'))
    }

    /// Parses text into a command, or `None` when it is not a valid command.
    #[must_use]
    pub fn parse(&self, text: &str) -> Option<Command> {
        self.try_parse(text).ok()
    }

    /// Parses text into a command, reporting why it was rejected.
    ///
    /// # Errors
    ///
    /// Returns [`ParseError`] when the text is prose, lacks a `domain:command`
    /// separator, or has an empty address or command segment.
    pub fn try_parse(&self, text: &str) -> Result<Command, ParseError> {
        if !self.is_command(text) {
            return Err(ParseError::NotACommand);
        }

        let trimmed = text.trim();
        let tokens = tokenize(trimmed);
        let (head, rest) = tokens.split_first().ok_or(ParseError::NotACommand)?;
        let mut command = if let Some(name) = head.strip_prefix('/') {
            parse_slash_head(name)?
        } else if let Some(address) = head.strip_prefix('@') {
            parse_at_head(address)?
        } else {
            return Err(ParseError::NotACommand);
        };

        let extracted = extract_args_and_flags(rest);
        command.args = extracted.args;
        command.flags = extracted.flags;
        command.options = extracted.options;
        trimmed.clone_into(&mut command.raw_input);
        Ok(command)
    }

    /// Parses text and attaches diagnostics and suggestions on failure.
    #[must_use]
    pub fn parse_with_suggestions(&self, text: &str) -> ParsedCommand {
        match self.try_parse(text) {
            Ok(command) => ParsedCommand {
                command: Some(command),
                ..ParsedCommand::default()
            },
            Err(error) => ParsedCommand {
                command: None,
                error: Some(error),
                suggestions: suggest_similar_commands(text),
            },
        }
    }

    /// Splits text into tokens. See [`tokenize`].
    #[must_use]
    pub fn tokenize(&self, text: &str) -> Vec<String> {
        tokenize(text)
    }

    /// Suggests commands close to the given text. See
    /// [`suggest_similar_commands`].
    #[must_use]
    pub fn suggest_similar_commands(&self, text: &str) -> Vec<String> {
        suggest_similar_commands(text)
    }
}

fn parse_slash_head(name: &str) -> Result<Command, ParseError> {
    if name.is_empty() {
        return Err(ParseError::EmptyCommand);
    }
    let agent_id = match name.split_once(':') {
        Some((agent, _)) if !agent.is_empty() => agent.to_ascii_lowercase(),
        _ => CORE_AGENT.to_owned(),
    };
    Ok(Command {
        agent_id,
        ..Command::system(name)
    })
}

fn parse_at_head(address: &str) -> Result<Command, ParseError> {
    let mut segments = address.splitn(3, ':');
    let target = segments.next().unwrap_or_default();
    let name = segments
        .next()
        .ok_or_else(|| ParseError::MissingSeparator(address.to_owned()))?;
    let sub_command = segments
        .next()
        .filter(|sub| !sub.is_empty())
        .map(str::to_owned);

    if target.trim().is_empty() {
        return Err(ParseError::EmptyAddress);
    }
    if name.is_empty() {
        return Err(ParseError::EmptyCommand);
    }

    let command = Domain::from_name(target).map_or_else(
        || Command::for_agent(target.trim().to_ascii_lowercase(), name),
        |domain| Command::for_domain(domain, name),
    );
    Ok(Command {
        sub_command,
        ..command
    })
}
