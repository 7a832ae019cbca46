//! Rendering commands back into canonical text.

use serde_json::Value;

use crate::command::domain::{Command, CommandAddress};

/// Builds the canonical name of a command from its parts.
///
/// ```
/// use command_deck::command::domain::{CommandAddress, Domain};
/// use command_deck::command::parser::format_command;
///
/// let address = CommandAddress::Domain(Domain::Git);
/// assert_eq!(format_command(&address, "stash", Some("pop")), "@git:stash:pop");
/// assert_eq!(format_command(&CommandAddress::core(), "help", None), "/help");
/// ```
#[must_use]
pub fn format_command(address: &CommandAddress, command: &str, sub_command: Option<&str>) -> String {
    let qualified = address.qualify(command);
    match sub_command {
        Some(sub) if !sub.is_empty() => format!("{qualified}:{sub}"),
        _ => qualified,
    }
}

/// Renders a command with its arguments, flags, and options.
///
/// The output re-parses to an equivalent command. Values containing
/// whitespace, quotes, or backslashes are double-quoted.
#[must_use]
pub fn format_command_with_args(command: &Command) -> String {
    let mut parts = vec![format_command(
        &command.address(),
        &command.command,
        command.sub_command.as_deref(),
    )];

    parts.extend(command.args.iter().map(format_value));
    parts.extend(command.flags.iter().map(|(key, value)| match value {
        Value::Bool(true) => format!("--{key}"),
        _ => format!("--{key}={}", format_value(value)),
    }));
    parts.extend(
        command
            .options
            .iter()
            .map(|(key, value)| format!("{key}={}", format_value(value))),
    );

    parts.join(" ")
}

fn format_value(value: &Value) -> String {
    match value {
        Value::String(text) => quote(text),
        other => quote(&other.to_string()),
    }
}

/// Double-quotes a value when the tokenizer would otherwise split or
/// unescape it.
pub(crate) fn quote(value: &str) -> String {
    let needs_quotes = value.is_empty()
        || value
            .chars()
            .any(|character| character.is_whitespace() || matches!(character, '"' | '\'' | '\\'));
    if !needs_quotes {
        return value.to_owned();
    }

    let mut quoted = String::with_capacity(value.len() + 2);
    quoted.push('"');
    for character in value.chars() {
        if matches!(character, '"' | '\\') {
            quoted.push('\\');
        }
        quoted.push(character);
    }
    quoted.push('"');
    quoted
}
