//! Argument, flag, and option extraction with value inference.

use regex::Regex;
use serde_json::{Number, Value};
use std::sync::LazyLock;

use crate::command::domain::{CommandArgs, CommandFlags};

/// Positional arguments, flags, and options split out of a token list.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ExtractedArguments {
    /// Positional arguments.
    pub args: CommandArgs,
    /// `--flag`, `--key=value`, and `-f value` entries.
    pub flags: CommandFlags,
    /// Bare `key=value` entries.
    pub options: CommandFlags,
}

static NUMERIC: LazyLock<Option<Regex>> =
    LazyLock::new(|| Regex::new(r"^-?[0-9]+(\.[0-9]+)?$").ok());

enum Token<'a> {
    LongFlag { key: &'a str, value: Option<&'a str> },
    ShortFlag(&'a str),
    Option { key: &'a str, value: &'a str },
    Positional,
}

fn classify(token: &str) -> Token<'_> {
    if let Some(long) = token.strip_prefix("--") {
        if long.is_empty() {
            return Token::Positional;
        }
        return match long.split_once('=') {
            Some((key, value)) if !key.is_empty() => Token::LongFlag {
                key,
                value: Some(value),
            },
            Some(_) => Token::Positional,
            None => Token::LongFlag {
                key: long,
                value: None,
            },
        };
    }

    if let Some(short) = token.strip_prefix('-') {
        if short.is_empty() || is_numeric(token) {
            return Token::Positional;
        }
        return Token::ShortFlag(short);
    }

    match token.split_once('=') {
        Some((key, value)) if is_identifier(key) => Token::Option { key, value },
        _ => Token::Positional,
    }
}

/// Splits tokens into positional arguments, flags, and options.
///
/// - `--key=value` and `--flag` (boolean `true`)
/// - `-f value`, consuming the next token unless it starts with `-`
/// - bare `key=value` as an option when `key` is an identifier
/// - anything else, including negative numbers and a lone `--`, as a
///   positional argument
#[must_use]
pub fn extract_args_and_flags(tokens: &[String]) -> ExtractedArguments {
    let mut extracted = ExtractedArguments::default();
    let mut remaining = tokens.iter().peekable();

    while let Some(token) = remaining.next() {
        match classify(token) {
            Token::LongFlag { key, value } => {
                let inferred = value.map_or(Value::Bool(true), infer_value);
                extracted.flags.insert(key.to_owned(), inferred);
            }
            Token::ShortFlag(key) => {
                let inferred = remaining
                    .next_if(|next| !next.starts_with('-'))
                    .map_or(Value::Bool(true), |next| infer_value(next));
                extracted.flags.insert(key.to_owned(), inferred);
            }
            Token::Option { key, value } => {
                extracted.options.insert(key.to_owned(), infer_value(value));
            }
            Token::Positional => extracted.args.push(infer_value(token)),
        }
    }

    extracted
}

/// Infers a typed value from raw token text.
///
/// `true`/`false` become booleans, decimal numbers become numbers, and text
/// wrapped in `{}` or `[]` is parsed as JSON, falling back to a string when
/// it is not valid JSON.
#[must_use]
pub fn infer_value(raw: &str) -> Value {
    match raw {
        "true" => return Value::Bool(true),
        "false" => return Value::Bool(false),
        _ => {}
    }

    if is_numeric(raw) {
        if let Ok(integer) = raw.parse::<i64>() {
            return Value::from(integer);
        }
        if let Some(number) = raw.parse::<f64>().ok().and_then(Number::from_f64) {
            return Value::Number(number);
        }
    }

    let looks_like_json = (raw.starts_with('{') && raw.ends_with('}'))
        || (raw.starts_with('[') && raw.ends_with(']'));
    if looks_like_json {
        if let Ok(parsed) = serde_json::from_str(raw) {
            return parsed;
        }
    }

    Value::String(raw.to_owned())
}

fn is_numeric(raw: &str) -> bool {
    NUMERIC
        .as_ref()
        .is_some_and(|pattern| pattern.is_match(raw))
}

pub(crate) fn is_identifier(value: &str) -> bool {
    !value.is_empty()
        && value
            .chars()
            .all(|character| character.is_ascii_alphanumeric() || matches!(character, '-' | '_'))
}
