//! Compatibility shim for handlers that return untyped JSON.
//!
//! This is the only place handler return shapes are sniffed. Everything
//! else speaks [`HandlerOutput`].

use async_trait::async_trait;
use serde_json::Value;
use std::fmt;
use std::future::Future;

use crate::command::domain::{CommandResult, DisplayMode, HandlerOutput};
use crate::command::ports::{CommandHandler, HandlerError, HandlerInvocation, HandlerResult};

/// Wraps a handler that returns an untyped [`Value`].
pub struct LegacyHandler<F> {
    handler: F,
}

impl<F> fmt::Debug for LegacyHandler<F> {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter.debug_struct("LegacyHandler").finish_non_exhaustive()
    }
}

/// Wraps an async closure returning untyped JSON as a handler.
pub const fn legacy_handler_fn<F, Fut>(handler: F) -> LegacyHandler<F>
where
    F: Fn(HandlerInvocation) -> Fut + Send + Sync,
    Fut: Future<Output = Result<Value, HandlerError>> + Send,
{
    LegacyHandler { handler }
}

#[async_trait]
impl<F, Fut> CommandHandler for LegacyHandler<F>
where
    F: Fn(HandlerInvocation) -> Fut + Send + Sync,
    Fut: Future<Output = Result<Value, HandlerError>> + Send,
{
    async fn handle(&self, invocation: HandlerInvocation) -> HandlerResult {
        let value = (self.handler)(invocation).await?;
        Ok(sniff_output(value))
    }
}

/// Classifies an untyped return value.
///
/// - `null` is empty output
/// - a string is text, or markdown when it contains `#` or `**`
/// - an object with a boolean `success` is an already-shaped result
/// - an object with `content` is the legacy `{content, error?}` shape
/// - anything else is JSON data
#[must_use]
pub fn sniff_output(value: Value) -> HandlerOutput {
    match value {
        Value::Null => HandlerOutput::Empty,
        Value::String(text) => match DisplayMode::classify(&text) {
            DisplayMode::Markdown => HandlerOutput::Markdown(text),
            DisplayMode::Text | DisplayMode::Json => HandlerOutput::Text(text),
        },
        Value::Object(ref object) if object.get("success").is_some_and(Value::is_boolean) => {
            serde_json::from_value::<CommandResult>(value.clone())
                .map_or(HandlerOutput::Json(value), HandlerOutput::Result)
        }
        Value::Object(ref object) if object.contains_key("content") => {
            let content = match object.get("content") {
                Some(Value::String(text)) => text.clone(),
                Some(other) => other.to_string(),
                None => String::new(),
            };
            let error = match object.get("error") {
                Some(Value::String(message)) => Some(message.clone()),
                Some(Value::Bool(true)) => Some(content.clone()),
                _ => None,
            };
            HandlerOutput::Legacy { content, error }
        }
        other => HandlerOutput::Json(other),
    }
}
