//! Handler contract for registered commands.

use async_trait::async_trait;
use thiserror::Error;
use tokio_util::sync::CancellationToken;

use crate::command::domain::{CommandArgs, CommandError, CommandFlags, HandlerOutput};

/// Result type returned by command handlers.
pub type HandlerResult = Result<HandlerOutput, HandlerError>;

/// Everything a handler receives for one execution.
///
/// The cancellation token is advisory: a handler that never observes it runs
/// to completion, although the executor still reports the execution as
/// cancelled when the token fired before the handler returned.
#[derive(Debug, Clone, Default)]
pub struct HandlerInvocation {
    /// Command name as registered.
    pub command: String,
    /// Positional arguments.
    pub args: CommandArgs,
    /// Flag values.
    pub flags: CommandFlags,
    /// Bare `key=value` options.
    pub options: CommandFlags,
    /// Cancellation signal for this execution.
    pub cancellation: CancellationToken,
}

impl HandlerInvocation {
    /// Creates an invocation with no arguments and a fresh token.
    #[must_use]
    pub fn new(command: impl Into<String>) -> Self {
        Self {
            command: command.into(),
            ..Self::default()
        }
    }

    /// Sets the positional arguments.
    #[must_use]
    pub fn with_args(mut self, args: CommandArgs) -> Self {
        self.args = args;
        self
    }

    /// Sets the flags.
    #[must_use]
    pub fn with_flags(mut self, flags: CommandFlags) -> Self {
        self.flags = flags;
        self
    }

    /// Sets the options.
    #[must_use]
    pub fn with_options(mut self, options: CommandFlags) -> Self {
        self.options = options;
        self
    }

    /// Sets the cancellation token.
    #[must_use]
    pub fn with_cancellation(mut self, cancellation: CancellationToken) -> Self {
        self.cancellation = cancellation;
        self
    }

    /// Returns `true` once the execution has been cancelled.
    #[must_use]
    pub fn is_cancelled(&self) -> bool {
        self.cancellation.is_cancelled()
    }

    /// Returns the first positional argument rendered as text.
    #[must_use]
    pub fn first_arg(&self) -> Option<String> {
        self.args.first().map(|value| match value {
            serde_json::Value::String(text) => text.clone(),
            other => other.to_string(),
        })
    }
}

/// An async command handler.
#[async_trait]
pub trait CommandHandler: Send + Sync {
    /// Runs the command.
    ///
    /// # Errors
    ///
    /// Returns [`HandlerError`] when the command fails or observes
    /// cancellation.
    async fn handle(&self, invocation: HandlerInvocation) -> HandlerResult;
}

/// Errors raised by command handlers.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum HandlerError {
    /// The handler failed; the message is shown to the user.
    #[error("{0}")]
    Failed(String),

    /// The arguments were not acceptable.
    #[error("invalid arguments: {0}")]
    InvalidArguments(String),

    /// The handler observed cancellation and stopped.
    #[error("command was cancelled")]
    Cancelled,
}

impl HandlerError {
    /// Creates a failure with the given message.
    #[must_use]
    pub fn failed(message: impl Into<String>) -> Self {
        Self::Failed(message.into())
    }
}

impl From<HandlerError> for CommandError {
    fn from(error: HandlerError) -> Self {
        match error {
            HandlerError::Cancelled => Self::Cancelled,
            other => Self::Execution(other.to_string()),
        }
    }
}
