//! The canonical result envelope and the typed handler output union.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::CommandError;

/// How a chat surface should render a result.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DisplayMode {
    /// Plain text.
    #[default]
    Text,
    /// Markdown.
    Markdown,
    /// Structured JSON data.
    Json,
}

impl DisplayMode {
    /// Classifies free text: headings or bold markers mean markdown.
    #[must_use]
    pub fn classify(text: &str) -> Self {
        if text.contains('#') || text.contains("**") {
            Self::Markdown
        } else {
            Self::Text
        }
    }
}

/// The sole result contract returned to callers.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CommandResult {
    /// Whether the command succeeded.
    pub success: bool,
    /// Short human-readable summary.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    /// Rendered body.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
    /// Structured payload.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<Value>,
    /// Failure description.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    /// Rendering hint.
    #[serde(default)]
    pub display_mode: DisplayMode,
    /// Quick-reply commands in full syntax.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub suggested_next_commands: Vec<String>,
}

impl CommandResult {
    /// Creates a successful result with a summary message.
    #[must_use]
    pub fn success(message: impl Into<String>) -> Self {
        Self {
            success: true,
            message: Some(message.into()),
            ..Self::default()
        }
    }

    /// Creates a successful plain-text result.
    #[must_use]
    pub fn text(content: impl Into<String>) -> Self {
        Self {
            success: true,
            content: Some(content.into()),
            display_mode: DisplayMode::Text,
            ..Self::default()
        }
    }

    /// Creates a successful markdown result.
    #[must_use]
    pub fn markdown(content: impl Into<String>) -> Self {
        Self {
            success: true,
            content: Some(content.into()),
            display_mode: DisplayMode::Markdown,
            ..Self::default()
        }
    }

    /// Creates a successful JSON result.
    #[must_use]
    pub fn json(data: Value) -> Self {
        Self {
            success: true,
            data: Some(data),
            display_mode: DisplayMode::Json,
            ..Self::default()
        }
    }

    /// Creates a failed result.
    #[must_use]
    pub fn failure(error: impl Into<String>) -> Self {
        Self {
            success: false,
            error: Some(error.into()),
            ..Self::default()
        }
    }

    /// Creates the result reported for a cancelled execution.
    #[must_use]
    pub fn cancelled() -> Self {
        Self::failure(CANCELLED_MESSAGE).with_message("Command execution was cancelled")
    }

    /// Returns `true` when this result reports a cancellation.
    #[must_use]
    pub fn is_cancelled(&self) -> bool {
        !self.success && self.error.as_deref() == Some(CANCELLED_MESSAGE)
    }

    /// Sets the summary message.
    #[must_use]
    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = Some(message.into());
        self
    }

    /// Sets the structured payload.
    #[must_use]
    pub fn with_data(mut self, data: Value) -> Self {
        self.data = Some(data);
        self
    }

    /// Sets the rendering hint.
    #[must_use]
    pub const fn with_display_mode(mut self, display_mode: DisplayMode) -> Self {
        self.display_mode = display_mode;
        self
    }

    /// Sets the quick-reply suggestions.
    #[must_use]
    pub fn with_suggestions(mut self, suggestions: impl IntoIterator<Item = String>) -> Self {
        self.suggested_next_commands = suggestions.into_iter().collect();
        self
    }

    /// Converts a command error into a failed result.
    ///
    /// Lookup errors carry their suggestions; parse errors point at `/help`.
    #[must_use]
    pub fn from_error(error: &CommandError) -> Self {
        match error {
            CommandError::Cancelled => Self::cancelled(),
            CommandError::Lookup { suggestions, .. } => {
                Self::failure(error.to_string()).with_suggestions(suggestions.iter().cloned())
            }
            CommandError::Parse(_) => {
                Self::failure(error.to_string()).with_suggestions(["/help".to_owned()])
            }
            CommandError::Execution(_) | CommandError::PluginUnavailable { .. } => {
                Self::failure(error.to_string())
            }
        }
    }
}

const CANCELLED_MESSAGE: &str = "cancelled";

/// Closed set of shapes a handler may return.
///
/// Every variant normalizes into a [`CommandResult`] through
/// [`HandlerOutput::into_result`]. Untyped legacy returns are sniffed into
/// this union by [`crate::command::adapters::LegacyHandler`] only.
#[derive(Debug, Clone, PartialEq)]
pub enum HandlerOutput {
    /// The handler produced nothing.
    Empty,
    /// Plain text.
    Text(String),
    /// Markdown.
    Markdown(String),
    /// Structured JSON data.
    Json(Value),
    /// An already-shaped result.
    Result(CommandResult),
    /// The legacy `{content, error?}` shape.
    Legacy {
        /// Rendered body.
        content: String,
        /// Failure description, when the legacy handler flagged one.
        error: Option<String>,
    },
}

impl HandlerOutput {
    /// Normalizes the output into the canonical result envelope.
    #[must_use]
    pub fn into_result(self) -> CommandResult {
        match self {
            Self::Empty => CommandResult::success("Command completed"),
            Self::Text(content) => CommandResult::text(content),
            Self::Markdown(content) => CommandResult::markdown(content),
            Self::Json(data) => CommandResult::json(data),
            Self::Result(result) => result,
            Self::Legacy { content, error } => {
                let display_mode = DisplayMode::classify(&content);
                CommandResult {
                    success: error.is_none(),
                    content: Some(content),
                    error,
                    display_mode,
                    ..CommandResult::default()
                }
            }
        }
    }
}

impl From<CommandResult> for HandlerOutput {
    fn from(result: CommandResult) -> Self {
        Self::Result(result)
    }
}
