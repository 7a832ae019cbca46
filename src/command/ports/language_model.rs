//! Language-model port used by speculative contextual heuristics.

use async_trait::async_trait;
use std::sync::Arc;
use thiserror::Error;

/// Single-shot text completion.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait LanguageModel: Send + Sync {
    /// Completes the prompt.
    ///
    /// # Errors
    ///
    /// Returns [`LanguageModelError`] when no completion is available.
    async fn complete(&self, prompt: &str) -> Result<String, LanguageModelError>;
}

/// Errors returned by language-model adapters.
#[derive(Debug, Clone, Error)]
pub enum LanguageModelError {
    /// No model is configured or reachable.
    #[error("language model is unavailable")]
    Unavailable,

    /// Failure inside the adapter.
    #[error("language model error: {0}")]
    Runtime(Arc<dyn std::error::Error + Send + Sync>),
}

impl LanguageModelError {
    /// Wraps a runtime error raised by the adapter.
    pub fn runtime(err: impl std::error::Error + Send + Sync + 'static) -> Self {
        Self::Runtime(Arc::new(err))
    }
}
