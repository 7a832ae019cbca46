//! Closure-backed command handlers.

use async_trait::async_trait;
use std::fmt;
use std::future::Future;

use crate::command::ports::{CommandHandler, HandlerInvocation, HandlerResult};

/// Adapts an async closure into a [`CommandHandler`].
pub struct FnHandler<F> {
    handler: F,
}

impl<F> fmt::Debug for FnHandler<F> {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter.debug_struct("FnHandler").finish_non_exhaustive()
    }
}

/// Wraps an async closure as a handler.
///
/// ```
/// use command_deck::command::adapters::handler_fn;
/// use command_deck::command::domain::HandlerOutput;
///
/// let handler = handler_fn(|invocation| async move {
///     Ok(HandlerOutput::Text(format!("ran {}", invocation.command)))
/// });
/// # let _ = handler;
/// ```
pub const fn handler_fn<F, Fut>(handler: F) -> FnHandler<F>
where
    F: Fn(HandlerInvocation) -> Fut + Send + Sync,
    Fut: Future<Output = HandlerResult> + Send,
{
    FnHandler { handler }
}

#[async_trait]
impl<F, Fut> CommandHandler for FnHandler<F>
where
    F: Fn(HandlerInvocation) -> Fut + Send + Sync,
    Fut: Future<Output = HandlerResult> + Send,
{
    async fn handle(&self, invocation: HandlerInvocation) -> HandlerResult {
        (self.handler)(invocation).await
    }
}
