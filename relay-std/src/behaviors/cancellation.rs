//! Cooperative cancellation.

use futures::future::{Either, select};
use relay_core::{Behavior, BoxError, CancellationToken, Next, Request, Response};
use std::pin::pin;
use thiserror::Error;

/// Error returned when a dispatch observes its cancellation token.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
#[error("dispatch cancelled")]
pub struct Cancelled;

/// A behavior that enforces the cancellation token on the rest of the chain.
///
/// Fails with [`Cancelled`] without running the chain if the token is
/// already cancelled, and abandons the chain if the token is cancelled while
/// it runs. Register it first to cover every other participant.
#[derive(Debug, Clone, Copy, Default)]
pub struct CancellationBehavior;

impl CancellationBehavior {
    /// Create a cancellation behavior.
    pub const fn new() -> Self {
        Self
    }
}

impl<Req: Request, Res: Response> Behavior<Req, Res> for CancellationBehavior {
    async fn handle(
        &self,
        _request: &Req,
        cancel: &CancellationToken,
        next: Next<'_, Res>,
    ) -> Result<Res, BoxError> {
        if cancel.is_cancelled() {
            return Err(Box::new(Cancelled));
        }

        let run = pin!(next.run());
        let cancelled = pin!(cancel.cancelled());
        match select(run, cancelled).await {
            Either::Left((result, _)) => result,
            Either::Right(((), _)) => Err(Box::new(Cancelled)),
        }
    }
}
