//! # Wrapping Participant (Behavior)
//!
//! Behaviors are the only participants that can alter control flow. Each one
//! receives the request, the cancellation token and a [`Next`] continuation
//! standing for the rest of the chain.
//!
//! - Run logic before, after or around `next.run()`
//! - Short-circuit by returning without calling `next.run()`
//! - Replace or post-process the response
//!
//! The first registered behavior is the outermost one: its pre-continuation
//! logic runs first and its post-continuation logic runs last.

use crate::{
    error::BoxError,
    request::{Request, Response},
};
use futures::future::BoxFuture;
use std::future::Future;
use tokio_util::sync::CancellationToken;

/// A zero-argument callable running the remainder of a dispatch.
pub type Chain<'a, Res> = Box<dyn FnOnce() -> BoxFuture<'a, Result<Res, BoxError>> + Send + 'a>;

/// The continuation handed to a [`Behavior`].
///
/// Running it consumes it, so the rest of the chain executes at most once per
/// behavior. Dropping it without running short-circuits the dispatch.
pub struct Next<'a, Res> {
    chain: Chain<'a, Res>,
}

impl<'a, Res> Next<'a, Res> {
    /// Wrap a composed chain as a continuation.
    pub fn new(chain: Chain<'a, Res>) -> Self {
        Self { chain }
    }

    /// Build a continuation from a closure.
    pub fn from_fn<F>(f: F) -> Self
    where
        F: FnOnce() -> BoxFuture<'a, Result<Res, BoxError>> + Send + 'a,
    {
        Self { chain: Box::new(f) }
    }

    /// Run the rest of the chain.
    pub async fn run(self) -> Result<Res, BoxError> {
        (self.chain)().await
    }

    /// Unwrap the underlying chain.
    pub fn into_chain(self) -> Chain<'a, Res> {
        self.chain
    }
}

impl<Res> std::fmt::Debug for Next<'_, Res> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Next").finish_non_exhaustive()
    }
}

/// A cross-cutting participant wrapping the handler invocation.
///
/// # Example
///
/// ```rust
/// use relay_core::{Behavior, BoxError, CancellationToken, Next};
///
/// struct Uppercase;
///
/// impl<Req: Send + Sync + 'static> Behavior<Req, String> for Uppercase {
///     async fn handle(
///         &self,
///         _request: &Req,
///         _cancel: &CancellationToken,
///         next: Next<'_, String>,
///     ) -> Result<String, BoxError> {
///         Ok(next.run().await?.to_uppercase())
///     }
/// }
/// ```
#[diagnostic::on_unimplemented(
    message = "`{Self}` does not implement `Behavior<{Req}, {Res}>`",
    label = "missing `Behavior` implementation",
    note = "Behaviors must implement `handle` and call `next.run()` to proceed."
)]
pub trait Behavior<Req: Request, Res: Response>: Send + Sync + 'static {
    /// Wrap the rest of the chain.
    fn handle(
        &self,
        request: &Req,
        cancel: &CancellationToken,
        next: Next<'_, Res>,
    ) -> impl Future<Output = Result<Res, BoxError>> + Send;
}

/// Dynamic object-safe version of [`Behavior`].
pub trait DynBehavior<Req, Res>: Send + Sync + 'static {
    /// Wrap the rest of the chain (dynamic dispatch version).
    fn handle_dyn<'a>(
        &'a self,
        request: &'a Req,
        cancel: &'a CancellationToken,
        next: Next<'a, Res>,
    ) -> BoxFuture<'a, Result<Res, BoxError>>;
}

impl<Req: Request, Res: Response, T: Behavior<Req, Res>> DynBehavior<Req, Res> for T {
    fn handle_dyn<'a>(
        &'a self,
        request: &'a Req,
        cancel: &'a CancellationToken,
        next: Next<'a, Res>,
    ) -> BoxFuture<'a, Result<Res, BoxError>> {
        Box::pin(self.handle(request, cancel, next))
    }
}
