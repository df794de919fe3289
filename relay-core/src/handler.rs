//! # Terminal Participant (Handler)
//!
//! A handler is the unique implementation bound to one `(request, response)`
//! type pair. It is the innermost step of every dispatch chain.
//!
//! # Usage Patterns
//!
//! 1. **Payload**: `impl Handler<GetUser, User> for UserHandler`
//! 2. **Payload-less**: `impl EmptyHandler<Stats> for StatsHandler`, wrapped
//!    in [`EmptyAdapter`] to serve [`EmptyRequest`]

use crate::{
    error::BoxError,
    request::{EmptyRequest, Request, Response},
};
use futures::future::BoxFuture;
use std::future::Future;
use tokio_util::sync::CancellationToken;

/// The terminal participant of a dispatch.
///
/// Handlers borrow the request and produce an owned response. Observing the
/// cancellation token is the handler's own responsibility.
///
/// # Static vs Dynamic Dispatch
///
/// This trait uses native `async fn` for zero-cost static dispatch.
/// Registries and dispatchers hold handlers as [`DynHandler`] trait objects.
///
/// # Example
///
/// ```rust
/// use relay_core::{BoxError, CancellationToken, Handler};
///
/// struct GetAnswer;
/// struct AnswerHandler;
///
/// impl Handler<GetAnswer, u32> for AnswerHandler {
///     async fn handle(&self, _request: &GetAnswer, _cancel: &CancellationToken) -> Result<u32, BoxError> {
///         Ok(42)
///     }
/// }
/// ```
#[diagnostic::on_unimplemented(
    message = "`{Self}` cannot handle `{Req}` -> `{Res}`",
    label = "missing `Handler<{Req}, {Res}>` implementation",
    note = "Handlers must implement `handle` for the request/response pair."
)]
pub trait Handler<Req: Request, Res: Response>: Send + Sync + 'static {
    /// Produce the response for `request`.
    fn handle(
        &self,
        request: &Req,
        cancel: &CancellationToken,
    ) -> impl Future<Output = Result<Res, BoxError>> + Send;
}

/// A handler for payload-less dispatch.
///
/// Wrap it in an [`EmptyAdapter`] to obtain a `Handler<EmptyRequest, Res>`.
pub trait EmptyHandler<Res: Response>: Send + Sync + 'static {
    /// Produce the response.
    fn handle_empty(
        &self,
        cancel: &CancellationToken,
    ) -> impl Future<Output = Result<Res, BoxError>> + Send;
}

/// Serves [`EmptyRequest`] with an [`EmptyHandler`].
#[derive(Debug, Clone, Copy, Default)]
pub struct EmptyAdapter<H>(H);

impl<H> EmptyAdapter<H> {
    /// Wrap a payload-less handler.
    pub const fn new(handler: H) -> Self {
        Self(handler)
    }

    /// Get the wrapped handler.
    pub fn inner(&self) -> &H {
        &self.0
    }

    /// Unwrap the handler.
    pub fn into_inner(self) -> H {
        self.0
    }
}

impl<Res: Response, H: EmptyHandler<Res>> Handler<EmptyRequest, Res> for EmptyAdapter<H> {
    fn handle(
        &self,
        _request: &EmptyRequest,
        cancel: &CancellationToken,
    ) -> impl Future<Output = Result<Res, BoxError>> + Send {
        self.0.handle_empty(cancel)
    }
}

/// Dynamic object-safe version of [`Handler`].
pub trait DynHandler<Req, Res>: Send + Sync + 'static {
    /// Produce the response for `request` (dynamic dispatch version).
    fn handle_dyn<'a>(
        &'a self,
        request: &'a Req,
        cancel: &'a CancellationToken,
    ) -> BoxFuture<'a, Result<Res, BoxError>>;
}

// Blanket implementation: Any type implementing Handler implements DynHandler automatically.
impl<Req: Request, Res: Response, T: Handler<Req, Res>> DynHandler<Req, Res> for T {
    fn handle_dyn<'a>(
        &'a self,
        request: &'a Req,
        cancel: &'a CancellationToken,
    ) -> BoxFuture<'a, Result<Res, BoxError>> {
        Box::pin(self.handle(request, cancel))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Doubler;
    struct Greeter;

    impl Handler<u32, u64> for Doubler {
        async fn handle(&self, request: &u32, _cancel: &CancellationToken) -> Result<u64, BoxError> {
            Ok(u64::from(*request) * 2)
        }
    }

    impl EmptyHandler<&'static str> for Greeter {
        async fn handle_empty(&self, _cancel: &CancellationToken) -> Result<&'static str, BoxError> {
            Ok("empty")
        }
    }

    #[tokio::test]
    async fn test_handler_through_dyn() {
        let handler: Box<dyn DynHandler<u32, u64>> = Box::new(Doubler);
        let cancel = CancellationToken::new();
        let result = handler.handle_dyn(&21, &cancel).await.unwrap();
        assert_eq!(result, 42);
    }

    #[tokio::test]
    async fn test_empty_handler_serves_empty_request() {
        let handler: Box<dyn DynHandler<EmptyRequest, &'static str>> =
            Box::new(EmptyAdapter::new(Greeter));
        let cancel = CancellationToken::new();
        let result = handler
            .handle_dyn(&EmptyRequest::new(), &cancel)
            .await
            .unwrap();
        assert_eq!(result, "empty");
    }
}
