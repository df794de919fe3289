//! Tower integration for relay.
//!
//! [`DispatchService`] exposes one `(request, response)` pair of a
//! [`Dispatcher`] as a `tower::Service`, so tower middleware can sit in
//! front of a dispatch.
//!
//! # Example
//!
//! ```rust,ignore
//! use relay::tower::DispatchService;
//!
//! let service = DispatchService::<GetUser, User>::new(dispatcher);
//!
//! // Now usable with tower middleware
//! let limited = tower::limit::ConcurrencyLimit::new(service, 64);
//! ```

use crate::{CancellationToken, DispatchError, Dispatcher, Request, Response};
use futures::future::BoxFuture;
use std::{
    marker::PhantomData,
    task::{Context, Poll},
};

/// A `tower::Service` dispatching `Req` for a `Res`.
///
/// Every call runs with a child of the service's root token, so cancelling
/// the root with [`cancel`](Self::cancel) cancels every in-flight call while
/// individual calls stay independent.
pub struct DispatchService<Req, Res> {
    dispatcher: Dispatcher,
    cancel: CancellationToken,
    _marker: PhantomData<fn(Req) -> Res>,
}

impl<Req, Res> DispatchService<Req, Res> {
    /// Create a service with a fresh root token.
    pub fn new(dispatcher: Dispatcher) -> Self {
        Self::with_cancellation(dispatcher, CancellationToken::new())
    }

    /// Create a service deriving call tokens from `cancel`.
    pub fn with_cancellation(dispatcher: Dispatcher, cancel: CancellationToken) -> Self {
        Self {
            dispatcher,
            cancel,
            _marker: PhantomData,
        }
    }

    /// Get the underlying dispatcher.
    pub fn dispatcher(&self) -> &Dispatcher {
        &self.dispatcher
    }

    /// Cancel the root token, and with it every call issued so far and
    /// every later one.
    pub fn cancel(&self) {
        self.cancel.cancel();
    }
}

impl<Req, Res> Clone for DispatchService<Req, Res> {
    fn clone(&self) -> Self {
        Self {
            dispatcher: self.dispatcher.clone(),
            cancel: self.cancel.clone(),
            _marker: PhantomData,
        }
    }
}

impl<Req, Res> std::fmt::Debug for DispatchService<Req, Res> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DispatchService")
            .field("dispatcher", &self.dispatcher)
            .field("cancelled", &self.cancel.is_cancelled())
            .finish()
    }
}

impl<Req, Res> ::tower::Service<Req> for DispatchService<Req, Res>
where
    Req: Request,
    Res: Response,
{
    type Response = Res;
    type Error = DispatchError;
    type Future = BoxFuture<'static, Result<Res, DispatchError>>;

    fn poll_ready(&mut self, _cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        // The dispatcher has no capacity limit.
        Poll::Ready(Ok(()))
    }

    fn call(&mut self, request: Req) -> Self::Future {
        let dispatcher = self.dispatcher.clone();
        let cancel = self.cancel.child_token();
        Box::pin(async move { dispatcher.dispatch::<Req, Res>(request, cancel).await })
    }
}
