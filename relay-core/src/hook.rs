//! # Observing Participants (Hooks)
//!
//! Hooks run exactly once around the handler invocation and cannot intercept
//! or replace it. They are independent, non-interacting observers, executed as
//! flat ordered batches rather than a nested chain:
//!
//! 1. every [`PreHook`], in registration order
//! 2. every [`Hook::before`], in registration order
//! 3. the handler
//! 4. every [`PostHook`], in registration order
//! 5. every [`Hook::after`], in registration order
//!
//! A failing hook aborts the dispatch; its error reaches the caller unchanged.

use crate::{
    error::BoxError,
    request::{Request, Response},
};
use futures::future::BoxFuture;
use std::future::Future;
use tokio_util::sync::CancellationToken;

/// Observes a request before the handler runs.
#[diagnostic::on_unimplemented(
    message = "`{Self}` does not implement `PreHook<{Req}, {Res}>`",
    label = "missing `PreHook` implementation"
)]
pub trait PreHook<Req: Request, Res: Response>: Send + Sync + 'static {
    /// Called before the handler.
    fn on_request(
        &self,
        request: &Req,
        cancel: &CancellationToken,
    ) -> impl Future<Output = Result<(), BoxError>> + Send;
}

/// Observes a request and its response after the handler runs.
#[diagnostic::on_unimplemented(
    message = "`{Self}` does not implement `PostHook<{Req}, {Res}>`",
    label = "missing `PostHook` implementation"
)]
pub trait PostHook<Req: Request, Res: Response>: Send + Sync + 'static {
    /// Called after the handler produced `response`.
    fn on_response(
        &self,
        request: &Req,
        response: &Res,
        cancel: &CancellationToken,
    ) -> impl Future<Output = Result<(), BoxError>> + Send;
}

/// A combined hook observing both sides of the handler.
///
/// `before` runs after all pre-hooks; `after` runs after all post-hooks.
#[diagnostic::on_unimplemented(
    message = "`{Self}` does not implement `Hook<{Req}, {Res}>`",
    label = "missing `Hook` implementation",
    note = "Hooks must implement both `before` and `after`."
)]
pub trait Hook<Req: Request, Res: Response>: Send + Sync + 'static {
    /// Called before the handler.
    fn before(
        &self,
        request: &Req,
        cancel: &CancellationToken,
    ) -> impl Future<Output = Result<(), BoxError>> + Send;

    /// Called after the handler produced `response`.
    fn after(
        &self,
        request: &Req,
        response: &Res,
        cancel: &CancellationToken,
    ) -> impl Future<Output = Result<(), BoxError>> + Send;
}

/// Dynamic object-safe version of [`PreHook`].
pub trait DynPreHook<Req, Res>: Send + Sync + 'static {
    /// Called before the handler (dynamic dispatch version).
    fn on_request_dyn<'a>(
        &'a self,
        request: &'a Req,
        cancel: &'a CancellationToken,
    ) -> BoxFuture<'a, Result<(), BoxError>>;
}

impl<Req: Request, Res: Response, T: PreHook<Req, Res>> DynPreHook<Req, Res> for T {
    fn on_request_dyn<'a>(
        &'a self,
        request: &'a Req,
        cancel: &'a CancellationToken,
    ) -> BoxFuture<'a, Result<(), BoxError>> {
        Box::pin(self.on_request(request, cancel))
    }
}

/// Dynamic object-safe version of [`PostHook`].
pub trait DynPostHook<Req, Res>: Send + Sync + 'static {
    /// Called after the handler (dynamic dispatch version).
    fn on_response_dyn<'a>(
        &'a self,
        request: &'a Req,
        response: &'a Res,
        cancel: &'a CancellationToken,
    ) -> BoxFuture<'a, Result<(), BoxError>>;
}

impl<Req: Request, Res: Response, T: PostHook<Req, Res>> DynPostHook<Req, Res> for T {
    fn on_response_dyn<'a>(
        &'a self,
        request: &'a Req,
        response: &'a Res,
        cancel: &'a CancellationToken,
    ) -> BoxFuture<'a, Result<(), BoxError>> {
        Box::pin(self.on_response(request, response, cancel))
    }
}

/// Dynamic object-safe version of [`Hook`].
pub trait DynHook<Req, Res>: Send + Sync + 'static {
    /// Called before the handler (dynamic dispatch version).
    fn before_dyn<'a>(
        &'a self,
        request: &'a Req,
        cancel: &'a CancellationToken,
    ) -> BoxFuture<'a, Result<(), BoxError>>;

    /// Called after the handler (dynamic dispatch version).
    fn after_dyn<'a>(
        &'a self,
        request: &'a Req,
        response: &'a Res,
        cancel: &'a CancellationToken,
    ) -> BoxFuture<'a, Result<(), BoxError>>;
}

impl<Req: Request, Res: Response, T: Hook<Req, Res>> DynHook<Req, Res> for T {
    fn before_dyn<'a>(
        &'a self,
        request: &'a Req,
        cancel: &'a CancellationToken,
    ) -> BoxFuture<'a, Result<(), BoxError>> {
        Box::pin(self.before(request, cancel))
    }

    fn after_dyn<'a>(
        &'a self,
        request: &'a Req,
        response: &'a Res,
        cancel: &'a CancellationToken,
    ) -> BoxFuture<'a, Result<(), BoxError>> {
        Box::pin(self.after(request, response, cancel))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    #[derive(Default)]
    struct Journal {
        lines: Mutex<Vec<String>>,
    }

    impl Hook<String, usize> for Journal {
        async fn before(&self, request: &String, _cancel: &CancellationToken) -> Result<(), BoxError> {
            self.lines.lock().unwrap().push(format!("before:{request}"));
            Ok(())
        }

        async fn after(
            &self,
            request: &String,
            response: &usize,
            _cancel: &CancellationToken,
        ) -> Result<(), BoxError> {
            self.lines
                .lock()
                .unwrap()
                .push(format!("after:{request}:{response}"));
            Ok(())
        }
    }

    #[tokio::test]
    async fn test_hook_sides_through_dyn() {
        let journal = std::sync::Arc::new(Journal::default());
        let hook: std::sync::Arc<dyn DynHook<String, usize>> = journal.clone();
        let cancel = CancellationToken::new();
        let request = "ping".to_string();

        hook.before_dyn(&request, &cancel).await.unwrap();
        hook.after_dyn(&request, &4, &cancel).await.unwrap();

        let lines = journal.lines.lock().unwrap().clone();
        assert_eq!(lines, vec!["before:ping", "after:ping:4"]);
    }
}
