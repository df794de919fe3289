//! Logging hook for dispatch observation.

use relay_core::{BoxError, CancellationToken, Hook, Request, Response};

/// A combined hook that logs around the handler.
///
/// Emits `tracing` info events with the request and response types. Does
/// nothing without the `tracing` feature.
#[derive(Debug, Clone, Copy, Default)]
pub struct LoggingHook;

impl LoggingHook {
    /// Create a logging hook.
    pub const fn new() -> Self {
        Self
    }
}

impl<Req: Request, Res: Response> Hook<Req, Res> for LoggingHook {
    async fn before(&self, _request: &Req, cancel: &CancellationToken) -> Result<(), BoxError> {
        #[cfg(feature = "tracing")]
        tracing::info!(
            request = std::any::type_name::<Req>(),
            cancelled = cancel.is_cancelled(),
            "invoking handler"
        );
        #[cfg(not(feature = "tracing"))]
        let _ = cancel;
        Ok(())
    }

    async fn after(
        &self,
        _request: &Req,
        _response: &Res,
        _cancel: &CancellationToken,
    ) -> Result<(), BoxError> {
        #[cfg(feature = "tracing")]
        tracing::info!(
            request = std::any::type_name::<Req>(),
            response = std::any::type_name::<Res>(),
            "handler responded"
        );
        Ok(())
    }
}
