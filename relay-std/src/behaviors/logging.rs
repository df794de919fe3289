//! Logging behavior for dispatch observation.

use relay_core::{Behavior, BoxError, CancellationToken, Next, Request, Response};

/// A behavior that logs a dispatch before and after the rest of the chain.
///
/// Emits `tracing` debug events with the request type, the elapsed time and
/// the outcome. Does nothing but pass through without the `tracing` feature.
#[derive(Debug, Clone, Copy, Default)]
pub struct LoggingBehavior;

impl LoggingBehavior {
    /// Create a logging behavior.
    pub const fn new() -> Self {
        Self
    }
}

impl<Req: Request, Res: Response> Behavior<Req, Res> for LoggingBehavior {
    async fn handle(
        &self,
        _request: &Req,
        _cancel: &CancellationToken,
        next: Next<'_, Res>,
    ) -> Result<Res, BoxError> {
        #[cfg(feature = "tracing")]
        let started = {
            tracing::debug!(request = std::any::type_name::<Req>(), "handling request");
            std::time::Instant::now()
        };

        let result = next.run().await;

        #[cfg(feature = "tracing")]
        match &result {
            Ok(_) => tracing::debug!(
                request = std::any::type_name::<Req>(),
                elapsed = ?started.elapsed(),
                "request handled"
            ),
            Err(err) => tracing::warn!(
                request = std::any::type_name::<Req>(),
                elapsed = ?started.elapsed(),
                error = %err,
                "request failed"
            ),
        }

        result
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use relay_core::DynBehavior;

    #[tokio::test]
    async fn test_passes_response_through() {
        let behavior: &dyn DynBehavior<(), &'static str> = &LoggingBehavior::new();
        let cancel = CancellationToken::new();
        let next = Next::from_fn(|| Box::pin(async { Ok::<_, BoxError>("ok") }));

        let response = behavior.handle_dyn(&(), &cancel, next).await.unwrap();
        assert_eq!(response, "ok");
    }

    #[tokio::test]
    async fn test_passes_failure_through() {
        let behavior: &dyn DynBehavior<(), u8> = &LoggingBehavior::new();
        let cancel = CancellationToken::new();
        let next = Next::from_fn(|| Box::pin(async { Err::<u8, BoxError>("boom".into()) }));

        let err = behavior.handle_dyn(&(), &cancel, next).await.unwrap_err();
        assert_eq!(err.to_string(), "boom");
    }
}
