//! Span instrumentation.

use relay_core::{Behavior, BoxError, CancellationToken, Next, Request, Response};

#[cfg(feature = "tracing")]
use tracing::Instrument;

/// A behavior that runs the rest of the chain inside an `info` span.
///
/// The span is named `dispatch` and records the behavior's label and the
/// request type. Without the `tracing` feature it simply runs the chain.
#[derive(Debug, Clone, Copy)]
pub struct TracingBehavior {
    name: &'static str,
}

impl TracingBehavior {
    /// Create a tracing behavior labelled `name`.
    pub const fn new(name: &'static str) -> Self {
        Self { name }
    }

    /// Get the label recorded on the span.
    pub fn name(&self) -> &'static str {
        self.name
    }
}

impl Default for TracingBehavior {
    fn default() -> Self {
        Self::new("relay")
    }
}

impl<Req: Request, Res: Response> Behavior<Req, Res> for TracingBehavior {
    #[cfg(feature = "tracing")]
    async fn handle(
        &self,
        _request: &Req,
        _cancel: &CancellationToken,
        next: Next<'_, Res>,
    ) -> Result<Res, BoxError> {
        let span = tracing::info_span!(
            "dispatch",
            behavior = %self.name,
            request = std::any::type_name::<Req>(),
            response = std::any::type_name::<Res>(),
        );
        next.run().instrument(span).await
    }

    #[cfg(not(feature = "tracing"))]
    async fn handle(
        &self,
        _request: &Req,
        _cancel: &CancellationToken,
        next: Next<'_, Res>,
    ) -> Result<Res, BoxError> {
        next.run().await
    }
}
