//! Time-limited dispatch.
//!
//! **Note**: This module requires the `tokio` runtime.

use relay_core::{Behavior, BoxError, CancellationToken, Next, Request, Response};
use std::time::Duration;
use thiserror::Error;

/// Error returned when the rest of the chain exceeds its time limit.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
#[error("dispatch timed out after {0:?}")]
pub struct TimeoutError(pub Duration);

/// A behavior that bounds the rest of the chain with a timeout.
///
/// # Example
///
/// ```rust,ignore
/// let registry = ServiceRegistry::builder()
///     .behavior::<Report, Summary>(TimeoutBehavior::secs(5))
///     .handler::<Report, Summary>(SlowHandler)
///     .build()?;
/// ```
#[derive(Debug, Clone, Copy)]
pub struct TimeoutBehavior {
    duration: Duration,
}

impl TimeoutBehavior {
    /// Create a timeout behavior.
    pub const fn new(duration: Duration) -> Self {
        Self { duration }
    }

    /// Create a timeout behavior with the limit in seconds.
    pub const fn secs(seconds: u64) -> Self {
        Self::new(Duration::from_secs(seconds))
    }

    /// Create a timeout behavior with the limit in milliseconds.
    pub const fn millis(millis: u64) -> Self {
        Self::new(Duration::from_millis(millis))
    }

    /// Get the configured limit.
    pub fn duration(&self) -> Duration {
        self.duration
    }
}

impl<Req: Request, Res: Response> Behavior<Req, Res> for TimeoutBehavior {
    async fn handle(
        &self,
        _request: &Req,
        _cancel: &CancellationToken,
        next: Next<'_, Res>,
    ) -> Result<Res, BoxError> {
        match tokio::time::timeout(self.duration, next.run()).await {
            Ok(result) => result,
            Err(_) => Err(Box::new(TimeoutError(self.duration))),
        }
    }
}
