//! Standard behaviors.
//!
//! - [`logging::LoggingBehavior`]: logs entry, exit and elapsed time
//! - [`tracing::TracingBehavior`]: runs the rest of the chain inside a span
//! - [`cancellation::CancellationBehavior`]: fails once the token is cancelled
//! - `timeout::TimeoutBehavior`: bounds the rest of the chain (`timeout` feature)

pub mod cancellation;
pub mod logging;
#[cfg(feature = "timeout")]
pub mod timeout;
pub mod tracing;
