//! Testing utilities for Relay.
//!
//! Doubles for exercising dispatch ordering and failure paths without
//! writing a participant per test.
//!
//! - [`OrderLog`]: a shared, cloneable list of observed steps
//! - [`RecordingBehavior`], [`RecordingHook`], [`RecordingPreHook`],
//!   [`RecordingPostHook`]: participants that append to an [`OrderLog`]
//! - [`ShortCircuitBehavior`]: answers without calling the continuation
//! - [`CountingHandler`], [`FailingHandler`], [`FailingPreHook`]

use relay_core::{
    Behavior, BoxError, CancellationToken, Handler, Hook, Next, PostHook, PreHook, Request,
    Response,
};
use std::sync::{
    Arc, Mutex, MutexGuard, PoisonError,
    atomic::{AtomicUsize, Ordering},
};
use thiserror::Error;

// ============================================================================
// Order Log
// ============================================================================

/// A shared list of observed steps.
///
/// Clones share the same storage.
///
/// # Example
///
/// ```rust
/// use relay_std::testing::OrderLog;
///
/// let log = OrderLog::new();
/// log.clone().push("entered:A");
/// assert_eq!(log.entries(), vec!["entered:A"]);
/// ```
#[derive(Debug, Clone, Default)]
pub struct OrderLog(Arc<Mutex<Vec<String>>>);

impl OrderLog {
    /// Create an empty log.
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a step.
    pub fn push(&self, entry: impl Into<String>) {
        self.lock().push(entry.into());
    }

    /// Get a copy of the recorded steps.
    pub fn entries(&self) -> Vec<String> {
        self.lock().clone()
    }

    /// Get the number of recorded steps.
    pub fn len(&self) -> usize {
        self.lock().len()
    }

    /// Check if nothing was recorded.
    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    /// Forget every recorded step.
    pub fn clear(&self) {
        self.lock().clear();
    }

    fn lock(&self) -> MutexGuard<'_, Vec<String>> {
        self.0.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

// ============================================================================
// Recording Participants
// ============================================================================

/// A behavior recording `entered:{name}` and `exited:{name}` around the
/// continuation.
///
/// The exit is recorded whether the continuation succeeds or fails.
#[derive(Debug, Clone)]
pub struct RecordingBehavior {
    name: &'static str,
    log: OrderLog,
}

impl RecordingBehavior {
    /// Create a behavior appending to `log`.
    pub fn new(name: &'static str, log: OrderLog) -> Self {
        Self { name, log }
    }
}

impl<Req: Request, Res: Response> Behavior<Req, Res> for RecordingBehavior {
    async fn handle(
        &self,
        _request: &Req,
        _cancel: &CancellationToken,
        next: Next<'_, Res>,
    ) -> Result<Res, BoxError> {
        self.log.push(format!("entered:{}", self.name));
        let result = next.run().await;
        self.log.push(format!("exited:{}", self.name));
        result
    }
}

/// A pre-hook recording `pre:{name}`.
#[derive(Debug, Clone)]
pub struct RecordingPreHook {
    name: &'static str,
    log: OrderLog,
}

impl RecordingPreHook {
    /// Create a pre-hook appending to `log`.
    pub fn new(name: &'static str, log: OrderLog) -> Self {
        Self { name, log }
    }
}

impl<Req: Request, Res: Response> PreHook<Req, Res> for RecordingPreHook {
    async fn on_request(&self, _request: &Req, _cancel: &CancellationToken) -> Result<(), BoxError> {
        self.log.push(format!("pre:{}", self.name));
        Ok(())
    }
}

/// A post-hook recording `post:{name}`.
#[derive(Debug, Clone)]
pub struct RecordingPostHook {
    name: &'static str,
    log: OrderLog,
}

impl RecordingPostHook {
    /// Create a post-hook appending to `log`.
    pub fn new(name: &'static str, log: OrderLog) -> Self {
        Self { name, log }
    }
}

impl<Req: Request, Res: Response> PostHook<Req, Res> for RecordingPostHook {
    async fn on_response(
        &self,
        _request: &Req,
        _response: &Res,
        _cancel: &CancellationToken,
    ) -> Result<(), BoxError> {
        self.log.push(format!("post:{}", self.name));
        Ok(())
    }
}

/// A combined hook recording `before:{name}` and `after:{name}`.
#[derive(Debug, Clone)]
pub struct RecordingHook {
    name: &'static str,
    log: OrderLog,
}

impl RecordingHook {
    /// Create a hook appending to `log`.
    pub fn new(name: &'static str, log: OrderLog) -> Self {
        Self { name, log }
    }
}

impl<Req: Request, Res: Response> Hook<Req, Res> for RecordingHook {
    async fn before(&self, _request: &Req, _cancel: &CancellationToken) -> Result<(), BoxError> {
        self.log.push(format!("before:{}", self.name));
        Ok(())
    }

    async fn after(
        &self,
        _request: &Req,
        _response: &Res,
        _cancel: &CancellationToken,
    ) -> Result<(), BoxError> {
        self.log.push(format!("after:{}", self.name));
        Ok(())
    }
}

// ============================================================================
// Short-Circuit Behavior
// ============================================================================

/// A behavior that answers with a fixed value and never runs the rest of the
/// chain.
#[derive(Debug, Clone)]
pub struct ShortCircuitBehavior<Res> {
    value: Res,
}

impl<Res: Clone> ShortCircuitBehavior<Res> {
    /// Create a behavior answering `value`.
    pub fn new(value: Res) -> Self {
        Self { value }
    }
}

impl<Req: Request, Res: Response + Clone> Behavior<Req, Res> for ShortCircuitBehavior<Res> {
    async fn handle(
        &self,
        _request: &Req,
        _cancel: &CancellationToken,
        _next: Next<'_, Res>,
    ) -> Result<Res, BoxError> {
        Ok(self.value.clone())
    }
}

// ============================================================================
// Handlers
// ============================================================================

/// A handler answering a fixed value and counting invocations.
///
/// Clones share the counter. With [`with_log`](Self::with_log) every
/// invocation also records `handled`.
///
/// # Example
///
/// ```rust,ignore
/// let handler = CountingHandler::new(42u32);
/// let registry = ServiceRegistryBuilder::new()
///     .handler::<GetAnswer, u32, _>(handler.clone())
///     .build()?;
///
/// // Dispatch...
///
/// assert_eq!(handler.count(), 1);
/// ```
#[derive(Debug, Clone)]
pub struct CountingHandler<Res> {
    value: Res,
    count: Arc<AtomicUsize>,
    log: Option<OrderLog>,
}

impl<Res: Clone> CountingHandler<Res> {
    /// Create a handler answering `value`.
    pub fn new(value: Res) -> Self {
        Self {
            value,
            count: Arc::new(AtomicUsize::new(0)),
            log: None,
        }
    }

    /// Record `handled` in `log` on every invocation.
    pub fn with_log(mut self, log: OrderLog) -> Self {
        self.log = Some(log);
        self
    }

    /// Get the number of invocations.
    pub fn count(&self) -> usize {
        self.count.load(Ordering::SeqCst)
    }

    /// Reset the counter.
    pub fn reset(&self) {
        self.count.store(0, Ordering::SeqCst);
    }
}

impl<Req: Request, Res: Response + Clone> Handler<Req, Res> for CountingHandler<Res> {
    async fn handle(&self, _request: &Req, _cancel: &CancellationToken) -> Result<Res, BoxError> {
        self.count.fetch_add(1, Ordering::SeqCst);
        if let Some(log) = &self.log {
            log.push("handled");
        }
        Ok(self.value.clone())
    }
}

/// The error raised by the failing doubles.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("{0}")]
pub struct TestError(pub String);

/// A handler that always fails with a [`TestError`].
#[derive(Debug, Clone)]
pub struct FailingHandler {
    message: String,
}

impl FailingHandler {
    /// Create a handler failing with `message`.
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

impl<Req: Request, Res: Response> Handler<Req, Res> for FailingHandler {
    async fn handle(&self, _request: &Req, _cancel: &CancellationToken) -> Result<Res, BoxError> {
        Err(Box::new(TestError(self.message.clone())))
    }
}

/// A pre-hook that always fails with a [`TestError`].
#[derive(Debug, Clone)]
pub struct FailingPreHook {
    message: String,
}

impl FailingPreHook {
    /// Create a pre-hook failing with `message`.
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

impl<Req: Request, Res: Response> PreHook<Req, Res> for FailingPreHook {
    async fn on_request(&self, _request: &Req, _cancel: &CancellationToken) -> Result<(), BoxError> {
        Err(Box::new(TestError(self.message.clone())))
    }
}
