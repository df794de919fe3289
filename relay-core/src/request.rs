//! Request and response marker traits.

/// A marker trait for dispatchable request values.
///
/// Requests must be `Send + Sync + 'static` so that a dispatch can be awaited
/// from any task. Every such type is a request.
///
/// # Example
///
/// ```rust
/// use relay_core::Request;
///
/// struct GetAnswer;
///
/// fn assert_request<R: Request>() {}
/// assert_request::<GetAnswer>();
/// ```
#[diagnostic::on_unimplemented(
    message = "`{Self}` is not a valid Request",
    label = "must be `Send + Sync + 'static`",
    note = "Requests are borrowed across await points and must be thread-safe."
)]
pub trait Request: Send + Sync + 'static {}

impl<T: Send + Sync + 'static> Request for T {}

/// A marker trait for the value produced by a handler.
///
/// Post-hooks observe the response by reference across await points, so
/// responses must be `Sync` as well as `Send`.
#[diagnostic::on_unimplemented(
    message = "`{Self}` is not a valid Response",
    label = "must be `Send + Sync + 'static`",
    note = "Responses are observed by post-hooks across await points."
)]
pub trait Response: Send + Sync + 'static {}

impl<T: Send + Sync + 'static> Response for T {}

/// Sentinel payload used for parameterless dispatch.
///
/// A fresh value is constructed for every payload-less dispatch. It carries no
/// state and deliberately does not implement `PartialEq`.
#[derive(Debug, Clone, Copy, Default)]
pub struct EmptyRequest;

impl EmptyRequest {
    /// Create a new empty request.
    pub const fn new() -> Self {
        Self
    }
}
