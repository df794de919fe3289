//! Error types for Relay.
//!
//! - [`DispatchError`] - Errors surfaced to the caller of a dispatch
//! - [`RegistryError`] - Errors raised while building a service registry

use thiserror::Error;

/// A boxed error type for participant failures.
pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Errors that can occur during a dispatch.
#[derive(Error, Debug)]
pub enum DispatchError {
    /// The payload was absent where one is required.
    ///
    /// Detected before any resolution takes place.
    #[error("invalid argument: {0}")]
    InvalidArgument(&'static str),

    /// No handler is registered for the `(request, response)` pair.
    ///
    /// This is a configuration defect, not a recoverable runtime condition.
    #[error("no handler registered for `{request}` -> `{response}`")]
    MissingHandler {
        /// Type name of the request.
        request: &'static str,
        /// Type name of the response.
        response: &'static str,
    },

    /// A handler, behavior or hook failed.
    ///
    /// The participant's error is carried as-is.
    #[error(transparent)]
    Participant(BoxError),
}

impl DispatchError {
    /// Create a `MissingHandler` error for the given pair.
    pub fn missing_handler<Req: ?Sized, Res: ?Sized>() -> Self {
        Self::MissingHandler {
            request: std::any::type_name::<Req>(),
            response: std::any::type_name::<Res>(),
        }
    }

    /// Returns `true` if this error was raised by a participant.
    pub fn is_participant(&self) -> bool {
        matches!(self, Self::Participant(_))
    }

    /// Get the participant's error, if this is a participant failure.
    pub fn into_participant(self) -> Option<BoxError> {
        match self {
            Self::Participant(err) => Some(err),
            _ => None,
        }
    }

    /// Downcast the participant's error to a concrete type.
    pub fn downcast_ref<T: std::error::Error + 'static>(&self) -> Option<&T> {
        match self {
            Self::Participant(err) => err.downcast_ref::<T>(),
            _ => None,
        }
    }
}

impl From<BoxError> for DispatchError {
    fn from(err: BoxError) -> Self {
        DispatchError::Participant(err)
    }
}

/// Errors that can occur while building a service registry.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RegistryError {
    /// More than one handler was bound to a single pair.
    #[error("duplicate handler registered for `{request}` -> `{response}`")]
    DuplicateHandler {
        /// Type name of the request.
        request: &'static str,
        /// Type name of the response.
        response: &'static str,
    },
}
