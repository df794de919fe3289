//! # relay - In-Process Request Dispatch
//!
//! `relay` sends a request to the one handler bound to its
//! `(request, response)` type pair, wrapping the call in an ordered chain of
//! behaviors and hooks.
//!
//! ## Quick Start
//!
//! ```rust
//! use relay::prelude::*;
//!
//! struct GetAnswer;
//! struct AnswerHandler;
//!
//! impl Handler<GetAnswer, u32> for AnswerHandler {
//!     async fn handle(&self, _request: &GetAnswer, _cancel: &CancellationToken) -> Result<u32, BoxError> {
//!         Ok(42)
//!     }
//! }
//!
//! # futures::executor::block_on(async {
//! let registry = ServiceRegistry::builder()
//!     .handler::<GetAnswer, u32>(AnswerHandler)
//!     .behavior::<GetAnswer, u32>(LoggingBehavior::new())
//!     .build()
//!     .unwrap();
//!
//! let dispatcher = Dispatcher::new(registry);
//! let answer: u32 = dispatcher.send(GetAnswer, CancellationToken::new()).await.unwrap();
//! assert_eq!(answer, 42);
//! # });
//! ```
//!
//! ## Ordering
//!
//! ```text
//! B1 ( B2 ( ... Bn ( pre-hooks -> hook.before -> handler -> post-hooks -> hook.after ) ) )
//! ```
//!
//! The first registered behavior is the outermost one. Hooks are flat ordered
//! batches closest to the handler.
//!
//! ## Features
//!
//! - `tracing` (default): logging and span behaviors emit `tracing` events
//! - `timeout`: [`behaviors::timeout::TimeoutBehavior`]
//! - `tower`: [`tower::DispatchService`]

#![deny(clippy::wildcard_imports)]
#![warn(missing_docs)]

pub use relay_core::{
    // Behavior
    Behavior,
    // Error types
    BoxError,
    BoxFuture,
    CancellationToken,
    Chain,
    DispatchError,
    DynBehavior,
    // Handler
    DynHandler,
    // Hooks
    DynHook,
    DynPostHook,
    DynPreHook,
    EmptyAdapter,
    EmptyHandler,
    // Request
    EmptyRequest,
    Handler,
    Hook,
    // Resolution
    Instance,
    Next,
    PostHook,
    PreHook,
    RegistryError,
    Request,
    Response,
    ServiceKey,
    ServiceLocator,
    downcast,
    instance,
};

// Engine
pub use relay_std::{
    cache::{Flavor, ResolutionCache, ResolveAll, ResolveOne, Signature},
    composer::{Participants, compose},
    config::Features,
    dispatcher::{Dispatcher, DispatcherBuilder},
    registry::{EnabledHandle, RegistrationMeta, ServiceRegistry, ServiceRegistryBuilder},
};

/// Standard behavior implementations.
pub mod behaviors {
    pub use relay_std::behaviors::{
        cancellation::{self, CancellationBehavior, Cancelled},
        logging::{self, LoggingBehavior},
        tracing::{self, TracingBehavior},
    };

    #[cfg(feature = "timeout")]
    pub use relay_std::behaviors::timeout::{self, TimeoutBehavior, TimeoutError};
}

/// Standard hook implementations.
pub mod hooks {
    pub use relay_std::hooks::logging::{self, LoggingHook};
}

/// Testing utilities.
pub mod testing {
    #![allow(clippy::wildcard_imports)]
    pub use relay_std::testing::*;
}

#[cfg(feature = "tower")]
pub mod tower;

/// Prelude module - common imports for Relay.
///
/// # Usage
///
/// ```rust
/// use relay::prelude::*;
/// ```
pub mod prelude {
    pub use crate::{
        // Participants
        Behavior,
        // Errors
        BoxError,
        CancellationToken,
        DispatchError,
        // Dispatch
        Dispatcher,
        EmptyHandler,
        EmptyRequest,
        Features,
        Handler,
        Hook,
        Next,
        PostHook,
        PreHook,
        ServiceRegistry,
        // Standard participants
        behaviors::{CancellationBehavior, LoggingBehavior, TracingBehavior},
        hooks::LoggingHook,
    };
}
