//! # relay-core
//!
//! Core contracts for the Relay request dispatch pipeline.
//!
//! This crate has minimal dependencies and is designed to be imported by
//! crates that only provide handlers, behaviors or hooks, without pulling in
//! the dispatcher implementation from `relay-std`.
//!
//! # Participants
//!
//! A single dispatch resolves exactly one terminal participant and any number
//! of cross-cutting ones, all keyed by the `(request, response)` type pair:
//!
//! ## Terminal: [`Handler`]
//!
//! The unique implementation that produces a response for a request. Exactly
//! one handler may be bound to a pair; [`EmptyHandler`] is the payload-less
//! form, served through [`EmptyRequest`] by an [`EmptyAdapter`].
//!
//! ## Wrapping: [`Behavior`]
//!
//! Middleware-like participants. A behavior receives the request, the
//! cancellation token and a [`Next`] continuation. It may run logic around the
//! continuation, or short-circuit by never calling it. The first registered
//! behavior is the outermost one.
//!
//! ## Observing: [`PreHook`], [`PostHook`], [`Hook`]
//!
//! Observation-only participants. They run exactly once around the handler
//! and cannot replace the call.
//!
//! # Resolution
//!
//! Participants are obtained per call from a [`ServiceLocator`], keyed by a
//! [`ServiceKey`]. The locator owns the instances and their scoping policy.
//!
//! # Error Types
//!
//! - [`DispatchError`] - Errors surfaced by a dispatch
//! - [`RegistryError`] - Errors raised while building a registry
//! - [`BoxError`] - Participant failures

#![deny(clippy::wildcard_imports)]
#![warn(missing_docs)]

mod behavior;
mod error;
mod handler;
mod hook;
mod locator;
mod request;

// Re-exports
pub use behavior::{Behavior, Chain, DynBehavior, Next};
pub use error::{BoxError, DispatchError, RegistryError};
pub use handler::{DynHandler, EmptyAdapter, EmptyHandler, Handler};
pub use hook::{DynHook, DynPostHook, DynPreHook, Hook, PostHook, PreHook};
pub use locator::{Instance, ServiceKey, ServiceLocator, downcast, instance};
pub use request::{EmptyRequest, Request, Response};

pub use futures::future::BoxFuture;
pub use tokio_util::sync::CancellationToken;
