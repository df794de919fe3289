//! # relay-std
//!
//! Dispatch engine and standard participants for the Relay request dispatch
//! pipeline.
//!
//! This crate provides:
//! - **Dispatch**: [`dispatcher::Dispatcher`], [`dispatcher::DispatcherBuilder`]
//! - **Resolution caching**: [`cache::ResolutionCache`]
//! - **Composition**: [`composer::compose`], [`composer::Participants`]
//! - **Feature flags**: [`config::Features`]
//! - **A concrete locator**: [`registry::ServiceRegistry`]
//! - **Standard behaviors**: Logging, Tracing, Cancellation, Timeout
//! - **Standard hooks**: Logging
//! - **Test doubles**: [`testing`]

#![deny(clippy::wildcard_imports)]
#![warn(missing_docs)]

// Re-export core contracts
pub use relay_core;

// Modules
pub mod behaviors;
pub mod cache;
pub mod composer;
pub mod config;
pub mod dispatcher;
pub mod hooks;
pub mod registry;
pub mod testing;
