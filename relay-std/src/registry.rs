//! Service registry.
//!
//! A concrete [`ServiceLocator`] assembled with a builder and frozen on
//! `build()`. Registrations keep their insertion order, which is the order
//! behaviors and hooks run in.
//!
//! Two lifetimes are supported:
//!
//! - **Singleton**: one shared `Arc`, cloned on every resolution
//! - **Transient**: a factory run on every resolution
//!
//! # Example
//!
//! ```rust
//! use relay_core::{BoxError, CancellationToken, Handler};
//! use relay_std::registry::ServiceRegistryBuilder;
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
//! let registry = ServiceRegistryBuilder::new()
//!     .handler::<GetAnswer, u32>(AnswerHandler)
//!     .build()
//!     .unwrap();
//! assert_eq!(registry.len(), 1);
//! ```

use relay_core::{
    Behavior, DynBehavior, DynHandler, DynHook, DynPostHook, DynPreHook, EmptyAdapter,
    EmptyHandler, EmptyRequest, Handler, Hook, Instance, PostHook, PreHook, RegistryError,
    Request, Response, ServiceKey, ServiceLocator, instance,
};
use std::{
    collections::HashMap,
    sync::{
        Arc,
        atomic::{AtomicBool, Ordering},
    },
};

/// A handle for toggling a registration at runtime.
///
/// Disabled registrations are invisible to resolution.
#[derive(Debug, Clone)]
pub struct EnabledHandle(Arc<AtomicBool>);

impl EnabledHandle {
    /// Create a new handle with the given initial state.
    pub fn new(enabled: bool) -> Self {
        Self(Arc::new(AtomicBool::new(enabled)))
    }

    /// Check if the registration is currently enabled.
    pub fn is_enabled(&self) -> bool {
        self.0.load(Ordering::Acquire)
    }

    /// Enable the registration.
    pub fn enable(&self) {
        self.0.store(true, Ordering::Release);
    }

    /// Disable the registration.
    pub fn disable(&self) {
        self.0.store(false, Ordering::Release);
    }

    /// Toggle the state, returning the new one.
    pub fn toggle(&self) -> bool {
        !self.0.fetch_xor(true, Ordering::AcqRel)
    }
}

impl Default for EnabledHandle {
    fn default() -> Self {
        Self::new(true)
    }
}

/// Metadata attached to a registration.
#[derive(Debug, Clone, Default)]
pub struct RegistrationMeta {
    /// Optional label for diagnostics.
    pub name: Option<&'static str>,
    enabled: EnabledHandle,
}

impl RegistrationMeta {
    /// Create default, enabled metadata.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the diagnostic label.
    pub fn with_name(mut self, name: &'static str) -> Self {
        self.name = Some(name);
        self
    }

    /// Set the initial enabled state.
    pub fn with_enabled(mut self, enabled: bool) -> Self {
        self.enabled = EnabledHandle::new(enabled);
        self
    }

    /// Get a handle for toggling the registration at runtime.
    pub fn enabled_handle(&self) -> EnabledHandle {
        self.enabled.clone()
    }

    /// Check if the registration is currently enabled.
    pub fn is_enabled(&self) -> bool {
        self.enabled.is_enabled()
    }
}

type Provider = Arc<dyn Fn() -> Instance + Send + Sync>;

struct Registration {
    provide: Provider,
    meta: RegistrationMeta,
}

impl Registration {
    fn is_enabled(&self) -> bool {
        self.meta.is_enabled()
    }
}

// ============================================================================
// ServiceRegistryBuilder
// ============================================================================

/// Builder for a [`ServiceRegistry`].
///
/// The typed helpers register participants under their object-safe
/// contract, for example a handler under `dyn DynHandler<Req, Res>`.
#[derive(Default)]
pub struct ServiceRegistryBuilder {
    entries: HashMap<ServiceKey, Vec<Registration>>,
    count: usize,
    error: Option<RegistryError>,
}

impl ServiceRegistryBuilder {
    /// Create an empty builder.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a singleton instance for the contract `S`.
    pub fn register_instance<S>(self, service: Arc<S>) -> Self
    where
        S: ?Sized + Send + Sync + 'static,
    {
        self.register_instance_with_meta(service, RegistrationMeta::new())
    }

    /// Register a singleton instance for the contract `S` with metadata.
    pub fn register_instance_with_meta<S>(self, service: Arc<S>, meta: RegistrationMeta) -> Self
    where
        S: ?Sized + Send + Sync + 'static,
    {
        self.push(
            ServiceKey::of::<S>(),
            Arc::new(move || instance::<S>(service.clone())),
            meta,
        )
    }

    /// Register a transient factory for the contract `S`.
    pub fn register_factory<S, F>(self, factory: F) -> Self
    where
        S: ?Sized + Send + Sync + 'static,
        F: Fn() -> Arc<S> + Send + Sync + 'static,
    {
        self.register_factory_with_meta(factory, RegistrationMeta::new())
    }

    /// Register a transient factory for the contract `S` with metadata.
    pub fn register_factory_with_meta<S, F>(self, factory: F, meta: RegistrationMeta) -> Self
    where
        S: ?Sized + Send + Sync + 'static,
        F: Fn() -> Arc<S> + Send + Sync + 'static,
    {
        self.push(
            ServiceKey::of::<S>(),
            Arc::new(move || instance::<S>(factory())),
            meta,
        )
    }

    /// Register the handler for `Req -> Res`.
    ///
    /// Registering a second handler for the same pair makes `build` fail.
    pub fn handler<Req, Res>(self, handler: impl Handler<Req, Res>) -> Self
    where
        Req: Request,
        Res: Response,
    {
        let shared: Arc<dyn DynHandler<Req, Res>> = Arc::new(handler);
        self.check_handler::<Req, Res>()
            .register_instance::<dyn DynHandler<Req, Res>>(shared)
    }

    /// Register a transient handler for `Req -> Res`, built per resolution.
    pub fn handler_with<Req, Res, H>(self, factory: impl Fn() -> H + Send + Sync + 'static) -> Self
    where
        Req: Request,
        Res: Response,
        H: Handler<Req, Res>,
    {
        self.check_handler::<Req, Res>()
            .register_factory::<dyn DynHandler<Req, Res>, _>(move || {
                let handler: Arc<dyn DynHandler<Req, Res>> = Arc::new(factory());
                handler
            })
    }

    /// Register the payload-less handler for `EmptyRequest -> Res`.
    pub fn empty_handler<Res: Response>(self, handler: impl EmptyHandler<Res>) -> Self {
        self.handler::<EmptyRequest, Res>(EmptyAdapter::new(handler))
    }

    /// Register a behavior for `Req -> Res`, after any already registered.
    pub fn behavior<Req, Res>(self, behavior: impl Behavior<Req, Res>) -> Self
    where
        Req: Request,
        Res: Response,
    {
        let shared: Arc<dyn DynBehavior<Req, Res>> = Arc::new(behavior);
        self.register_instance::<dyn DynBehavior<Req, Res>>(shared)
    }

    /// Register a transient behavior for `Req -> Res`, built per resolution.
    pub fn behavior_with<Req, Res, B>(self, factory: impl Fn() -> B + Send + Sync + 'static) -> Self
    where
        Req: Request,
        Res: Response,
        B: Behavior<Req, Res>,
    {
        self.register_factory::<dyn DynBehavior<Req, Res>, _>(move || {
            let behavior: Arc<dyn DynBehavior<Req, Res>> = Arc::new(factory());
            behavior
        })
    }

    /// Register a pre-hook for `Req -> Res`.
    pub fn pre_hook<Req, Res>(self, hook: impl PreHook<Req, Res>) -> Self
    where
        Req: Request,
        Res: Response,
    {
        let shared: Arc<dyn DynPreHook<Req, Res>> = Arc::new(hook);
        self.register_instance::<dyn DynPreHook<Req, Res>>(shared)
    }

    /// Register a post-hook for `Req -> Res`.
    pub fn post_hook<Req, Res>(self, hook: impl PostHook<Req, Res>) -> Self
    where
        Req: Request,
        Res: Response,
    {
        let shared: Arc<dyn DynPostHook<Req, Res>> = Arc::new(hook);
        self.register_instance::<dyn DynPostHook<Req, Res>>(shared)
    }

    /// Register a combined hook for `Req -> Res`.
    pub fn hook<Req, Res>(self, hook: impl Hook<Req, Res>) -> Self
    where
        Req: Request,
        Res: Response,
    {
        let shared: Arc<dyn DynHook<Req, Res>> = Arc::new(hook);
        self.register_instance::<dyn DynHook<Req, Res>>(shared)
    }

    /// Get the number of registrations.
    pub fn len(&self) -> usize {
        self.count
    }

    /// Check if nothing is registered.
    pub fn is_empty(&self) -> bool {
        self.count == 0
    }

    /// Freeze the registry.
    ///
    /// Fails if two handlers were bound to one pair.
    pub fn build(self) -> Result<ServiceRegistry, RegistryError> {
        if let Some(err) = self.error {
            return Err(err);
        }
        Ok(ServiceRegistry {
            entries: self.entries,
            count: self.count,
        })
    }

    fn check_handler<Req: Request, Res: Response>(mut self) -> Self {
        let key = ServiceKey::of::<dyn DynHandler<Req, Res>>();
        if self.error.is_none() && self.entries.contains_key(&key) {
            self.error = Some(RegistryError::DuplicateHandler {
                request: std::any::type_name::<Req>(),
                response: std::any::type_name::<Res>(),
            });
        }
        self
    }

    fn push(mut self, key: ServiceKey, provide: Provider, meta: RegistrationMeta) -> Self {
        self.entries
            .entry(key)
            .or_default()
            .push(Registration { provide, meta });
        self.count += 1;
        self
    }
}

impl std::fmt::Debug for ServiceRegistryBuilder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ServiceRegistryBuilder")
            .field("contracts", &self.entries.len())
            .field("registrations", &self.count)
            .field("error", &self.error)
            .finish()
    }
}

// ============================================================================
// ServiceRegistry
// ============================================================================

/// An immutable, thread-safe registry of services.
///
/// Created by [`ServiceRegistryBuilder::build`]. Share it through an `Arc`
/// or hand it to a dispatcher by value.
pub struct ServiceRegistry {
    entries: HashMap<ServiceKey, Vec<Registration>>,
    count: usize,
}

impl ServiceRegistry {
    /// Create a builder.
    pub fn builder() -> ServiceRegistryBuilder {
        ServiceRegistryBuilder::new()
    }

    /// Get the number of registrations, enabled or not.
    pub fn len(&self) -> usize {
        self.count
    }

    /// Check if nothing is registered.
    pub fn is_empty(&self) -> bool {
        self.count == 0
    }

    /// Check if any enabled registration exists for `key`.
    pub fn contains(&self, key: ServiceKey) -> bool {
        self.enabled(key).next().is_some()
    }

    fn enabled(&self, key: ServiceKey) -> impl Iterator<Item = &Registration> {
        self.entries
            .get(&key)
            .into_iter()
            .flatten()
            .filter(|registration| registration.is_enabled())
    }
}

impl ServiceLocator for ServiceRegistry {
    fn resolve_one(&self, key: ServiceKey) -> Option<Instance> {
        let mut enabled = self.enabled(key);
        match (enabled.next(), enabled.next()) {
            (Some(registration), None) => Some((registration.provide)()),
            // Nothing registered, or ambiguous.
            _ => None,
        }
    }

    fn resolve_all(&self, key: ServiceKey) -> Vec<Instance> {
        self.enabled(key)
            .map(|registration| (registration.provide)())
            .collect()
    }
}

impl std::fmt::Debug for ServiceRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ServiceRegistry")
            .field("contracts", &self.entries.len())
            .field("registrations", &self.count)
            .finish()
    }
}
