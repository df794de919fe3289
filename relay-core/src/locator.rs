//! Service location contract.
//!
//! The dispatcher does not own participant instances. It borrows them per
//! call from a [`ServiceLocator`], whose lifetime and scoping policy are its
//! own business.
//!
//! # Instance Convention
//!
//! The instance produced for `ServiceKey::of::<S>()` is a boxed `Arc<S>`.
//! For participants `S` is the trait object, for example
//! `dyn DynHandler<Req, Res>`. Use [`instance`] and [`downcast`] rather than
//! boxing by hand.

use std::{
    any::{Any, TypeId, type_name},
    hash::{Hash, Hasher},
    sync::Arc,
};

/// A type-erased service instance.
pub type Instance = Box<dyn Any + Send + Sync>;

/// Identifies a service contract by type.
///
/// Equality and hashing use only the [`TypeId`]; the type name is carried for
/// diagnostics.
#[derive(Debug, Clone, Copy)]
pub struct ServiceKey {
    id: TypeId,
    name: &'static str,
}

impl ServiceKey {
    /// Get the key for the service contract `S`.
    pub fn of<S: ?Sized + 'static>() -> Self {
        Self {
            id: TypeId::of::<S>(),
            name: type_name::<S>(),
        }
    }

    /// Get the type id of the contract.
    pub fn id(&self) -> TypeId {
        self.id
    }

    /// Get the type name of the contract.
    pub fn name(&self) -> &'static str {
        self.name
    }
}

impl PartialEq for ServiceKey {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for ServiceKey {}

impl Hash for ServiceKey {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.id.hash(state);
    }
}

impl std::fmt::Display for ServiceKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name)
    }
}

/// Box a shared service as an [`Instance`] for the contract `S`.
pub fn instance<S: ?Sized + Send + Sync + 'static>(service: Arc<S>) -> Instance {
    Box::new(service)
}

/// Recover the shared service for the contract `S` from an [`Instance`].
///
/// Returns `None` if the instance was not produced for `S`.
pub fn downcast<S: ?Sized + Send + Sync + 'static>(instance: Instance) -> Option<Arc<S>> {
    instance.downcast::<Arc<S>>().ok().map(|boxed| *boxed)
}

/// The capability of locating registered services.
///
/// # Contract
///
/// - `resolve_one` returns `None` when nothing is registered for the key, or
///   when the registrations are ambiguous under the locator's own policy.
/// - `resolve_all` returns every registered instance in registration order,
///   and an empty vector when none are registered.
#[diagnostic::on_unimplemented(
    message = "`{Self}` is not a ServiceLocator",
    label = "missing `ServiceLocator` implementation",
    note = "Implement `resolve_one` and `resolve_all` to back a dispatcher."
)]
pub trait ServiceLocator: Send + Sync {
    /// Resolve exactly one instance for `key`.
    fn resolve_one(&self, key: ServiceKey) -> Option<Instance>;

    /// Resolve every instance registered for `key`, in registration order.
    fn resolve_all(&self, key: ServiceKey) -> Vec<Instance>;
}

impl<L: ServiceLocator + ?Sized> ServiceLocator for Arc<L> {
    fn resolve_one(&self, key: ServiceKey) -> Option<Instance> {
        (**self).resolve_one(key)
    }

    fn resolve_all(&self, key: ServiceKey) -> Vec<Instance> {
        (**self).resolve_all(key)
    }
}

impl<L: ServiceLocator + ?Sized> ServiceLocator for Box<L> {
    fn resolve_one(&self, key: ServiceKey) -> Option<Instance> {
        (**self).resolve_one(key)
    }

    fn resolve_all(&self, key: ServiceKey) -> Vec<Instance> {
        (**self).resolve_all(key)
    }
}
