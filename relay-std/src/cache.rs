//! Resolution cache.
//!
//! Memoizes, per service signature, the factory used to pull participants out
//! of a [`ServiceLocator`]. Only factories are cached, never instances: every
//! call still asks the locator, which keeps control over scoping.
//!
//! Two flavors of factory exist:
//!
//! - [`ResolveOne`]: exactly one instance (handlers)
//! - [`ResolveAll`]: every instance, in registration order (behaviors, hooks)
//!
//! Entries are created once per signature and live as long as the cache.

use dashmap::DashMap;
use relay_core::{ServiceKey, ServiceLocator, downcast};
use std::{
    any::Any,
    sync::{
        Arc,
        atomic::{AtomicUsize, Ordering},
    },
};

/// A compiled factory resolving exactly one instance of `S`.
pub type ResolveOne<S> = Arc<dyn Fn(&dyn ServiceLocator) -> Option<Arc<S>> + Send + Sync>;

/// A compiled factory resolving every instance of `S`, in registration order.
pub type ResolveAll<S> = Arc<dyn Fn(&dyn ServiceLocator) -> Vec<Arc<S>> + Send + Sync>;

/// The flavor of a compiled factory.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Flavor {
    /// Resolves exactly one instance.
    One,
    /// Resolves every registered instance.
    All,
}

/// The cache key: a factory flavor bound to one concrete service contract.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Signature {
    /// Factory flavor.
    pub flavor: Flavor,
    /// Service contract.
    pub key: ServiceKey,
}

/// Concurrent memo of compiled resolution factories.
///
/// Readers never block each other. Concurrent first use of one signature
/// compiles once and hands the same factory to every caller.
pub struct ResolutionCache {
    factories: DashMap<Signature, Box<dyn Any + Send + Sync>>,
    compilations: AtomicUsize,
}

impl ResolutionCache {
    /// Create an empty cache.
    pub fn new() -> Self {
        Self {
            factories: DashMap::new(),
            compilations: AtomicUsize::new(0),
        }
    }

    /// Get or compile the single-instance factory for the contract `S`.
    pub fn one<S: ?Sized + Send + Sync + 'static>(&self) -> ResolveOne<S> {
        let key = ServiceKey::of::<S>();
        self.get_or_compile(
            Signature {
                flavor: Flavor::One,
                key,
            },
            || -> ResolveOne<S> {
                Arc::new(move |locator: &dyn ServiceLocator| {
                    locator.resolve_one(key).and_then(downcast::<S>)
                })
            },
        )
    }

    /// Get or compile the all-instances factory for the contract `S`.
    pub fn all<S: ?Sized + Send + Sync + 'static>(&self) -> ResolveAll<S> {
        let key = ServiceKey::of::<S>();
        self.get_or_compile(
            Signature {
                flavor: Flavor::All,
                key,
            },
            || -> ResolveAll<S> {
                Arc::new(move |locator: &dyn ServiceLocator| {
                    locator
                        .resolve_all(key)
                        .into_iter()
                        .filter_map(downcast::<S>)
                        .collect()
                })
            },
        )
    }

    /// Number of factories compiled since creation.
    pub fn compilations(&self) -> usize {
        self.compilations.load(Ordering::Acquire)
    }

    /// Number of cached signatures.
    pub fn len(&self) -> usize {
        self.factories.len()
    }

    /// Check if nothing has been compiled yet.
    pub fn is_empty(&self) -> bool {
        self.factories.is_empty()
    }

    /// Check if a factory is cached for `signature`.
    pub fn contains(&self, signature: &Signature) -> bool {
        self.factories.contains_key(signature)
    }

    fn lookup<F: Clone + 'static>(&self, signature: &Signature) -> Option<F> {
        self.factories
            .get(signature)
            .and_then(|entry| entry.downcast_ref::<F>().cloned())
    }

    fn get_or_compile<F, C>(&self, signature: Signature, compile: C) -> F
    where
        F: Clone + Send + Sync + 'static,
        C: Fn() -> F,
    {
        if let Some(factory) = self.lookup::<F>(&signature) {
            return factory;
        }

        // The shard lock is held while compiling, so the first writer wins.
        let entry = self.factories.entry(signature).or_insert_with(|| {
            self.compilations.fetch_add(1, Ordering::AcqRel);
            #[cfg(feature = "tracing")]
            tracing::trace!(
                service = %signature.key,
                flavor = ?signature.flavor,
                "compiled resolution factory"
            );
            Box::new(compile()) as Box<dyn Any + Send + Sync>
        });

        match entry.downcast_ref::<F>() {
            Some(factory) => factory.clone(),
            // Unreachable while signatures encode the contract type.
            None => compile(),
        }
    }
}

impl Default for ResolutionCache {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for ResolutionCache {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ResolutionCache")
            .field("entries", &self.factories.len())
            .field("compilations", &self.compilations())
            .finish()
    }
}
