//! Dispatcher.
//!
//! The public entry point. A dispatch resolves the handler for the
//! `(request, response)` pair, resolves the participants the [`Features`]
//! allow, then either calls the handler directly or runs the composed chain.
//!
//! # Fast Path
//!
//! With the pipeline disabled, or when no participant is registered for the
//! pair, the handler is invoked directly and no chain is built.

use crate::{
    cache::ResolutionCache,
    composer::{Participants, compose},
    config::Features,
};
use relay_core::{
    CancellationToken, DispatchError, DynBehavior, DynHandler, DynHook, DynPostHook, DynPreHook,
    EmptyRequest, Request, Response, ServiceLocator,
};
use std::sync::Arc;

/// Resolves and runs the handler for a request.
///
/// Cloning is cheap: clones share the locator and the resolution cache.
///
/// # Example
///
/// ```rust
/// use relay_core::{BoxError, CancellationToken, Handler};
/// use relay_std::{dispatcher::Dispatcher, registry::ServiceRegistry};
///
/// struct GetAnswer;
/// struct AnswerHandler;
///
/// impl Handler<GetAnswer, u32> for AnswerHandler {
///     async fn handle(&self, _request: &GetAnswer, _cancel: &CancellationToken) -> Result<u32, BoxError> {
///         Ok(42)
///     }
/// }
///
/// let registry = ServiceRegistry::builder()
///     .handler::<GetAnswer, u32>(AnswerHandler)
///     .build()
///     .unwrap();
/// let dispatcher = Dispatcher::new(registry);
/// let answer = futures::executor::block_on(
///     dispatcher.send::<u32>(GetAnswer, CancellationToken::new()),
/// );
/// assert_eq!(answer.unwrap(), 42);
/// ```
#[derive(Clone)]
pub struct Dispatcher {
    locator: Arc<dyn ServiceLocator>,
    cache: Arc<ResolutionCache>,
    features: Features,
}

impl Dispatcher {
    /// Create a dispatcher over `locator` with every feature enabled.
    pub fn new(locator: impl ServiceLocator + 'static) -> Self {
        DispatcherBuilder::new(locator).build()
    }

    /// Start configuring a dispatcher over `locator`.
    pub fn builder(locator: impl ServiceLocator + 'static) -> DispatcherBuilder {
        DispatcherBuilder::new(locator)
    }

    /// Dispatch `request` and await the `Res` produced for it.
    pub async fn send<Res: Response>(
        &self,
        request: impl Request,
        cancel: CancellationToken,
    ) -> Result<Res, DispatchError> {
        self.dispatch(request, cancel).await
    }

    /// Dispatch a payload that may be absent.
    ///
    /// `None` fails with [`DispatchError::InvalidArgument`] before anything
    /// is resolved.
    pub async fn send_optional<Req: Request, Res: Response>(
        &self,
        request: Option<Req>,
        cancel: CancellationToken,
    ) -> Result<Res, DispatchError> {
        let Some(request) = request else {
            return Err(DispatchError::InvalidArgument("request payload is absent"));
        };
        self.dispatch(request, cancel).await
    }

    /// Dispatch without a payload.
    ///
    /// Served by the handler registered for `EmptyRequest -> Res`.
    pub async fn query<Res: Response>(&self, cancel: CancellationToken) -> Result<Res, DispatchError> {
        self.dispatch(EmptyRequest::new(), cancel).await
    }

    /// Dispatch with both types explicit.
    pub async fn dispatch<Req: Request, Res: Response>(
        &self,
        request: Req,
        cancel: CancellationToken,
    ) -> Result<Res, DispatchError> {
        let locator = &*self.locator;
        let handler = self.cache.one::<dyn DynHandler<Req, Res>>()(locator)
            .ok_or_else(DispatchError::missing_handler::<Req, Res>)?;

        let participants = self.participants::<Req, Res>();
        if participants.is_empty() {
            return handler
                .handle_dyn(&request, &cancel)
                .await
                .map_err(DispatchError::Participant);
        }

        compose(&*handler, &participants, &request, &cancel)()
            .await
            .map_err(DispatchError::Participant)
    }

    /// Get the resolution cache shared by this dispatcher and its clones.
    pub fn cache(&self) -> &ResolutionCache {
        &self.cache
    }

    /// Get the enabled features.
    pub fn features(&self) -> Features {
        self.features
    }

    fn participants<Req: Request, Res: Response>(&self) -> Participants<Req, Res> {
        if !self.features.pipeline_enabled() {
            return Participants::empty();
        }

        let locator = &*self.locator;
        let behaviors = self.cache.all::<dyn DynBehavior<Req, Res>>()(locator);
        if !self.features.hooks_enabled() {
            return Participants {
                behaviors,
                ..Participants::empty()
            };
        }

        Participants {
            behaviors,
            pre_hooks: self.cache.all::<dyn DynPreHook<Req, Res>>()(locator),
            hooks: self.cache.all::<dyn DynHook<Req, Res>>()(locator),
            post_hooks: self.cache.all::<dyn DynPostHook<Req, Res>>()(locator),
        }
    }
}

impl std::fmt::Debug for Dispatcher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Dispatcher")
            .field("features", &self.features)
            .field("cache", &self.cache)
            .finish_non_exhaustive()
    }
}

/// Builder for a [`Dispatcher`].
///
/// Features are fixed once [`build`](Self::build) is called.
pub struct DispatcherBuilder {
    locator: Arc<dyn ServiceLocator>,
    features: Features,
}

impl DispatcherBuilder {
    /// Start from `locator` with every feature enabled.
    pub fn new(locator: impl ServiceLocator + 'static) -> Self {
        Self {
            locator: Arc::new(locator),
            features: Features::default(),
        }
    }

    /// Enable or disable behavior resolution.
    pub fn pipeline(mut self, enabled: bool) -> Self {
        self.features.set(Features::PIPELINE, enabled);
        self
    }

    /// Enable or disable hook resolution.
    ///
    /// Has no effect while the pipeline is disabled.
    pub fn hooks(mut self, enabled: bool) -> Self {
        self.features.set(Features::HOOKS, enabled);
        self
    }

    /// Replace the feature set.
    pub fn features(mut self, features: Features) -> Self {
        self.features = features;
        self
    }

    /// Build the dispatcher.
    pub fn build(self) -> Dispatcher {
        Dispatcher {
            locator: self.locator,
            cache: Arc::new(ResolutionCache::new()),
            features: self.features,
        }
    }
}

impl std::fmt::Debug for DispatcherBuilder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DispatcherBuilder")
            .field("features", &self.features)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        registry::ServiceRegistry,
        testing::{
            CountingHandler, FailingHandler, OrderLog, RecordingBehavior, RecordingHook, TestError,
        },
    };

    #[derive(Debug)]
    struct Ping;

    #[tokio::test]
    async fn test_fast_path_calls_handler() {
        let handler = CountingHandler::new("pong".to_string());
        let registry = ServiceRegistry::builder()
            .handler::<Ping, String>(handler.clone())
            .build()
            .unwrap();
        let dispatcher = Dispatcher::new(registry);

        let response: String = dispatcher.send(Ping, CancellationToken::new()).await.unwrap();
        assert_eq!(response, "pong");
        assert_eq!(handler.count(), 1);
    }

    #[tokio::test]
    async fn test_absent_payload_fails_before_resolution() {
        let dispatcher = Dispatcher::new(ServiceRegistry::builder().build().unwrap());

        let err = dispatcher
            .send_optional::<Ping, String>(None, CancellationToken::new())
            .await
            .unwrap_err();
        assert!(matches!(err, DispatchError::InvalidArgument(_)));
        assert!(dispatcher.cache().is_empty());
    }

    #[tokio::test]
    async fn test_missing_handler() {
        let dispatcher = Dispatcher::new(ServiceRegistry::builder().build().unwrap());

        let err = dispatcher
            .send::<String>(Ping, CancellationToken::new())
            .await
            .unwrap_err();
        match err {
            DispatchError::MissingHandler { request, response } => {
                assert!(request.ends_with("Ping"));
                assert!(response.ends_with("String"));
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[tokio::test]
    async fn test_participant_error_is_unchanged() {
        let registry = ServiceRegistry::builder()
            .handler::<Ping, String>(FailingHandler::new("broken"))
            .build()
            .unwrap();
        let dispatcher = Dispatcher::new(registry);

        let err = dispatcher
            .send::<String>(Ping, CancellationToken::new())
            .await
            .unwrap_err();
        assert_eq!(err.to_string(), "broken");
        assert_eq!(err.downcast_ref::<TestError>(), Some(&TestError("broken".into())));
    }

    #[tokio::test]
    async fn test_disabled_pipeline_skips_participants() {
        let log = OrderLog::new();
        let registry = ServiceRegistry::builder()
            .handler::<Ping, String>(CountingHandler::new("ok".to_string()).with_log(log.clone()))
            .behavior::<Ping, String>(RecordingBehavior::new("B", log.clone()))
            .hook::<Ping, String>(RecordingHook::new("H", log.clone()))
            .build()
            .unwrap();
        let dispatcher = Dispatcher::builder(registry).pipeline(false).build();

        dispatcher.send::<String>(Ping, CancellationToken::new()).await.unwrap();

        assert_eq!(log.entries(), vec!["handled"]);
        // Only the handler factory was ever compiled.
        assert_eq!(dispatcher.cache().compilations(), 1);
    }

    #[tokio::test]
    async fn test_disabled_hooks_keep_behaviors() {
        let log = OrderLog::new();
        let registry = ServiceRegistry::builder()
            .handler::<Ping, String>(CountingHandler::new("ok".to_string()).with_log(log.clone()))
            .behavior::<Ping, String>(RecordingBehavior::new("B", log.clone()))
            .hook::<Ping, String>(RecordingHook::new("H", log.clone()))
            .build()
            .unwrap();
        let dispatcher = Dispatcher::builder(registry).hooks(false).build();

        dispatcher.send::<String>(Ping, CancellationToken::new()).await.unwrap();

        assert_eq!(log.entries(), vec!["entered:B", "handled", "exited:B"]);
        assert_eq!(dispatcher.cache().compilations(), 2);
    }

    #[tokio::test]
    async fn test_clones_share_cache() {
        let registry = ServiceRegistry::builder()
            .handler::<Ping, String>(CountingHandler::new("ok".to_string()))
            .build()
            .unwrap();
        let dispatcher = Dispatcher::new(registry);
        let clone = dispatcher.clone();

        dispatcher.send::<String>(Ping, CancellationToken::new()).await.unwrap();
        clone.send::<String>(Ping, CancellationToken::new()).await.unwrap();

        // Handler plus the four participant sets.
        assert_eq!(clone.cache().compilations(), 5);
        assert_eq!(clone.features(), Features::all());
    }
}
