//! Pipeline composer.
//!
//! Builds the single callable chain for one dispatch. The ordering is fixed:
//!
//! ```text
//! B1 ( B2 ( ... Bn ( pre-hooks -> hook.before -> handler -> post-hooks -> hook.after ) ) )
//! ```
//!
//! Behaviors wrap from last to first, so the first registered behavior is the
//! outermost one. Hooks sit inside the behavior chain, closest to the handler,
//! and run as flat ordered batches.
//!
//! A failure propagates immediately through the behaviors already entered.
//! The composer neither catches nor retries.

use relay_core::{
    BoxError, CancellationToken, Chain, DynBehavior, DynHandler, DynHook, DynPostHook,
    DynPreHook, Next, Request, Response,
};
use std::sync::Arc;

/// The cross-cutting participants resolved for one dispatch, in registration
/// order.
pub struct Participants<Req, Res> {
    /// Wrapping participants; the first one is outermost.
    pub behaviors: Vec<Arc<dyn DynBehavior<Req, Res>>>,
    /// Run before the handler, before any combined hook.
    pub pre_hooks: Vec<Arc<dyn DynPreHook<Req, Res>>>,
    /// Combined hooks: `before` after the pre-hooks, `after` after the post-hooks.
    pub hooks: Vec<Arc<dyn DynHook<Req, Res>>>,
    /// Run after the handler, before any combined hook's `after`.
    pub post_hooks: Vec<Arc<dyn DynPostHook<Req, Res>>>,
}

impl<Req, Res> Participants<Req, Res> {
    /// No participants. Does not allocate.
    pub fn empty() -> Self {
        Self {
            behaviors: Vec::new(),
            pre_hooks: Vec::new(),
            hooks: Vec::new(),
            post_hooks: Vec::new(),
        }
    }

    /// Check if every participant set is empty.
    pub fn is_empty(&self) -> bool {
        self.behaviors.is_empty()
            && self.pre_hooks.is_empty()
            && self.hooks.is_empty()
            && self.post_hooks.is_empty()
    }

    /// Total number of participants.
    pub fn len(&self) -> usize {
        self.behaviors.len() + self.pre_hooks.len() + self.hooks.len() + self.post_hooks.len()
    }
}

impl<Req, Res> Default for Participants<Req, Res> {
    fn default() -> Self {
        Self::empty()
    }
}

impl<Req, Res> std::fmt::Debug for Participants<Req, Res> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Participants")
            .field("behaviors", &self.behaviors.len())
            .field("pre_hooks", &self.pre_hooks.len())
            .field("hooks", &self.hooks.len())
            .field("post_hooks", &self.post_hooks.len())
            .finish()
    }
}

/// Compose the chain for one dispatch.
///
/// Nothing runs until the returned chain is invoked.
pub fn compose<'a, Req, Res>(
    handler: &'a dyn DynHandler<Req, Res>,
    participants: &'a Participants<Req, Res>,
    request: &'a Req,
    cancel: &'a CancellationToken,
) -> Chain<'a, Res>
where
    Req: Request,
    Res: Response,
{
    let innermost: Chain<'a, Res> =
        Box::new(move || Box::pin(run_innermost(handler, participants, request, cancel)));

    participants
        .behaviors
        .iter()
        .rev()
        .fold(innermost, |next, behavior| {
            Box::new(move || behavior.handle_dyn(request, cancel, Next::new(next)))
        })
}

async fn run_innermost<Req, Res>(
    handler: &dyn DynHandler<Req, Res>,
    participants: &Participants<Req, Res>,
    request: &Req,
    cancel: &CancellationToken,
) -> Result<Res, BoxError>
where
    Req: Request,
    Res: Response,
{
    for pre_hook in &participants.pre_hooks {
        pre_hook.on_request_dyn(request, cancel).await?;
    }
    for hook in &participants.hooks {
        hook.before_dyn(request, cancel).await?;
    }

    let response = handler.handle_dyn(request, cancel).await?;

    for post_hook in &participants.post_hooks {
        post_hook.on_response_dyn(request, &response, cancel).await?;
    }
    for hook in &participants.hooks {
        hook.after_dyn(request, &response, cancel).await?;
    }

    Ok(response)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{
        CountingHandler, FailingPreHook, OrderLog, RecordingBehavior, RecordingHook,
        RecordingPostHook, RecordingPreHook, ShortCircuitBehavior,
    };

    #[derive(Debug)]
    struct Ping;

    fn behavior(name: &'static str, log: &OrderLog) -> Arc<dyn DynBehavior<Ping, String>> {
        Arc::new(RecordingBehavior::new(name, log.clone()))
    }

    #[tokio::test]
    async fn test_empty_participants_call_handler() {
        let handler = CountingHandler::new("ok".to_string());
        let participants = Participants::<Ping, String>::empty();
        let cancel = CancellationToken::new();

        assert!(participants.is_empty());
        let result = compose::<Ping, String>(&handler, &participants, &Ping, &cancel)().await.unwrap();
        assert_eq!(result, "ok");
        assert_eq!(handler.count(), 1);
    }

    #[tokio::test]
    async fn test_first_behavior_is_outermost() {
        let log = OrderLog::new();
        let handler = CountingHandler::new("ok".to_string()).with_log(log.clone());
        let participants = Participants {
            behaviors: vec![behavior("B1", &log), behavior("B2", &log)],
            ..Participants::empty()
        };
        let cancel = CancellationToken::new();

        compose::<Ping, String>(&handler, &participants, &Ping, &cancel)().await.unwrap();

        assert_eq!(
            log.entries(),
            vec!["entered:B1", "entered:B2", "handled", "exited:B2", "exited:B1"]
        );
    }

    #[tokio::test]
    async fn test_hook_batches_run_in_order() {
        let log = OrderLog::new();
        let handler = CountingHandler::new("ok".to_string()).with_log(log.clone());
        let participants = Participants::<Ping, String> {
            behaviors: vec![behavior("B", &log)],
            pre_hooks: vec![
                Arc::new(RecordingPreHook::new("P1", log.clone())),
                Arc::new(RecordingPreHook::new("P2", log.clone())),
            ],
            hooks: vec![
                Arc::new(RecordingHook::new("H1", log.clone())),
                Arc::new(RecordingHook::new("H2", log.clone())),
            ],
            post_hooks: vec![
                Arc::new(RecordingPostHook::new("Q1", log.clone())),
                Arc::new(RecordingPostHook::new("Q2", log.clone())),
            ],
        };
        let cancel = CancellationToken::new();

        compose::<Ping, String>(&handler, &participants, &Ping, &cancel)().await.unwrap();

        assert_eq!(
            log.entries(),
            vec![
                "entered:B",
                "pre:P1",
                "pre:P2",
                "before:H1",
                "before:H2",
                "handled",
                "post:Q1",
                "post:Q2",
                "after:H1",
                "after:H2",
                "exited:B",
            ]
        );
    }

    #[tokio::test]
    async fn test_short_circuit_skips_inner_participants() {
        let log = OrderLog::new();
        let handler = CountingHandler::new("handled".to_string()).with_log(log.clone());
        let participants = Participants::<Ping, String> {
            behaviors: vec![
                behavior("outer", &log),
                Arc::new(ShortCircuitBehavior::new("cached".to_string())),
                behavior("inner", &log),
            ],
            hooks: vec![Arc::new(RecordingHook::new("H", log.clone()))],
            ..Participants::empty()
        };
        let cancel = CancellationToken::new();

        let result = compose::<Ping, String>(&handler, &participants, &Ping, &cancel)().await.unwrap();

        assert_eq!(result, "cached");
        assert_eq!(handler.count(), 0);
        assert_eq!(log.entries(), vec!["entered:outer", "exited:outer"]);
    }

    #[tokio::test]
    async fn test_failure_unwinds_through_entered_behaviors() {
        let log = OrderLog::new();
        let handler = CountingHandler::new("ok".to_string()).with_log(log.clone());
        let participants = Participants::<Ping, String> {
            behaviors: vec![behavior("B", &log)],
            pre_hooks: vec![Arc::new(FailingPreHook::new("denied"))],
            hooks: vec![Arc::new(RecordingHook::new("H", log.clone()))],
            ..Participants::empty()
        };
        let cancel = CancellationToken::new();

        let err = compose::<Ping, String>(&handler, &participants, &Ping, &cancel)()
            .await
            .unwrap_err();

        assert_eq!(err.to_string(), "denied");
        assert_eq!(handler.count(), 0);
        assert_eq!(log.entries(), vec!["entered:B", "exited:B"]);
    }
}
