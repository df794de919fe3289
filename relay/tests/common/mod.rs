#![allow(dead_code)]

use relay::{
    BoxError, CancellationToken, Dispatcher, EmptyHandler, Handler, ServiceRegistry,
    ServiceRegistryBuilder,
};
use std::sync::{
    Arc,
    atomic::{AtomicUsize, Ordering},
};

// ============================================================================
// Test Request Types
// ============================================================================

#[derive(Debug, Clone)]
pub struct GetAnswer;

#[derive(Debug, Clone)]
pub struct Echo {
    pub text: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Stats {
    pub served: usize,
}

// ============================================================================
// Test Handlers
// ============================================================================

pub struct AnswerHandler;

impl Handler<GetAnswer, u32> for AnswerHandler {
    async fn handle(&self, _request: &GetAnswer, _cancel: &CancellationToken) -> Result<u32, BoxError> {
        Ok(42)
    }
}

pub struct EchoHandler;

impl Handler<Echo, String> for EchoHandler {
    async fn handle(&self, request: &Echo, _cancel: &CancellationToken) -> Result<String, BoxError> {
        Ok(request.text.clone())
    }
}

/// Answers payload-less queries with a running counter.
#[derive(Clone, Default)]
pub struct StatsHandler {
    pub served: Arc<AtomicUsize>,
}

impl EmptyHandler<Stats> for StatsHandler {
    async fn handle_empty(&self, _cancel: &CancellationToken) -> Result<Stats, BoxError> {
        let served = self.served.fetch_add(1, Ordering::SeqCst) + 1;
        Ok(Stats { served })
    }
}

// ============================================================================
// Helpers
// ============================================================================

pub fn dispatcher(builder: ServiceRegistryBuilder) -> Dispatcher {
    Dispatcher::new(builder.build().expect("valid registry"))
}

pub fn answer_registry() -> ServiceRegistryBuilder {
    ServiceRegistry::builder().handler::<GetAnswer, u32>(AnswerHandler)
}
