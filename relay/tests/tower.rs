#![cfg(feature = "tower")]

use futures::future::poll_fn;
use relay::{DispatchError, Dispatcher, tower::DispatchService};
use tower::Service;

mod common;
use common::{GetAnswer, answer_registry};

#[tokio::test]
async fn test_service_dispatches() {
    let dispatcher = Dispatcher::new(answer_registry().build().unwrap());
    let mut service = DispatchService::<GetAnswer, u32>::new(dispatcher);

    poll_fn(|cx| service.poll_ready(cx)).await.unwrap();
    let answer = service.call(GetAnswer).await.unwrap();

    assert_eq!(answer, 42);
}

#[tokio::test]
async fn test_service_reports_missing_handler() {
    let dispatcher = Dispatcher::new(answer_registry().build().unwrap());
    let mut service = DispatchService::<GetAnswer, String>::new(dispatcher);

    poll_fn(|cx| service.poll_ready(cx)).await.unwrap();
    let err = service.call(GetAnswer).await.unwrap_err();

    assert!(matches!(err, DispatchError::MissingHandler { .. }));
}
