use relay::{
    CancellationToken, DispatchError, Dispatcher, DynHandler, Flavor, ServiceKey,
    ServiceRegistry, Signature,
    testing::{CountingHandler, FailingHandler, TestError},
};

mod common;
use common::{
    AnswerHandler, Echo, EchoHandler, GetAnswer, Stats, StatsHandler, answer_registry, dispatcher,
};

#[tokio::test]
async fn test_handler_answers_without_participants() {
    let dispatcher = dispatcher(answer_registry());

    let answer: u32 = dispatcher
        .send(GetAnswer, CancellationToken::new())
        .await
        .unwrap();

    assert_eq!(answer, 42);
}

#[tokio::test]
async fn test_fast_path_matches_direct_call() {
    use relay::Handler;

    let cancel = CancellationToken::new();
    let request = Echo {
        text: "same".to_string(),
    };
    let direct = EchoHandler.handle(&request, &cancel).await.unwrap();

    let dispatcher = dispatcher(ServiceRegistry::builder().handler::<Echo, String>(EchoHandler));
    let dispatched: String = dispatcher.send(request, cancel).await.unwrap();

    assert_eq!(dispatched, direct);
}

#[tokio::test]
async fn test_payload_less_query() {
    let handler = StatsHandler::default();
    let dispatcher = dispatcher(
        ServiceRegistry::builder().empty_handler::<Stats>(handler.clone()),
    );

    let first: Stats = dispatcher.query(CancellationToken::new()).await.unwrap();
    let second: Stats = dispatcher.query(CancellationToken::new()).await.unwrap();

    assert_eq!(first, Stats { served: 1 });
    assert_eq!(second, Stats { served: 2 });
}

#[tokio::test]
async fn test_absent_payload_invokes_nothing() {
    let handler = CountingHandler::new(1u32);
    let dispatcher = dispatcher(ServiceRegistry::builder().handler::<GetAnswer, u32>(handler.clone()));

    let err = dispatcher
        .send_optional::<GetAnswer, u32>(None, CancellationToken::new())
        .await
        .unwrap_err();

    assert!(matches!(err, DispatchError::InvalidArgument(_)));
    assert_eq!(handler.count(), 0);
    assert_eq!(dispatcher.cache().compilations(), 0);
}

#[tokio::test]
async fn test_present_optional_payload_dispatches() {
    let dispatcher = dispatcher(answer_registry());

    let answer = dispatcher
        .send_optional::<GetAnswer, u32>(Some(GetAnswer), CancellationToken::new())
        .await
        .unwrap();

    assert_eq!(answer, 42);
}

#[tokio::test]
async fn test_missing_handler_for_pair() {
    // A handler exists for `GetAnswer -> u32`, not for `GetAnswer -> String`.
    let dispatcher = dispatcher(answer_registry());

    let err = dispatcher
        .send::<String>(GetAnswer, CancellationToken::new())
        .await
        .unwrap_err();

    assert!(matches!(err, DispatchError::MissingHandler { .. }));
    assert!(err.to_string().contains("GetAnswer"));
}

#[tokio::test]
async fn test_handler_error_reaches_caller_unchanged() {
    let dispatcher = dispatcher(
        ServiceRegistry::builder().handler::<GetAnswer, u32>(FailingHandler::new("out of answers")),
    );

    let err = dispatcher
        .send::<u32>(GetAnswer, CancellationToken::new())
        .await
        .unwrap_err();

    assert!(err.is_participant());
    assert_eq!(err.to_string(), "out of answers");
    let inner = err.into_participant().unwrap();
    assert!(inner.downcast_ref::<TestError>().is_some());
}

#[tokio::test]
async fn test_repeated_dispatch_compiles_once() {
    let dispatcher = Dispatcher::builder(answer_registry().build().unwrap())
        .pipeline(false)
        .build();

    for _ in 0..50 {
        let answer: u32 = dispatcher
            .send(GetAnswer, CancellationToken::new())
            .await
            .unwrap();
        assert_eq!(answer, 42);
    }

    assert_eq!(dispatcher.cache().compilations(), 1);
    assert!(dispatcher.cache().contains(&Signature {
        flavor: Flavor::One,
        key: ServiceKey::of::<dyn DynHandler<GetAnswer, u32>>(),
    }));
}

#[tokio::test]
async fn test_full_pipeline_compiles_once_per_signature() {
    let dispatcher = dispatcher(answer_registry());

    let _: u32 = dispatcher.send(GetAnswer, CancellationToken::new()).await.unwrap();
    let after_first = dispatcher.cache().compilations();
    for _ in 0..20 {
        let _: u32 = dispatcher.send(GetAnswer, CancellationToken::new()).await.unwrap();
    }

    // Handler, behaviors, pre-hooks, hooks and post-hooks.
    assert_eq!(after_first, 5);
    assert_eq!(dispatcher.cache().compilations(), after_first);
}

#[tokio::test]
async fn test_distinct_pairs_compile_separately() {
    let dispatcher = Dispatcher::builder(
        ServiceRegistry::builder()
            .handler::<GetAnswer, u32>(AnswerHandler)
            .handler::<Echo, String>(EchoHandler)
            .build()
            .unwrap(),
    )
    .pipeline(false)
    .build();

    let _: u32 = dispatcher.send(GetAnswer, CancellationToken::new()).await.unwrap();
    let echoed: String = dispatcher
        .send(
            Echo {
                text: "hi".to_string(),
            },
            CancellationToken::new(),
        )
        .await
        .unwrap();

    assert_eq!(echoed, "hi");
    assert_eq!(dispatcher.cache().compilations(), 2);
}
