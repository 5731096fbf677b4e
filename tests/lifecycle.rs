//! Bus lifecycle: subscription management, concurrent use, close semantics,
//! detached publishing, and observer wiring.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use tokio_util::sync::CancellationToken;

use eventvisor::{
    Args, Bus, BusError, Config, HandlerError, HandlerFailure, Observe, Shape, Value,
};

fn ok_handler(bus: &Bus, topic: &str, name: &'static str) -> eventvisor::RegistrationId {
    bus.subscribe_fn(topic, name, [], |_ctx: CancellationToken, _args: Args| async {
        Ok::<_, HandlerError>(())
    })
    .expect("subscribe")
}

#[tokio::test]
async fn unsubscribed_handler_is_not_dispatched() {
    let bus = Bus::new(Config::default());
    let counter = Arc::new(AtomicUsize::new(0));

    let c = Arc::clone(&counter);
    let keep = bus
        .subscribe_fn("t", "keep", [], move |_ctx: CancellationToken, _args: Args| {
            let c = Arc::clone(&c);
            async move {
                c.fetch_add(1, Ordering::SeqCst);
                Ok::<_, HandlerError>(())
            }
        })
        .expect("subscribe");
    let gone = ok_handler(&bus, "t", "gone");

    bus.unsubscribe(gone).expect("unsubscribe");
    let res = bus.publish("t", vec![]).await.expect("publish");

    assert_eq!(res.matched, 1);
    assert_eq!(counter.load(Ordering::SeqCst), 1);

    // Removal is not idempotent.
    assert!(matches!(bus.unsubscribe(gone), Err(BusError::NotFound)));
    let _ = keep;
}

#[tokio::test]
async fn same_handler_value_on_two_topics_is_independent() {
    let bus = Bus::new(Config::default());
    let counter = Arc::new(AtomicUsize::new(0));

    let c = Arc::clone(&counter);
    let handler = eventvisor::HandlerFn::arc(
        "shared",
        [],
        move |_ctx: CancellationToken, _args: Args| {
            let c = Arc::clone(&c);
            async move {
                c.fetch_add(1, Ordering::SeqCst);
                Ok::<_, HandlerError>(())
            }
        },
    );

    let on_t1 = bus.subscribe("t1", handler.clone()).expect("subscribe");
    let _on_t2 = bus.subscribe("t2", handler).expect("subscribe");

    bus.publish("t1", vec![]).await.expect("publish");
    assert_eq!(counter.load(Ordering::SeqCst), 1, "only t1 dispatched");

    bus.unsubscribe(on_t1).expect("unsubscribe");
    bus.publish("t2", vec![]).await.expect("publish");
    assert_eq!(counter.load(Ordering::SeqCst), 2, "t2 registration survives");
}

#[tokio::test]
async fn topics_and_handler_count_reflect_registrations() {
    let bus = Bus::new(Config::default());
    assert!(bus.is_empty());

    ok_handler(&bus, "b", "h1");
    ok_handler(&bus, "a", "h2");
    ok_handler(&bus, "a", "h3");

    assert_eq!(bus.topics(), vec!["a".to_string(), "b".to_string()]);
    assert_eq!(bus.handler_count("a"), 2);
    assert_eq!(bus.handler_count("b"), 1);
    assert_eq!(bus.handler_count("missing"), 0);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn concurrent_subscribe_and_publish_is_safe() {
    let bus = Bus::new(Config::default());
    let counter = Arc::new(AtomicUsize::new(0));

    // Seed some handlers so early publishes have matches.
    for _ in 0..8 {
        let c = Arc::clone(&counter);
        bus.subscribe_fn("t", "seed", [], move |_ctx: CancellationToken, _args: Args| {
            let c = Arc::clone(&c);
            async move {
                c.fetch_add(1, Ordering::SeqCst);
                Ok::<_, HandlerError>(())
            }
        })
        .expect("subscribe");
    }

    let mut tasks = Vec::new();
    for _ in 0..16 {
        let bus = bus.clone();
        let c = Arc::clone(&counter);
        tasks.push(tokio::spawn(async move {
            bus.subscribe_fn("t", "late", [], move |_ctx: CancellationToken, _args: Args| {
                let c = Arc::clone(&c);
                async move {
                    c.fetch_add(1, Ordering::SeqCst);
                    Ok::<_, HandlerError>(())
                }
            })
            .expect("subscribe");
        }));
    }
    for _ in 0..16 {
        let bus = bus.clone();
        tasks.push(tokio::spawn(async move {
            let res = bus.publish("t", vec![]).await.expect("publish");
            // Every matched handler of a snapshot is invoked exactly once.
            assert_eq!(res.matched, res.succeeded);
            assert!(res.is_clean());
        }));
    }
    for t in tasks {
        t.await.expect("task");
    }

    // After the dust settles, one publish hits every registration exactly once.
    counter.store(0, Ordering::SeqCst);
    let res = bus.publish("t", vec![]).await.expect("publish");
    assert_eq!(res.matched, 24);
    assert_eq!(res.succeeded, 24);
    assert_eq!(counter.load(Ordering::SeqCst), 24);
}

#[tokio::test]
async fn closed_bus_rejects_every_operation() {
    let bus = Bus::new(Config::default());
    let id = ok_handler(&bus, "t", "h");

    bus.close(Duration::from_millis(100)).await.expect("close");
    assert!(bus.is_closed());

    assert!(matches!(
        bus.subscribe_fn("t", "late", [], |_ctx: CancellationToken, _args: Args| async {
            Ok::<_, HandlerError>(())
        }),
        Err(BusError::Closed)
    ));
    assert!(matches!(bus.unsubscribe(id), Err(BusError::Closed)));
    assert!(matches!(
        bus.publish("t", vec![]).await,
        Err(BusError::Closed)
    ));
    assert!(matches!(
        bus.publish_detached("t", vec![]),
        Err(BusError::Closed)
    ));
    assert!(matches!(
        bus.close(Duration::ZERO).await,
        Err(BusError::Closed)
    ));
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn close_waits_for_in_flight_publish() {
    let bus = Bus::new(Config::default());
    let done = Arc::new(AtomicUsize::new(0));

    let d = Arc::clone(&done);
    bus.subscribe_fn("t", "slow", [], move |_ctx: CancellationToken, _args: Args| {
        let d = Arc::clone(&d);
        async move {
            tokio::time::sleep(Duration::from_millis(60)).await;
            d.fetch_add(1, Ordering::SeqCst);
            Ok::<_, HandlerError>(())
        }
    })
    .expect("subscribe");

    let publisher = {
        let bus = bus.clone();
        tokio::spawn(async move { bus.publish("t", vec![]).await })
    };
    // Let the publish start before closing.
    tokio::time::sleep(Duration::from_millis(10)).await;

    bus.close(Duration::from_secs(2)).await.expect("close");
    assert_eq!(done.load(Ordering::SeqCst), 1, "close must wait for dispatch");

    let res = publisher.await.expect("join").expect("publish");
    assert_eq!(res.succeeded, 1);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn close_reports_grace_exceeded_with_stuck_publish() {
    let bus = Bus::new(Config::default());
    bus.subscribe_fn("t", "stuck", [], |_ctx: CancellationToken, _args: Args| async {
        tokio::time::sleep(Duration::from_millis(300)).await;
        Ok::<_, HandlerError>(())
    })
    .expect("subscribe");

    let publisher = {
        let bus = bus.clone();
        tokio::spawn(async move { bus.publish("t", vec![]).await })
    };
    tokio::time::sleep(Duration::from_millis(10)).await;

    let err = bus.close(Duration::from_millis(20)).await.unwrap_err();
    match err {
        BusError::GraceExceeded { in_flight, .. } => assert_eq!(in_flight, 1),
        other => panic!("expected GraceExceeded, got {other:?}"),
    }

    // The stuck publish still completes on its own.
    let res = publisher.await.expect("join").expect("publish");
    assert_eq!(res.succeeded, 1);
}

struct RecordingObserver {
    records: Mutex<Vec<(String, String, &'static str)>>,
}

impl Observe for RecordingObserver {
    fn on_failure(&self, topic: &str, failure: &HandlerFailure) {
        self.records.lock().unwrap().push((
            topic.to_string(),
            failure.handler.to_string(),
            failure.error.as_label(),
        ));
    }
}

#[tokio::test]
async fn observer_sees_every_failure_record() {
    let observer = Arc::new(RecordingObserver {
        records: Mutex::new(Vec::new()),
    });
    let bus = Bus::builder(Config::default())
        .with_observer(observer.clone())
        .build();

    bus.subscribe_fn("t", "bad", [], |_ctx: CancellationToken, _args: Args| async {
        Err::<(), _>(HandlerError::msg("nope"))
    })
    .expect("subscribe");
    bus.subscribe_fn(
        "t",
        "typed",
        [Shape::Int],
        |_ctx: CancellationToken, _args: Args| async { Ok::<_, HandlerError>(()) },
    )
    .expect("subscribe");

    let res = bus.publish("t", vec![]).await.expect("publish");
    assert_eq!(res.failed(), 2);

    let records = observer.records.lock().unwrap();
    assert_eq!(records.len(), 2);
    assert!(records
        .iter()
        .any(|(t, h, k)| t == "t" && h == "bad" && *k == "dispatch_failed"));
    assert!(records
        .iter()
        .any(|(t, h, k)| t == "t" && h == "typed" && *k == "dispatch_shape_mismatch"));
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn detached_publish_reports_through_observer() {
    let observer = Arc::new(RecordingObserver {
        records: Mutex::new(Vec::new()),
    });
    let bus = Bus::builder(Config::default())
        .with_observer(observer.clone())
        .build();

    bus.subscribe_fn("t", "bad", [], |_ctx: CancellationToken, _args: Args| async {
        Err::<(), _>(HandlerError::msg("nope"))
    })
    .expect("subscribe");

    bus.publish_detached("t", vec![]).expect("publish");

    // close drains the detached dispatch, so the record is there afterwards.
    bus.close(Duration::from_secs(2)).await.expect("close");
    let records = observer.records.lock().unwrap();
    assert_eq!(records.len(), 1);
    assert_eq!(records[0].2, "dispatch_failed");
}

#[tokio::test]
async fn empty_topic_policy_is_enforced() {
    let mut cfg = Config::default();
    cfg.deny_empty_topic = true;
    let bus = Bus::new(cfg);

    // Subscribing to the empty topic stays allowed; publishing does not.
    ok_handler(&bus, "", "edge");
    assert!(matches!(
        bus.publish("", vec![]).await,
        Err(BusError::EmptyTopic)
    ));
    assert!(matches!(
        bus.publish_detached("", vec![]),
        Err(BusError::EmptyTopic)
    ));

    // Default policy allows it.
    let permissive = Bus::new(Config::default());
    ok_handler(&permissive, "", "edge");
    let res = permissive.publish("", vec![]).await.expect("publish");
    assert_eq!(res.succeeded, 1);
}

#[tokio::test]
async fn independent_buses_share_nothing() {
    let a = Bus::new(Config::default());
    let b = Bus::new(Config::default());

    ok_handler(&a, "t", "on-a");
    assert_eq!(a.handler_count("t"), 1);
    assert_eq!(b.handler_count("t"), 0);

    let res = b.publish("t", vec![Value::Bool(true)]).await.expect("publish");
    assert_eq!(res.matched, 0);

    a.close(Duration::ZERO).await.expect("close");
    assert!(!b.is_closed(), "closing one bus must not affect another");
}
