//! End-to-end pipeline behavior on a real tokio worker pool and a dedicated
//! delivery thread.

mod common;

use std::sync::atomic::Ordering;
use std::sync::mpsc;
use std::sync::{Arc, Mutex};
use std::thread;

use datasub::{EventKind, Param, SubscriptionBuilder, TransformError};

use common::{
    DELIVERY_THREAD, POOL_THREAD, QUIET, TestPublisher, WAIT, channel_observer,
    counting_observer, error_channel, pool, runtime, scheduler,
};

#[test]
fn test_transform_doubles_value_on_worker_thread() {
    let rt = runtime();
    let publisher = TestPublisher::<u32>::new();
    let (obs, rx) = channel_observer::<u32>();

    let _sub = SubscriptionBuilder::new(publisher.clone(), Param::none(), pool(&rt))
        .transform(|x: u32| Ok::<_, TransformError>(x * 2))
        .expect("transform")
        .observer(obs);

    publisher.push(5);
    let (value, thread) = rx.recv_timeout(WAIT).expect("delivered");
    assert_eq!(value, 10);
    assert_eq!(thread.as_deref(), Some(POOL_THREAD));
}

#[test]
fn test_sequential_pushes_keep_order() {
    let rt = runtime();
    let publisher = TestPublisher::<u32>::new();
    let (obs, rx) = channel_observer::<u32>();

    let _sub = SubscriptionBuilder::new(publisher.clone(), Param::none(), pool(&rt))
        .transform(|x: u32| Ok::<_, TransformError>(x * 2))
        .expect("transform")
        .observer(obs);

    let mut got = Vec::new();
    for v in 1..=3 {
        publisher.push(v);
        got.push(rx.recv_timeout(WAIT).expect("delivered").0);
    }
    assert_eq!(got, vec![2, 4, 6]);
}

#[test]
fn test_scheduler_redirects_transformed_delivery() {
    let rt = runtime();
    let pool = pool(&rt);
    let sched = scheduler(pool.bus());
    let publisher = TestPublisher::<u32>::new();
    let (obs, rx) = channel_observer::<String>();

    let _sub = SubscriptionBuilder::new(publisher.clone(), Param::none(), pool)
        .transform(|x: u32| Ok::<_, TransformError>(x.to_string()))
        .expect("transform")
        .on(sched.clone())
        .expect("scheduler")
        .observer(obs);

    publisher.push(42);
    let (value, thread) = rx.recv_timeout(WAIT).expect("delivered");
    assert_eq!(value, "42");
    assert_eq!(thread.as_deref(), Some(DELIVERY_THREAD));
    sched.shutdown();
}

#[test]
fn test_scheduler_without_transform_leaves_publisher_thread() {
    let rt = runtime();
    let pool = pool(&rt);
    let sched = scheduler(pool.bus());
    let publisher = TestPublisher::<u32>::new();
    let (obs, rx) = channel_observer::<u32>();

    let _sub = SubscriptionBuilder::new(publisher.clone(), Param::none(), pool)
        .on(sched.clone())
        .expect("scheduler")
        .observer(obs);

    let pushing = thread::Builder::new()
        .name("publisher".into())
        .spawn({
            let publisher = publisher.clone();
            move || publisher.push(7)
        })
        .expect("publisher thread");
    pushing.join().expect("pushed");

    let (value, thread) = rx.recv_timeout(WAIT).expect("delivered");
    assert_eq!(value, 7);
    assert_eq!(thread.as_deref(), Some(DELIVERY_THREAD));
    sched.shutdown();
}

#[test]
fn test_plain_subscription_delivers_on_publisher_thread() {
    let rt = runtime();
    let publisher = TestPublisher::<u32>::new();
    let (obs, rx) = channel_observer::<u32>();

    let _sub = SubscriptionBuilder::new(publisher.clone(), Param::new("all"), pool(&rt))
        .observer(obs);

    let pushing = thread::Builder::new()
        .name("publisher".into())
        .spawn({
            let publisher = publisher.clone();
            move || publisher.push(1)
        })
        .expect("publisher thread");
    pushing.join().expect("pushed");

    let (value, thread) = rx.recv_timeout(WAIT).expect("delivered");
    assert_eq!(value, 1);
    assert_eq!(thread.as_deref(), Some("publisher"));
    assert_eq!(publisher.params()[0].get::<&'static str>(), Some(&"all"));
}

#[test]
fn test_error_routed_to_scheduler_thread() {
    let rt = runtime();
    let pool = pool(&rt);
    let sched = scheduler(pool.bus());
    let publisher = TestPublisher::<u32>::new();
    let (obs, rx) = channel_observer::<u32>();
    let (on_error, errors) = error_channel();

    let _sub = SubscriptionBuilder::new(publisher.clone(), Param::none(), pool)
        .transform(|_x: u32| Err::<u32, _>("row vanished"))
        .expect("transform")
        .on(sched.clone())
        .expect("scheduler")
        .on_error(on_error)
        .expect("error observer")
        .observer(obs);

    publisher.push(1);
    let (message, thread) = errors.recv_timeout(WAIT).expect("error routed");
    assert_eq!(message, "transform failed: row vanished");
    assert_eq!(thread.as_deref(), Some(DELIVERY_THREAD));
    assert!(rx.recv_timeout(QUIET).is_err());
    sched.shutdown();
}

#[test]
fn test_error_routed_on_worker_without_scheduler() {
    let rt = runtime();
    let publisher = TestPublisher::<u32>::new();
    let (obs, _rx) = channel_observer::<u32>();
    let (on_error, errors) = error_channel();

    let _sub = SubscriptionBuilder::new(publisher.clone(), Param::none(), pool(&rt))
        .on_error(on_error)
        .expect("error observer")
        .transform(|_x: u32| -> Result<u32, &'static str> { panic!("corrupt page") })
        .expect("transform")
        .observer(obs);

    publisher.push(1);
    let (message, thread) = errors.recv_timeout(WAIT).expect("error routed");
    assert_eq!(message, "transform panicked: corrupt page");
    assert_eq!(thread.as_deref(), Some(POOL_THREAD));
}

#[test]
fn test_unhandled_failure_is_escalated_to_bus() {
    let rt = runtime();
    let pool = pool(&rt);
    let mut events = pool.bus().subscribe();
    let publisher = TestPublisher::<u32>::new();
    let (obs, rx) = channel_observer::<u32>();

    let sub = SubscriptionBuilder::new(publisher.clone(), Param::none(), pool)
        .transform(|_x: u32| Err::<u32, _>("always fails"))
        .expect("transform")
        .observer(obs);

    publisher.push(1);
    let ev = events.blocking_recv().expect("escalation event");
    assert_eq!(ev.kind, EventKind::TransformEscalated);
    assert_eq!(ev.subscription, Some(sub.id()));
    assert_eq!(ev.reason.as_deref(), Some("transform failed: always fails"));
    assert!(rx.recv_timeout(QUIET).is_err());
}

#[test]
fn test_observer_panic_on_worker_reaches_bus() {
    let rt = runtime();
    let pool = pool(&rt);
    let mut events = pool.bus().subscribe();
    let publisher = TestPublisher::<u32>::new();
    let obs: datasub::ObserverRef<u32> = datasub::ObserverFn::arc("fragile", |v: u32| {
        if v > 0 {
            panic!("observer broke");
        }
    });

    let sub = SubscriptionBuilder::new(publisher.clone(), Param::none(), pool)
        .transform(|x: u32| Ok::<_, TransformError>(x))
        .expect("transform")
        .observer(obs);

    publisher.push(1);
    let ev = events.blocking_recv().expect("panic event");
    assert_eq!(ev.kind, EventKind::JobPanicked);
    assert_eq!(ev.subscription, Some(sub.id()));
}

#[test]
fn test_cancel_during_transform_suppresses_delivery() {
    let rt = runtime();
    let publisher = TestPublisher::<u32>::new();
    let (obs, rx) = channel_observer::<u32>();
    let (started_tx, started) = mpsc::channel::<()>();
    let (release, release_rx) = mpsc::channel::<()>();
    let started_tx = Mutex::new(started_tx);
    let release_rx = Mutex::new(release_rx);

    let sub = SubscriptionBuilder::new(publisher.clone(), Param::none(), pool(&rt))
        .transform(move |x: u32| {
            let _ = started_tx.lock().expect("started").send(());
            let _ = release_rx.lock().expect("release").recv_timeout(WAIT);
            Ok::<_, TransformError>(x)
        })
        .expect("transform")
        .observer(obs);

    publisher.push(1);
    started.recv_timeout(WAIT).expect("transform started");
    sub.cancel();
    release.send(()).expect("release transform");

    assert!(rx.recv_timeout(QUIET).is_err());
}

#[test]
fn test_weak_observer_without_owner_gets_nothing() {
    let rt = runtime();
    let pool = pool(&rt);
    let mut events = pool.bus().subscribe();
    let publisher = TestPublisher::<u32>::new();
    let (obs, count) = counting_observer::<u32>();

    // The builder takes the only strong reference, so the observer is
    // reclaimed as soon as the subscription is built.
    let sub = SubscriptionBuilder::new(publisher.clone(), Param::none(), pool)
        .weak()
        .transform(|x: u32| Ok::<_, TransformError>(x + 1))
        .expect("transform")
        .observer(obs);

    publisher.push(1);
    publisher.push(2);
    thread::sleep(QUIET);

    assert_eq!(count.load(Ordering::SeqCst), 0);
    assert!(events.try_recv().is_err());
    assert!(!sub.is_canceled());
    assert_eq!(publisher.sink_count(), 1);
}

#[test]
fn test_weak_observer_dropped_by_owner_is_skipped() {
    let rt = runtime();
    let pool = pool(&rt);
    let mut events = pool.bus().subscribe();
    let publisher = TestPublisher::<u32>::new();
    let (obs, count) = counting_observer::<u32>();

    let sub = SubscriptionBuilder::new(publisher.clone(), Param::none(), pool)
        .weak()
        .transform(|x: u32| Ok::<_, TransformError>(x + 1))
        .expect("transform")
        .observer(Arc::clone(&obs));

    publisher.push(1);
    thread::sleep(QUIET);
    assert_eq!(count.load(Ordering::SeqCst), 1);

    drop(obs);
    publisher.push(2);
    publisher.push(3);
    thread::sleep(QUIET);

    assert_eq!(count.load(Ordering::SeqCst), 1);
    assert!(events.try_recv().is_err());
    assert!(!sub.is_canceled());

    sub.cancel();
    assert_eq!(publisher.sink_count(), 0);
}
