//! Shared helpers for integration tests: an in-memory publisher, channel-backed
//! observers and execution contexts with recognizable thread names.

#![allow(dead_code)]

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::mpsc::{self, Receiver};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use datasub::{
    Bus, ObserverFn, ObserverRef, Param, PoolConfig, Publish, SchedulerConfig, SerialScheduler,
    TokioPool, TransformError, same_observer,
};
use tokio::runtime::Runtime;

pub const POOL_THREAD: &str = "transform-pool";
pub const DELIVERY_THREAD: &str = "delivery";
pub const WAIT: Duration = Duration::from_secs(5);
pub const QUIET: Duration = Duration::from_millis(150);

/// In-memory publisher pushing to every registered sink on the caller's thread.
pub struct TestPublisher<T> {
    sinks: Mutex<Vec<(ObserverRef<T>, Param)>>,
    unsubscribes: AtomicUsize,
}

impl<T> Default for TestPublisher<T> {
    fn default() -> Self {
        Self {
            sinks: Mutex::new(Vec::new()),
            unsubscribes: AtomicUsize::new(0),
        }
    }
}

impl<T: Clone + Send + 'static> TestPublisher<T> {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn push(&self, value: T) {
        for sink in self.snapshot() {
            sink.on_data(value.clone());
        }
    }

    /// Currently registered sinks.
    pub fn snapshot(&self) -> Vec<ObserverRef<T>> {
        self.sinks
            .lock()
            .expect("sinks")
            .iter()
            .map(|(s, _)| Arc::clone(s))
            .collect()
    }

    pub fn sink_count(&self) -> usize {
        self.sinks.lock().expect("sinks").len()
    }

    pub fn params(&self) -> Vec<Param> {
        self.sinks
            .lock()
            .expect("sinks")
            .iter()
            .map(|(_, p)| p.clone())
            .collect()
    }

    pub fn unsubscribes(&self) -> usize {
        self.unsubscribes.load(Ordering::SeqCst)
    }
}

impl<T: Clone + Send + 'static> Publish<T> for TestPublisher<T> {
    fn subscribe(&self, observer: ObserverRef<T>, param: &Param) {
        self.sinks
            .lock()
            .expect("sinks")
            .push((observer, param.clone()));
    }

    fn unsubscribe(&self, observer: &ObserverRef<T>, _param: &Param) {
        self.unsubscribes.fetch_add(1, Ordering::SeqCst);
        let mut sinks = self.sinks.lock().expect("sinks");
        if let Some(pos) = sinks.iter().position(|(s, _)| same_observer(s, observer)) {
            sinks.remove(pos);
        }
    }
}

/// Value delivered together with the name of the thread it arrived on.
pub type Delivered<O> = (O, Option<String>);

fn thread_name() -> Option<String> {
    std::thread::current().name().map(str::to_owned)
}

/// Observer forwarding every value (and the delivering thread's name) to a channel.
pub fn channel_observer<O: Send + 'static>() -> (ObserverRef<O>, Receiver<Delivered<O>>) {
    let (tx, rx) = mpsc::channel();
    let obs: ObserverRef<O> = ObserverFn::arc("channel", move |v: O| {
        let _ = tx.send((v, thread_name()));
    });
    (obs, rx)
}

/// Observer counting deliveries into a shared counter.
pub fn counting_observer<O: Send + 'static>() -> (ObserverRef<O>, Arc<AtomicUsize>) {
    let count = Arc::new(AtomicUsize::new(0));
    let c = Arc::clone(&count);
    let obs: ObserverRef<O> = ObserverFn::arc("counter", move |_v: O| {
        c.fetch_add(1, Ordering::SeqCst);
    });
    (obs, count)
}

/// Error observer forwarding the message (and thread name) to a channel.
pub fn error_channel() -> (
    impl Fn(TransformError) + Send + Sync + 'static,
    Receiver<Delivered<String>>,
) {
    let (tx, rx) = mpsc::channel();
    let f = move |e: TransformError| {
        let _ = tx.send((e.to_string(), thread_name()));
    };
    (f, rx)
}

/// Multi-threaded runtime whose threads (workers and blocking pool) are named [`POOL_THREAD`].
pub fn runtime() -> Runtime {
    tokio::runtime::Builder::new_multi_thread()
        .worker_threads(2)
        .thread_name(POOL_THREAD)
        .enable_all()
        .build()
        .expect("runtime")
}

pub fn pool(rt: &Runtime) -> Arc<TokioPool> {
    Arc::new(TokioPool::new(rt.handle().clone(), PoolConfig::default()))
}

pub fn scheduler(bus: &Bus) -> Arc<SerialScheduler> {
    Arc::new(
        SerialScheduler::spawn(SchedulerConfig::named(DELIVERY_THREAD), bus.clone())
            .expect("scheduler"),
    )
}
