//! # Worker pool for transforms.
//!
//! [`Execute`] is the contract the pipeline submits transform jobs to; no
//! result is awaited by the submitter. [`TokioPool`] implements it on a tokio
//! runtime and supervises every job:
//!
//! ```text
//! execute(job) ──► spawn(supervisor) ──► [permit] ──► spawn_blocking(job)
//!                                                         │
//!                        Ok(Ok(()))  ─────────────────────┤ nothing
//!                        Ok(Err(e))  ─► TransformEscalated ─► UnhandledPolicy
//!                        Err(panic)  ─► JobPanicked
//!                        Err(cancel) ─► JobDropped
//! ```
//!
//! ## Rules
//! - Jobs for the same subscription may run concurrently; no ordering is kept.
//! - `max_concurrent` bounds running jobs across all subscriptions.
//! - After [`TokioPool::shutdown`] queued jobs are dropped (`JobDropped`);
//!   running jobs finish.

use std::borrow::Cow;
use std::fmt;
use std::sync::Arc;

use tokio::runtime::Handle;
use tokio::select;
use tokio::sync::Semaphore;
use tokio::task::JoinError;
use tokio_util::sync::CancellationToken;

use crate::config::PoolConfig;
use crate::error::{RuntimeError, TransformError, panic_info};
use crate::events::{Bus, Event, EventKind};
use crate::policies::UnhandledPolicy;

/// Unit of work submitted to a worker pool.
///
/// `Err` means a transform failure nobody handled; the pool harness decides
/// what to do with it.
pub struct Job {
    subscription: Option<u64>,
    run: Box<dyn FnOnce() -> Result<(), TransformError> + Send + 'static>,
}

impl Job {
    /// Wraps a closure as a job.
    pub fn new<F>(f: F) -> Self
    where
        F: FnOnce() -> Result<(), TransformError> + Send + 'static,
    {
        Self {
            subscription: None,
            run: Box::new(f),
        }
    }

    /// Tags the job with the subscription it belongs to (used in events).
    pub fn for_subscription(mut self, id: u64) -> Self {
        self.subscription = Some(id);
        self
    }

    /// Subscription id, if tagged.
    pub fn subscription(&self) -> Option<u64> {
        self.subscription
    }

    /// Runs the job on the current thread.
    pub fn run(self) -> Result<(), TransformError> {
        (self.run)()
    }
}

impl fmt::Debug for Job {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Job")
            .field("subscription", &self.subscription)
            .finish_non_exhaustive()
    }
}

/// Worker-pool contract: accepts a job for asynchronous execution.
pub trait Execute: Send + Sync + 'static {
    /// Submits a job; returns without waiting for it.
    fn execute(&self, job: Job);
}

/// Tokio-backed worker pool with a result-observing harness.
///
/// ## Example
/// ```rust
/// use std::sync::Arc;
/// use datasub::{Execute, Job, PoolConfig, TokioPool};
///
/// #[tokio::main]
/// async fn main() -> Result<(), datasub::RuntimeError> {
///     let pool = Arc::new(TokioPool::current(PoolConfig::default())?);
///     let mut events = pool.bus().subscribe();
///
///     pool.execute(Job::new(|| Err(datasub::TransformError::failed("boom"))));
///     let ev = events.recv().await.expect("event");
///     assert!(ev.is_escalation());
///     Ok(())
/// }
/// ```
pub struct TokioPool {
    name: Arc<str>,
    handle: Handle,
    bus: Bus,
    semaphore: Option<Arc<Semaphore>>,
    token: CancellationToken,
    on_unhandled: UnhandledPolicy,
}

impl TokioPool {
    /// Creates a pool running jobs on the given runtime.
    pub fn new(handle: Handle, cfg: PoolConfig) -> Self {
        Self {
            name: Arc::from("transform-pool"),
            handle,
            bus: Bus::new(cfg.bus_capacity_clamped()),
            semaphore: cfg.concurrency_limit().map(Semaphore::new).map(Arc::new),
            token: CancellationToken::new(),
            on_unhandled: cfg.on_unhandled,
        }
    }

    /// Creates a pool on the runtime of the calling thread.
    pub fn current(cfg: PoolConfig) -> Result<Self, RuntimeError> {
        let handle = Handle::try_current().map_err(|e| RuntimeError::NoRuntime {
            error: e.to_string(),
        })?;
        Ok(Self::new(handle, cfg))
    }

    /// Sets the pool name used as event source.
    pub fn named(mut self, name: impl Into<Cow<'static, str>>) -> Self {
        let name: Cow<'static, str> = name.into();
        self.name = Arc::from(name);
        self
    }

    /// Pool name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Supervisory channel: escalations and job faults are published here.
    pub fn bus(&self) -> &Bus {
        &self.bus
    }

    /// Stops accepting work: queued jobs are dropped, running jobs finish.
    pub fn shutdown(&self) {
        self.token.cancel();
        if let Some(sem) = &self.semaphore {
            sem.close();
        }
    }

    /// True after [`shutdown`](Self::shutdown).
    pub fn is_shut_down(&self) -> bool {
        self.token.is_cancelled()
    }

    fn harness(&self) -> Harness {
        Harness {
            name: Arc::clone(&self.name),
            bus: self.bus.clone(),
            on_unhandled: self.on_unhandled,
        }
    }
}

impl Execute for TokioPool {
    fn execute(&self, job: Job) {
        let harness = self.harness();
        let id = job.subscription();

        if self.token.is_cancelled() {
            harness.dropped(id);
            return;
        }

        let semaphore = self.semaphore.clone();
        let token = self.token.clone();

        self.handle.spawn(async move {
            if token.is_cancelled() {
                harness.dropped(id);
                return;
            }
            let _permit = match semaphore {
                Some(sem) => {
                    select! {
                        res = sem.acquire_owned() => match res {
                            Ok(permit) => Some(permit),
                            Err(_closed) => {
                                harness.dropped(id);
                                return;
                            }
                        },
                        _ = token.cancelled() => {
                            harness.dropped(id);
                            return;
                        }
                    }
                }
                None => None,
            };

            let res = tokio::task::spawn_blocking(move || job.run()).await;
            harness.observe(id, res);
        });
    }
}

impl fmt::Debug for TokioPool {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TokioPool")
            .field("name", &self.name)
            .field("shut_down", &self.is_shut_down())
            .finish_non_exhaustive()
    }
}

/// Observes job results on behalf of the pool.
struct Harness {
    name: Arc<str>,
    bus: Bus,
    on_unhandled: UnhandledPolicy,
}

impl Harness {
    fn observe(&self, id: Option<u64>, res: Result<Result<(), TransformError>, JoinError>) {
        match res {
            Ok(Ok(())) => {}
            Ok(Err(err)) => self.escalate(id, err),
            Err(je) if je.is_panic() => {
                let info = panic_info(je.into_panic().as_ref());
                eprintln!(
                    "[datasub] pool '{}' job panicked (subscription={:?}): {}",
                    self.name, id, info
                );
                self.bus.publish(
                    Event::new(EventKind::JobPanicked)
                        .with_source(Arc::clone(&self.name))
                        .with_subscription_opt(id)
                        .with_reason(info),
                );
            }
            Err(_cancelled) => self.dropped(id),
        }
    }

    /// Unhandled transform failure: always loud, never absorbed.
    fn escalate(&self, id: Option<u64>, err: TransformError) {
        eprintln!(
            "[datasub] pool '{}' transform failed without an error observer (subscription={:?}): {}",
            self.name, id, err
        );
        self.bus.publish(
            Event::new(EventKind::TransformEscalated)
                .with_source(Arc::clone(&self.name))
                .with_subscription_opt(id)
                .with_reason(err.to_string()),
        );
        if self.on_unhandled.is_fatal() {
            std::process::abort();
        }
    }

    fn dropped(&self, id: Option<u64>) {
        self.bus.publish(
            Event::new(EventKind::JobDropped)
                .with_source(Arc::clone(&self.name))
                .with_subscription_opt(id),
        );
    }
}
