//! # Delivery schedulers.
//!
//! [`Schedule`] selects the execution context for final delivery and error
//! routing. [`SerialScheduler`] is a single dedicated OS thread draining a
//! FIFO queue, the usual shape of a UI-thread dispatcher.
//!
//! ## Architecture
//! ```text
//! run(work) ──► [unbounded queue] ──► scheduler thread ──► work()
//!                                                   └─► panic caught → EventKind::WorkPanicked
//! ```
//!
//! ## Rules
//! - Work runs in submission order (FIFO) on one thread.
//! - A panicking unit of work does not stop the thread.
//! - After [`SerialScheduler::shutdown`] submitted work is dropped and
//!   `EventKind::WorkRejected` is published.

use std::fmt;
use std::panic::{self, AssertUnwindSafe};
use std::sync::{Arc, Mutex, PoisonError};
use std::thread::{self, JoinHandle, ThreadId};

use tokio::sync::mpsc;

use crate::config::SchedulerConfig;
use crate::error::{RuntimeError, panic_info};
use crate::events::{Bus, Event, EventKind};

/// Unit of work handed to a scheduler.
pub type Work = Box<dyn FnOnce() + Send + 'static>;

/// Bundles a handler with the parameter it runs with.
///
/// # Example
/// ```rust
/// use datasub::with_param;
///
/// let work = with_param(|n: u32| assert_eq!(n, 7), 7);
/// work();
/// ```
pub fn with_param<P, F>(handler: F, param: P) -> Work
where
    P: Send + 'static,
    F: FnOnce(P) + Send + 'static,
{
    Box::new(move || handler(param))
}

/// Scheduler contract: runs work in the scheduler's own execution context.
pub trait Schedule: Send + Sync + 'static {
    /// Schedules `work`; returns without waiting for it.
    fn run(&self, work: Work);
}

/// Single dedicated thread executing work in FIFO order.
pub struct SerialScheduler {
    name: Arc<str>,
    thread_id: ThreadId,
    tx: Mutex<Option<mpsc::UnboundedSender<Work>>>,
    thread: Mutex<Option<JoinHandle<()>>>,
    bus: Bus,
}

impl SerialScheduler {
    /// Spawns the scheduler thread.
    pub fn spawn(cfg: SchedulerConfig, bus: Bus) -> Result<Self, RuntimeError> {
        let (tx, mut rx) = mpsc::unbounded_channel::<Work>();
        let name: Arc<str> = Arc::from(cfg.name.as_str());

        let mut builder = thread::Builder::new().name(cfg.name.clone());
        if let Some(size) = cfg.stack_size() {
            builder = builder.stack_size(size);
        }

        let worker_name = Arc::clone(&name);
        let worker_bus = bus.clone();
        let handle = builder
            .spawn(move || {
                while let Some(work) = rx.blocking_recv() {
                    if let Err(payload) = panic::catch_unwind(AssertUnwindSafe(work)) {
                        let info = panic_info(payload.as_ref());
                        eprintln!(
                            "[datasub] scheduler '{}' work panicked: {}",
                            worker_name, info
                        );
                        worker_bus.publish(
                            Event::new(EventKind::WorkPanicked)
                                .with_source(Arc::clone(&worker_name))
                                .with_reason(info),
                        );
                    }
                }
            })
            .map_err(|e| RuntimeError::SchedulerSpawn {
                name: cfg.name.clone(),
                error: e.to_string(),
            })?;

        Ok(Self {
            name,
            thread_id: handle.thread().id(),
            tx: Mutex::new(Some(tx)),
            thread: Mutex::new(Some(handle)),
            bus,
        })
    }

    /// Scheduler name (also the thread name).
    pub fn name(&self) -> &str {
        &self.name
    }

    /// True if called from the scheduler thread.
    pub fn is_current(&self) -> bool {
        thread::current().id() == self.thread_id
    }

    /// Closes the queue, lets queued work finish and joins the thread.
    ///
    /// Called from the scheduler thread itself, it only closes the queue.
    pub fn shutdown(&self) {
        drop(self.tx.lock().unwrap_or_else(PoisonError::into_inner).take());

        if self.is_current() {
            return;
        }
        let handle = self
            .thread
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take();
        if let Some(handle) = handle {
            let _ = handle.join();
        }
    }

    fn reject(&self) {
        self.bus.publish(Event::new(EventKind::WorkRejected).with_source(Arc::clone(&self.name)));
    }
}

impl Schedule for SerialScheduler {
    fn run(&self, work: Work) {
        let sent = match self.tx.lock().unwrap_or_else(PoisonError::into_inner).as_ref() {
            Some(tx) => tx.send(work).is_ok(),
            None => false,
        };
        if !sent {
            self.reject();
        }
    }
}

impl fmt::Debug for SerialScheduler {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SerialScheduler")
            .field("name", &self.name)
            .finish_non_exhaustive()
    }
}
