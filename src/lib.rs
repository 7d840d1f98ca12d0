//! # datasub
//!
//! **datasub** is the reactive notification layer between a push-based data
//! source (e.g. a live query) and its consumers.
//!
//! A consumer subscribes through a [`SubscriptionBuilder`] and may configure:
//! - a **transform** run asynchronously on a worker pool,
//! - a **scheduler** that delivers values (and routed errors) in its own execution context,
//! - an **error observer** for transform failures,
//! - a **weak** reference to the observer.
//!
//! ## Architecture
//! ### Overview
//! ```text
//!   Publisher (external)                          Subscription (handle)
//!        │ push(v)                                  cancel() ─► publisher.unsubscribe(sink)
//!        ▼                                          is_canceled()
//! ┌──────────────────────────────────────────────────────────────────┐
//! │ sink registered by SubscriptionBuilder::observer()               │
//! │  - the observer itself          (no transform, no scheduler)     │
//! │  - WeakObserver                 (weak, no transform/scheduler)   │
//! │  - PipelineAdapter              (transform and/or scheduler)     │
//! └──────┬───────────────────────────────────────────────────────────┘
//!        │ transform?
//!        ▼
//!   Execute (worker pool, e.g. TokioPool) ──► transformer(v)
//!        │                                      ├─ Ok(o)  ─► deliver(o)
//!        │                                      └─ Err(e) ─► error observer
//!        │                                                   or escalation ─► Bus
//!        ▼
//!   Schedule (e.g. SerialScheduler) ──► observer.on_data(o)
//! ```
//!
//! ### Threads
//! - **publisher thread**: calls the registered sink; runs delivery when nothing else is configured.
//! - **worker pool**: runs transforms; values of one subscription may be transformed concurrently.
//! - **scheduler**: runs final delivery and error routing when configured.
//!
//! ### Cancellation
//! `cancel()` flips an atomic flag checked at every checkpoint (job start,
//! delivery, scheduled delivery). It does not wait for in-flight work: a value
//! already past its last checkpoint may still be delivered.
//!
//! ## Features
//! | Area              | Description                                                      | Key types / traits                         |
//! |-------------------|------------------------------------------------------------------|--------------------------------------------|
//! | **Subscriptions** | Configure and finalize subscriptions, cancel them.               | [`SubscriptionBuilder`], [`Subscription`]  |
//! | **Observers**     | Sinks, publishers, correlation parameter.                        | [`Observe`], [`Publish`], [`Param`]        |
//! | **Execution**     | Worker pool and scheduler contracts plus tokio/thread backends.  | [`Execute`], [`Schedule`], [`TokioPool`]   |
//! | **Events**        | Supervisory channel for faults off the caller's thread.          | [`Bus`], [`Event`], [`EventKind`]          |
//! | **Errors**        | Typed configuration, transform and runtime errors.               | [`ConfigError`], [`TransformError`]        |
//! | **Configuration** | Pool and scheduler settings, escalation policy.                  | [`PoolConfig`], [`UnhandledPolicy`]        |
//!
//! ## Optional features
//! - `logging`: exports a simple built-in [`LogWriter`] _(demo/reference only)_.
//!
//! ## Example
//! ```rust
//! use std::sync::{Arc, Mutex};
//! use datasub::{
//!     ObserverFn, ObserverRef, Param, PoolConfig, Publish, SchedulerConfig, SerialScheduler,
//!     SubscriptionBuilder, TokioPool,
//! };
//!
//! #[derive(Default)]
//! struct Prices(Mutex<Vec<ObserverRef<u64>>>);
//!
//! impl Publish<u64> for Prices {
//!     fn subscribe(&self, observer: ObserverRef<u64>, _param: &Param) {
//!         self.0.lock().unwrap().push(observer);
//!     }
//!     fn unsubscribe(&self, observer: &ObserverRef<u64>, _param: &Param) {
//!         self.0.lock().unwrap().retain(|o| !datasub::same_observer(o, observer));
//!     }
//! }
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let pool = Arc::new(TokioPool::current(PoolConfig::default())?);
//!     let ui = Arc::new(SerialScheduler::spawn(
//!         SchedulerConfig::named("ui"),
//!         pool.bus().clone(),
//!     )?);
//!     let prices = Arc::new(Prices::default());
//!
//!     let (tx, rx) = std::sync::mpsc::channel();
//!     let sub = SubscriptionBuilder::new(prices.clone(), Param::new("EUR"), pool.clone())
//!         .transform(|cents: u64| Ok::<_, std::fmt::Error>(format!("{}.{:02}", cents / 100, cents % 100)))?
//!         .on(ui.clone())?
//!         .on_error(|e| eprintln!("price feed: {e}"))?
//!         .observer(ObserverFn::arc("label", move |s: String| {
//!             let _ = tx.send(s);
//!         }));
//!
//!     for o in prices.0.lock().unwrap().iter() {
//!         o.on_data(1999);
//!     }
//!     let label = tokio::task::spawn_blocking(move || rx.recv()).await??;
//!     assert_eq!(label, "19.99");
//!
//!     sub.cancel();
//!     ui.shutdown();
//!     Ok(())
//! }
//! ```
mod config;
mod error;
mod events;
mod exec;
mod observer;
mod policies;
mod subscription;

// ---- Public re-exports ----

pub use config::{PoolConfig, SchedulerConfig};
pub use error::{BoxError, ConfigError, RuntimeError, TransformError};
pub use events::{Bus, Event, EventKind};
pub use exec::{Execute, Job, Schedule, SerialScheduler, TokioPool, Work, with_param};
pub use observer::{ErrorObserver, Observe, ObserverFn, ObserverRef, Param, Publish, same_observer};
pub use policies::UnhandledPolicy;
pub use subscription::{Subscription, SubscriptionBuilder, SubscriptionList, WeakObserver};

// Optional: expose a simple built-in event printer (demo/reference).
// Enable with: `--features logging`
#[cfg(feature = "logging")]
mod listeners;
#[cfg(feature = "logging")]
pub use listeners::LogWriter;
