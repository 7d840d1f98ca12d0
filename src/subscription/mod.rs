//! # Subscriptions: configuration, handle and delivery pipeline.
//!
//! ```text
//! SubscriptionBuilder ── observer(obs) ──► Subscription (handle)
//!        │                                      │
//!        │  no transform, no scheduler          │ cancel() ─► publisher.unsubscribe(sink)
//!        ├──► publisher.subscribe(obs)          │
//!        │                                      │
//!        └──► publisher.subscribe(PipelineAdapter)
//!                   │
//!                   ├─ transform? ─► pool.execute(job) ─► transformer(raw)
//!                   │                                      ├─ Ok(v)  ─► deliver(v)
//!                   │                                      └─ Err(e) ─► error observer / escalate
//!                   └─ deliver(v) ─► scheduler.run(work) or observer.on_data(v)
//! ```
//!
//! Every checkpoint on the way (job start, delivery, scheduled delivery,
//! scheduled error) re-checks the cancellation flag. A value already past its
//! last checkpoint when `cancel()` returns may still be delivered.

mod adapter;
mod builder;
mod handle;
mod list;
mod weak;

pub use builder::SubscriptionBuilder;
pub use handle::Subscription;
pub use list::SubscriptionList;
pub use weak::WeakObserver;
