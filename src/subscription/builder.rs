//! # Subscription builder.
//!
//! [`SubscriptionBuilder`] accumulates the configuration of one subscription
//! and finalizes it with [`observer`](SubscriptionBuilder::observer):
//!
//! - [`weak`](SubscriptionBuilder::weak) reference the observer weakly
//! - [`transform`](SubscriptionBuilder::transform) map pushed values on the worker pool
//! - [`on_error`](SubscriptionBuilder::on_error) receive transform failures
//! - [`on`](SubscriptionBuilder::on) deliver through a scheduler
//!
//! ## Rules
//! - Each option can be set once; a second set returns [`ConfigError`] and
//!   consumes the builder.
//! - `observer(..)` consumes the builder: one configuration, one subscription.
//! - Without transformer and scheduler the observer itself is registered with
//!   the publisher (no pipeline in between).
//! - Registration with the publisher happens inside `observer(..)`.
//! - The subscription does not keep the publisher alive: once the publisher
//!   is dropped, `cancel()` has nothing to unregister.
//!
//! ## Example
//! ```rust
//! use std::sync::{Arc, Mutex};
//! use datasub::{
//!     ConfigError, Execute, Job, ObserverFn, ObserverRef, Param, Publish, SubscriptionBuilder,
//! };
//!
//! struct Inline;
//! impl Execute for Inline {
//!     fn execute(&self, job: Job) {
//!         let _ = job.run();
//!     }
//! }
//!
//! #[derive(Default)]
//! struct Source(Mutex<Vec<ObserverRef<u32>>>);
//! impl Publish<u32> for Source {
//!     fn subscribe(&self, observer: ObserverRef<u32>, _param: &Param) {
//!         self.0.lock().unwrap().push(observer);
//!     }
//!     fn unsubscribe(&self, observer: &ObserverRef<u32>, _param: &Param) {
//!         self.0.lock().unwrap().retain(|o| !datasub::same_observer(o, observer));
//!     }
//! }
//!
//! # fn main() -> Result<(), ConfigError> {
//! let source = Arc::new(Source::default());
//! let seen = Arc::new(Mutex::new(Vec::new()));
//! let s = Arc::clone(&seen);
//!
//! let sub = SubscriptionBuilder::new(source.clone(), Param::none(), Arc::new(Inline))
//!     .transform(|v: u32| Ok::<_, std::fmt::Error>(format!("#{v}")))?
//!     .observer(ObserverFn::arc("labels", move |v: String| s.lock().unwrap().push(v)));
//!
//! for o in source.0.lock().unwrap().iter() {
//!     o.on_data(5);
//! }
//! assert_eq!(*seen.lock().unwrap(), vec!["#5".to_string()]);
//!
//! sub.cancel();
//! assert!(source.0.lock().unwrap().is_empty());
//! # Ok(())
//! # }
//! ```

use std::fmt;
use std::sync::Arc;

use crate::error::{BoxError, ConfigError, TransformError};
use crate::exec::{Execute, Schedule};
use crate::observer::{ErrorObserver, ObserverRef, Param, Publish};

use super::adapter::{PipelineAdapter, Stage, Transformer};
use super::handle::Subscription;
use super::weak::WeakObserver;

/// Builds a [`Subscription`] of an observer of `O` to a publisher of `T`.
///
/// `O` equals `T` until a transformer is configured.
pub struct SubscriptionBuilder<T, O = T> {
    publisher: Arc<dyn Publish<T>>,
    param: Param,
    pool: Arc<dyn Execute>,
    stage: Stage<T, O>,
    scheduler: Option<Arc<dyn Schedule>>,
    on_error: Option<ErrorObserver>,
    weak: bool,
}

impl<T: Send + 'static> SubscriptionBuilder<T, T> {
    /// Starts configuring a subscription.
    ///
    /// ### Parameters
    /// - `publisher`: data source the observer subscribes to
    /// - `param`: correlation parameter passed to the publisher on (un)subscribe
    /// - `pool`: worker pool, used only if a transformer is configured
    pub fn new(publisher: Arc<dyn Publish<T>>, param: Param, pool: Arc<dyn Execute>) -> Self {
        Self {
            publisher,
            param,
            pool,
            stage: Stage::Passthrough {
                value: std::convert::identity::<T>,
                sink: std::convert::identity::<ObserverRef<T>>,
            },
            scheduler: None,
            on_error: None,
            weak: false,
        }
    }
}

impl<T, O> SubscriptionBuilder<T, O>
where
    T: Send + 'static,
    O: Send + 'static,
{
    /// References the observer weakly.
    ///
    /// Deliveries stop as soon as the last strong handle to the observer is
    /// dropped; the subscription stays registered until canceled.
    pub fn weak(mut self) -> Self {
        self.weak = true;
        self
    }

    /// Transforms pushed values before delivery.
    ///
    /// The transformer runs on the worker pool; the observer is called on the
    /// same worker thread unless a scheduler is set with [`on`](Self::on).
    /// A failure (an `Err` or a panic) goes to the error observer, or is
    /// escalated to the pool harness if there is none.
    ///
    /// Returns [`ConfigError::TransformerAlreadySet`] if called twice.
    pub fn transform<TO, E, F>(self, f: F) -> Result<SubscriptionBuilder<T, TO>, ConfigError>
    where
        TO: Send + 'static,
        E: Into<BoxError>,
        F: Fn(O) -> Result<TO, E> + Send + Sync + 'static,
    {
        let value = match self.stage {
            Stage::Transform(_) => return Err(ConfigError::TransformerAlreadySet),
            Stage::Passthrough { value, .. } => value,
        };
        let transformer: Transformer<T, TO> =
            Arc::new(move |raw: T| f(value(raw)).map_err(|e| TransformError::failed(e)));

        Ok(SubscriptionBuilder {
            publisher: self.publisher,
            param: self.param,
            pool: self.pool,
            stage: Stage::Transform(transformer),
            scheduler: self.scheduler,
            on_error: self.on_error,
            weak: self.weak,
        })
    }

    /// Routes transform failures to `f`.
    ///
    /// Called on the scheduler if one is set, on the worker thread otherwise;
    /// skipped once the subscription is canceled.
    ///
    /// Returns [`ConfigError::ErrorObserverAlreadySet`] if called twice.
    pub fn on_error<F>(mut self, f: F) -> Result<Self, ConfigError>
    where
        F: Fn(TransformError) + Send + Sync + 'static,
    {
        if self.on_error.is_some() {
            return Err(ConfigError::ErrorObserverAlreadySet);
        }
        self.on_error = Some(Arc::new(f));
        Ok(self)
    }

    /// Delivers values (and routed errors) through `scheduler`.
    ///
    /// Returns [`ConfigError::SchedulerAlreadySet`] if called twice.
    pub fn on(mut self, scheduler: Arc<dyn Schedule>) -> Result<Self, ConfigError> {
        if self.scheduler.is_some() {
            return Err(ConfigError::SchedulerAlreadySet);
        }
        self.scheduler = Some(scheduler);
        Ok(self)
    }

    /// Finalizes the configuration: registers with the publisher and returns
    /// the subscription.
    ///
    /// Subscribing the same observer twice creates two independent
    /// subscriptions.
    pub fn observer(self, observer: ObserverRef<O>) -> Subscription {
        let Self {
            publisher,
            param,
            pool,
            stage,
            scheduler,
            on_error,
            weak,
        } = self;

        let subscription = Subscription::new(param.clone(), observer.name());
        let target: ObserverRef<O> = if weak {
            Arc::new(WeakObserver::new(&observer, subscription.clone()))
        } else {
            observer
        };

        let sink: ObserverRef<T> = match (stage, scheduler) {
            (Stage::Passthrough { sink, .. }, None) => sink(target),
            (stage, scheduler) => Arc::new(PipelineAdapter::new(
                subscription.clone(),
                stage,
                pool,
                on_error,
                scheduler,
                target,
            )),
        };

        publisher.subscribe(Arc::clone(&sink), &param);

        // The sink holds the subscription; only weak links point back.
        let publisher = Arc::downgrade(&publisher);
        let sink = Arc::downgrade(&sink);
        subscription.bind(Box::new(move || {
            if let (Some(publisher), Some(sink)) = (publisher.upgrade(), sink.upgrade()) {
                publisher.unsubscribe(&sink, &param);
            }
        }));
        subscription
    }
}

impl<T, O> fmt::Debug for SubscriptionBuilder<T, O> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SubscriptionBuilder")
            .field("param", &self.param)
            .field("transform", &matches!(self.stage, Stage::Transform(_)))
            .field("scheduler", &self.scheduler.is_some())
            .field("on_error", &self.on_error.is_some())
            .field("weak", &self.weak)
            .finish()
    }
}
