//! # Pipeline adapter: transform → deliver, with error routing.
//!
//! [`PipelineAdapter`] is registered with the publisher when a subscription
//! has a transformer or a scheduler. For each pushed value it runs:
//!
//! ```text
//! on_data(raw)
//!   ├─ Stage::Passthrough ─► deliver(cast(raw))           (publisher thread)
//!   └─ Stage::Transform   ─► pool.execute(job)
//!                              job: canceled? ─► return
//!                                   transformer(raw)      (worker thread)
//!                                   ├─ Ok(v)  ─► deliver(v)
//!                                   └─ Err(e) ─► ErrorRoute::route(e)
//!
//! deliver(v):       canceled? ─► drop;  scheduler? ─► run(observer(v)) : observer(v)
//! route(e):         no error observer ─► Err(e) to the pool harness (escalation)
//!                   canceled? ─► suppress;  scheduler? ─► run(on_error(e)) : on_error(e)
//! ```
//!
//! Scheduled work re-checks cancellation before calling the observer.

use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;

use crate::error::{TransformError, panic_info};
use crate::exec::{Execute, Job, Schedule, with_param};
use crate::observer::{ErrorObserver, Observe, ObserverRef};

use super::handle::Subscription;

/// Transformer composed with any passthrough cast: pushed `T` to observed `O`.
pub(crate) type Transformer<T, O> =
    Arc<dyn Fn(T) -> Result<O, TransformError> + Send + Sync + 'static>;

/// What happens to a pushed value before delivery.
pub(crate) enum Stage<T, O> {
    /// No transformer; `T` and `O` are the same type.
    ///
    /// `value` and `sink` are identity casts that let the builder treat the
    /// pushed and observed types as one without a runtime conversion.
    Passthrough {
        value: fn(T) -> O,
        sink: fn(ObserverRef<O>) -> ObserverRef<T>,
    },
    /// Transformer run on the worker pool.
    Transform(Transformer<T, O>),
}

/// Final delivery to the observer, optionally through a scheduler.
struct Delivery<O> {
    subscription: Subscription,
    observer: ObserverRef<O>,
    scheduler: Option<Arc<dyn Schedule>>,
}

impl<O> Clone for Delivery<O> {
    fn clone(&self) -> Self {
        Self {
            subscription: self.subscription.clone(),
            observer: Arc::clone(&self.observer),
            scheduler: self.scheduler.clone(),
        }
    }
}

impl<O: Send + 'static> Delivery<O> {
    fn deliver(&self, value: O) {
        if self.subscription.is_canceled() {
            return;
        }
        match &self.scheduler {
            Some(scheduler) => {
                let subscription = self.subscription.clone();
                let observer = Arc::clone(&self.observer);
                scheduler.run(with_param(
                    move |value: O| {
                        if !subscription.is_canceled() {
                            observer.on_data(value);
                        }
                    },
                    value,
                ));
            }
            None => self.observer.on_data(value),
        }
    }
}

/// Routing of transform failures.
#[derive(Clone)]
struct ErrorRoute {
    subscription: Subscription,
    on_error: Option<ErrorObserver>,
    scheduler: Option<Arc<dyn Schedule>>,
}

impl ErrorRoute {
    /// Returns the error back when nobody handles it.
    fn route(&self, err: TransformError) -> Result<(), TransformError> {
        let Some(on_error) = &self.on_error else {
            return Err(err);
        };
        if self.subscription.is_canceled() {
            return Ok(());
        }
        match &self.scheduler {
            Some(scheduler) => {
                let subscription = self.subscription.clone();
                let on_error = Arc::clone(on_error);
                scheduler.run(with_param(
                    move |err: TransformError| {
                        if !subscription.is_canceled() {
                            on_error(err);
                        }
                    },
                    err,
                ));
            }
            None => on_error(err),
        }
        Ok(())
    }
}

enum Route<T, O> {
    Cast(fn(T) -> O),
    Transform {
        transformer: Transformer<T, O>,
        pool: Arc<dyn Execute>,
        errors: ErrorRoute,
    },
}

/// Run-time sink executing the configured pipeline for each pushed value.
pub(crate) struct PipelineAdapter<T, O> {
    subscription: Subscription,
    route: Route<T, O>,
    delivery: Delivery<O>,
}

impl<T, O> PipelineAdapter<T, O> {
    pub(crate) fn new(
        subscription: Subscription,
        stage: Stage<T, O>,
        pool: Arc<dyn Execute>,
        on_error: Option<ErrorObserver>,
        scheduler: Option<Arc<dyn Schedule>>,
        observer: ObserverRef<O>,
    ) -> Self {
        let route = match stage {
            Stage::Passthrough { value, .. } => Route::Cast(value),
            Stage::Transform(transformer) => Route::Transform {
                transformer,
                pool,
                errors: ErrorRoute {
                    subscription: subscription.clone(),
                    on_error,
                    scheduler: scheduler.clone(),
                },
            },
        };
        Self {
            delivery: Delivery {
                subscription: subscription.clone(),
                observer,
                scheduler,
            },
            subscription,
            route,
        }
    }
}

impl<T, O> Observe<T> for PipelineAdapter<T, O>
where
    T: Send + 'static,
    O: Send + 'static,
{
    fn on_data(&self, raw: T) {
        match &self.route {
            Route::Cast(cast) => self.delivery.deliver(cast(raw)),
            Route::Transform {
                transformer,
                pool,
                errors,
            } => {
                let subscription = self.subscription.clone();
                let transformer = Arc::clone(transformer);
                let delivery = self.delivery.clone();
                let errors = errors.clone();

                let job = Job::new(move || {
                    if subscription.is_canceled() {
                        return Ok(());
                    }
                    match transform(&transformer, raw) {
                        Ok(value) => {
                            delivery.deliver(value);
                            Ok(())
                        }
                        Err(err) => errors.route(err),
                    }
                });
                pool.execute(job.for_subscription(self.subscription.id()));
            }
        }
    }

    fn name(&self) -> &str {
        self.subscription.observer_name()
    }
}

/// Runs the transformer, turning a panic into [`TransformError::Panicked`].
fn transform<T, O>(transformer: &Transformer<T, O>, raw: T) -> Result<O, TransformError> {
    panic::catch_unwind(AssertUnwindSafe(|| transformer(raw))).unwrap_or_else(|payload| {
        Err(TransformError::Panicked {
            info: panic_info(payload.as_ref()),
        })
    })
}
