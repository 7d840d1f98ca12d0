//! # Observers, publishers and the correlation parameter.
//!
//! This module defines the sinks and sources a subscription connects:
//! - [`Observe`] final sink receiving delivered values
//! - [`ObserverFn`] closure-backed observer
//! - [`ErrorObserver`] sink for transform failures
//! - [`Publish`] the push-based data source contract
//! - [`Param`] opaque correlation parameter passed through to the publisher
//!
//! ## Example
//! ```rust
//! use datasub::{ObserverFn, ObserverRef, Observe};
//!
//! let printer: ObserverRef<u32> = ObserverFn::arc("printer", |v: u32| println!("got {v}"));
//! assert_eq!(printer.name(), "printer");
//! printer.on_data(1);
//! ```

use std::any::Any;
use std::borrow::Cow;
use std::fmt;
use std::sync::Arc;

use crate::error::TransformError;

/// Final sink receiving delivered values.
///
/// Called on the publisher's thread, on a worker-pool thread (after a
/// transform) or on the scheduler's thread, depending on the subscription's
/// configuration. Implementations must be `Send + Sync`.
pub trait Observe<T>: Send + Sync + 'static {
    /// Receives one delivered value.
    fn on_data(&self, data: T);

    /// Returns the observer name used in logs and events.
    ///
    /// The default uses `type_name::<Self>()`, which can be verbose - override it when possible.
    fn name(&self) -> &str {
        std::any::type_name::<Self>()
    }
}

/// Shared observer handle (`Arc<dyn Observe<T>>`).
pub type ObserverRef<T> = Arc<dyn Observe<T>>;

/// Sink invoked with a failure raised by a transformer.
pub type ErrorObserver = Arc<dyn Fn(TransformError) + Send + Sync + 'static>;

/// Returns true if both handles point at the same observer.
///
/// Publishers use this to find the sink to remove on unsubscribe.
#[inline]
pub fn same_observer<T>(a: &ObserverRef<T>, b: &ObserverRef<T>) -> bool {
    std::ptr::addr_eq(Arc::as_ptr(a), Arc::as_ptr(b))
}

/// Closure-backed observer.
#[derive(Debug)]
pub struct ObserverFn<F> {
    name: Cow<'static, str>,
    f: F,
}

impl<F> ObserverFn<F> {
    /// Creates a new closure-backed observer.
    ///
    /// Prefer [`ObserverFn::arc`] when you immediately need an [`ObserverRef`].
    pub fn new(name: impl Into<Cow<'static, str>>, f: F) -> Self {
        Self {
            name: name.into(),
            f,
        }
    }

    /// Creates the observer and returns it as a shared handle.
    pub fn arc(name: impl Into<Cow<'static, str>>, f: F) -> Arc<Self> {
        Arc::new(Self::new(name, f))
    }
}

impl<T, F> Observe<T> for ObserverFn<F>
where
    F: Fn(T) + Send + Sync + 'static,
{
    fn on_data(&self, data: T) {
        (self.f)(data)
    }

    fn name(&self) -> &str {
        &self.name
    }
}

/// Push-based data source.
///
/// The subscription layer registers exactly one sink per subscription and
/// unregisters that same sink (compare with [`same_observer`]) when the
/// subscription is canceled. Ordering, replay and multiplicity are up to the
/// publisher.
pub trait Publish<T>: Send + Sync + 'static {
    /// Registers a sink for the given parameter.
    fn subscribe(&self, observer: ObserverRef<T>, param: &Param);

    /// Unregisters a sink previously passed to [`subscribe`](Publish::subscribe).
    fn unsubscribe(&self, observer: &ObserverRef<T>, param: &Param);
}

/// Opaque correlation parameter handed to the publisher on (un)subscribe.
///
/// Cheap to clone; `Param::none()` when the publisher needs none.
#[derive(Clone, Default)]
pub struct Param(Option<Arc<dyn Any + Send + Sync>>);

impl Param {
    /// No parameter.
    pub fn none() -> Self {
        Self(None)
    }

    /// Wraps a parameter value.
    pub fn new<P: Any + Send + Sync>(value: P) -> Self {
        Self(Some(Arc::new(value)))
    }

    /// True if no parameter was given.
    pub fn is_none(&self) -> bool {
        self.0.is_none()
    }

    /// Returns the parameter if it is of type `P`.
    pub fn get<P: Any>(&self) -> Option<&P> {
        self.0.as_deref()?.downcast_ref::<P>()
    }
}

impl fmt::Debug for Param {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.0 {
            Some(_) => f.write_str("Param(..)"),
            None => f.write_str("Param(none)"),
        }
    }
}
