//! # Weakly referenced observer.
//!
//! [`WeakObserver`] is registered with the publisher in place of the user's
//! observer and holds only a [`Weak`] reference to it. Once the last strong
//! handle to the observer is dropped, deliveries are dropped silently.
//!
//! The wrapper never cancels its subscription: the publisher keeps the wrapper
//! registered until the subscription is canceled explicitly. Prefer explicit
//! cancellation; weak mode only keeps a forgotten observer from being kept
//! alive by the publisher.

use std::sync::{Arc, Weak};

use crate::observer::{Observe, ObserverRef};

use super::handle::Subscription;

/// Observer wrapper holding a non-owning reference to the real observer.
pub struct WeakObserver<O> {
    target: Weak<dyn Observe<O>>,
    subscription: Subscription,
    name: Arc<str>,
}

impl<O: 'static> WeakObserver<O> {
    pub(crate) fn new(target: &ObserverRef<O>, subscription: Subscription) -> Self {
        Self {
            target: Arc::downgrade(target),
            name: Arc::from(format!("weak({})", target.name())),
            subscription,
        }
    }

    /// True while the wrapped observer is still alive.
    pub fn is_alive(&self) -> bool {
        self.target.strong_count() > 0
    }
}

impl<O: 'static> Observe<O> for WeakObserver<O> {
    fn on_data(&self, data: O) {
        if self.subscription.is_canceled() {
            return;
        }
        if let Some(target) = self.target.upgrade() {
            target.on_data(data);
        }
    }

    fn name(&self) -> &str {
        &self.name
    }
}
