//! # Cancelable subscription handle.
//!
//! A [`Subscription`] ties a publisher, a correlation parameter and the sink
//! registered for an observer together. Its only mutable state is the
//! cancellation flag, a [`CancellationToken`].
//!
//! ## State machine
//! ```text
//! Active ── cancel() ──► Canceled (terminal)
//! ```
//!
//! ## Rules
//! - `cancel()` is idempotent; the publisher is asked to unregister exactly once.
//! - Cancellation does not wait for in-flight work: at most a value already
//!   past its last checkpoint may still reach the observer.
//! - Dropping a handle does not cancel.

use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering as AtomicOrdering};
use std::sync::{Arc, Mutex, PoisonError};

use tokio_util::sync::CancellationToken;

use crate::observer::Param;

/// Global sequence counter for subscription ids.
static SUBSCRIPTION_SEQ: AtomicU64 = AtomicU64::new(1);

type Unregister = Box<dyn FnOnce() + Send + 'static>;

/// Cancelable handle for an observer's registration with a publisher.
///
/// Cheap to clone; all clones share one cancellation flag.
#[derive(Clone)]
pub struct Subscription {
    inner: Arc<Inner>,
}

struct Inner {
    id: u64,
    param: Param,
    observer: Arc<str>,
    token: CancellationToken,
    unregister: Mutex<Option<Unregister>>,
}

impl Subscription {
    pub(crate) fn new(param: Param, observer: impl Into<Arc<str>>) -> Self {
        Self {
            inner: Arc::new(Inner {
                id: SUBSCRIPTION_SEQ.fetch_add(1, AtomicOrdering::Relaxed),
                param,
                observer: observer.into(),
                token: CancellationToken::new(),
                unregister: Mutex::new(None),
            }),
        }
    }

    /// Stores the unregister action; runs it right away if already canceled.
    pub(crate) fn bind(&self, unregister: Unregister) {
        let mut slot = self
            .inner
            .unregister
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        if self.inner.token.is_cancelled() {
            drop(slot);
            unregister();
            return;
        }
        *slot = Some(unregister);
    }

    /// Marks the subscription canceled and asks the publisher to unregister.
    ///
    /// Idempotent; safe to call from any thread.
    pub fn cancel(&self) {
        self.inner.token.cancel();
        let unregister = self
            .inner
            .unregister
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take();
        if let Some(unregister) = unregister {
            unregister();
        }
    }

    /// True once [`cancel`](Self::cancel) was called on any clone.
    #[inline]
    pub fn is_canceled(&self) -> bool {
        self.inner.token.is_cancelled()
    }

    /// Completes when the subscription is canceled.
    pub async fn cancelled(&self) {
        self.inner.token.cancelled().await
    }

    /// Globally unique id (used in events).
    pub fn id(&self) -> u64 {
        self.inner.id
    }

    /// Correlation parameter the publisher was subscribed with.
    pub fn param(&self) -> &Param {
        &self.inner.param
    }

    /// Name of the observer this subscription delivers to.
    pub fn observer_name(&self) -> &str {
        &self.inner.observer
    }
}

impl fmt::Debug for Subscription {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Subscription")
            .field("id", &self.inner.id)
            .field("observer", &self.inner.observer)
            .field("param", &self.inner.param)
            .field("canceled", &self.is_canceled())
            .finish()
    }
}
