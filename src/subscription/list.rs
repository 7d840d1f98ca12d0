//! # Group of subscriptions canceled together.
//!
//! Typical owner: a screen or component that subscribes to several queries
//! and cancels all of them when it goes away.

use std::sync::{Mutex, PoisonError};

use super::handle::Subscription;

/// Collects subscriptions so they can be canceled at once.
///
/// After [`cancel`](Self::cancel) the list is empty and reports canceled
/// until a new subscription is added.
#[derive(Debug, Default)]
pub struct SubscriptionList {
    state: Mutex<ListState>,
}

#[derive(Debug, Default)]
struct ListState {
    subscriptions: Vec<Subscription>,
    canceled: bool,
}

impl SubscriptionList {
    /// Creates an empty list.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a subscription to the list.
    pub fn add(&self, subscription: Subscription) {
        let mut state = self.state.lock().unwrap_or_else(PoisonError::into_inner);
        state.subscriptions.push(subscription);
        state.canceled = false;
    }

    /// Cancels all subscriptions and clears the list.
    pub fn cancel(&self) {
        let subscriptions = {
            let mut state = self.state.lock().unwrap_or_else(PoisonError::into_inner);
            state.canceled = true;
            std::mem::take(&mut state.subscriptions)
        };
        for s in subscriptions {
            s.cancel();
        }
    }

    /// True after [`cancel`](Self::cancel) until the next [`add`](Self::add).
    pub fn is_canceled(&self) -> bool {
        self.state
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .canceled
    }

    /// Number of subscriptions in the list that are not canceled.
    pub fn active_count(&self) -> usize {
        self.state
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .subscriptions
            .iter()
            .filter(|s| !s.is_canceled())
            .count()
    }
}
