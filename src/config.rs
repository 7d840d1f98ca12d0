//! # Execution-context configuration.
//!
//! Provides [`PoolConfig`] for the transform worker pool and
//! [`SchedulerConfig`] for the dedicated delivery thread.
//!
//! ## Sentinel values
//! - `max_concurrent = 0` → unlimited (no semaphore created)
//! - `bus_capacity = 0` → clamped to 1
//! - `stack_size = 0` → platform default thread stack

use crate::policies::UnhandledPolicy;

/// Configuration for [`TokioPool`](crate::TokioPool).
///
/// ## Field semantics
/// - `max_concurrent`: Transform concurrency limit across all subscriptions (`0` = unlimited)
/// - `bus_capacity`: Event bus ring buffer size (min 1; clamped by Bus)
/// - `on_unhandled`: What to do with a transform failure nobody handles
#[derive(Clone, Debug)]
pub struct PoolConfig {
    /// Maximum number of transform jobs running at once.
    ///
    /// - `0` = unlimited (no semaphore)
    /// - `n > 0` = at most `n` jobs run simultaneously, the rest wait in order of submission
    pub max_concurrent: usize,

    /// Capacity of the event bus broadcast channel ring buffer.
    ///
    /// Slow listeners that lag behind more than `bus_capacity` events skip older items.
    pub bus_capacity: usize,

    /// Policy for transform failures without an error observer.
    pub on_unhandled: UnhandledPolicy,
}

impl PoolConfig {
    /// Returns the concurrency limit as an `Option`.
    ///
    /// - `None` → unlimited (no semaphore)
    /// - `Some(n)` → at most `n` concurrent jobs
    #[inline]
    pub fn concurrency_limit(&self) -> Option<usize> {
        if self.max_concurrent == 0 {
            None
        } else {
            Some(self.max_concurrent)
        }
    }

    /// Returns a bus capacity clamped to a minimum of 1.
    #[inline]
    pub fn bus_capacity_clamped(&self) -> usize {
        self.bus_capacity.max(1)
    }
}

impl Default for PoolConfig {
    /// Default configuration:
    ///
    /// - `max_concurrent = 0` (unlimited)
    /// - `bus_capacity = 1024`
    /// - `on_unhandled = UnhandledPolicy::Report`
    fn default() -> Self {
        Self {
            max_concurrent: 0,
            bus_capacity: 1024,
            on_unhandled: UnhandledPolicy::default(),
        }
    }
}

/// Configuration for [`SerialScheduler`](crate::SerialScheduler).
#[derive(Clone, Debug)]
pub struct SchedulerConfig {
    /// Name of the dedicated delivery thread (also used as event source).
    pub name: String,
    /// Thread stack size in bytes (`0` = platform default).
    pub stack_size: usize,
}

impl SchedulerConfig {
    /// Creates a config with the given thread name and default stack size.
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            stack_size: 0,
        }
    }

    /// Returns the stack size as an `Option` (`None` = platform default).
    #[inline]
    pub fn stack_size(&self) -> Option<usize> {
        if self.stack_size == 0 {
            None
        } else {
            Some(self.stack_size)
        }
    }
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        Self::named("datasub-scheduler")
    }
}
