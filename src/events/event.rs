//! # Events emitted by the execution contexts of a pipeline.
//!
//! The [`EventKind`] enum classifies faults observed away from the caller's
//! thread:
//! - **Worker pool**: escalated transform failures, panicking jobs, dropped jobs
//! - **Scheduler**: panicking units of work, work rejected after shutdown
//!
//! The [`Event`] struct carries additional metadata such as timestamps, the
//! execution context name, the subscription id and a reason.
//!
//! ## Ordering guarantees
//! Each event has a globally unique sequence number (`seq`) that increases monotonically.
//!
//! ## Example
//! ```rust
//! use datasub::{Event, EventKind};
//!
//! let ev = Event::new(EventKind::TransformEscalated)
//!     .with_source("transform-pool")
//!     .with_subscription(7)
//!     .with_reason("transform failed: boom");
//!
//! assert_eq!(ev.kind, EventKind::TransformEscalated);
//! assert_eq!(ev.subscription, Some(7));
//! ```

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering as AtomicOrdering};
use std::time::SystemTime;

/// Global sequence counter for event ordering.
static EVENT_SEQ: AtomicU64 = AtomicU64::new(0);

/// Classification of pipeline events.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventKind {
    // === Worker pool events ===
    /// A transform failed and no error observer was configured.
    ///
    /// Sets:
    /// - `source`: pool name
    /// - `subscription`: subscription id
    /// - `reason`: failure message
    TransformEscalated,

    /// A job panicked outside the transformer (e.g. the observer panicked on the worker thread).
    ///
    /// Sets:
    /// - `source`: pool name
    /// - `subscription`: subscription id, if known
    /// - `reason`: panic info
    JobPanicked,

    /// A job was dropped before running because the pool shut down.
    ///
    /// Sets:
    /// - `source`: pool name
    /// - `subscription`: subscription id, if known
    JobDropped,

    // === Scheduler events ===
    /// A unit of work panicked on the scheduler thread.
    ///
    /// Sets:
    /// - `source`: scheduler name
    /// - `reason`: panic info
    WorkPanicked,

    /// A unit of work was submitted after the scheduler shut down.
    ///
    /// Sets:
    /// - `source`: scheduler name
    WorkRejected,
}

impl EventKind {
    /// Returns a short stable label (kebab-case) used by log lines.
    pub fn as_label(&self) -> &'static str {
        match self {
            EventKind::TransformEscalated => "transform-escalated",
            EventKind::JobPanicked => "job-panicked",
            EventKind::JobDropped => "job-dropped",
            EventKind::WorkPanicked => "work-panicked",
            EventKind::WorkRejected => "work-rejected",
        }
    }
}

/// Pipeline event with optional metadata.
///
/// - `seq`: monotonic global sequence for ordering
/// - `at`: wall-clock timestamp (for logs)
/// - other optional fields are set depending on the [`EventKind`]
#[derive(Clone, Debug)]
pub struct Event {
    /// Globally unique, monotonically increasing sequence number.
    pub seq: u64,
    /// Wall-clock timestamp.
    pub at: SystemTime,
    /// Event classification.
    pub kind: EventKind,
    /// Name of the execution context that observed the event.
    pub source: Option<Arc<str>>,
    /// Id of the subscription the event belongs to, if applicable.
    pub subscription: Option<u64>,
    /// Human-readable reason (errors, panic info, etc.).
    pub reason: Option<Arc<str>>,
}

impl Event {
    /// Creates a new event of the given kind with current timestamp and next sequence number.
    pub fn new(kind: EventKind) -> Self {
        Self {
            seq: EVENT_SEQ.fetch_add(1, AtomicOrdering::Relaxed),
            at: SystemTime::now(),
            kind,
            source: None,
            subscription: None,
            reason: None,
        }
    }

    /// Attaches the execution context name.
    #[inline]
    pub fn with_source(mut self, source: impl Into<Arc<str>>) -> Self {
        self.source = Some(source.into());
        self
    }

    /// Attaches a subscription id.
    #[inline]
    pub fn with_subscription(mut self, id: u64) -> Self {
        self.subscription = Some(id);
        self
    }

    /// Attaches an optional subscription id.
    #[inline]
    pub fn with_subscription_opt(mut self, id: Option<u64>) -> Self {
        self.subscription = id;
        self
    }

    /// Attaches a human-readable reason.
    #[inline]
    pub fn with_reason(mut self, reason: impl Into<Arc<str>>) -> Self {
        self.reason = Some(reason.into());
        self
    }

    /// True for a transform failure nobody handled.
    #[inline]
    pub fn is_escalation(&self) -> bool {
        matches!(self.kind, EventKind::TransformEscalated)
    }

    /// True if a job or scheduled work panicked.
    #[inline]
    pub fn is_panic(&self) -> bool {
        matches!(self.kind, EventKind::JobPanicked | EventKind::WorkPanicked)
    }
}
