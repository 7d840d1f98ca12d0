//! # Policy for unhandled transform failures.
//!
//! A transform failure without an error observer is never absorbed silently.
//! The worker-pool harness always publishes `EventKind::TransformEscalated` and
//! writes the failure to stderr; [`UnhandledPolicy`] decides what happens next.
//!
//! - [`UnhandledPolicy::Report`] keep running after reporting (default).
//! - [`UnhandledPolicy::Abort`] abort the process after reporting.
//!
//! ```text
//! development / CI  → UnhandledPolicy::Abort   (misconfiguration fails fast)
//! production        → UnhandledPolicy::Report  (watch the bus)
//! ```

/// Policy applied by the worker-pool harness to escalated transform failures.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum UnhandledPolicy {
    /// Publish and print the failure, then keep running (default).
    #[default]
    Report,
    /// Publish and print the failure, then abort the process.
    Abort,
}

impl UnhandledPolicy {
    /// True if the process must be aborted after reporting.
    #[inline]
    pub fn is_fatal(&self) -> bool {
        matches!(self, UnhandledPolicy::Abort)
    }
}
