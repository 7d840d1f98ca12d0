//! Escalation policies.
//!
//! ## Contents
//! - [`UnhandledPolicy`] what the worker-pool harness does with a transform
//!   failure that has no error observer to go to.
//!
//! ## Quick wiring
//! ```text
//! PoolConfig { on_unhandled: UnhandledPolicy, .. }
//!      └─► exec::pool::TokioPool supervises every job:
//!           - Err(TransformError) ─► publish TransformEscalated ─► apply policy
//! ```

mod unhandled;

pub use unhandled::UnhandledPolicy;
