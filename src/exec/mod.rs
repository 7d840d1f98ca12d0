//! Execution contexts used by subscription pipelines.
//!
//! A pipeline touches up to three execution contexts:
//! ```text
//! publisher thread ──► worker pool (transform) ──► scheduler (delivery / error routing)
//! ```
//!
//! ## Contents
//! - [`Execute`], [`Job`] worker-pool contract; [`TokioPool`] tokio-backed pool
//!   whose harness observes every job's result
//! - [`Schedule`], [`Work`] scheduler contract; [`SerialScheduler`] single
//!   dedicated thread with FIFO delivery
//!
//! Neither context owns subscription state; both are shared by every
//! subscription routed to them.

mod pool;
mod scheduler;

pub use pool::{Execute, Job, TokioPool};
pub use scheduler::{Schedule, SerialScheduler, Work, with_param};
