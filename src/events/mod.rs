//! Pipeline events: types and broadcast bus.
//!
//! This module groups the event **data model** and the **bus** used as the
//! supervisory channel of the execution contexts. Everything that goes wrong
//! away from the caller's thread (escalated transform failures, panicking jobs,
//! rejected deliveries) ends up here instead of disappearing.
//!
//! ## Contents
//! - [`EventKind`], [`Event`] event classification and payload metadata
//! - [`Bus`] thin wrapper over `tokio::sync::broadcast`
//!
//! ## Quick reference
//! - **Publishers**: `TokioPool` job supervisors, `SerialScheduler` thread.
//! - **Consumers**: user listeners via [`Bus::subscribe`], `LogWriter`
//!   (feature `logging`).

mod bus;
mod event;

pub use bus::Bus;
pub use event::{Event, EventKind};
