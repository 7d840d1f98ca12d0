//! # LogWriter — simple event printer
//!
//! A minimal bus listener that prints incoming [`Event`]s to stdout.
//! Use it for tests or demos.
//!
//! ## Example output
//! ```text
//! [transform-escalated] source=transform-pool subscription=3 err="transform failed: boom"
//! [job-panicked] source=transform-pool subscription=3 err="observer exploded"
//! [job-dropped] source=transform-pool subscription=4
//! [work-panicked] source=ui-thread err="bad delivery"
//! [work-rejected] source=ui-thread
//! ```

use tokio::sync::broadcast::error::RecvError;
use tokio::task::JoinHandle;

use crate::events::{Bus, Event};

/// Event writer listener.
#[derive(Default)]
pub struct LogWriter;

impl LogWriter {
    /// Construct a new [`LogWriter`].
    #[must_use]
    pub fn new() -> Self {
        Self
    }

    /// Renders one event as a log line.
    pub fn format(e: &Event) -> String {
        let mut line = format!("[{}]", e.kind.as_label());
        if let Some(source) = &e.source {
            line.push_str(&format!(" source={source}"));
        }
        if let Some(id) = e.subscription {
            line.push_str(&format!(" subscription={id}"));
        }
        if let Some(reason) = &e.reason {
            line.push_str(&format!(" err={reason:?}"));
        }
        line
    }

    /// Spawns a task printing every event published on `bus`.
    ///
    /// Must be called within a tokio runtime. The task ends when the bus is dropped.
    pub fn spawn(self, bus: &Bus) -> JoinHandle<()> {
        let mut rx = bus.subscribe();
        tokio::spawn(async move {
            loop {
                match rx.recv().await {
                    Ok(ev) => println!("{}", Self::format(&ev)),
                    Err(RecvError::Lagged(n)) => println!("[log-lagged] skipped={n}"),
                    Err(RecvError::Closed) => break,
                }
            }
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::events::EventKind;

    #[test]
    fn test_format_escalation() {
        let ev = Event::new(EventKind::TransformEscalated)
            .with_source("transform-pool")
            .with_subscription(3)
            .with_reason("transform failed: boom");
        assert_eq!(
            LogWriter::format(&ev),
            "[transform-escalated] source=transform-pool subscription=3 err=\"transform failed: boom\""
        );
    }

    #[test]
    fn test_format_minimal() {
        let ev = Event::new(EventKind::WorkRejected).with_source("ui");
        assert_eq!(LogWriter::format(&ev), "[work-rejected] source=ui");
    }

    #[tokio::test]
    async fn test_spawn_ends_when_bus_dropped() {
        let bus = Bus::new(4);
        let handle = LogWriter::new().spawn(&bus);
        bus.publish(Event::new(EventKind::JobDropped));
        drop(bus);
        handle.await.expect("writer finished");
    }
}
