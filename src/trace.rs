//! Structured trace events for validation diagnostics.
//!
//! The validator narrates its elimination rounds as events delivered to a
//! [`TraceSink`] instead of printing as it goes. Callers that want the
//! narration pass an [`EventLog`] (or their own sink); everyone else gets
//! [`NullSink`] and pays nothing.

use crate::graph::NodeId;

/// One step of the validation narrative.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TraceEvent {
    /// Predecessor-free nodes found at the start of an elimination round.
    Frontier { nodes: Vec<NodeId> },
    /// Nodes still standing after the frontier was stripped.
    Remaining { nodes: Vec<NodeId> },
    /// No frontier exists while nodes remain: the graph has a cycle.
    CycleDetected { blocked: Vec<NodeId> },
}

/// Receiver for trace events.
pub trait TraceSink {
    fn record(&mut self, event: TraceEvent);
}

/// Sink that drops every event.
#[derive(Debug, Default, Clone, Copy)]
pub struct NullSink;

impl TraceSink for NullSink {
    fn record(&mut self, _event: TraceEvent) {}
}

/// Sink that keeps every event, in order.
#[derive(Debug, Default, Clone)]
pub struct EventLog {
    events: Vec<TraceEvent>,
}

impl EventLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn events(&self) -> &[TraceEvent] {
        &self.events
    }
}

impl TraceSink for EventLog {
    fn record(&mut self, event: TraceEvent) {
        self.events.push(event);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_event_log_keeps_order() {
        let mut log = EventLog::new();
        log.record(TraceEvent::Frontier { nodes: vec![0] });
        log.record(TraceEvent::Remaining { nodes: vec![1, 2] });

        assert_eq!(
            log.events(),
            &[
                TraceEvent::Frontier { nodes: vec![0] },
                TraceEvent::Remaining { nodes: vec![1, 2] },
            ]
        );
    }
}
