//! Event: an immutable record of something the home controller did.
//!
//! Events are published on the in-process bus so the console (or a test)
//! can observe discoveries, fired rules and status snapshots without
//! touching the shared registry.

use crate::report::StatusReport;
use crate::time::{Timestamp, now};

/// A timestamped occurrence.
#[derive(Debug, Clone, PartialEq)]
pub struct Event {
    pub timestamp: Timestamp,
    pub kind: EventKind,
}

/// What happened.
#[derive(Debug, Clone, PartialEq)]
pub enum EventKind {
    /// Discovery replaced the registry with `count` devices.
    DevicesDiscovered { count: usize },
    /// A rule's trigger held and its actions were dispatched.
    RuleTriggered {
        rule: String,
        dispatched: usize,
        failed: usize,
    },
    /// End-of-cycle snapshot of the registry.
    StatusReported(StatusReport),
    MonitoringStarted,
    MonitoringStopped,
}

impl Event {
    /// Create an event stamped with the current time.
    #[must_use]
    pub fn new(kind: EventKind) -> Self {
        Self {
            timestamp: now(),
            kind,
        }
    }
}

impl std::fmt::Display for EventKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::DevicesDiscovered { count } => write!(f, "discovered {count} devices"),
            Self::RuleTriggered {
                rule,
                dispatched,
                failed,
            } => write!(
                f,
                "rule {rule} fired ({dispatched} dispatched, {failed} failed)"
            ),
            Self::StatusReported(_) => f.write_str("status report"),
            Self::MonitoringStarted => f.write_str("monitoring started"),
            Self::MonitoringStopped => f.write_str("monitoring stopped"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn should_stamp_event_with_current_time() {
        let before = now();
        let event = Event::new(EventKind::MonitoringStarted);
        assert!(event.timestamp >= before);
    }

    #[test]
    fn should_display_rule_triggered_summary() {
        let kind = EventKind::RuleTriggered {
            rule: "cooling_routine".to_string(),
            dispatched: 1,
            failed: 0,
        };
        assert_eq!(
            kind.to_string(),
            "rule cooling_routine fired (1 dispatched, 0 failed)"
        );
    }
}
