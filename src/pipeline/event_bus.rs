// src/pipeline/event_bus.rs
//
// Bounded alert queue between the alert engine and the playback side.
// The session loop drains it once per tick; overflow drops the oldest.

use std::collections::VecDeque;

use tracing::warn;

use crate::types::AlertEvent;

pub struct AlertBus {
    events: VecDeque<AlertEvent>,
    max_pending: usize,
}

impl AlertBus {
    pub fn new(max_pending: usize) -> Self {
        Self {
            events: VecDeque::with_capacity(max_pending),
            max_pending,
        }
    }

    pub fn publish(&mut self, event: AlertEvent) {
        if self.events.len() >= self.max_pending {
            warn!(
                "Alert bus full ({} pending), dropping oldest",
                self.max_pending
            );
            self.events.pop_front();
        }
        self.events.push_back(event);
    }

    pub fn drain(&mut self) -> Vec<AlertEvent> {
        self.events.drain(..).collect()
    }

    pub fn pending_count(&self) -> usize {
        self.events.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::AlertSeverity;

    fn alert(text: &str) -> AlertEvent {
        AlertEvent {
            text: text.to_string(),
            severity: AlertSeverity::Path,
            class: "person".to_string(),
            distance_m: 3.0,
        }
    }

    #[test]
    fn test_publish_and_drain() {
        let mut bus = AlertBus::new(4);
        bus.publish(alert("one"));
        bus.publish(alert("two"));
        assert_eq!(bus.pending_count(), 2);

        let drained = bus.drain();
        assert_eq!(drained.len(), 2);
        assert_eq!(drained[0].text, "one");
        assert_eq!(bus.pending_count(), 0);
    }

    #[test]
    fn test_overflow_drops_oldest() {
        let mut bus = AlertBus::new(2);
        bus.publish(alert("one"));
        bus.publish(alert("two"));
        bus.publish(alert("three"));

        let drained = bus.drain();
        assert_eq!(drained.len(), 2);
        assert_eq!(drained[0].text, "two");
        assert_eq!(drained[1].text, "three");
    }
}
