//! Fan-out of home events to local listeners.
//!
//! The engine and the monitor publish rule firings, status reports,
//! discovery counts and monitoring start/stop here. The console printer in
//! `simhomed` and the tests are the usual subscribers.

use std::future::Future;

use tokio::sync::broadcast;

use simhome_domain::error::SimHomeError;
use simhome_domain::event::Event;

use crate::ports::EventPublisher;

/// [`EventPublisher`] over a tokio [`broadcast`] channel.
///
/// A subscriber that falls more than `capacity` events behind sees
/// `RecvError::Lagged` and skips the oldest ones. Events published while
/// nobody listens are lost.
pub struct InProcessEventBus {
    sender: broadcast::Sender<Event>,
}

impl InProcessEventBus {
    /// `capacity` bounds how many events a slow subscriber may trail by.
    #[must_use]
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity);
        Self { sender }
    }

    /// Receiver for events published from now on.
    #[must_use]
    pub fn subscribe(&self) -> broadcast::Receiver<Event> {
        self.sender.subscribe()
    }
}

impl EventPublisher for InProcessEventBus {
    fn publish(&self, event: Event) -> impl Future<Output = Result<(), SimHomeError>> + Send {
        // Err only means nobody is subscribed
        let _ = self.sender.send(event);
        async { Ok(()) }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use simhome_domain::event::EventKind;

    #[tokio::test]
    async fn should_deliver_event_to_subscriber() {
        let bus = InProcessEventBus::new(16);
        let mut rx = bus.subscribe();

        bus.publish(Event::new(EventKind::DevicesDiscovered { count: 3 }))
            .await
            .unwrap();

        let received = rx.recv().await.unwrap();
        assert_eq!(received.kind, EventKind::DevicesDiscovered { count: 3 });
    }

    #[tokio::test]
    async fn should_deliver_event_to_multiple_subscribers() {
        let bus = InProcessEventBus::new(16);
        let mut rx1 = bus.subscribe();
        let mut rx2 = bus.subscribe();

        bus.publish(Event::new(EventKind::MonitoringStarted))
            .await
            .unwrap();

        assert_eq!(rx1.recv().await.unwrap().kind, EventKind::MonitoringStarted);
        assert_eq!(rx2.recv().await.unwrap().kind, EventKind::MonitoringStarted);
    }

    #[tokio::test]
    async fn should_succeed_when_no_subscribers() {
        let bus = InProcessEventBus::new(16);
        let result = bus.publish(Event::new(EventKind::MonitoringStopped)).await;
        assert!(result.is_ok());
    }

    #[tokio::test]
    async fn should_not_deliver_events_published_before_subscription() {
        let bus = InProcessEventBus::new(16);
        bus.publish(Event::new(EventKind::MonitoringStarted))
            .await
            .unwrap();

        let mut rx = bus.subscribe();
        bus.publish(Event::new(EventKind::MonitoringStopped))
            .await
            .unwrap();

        assert_eq!(rx.recv().await.unwrap().kind, EventKind::MonitoringStopped);
    }

    #[tokio::test]
    async fn should_report_lag_when_subscriber_falls_behind_capacity() {
        let bus = InProcessEventBus::new(2);
        let mut rx = bus.subscribe();
        for count in 1..=3 {
            bus.publish(Event::new(EventKind::DevicesDiscovered { count }))
                .await
                .unwrap();
        }

        assert!(matches!(
            rx.recv().await,
            Err(broadcast::error::RecvError::Lagged(1))
        ));
        assert_eq!(
            rx.recv().await.unwrap().kind,
            EventKind::DevicesDiscovered { count: 2 }
        );
    }

    #[tokio::test]
    async fn should_publish_through_arc() {
        let bus = std::sync::Arc::new(InProcessEventBus::new(4));
        let mut rx = bus.subscribe();
        bus.publish(Event::new(EventKind::MonitoringStarted))
            .await
            .unwrap();
        assert_eq!(rx.recv().await.unwrap().kind, EventKind::MonitoringStarted);
    }
}
