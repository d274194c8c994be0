//! # Event bus for broadcasting coordinator lifecycle events.
//!
//! [`Bus`] is a thin wrapper around [`tokio::sync::broadcast`] that provides
//! non-blocking event publishing from every protocol step (registration,
//! subscription, wiring, teardown).
//!
//! ## Rules
//! - **Non-blocking publish**: `publish()` never blocks; it calls
//!   `broadcast::Sender::send`.
//! - **Bounded capacity**: a single ring buffer stores recent events for all
//!   receivers; capacity comes from
//!   [`CoordinatorConfig::bus_capacity`](crate::CoordinatorConfig).
//! - **Lag handling**: slow receivers get `RecvError::Lagged(n)` and skip
//!   the `n` oldest items.
//! - **No persistence**: events are lost if there are no active receivers at
//!   send time.

use tokio::sync::broadcast;

use super::event::Event;

/// Broadcast channel for coordinator lifecycle events.
///
/// Multiple publishers can publish concurrently; receivers get clones of
/// each event. Cheap to clone (internally holds an `Arc`-backed sender).
#[derive(Clone, Debug)]
pub struct Bus {
    tx: broadcast::Sender<Event>,
}

impl Bus {
    /// Creates a new bus with the given channel capacity (clamped to 1).
    pub fn new(capacity: usize) -> Self {
        let (tx, _rx) = broadcast::channel::<Event>(capacity.max(1));
        Self { tx }
    }

    /// Publishes an event to all active receivers.
    ///
    /// If there are no receivers, the event is dropped; this function still
    /// returns immediately.
    pub fn publish(&self, ev: Event) {
        let _ = self.tx.send(ev);
    }

    /// Creates a new receiver that observes subsequent events.
    ///
    /// A receiver only gets events sent **after** it subscribes; slow
    /// receivers observe `RecvError::Lagged(n)` and skip missed items.
    pub fn subscribe(&self) -> broadcast::Receiver<Event> {
        self.tx.subscribe()
    }
}

#[cfg(test)]
mod tests {
    use crate::events::EventKind;

    use super::*;

    #[tokio::test]
    async fn test_receiver_sees_later_events_only() {
        let bus = Bus::new(8);
        bus.publish(Event::new(EventKind::SourceRegistered).with_source("lost|memory"));

        let mut rx = bus.subscribe();
        bus.publish(Event::new(EventKind::SourceRegistered).with_source("seen|memory"));

        let ev = rx.recv().await.expect("event");
        assert_eq!(ev.source.as_deref(), Some("seen|memory"));
    }

    #[tokio::test]
    async fn test_publish_without_receivers_is_noop() {
        let bus = Bus::new(1);
        bus.publish(Event::new(EventKind::CoordinatorClosed));
    }
}
