//! # Event bus for queue events.
//!
//! [`Bus`] is a thin wrapper around [`tokio::sync::broadcast`]. The façade
//! and the dispatcher publish; a single listener forwards to the
//! [`SubscriberSet`](crate::SubscriberSet).
//!
//! ```text
//! TaskQueue::enqueue ──┐
//! Dispatcher ──────────┼──► Bus ───► listener ───► SubscriberSet
//! TaskQueue::shutdown ─┘ (broadcast)
//! ```
//!
//! ## Rules
//! - **Non-blocking publish**: `publish()` never waits, even with no receivers.
//! - **Bounded capacity**: slow receivers get `RecvError::Lagged(n)` and skip `n` events.
//! - **No persistence**: events published with no receiver are lost.

use tokio::sync::broadcast;

use super::event::Event;

/// Broadcast channel for queue events.
#[derive(Clone, Debug)]
pub struct Bus {
    tx: broadcast::Sender<Event>,
}

impl Bus {
    /// Creates a bus with the given ring buffer capacity (minimum 1).
    pub fn new(capacity: usize) -> Self {
        let (tx, _rx) = broadcast::channel::<Event>(capacity.max(1));
        Self { tx }
    }

    /// Publishes an event to all current receivers.
    pub fn publish(&self, ev: Event) {
        let _ = self.tx.send(ev);
    }

    /// Creates a receiver for events published from now on.
    pub fn subscribe(&self) -> broadcast::Receiver<Event> {
        self.tx.subscribe()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::events::EventKind;

    #[tokio::test]
    async fn delivers_to_active_receivers_only() {
        let bus = Bus::new(4);
        bus.publish(Event::new(EventKind::KeyEnqueued, "q"));

        let mut rx = bus.subscribe();
        bus.publish(Event::new(EventKind::WorkerStopped, "q"));
        let ev = rx.recv().await.unwrap();
        assert_eq!(ev.kind, EventKind::WorkerStopped);
    }

    #[test]
    fn zero_capacity_is_clamped() {
        let bus = Bus::new(0);
        bus.publish(Event::new(EventKind::KeyEnqueued, "q"));
    }
}
