//! # Non-blocking event fan-out to multiple subscribers.
//!
//! ```text
//! emit(event)
//!     │
//!     ├──► [queue 1] ──► worker 1 ──► subscriber1.on_event()
//!     │    (bounded)         └──────► panic → SubscriberPanicked
//!     └──► [queue N] ──► worker N ──► subscriberN.on_event()
//! ```
//!
//! ## Rules
//! - **Non-blocking**: `emit()` uses `try_send` and returns immediately.
//! - **Overflow**: the event is dropped for that subscriber only and
//!   `SubscriberOverflow` is published (never for an overflow event itself).
//! - **Isolation**: a slow or panicking subscriber does not affect the others.
//! - **Per-subscriber FIFO**, no ordering across subscribers.

use std::sync::Arc;

use futures::FutureExt;
use tokio::{sync::mpsc, task::JoinHandle};

use crate::events::{Bus, Event, EventKind};
use crate::subscribers::Subscribe;

struct SubscriberChannel {
    name: &'static str,
    sender: mpsc::Sender<Arc<Event>>,
}

/// Fan-out coordinator for queue event subscribers.
pub struct SubscriberSet {
    queue: Arc<str>,
    channels: Vec<SubscriberChannel>,
    workers: Vec<JoinHandle<()>>,
    bus: Bus,
}

impl SubscriberSet {
    /// Creates the set and spawns one worker per subscriber.
    ///
    /// Must be called inside a tokio runtime.
    #[must_use]
    pub fn new(subs: Vec<Arc<dyn Subscribe>>, bus: Bus, queue: impl Into<Arc<str>>) -> Self {
        let queue = queue.into();
        let mut channels = Vec::with_capacity(subs.len());
        let mut workers = Vec::with_capacity(subs.len());

        for sub in subs {
            let name = sub.name();
            let (tx, mut rx) = mpsc::channel::<Arc<Event>>(sub.queue_capacity().max(1));
            let bus = bus.clone();
            let queue = Arc::clone(&queue);

            workers.push(tokio::spawn(async move {
                while let Some(ev) = rx.recv().await {
                    let fut = sub.on_event(ev.as_ref());
                    if let Err(panic) = std::panic::AssertUnwindSafe(fut).catch_unwind().await {
                        let info = panic_message(panic.as_ref());
                        tracing::warn!(queue = %queue, subscriber = name, info = %info, "subscriber panicked");
                        bus.publish(Event::subscriber_panicked(Arc::clone(&queue), name, info));
                    }
                }
            }));
            channels.push(SubscriberChannel { name, sender: tx });
        }

        Self {
            queue,
            channels,
            workers,
            bus,
        }
    }

    /// Emits an event to all subscribers (non-blocking).
    pub fn emit(&self, event: &Event) {
        let event = Arc::new(event.clone());
        let is_overflow = matches!(event.kind, EventKind::SubscriberOverflow);

        for channel in &self.channels {
            let reason = match channel.sender.try_send(Arc::clone(&event)) {
                Ok(()) => continue,
                Err(mpsc::error::TrySendError::Full(_)) => "full",
                Err(mpsc::error::TrySendError::Closed(_)) => "closed",
            };
            tracing::warn!(queue = %self.queue, subscriber = channel.name, reason, "subscriber dropped event");
            if !is_overflow {
                self.bus.publish(Event::subscriber_overflow(
                    Arc::clone(&self.queue),
                    channel.name,
                    reason,
                ));
            }
        }
    }

    /// Closes all subscriber queues and waits for the workers to drain them.
    pub async fn shutdown(self) {
        drop(self.channels);
        for h in self.workers {
            let _ = h.await;
        }
    }

    /// True if there are no subscribers.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.channels.is_empty()
    }

    /// Number of subscribers.
    #[must_use]
    pub fn len(&self) -> usize {
        self.channels.len()
    }
}

pub(crate) fn panic_message(panic: &(dyn std::any::Any + Send)) -> String {
    if let Some(msg) = panic.downcast_ref::<&'static str>() {
        (*msg).to_string()
    } else if let Some(msg) = panic.downcast_ref::<String>() {
        msg.clone()
    } else {
        "unknown panic".to_string()
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use async_trait::async_trait;

    use super::*;

    #[derive(Default)]
    struct Recorder {
        seen: Mutex<Vec<EventKind>>,
    }

    #[async_trait]
    impl Subscribe for Recorder {
        async fn on_event(&self, ev: &Event) {
            self.seen.lock().unwrap().push(ev.kind);
        }

        fn name(&self) -> &'static str {
            "recorder"
        }
    }

    struct Exploder;

    #[async_trait]
    impl Subscribe for Exploder {
        async fn on_event(&self, _ev: &Event) {
            panic!("boom");
        }

        fn name(&self) -> &'static str {
            "exploder"
        }
    }

    #[tokio::test]
    async fn fans_out_in_order_and_drains_on_shutdown() {
        let rec = Arc::new(Recorder::default());
        let set = SubscriberSet::new(vec![rec.clone() as Arc<dyn Subscribe>], Bus::new(8), "q");
        assert_eq!(set.len(), 1);

        set.emit(&Event::new(EventKind::KeyEnqueued, "q"));
        set.emit(&Event::new(EventKind::SyncStarting, "q"));
        set.shutdown().await;

        assert_eq!(
            *rec.seen.lock().unwrap(),
            vec![EventKind::KeyEnqueued, EventKind::SyncStarting]
        );
    }

    #[tokio::test]
    async fn panics_are_reported_on_the_bus() {
        let bus = Bus::new(8);
        let mut rx = bus.subscribe();
        let set = SubscriberSet::new(vec![Arc::new(Exploder) as Arc<dyn Subscribe>], bus, "q");

        set.emit(&Event::new(EventKind::KeyEnqueued, "q"));
        set.shutdown().await;

        let ev = rx.recv().await.unwrap();
        assert_eq!(ev.kind, EventKind::SubscriberPanicked);
        assert_eq!(ev.reason.as_deref(), Some("subscriber=exploder info=boom"));
    }

    #[test]
    fn panic_message_handles_payload_types() {
        assert_eq!(panic_message(&"static"), "static");
        assert_eq!(panic_message(&String::from("owned")), "owned");
        assert_eq!(panic_message(&42u8), "unknown panic");
    }
}
