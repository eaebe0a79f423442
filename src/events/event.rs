//! # Queue events emitted by the façade and the dispatcher.
//!
//! The [`EventKind`] enum classifies events across three categories:
//! - **Intake**: a key was enqueued, or an object was dropped for lack of a key
//! - **Processing**: sync starting / succeeded / failed, retry scheduled
//! - **Lifecycle**: shutdown requested, worker stopped, subscriber trouble
//!
//! ## Ordering guarantees
//! Each event has a globally unique, monotonically increasing `seq`.
//! Use it to restore order when subscribers observe events out of order.
//!
//! ## Example
//! ```rust
//! use std::time::Duration;
//! use taskqueue::{Event, EventKind};
//!
//! let ev = Event::new(EventKind::RetryScheduled, "services")
//!     .with_key("ns/foo")
//!     .with_reason("connection refused")
//!     .with_requeues(3)
//!     .with_delay(Duration::from_millis(40));
//!
//! assert_eq!(ev.kind, EventKind::RetryScheduled);
//! assert_eq!(ev.key.as_deref(), Some("ns/foo"));
//! assert_eq!(ev.delay_ms, Some(40));
//! ```

use std::sync::atomic::{AtomicU64, Ordering as AtomicOrdering};
use std::sync::Arc;
use std::time::{Duration, SystemTime};

/// Global sequence counter for event ordering.
static EVENT_SEQ: AtomicU64 = AtomicU64::new(0);

/// Classification of queue events.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventKind {
    // === Intake ===
    /// A key was handed to the queue by `enqueue`.
    ///
    /// Sets: `key`.
    KeyEnqueued,

    /// An object was dropped because no key could be derived from it.
    ///
    /// Sets: `reason` (key error).
    KeyDropped,

    // === Processing ===
    /// The dispatcher is about to call the sync handler.
    ///
    /// Sets: `key`, `requeues` (failures so far).
    SyncStarting,

    /// The sync handler succeeded; the key's backoff was reset.
    ///
    /// Sets: `key`.
    SyncSucceeded,

    /// The sync handler failed (or panicked).
    ///
    /// Sets: `key`, `reason`.
    SyncFailed,

    /// A failed key was put back behind the rate limiter.
    ///
    /// Sets: `key`, `delay_ms`, `requeues` (failures including this one), `reason`.
    RetryScheduled,

    // === Lifecycle ===
    /// `shutdown` was called; no further keys will be dispatched.
    ShutdownRequested,

    /// The worker observed the closed queue and exited.
    WorkerStopped,

    /// A subscriber dropped an event (queue full or worker closed).
    ///
    /// Sets: `reason` (`subscriber=<name> reason=<full|closed>`).
    SubscriberOverflow,

    /// A subscriber panicked while handling an event.
    ///
    /// Sets: `reason` (panic info).
    SubscriberPanicked,
}

/// Queue event with optional metadata.
#[derive(Clone, Debug)]
pub struct Event {
    /// Globally unique, monotonically increasing sequence number.
    pub seq: u64,
    /// Wall-clock timestamp.
    pub at: SystemTime,
    /// Event classification.
    pub kind: EventKind,
    /// Name of the queue that emitted the event.
    pub queue: Arc<str>,
    /// Key concerned, if any.
    pub key: Option<Arc<str>>,
    /// Human-readable reason (errors, overflow details, etc.).
    pub reason: Option<Arc<str>>,
    /// Retry delay in milliseconds (compact).
    pub delay_ms: Option<u32>,
    /// Failures recorded for the key.
    pub requeues: Option<u32>,
}

impl Event {
    /// Creates an event of `kind` for `queue` with the current timestamp and next sequence number.
    pub fn new(kind: EventKind, queue: impl Into<Arc<str>>) -> Self {
        Self {
            seq: EVENT_SEQ.fetch_add(1, AtomicOrdering::Relaxed),
            at: SystemTime::now(),
            kind,
            queue: queue.into(),
            key: None,
            reason: None,
            delay_ms: None,
            requeues: None,
        }
    }

    /// Attaches a key.
    #[inline]
    pub fn with_key(mut self, key: impl Into<Arc<str>>) -> Self {
        self.key = Some(key.into());
        self
    }

    /// Attaches a human-readable reason.
    #[inline]
    pub fn with_reason(mut self, reason: impl Into<Arc<str>>) -> Self {
        self.reason = Some(reason.into());
        self
    }

    /// Attaches a retry delay (stored as milliseconds, saturating).
    #[inline]
    pub fn with_delay(mut self, d: Duration) -> Self {
        self.delay_ms = Some(d.as_millis().min(u128::from(u32::MAX)) as u32);
        self
    }

    /// Attaches a failure count.
    #[inline]
    pub fn with_requeues(mut self, n: u32) -> Self {
        self.requeues = Some(n);
        self
    }

    /// Creates a subscriber overflow event.
    #[inline]
    pub fn subscriber_overflow(
        queue: impl Into<Arc<str>>,
        subscriber: &'static str,
        reason: &'static str,
    ) -> Self {
        Event::new(EventKind::SubscriberOverflow, queue)
            .with_reason(format!("subscriber={subscriber} reason={reason}"))
    }

    /// Creates a subscriber panic event.
    #[inline]
    pub fn subscriber_panicked(
        queue: impl Into<Arc<str>>,
        subscriber: &'static str,
        info: String,
    ) -> Self {
        Event::new(EventKind::SubscriberPanicked, queue)
            .with_reason(format!("subscriber={subscriber} info={info}"))
    }
}
