//! # Dispatcher: the single worker loop.
//!
//! Pulls one key at a time from the [`DedupQueue`], calls the
//! [`SyncHandler`] and applies the retry protocol.
//!
//! ```text
//! loop:
//!   get() ── None ──► publish WorkerStopped, exit
//!     │
//!   Some(key) ──► publish SyncStarting ──► handler.sync(key)
//!                                             │
//!                  ┌──────────────────────────┴──────────────┐
//!                Ok(())                               Err(e) / panic
//!                  │                                         │
//!            forget(key)                        add_rate_limited(key)
//!        publish SyncSucceeded          publish SyncFailed + RetryScheduled
//!                  └──────────────► done(key) ◄──────────────┘
//! ```
//!
//! ## Rules
//! - `done(key)` runs after every dispatch, whatever the outcome.
//! - Errors never leave the loop; a panicking handler is a failure like any other.

use std::panic::AssertUnwindSafe;
use std::sync::Arc;

use futures::FutureExt;

use crate::{
    error::SyncError,
    events::{Bus, Event, EventKind},
    handlers::SyncRef,
    queue::DedupQueue,
    subscribers::panic_message,
};

pub(crate) struct Dispatcher {
    pub(crate) queue: Arc<DedupQueue>,
    pub(crate) handler: SyncRef,
    pub(crate) bus: Bus,
    pub(crate) name: Arc<str>,
    pub(crate) resource: Arc<str>,
}

impl Dispatcher {
    /// Processes keys until the queue is shut down.
    pub(crate) async fn run(&self) {
        tracing::debug!(queue = %self.name, "worker started");
        while let Some(key) = self.queue.get().await {
            self.process(key).await;
        }
        tracing::debug!(queue = %self.name, "worker stopped");
        self.bus
            .publish(Event::new(EventKind::WorkerStopped, Arc::clone(&self.name)));
    }

    async fn process(&self, key: String) {
        self.bus.publish(
            Event::new(EventKind::SyncStarting, Arc::clone(&self.name))
                .with_key(key.as_str())
                .with_requeues(self.queue.num_requeues(&key)),
        );
        tracing::debug!(queue = %self.name, key = %key, "sync starting");

        let res = match AssertUnwindSafe(self.handler.sync(&key)).catch_unwind().await {
            Ok(res) => res,
            Err(panic) => Err(SyncError::Panicked {
                reason: panic_message(panic.as_ref()),
            }),
        };

        match res {
            Ok(()) => {
                self.queue.forget(&key);
                tracing::debug!(queue = %self.name, key = %key, "sync succeeded");
                self.bus.publish(
                    Event::new(EventKind::SyncSucceeded, Arc::clone(&self.name))
                        .with_key(key.as_str()),
                );
            }
            Err(err) => self.retry(&key, &err),
        }
        self.queue.done(&key);
    }

    fn retry(&self, key: &str, err: &SyncError) {
        let delay = self.queue.add_rate_limited(key);
        let requeues = self.queue.num_requeues(key);
        tracing::error!(
            queue = %self.name,
            resource = %self.resource,
            key = %key,
            error = %err,
            label = err.as_label(),
            delay_ms = delay.as_millis() as u64,
            requeues,
            "error syncing {}, requeuing",
            self.resource
        );

        let reason = err.to_string();
        self.bus.publish(
            Event::new(EventKind::SyncFailed, Arc::clone(&self.name))
                .with_key(key)
                .with_reason(reason.as_str()),
        );
        self.bus.publish(
            Event::new(EventKind::RetryScheduled, Arc::clone(&self.name))
                .with_key(key)
                .with_reason(reason)
                .with_delay(delay)
                .with_requeues(requeues),
        );
    }
}
