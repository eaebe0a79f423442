//! # TaskQueue: run / enqueue / shutdown façade.
//!
//! A queue is built as a pair:
//! - [`TaskQueue<T>`]: cheap to clone; producers call [`enqueue`](TaskQueue::enqueue),
//!   the host calls [`shutdown`](TaskQueue::shutdown).
//! - [`Worker`]: the one and only consumer; [`run`](Worker::run) consumes it.
//!
//! ```text
//! producers ── enqueue(objs) ── key_fn ──► DedupQueue ──► Worker::run ──► SyncHandler
//!                  │ (error)                    ▲                │
//!                  └─► warn + KeyDropped        └── retry/forget ┘
//!
//! shutdown(): shut_down queue ─► ShutdownRequested ─► wait until the worker is done
//! ```
//!
//! ## Rules
//! - `enqueue` never blocks and never fails; bad objects are logged and skipped.
//! - `shutdown` returns only after the in-flight sync (if any) has finished
//!   and subscribers have drained, from every caller.
//! - The worker signals completion when `run` returns, panics, or the
//!   `Worker` is dropped without running, so `shutdown` never hangs on it.

use std::sync::Arc;

use tokio_util::sync::{CancellationToken, DropGuard};

use super::builder::TaskQueueBuilder;
use super::config::QueueConfig;
use super::dispatcher::Dispatcher;
use crate::{
    events::{Bus, Event, EventKind},
    handlers::SyncRef,
    keys::{meta_key_fn, KeyFn, ObjectMeta},
    queue::DedupQueue,
};

pub(crate) struct Shared {
    pub(crate) name: Arc<str>,
    pub(crate) resource: Arc<str>,
    pub(crate) queue: Arc<DedupQueue>,
    pub(crate) bus: Bus,
    /// Fires when the worker is gone.
    pub(crate) done: CancellationToken,
    /// Fires when subscribers have seen every event.
    pub(crate) drained: CancellationToken,
}

/// Producer and lifecycle handle of a queue.
pub struct TaskQueue<T> {
    shared: Arc<Shared>,
    key_fn: KeyFn<T>,
}

impl<T> Clone for TaskQueue<T> {
    fn clone(&self) -> Self {
        Self {
            shared: Arc::clone(&self.shared),
            key_fn: Arc::clone(&self.key_fn),
        }
    }
}

impl<T: ObjectMeta + 'static> TaskQueue<T> {
    /// Starts a builder keyed by `namespace/name` (see [`meta_namespace_key`](crate::meta_namespace_key)).
    ///
    /// Use [`TaskQueueBuilder::new`] to supply a custom key function instead.
    pub fn builder(cfg: QueueConfig, handler: SyncRef) -> TaskQueueBuilder<T> {
        TaskQueueBuilder::new(cfg, handler, meta_key_fn::<T>())
    }
}

impl<T> TaskQueue<T> {
    pub(crate) fn from_parts(shared: Arc<Shared>, key_fn: KeyFn<T>) -> Self {
        Self { shared, key_fn }
    }

    /// Derives a key for each object and adds it to the queue.
    ///
    /// Objects whose key cannot be derived are logged, reported as
    /// [`EventKind::KeyDropped`] and skipped; the rest are still enqueued.
    pub fn enqueue<'a, I>(&self, objs: I)
    where
        I: IntoIterator<Item = &'a T>,
        T: 'a,
    {
        for obj in objs {
            match (self.key_fn)(obj) {
                Ok(key) => self.enqueue_key(key),
                Err(err) => {
                    tracing::warn!(
                        queue = %self.shared.name,
                        error = %err,
                        label = err.as_label(),
                        "couldn't get key for object"
                    );
                    self.shared.bus.publish(
                        Event::new(EventKind::KeyDropped, Arc::clone(&self.shared.name))
                            .with_reason(err.to_string()),
                    );
                }
            }
        }
    }

    /// Adds an already-derived key, bypassing the key function.
    pub fn enqueue_key(&self, key: impl Into<String>) {
        let key = key.into();
        if self.shared.queue.is_shutting_down() {
            tracing::debug!(queue = %self.shared.name, key = %key, "queue shut down, ignoring key");
            return;
        }
        tracing::debug!(queue = %self.shared.name, key = %key, "enqueue");
        self.shared.bus.publish(
            Event::new(EventKind::KeyEnqueued, Arc::clone(&self.shared.name)).with_key(key.as_str()),
        );
        self.shared.queue.add(key);
    }

    /// Stops dispatching and waits for the worker to finish.
    ///
    /// Pending keys are discarded; a sync already in progress runs to
    /// completion first. Once the worker is done, attached subscribers are
    /// drained before this returns. Safe to call more than once and from
    /// several clones.
    pub async fn shutdown(&self) {
        if !self.shared.queue.is_shutting_down() {
            tracing::info!(queue = %self.shared.name, "shutting down");
            self.shared.queue.shut_down();
            self.shared.bus.publish(Event::new(
                EventKind::ShutdownRequested,
                Arc::clone(&self.shared.name),
            ));
        }
        self.shared.done.cancelled().await;
        self.shared.drained.cancelled().await;
        tracing::info!(queue = %self.shared.name, "shut down");
    }

    /// Queue name.
    pub fn name(&self) -> &str {
        &self.shared.name
    }

    /// Resource label.
    pub fn resource(&self) -> &str {
        &self.shared.resource
    }

    /// Underlying queue, for diagnostics and direct `add_after` scheduling.
    pub fn queue(&self) -> &DedupQueue {
        &self.shared.queue
    }

    /// True once [`shutdown`](TaskQueue::shutdown) has been called.
    pub fn is_shutting_down(&self) -> bool {
        self.shared.queue.is_shutting_down()
    }

    /// True once the worker has exited (or was dropped without running).
    pub fn is_done(&self) -> bool {
        self.shared.done.is_cancelled()
    }
}

/// The single consumer of a queue.
///
/// Returned once by [`TaskQueueBuilder::build`]; [`run`](Worker::run)
/// takes it by value, so a queue can never have two workers.
#[must_use = "a queue does nothing until its worker runs"]
pub struct Worker {
    dispatcher: Dispatcher,
    // Fires the completion signal when dropped.
    _done: DropGuard,
}

impl Worker {
    pub(crate) fn new(dispatcher: Dispatcher, done: CancellationToken) -> Self {
        Self {
            dispatcher,
            _done: done.drop_guard(),
        }
    }

    /// Processes keys until the queue is shut down.
    ///
    /// Typically spawned: `tokio::spawn(worker.run())`.
    pub async fn run(self) {
        self.dispatcher.run().await;
    }
}

impl std::fmt::Debug for Worker {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Worker")
            .field("queue", &self.dispatcher.name)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::SyncError;
    use crate::handlers::SyncFn;

    struct Pod {
        name: &'static str,
    }

    impl ObjectMeta for Pod {
        fn name(&self) -> &str {
            self.name
        }

        fn namespace(&self) -> Option<&str> {
            Some("default")
        }
    }

    fn noop() -> SyncRef {
        SyncFn::arc(|_key: String| async { Ok::<(), SyncError>(()) })
    }

    #[tokio::test]
    async fn enqueue_skips_objects_without_key() {
        let (tq, _worker) = TaskQueue::<Pod>::builder(QueueConfig::new("pods", "pod"), noop()).build();

        tq.enqueue(&[Pod { name: "" }, Pod { name: "a" }, Pod { name: "a" }]);
        assert_eq!(tq.queue().len(), 1);
        assert!(tq.queue().is_pending("default/a"));
    }

    #[tokio::test]
    async fn dropping_the_worker_unblocks_shutdown() {
        let (tq, worker) = TaskQueue::<Pod>::builder(QueueConfig::new("pods", "pod"), noop()).build();
        drop(worker);
        assert!(tq.is_done());
        tq.shutdown().await;
        assert!(tq.is_shutting_down());
    }

    #[tokio::test]
    async fn enqueue_after_shutdown_is_ignored() {
        let (tq, worker) = TaskQueue::<Pod>::builder(QueueConfig::new("pods", "pod"), noop()).build();
        let h = tokio::spawn(worker.run());
        tq.shutdown().await;
        h.await.unwrap();

        tq.enqueue_key("default/late");
        assert!(tq.queue().is_empty());
    }
}
