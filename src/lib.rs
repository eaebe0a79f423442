//! # taskqueue
//!
//! **taskqueue** is a deduplicating, rate-limited retry queue for
//! controller-style reconcile loops.
//!
//! Producers notify it about objects; it turns each object into a string
//! key, collapses repeated notifications for the same key, hands keys one at
//! a time to a single worker, and retries failed keys with per-key
//! exponential backoff. A host drives it with `run` / `enqueue` / `shutdown`.
//!
//! ## Architecture
//! ### Overview
//! ```text
//!   informer / watcher / timer ...        (many producers)
//!        │          │          │
//!        └──────────┼──────────┘
//!                   ▼
//! ┌───────────────────────────────────────────────────────────────────┐
//! │  TaskQueue<T> (façade, cheap to clone)                            │
//! │  - KeyFn<T>    object ──► "namespace/name"   (error ─► KeyDropped)│
//! │  - DedupQueue  pending set + active set + ready FIFO + waiting    │
//! │  - RateLimiter per-key backoff ⊕ token bucket                     │
//! └──────────────────────────────┬────────────────────────────────────┘
//!                                ▼ get()
//!                      ┌───────────────────┐
//!                      │  Worker::run()    │  (exactly one)
//!                      │  dispatcher loop  │
//!                      └─────────┬─────────┘
//!                                ▼
//!                         SyncHandler::sync(key)
//!                          │              │
//!                        Ok(())         Err / panic
//!                          │              │
//!                   forget(key)     add_rate_limited(key)
//!                          └──► done(key) ◄┘
//!
//! Every step publishes an Event ──► Bus ──► listener ──► SubscriberSet
//!                                                   ┌────────┼────────┐
//!                                                   ▼        ▼        ▼
//!                                                 sub1     sub2     subN
//! ```
//!
//! ### Lifecycle
//! ```text
//! TaskQueue::builder(cfg, handler).build() ──► (TaskQueue<T>, Worker)
//!
//! tokio::spawn(worker.run())
//!   loop {
//!     get() ─► None ─► WorkerStopped, completion signal fires, exit
//!     get() ─► Some(key) ─► sync(key) ─► retry / forget ─► done(key)
//!   }
//!
//! queue.shutdown().await
//!   ├─► shut_down(): pending keys are no longer handed out
//!   ├─► publish ShutdownRequested
//!   └─► wait for the completion signal (in-flight sync finishes first)
//! ```
//!
//! ## Features
//! | Area              | Description                                                  | Key types / traits                                  |
//! |-------------------|--------------------------------------------------------------|-----------------------------------------------------|
//! | **Lifecycle**     | Enqueue objects, run the single worker, shut down gracefully.| [`TaskQueue`], [`Worker`], [`TaskQueueBuilder`]      |
//! | **Queue**         | Dedup, serialization per key, delayed and rate-limited adds. | [`DedupQueue`]                                      |
//! | **Keys**          | Derive stable keys from objects.                             | [`KeyFn`], [`ObjectMeta`], [`Notification`]        |
//! | **Handlers**      | Idempotent processing of one key.                            | [`SyncHandler`], [`SyncFn`], [`SyncRef`]            |
//! | **Policies**      | Retry delays: per-key backoff, token bucket, composition.    | [`RateLimiter`], [`BackoffPolicy`], [`MaxOfLimiter`] |
//! | **Subscriber API**| Hook into queue events (logging, metrics, custom).           | [`Subscribe`], [`Event`]                            |
//! | **Errors**        | Typed errors for key extraction and sync.                    | [`KeyError`], [`SyncError`]                         |
//! | **Configuration** | Per-queue settings.                                          | [`QueueConfig`]                                     |
//!
//! ## Optional features
//! - `logging`: exports a simple built-in [`LogWriter`] _(demo/reference only)_.
//!
//! ## Example
//! ```rust
//! use taskqueue::{ObjectMeta, QueueConfig, SyncError, SyncFn, SyncRef, TaskQueue};
//!
//! struct Service {
//!     namespace: String,
//!     name: String,
//! }
//!
//! impl ObjectMeta for Service {
//!     fn name(&self) -> &str { &self.name }
//!     fn namespace(&self) -> Option<&str> { Some(&self.namespace) }
//! }
//!
//! #[tokio::main(flavor = "current_thread")]
//! async fn main() {
//!     let handler: SyncRef = SyncFn::arc(|key: String| async move {
//!         println!("syncing {key}");
//!         Ok::<(), SyncError>(())
//!     });
//!
//!     let (queue, worker) =
//!         TaskQueue::<Service>::builder(QueueConfig::new("services", "service"), handler).build();
//!     let worker = tokio::spawn(worker.run());
//!
//!     queue.enqueue(&[Service { namespace: "ns".into(), name: "foo".into() }]);
//!
//!     queue.shutdown().await;
//!     worker.await.unwrap();
//! }
//! ```
mod core;
mod error;
mod events;
mod handlers;
mod keys;
mod policies;
mod queue;
mod subscribers;

// ---- Public re-exports ----

pub use core::{QueueConfig, TaskQueue, TaskQueueBuilder, Worker};
pub use error::{KeyError, SyncError};
pub use events::{Event, EventKind};
pub use handlers::{SyncFn, SyncHandler, SyncRef};
pub use keys::{
    deletion_handling_key, deletion_handling_key_fn, key_fn, meta_key_fn, meta_namespace_key,
    split_meta_namespace_key, KeyFn, Notification, ObjectMeta, Tombstone,
};
pub use policies::{
    default_rate_limiter, BackoffPolicy, BucketLimiter, ItemBackoffLimiter, JitterPolicy,
    MaxOfLimiter, RateLimiter, RateLimiterRef,
};
pub use queue::DedupQueue;
pub use subscribers::{Subscribe, SubscriberSet};

// Optional: expose a simple built-in logger subscriber (demo/reference).
// Enable with: `--features logging`
#[cfg(feature = "logging")]
pub use subscribers::LogWriter;
