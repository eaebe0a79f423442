//! # Event subscriber trait.
//!
//! Provides [`Subscribe`], the extension point for metrics, audit trails or
//! custom diagnostics on top of a queue.
//!
//! Each subscriber gets:
//! - **Dedicated worker task** (runs independently of the dispatcher)
//! - **Per-subscriber bounded queue** (capacity via [`Subscribe::queue_capacity`])
//! - **Panic isolation** (panics are caught and reported as `EventKind::SubscriberPanicked`)
//!
//! ## Example
//! ```rust
//! use std::sync::atomic::{AtomicU64, Ordering};
//! use async_trait::async_trait;
//! use taskqueue::{Event, EventKind, Subscribe};
//!
//! #[derive(Default)]
//! struct RetryCounter(AtomicU64);
//!
//! #[async_trait]
//! impl Subscribe for RetryCounter {
//!     async fn on_event(&self, ev: &Event) {
//!         if matches!(ev.kind, EventKind::RetryScheduled) {
//!             self.0.fetch_add(1, Ordering::Relaxed);
//!         }
//!     }
//!
//!     fn name(&self) -> &'static str { "retry-counter" }
//! }
//! ```

use async_trait::async_trait;

use crate::events::Event;

/// Event subscriber for queue observability.
///
/// ### Implementation requirements
/// - Use async I/O; avoid blocking the executor.
/// - Handle errors internally.
/// - Slow processing affects only this subscriber's queue.
#[async_trait]
pub trait Subscribe: Send + Sync + 'static {
    /// Processes a single event, in FIFO order per subscriber.
    async fn on_event(&self, event: &Event);

    /// Name used in overflow/panic reports. Defaults to the type name.
    fn name(&self) -> &'static str {
        std::any::type_name::<Self>()
    }

    /// Preferred queue capacity (clamped to at least 1). Default: 1024.
    fn queue_capacity(&self) -> usize {
        1024
    }
}
