//! # LogWriter: queue event renderer
//!
//! A minimal subscriber that renders incoming [`Event`]s through `tracing`.
//! Use it for tests or demos; hosts still install their own `tracing`
//! subscriber to see the output.
//!
//! ## Example output
//! ```text
//! [enqueued] queue=services key="ns/foo"
//! [starting] queue=services key="ns/foo" requeues=0
//! [failed] queue=services key="ns/foo" err="connection refused"
//! [retry] queue=services key="ns/foo" delay_ms=5 requeues=1
//! [succeeded] queue=services key="ns/foo"
//! [shutdown-requested] queue=services
//! [worker-stopped] queue=services
//! ```

use async_trait::async_trait;

use crate::events::{Event, EventKind};
use crate::subscribers::Subscribe;

/// Event writer subscriber.
#[derive(Default)]
pub struct LogWriter;

impl LogWriter {
    /// Construct a new [`LogWriter`].
    #[must_use]
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl Subscribe for LogWriter {
    async fn on_event(&self, e: &Event) {
        let key = e.key.as_deref().unwrap_or("-");
        let reason = e.reason.as_deref().unwrap_or("-");
        match e.kind {
            EventKind::KeyEnqueued => {
                tracing::info!("[enqueued] queue={} key={:?}", e.queue, key);
            }
            EventKind::KeyDropped => {
                tracing::warn!("[dropped] queue={} err={:?}", e.queue, reason);
            }
            EventKind::SyncStarting => {
                tracing::info!(
                    "[starting] queue={} key={:?} requeues={}",
                    e.queue,
                    key,
                    e.requeues.unwrap_or(0)
                );
            }
            EventKind::SyncSucceeded => {
                tracing::info!("[succeeded] queue={} key={:?}", e.queue, key);
            }
            EventKind::SyncFailed => {
                tracing::warn!("[failed] queue={} key={:?} err={:?}", e.queue, key, reason);
            }
            EventKind::RetryScheduled => {
                tracing::info!(
                    "[retry] queue={} key={:?} delay_ms={} requeues={}",
                    e.queue,
                    key,
                    e.delay_ms.unwrap_or(0),
                    e.requeues.unwrap_or(0)
                );
            }
            EventKind::ShutdownRequested => {
                tracing::info!("[shutdown-requested] queue={}", e.queue);
            }
            EventKind::WorkerStopped => {
                tracing::info!("[worker-stopped] queue={}", e.queue);
            }
            EventKind::SubscriberOverflow => {
                tracing::warn!("[subscriber-overflow] queue={} {}", e.queue, reason);
            }
            EventKind::SubscriberPanicked => {
                tracing::warn!("[subscriber-panicked] queue={} {}", e.queue, reason);
            }
        }
    }

    fn name(&self) -> &'static str {
        "LogWriter"
    }
}
