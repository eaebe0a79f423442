//! # Example: basic_queue
//!
//! Minimal queue wired with the built-in [`LogWriter`] subscriber, so every
//! queue event is printed through `tracing`.
//!
//! ## Run
//! ```bash
//! RUST_LOG=info cargo run --example basic_queue --features logging
//! ```

use std::sync::Arc;
use std::time::Duration;

use taskqueue::{
    key_fn, KeyError, LogWriter, QueueConfig, Subscribe, SyncError, SyncFn, SyncRef,
    TaskQueueBuilder,
};

#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let handler: SyncRef = SyncFn::arc(|key: String| async move {
        tokio::time::sleep(Duration::from_millis(50)).await;
        if key.ends_with("-3") {
            return Err(SyncError::fail("not ready yet"));
        }
        Ok(())
    });

    // Orders are keyed by id; id 0 is rejected before it reaches the queue.
    let keys = key_fn(|id: &u64| {
        if *id == 0 {
            return Err(KeyError::extract("order id 0 is reserved"));
        }
        Ok(format!("order-{id}"))
    });

    let subs: Vec<Arc<dyn Subscribe>> = vec![Arc::new(LogWriter::new())];
    let (queue, worker) = TaskQueueBuilder::new(QueueConfig::new("orders", "order"), handler, keys)
        .with_subscribers(subs)
        .build();
    let worker = tokio::spawn(worker.run());

    queue.enqueue(&[1, 2, 3, 0, 2]);
    tokio::time::sleep(Duration::from_millis(500)).await;

    queue.shutdown().await;
    worker.await?;
    Ok(())
}
