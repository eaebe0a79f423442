//! # Example: retry_with_backoff
//!
//! Demonstrates how a [`TaskQueue`] retries a failing key according to its
//! rate limiter, and how a success resets the key's backoff.
//!
//! The handler fails for `default/flaky` three times before succeeding;
//! `default/steady` succeeds immediately. Delays use equal jitter, so each
//! lands between half and all of `100ms × 2^n`.
//!
//! ## Flow
//! ```text
//! Worker::run()
//!   ├─► get() → "default/flaky"
//!   ├─► sync() → Err("boom #1")
//!   ├─► add_rate_limited() → delay 50..100ms, requeues=1
//!   ├─► done()
//!   ├─► get() → "default/steady" → Ok(()) → forget()
//!   ├─► get() (after 50..100ms) → "default/flaky"
//!   │     ├─► sync() → Err("boom #2")
//!   │     └─► add_rate_limited() → delay 100..200ms, requeues=2
//!   ├─► get() (after 100..200ms) → "default/flaky"
//!   │     ├─► sync() → Err("boom #3")
//!   │     └─► add_rate_limited() → delay 200..400ms, requeues=3
//!   ├─► get() (after 200..400ms) → "default/flaky" → Ok(()) → forget()
//!   └─► get() → None (after shutdown)
//! ```
//!
//! ## Run
//! ```bash
//! RUST_LOG=debug cargo run --example retry_with_backoff
//! ```

use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Arc;
use std::time::Duration;

use taskqueue::{
    BackoffPolicy, BucketLimiter, ItemBackoffLimiter, JitterPolicy, MaxOfLimiter, ObjectMeta,
    QueueConfig, RateLimiterRef, SyncError, SyncFn, SyncRef, TaskQueue,
};

static FAIL_COUNT: AtomicU32 = AtomicU32::new(0);

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

#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    // 1. Slower-than-default backoff so the retries are easy to follow.
    let backoff = BackoffPolicy {
        first: Duration::from_millis(100),
        max: Duration::from_secs(5),
        factor: 2.0,
        jitter: JitterPolicy::Equal,
    };
    let limiter: RateLimiterRef = Arc::new(MaxOfLimiter::new(vec![
        Arc::new(ItemBackoffLimiter::new(backoff)) as RateLimiterRef,
        Arc::new(BucketLimiter::new(10.0, 100)) as RateLimiterRef,
    ]));

    // 2. Handler: fails three times for the flaky pod, then succeeds.
    let handler: SyncRef = SyncFn::arc(|key: String| async move {
        if key == "default/flaky" {
            let n = FAIL_COUNT.fetch_add(1, Ordering::Relaxed) + 1;
            if n <= 3 {
                println!("[sync] {key}: failing (#{n})");
                return Err(SyncError::fail(format!("boom #{n}")));
            }
        }
        println!("[sync] {key}: ok");
        Ok(())
    });

    // 3. Build and start the single worker.
    let (queue, worker) = TaskQueue::<Pod>::builder(QueueConfig::new("pods", "pod"), handler)
        .with_rate_limiter(limiter)
        .build();
    let worker = tokio::spawn(worker.run());

    // 4. Notify a few times; repeated notifications collapse.
    queue.enqueue(&[Pod { name: "flaky" }, Pod { name: "steady" }]);
    queue.enqueue(&[Pod { name: "steady" }]);

    tokio::time::sleep(Duration::from_secs(2)).await;
    println!(
        "[main] flaky requeues after recovery: {}",
        queue.queue().num_requeues("default/flaky")
    );

    // 5. Graceful shutdown: waits for the worker to exit.
    queue.shutdown().await;
    worker.await?;
    Ok(())
}
