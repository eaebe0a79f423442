//! # Rate limiter seam.
//!
//! A [`RateLimiter`] decides how long a failed key must wait before it is
//! eligible again. The queue calls [`RateLimiter::when`] on every failure and
//! [`RateLimiter::forget`] on every success.
//!
//! ## Rules
//! - `when` **advances** the key's state; calling it is recording a failure.
//! - `forget` resets the key to its base state.
//! - Implementations are shared between producers and the worker, so they
//!   synchronize internally.

use std::sync::Arc;
use std::time::Duration;

use super::{BucketLimiter, ItemBackoffLimiter, MaxOfLimiter};

/// Per-key retry delay policy.
pub trait RateLimiter: Send + Sync + 'static {
    /// Records a failure for `key` and returns how long it must wait.
    fn when(&self, key: &str) -> Duration;

    /// Resets all state for `key`.
    fn forget(&self, key: &str);

    /// Number of failures recorded for `key` since the last `forget`.
    fn num_requeues(&self, key: &str) -> u32;
}

/// Shared rate limiter handle.
pub type RateLimiterRef = Arc<dyn RateLimiter>;

/// Default limiter for controller queues.
///
/// The larger of:
/// - per-key exponential backoff (5ms doubling up to 1000s), and
/// - an overall token bucket (10 qps, burst 100) that only bites when many
///   keys fail at once.
pub fn default_rate_limiter() -> RateLimiterRef {
    Arc::new(MaxOfLimiter::new(vec![
        Arc::new(ItemBackoffLimiter::default()),
        Arc::new(BucketLimiter::default()),
    ]))
}
