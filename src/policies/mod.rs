//! Retry policies.
//!
//! This module groups the knobs that control **how long** a failed key waits
//! before the dispatcher sees it again.
//!
//! ## Contents
//! - [`RateLimiter`]        the seam the queue calls (`when` / `forget` / `num_requeues`)
//! - [`ItemBackoffLimiter`] per-key exponential backoff driven by a [`BackoffPolicy`]
//! - [`BucketLimiter`]      overall token bucket across all keys
//! - [`MaxOfLimiter`]       composition: wait for the slowest limiter
//! - [`BackoffPolicy`]      delay curve (first / factor / max + jitter)
//! - [`JitterPolicy`]       randomization to avoid synchronized retries
//!
//! ## Quick wiring
//! ```text
//! Dispatcher: sync(key) → Err
//!      └─► DedupQueue::add_rate_limited(key)
//!           └─► RateLimiter::when(key) ──► delay ──► add_after(key, delay)
//! Dispatcher: sync(key) → Ok
//!      └─► DedupQueue::forget(key) ──► RateLimiter::forget(key)
//! ```
//!
//! ## Defaults
//! - [`default_rate_limiter`] → `MaxOf[ItemBackoff(5ms × 2^n, ≤1000s), Bucket(10qps, burst 100)]`.
//! - `JitterPolicy::None`; consider `Equal` when thousands of keys fail together.

mod backoff;
mod bucket;
mod item_backoff;
mod jitter;
mod limiter;
mod max_of;

pub use backoff::BackoffPolicy;
pub use bucket::BucketLimiter;
pub use item_backoff::ItemBackoffLimiter;
pub use jitter::JitterPolicy;
pub use limiter::{default_rate_limiter, RateLimiter, RateLimiterRef};
pub use max_of::MaxOfLimiter;
