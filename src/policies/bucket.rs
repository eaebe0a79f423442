//! # Overall token bucket limiter.
//!
//! Caps the aggregate retry rate of a queue regardless of key. The bucket
//! holds up to `burst` tokens and refills at `qps` tokens per second; each
//! [`RateLimiter::when`] call reserves one token and returns how long the
//! caller must wait for it to exist.
//!
//! ```text
//! tokens: burst ──► burst-1 ──► ... ──► 0 ──► -1 (wait 1/qps) ──► -2 (wait 2/qps)
//!                 (immediate retries)          (reservations queue up)
//! ```
//!
//! The bucket is not per-key: `forget` is a no-op and `num_requeues` is 0.

use std::sync::{Mutex, PoisonError};
use std::time::Duration;

use tokio::time::Instant;

use super::RateLimiter;

struct Bucket {
    tokens: f64,
    last: Instant,
}

/// Token bucket over all keys.
pub struct BucketLimiter {
    qps: f64,
    burst: u32,
    state: Mutex<Bucket>,
}

impl BucketLimiter {
    /// Creates a full bucket refilling at `qps`, holding at most `burst` tokens.
    ///
    /// A non-positive or non-finite `qps` disables limiting (every call returns zero).
    pub fn new(qps: f64, burst: u32) -> Self {
        Self {
            qps,
            burst,
            state: Mutex::new(Bucket {
                tokens: f64::from(burst),
                last: Instant::now(),
            }),
        }
    }

    /// Refill rate in tokens per second.
    pub fn qps(&self) -> f64 {
        self.qps
    }

    /// Bucket capacity.
    pub fn burst(&self) -> u32 {
        self.burst
    }

    fn unlimited(&self) -> bool {
        !(self.qps.is_finite() && self.qps > 0.0)
    }
}

impl Default for BucketLimiter {
    /// 10 qps with a burst of 100.
    fn default() -> Self {
        Self::new(10.0, 100)
    }
}

impl RateLimiter for BucketLimiter {
    fn when(&self, _key: &str) -> Duration {
        if self.unlimited() {
            return Duration::ZERO;
        }

        let mut bucket = self.state.lock().unwrap_or_else(PoisonError::into_inner);
        let now = Instant::now();
        let elapsed = now.saturating_duration_since(bucket.last).as_secs_f64();
        bucket.tokens = (bucket.tokens + elapsed * self.qps).min(f64::from(self.burst));
        bucket.last = now;

        bucket.tokens -= 1.0;
        if bucket.tokens >= 0.0 {
            Duration::ZERO
        } else {
            Duration::from_secs_f64(-bucket.tokens / self.qps)
        }
    }

    fn forget(&self, _key: &str) {}

    fn num_requeues(&self, _key: &str) -> u32 {
        0
    }
}
