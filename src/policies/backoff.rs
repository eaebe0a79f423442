//! # Exponential backoff curve.
//!
//! [`BackoffPolicy`] maps a per-key failure count to a retry delay:
//! `first × factor^failures`, clamped to `max`, then jittered.
//!
//! The base delay depends only on the failure count, so jitter output never
//! feeds back into later delays and they cannot shrink over time.
//! [`ItemBackoffLimiter`](crate::ItemBackoffLimiter) owns the per-key counts.
//!
//! # Example
//! ```rust
//! use std::time::Duration;
//! use taskqueue::{BackoffPolicy, JitterPolicy};
//!
//! let backoff = BackoffPolicy {
//!     first: Duration::from_millis(5),
//!     max: Duration::from_secs(1),
//!     factor: 2.0,
//!     jitter: JitterPolicy::None,
//! };
//!
//! assert_eq!(backoff.next(0), Duration::from_millis(5));
//! assert_eq!(backoff.next(3), Duration::from_millis(40));
//! // 5ms × 2^10 = 5_120ms → capped at max=1s
//! assert_eq!(backoff.next(10), Duration::from_secs(1));
//! ```

use std::time::Duration;

use crate::policies::jitter::JitterPolicy;

/// Retry backoff curve.
#[derive(Clone, Copy, Debug)]
pub struct BackoffPolicy {
    /// Delay after the first failure.
    pub first: Duration,
    /// Upper bound on any delay.
    pub max: Duration,
    /// Multiplicative growth factor (`>= 1.0` recommended).
    pub factor: f64,
    /// Randomization applied on top of the clamped delay.
    pub jitter: JitterPolicy,
}

impl Default for BackoffPolicy {
    /// Returns the per-item curve used by [`default_rate_limiter`](crate::default_rate_limiter):
    /// - `first = 5ms`;
    /// - `max = 1000s`;
    /// - `factor = 2.0`;
    /// - no jitter.
    fn default() -> Self {
        Self {
            first: Duration::from_millis(5),
            max: Duration::from_secs(1000),
            factor: 2.0,
            jitter: JitterPolicy::None,
        }
    }
}

impl BackoffPolicy {
    /// Computes the delay after `failures` previous failures (0-indexed).
    ///
    /// Overflowing or non-finite intermediate values clamp to [`BackoffPolicy::max`].
    /// `factor < 1.0` yields shrinking delays, which is almost never what you want.
    pub fn next(&self, failures: u32) -> Duration {
        let max_secs = self.max.as_secs_f64();
        let exp = failures.min(i32::MAX as u32) as i32;
        let unclamped = self.first.as_secs_f64() * self.factor.powi(exp);

        let base = if !unclamped.is_finite() || unclamped < 0.0 || unclamped > max_secs {
            self.max
        } else {
            Duration::try_from_secs_f64(unclamped).unwrap_or(self.max)
        };

        match self.jitter {
            JitterPolicy::Decorrelated => {
                self.jitter
                    .apply_decorrelated(self.first.min(self.max), base, self.max)
            }
            _ => self.jitter.apply(base),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn exp(first_ms: u64, max: Duration, jitter: JitterPolicy) -> BackoffPolicy {
        BackoffPolicy {
            first: Duration::from_millis(first_ms),
            max,
            factor: 2.0,
            jitter,
        }
    }

    #[test]
    fn test_default_matches_controller_curve() {
        let policy = BackoffPolicy::default();
        assert_eq!(policy.next(0), Duration::from_millis(5));
        assert_eq!(policy.next(1), Duration::from_millis(10));
        assert_eq!(policy.next(30), Duration::from_secs(1000));
    }

    #[test]
    fn test_exponential_growth_no_jitter() {
        let policy = exp(100, Duration::from_secs(30), JitterPolicy::None);
        let expected = [100, 200, 400, 800, 1600];
        for (failures, ms) in expected.iter().enumerate() {
            assert_eq!(policy.next(failures as u32), Duration::from_millis(*ms));
        }
    }

    #[test]
    fn test_constant_factor() {
        let policy = BackoffPolicy {
            first: Duration::from_millis(500),
            max: Duration::from_secs(30),
            factor: 1.0,
            jitter: JitterPolicy::None,
        };
        for failures in 0..10 {
            assert_eq!(policy.next(failures), Duration::from_millis(500));
        }
    }

    #[test]
    fn test_first_exceeds_max() {
        let policy = exp(10_000, Duration::from_secs(5), JitterPolicy::None);
        assert_eq!(policy.next(0), Duration::from_secs(5));
    }

    #[test]
    fn test_overflow_clamps_to_max() {
        let policy = exp(100, Duration::from_secs(10), JitterPolicy::None);
        assert_eq!(policy.next(100), Duration::from_secs(10));
        assert_eq!(policy.next(u32::MAX), Duration::from_secs(10));
    }

    #[test]
    fn test_unbounded_max_does_not_panic() {
        let policy = exp(100, Duration::MAX, JitterPolicy::None);
        assert_eq!(policy.next(0), Duration::from_millis(100));
        assert_eq!(policy.next(u32::MAX), Duration::MAX);
    }

    #[test]
    fn test_full_jitter_never_exceeds_base() {
        let policy = exp(100, Duration::from_secs(30), JitterPolicy::Full);
        for failures in 0..15 {
            let base_ms = (100.0 * 2.0f64.powi(failures as i32)).min(30_000.0);
            assert!(policy.next(failures) <= Duration::from_millis(base_ms as u64));
        }
    }

    #[test]
    fn test_equal_jitter_keeps_half() {
        let policy = exp(100, Duration::from_secs(30), JitterPolicy::Equal);
        for failures in 0..15 {
            let base_ms = (100.0 * 2.0f64.powi(failures as i32)).min(30_000.0);
            let delay = policy.next(failures);
            assert!(delay >= Duration::from_millis((base_ms / 2.0) as u64));
            assert!(delay <= Duration::from_millis(base_ms as u64));
        }
    }

    #[test]
    fn test_decorrelated_stays_above_first() {
        let policy = exp(100, Duration::from_secs(30), JitterPolicy::Decorrelated);
        for _ in 0..100 {
            let delay = policy.next(8);
            assert!(delay >= Duration::from_millis(100));
            assert!(delay <= Duration::from_secs(30));
        }
    }
}
