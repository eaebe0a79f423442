//! # Per-key exponential backoff limiter.
//!
//! Counts consecutive failures per key and feeds the count into a
//! [`BackoffPolicy`]. The count only grows until the key is forgotten.

use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use super::{BackoffPolicy, RateLimiter};

/// Per-key exponential backoff.
pub struct ItemBackoffLimiter {
    policy: BackoffPolicy,
    failures: Mutex<HashMap<String, u32>>,
}

impl ItemBackoffLimiter {
    /// Creates a limiter following `policy`.
    pub fn new(policy: BackoffPolicy) -> Self {
        Self {
            policy,
            failures: Mutex::new(HashMap::new()),
        }
    }

    /// Returns the backoff curve.
    pub fn policy(&self) -> &BackoffPolicy {
        &self.policy
    }

    fn failures(&self) -> MutexGuard<'_, HashMap<String, u32>> {
        self.failures.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl Default for ItemBackoffLimiter {
    /// 5ms doubling per failure, capped at 1000s.
    fn default() -> Self {
        Self::new(BackoffPolicy::default())
    }
}

impl RateLimiter for ItemBackoffLimiter {
    fn when(&self, key: &str) -> Duration {
        let prior = {
            let mut failures = self.failures();
            let count = failures.entry(key.to_string()).or_insert(0);
            let prior = *count;
            *count = count.saturating_add(1);
            prior
        };
        self.policy.next(prior)
    }

    fn forget(&self, key: &str) {
        self.failures().remove(key);
    }

    fn num_requeues(&self, key: &str) -> u32 {
        self.failures().get(key).copied().unwrap_or(0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::JitterPolicy;

    fn limiter() -> ItemBackoffLimiter {
        ItemBackoffLimiter::new(BackoffPolicy {
            first: Duration::from_millis(1),
            max: Duration::from_secs(1),
            factor: 2.0,
            jitter: JitterPolicy::None,
        })
    }

    #[test]
    fn delays_grow_per_key() {
        let rl = limiter();
        assert_eq!(rl.when("one"), Duration::from_millis(1));
        assert_eq!(rl.when("one"), Duration::from_millis(2));
        assert_eq!(rl.when("one"), Duration::from_millis(4));
        assert_eq!(rl.num_requeues("one"), 3);

        // Independent key starts from the base.
        assert_eq!(rl.when("two"), Duration::from_millis(1));
        assert_eq!(rl.num_requeues("two"), 1);
    }

    #[test]
    fn forget_resets_to_base() {
        let rl = limiter();
        for _ in 0..5 {
            rl.when("one");
        }
        rl.forget("one");
        assert_eq!(rl.num_requeues("one"), 0);
        assert_eq!(rl.when("one"), Duration::from_millis(1));
    }

    #[test]
    fn delay_is_capped() {
        let rl = limiter();
        let mut last = Duration::ZERO;
        for _ in 0..40 {
            last = rl.when("one");
        }
        assert_eq!(last, Duration::from_secs(1));
    }
}
