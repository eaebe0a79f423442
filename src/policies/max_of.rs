//! # Max-of composition.
//!
//! [`MaxOfLimiter`] consults every inner limiter and waits for the slowest.
//! Every inner limiter sees every call, so each one's state advances together.

use std::time::Duration;

use super::{RateLimiter, RateLimiterRef};

/// Waits for the longest delay among its limiters.
pub struct MaxOfLimiter {
    limiters: Vec<RateLimiterRef>,
}

impl MaxOfLimiter {
    /// Composes `limiters`. An empty list never delays.
    pub fn new(limiters: Vec<RateLimiterRef>) -> Self {
        Self { limiters }
    }
}

impl RateLimiter for MaxOfLimiter {
    fn when(&self, key: &str) -> Duration {
        self.limiters
            .iter()
            .map(|rl| rl.when(key))
            .fold(Duration::ZERO, Duration::max)
    }

    fn forget(&self, key: &str) {
        for rl in &self.limiters {
            rl.forget(key);
        }
    }

    fn num_requeues(&self, key: &str) -> u32 {
        self.limiters
            .iter()
            .map(|rl| rl.num_requeues(key))
            .max()
            .unwrap_or(0)
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicU32, Ordering};
    use std::sync::Arc;

    use super::*;

    /// Always returns a fixed delay and counts calls.
    struct Fixed {
        delay: Duration,
        calls: AtomicU32,
    }

    impl Fixed {
        fn arc(ms: u64) -> Arc<Self> {
            Arc::new(Self {
                delay: Duration::from_millis(ms),
                calls: AtomicU32::new(0),
            })
        }
    }

    impl RateLimiter for Fixed {
        fn when(&self, _key: &str) -> Duration {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.delay
        }

        fn forget(&self, _key: &str) {
            self.calls.store(0, Ordering::SeqCst);
        }

        fn num_requeues(&self, _key: &str) -> u32 {
            self.calls.load(Ordering::SeqCst)
        }
    }

    #[test]
    fn picks_longest_and_advances_all() {
        let short = Fixed::arc(5);
        let long = Fixed::arc(50);
        let rl = MaxOfLimiter::new(vec![short.clone(), long.clone()]);

        assert_eq!(rl.when("k"), Duration::from_millis(50));
        assert_eq!(short.calls.load(Ordering::SeqCst), 1);
        assert_eq!(long.calls.load(Ordering::SeqCst), 1);
        assert_eq!(rl.num_requeues("k"), 1);

        rl.forget("k");
        assert_eq!(rl.num_requeues("k"), 0);
    }

    #[test]
    fn empty_composition_never_waits() {
        let rl = MaxOfLimiter::new(Vec::new());
        assert_eq!(rl.when("k"), Duration::ZERO);
        assert_eq!(rl.num_requeues("k"), 0);
    }
}
