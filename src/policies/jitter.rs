//! # Jitter for retry delays.
//!
//! When many keys fail together (an upstream outage, a bad rollout), their
//! retries line up. [`JitterPolicy`] spreads them out:
//!
//! - [`JitterPolicy::None`]: exact delay
//! - [`JitterPolicy::Full`]: random in `[0, delay]`
//! - [`JitterPolicy::Equal`]: `delay/2 + random[0, delay/2]`
//! - [`JitterPolicy::Decorrelated`]: random in `[first, delay * 3]`, capped at max

use rand::Rng;
use std::time::Duration;

/// Randomization applied to a computed backoff delay.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum JitterPolicy {
    /// Exact delay. Predictable; fine for low key counts and tests.
    #[default]
    None,

    /// Random delay in `[0, delay]`. Spreads load the most, may retry almost immediately.
    Full,

    /// `delay/2 + random[0, delay/2]`. Keeps at least half of the backoff.
    Equal,

    /// Random delay in `[base, delay * 3]`, capped at `max`.
    ///
    /// Needs the extra context passed to [`apply_decorrelated`](Self::apply_decorrelated).
    Decorrelated,
}

impl JitterPolicy {
    /// Applies jitter to `delay`.
    ///
    /// `Decorrelated` returns `delay` unchanged here; use
    /// [`apply_decorrelated`](Self::apply_decorrelated) for it.
    pub fn apply(&self, delay: Duration) -> Duration {
        match self {
            JitterPolicy::None | JitterPolicy::Decorrelated => delay,
            JitterPolicy::Full => full_jitter(delay),
            JitterPolicy::Equal => equal_jitter(delay),
        }
    }

    /// Applies decorrelated jitter between `base` and `min(prev * 3, max)`.
    ///
    /// Non-decorrelated policies fall back to `apply(prev)`.
    pub fn apply_decorrelated(&self, base: Duration, prev: Duration, max: Duration) -> Duration {
        if !matches!(self, JitterPolicy::Decorrelated) {
            return self.apply(prev);
        }

        let base_ms = base.as_millis() as u64;
        let upper = (prev.as_millis() as u64)
            .saturating_mul(3)
            .min(max.as_millis() as u64)
            .max(base_ms);

        if base_ms >= upper {
            return base;
        }
        Duration::from_millis(rand::rng().random_range(base_ms..=upper))
    }
}

fn full_jitter(delay: Duration) -> Duration {
    let ms = delay.as_millis() as u64;
    if ms == 0 {
        return Duration::ZERO;
    }
    Duration::from_millis(rand::rng().random_range(0..=ms))
}

fn equal_jitter(delay: Duration) -> Duration {
    let ms = delay.as_millis() as u64;
    if ms == 0 {
        return Duration::ZERO;
    }
    let half = ms / 2;
    let extra = if half == 0 {
        0
    } else {
        rand::rng().random_range(0..=half)
    };
    Duration::from_millis(half + extra)
}
