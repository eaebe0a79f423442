//! # DedupQueue: deduplicating, rate-limited work queue.
//!
//! Holds string keys waiting to be processed by a single worker.
//!
//! ## Contract
//! - `add(k)`: pending at most once; a key being processed is re-queued on `done`;
//!   a key waiting out a delay stays waiting (adds never bypass rate limiting).
//! - `add_after(k, d)`: `k` becomes pending once `d` elapses.
//! - `add_rate_limited(k)`: `add_after(k, limiter.when(k))`; used on failure.
//! - `get()`: waits for a key (`Some`) or shutdown (`None`).
//! - `done(k)`: processing finished; re-queues `k` if it was added meanwhile.
//! - `forget(k)`: resets the limiter state; used on success.
//! - `shut_down()`: every blocked and future `get()` returns `None`.
//!
//! ## Rules
//! - Producers never block: every method except `get` is synchronous.
//! - State lives behind one mutex that is never held across an `.await`.
//! - After shutdown adds are ignored and pending keys are never handed out.
//!   Keys already being processed are left alone; their `done` still works.

use std::sync::{Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use tokio::sync::Notify;
use tokio::time::{self, Instant};

use super::state::QueueState;
use crate::policies::{default_rate_limiter, RateLimiterRef};

/// Deduplicating work queue with rate-limited re-adds.
pub struct DedupQueue {
    name: String,
    limiter: RateLimiterRef,
    state: Mutex<QueueState>,
    notify: Notify,
}

impl DedupQueue {
    /// Creates a queue named `name` (used in logs) with the given limiter.
    pub fn new(name: impl Into<String>, limiter: RateLimiterRef) -> Self {
        Self {
            name: name.into(),
            limiter,
            state: Mutex::new(QueueState::default()),
            notify: Notify::new(),
        }
    }

    /// Creates a queue using [`default_rate_limiter`].
    pub fn with_default_limiter(name: impl Into<String>) -> Self {
        Self::new(name, default_rate_limiter())
    }

    /// Queue name.
    pub fn name(&self) -> &str {
        &self.name
    }

    fn lock(&self) -> MutexGuard<'_, QueueState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Marks `key` pending.
    ///
    /// No-op if already pending, after shutdown, or while `key` waits for a
    /// delayed or rate-limited add: it is handed out at that instant instead.
    pub fn add(&self, key: impl Into<String>) {
        let key = key.into();
        let queued = {
            let mut st = self.lock();
            if st.shutting_down {
                tracing::debug!(queue = %self.name, key = %key, "ignoring add after shutdown");
                return;
            }
            st.insert(key)
        };
        if queued {
            self.notify.notify_one();
        }
    }

    /// Marks `key` pending once `delay` has elapsed. Zero delay adds immediately.
    ///
    /// If `key` is already waiting, the earlier of the two instants wins.
    pub fn add_after(&self, key: impl Into<String>, delay: Duration) {
        if delay.is_zero() {
            return self.add(key);
        }
        let key = key.into();
        let moved = {
            let mut st = self.lock();
            if st.shutting_down {
                tracing::debug!(queue = %self.name, key = %key, "ignoring delayed add after shutdown");
                return;
            }
            st.schedule(key, deadline(delay))
        };
        if moved {
            // Wake the worker so it re-arms its timer.
            self.notify.notify_one();
        }
    }

    /// Records a failure for `key` and re-adds it after the limiter's delay.
    ///
    /// A re-add that arrived while `key` was processing is folded into this
    /// delayed add, so `done` does not hand the key out early.
    ///
    /// Returns the delay that was applied.
    pub fn add_rate_limited(&self, key: impl Into<String>) -> Duration {
        let key = key.into();
        let delay = self.limiter.when(&key);
        self.add_after(key, delay);
        delay
    }

    /// Waits for the next key.
    ///
    /// Returns `None` once the queue is shut down, even if keys are still
    /// pending. The returned key is marked processing until [`done`](Self::done).
    pub async fn get(&self) -> Option<String> {
        loop {
            let deadline = {
                let mut st = self.lock();
                if st.shutting_down {
                    return None;
                }
                st.promote(Instant::now());
                if let Some(key) = st.pop() {
                    return Some(key);
                }
                st.next_ready_at()
            };

            match deadline {
                Some(at) => {
                    tokio::select! {
                        _ = self.notify.notified() => {}
                        _ = time::sleep_until(at) => {}
                    }
                }
                None => self.notify.notified().await,
            }
        }
    }

    /// Marks `key` as no longer processing.
    pub fn done(&self, key: &str) {
        let requeued = self.lock().finish(key);
        if requeued {
            self.notify.notify_one();
        }
    }

    /// Resets the rate limiter state of `key`.
    pub fn forget(&self, key: &str) {
        self.limiter.forget(key);
    }

    /// Failures recorded for `key` since it was last forgotten.
    pub fn num_requeues(&self, key: &str) -> u32 {
        self.limiter.num_requeues(key)
    }

    /// Closes the queue and wakes every waiter. Idempotent.
    pub fn shut_down(&self) {
        self.lock().shutting_down = true;
        self.notify.notify_waiters();
        self.notify.notify_one();
    }

    /// True once [`shut_down`](Self::shut_down) was called.
    pub fn is_shutting_down(&self) -> bool {
        self.lock().shutting_down
    }

    /// Number of keys ready to be handed out (excludes delayed keys).
    pub fn len(&self) -> usize {
        self.lock().ready_len()
    }

    /// True if no key is ready.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Number of keys scheduled for a future add.
    pub fn waiting_len(&self) -> usize {
        self.lock().waiting_len()
    }

    /// True if `key` is pending (queued, or re-added while processing).
    pub fn is_pending(&self, key: &str) -> bool {
        self.lock().is_pending(key)
    }

    /// True if `key` has been handed out and not yet marked done.
    pub fn is_processing(&self, key: &str) -> bool {
        self.lock().is_processing(key)
    }
}

/// `now + delay`, saturating at roughly 30 years for huge delays.
fn deadline(delay: Duration) -> Instant {
    let now = Instant::now();
    now.checked_add(delay)
        .unwrap_or_else(|| now + Duration::from_secs(86_400 * 365 * 30))
}

impl std::fmt::Debug for DedupQueue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DedupQueue")
            .field("name", &self.name)
            .field("len", &self.len())
            .field("shutting_down", &self.is_shutting_down())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::{BackoffPolicy, ItemBackoffLimiter, JitterPolicy};

    fn queue() -> DedupQueue {
        let limiter = ItemBackoffLimiter::new(BackoffPolicy {
            first: Duration::from_millis(10),
            max: Duration::from_secs(1),
            factor: 2.0,
            jitter: JitterPolicy::None,
        });
        DedupQueue::new("test", Arc::new(limiter))
    }

    #[tokio::test]
    async fn add_dedups_pending_keys() {
        let q = queue();
        q.add("a");
        q.add("a");
        q.add("b");
        assert_eq!(q.len(), 2);

        assert_eq!(q.get().await.as_deref(), Some("a"));
        assert_eq!(q.get().await.as_deref(), Some("b"));
        assert!(q.is_empty());
    }

    #[tokio::test]
    async fn readd_while_processing_waits_for_done() {
        let q = queue();
        q.add("a");
        let key = q.get().await.unwrap();
        assert!(q.is_processing("a"));

        q.add("a");
        q.add("a");
        assert!(q.is_pending("a"));
        assert_eq!(q.len(), 0, "active key must not be handed out twice");

        q.done(&key);
        assert_eq!(q.len(), 1);
        assert_eq!(q.get().await.as_deref(), Some("a"));
        q.done("a");
        assert!(!q.is_processing("a"));
        assert!(q.is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn add_after_delays_eligibility() {
        let q = queue();
        let start = Instant::now();
        q.add_after("a", Duration::from_millis(30));
        assert_eq!(q.len(), 0);
        assert_eq!(q.waiting_len(), 1);

        assert_eq!(q.get().await.as_deref(), Some("a"));
        assert!(start.elapsed() >= Duration::from_millis(30));
        assert_eq!(q.waiting_len(), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn earlier_delayed_add_wakes_sleeping_getter() {
        let q = Arc::new(queue());
        q.add_after("slow", Duration::from_secs(10));

        let getter = {
            let q = Arc::clone(&q);
            tokio::spawn(async move {
                let start = Instant::now();
                let key = q.get().await;
                (key, start.elapsed())
            })
        };
        tokio::task::yield_now().await;
        q.add_after("fast", Duration::from_millis(5));

        let (key, waited) = getter.await.unwrap();
        assert_eq!(key.as_deref(), Some("fast"));
        assert!(waited < Duration::from_secs(10));
    }

    #[tokio::test(start_paused = true)]
    async fn add_rate_limited_backs_off_and_forget_resets() {
        let q = queue();
        assert_eq!(q.add_rate_limited("a"), Duration::from_millis(10));
        assert_eq!(q.num_requeues("a"), 1);
        assert_eq!(q.get().await.as_deref(), Some("a"));
        q.done("a");

        assert_eq!(q.add_rate_limited("a"), Duration::from_millis(20));
        assert_eq!(q.num_requeues("a"), 2);

        q.forget("a");
        assert_eq!(q.num_requeues("a"), 0);
        assert_eq!(q.add_rate_limited("a"), Duration::from_millis(10));
    }

    #[tokio::test(start_paused = true)]
    async fn add_during_backoff_waits_for_the_deadline() {
        let q = queue();
        let start = Instant::now();
        q.add_rate_limited("a");
        q.add("a");
        q.add("a");
        assert_eq!(q.len(), 0);
        assert_eq!(q.waiting_len(), 1);

        assert_eq!(q.get().await.as_deref(), Some("a"));
        assert!(start.elapsed() >= Duration::from_millis(10));
        q.done("a");
        assert_eq!(q.len(), 0);
        assert_eq!(q.waiting_len(), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn forget_while_waiting_still_runs_the_key_once() {
        let q = queue();
        q.add_rate_limited("a");
        q.add("a");
        q.forget("a");
        assert_eq!(q.num_requeues("a"), 0);

        assert_eq!(q.get().await.as_deref(), Some("a"));
        q.done("a");
        assert!(q.is_empty());
        assert_eq!(q.waiting_len(), 0);
        assert!(tokio::time::timeout(Duration::from_secs(60), q.get()).await.is_err());
    }

    #[tokio::test(start_paused = true)]
    async fn failure_while_readded_is_not_handed_out_before_backoff() {
        let q = queue();
        q.add("a");
        let key = q.get().await.unwrap();
        q.add("a");
        let start = Instant::now();
        q.add_rate_limited(&key);
        q.done(&key);
        assert!(q.is_empty());

        assert_eq!(q.get().await.as_deref(), Some("a"));
        assert!(start.elapsed() >= Duration::from_millis(10));
    }

    #[test]
    fn huge_delay_saturates_instead_of_overflowing() {
        let q = queue();
        q.add_after("a", Duration::MAX);
        assert_eq!(q.waiting_len(), 1);
        assert!(q.is_empty());
    }

    #[tokio::test]
    async fn shut_down_closes_get_even_with_pending_keys() {
        let q = queue();
        q.add("a");
        q.shut_down();
        assert!(q.is_shutting_down());
        assert_eq!(q.get().await, None);
        assert_eq!(q.get().await, None);
    }

    #[tokio::test]
    async fn shut_down_wakes_blocked_getter() {
        let q = Arc::new(queue());
        let getter = {
            let q = Arc::clone(&q);
            tokio::spawn(async move { q.get().await })
        };
        tokio::task::yield_now().await;
        q.shut_down();
        assert_eq!(getter.await.unwrap(), None);
    }

    #[tokio::test]
    async fn adds_after_shutdown_are_ignored() {
        let q = queue();
        q.shut_down();
        q.add("a");
        q.add_after("b", Duration::from_millis(1));
        assert_eq!(q.len(), 0);
        assert_eq!(q.waiting_len(), 0);
    }

    #[tokio::test]
    async fn done_after_shutdown_keeps_working() {
        let q = queue();
        q.add("a");
        let key = q.get().await.unwrap();
        q.shut_down();
        q.done(&key);
        assert!(!q.is_processing("a"));
    }
}
