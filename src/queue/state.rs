//! Mutable queue state guarded by the [`DedupQueue`](super::DedupQueue) mutex.
//!
//! ```text
//!            add(k)                 promote (ready_at <= now)
//!   ──────────────────┐      ┌──────────── waiting heap ◄── add_after(k, d)
//!                     ▼      ▼
//!                 ┌─────────────┐ pop  ┌────────────┐ done(k), k dirty again
//!   dirty ◄──────►│ ready FIFO  │─────►│ processing │──────────┐
//!   (pending)     └─────────────┘      └────────────┘          │
//!                        ▲                                     │
//!                        └─────────────────────────────────────┘
//! ```
//!
//! ## Invariants
//! - `dirty` is the pending set: a key appears in `ready` only if it is dirty
//!   and not processing, and at most once.
//! - A dirty key that is processing stays out of `ready` until `done`.
//! - `waiting_at` holds the live ready instant of each waiting key; heap
//!   entries that disagree with it are stale and skipped.
//! - A waiting key is never made ready early: a plain insert is absorbed
//!   by its waiting entry, and scheduling a key re-added while processing
//!   clears that re-add so `finish` does not queue it ahead of its instant.

use std::cmp::Reverse;
use std::collections::{BinaryHeap, HashMap, HashSet, VecDeque};

use tokio::time::Instant;

/// Heap entry; ordered by ready instant, then insertion order.
#[derive(Debug, PartialEq, Eq, PartialOrd, Ord)]
struct Waiting {
    ready_at: Instant,
    seq: u64,
    key: String,
}

#[derive(Debug, Default)]
pub(super) struct QueueState {
    ready: VecDeque<String>,
    dirty: HashSet<String>,
    processing: HashSet<String>,
    waiting: BinaryHeap<Reverse<Waiting>>,
    waiting_at: HashMap<String, Instant>,
    waiting_seq: u64,
    pub(super) shutting_down: bool,
}

impl QueueState {
    /// Marks `key` pending. Returns `true` if it became eligible for `pop`.
    pub(super) fn insert(&mut self, key: String) -> bool {
        if self.dirty.contains(&key) || self.waiting_at.contains_key(&key) {
            return false;
        }
        self.dirty.insert(key.clone());
        if self.processing.contains(&key) {
            return false;
        }
        self.ready.push_back(key);
        true
    }

    /// Schedules `key` for `ready_at`, keeping the earlier instant if one exists.
    ///
    /// Returns `true` if the earliest deadline of the queue may have moved.
    pub(super) fn schedule(&mut self, key: String, ready_at: Instant) -> bool {
        if self.dirty.contains(&key) {
            if !self.processing.contains(&key) {
                // Already ready, which is sooner.
                return false;
            }
            self.dirty.remove(&key);
        }
        if let Some(existing) = self.waiting_at.get(&key) {
            if *existing <= ready_at {
                return false;
            }
        }
        self.waiting_at.insert(key.clone(), ready_at);
        self.waiting_seq += 1;
        self.waiting.push(Reverse(Waiting {
            ready_at,
            seq: self.waiting_seq,
            key,
        }));
        true
    }

    /// Moves every waiting key whose instant has passed into the pending set.
    pub(super) fn promote(&mut self, now: Instant) {
        while let Some(Reverse(top)) = self.waiting.peek() {
            if top.ready_at > now {
                break;
            }
            let Some(Reverse(entry)) = self.waiting.pop() else {
                break;
            };
            if self.waiting_at.get(&entry.key) != Some(&entry.ready_at) {
                continue;
            }
            self.waiting_at.remove(&entry.key);
            self.insert(entry.key);
        }
    }

    /// Earliest instant at which a waiting key becomes ready.
    pub(super) fn next_ready_at(&mut self) -> Option<Instant> {
        while let Some(Reverse(top)) = self.waiting.peek() {
            if self.waiting_at.get(&top.key) == Some(&top.ready_at) {
                return Some(top.ready_at);
            }
            self.waiting.pop();
        }
        None
    }

    /// Takes the next ready key and marks it processing.
    pub(super) fn pop(&mut self) -> Option<String> {
        let key = self.ready.pop_front()?;
        self.dirty.remove(&key);
        self.processing.insert(key.clone());
        Some(key)
    }

    /// Clears `key` from processing. Returns `true` if it was re-queued.
    pub(super) fn finish(&mut self, key: &str) -> bool {
        if !self.processing.remove(key) {
            return false;
        }
        if self.dirty.contains(key) {
            self.ready.push_back(key.to_string());
            return true;
        }
        false
    }

    pub(super) fn ready_len(&self) -> usize {
        self.ready.len()
    }

    pub(super) fn waiting_len(&self) -> usize {
        self.waiting_at.len()
    }

    pub(super) fn is_pending(&self, key: &str) -> bool {
        self.dirty.contains(key)
    }

    pub(super) fn is_processing(&self, key: &str) -> bool {
        self.processing.contains(key)
    }
}
