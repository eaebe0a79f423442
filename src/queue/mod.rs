//! Deduplicating work queue.
//!
//! [`DedupQueue`] is the shared structure between producers (`add*`) and the
//! single dispatcher (`get` / `done` / `forget`). See `dedup.rs` for the
//! contract and `state.rs` for the pending/processing bookkeeping.

mod dedup;
mod state;

pub use dedup::DedupQueue;
