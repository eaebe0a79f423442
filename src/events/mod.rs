//! Queue events: types and broadcast bus.
//!
//! ## Contents
//! - [`EventKind`], [`Event`] event classification and payload metadata
//! - [`Bus`] thin wrapper over `tokio::sync::broadcast`
//!
//! ## Quick reference
//! - **Publishers**: `TaskQueue::enqueue` / `shutdown`, the dispatcher,
//!   `SubscriberSet` workers (overflow/panic).
//! - **Consumer**: the listener spawned by `TaskQueueBuilder::build`, which
//!   fans out to the `SubscriberSet`.

mod bus;
mod event;

pub use bus::Bus;
pub use event::{Event, EventKind};
