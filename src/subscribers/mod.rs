//! # Event subscribers for queues.
//!
//! This module provides the [`Subscribe`] trait, the [`SubscriberSet`]
//! fan-out and (behind the `logging` feature) the built-in [`LogWriter`].
//!
//! ## Architecture
//! ```text
//! Event flow:
//!   Dispatcher ── publish(Event) ──► Bus ──► listener ──► SubscriberSet::emit
//!                                                             │
//!                                       ┌─────────────┬───────┴──────┐
//!                                       ▼             ▼              ▼
//!                                   LogWriter      Metrics        Custom
//!                                (own queue +   (own queue +   (own queue +
//!                                   worker)        worker)        worker)
//! ```

#[cfg(feature = "logging")]
mod log;
mod set;
mod subscriber;

#[cfg(feature = "logging")]
pub use log::LogWriter;
pub(crate) use set::panic_message;
pub use set::SubscriberSet;
pub use subscriber::Subscribe;
