//! Queue core: dispatch and lifecycle.
//!
//! The public API from this module is [`TaskQueue`], [`Worker`],
//! [`TaskQueueBuilder`] and [`QueueConfig`].
//!
//! Internal modules:
//! - [`dispatcher`]: the worker loop; runs one sync per key and applies the retry protocol;
//! - [`task_queue`]: the enqueue / shutdown façade and the completion signal;
//! - [`builder`]: wires queue, bus, subscribers and worker together.

mod builder;
mod config;
mod dispatcher;
mod task_queue;

pub use builder::TaskQueueBuilder;
pub use config::QueueConfig;
pub use task_queue::{TaskQueue, Worker};
