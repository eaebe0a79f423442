//! # Sync handler abstraction and function-backed implementation.
//!
//! - [`SyncHandler`] - trait the dispatcher calls once per dispatched key
//! - [`SyncFn`] - closure-backed implementation
//! - [`SyncRef`] - shared handle (`Arc<dyn SyncHandler>`)

mod handler;
mod sync_fn;

pub use handler::{SyncHandler, SyncRef};
pub use sync_fn::SyncFn;
