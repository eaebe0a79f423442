use std::sync::Arc;

use async_trait::async_trait;

use crate::error::SyncError;

/// Shared handle to a sync handler.
pub type SyncRef = Arc<dyn SyncHandler>;

/// # Idempotent processing of one key.
///
/// The dispatcher calls [`sync`](SyncHandler::sync) with a key it has moved
/// into the active set; no other call for the same key overlaps it.
/// `Ok(())` resets the key's backoff, `Err` re-enqueues it behind the rate
/// limiter. Panics are caught and treated as [`SyncError::Panicked`].
///
/// # Example
/// ```
/// use async_trait::async_trait;
/// use taskqueue::{SyncError, SyncHandler};
///
/// struct Reconcile;
///
/// #[async_trait]
/// impl SyncHandler for Reconcile {
///     async fn sync(&self, key: &str) -> Result<(), SyncError> {
///         if key.is_empty() {
///             return Err(SyncError::fail("empty key"));
///         }
///         Ok(())
///     }
/// }
/// ```
#[async_trait]
pub trait SyncHandler: Send + Sync + 'static {
    /// Brings the resource identified by `key` to its desired state.
    async fn sync(&self, key: &str) -> Result<(), SyncError>;
}
