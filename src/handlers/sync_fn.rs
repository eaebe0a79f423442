//! # Function-backed sync handler (`SyncFn`)
//!
//! [`SyncFn`] wraps a closure `F: Fn(String) -> Fut`, producing a fresh
//! future per dispatched key. Shared state goes in an explicit `Arc<...>`
//! captured by the closure.
//!
//! ## Example
//! ```rust
//! use taskqueue::{SyncError, SyncFn, SyncRef};
//!
//! let h: SyncRef = SyncFn::arc(|key: String| async move {
//!     if key.starts_with("broken/") {
//!         return Err(SyncError::fail("upstream rejected"));
//!     }
//!     Ok(())
//! });
//! # let _ = h;
//! ```

use std::future::Future;
use std::sync::Arc;

use async_trait::async_trait;

use crate::error::SyncError;
use crate::handlers::SyncHandler;

/// Function-backed sync handler.
#[derive(Debug)]
pub struct SyncFn<F> {
    f: F,
}

impl<F> SyncFn<F> {
    /// Creates a new function-backed handler.
    ///
    /// Prefer [`SyncFn::arc`] when you immediately need a [`SyncRef`](crate::SyncRef).
    pub fn new(f: F) -> Self {
        Self { f }
    }

    /// Creates the handler and returns it as a shared handle.
    pub fn arc(f: F) -> Arc<Self> {
        Arc::new(Self::new(f))
    }
}

#[async_trait]
impl<F, Fut> SyncHandler for SyncFn<F>
where
    F: Fn(String) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Result<(), SyncError>> + Send + 'static,
{
    async fn sync(&self, key: &str) -> Result<(), SyncError> {
        (self.f)(key.to_owned()).await
    }
}
