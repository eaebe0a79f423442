//! Error types used by the task queue and its collaborators.
//!
//! This module defines two enums:
//!
//! - [`KeyError`]: a notified object could not be turned into a key.
//! - [`SyncError`]: a sync handler failed for a given key.
//!
//! Neither is ever returned to producers: key errors drop the object, sync
//! errors put the key back on the queue behind a rate limiter. Both provide
//! `as_label` for logs/metrics.

use thiserror::Error;

/// # Errors produced while deriving a key from an object.
///
/// The object is dropped and never retried, since there is no key to retry under.
#[non_exhaustive]
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum KeyError {
    /// Object has no name, so no key can be built.
    #[error("object has no name")]
    MissingName,

    /// Key string is not of the form `name` or `namespace/name`.
    #[error("unexpected key format: {key:?}")]
    InvalidKey {
        /// The offending key.
        key: String,
    },

    /// Custom key function rejected the object.
    #[error("key extraction failed: {reason}")]
    Extract {
        /// Human-readable reason.
        reason: String,
    },
}

impl KeyError {
    /// Convenience constructor for custom key functions.
    pub fn extract(reason: impl Into<String>) -> Self {
        KeyError::Extract {
            reason: reason.into(),
        }
    }

    /// Returns a short stable label (snake_case) for use in logs/metrics.
    ///
    /// # Example
    /// ```
    /// use taskqueue::KeyError;
    ///
    /// assert_eq!(KeyError::MissingName.as_label(), "key_missing_name");
    /// ```
    pub fn as_label(&self) -> &'static str {
        match self {
            KeyError::MissingName => "key_missing_name",
            KeyError::InvalidKey { .. } => "key_invalid",
            KeyError::Extract { .. } => "key_extract_failed",
        }
    }
}

/// # Errors produced by a sync handler.
///
/// Every variant is retried: the dispatcher re-adds the key through the
/// queue's rate limiter and keeps going.
#[non_exhaustive]
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SyncError {
    /// Sync failed; the key will be retried after backoff.
    #[error("sync failed: {error}")]
    Fail {
        /// The underlying error message.
        error: String,
    },

    /// Sync handler panicked; treated like a failure.
    #[error("sync panicked: {reason}")]
    Panicked {
        /// Panic payload, when it was a string.
        reason: String,
    },
}

impl SyncError {
    /// Wraps any displayable error as [`SyncError::Fail`].
    ///
    /// # Example
    /// ```
    /// use taskqueue::SyncError;
    ///
    /// let err = SyncError::fail("connection refused");
    /// assert_eq!(err.to_string(), "sync failed: connection refused");
    /// ```
    pub fn fail(error: impl std::fmt::Display) -> Self {
        SyncError::Fail {
            error: error.to_string(),
        }
    }

    /// Returns a short stable label (snake_case) for use in logs/metrics.
    pub fn as_label(&self) -> &'static str {
        match self {
            SyncError::Fail { .. } => "sync_failed",
            SyncError::Panicked { .. } => "sync_panicked",
        }
    }
}
