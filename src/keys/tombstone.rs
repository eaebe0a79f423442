//! # Deletion notifications.
//!
//! A watcher that misses a delete event only learns later that the object
//! is gone, and may no longer know its final state. It reports a
//! [`Tombstone`] carrying the key it last saw instead of the object.
//! [`deletion_handling_key`] accepts both kinds of [`Notification`]:
//! live objects are keyed by [`meta_namespace_key`], tombstones by their
//! stored key.
//!
//! # Example
//! ```rust
//! use taskqueue::{deletion_handling_key, Notification, ObjectMeta, Tombstone};
//!
//! struct Pod(&'static str);
//!
//! impl ObjectMeta for Pod {
//!     fn name(&self) -> &str { self.0 }
//!     fn namespace(&self) -> Option<&str> { Some("default") }
//! }
//!
//! let live = Notification::Object(Pod("web"));
//! let gone: Notification<Pod> = Notification::Deleted(Tombstone::new("default/db"));
//!
//! assert_eq!(deletion_handling_key(&live).unwrap(), "default/web");
//! assert_eq!(deletion_handling_key(&gone).unwrap(), "default/db");
//! ```

use std::sync::Arc;

use crate::error::KeyError;
use crate::keys::{meta_namespace_key, KeyFn, ObjectMeta};

/// A deleted object whose final state may be unknown.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Tombstone<T> {
    /// Key the object was last queued under.
    pub key: String,
    /// Last state observed before the deletion, if any.
    pub last_known: Option<T>,
}

impl<T> Tombstone<T> {
    /// Tombstone without a last known state.
    pub fn new(key: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            last_known: None,
        }
    }

    /// Attaches the last observed state.
    pub fn with_last_known(mut self, obj: T) -> Self {
        self.last_known = Some(obj);
        self
    }
}

/// What a watcher hands to `enqueue`: a live object or a tombstone.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Notification<T> {
    /// Added or updated object.
    Object(T),
    /// Deleted object.
    Deleted(Tombstone<T>),
}

/// Keys a notification: the stored key for tombstones, `namespace/name` otherwise.
///
/// An empty tombstone key is rejected with [`KeyError::InvalidKey`].
pub fn deletion_handling_key<T: ObjectMeta>(n: &Notification<T>) -> Result<String, KeyError> {
    match n {
        Notification::Object(obj) => meta_namespace_key(obj),
        Notification::Deleted(t) if t.key.is_empty() => Err(KeyError::InvalidKey {
            key: String::new(),
        }),
        Notification::Deleted(t) => Ok(t.key.clone()),
    }
}

/// [`deletion_handling_key`] as a [`KeyFn`].
pub fn deletion_handling_key_fn<T: ObjectMeta + 'static>() -> KeyFn<Notification<T>> {
    Arc::new(|n: &Notification<T>| deletion_handling_key(n))
}
