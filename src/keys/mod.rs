//! # Keys: turning notified objects into queue keys.
//!
//! The queue only ever stores strings. Producers hand it arbitrary objects,
//! and a [`KeyFn`] decides which logical resource each object belongs to.
//!
//! ## Contents
//! - [`ObjectMeta`] minimal identity (namespace + name) of a resource
//! - [`meta_namespace_key`] default key function: `namespace/name` or `name`
//! - [`split_meta_namespace_key`] the inverse, for use inside sync handlers
//! - [`Notification`] / [`Tombstone`] live object or deletion with a stored key
//! - [`deletion_handling_key`] keys both, for watchers that report tombstones
//! - [`KeyFn`] shared key-function handle passed to the queue builder

mod key_fn;
mod meta;
mod tombstone;

pub use key_fn::{key_fn, meta_key_fn, KeyFn};
pub use meta::{meta_namespace_key, split_meta_namespace_key, ObjectMeta};
pub use tombstone::{deletion_handling_key, deletion_handling_key_fn, Notification, Tombstone};
