//! # Shared key-function handle.
//!
//! [`KeyFn`] is the type the queue stores. Build one from a closure with
//! [`key_fn`], or take the namespaced default with [`meta_key_fn`].

use std::sync::Arc;

use crate::error::KeyError;
use crate::keys::meta::{meta_namespace_key, ObjectMeta};

/// Maps an object to its queue key.
pub type KeyFn<T> = Arc<dyn Fn(&T) -> Result<String, KeyError> + Send + Sync>;

/// Wraps a closure as a [`KeyFn`].
///
/// ## Example
/// ```rust
/// use taskqueue::{key_fn, KeyError, KeyFn};
///
/// let f: KeyFn<u32> = key_fn(|n: &u32| {
///     if *n == 0 {
///         return Err(KeyError::extract("zero has no key"));
///     }
///     Ok(format!("item-{n}"))
/// });
/// assert_eq!(f(&7).unwrap(), "item-7");
/// assert!(f(&0).is_err());
/// ```
pub fn key_fn<T, F>(f: F) -> KeyFn<T>
where
    F: Fn(&T) -> Result<String, KeyError> + Send + Sync + 'static,
{
    Arc::new(f)
}

/// Default key function for [`ObjectMeta`] types (see [`meta_namespace_key`]).
pub fn meta_key_fn<T: ObjectMeta + 'static>() -> KeyFn<T> {
    Arc::new(|obj: &T| meta_namespace_key(obj))
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Named(&'static str);

    impl ObjectMeta for Named {
        fn name(&self) -> &str {
            self.0
        }
    }

    #[test]
    fn meta_key_fn_uses_name() {
        let f = meta_key_fn::<Named>();
        assert_eq!(f(&Named("foo")).unwrap(), "foo");
        assert_eq!(f(&Named("")), Err(KeyError::MissingName));
    }
}
