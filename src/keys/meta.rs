//! # Namespaced identity keys.
//!
//! Resources identified by an optional namespace and a name map to
//! `"<namespace>/<name>"`, or to `"<name>"` for cluster-scoped (namespace-less)
//! objects. [`split_meta_namespace_key`] parses those keys back.
//!
//! # Example
//! ```rust
//! use taskqueue::{meta_namespace_key, split_meta_namespace_key, ObjectMeta};
//!
//! struct Service { ns: String, name: String }
//!
//! impl ObjectMeta for Service {
//!     fn name(&self) -> &str { &self.name }
//!     fn namespace(&self) -> Option<&str> { Some(&self.ns) }
//! }
//!
//! let svc = Service { ns: "default".into(), name: "web".into() };
//! let key = meta_namespace_key(&svc).unwrap();
//! assert_eq!(key, "default/web");
//! assert_eq!(split_meta_namespace_key(&key).unwrap(), (Some("default"), "web"));
//! ```

use crate::error::KeyError;

/// Identity of a namespaced resource.
pub trait ObjectMeta {
    /// Resource name. Must be non-empty to produce a key.
    fn name(&self) -> &str;

    /// Resource namespace; `None` (or empty) for cluster-scoped resources.
    fn namespace(&self) -> Option<&str> {
        None
    }
}

impl<T: ObjectMeta + ?Sized> ObjectMeta for &T {
    fn name(&self) -> &str {
        (**self).name()
    }

    fn namespace(&self) -> Option<&str> {
        (**self).namespace()
    }
}

/// Builds `namespace/name` (or `name` when the namespace is empty).
pub fn meta_namespace_key<T: ObjectMeta + ?Sized>(obj: &T) -> Result<String, KeyError> {
    let name = obj.name();
    if name.is_empty() {
        return Err(KeyError::MissingName);
    }
    match obj.namespace().filter(|ns| !ns.is_empty()) {
        Some(ns) => Ok(format!("{ns}/{name}")),
        None => Ok(name.to_string()),
    }
}

/// Splits a key produced by [`meta_namespace_key`] into `(namespace, name)`.
///
/// Returns [`KeyError::InvalidKey`] when the key has more than one `/` or an
/// empty component.
pub fn split_meta_namespace_key(key: &str) -> Result<(Option<&str>, &str), KeyError> {
    let invalid = || KeyError::InvalidKey {
        key: key.to_string(),
    };

    let mut parts = key.split('/');
    match (parts.next(), parts.next(), parts.next()) {
        (Some(name), None, None) if !name.is_empty() => Ok((None, name)),
        (Some(ns), Some(name), None) if !ns.is_empty() && !name.is_empty() => {
            Ok((Some(ns), name))
        }
        _ => Err(invalid()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Obj {
        ns: Option<&'static str>,
        name: &'static str,
    }

    impl ObjectMeta for Obj {
        fn name(&self) -> &str {
            self.name
        }

        fn namespace(&self) -> Option<&str> {
            self.ns
        }
    }

    #[test]
    fn namespaced_key() {
        let obj = Obj {
            ns: Some("ns"),
            name: "foo",
        };
        assert_eq!(meta_namespace_key(&obj).unwrap(), "ns/foo");
    }

    #[test]
    fn cluster_scoped_key() {
        let obj = Obj {
            ns: None,
            name: "foo",
        };
        assert_eq!(meta_namespace_key(&obj).unwrap(), "foo");

        let obj = Obj {
            ns: Some(""),
            name: "foo",
        };
        assert_eq!(meta_namespace_key(&obj).unwrap(), "foo");
    }

    #[test]
    fn missing_name_is_rejected() {
        let obj = Obj {
            ns: Some("ns"),
            name: "",
        };
        assert_eq!(meta_namespace_key(&obj), Err(KeyError::MissingName));
    }

    #[test]
    fn split_accepts_both_forms() {
        assert_eq!(split_meta_namespace_key("foo").unwrap(), (None, "foo"));
        assert_eq!(
            split_meta_namespace_key("ns/foo").unwrap(),
            (Some("ns"), "foo")
        );
    }

    #[test]
    fn split_rejects_malformed_keys() {
        for key in ["", "/", "ns/", "/foo", "a/b/c"] {
            assert!(
                matches!(
                    split_meta_namespace_key(key),
                    Err(KeyError::InvalidKey { .. })
                ),
                "key {key:?} should be rejected"
            );
        }
    }
}
