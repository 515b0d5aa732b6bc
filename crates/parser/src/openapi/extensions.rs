//! Extra-field policy for OpenAPI objects
//!
//! Every typed object flattens its unknown keys into an [`Extensions`] map.
//! The map's policy marker decides, while the object is deserialized,
//! whether such keys are rejected outright or accepted as `x-` extensions.

use indexmap::IndexMap;
use serde::de::Error as _;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::Value;
use std::fmt;
use std::marker::PhantomData;

/// How an object kind treats keys it does not declare
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldPolicy {
    /// Any undeclared key is an error
    Strict,

    /// Undeclared keys must start with the given prefix
    AllowPrefixed(&'static str),
}

impl FieldPolicy {
    /// Check a single undeclared key against the policy
    pub fn check(&self, field: &str) -> Result<(), String> {
        match self {
            FieldPolicy::Strict => Err(format!("unknown field `{field}`")),
            FieldPolicy::AllowPrefixed(prefix) if field.starts_with(prefix) => Ok(()),
            FieldPolicy::AllowPrefixed(prefix) => Err(format!(
                "unknown field `{field}` (extension fields must start with `{prefix}`)"
            )),
        }
    }
}

/// Type-level carrier of a [`FieldPolicy`]
pub trait ExtensionPolicy {
    const POLICY: FieldPolicy;
}

/// Objects that accept no undeclared keys
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Strict;

impl ExtensionPolicy for Strict {
    const POLICY: FieldPolicy = FieldPolicy::Strict;
}

/// Objects open to `x-` specification extensions
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct XPrefixed;

impl ExtensionPolicy for XPrefixed {
    const POLICY: FieldPolicy = FieldPolicy::AllowPrefixed("x-");
}

/// Undeclared keys of an object, validated against policy `P`
#[derive(Clone, PartialEq)]
pub struct Extensions<P = XPrefixed> {
    fields: IndexMap<String, Value>,
    policy: PhantomData<P>,
}

impl<P> Extensions<P> {
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn get(&self, field: &str) -> Option<&Value> {
        self.fields.get(field)
    }
}

impl<P> Default for Extensions<P> {
    fn default() -> Self {
        Self {
            fields: IndexMap::new(),
            policy: PhantomData,
        }
    }
}

impl<P> fmt::Debug for Extensions<P> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_map().entries(self.fields.iter()).finish()
    }
}

impl<P> Serialize for Extensions<P> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_map(self.fields.iter())
    }
}

impl<'de, P: ExtensionPolicy> Deserialize<'de> for Extensions<P> {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let fields = IndexMap::<String, Value>::deserialize(deserializer)?;
        for field in fields.keys() {
            P::POLICY.check(field).map_err(D::Error::custom)?;
        }
        Ok(Self {
            fields,
            policy: PhantomData,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[derive(Debug, Deserialize)]
    struct Open {
        #[allow(dead_code)]
        name: String,
        #[serde(flatten)]
        extensions: Extensions<XPrefixed>,
    }

    #[derive(Debug, Deserialize)]
    struct Closed {
        #[allow(dead_code)]
        name: String,
        #[serde(flatten)]
        #[allow(dead_code)]
        extensions: Extensions<Strict>,
    }

    #[test]
    fn test_policy_check() {
        assert!(FieldPolicy::Strict.check("x-custom").is_err());
        assert!(FieldPolicy::AllowPrefixed("x-").check("x-custom").is_ok());
        assert!(FieldPolicy::AllowPrefixed("x-").check("custom").is_err());
    }

    #[test]
    fn test_prefixed_extensions_are_collected() {
        let open: Open = serde_json::from_value(json!({"name": "a", "x-internal": true})).unwrap();
        assert_eq!(open.extensions.len(), 1);
        assert_eq!(open.extensions.get("x-internal"), Some(&json!(true)));
    }

    #[test]
    fn test_unprefixed_field_is_rejected() {
        let err = serde_json::from_value::<Open>(json!({"name": "a", "internal": true}))
            .unwrap_err()
            .to_string();
        assert!(err.contains("unknown field `internal`"), "{err}");
    }

    #[test]
    fn test_strict_rejects_extensions() {
        assert!(serde_json::from_value::<Closed>(json!({"name": "a"})).is_ok());
        assert!(serde_json::from_value::<Closed>(json!({"name": "a", "x-a": 1})).is_err());
    }
}
