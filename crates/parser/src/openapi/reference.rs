//! Reference objects and `$ref` substitution
//!
//! Any position of the model that may hold a Reference Object is typed as
//! [`RefOr<T>`]. [`Interpolate`] walks a typed value and replaces every
//! reference with the already-resolved target read from a
//! [`ResolutionState`].

use crate::resolver::{Component, ResolutionState};
use indexmap::IndexMap;
use openapi_normalizer_common::Result;
use serde::de::{DeserializeOwned, Error as _};
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

/// Key of a Reference Object
pub const REF_KEY: &str = "$ref";

/// A Reference Object or an inline value
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum RefOr<T> {
    /// `{"$ref": "#/components/<category>/<key>"}`
    Reference {
        #[serde(rename = "$ref")]
        reference: String,
    },

    /// Inline object
    Item(T),
}

impl<T> RefOr<T> {
    pub fn reference(reference: impl Into<String>) -> Self {
        RefOr::Reference {
            reference: reference.into(),
        }
    }

    pub fn as_item(&self) -> Option<&T> {
        match self {
            RefOr::Item(item) => Some(item),
            RefOr::Reference { .. } => None,
        }
    }

    pub fn as_reference(&self) -> Option<&str> {
        match self {
            RefOr::Reference { reference } => Some(reference),
            RefOr::Item(_) => None,
        }
    }
}

impl<T: Default> Default for RefOr<T> {
    fn default() -> Self {
        RefOr::Item(T::default())
    }
}

// A map carrying `$ref` is always a reference. Sibling keys are ignored, as
// OpenAPI 3.0 mandates. Inline values keep their own error messages instead
// of the generic untagged-enum failure.
impl<'de, T: DeserializeOwned> Deserialize<'de> for RefOr<T> {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        let value = Value::deserialize(deserializer)?;
        if let Some(reference) = value.get(REF_KEY) {
            let reference = reference
                .as_str()
                .ok_or_else(|| D::Error::custom("`$ref` must be a string"))?;
            return Ok(RefOr::reference(reference));
        }
        T::deserialize(value)
            .map(RefOr::Item)
            .map_err(D::Error::custom)
    }
}

/// Substitution of `$ref` leaves by resolved components
pub trait Interpolate {
    /// Replace every reference below `self` with its resolved target
    ///
    /// References listed as self-references are kept as pointers.
    fn interpolate(&mut self, state: &ResolutionState) -> Result<()>;
}

impl<T: Component> Interpolate for RefOr<T> {
    fn interpolate(&mut self, state: &ResolutionState) -> Result<()> {
        match self {
            RefOr::Item(item) => item.interpolate(state),
            RefOr::Reference { reference } => {
                if state.is_self_reference(reference) {
                    return Ok(());
                }
                let target = state.lookup::<T>(reference)?.clone();
                *self = target;
                Ok(())
            }
        }
    }
}

impl<T: Interpolate> Interpolate for Option<T> {
    fn interpolate(&mut self, state: &ResolutionState) -> Result<()> {
        match self {
            Some(value) => value.interpolate(state),
            None => Ok(()),
        }
    }
}

impl<T: Interpolate> Interpolate for Box<T> {
    fn interpolate(&mut self, state: &ResolutionState) -> Result<()> {
        self.as_mut().interpolate(state)
    }
}

impl<T: Interpolate> Interpolate for Vec<T> {
    fn interpolate(&mut self, state: &ResolutionState) -> Result<()> {
        self.iter_mut().try_for_each(|value| value.interpolate(state))
    }
}

impl<K, T: Interpolate> Interpolate for IndexMap<K, T> {
    fn interpolate(&mut self, state: &ResolutionState) -> Result<()> {
        self.values_mut().try_for_each(|value| value.interpolate(state))
    }
}
