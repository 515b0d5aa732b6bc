//! Reference discovery and `$ref` syntax checks

use crate::openapi::REF_KEY;
use indexmap::IndexSet;
use openapi_normalizer_common::{ComponentCategory, NormalizerError, Result};
use serde_json::Value;
use std::fmt;

const COMPONENTS_PREFIX: &str = "#/components/";

/// File extensions that mark a reference into another document
const EXTERNAL_MARKERS: [&str; 3] = [".yaml", ".yml", ".json"];

/// Parsed `#/components/<category>/<key>` pointer
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Reference {
    pub category: ComponentCategory,
    pub key: String,
}

impl Reference {
    pub fn new(category: ComponentCategory, key: impl Into<String>) -> Self {
        Self {
            category,
            key: key.into(),
        }
    }

    /// Parse a local component reference
    ///
    /// The key is a JSON pointer segment: `~1` decodes to `/` and `~0`
    /// to `~`.
    pub fn parse(reference: &str) -> Result<Self> {
        let invalid = || {
            NormalizerError::InvalidReferenceFormat(format!(
                "`{reference}` does not match #/components/<category>/<key>"
            ))
        };

        let segments: Vec<&str> = reference.split('/').collect();
        let [hash, components, category, key] = segments.as_slice() else {
            return Err(invalid());
        };
        if *hash != "#" || *components != "components" || key.is_empty() {
            return Err(invalid());
        }

        let category = category.parse::<ComponentCategory>().map_err(|_| {
            NormalizerError::InvalidReferenceFormat(format!(
                "`{reference}` names unknown component category `{category}`"
            ))
        })?;

        Ok(Self::new(category, key.replace("~1", "/").replace("~0", "~")))
    }

    /// Whether this reference points at component `key` of `category`
    pub fn targets(&self, category: ComponentCategory, key: &str) -> bool {
        self.category == category && self.key == key
    }
}

impl fmt::Display for Reference {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let key = self.key.replace('~', "~0").replace('/', "~1");
        write!(f, "{COMPONENTS_PREFIX}{}/{key}", self.category)
    }
}

/// Collect every `$ref` string reachable inside `value`
///
/// Duplicates are removed; the first-seen order is kept.
pub fn scan(value: &Value) -> Result<Vec<String>> {
    let mut found = IndexSet::new();
    collect(value, &mut found)?;
    Ok(found.into_iter().collect())
}

fn collect(value: &Value, found: &mut IndexSet<String>) -> Result<()> {
    match value {
        Value::Object(map) => {
            for (field, child) in map {
                if field == REF_KEY {
                    let reference = child.as_str().ok_or_else(|| {
                        NormalizerError::InvalidReferenceFormat(format!(
                            "`$ref` must be a string, found {child}"
                        ))
                    })?;
                    found.insert(reference.to_string());
                } else {
                    collect(child, found)?;
                }
            }
            Ok(())
        }
        Value::Array(items) => items.iter().try_for_each(|item| collect(item, found)),
        _ => Ok(()),
    }
}

/// Check the syntax of a captured reference
///
/// External targets are classified first, so `other.yaml#/...` is reported
/// as unsupported rather than malformed.
pub fn validate(reference: &str) -> Result<()> {
    let external = EXTERNAL_MARKERS
        .iter()
        .any(|marker| reference.contains(marker))
        || reference.contains("://")
        || reference.find('#').is_some_and(|fragment| fragment > 0);
    if external {
        return Err(NormalizerError::UnsupportedReferenceTarget(
            reference.to_string(),
        ));
    }

    if !reference.starts_with("#/") {
        return Err(NormalizerError::InvalidReferenceFormat(format!(
            "`{reference}` must start with `#/`"
        )));
    }

    Ok(())
}
