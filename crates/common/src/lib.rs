//! Common types and utilities for the OpenAPI Normalizer
//!
//! This crate contains the error taxonomy, the component categories that
//! define the resolution namespaces, and the supported OpenAPI versions.
//! It is shared by the parser and CLI crates.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Errors that can occur while loading, resolving or validating a document
#[derive(Error, Debug)]
pub enum NormalizerError {
    /// A `$ref` does not have the `#/components/<category>/<key>` shape
    #[error("Invalid reference format: {0}")]
    InvalidReferenceFormat(String),

    /// A `$ref` points to another file or URL
    #[error("Unsupported reference target (external references are not resolved): {0}")]
    UnsupportedReferenceTarget(String),

    /// A well-formed `$ref` whose target never becomes available
    #[error("Reference not found: {0}")]
    ReferenceNotFound(String),

    /// A consolidation round made no progress
    #[error("Cyclic or unresolvable references in {category}: {}", .keys.join(", "))]
    CyclicOrUnresolvableReference {
        category: ComponentCategory,
        keys: Vec<String>,
    },

    /// The typed layer rejected an object
    #[error("Validation error at {location}: {message}")]
    Validation { location: String, message: String },

    #[error("Unsupported OpenAPI version: {0}")]
    UnsupportedVersion(String),

    #[error("Parse error: {0}")]
    Parse(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),
}

impl NormalizerError {
    /// Build a validation error for the object at `location`
    pub fn validation(location: impl Into<String>, message: impl fmt::Display) -> Self {
        NormalizerError::Validation {
            location: location.into(),
            message: message.to_string(),
        }
    }
}

/// Result type for normalizer operations
pub type Result<T> = std::result::Result<T, NormalizerError>;

/// Kind of reusable component declared under `components`
///
/// Each category is an independent resolution namespace. The declaration
/// order is the order in which the resolution engine consolidates them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ComponentCategory {
    Schemas,
    Headers,
    Responses,
    Parameters,
    Examples,
    RequestBodies,
    Links,
    Callbacks,
}

impl ComponentCategory {
    /// All categories, in consolidation order
    pub const ALL: [ComponentCategory; 8] = [
        ComponentCategory::Schemas,
        ComponentCategory::Headers,
        ComponentCategory::Responses,
        ComponentCategory::Parameters,
        ComponentCategory::Examples,
        ComponentCategory::RequestBodies,
        ComponentCategory::Links,
        ComponentCategory::Callbacks,
    ];

    /// Key used for this category under `components` and inside `$ref` paths
    pub fn as_str(&self) -> &'static str {
        match self {
            ComponentCategory::Schemas => "schemas",
            ComponentCategory::Headers => "headers",
            ComponentCategory::Responses => "responses",
            ComponentCategory::Parameters => "parameters",
            ComponentCategory::Examples => "examples",
            ComponentCategory::RequestBodies => "requestBodies",
            ComponentCategory::Links => "links",
            ComponentCategory::Callbacks => "callbacks",
        }
    }
}

impl fmt::Display for ComponentCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ComponentCategory {
    type Err = NormalizerError;

    fn from_str(s: &str) -> Result<Self> {
        ComponentCategory::ALL
            .into_iter()
            .find(|category| category.as_str() == s)
            .ok_or_else(|| {
                NormalizerError::InvalidReferenceFormat(format!("unknown component category `{s}`"))
            })
    }
}

/// Supported OpenAPI versions
///
/// Every 3.0.x patch release is validated with the same typed model.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum OpenApiVersion {
    #[serde(rename = "3.0.0")]
    V3_0_0,
    #[serde(rename = "3.0.1")]
    V3_0_1,
    #[serde(rename = "3.0.2")]
    V3_0_2,
    #[serde(rename = "3.0.3")]
    V3_0_3,
}

impl OpenApiVersion {
    pub const ALL: [OpenApiVersion; 4] = [
        OpenApiVersion::V3_0_0,
        OpenApiVersion::V3_0_1,
        OpenApiVersion::V3_0_2,
        OpenApiVersion::V3_0_3,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            OpenApiVersion::V3_0_0 => "3.0.0",
            OpenApiVersion::V3_0_1 => "3.0.1",
            OpenApiVersion::V3_0_2 => "3.0.2",
            OpenApiVersion::V3_0_3 => "3.0.3",
        }
    }
}

impl fmt::Display for OpenApiVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for OpenApiVersion {
    type Err = NormalizerError;

    fn from_str(s: &str) -> Result<Self> {
        OpenApiVersion::ALL
            .into_iter()
            .find(|version| version.as_str() == s)
            .ok_or_else(|| NormalizerError::UnsupportedVersion(s.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_category_round_trips_through_wire_name() {
        for category in ComponentCategory::ALL {
            assert_eq!(category.as_str().parse::<ComponentCategory>().unwrap(), category);
        }
        assert_eq!(ComponentCategory::RequestBodies.to_string(), "requestBodies");
    }

    #[test]
    fn test_unknown_category_is_format_error() {
        let err = "securitySchemes".parse::<ComponentCategory>().unwrap_err();
        assert!(matches!(err, NormalizerError::InvalidReferenceFormat(_)));
    }

    #[test]
    fn test_version_parsing() {
        assert_eq!("3.0.2".parse::<OpenApiVersion>().unwrap(), OpenApiVersion::V3_0_2);
        assert!(matches!(
            "3.1.0".parse::<OpenApiVersion>(),
            Err(NormalizerError::UnsupportedVersion(v)) if v == "3.1.0"
        ));
    }

    #[test]
    fn test_cycle_error_lists_keys() {
        let err = NormalizerError::CyclicOrUnresolvableReference {
            category: ComponentCategory::Schemas,
            keys: vec!["A".to_string(), "B".to_string()],
        };
        assert_eq!(
            err.to_string(),
            "Cyclic or unresolvable references in schemas: A, B"
        );
    }
}
