//! Reference resolution for OpenAPI 3.0.x documents
//!
//! This crate turns an OpenAPI document whose reusable objects point at
//! each other through `$ref` into a self-contained typed model where every
//! local reference has been replaced by the object it designates.
//!
//! ## Resolution Strategy
//!
//! Only `#/components/<category>/<key>` pointers are followed:
//! - Components without references are validated first
//! - The remaining ones are promoted round by round as their targets resolve
//! - A round that promotes nothing means a cycle or a missing target
//! - References back to the component that holds them stay pointers
//!
//! Once `components` is resolved the whole document is validated against
//! the typed model and `paths` is interpolated with the resolved components.

pub mod openapi;
pub mod resolver;

pub use openapi::{OpenApi, OpenApiParser};
pub use resolver::{ComponentsResolver, ResolutionState};

use openapi_normalizer_common::Result;
use serde_json::Value;
use std::path::Path;

/// Read an OpenAPI document from disk into a raw tree
///
/// # Arguments
/// * `path` - `.json` files are parsed as JSON, anything else as YAML
pub fn load_spec<P: AsRef<Path>>(path: P) -> Result<Value> {
    OpenApiParser::from_file(path).map(OpenApiParser::into_raw)
}

/// Load, resolve and validate an OpenAPI document from disk
pub fn load_api<P: AsRef<Path>>(path: P) -> Result<OpenApi> {
    OpenApiParser::from_file(path)?.parse()
}

/// Resolve and validate an already loaded document tree
pub fn load_api_from_value(raw_api: Value) -> Result<OpenApi> {
    OpenApiParser::from_value(raw_api).parse()
}
