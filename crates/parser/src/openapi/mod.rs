//! Typed OpenAPI 3.0.x model and document loader
//!
//! Every object of the specification is a struct that rejects unknown
//! fields (or only accepts `x-` extensions where OpenAPI allows them), so
//! deserializing a document is also validating it.
//!
//! ## Usage
//! ```rust,ignore
//! use openapi_normalizer_parser::openapi::OpenApiParser;
//!
//! let api = OpenApiParser::from_file("petstore.yaml")?.parse()?;
//! println!("{}", api.to_clean_json(false)?);
//! ```

mod extensions;
mod operation;
mod parser;
mod reference;
mod schema;
mod types;

pub use extensions::{ExtensionPolicy, Extensions, FieldPolicy, Strict, XPrefixed};
pub use operation::*;
pub use parser::OpenApiParser;
pub use reference::{Interpolate, RefOr, REF_KEY};
pub use schema::*;
pub use types::*;
