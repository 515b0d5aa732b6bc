//! Path, operation and component object definitions
//!
//! These are the objects that can appear under `paths` and under the
//! eight resolvable `components` categories.

use super::extensions::{Extensions, Strict, XPrefixed};
use super::reference::{Interpolate, RefOr};
use super::schema::Schema;
use super::types::{ExternalDocs, SecurityRequirement, Server};
use crate::resolver::ResolutionState;
use indexmap::IndexMap;
use openapi_normalizer_common::Result;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::borrow::Borrow;
use std::fmt;

/// Operations available on a single path
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PathItem {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub summary: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub get: Option<Operation>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub put: Option<Operation>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub post: Option<Operation>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub delete: Option<Operation>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub options: Option<Operation>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub head: Option<Operation>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub patch: Option<Operation>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub trace: Option<Operation>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub servers: Option<Vec<Server>>,

    /// Parameters shared by every operation on this path
    #[serde(skip_serializing_if = "Option::is_none")]
    pub parameters: Option<Vec<RefOr<Parameter>>>,

    #[serde(flatten)]
    #[serde(skip_serializing_if = "Extensions::is_empty")]
    pub extensions: Extensions<XPrefixed>,
}

impl PathItem {
    /// Operations declared on this path, paired with their HTTP method
    pub fn operations(&self) -> impl Iterator<Item = (&'static str, &Operation)> {
        [
            ("get", &self.get),
            ("put", &self.put),
            ("post", &self.post),
            ("delete", &self.delete),
            ("options", &self.options),
            ("head", &self.head),
            ("patch", &self.patch),
            ("trace", &self.trace),
        ]
        .into_iter()
        .filter_map(|(method, op)| op.as_ref().map(|op| (method, op)))
    }
}

impl Interpolate for PathItem {
    fn interpolate(&mut self, state: &ResolutionState) -> Result<()> {
        for op in [
            &mut self.get,
            &mut self.put,
            &mut self.post,
            &mut self.delete,
            &mut self.options,
            &mut self.head,
            &mut self.patch,
            &mut self.trace,
        ] {
            op.interpolate(state)?;
        }
        self.parameters.interpolate(state)
    }
}

/// HTTP operation
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Operation {
    /// Tags (for grouping)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tags: Option<Vec<String>>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub summary: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub external_docs: Option<ExternalDocs>,

    /// Operation ID (unique identifier)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub operation_id: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub parameters: Option<Vec<RefOr<Parameter>>>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub request_body: Option<RefOr<RequestBody>>,

    pub responses: IndexMap<StatusCode, RefOr<Response>>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub callbacks: Option<IndexMap<String, RefOr<Callback>>>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub deprecated: Option<bool>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub security: Option<Vec<SecurityRequirement>>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub servers: Option<Vec<Server>>,

    #[serde(flatten)]
    #[serde(skip_serializing_if = "Extensions::is_empty")]
    pub extensions: Extensions<XPrefixed>,
}

impl Interpolate for Operation {
    fn interpolate(&mut self, state: &ResolutionState) -> Result<()> {
        self.parameters.interpolate(state)?;
        self.request_body.interpolate(state)?;
        self.responses.interpolate(state)?;
        self.callbacks.interpolate(state)
    }
}

/// Key of an operation's `responses` map
///
/// Either `default`, an HTTP status code between 100 and 599, or a range
/// such as `2XX`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct StatusCode(String);

impl StatusCode {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl TryFrom<String> for StatusCode {
    type Error = String;

    fn try_from(code: String) -> std::result::Result<Self, Self::Error> {
        let valid = match code.as_bytes() {
            b"default" => true,
            [b'1'..=b'5', b'X', b'X'] => true,
            [b'1'..=b'5', tens, units] => tens.is_ascii_digit() && units.is_ascii_digit(),
            _ => false,
        };
        if valid {
            Ok(StatusCode(code))
        } else {
            Err(format!("invalid response status code `{code}`"))
        }
    }
}

// Response maps can be indexed with `&str` keys.
impl Borrow<str> for StatusCode {
    fn borrow(&self) -> &str {
        &self.0
    }
}

impl From<StatusCode> for String {
    fn from(code: StatusCode) -> Self {
        code.0
    }
}

impl fmt::Display for StatusCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Location of a parameter
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ParameterLocation {
    Query,
    Header,
    Path,
    Cookie,
}

/// Parameter definition
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Parameter {
    pub name: String,

    /// Location: query, header, path, cookie
    #[serde(rename = "in")]
    pub location: ParameterLocation,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub required: Option<bool>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub deprecated: Option<bool>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub allow_empty_value: Option<bool>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub style: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub explode: Option<bool>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub allow_reserved: Option<bool>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub schema: Option<RefOr<Schema>>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub example: Option<Value>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub examples: Option<IndexMap<String, RefOr<Example>>>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub content: Option<IndexMap<String, MediaType>>,

    #[serde(flatten)]
    #[serde(skip_serializing_if = "Extensions::is_empty")]
    pub extensions: Extensions<Strict>,
}

impl Interpolate for Parameter {
    fn interpolate(&mut self, state: &ResolutionState) -> Result<()> {
        self.schema.interpolate(state)?;
        self.examples.interpolate(state)?;
        self.content.interpolate(state)
    }
}

/// Request body
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RequestBody {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    /// Content types
    #[serde(skip_serializing_if = "Option::is_none")]
    pub content: Option<IndexMap<String, MediaType>>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub required: Option<bool>,

    #[serde(flatten)]
    #[serde(skip_serializing_if = "Extensions::is_empty")]
    pub extensions: Extensions<Strict>,
}

impl Interpolate for RequestBody {
    fn interpolate(&mut self, state: &ResolutionState) -> Result<()> {
        self.content.interpolate(state)
    }
}

/// Media type
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MediaType {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub schema: Option<RefOr<Schema>>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub example: Option<Value>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub examples: Option<IndexMap<String, RefOr<Example>>>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub encoding: Option<IndexMap<String, Encoding>>,

    #[serde(flatten)]
    #[serde(skip_serializing_if = "Extensions::is_empty")]
    pub extensions: Extensions<XPrefixed>,
}

impl Interpolate for MediaType {
    fn interpolate(&mut self, state: &ResolutionState) -> Result<()> {
        self.schema.interpolate(state)?;
        self.examples.interpolate(state)?;
        self.encoding.interpolate(state)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Encoding {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub content_type: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub headers: Option<IndexMap<String, RefOr<Header>>>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub style: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub explode: Option<bool>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub allow_reserved: Option<bool>,

    #[serde(flatten)]
    #[serde(skip_serializing_if = "Extensions::is_empty")]
    pub extensions: Extensions<Strict>,
}

impl Interpolate for Encoding {
    fn interpolate(&mut self, state: &ResolutionState) -> Result<()> {
        self.headers.interpolate(state)
    }
}

/// Response
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Response {
    pub description: String,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub headers: Option<IndexMap<String, RefOr<Header>>>,

    /// Content types
    #[serde(skip_serializing_if = "Option::is_none")]
    pub content: Option<IndexMap<String, MediaType>>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub links: Option<IndexMap<String, RefOr<Link>>>,

    #[serde(flatten)]
    #[serde(skip_serializing_if = "Extensions::is_empty")]
    pub extensions: Extensions<Strict>,
}

impl Interpolate for Response {
    fn interpolate(&mut self, state: &ResolutionState) -> Result<()> {
        self.headers.interpolate(state)?;
        self.content.interpolate(state)?;
        self.links.interpolate(state)
    }
}

/// Header: a parameter without `name` and `in`
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Header {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub required: Option<bool>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub deprecated: Option<bool>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub allow_empty_value: Option<bool>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub style: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub explode: Option<bool>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub schema: Option<RefOr<Schema>>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub example: Option<Value>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub examples: Option<IndexMap<String, RefOr<Example>>>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub content: Option<IndexMap<String, MediaType>>,

    #[serde(flatten)]
    #[serde(skip_serializing_if = "Extensions::is_empty")]
    pub extensions: Extensions<Strict>,
}

impl Interpolate for Header {
    fn interpolate(&mut self, state: &ResolutionState) -> Result<()> {
        self.schema.interpolate(state)?;
        self.examples.interpolate(state)?;
        self.content.interpolate(state)
    }
}

/// Example value
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Example {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub summary: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub value: Option<Value>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub external_value: Option<String>,

    #[serde(flatten)]
    #[serde(skip_serializing_if = "Extensions::is_empty")]
    pub extensions: Extensions<XPrefixed>,
}

// Example payloads are opaque data.
impl Interpolate for Example {
    fn interpolate(&mut self, _state: &ResolutionState) -> Result<()> {
        Ok(())
    }
}

/// Design-time link between a response and another operation
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Link {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub operation_ref: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub operation_id: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub parameters: Option<IndexMap<String, Value>>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub request_body: Option<Value>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub server: Option<Server>,

    #[serde(flatten)]
    #[serde(skip_serializing_if = "Extensions::is_empty")]
    pub extensions: Extensions<Strict>,
}

impl Interpolate for Link {
    fn interpolate(&mut self, _state: &ResolutionState) -> Result<()> {
        Ok(())
    }
}

/// Callback: runtime expression to path item
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Callback(pub IndexMap<String, PathItem>);

impl Interpolate for Callback {
    fn interpolate(&mut self, state: &ResolutionState) -> Result<()> {
        self.0.interpolate(state)
    }
}
