//! Schema Object and its helper objects

use super::extensions::{Extensions, Strict, XPrefixed};
use super::reference::{Interpolate, RefOr};
use super::types::ExternalDocs;
use crate::resolver::ResolutionState;
use indexmap::IndexMap;
use openapi_normalizer_common::Result;
use serde::de::Error as _;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Number, Value};

/// JSON data type of a schema
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum JsonType {
    Integer,
    Number,
    String,
    Boolean,
    Array,
    Object,
}

/// Schema definition
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Schema {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub multiple_of: Option<Number>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub maximum: Option<Number>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub exclusive_maximum: Option<bool>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub minimum: Option<Number>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub exclusive_minimum: Option<bool>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_length: Option<u64>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub min_length: Option<u64>,

    /// ECMA 262 regular expression, kept verbatim
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pattern: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_items: Option<u64>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub min_items: Option<u64>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub unique_items: Option<bool>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_properties: Option<u64>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub min_properties: Option<u64>,

    /// Required property names (for object type)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub required: Option<Vec<String>>,

    #[serde(rename = "enum")]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub enum_values: Option<Vec<Value>>,

    #[serde(rename = "type")]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub schema_type: Option<JsonType>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub all_of: Option<Vec<RefOr<Schema>>>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub one_of: Option<Vec<RefOr<Schema>>>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub any_of: Option<Vec<RefOr<Schema>>>,

    #[serde(rename = "not")]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub not: Option<Box<RefOr<Schema>>>,

    /// Items schema (for array type)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub items: Option<Box<RefOr<Schema>>>,

    /// Properties (for object type)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub properties: Option<IndexMap<String, RefOr<Schema>>>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub additional_properties: Option<AdditionalProperties>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub format: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub default: Option<Value>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub nullable: Option<bool>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub discriminator: Option<Discriminator>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub read_only: Option<bool>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub write_only: Option<bool>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub xml: Option<Xml>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub external_docs: Option<ExternalDocs>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub example: Option<Value>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub deprecated: Option<bool>,

    #[serde(flatten)]
    #[serde(skip_serializing_if = "Extensions::is_empty")]
    pub extensions: Extensions<XPrefixed>,
}

impl Interpolate for Schema {
    fn interpolate(&mut self, state: &ResolutionState) -> Result<()> {
        self.all_of.interpolate(state)?;
        self.one_of.interpolate(state)?;
        self.any_of.interpolate(state)?;
        self.not.interpolate(state)?;
        self.items.interpolate(state)?;
        self.properties.interpolate(state)?;
        self.additional_properties.interpolate(state)
    }
}

/// `additionalProperties`: a boolean switch or a schema
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum AdditionalProperties {
    Allowed(bool),
    Schema(Box<RefOr<Schema>>),
}

impl<'de> Deserialize<'de> for AdditionalProperties {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        match Value::deserialize(deserializer)? {
            Value::Bool(allowed) => Ok(AdditionalProperties::Allowed(allowed)),
            value => RefOr::<Schema>::deserialize(value)
                .map(|schema| AdditionalProperties::Schema(Box::new(schema)))
                .map_err(D::Error::custom),
        }
    }
}

impl Interpolate for AdditionalProperties {
    fn interpolate(&mut self, state: &ResolutionState) -> Result<()> {
        match self {
            AdditionalProperties::Allowed(_) => Ok(()),
            AdditionalProperties::Schema(schema) => schema.interpolate(state),
        }
    }
}

/// Polymorphism hint for `oneOf`/`anyOf` payloads
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Discriminator {
    pub property_name: String,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub mapping: Option<IndexMap<String, String>>,

    #[serde(flatten)]
    #[serde(skip_serializing_if = "Extensions::is_empty")]
    pub extensions: Extensions<Strict>,
}

/// XML representation metadata
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Xml {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub namespace: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub prefix: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub attribute: Option<bool>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub wrapped: Option<bool>,

    #[serde(flatten)]
    #[serde(skip_serializing_if = "Extensions::is_empty")]
    pub extensions: Extensions<Strict>,
}
