//! OpenAPI 3.0.x document-level type definitions

use super::extensions::{Extensions, Strict, XPrefixed};
use super::operation::{Callback, Example, Header, Link, Parameter, PathItem, RequestBody, Response};
use super::reference::{Interpolate, RefOr};
use super::schema::Schema;
use crate::resolver::{Component, ResolutionState};
use indexmap::IndexMap;
use openapi_normalizer_common::{OpenApiVersion, Result};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Relative paths to the individual endpoints
pub type Paths = IndexMap<String, PathItem>;

/// Security scheme name to required scopes
pub type SecurityRequirement = IndexMap<String, Vec<String>>;

/// OpenAPI document root
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OpenApi {
    /// OpenAPI version (e.g., "3.0.2")
    pub openapi: OpenApiVersion,

    /// API metadata
    pub info: Info,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub servers: Option<Vec<Server>>,

    /// API paths (endpoints)
    pub paths: Paths,

    /// Reusable components
    #[serde(skip_serializing_if = "Option::is_none")]
    pub components: Option<Components>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub security: Option<Vec<SecurityRequirement>>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub tags: Option<Vec<Tag>>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub external_docs: Option<ExternalDocs>,

    #[serde(flatten)]
    #[serde(skip_serializing_if = "Extensions::is_empty")]
    pub extensions: Extensions<XPrefixed>,

    /// Raw document the typed model was built from
    #[serde(skip)]
    raw_api: Value,
}

impl OpenApi {
    /// Raw document tree as it was loaded
    pub fn raw_api(&self) -> &Value {
        &self.raw_api
    }

    pub(crate) fn set_raw_api(&mut self, raw_api: Value) {
        self.raw_api = raw_api;
    }

    /// Serialize to a JSON tree, omitting unset fields
    ///
    /// `components` is left out unless `include_components` is set: every
    /// reference in `paths` is already inlined, so the section is redundant
    /// for most consumers.
    pub fn to_clean_value(&self, include_components: bool) -> Result<Value> {
        let mut value = serde_json::to_value(self)?;
        if !include_components {
            if let Value::Object(map) = &mut value {
                map.shift_remove("components");
            }
        }
        Ok(value)
    }

    /// Compact JSON rendering of [`OpenApi::to_clean_value`]
    pub fn to_clean_json(&self, include_components: bool) -> Result<String> {
        Ok(serde_json::to_string(&self.to_clean_value(include_components)?)?)
    }
}

impl Interpolate for OpenApi {
    fn interpolate(&mut self, state: &ResolutionState) -> Result<()> {
        self.components.interpolate(state)?;
        self.paths.interpolate(state)
    }
}

/// API information
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Info {
    /// API title
    pub title: String,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub terms_of_service: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub contact: Option<Contact>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub license: Option<License>,

    /// API version
    pub version: String,

    #[serde(flatten)]
    #[serde(skip_serializing_if = "Extensions::is_empty")]
    pub extensions: Extensions<XPrefixed>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Contact {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,

    #[serde(flatten)]
    #[serde(skip_serializing_if = "Extensions::is_empty")]
    pub extensions: Extensions<Strict>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct License {
    pub name: String,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,

    #[serde(flatten)]
    #[serde(skip_serializing_if = "Extensions::is_empty")]
    pub extensions: Extensions<Strict>,
}

/// Server information
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Server {
    /// Server URL, possibly templated with `{variables}`
    pub url: String,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub variables: Option<IndexMap<String, ServerVariable>>,

    #[serde(flatten)]
    #[serde(skip_serializing_if = "Extensions::is_empty")]
    pub extensions: Extensions<XPrefixed>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ServerVariable {
    #[serde(rename = "enum")]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub enum_values: Option<Vec<String>>,

    pub default: String,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    #[serde(flatten)]
    #[serde(skip_serializing_if = "Extensions::is_empty")]
    pub extensions: Extensions<Strict>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Tag {
    pub name: String,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub external_docs: Option<ExternalDocs>,

    #[serde(flatten)]
    #[serde(skip_serializing_if = "Extensions::is_empty")]
    pub extensions: Extensions<Strict>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ExternalDocs {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    pub url: String,

    #[serde(flatten)]
    #[serde(skip_serializing_if = "Extensions::is_empty")]
    pub extensions: Extensions<Strict>,
}

/// Reusable components
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Components {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub schemas: Option<IndexMap<String, RefOr<Schema>>>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub responses: Option<IndexMap<String, RefOr<Response>>>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub parameters: Option<IndexMap<String, RefOr<Parameter>>>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub examples: Option<IndexMap<String, RefOr<Example>>>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub request_bodies: Option<IndexMap<String, RefOr<RequestBody>>>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub headers: Option<IndexMap<String, RefOr<Header>>>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub security_schemes: Option<IndexMap<String, SecurityScheme>>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub links: Option<IndexMap<String, RefOr<Link>>>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub callbacks: Option<IndexMap<String, RefOr<Callback>>>,

    #[serde(flatten)]
    #[serde(skip_serializing_if = "Extensions::is_empty")]
    pub extensions: Extensions<Strict>,
}

// Component maps are swapped for their resolved values, keeping document order.
impl Interpolate for Components {
    fn interpolate(&mut self, state: &ResolutionState) -> Result<()> {
        replace_resolved(&mut self.schemas, state)?;
        replace_resolved(&mut self.responses, state)?;
        replace_resolved(&mut self.parameters, state)?;
        replace_resolved(&mut self.examples, state)?;
        replace_resolved(&mut self.request_bodies, state)?;
        replace_resolved(&mut self.headers, state)?;
        replace_resolved(&mut self.links, state)?;
        replace_resolved(&mut self.callbacks, state)
    }
}

fn replace_resolved<T: Component>(
    components: &mut Option<IndexMap<String, RefOr<T>>>,
    state: &ResolutionState,
) -> Result<()> {
    for (key, slot) in components.iter_mut().flatten() {
        *slot = state.component::<T>(key)?.clone();
    }
    Ok(())
}

/// Security scheme, tagged by its `type`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum SecurityScheme {
    #[serde(rename = "apiKey")]
    ApiKey(ApiKeyScheme),

    #[serde(rename = "http")]
    Http(HttpScheme),

    #[serde(rename = "oauth2")]
    OAuth2(OAuth2Scheme),

    #[serde(rename = "openIdConnect")]
    OpenIdConnect(OpenIdConnectScheme),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ApiKeyLocation {
    Query,
    Header,
    Cookie,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ApiKeyScheme {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    pub name: String,

    #[serde(rename = "in")]
    pub location: ApiKeyLocation,

    #[serde(flatten)]
    #[serde(skip_serializing_if = "Extensions::is_empty")]
    pub extensions: Extensions<Strict>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HttpScheme {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    /// HTTP Authorization scheme (e.g., "basic", "bearer")
    pub scheme: String,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub bearer_format: Option<String>,

    #[serde(flatten)]
    #[serde(skip_serializing_if = "Extensions::is_empty")]
    pub extensions: Extensions<Strict>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OAuth2Scheme {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    pub flows: OAuthFlows,

    #[serde(flatten)]
    #[serde(skip_serializing_if = "Extensions::is_empty")]
    pub extensions: Extensions<Strict>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OpenIdConnectScheme {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    pub open_id_connect_url: String,

    #[serde(flatten)]
    #[serde(skip_serializing_if = "Extensions::is_empty")]
    pub extensions: Extensions<Strict>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OAuthFlows {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub implicit: Option<OAuthFlow>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub password: Option<OAuthFlow>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub client_credentials: Option<OAuthFlow>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub authorization_code: Option<OAuthFlow>,

    #[serde(flatten)]
    #[serde(skip_serializing_if = "Extensions::is_empty")]
    pub extensions: Extensions<Strict>,
}

/// Configuration of one OAuth flow
///
/// Which URLs are mandatory depends on the flow; all are kept optional here.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OAuthFlow {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub authorization_url: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub token_url: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub refresh_url: Option<String>,

    pub scopes: IndexMap<String, String>,

    #[serde(flatten)]
    #[serde(skip_serializing_if = "Extensions::is_empty")]
    pub extensions: Extensions<Strict>,
}
