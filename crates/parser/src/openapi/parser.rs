//! OpenAPI document loader

use super::reference::Interpolate;
use super::types::OpenApi;
use crate::resolver::{ComponentsResolver, ResolutionState};
use openapi_normalizer_common::{NormalizerError, OpenApiVersion, Result};
use serde_json::Value;
use std::fs;
use std::path::Path;
use tracing::{debug, info};

/// OpenAPI document loader
///
/// Holds the raw document tree and turns it into a fully resolved
/// [`OpenApi`].
#[derive(Debug, Clone)]
pub struct OpenApiParser {
    /// Raw document as read from its source
    raw: Value,

    /// Version override (optional)
    version: Option<OpenApiVersion>,
}

impl OpenApiParser {
    /// Load a document from a file path
    ///
    /// Files ending in `.json` are read as JSON, anything else as YAML.
    ///
    /// # Example
    /// ```rust,ignore
    /// let parser = OpenApiParser::from_file("petstore.yaml")?;
    /// ```
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path)?;
        debug!(path = %path.display(), bytes = content.len(), "read OpenAPI document");

        let is_json = path
            .extension()
            .is_some_and(|ext| ext.eq_ignore_ascii_case("json"));
        if is_json {
            Self::from_json(&content)
        } else {
            Self::from_yaml(&content)
        }
    }

    /// Parse a document from a YAML string
    pub fn from_yaml(yaml: &str) -> Result<Self> {
        if yaml.trim().is_empty() {
            return Ok(Self::from_value(Value::Null));
        }
        Ok(Self::from_value(serde_yaml::from_str(yaml)?))
    }

    /// Parse a document from a JSON string
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(Self::from_value(serde_json::from_str(json)?))
    }

    /// Wrap an already parsed document tree
    pub fn from_value(raw: Value) -> Self {
        Self { raw, version: None }
    }

    /// Validate with the model of `version`, whatever the document declares
    pub fn with_version(mut self, version: OpenApiVersion) -> Self {
        self.version = Some(version);
        self
    }

    pub fn into_raw(self) -> Value {
        self.raw
    }

    /// Version the document is validated against
    pub fn version(&self) -> Result<OpenApiVersion> {
        let root = match &self.raw {
            Value::Null => None,
            Value::Object(map) if map.is_empty() => None,
            Value::Object(map) => Some(map),
            _ => {
                return Err(NormalizerError::Parse(
                    "Api specification must be a mapping".to_string(),
                ))
            }
        };
        let root = root.ok_or_else(|| {
            NormalizerError::Parse("Api specification looks empty".to_string())
        })?;

        if let Some(version) = self.version {
            return Ok(version);
        }

        match root.get("openapi") {
            None => Err(NormalizerError::Parse(
                "openapi version not specified".to_string(),
            )),
            Some(Value::String(version)) => version.parse(),
            Some(other) => Err(NormalizerError::UnsupportedVersion(other.to_string())),
        }
    }

    /// Run reference resolution over `components` only
    pub fn resolve_components(&self) -> Result<ResolutionState> {
        self.version()?;
        ComponentsResolver::new().resolve(&self.raw)
    }

    /// Resolve and validate the whole document
    pub fn parse(&self) -> Result<OpenApi> {
        let version = self.version()?;
        let state = ComponentsResolver::new().resolve(&self.raw)?;

        let mut document = self.raw.clone();
        if let Value::Object(map) = &mut document {
            map.insert("openapi".to_string(), Value::from(version.as_str()));
        }

        let mut api: OpenApi = serde_json::from_value(document)
            .map_err(|e| NormalizerError::validation("#", e))?;
        api.interpolate(&state)?;
        api.set_raw_api(self.raw.clone());

        info!(
            %version,
            paths = api.paths.len(),
            components = state.resolved_count(),
            "OpenAPI document resolved"
        );
        Ok(api)
    }
}
