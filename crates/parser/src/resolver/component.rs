//! Typed construction of components, one constructor per category

use super::state::ResolutionState;
use crate::openapi::{
    Callback, Example, Header, Interpolate, Link, Parameter, RefOr, RequestBody, Response, Schema,
};
use openapi_normalizer_common::{ComponentCategory, NormalizerError, Result};
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;

/// Fully validated component, tagged by category
///
/// A component whose body is a bare self-reference stays a
/// [`RefOr::Reference`]; every other reference inside has been replaced by
/// its target.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum ResolvedComponent {
    Schema(RefOr<Schema>),
    Header(RefOr<Header>),
    Response(RefOr<Response>),
    Parameter(RefOr<Parameter>),
    Example(RefOr<Example>),
    RequestBody(RefOr<RequestBody>),
    Link(RefOr<Link>),
    Callback(RefOr<Callback>),
}

impl ResolvedComponent {
    pub fn category(&self) -> ComponentCategory {
        match self {
            ResolvedComponent::Schema(_) => ComponentCategory::Schemas,
            ResolvedComponent::Header(_) => ComponentCategory::Headers,
            ResolvedComponent::Response(_) => ComponentCategory::Responses,
            ResolvedComponent::Parameter(_) => ComponentCategory::Parameters,
            ResolvedComponent::Example(_) => ComponentCategory::Examples,
            ResolvedComponent::RequestBody(_) => ComponentCategory::RequestBodies,
            ResolvedComponent::Link(_) => ComponentCategory::Links,
            ResolvedComponent::Callback(_) => ComponentCategory::Callbacks,
        }
    }

    /// Validate `raw` as a component of `category` and substitute its references
    pub fn build(category: ComponentCategory, raw: &Value, state: &ResolutionState) -> Result<Self> {
        match category {
            ComponentCategory::Schemas => build_typed::<Schema>(raw, state),
            ComponentCategory::Headers => build_typed::<Header>(raw, state),
            ComponentCategory::Responses => build_typed::<Response>(raw, state),
            ComponentCategory::Parameters => build_typed::<Parameter>(raw, state),
            ComponentCategory::Examples => build_typed::<Example>(raw, state),
            ComponentCategory::RequestBodies => build_typed::<RequestBody>(raw, state),
            ComponentCategory::Links => build_typed::<Link>(raw, state),
            ComponentCategory::Callbacks => build_typed::<Callback>(raw, state),
        }
    }

    /// Wire representation of the component
    pub fn to_value(&self) -> Result<Value> {
        Ok(serde_json::to_value(self)?)
    }
}

fn build_typed<T: Component>(raw: &Value, state: &ResolutionState) -> Result<ResolvedComponent> {
    let mut component: RefOr<T> = serde_json::from_value(raw.clone())
        .map_err(|e| NormalizerError::validation(T::CATEGORY.to_string(), e))?;
    component.interpolate(state)?;
    Ok(T::into_resolved(component))
}

/// Object kind that can be declared under `components`
pub trait Component: Clone + DeserializeOwned + Serialize + Interpolate {
    const CATEGORY: ComponentCategory;

    fn from_resolved(component: &ResolvedComponent) -> Option<&RefOr<Self>>;

    fn into_resolved(component: RefOr<Self>) -> ResolvedComponent;
}

macro_rules! impl_component {
    ($ty:ident, $variant:ident, $category:ident) => {
        impl Component for $ty {
            const CATEGORY: ComponentCategory = ComponentCategory::$category;

            fn from_resolved(component: &ResolvedComponent) -> Option<&RefOr<Self>> {
                match component {
                    ResolvedComponent::$variant(inner) => Some(inner),
                    _ => None,
                }
            }

            fn into_resolved(component: RefOr<Self>) -> ResolvedComponent {
                ResolvedComponent::$variant(component)
            }
        }
    };
}

impl_component!(Schema, Schema, Schemas);
impl_component!(Header, Header, Headers);
impl_component!(Response, Response, Responses);
impl_component!(Parameter, Parameter, Parameters);
impl_component!(Example, Example, Examples);
impl_component!(RequestBody, RequestBody, RequestBodies);
impl_component!(Link, Link, Links);
impl_component!(Callback, Callback, Callbacks);

/// Typed validation layer consulted by the resolution engine
#[cfg_attr(test, mockall::automock)]
pub trait ComponentBuilder {
    /// Build the typed component for `raw`, reading resolved targets from `state`
    fn build(
        &self,
        category: ComponentCategory,
        raw: &Value,
        state: &ResolutionState,
    ) -> Result<ResolvedComponent>;
}

/// Builder backed by the typed OpenAPI model
#[derive(Debug, Clone, Copy, Default)]
pub struct TypedBuilder;

impl ComponentBuilder for TypedBuilder {
    fn build(
        &self,
        category: ComponentCategory,
        raw: &Value,
        state: &ResolutionState,
    ) -> Result<ResolvedComponent> {
        ResolvedComponent::build(category, raw, state)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_build_dispatches_on_category() {
        let state = ResolutionState::new();
        let header = ResolvedComponent::build(
            ComponentCategory::Headers,
            &json!({"description": "rate limit", "schema": {"type": "integer"}}),
            &state,
        )
        .unwrap();
        assert_eq!(header.category(), ComponentCategory::Headers);

        let callback = ResolvedComponent::build(
            ComponentCategory::Callbacks,
            &json!({"{$request.body#/url}": {"post": {"responses": {"200": {"description": "ok"}}}}}),
            &state,
        )
        .unwrap();
        assert_eq!(callback.category(), ComponentCategory::Callbacks);
    }

    #[test]
    fn test_build_reports_validation_errors() {
        let state = ResolutionState::new();
        let err = ResolvedComponent::build(
            ComponentCategory::Responses,
            &json!({"content": {}}),
            &state,
        )
        .unwrap_err();
        match err {
            NormalizerError::Validation { location, message } => {
                assert_eq!(location, "responses");
                assert!(message.contains("missing field `description`"), "{message}");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_missing_target_is_reference_not_found() {
        let state = ResolutionState::new();
        let err = ResolvedComponent::build(
            ComponentCategory::Schemas,
            &json!({"$ref": "#/components/schemas/Missing"}),
            &state,
        )
        .unwrap_err();
        assert!(matches!(err, NormalizerError::ReferenceNotFound(r) if r == "#/components/schemas/Missing"));
    }
}
