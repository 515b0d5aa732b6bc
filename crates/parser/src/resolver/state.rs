//! Per-call resolution state

use super::component::{Component, ResolvedComponent};
use super::scanner::{self, Reference};
use crate::openapi::RefOr;
use indexmap::{IndexMap, IndexSet};
use openapi_normalizer_common::{ComponentCategory, NormalizerError, Result};
use serde_json::Value;

/// A raw component waiting for its references to resolve
#[derive(Debug, Clone, PartialEq)]
pub struct PendingComponent {
    /// Raw record as read from the document
    pub raw: Value,

    /// Distinct `$ref` strings found inside `raw`, first-seen order
    pub references: Vec<String>,
}

/// Mutable state of a single `resolve` call
///
/// Each `(category, key)` lives in exactly one of the pending and resolved
/// maps. A fresh state is created for every document, so independent
/// resolutions never observe each other.
#[derive(Debug, Clone)]
pub struct ResolutionState {
    pending: IndexMap<ComponentCategory, IndexMap<String, PendingComponent>>,
    resolved: IndexMap<ComponentCategory, IndexMap<String, ResolvedComponent>>,
    self_refs: IndexSet<String>,
    rounds: usize,
}

impl Default for ResolutionState {
    fn default() -> Self {
        Self::new()
    }
}

impl ResolutionState {
    /// Empty state with one pending and one resolved map per category
    pub fn new() -> Self {
        Self {
            pending: per_category(),
            resolved: per_category(),
            self_refs: IndexSet::new(),
            rounds: 0,
        }
    }

    /// Resolved components of a category, in promotion order
    pub fn resolved(&self, category: ComponentCategory) -> &IndexMap<String, ResolvedComponent> {
        &self.resolved[&category]
    }

    /// Components of a category still waiting for references
    pub fn pending(&self, category: ComponentCategory) -> &IndexMap<String, PendingComponent> {
        &self.pending[&category]
    }

    pub fn resolved_count(&self) -> usize {
        self.resolved.values().map(IndexMap::len).sum()
    }

    pub fn pending_count(&self) -> usize {
        self.pending.values().map(IndexMap::len).sum()
    }

    /// References recorded as pointing back to their own component
    pub fn self_references(&self) -> &IndexSet<String> {
        &self.self_refs
    }

    pub fn is_self_reference(&self, reference: &str) -> bool {
        self.self_refs.contains(reference)
    }

    /// Number of consolidation rounds run so far, across all categories
    pub fn rounds(&self) -> usize {
        self.rounds
    }

    pub fn is_resolved(&self, reference: &Reference) -> bool {
        self.resolved[&reference.category].contains_key(&reference.key)
    }

    pub fn is_pending(&self, reference: &Reference) -> bool {
        self.pending[&reference.category].contains_key(&reference.key)
    }

    /// Resolved component `key` of `T`'s category
    pub fn component<T: Component>(&self, key: &str) -> Result<&RefOr<T>> {
        let reference = Reference::new(T::CATEGORY, key);
        let resolved = self.resolved[&T::CATEGORY]
            .get(key)
            .ok_or_else(|| NormalizerError::ReferenceNotFound(reference.to_string()))?;
        T::from_resolved(resolved).ok_or_else(|| {
            NormalizerError::validation(
                reference.to_string(),
                format!(
                    "resolved value is a {} component, expected {}",
                    resolved.category(),
                    T::CATEGORY
                ),
            )
        })
    }

    /// Resolved target of `reference`, typed for the position holding it
    pub fn lookup<T: Component>(&self, reference: &str) -> Result<&RefOr<T>> {
        scanner::validate(reference)?;
        let target = Reference::parse(reference)?;
        if target.category != T::CATEGORY {
            return Err(NormalizerError::validation(
                reference,
                format!(
                    "reference points to {} where {} are expected",
                    target.category,
                    T::CATEGORY
                ),
            ));
        }
        self.component::<T>(&target.key)
    }

    pub(crate) fn record_self_reference(&mut self, reference: &str) {
        self.self_refs.insert(reference.to_string());
    }

    pub(crate) fn insert_pending(
        &mut self,
        category: ComponentCategory,
        key: String,
        component: PendingComponent,
    ) {
        self.resolved[&category].shift_remove(&key);
        self.pending[&category].insert(key, component);
    }

    pub(crate) fn insert_resolved(
        &mut self,
        category: ComponentCategory,
        key: String,
        component: ResolvedComponent,
    ) {
        self.pending[&category].shift_remove(&key);
        self.resolved[&category].insert(key, component);
    }

    pub(crate) fn next_round(&mut self) -> usize {
        self.rounds += 1;
        self.rounds
    }
}

fn per_category<V>() -> IndexMap<ComponentCategory, IndexMap<String, V>> {
    ComponentCategory::ALL
        .into_iter()
        .map(|category| (category, IndexMap::new()))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::openapi::Schema;
    use serde_json::json;

    fn pending(raw: Value) -> PendingComponent {
        PendingComponent {
            raw,
            references: vec!["#/components/schemas/B".to_string()],
        }
    }

    #[test]
    fn test_new_state_is_empty_for_every_category() {
        let state = ResolutionState::new();
        for category in ComponentCategory::ALL {
            assert!(state.resolved(category).is_empty());
            assert!(state.pending(category).is_empty());
        }
        assert_eq!(state.rounds(), 0);
    }

    #[test]
    fn test_component_lives_in_one_map() {
        let mut state = ResolutionState::new();
        let category = ComponentCategory::Schemas;

        state.insert_pending(category, "A".to_string(), pending(json!({})));
        assert_eq!(state.pending_count(), 1);
        assert_eq!(state.resolved_count(), 0);

        state.insert_resolved(
            category,
            "A".to_string(),
            ResolvedComponent::Schema(RefOr::Item(Schema::default())),
        );
        assert_eq!(state.pending_count(), 0);
        assert_eq!(state.resolved_count(), 1);
        assert!(state.is_resolved(&Reference::new(category, "A")));
    }

    #[test]
    fn test_lookup_checks_category() {
        let mut state = ResolutionState::new();
        state.insert_resolved(
            ComponentCategory::Schemas,
            "Pet".to_string(),
            ResolvedComponent::Schema(RefOr::Item(Schema::default())),
        );

        assert!(state.lookup::<Schema>("#/components/schemas/Pet").is_ok());
        assert!(matches!(
            state.lookup::<Schema>("#/components/schemas/Missing"),
            Err(NormalizerError::ReferenceNotFound(_))
        ));
        assert!(matches!(
            state.lookup::<crate::openapi::Header>("#/components/schemas/Pet"),
            Err(NormalizerError::Validation { .. })
        ));
        assert!(matches!(
            state.lookup::<Schema>("common.json#/components/schemas/Pet"),
            Err(NormalizerError::UnsupportedReferenceTarget(_))
        ));
    }
}
