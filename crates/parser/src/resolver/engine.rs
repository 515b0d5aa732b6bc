//! Fixed-point resolution of the `components` section

use super::component::{ComponentBuilder, ResolvedComponent, TypedBuilder};
use super::scanner::{self, Reference};
use super::state::{PendingComponent, ResolutionState};
use openapi_normalizer_common::{ComponentCategory, NormalizerError, Result};
use serde_json::Value;
use tracing::{debug, trace, warn};

/// Outcome of one consolidation round
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Progress {
    /// At least one pending component was resolved
    Progressed,

    /// No pending component could be resolved
    Exhausted,
}

/// Outcome of one consolidation attempt for a single pending component
enum Attempt {
    Waiting,
    Resolved(ResolvedComponent),
    Requeued(PendingComponent),
}

/// Resolves every `$ref` declared under `components`
///
/// Stateless between calls: each [`ComponentsResolver::resolve`] builds and
/// returns its own [`ResolutionState`].
#[derive(Debug, Clone, Default)]
pub struct ComponentsResolver<B = TypedBuilder> {
    builder: B,
}

impl ComponentsResolver {
    pub fn new() -> Self {
        Self::default()
    }
}

impl<B: ComponentBuilder> ComponentsResolver<B> {
    /// Use a custom typed validation layer
    pub fn with_builder(builder: B) -> Self {
        Self { builder }
    }

    /// Resolve the components of `raw_api`
    ///
    /// Either every component resolves or the first failure is returned;
    /// a document without `components` yields an empty state.
    pub fn resolve(&self, raw_api: &Value) -> Result<ResolutionState> {
        let mut state = ResolutionState::new();

        let Some(components) = raw_api.get("components").filter(|value| !value.is_null()) else {
            debug!("document has no components");
            return Ok(state);
        };
        let components = components
            .as_object()
            .ok_or_else(|| NormalizerError::validation("#/components", "expected a mapping"))?;

        for category in ComponentCategory::ALL {
            if let Some(raw) = components.get(category.as_str()).filter(|value| !value.is_null()) {
                self.partition(&mut state, category, raw)?;
            }
        }

        for category in ComponentCategory::ALL {
            if !state.pending(category).is_empty() {
                self.consolidate(&mut state, category)?;
            }
        }

        debug!(
            resolved = state.resolved_count(),
            self_references = state.self_references().len(),
            rounds = state.rounds(),
            "components resolved"
        );
        Ok(state)
    }

    /// Split a category into components with and without references
    fn partition(
        &self,
        state: &mut ResolutionState,
        category: ComponentCategory,
        raw: &Value,
    ) -> Result<()> {
        let entries = raw.as_object().ok_or_else(|| {
            NormalizerError::validation(format!("#/components/{category}"), "expected a mapping")
        })?;

        for (key, value) in entries {
            let references = scanner::scan(value)?;
            for reference in &references {
                scanner::validate(reference)?;
                if Reference::parse(reference)?.targets(category, key) {
                    state.record_self_reference(reference);
                }
            }

            if references.is_empty() {
                let component = self.build(state, category, key, value)?;
                state.insert_resolved(category, key.clone(), component);
            } else {
                trace!(%category, key = %key, ?references, "component waits for references");
                state.insert_pending(
                    category,
                    key.clone(),
                    PendingComponent {
                        raw: value.clone(),
                        references,
                    },
                );
            }
        }

        debug!(
            %category,
            resolved = state.resolved(category).len(),
            pending = state.pending(category).len(),
            "partitioned components"
        );
        Ok(())
    }

    /// Run consolidation rounds until the category has nothing pending
    fn consolidate(&self, state: &mut ResolutionState, category: ComponentCategory) -> Result<()> {
        while !state.pending(category).is_empty() {
            match self.consolidation_round(state, category)? {
                Progress::Progressed => continue,
                Progress::Exhausted => {
                    let keys: Vec<String> = state.pending(category).keys().cloned().collect();
                    warn!(%category, ?keys, "consolidation made no progress");
                    return Err(NormalizerError::CyclicOrUnresolvableReference { category, keys });
                }
            }
        }
        Ok(())
    }

    fn consolidation_round(
        &self,
        state: &mut ResolutionState,
        category: ComponentCategory,
    ) -> Result<Progress> {
        let round = state.next_round();
        let keys: Vec<String> = state.pending(category).keys().cloned().collect();
        let mut progress = Progress::Exhausted;

        for key in keys {
            match self.attempt(state, category, &key)? {
                Attempt::Waiting => {
                    trace!(%category, key = %key, round, "references not yet available");
                }
                Attempt::Resolved(component) => {
                    trace!(%category, key = %key, round, "component resolved");
                    state.insert_resolved(category, key, component);
                    progress = Progress::Progressed;
                }
                Attempt::Requeued(pending) => {
                    trace!(%category, key = %key, round, "component requeued");
                    state.insert_pending(category, key, pending);
                }
            }
        }

        debug!(
            %category,
            round,
            pending = state.pending(category).len(),
            ?progress,
            "consolidation round finished"
        );
        Ok(progress)
    }

    fn attempt(
        &self,
        state: &ResolutionState,
        category: ComponentCategory,
        key: &str,
    ) -> Result<Attempt> {
        let Some(pending) = state.pending(category).get(key) else {
            return Ok(Attempt::Waiting);
        };
        if !references_available(state, category, key, &pending.references)? {
            return Ok(Attempt::Waiting);
        }

        let component = self.build(state, category, key, &pending.raw)?;

        let value = component.to_value()?;
        let leftover: Vec<String> = scanner::scan(&value)?
            .into_iter()
            .filter(|reference| !state.is_self_reference(reference))
            .collect();

        if leftover.is_empty() {
            Ok(Attempt::Resolved(component))
        } else {
            Ok(Attempt::Requeued(PendingComponent {
                raw: value,
                references: leftover,
            }))
        }
    }

    fn build(
        &self,
        state: &ResolutionState,
        category: ComponentCategory,
        key: &str,
        raw: &Value,
    ) -> Result<ResolvedComponent> {
        self.builder
            .build(category, raw, state)
            .map_err(|err| match err {
                NormalizerError::Validation { message, .. } => NormalizerError::Validation {
                    location: Reference::new(category, key).to_string(),
                    message,
                },
                other => other,
            })
    }
}

/// Whether every reference of component `key` can be substituted now
///
/// A self-reference is always available. A reference to a component that is
/// neither resolved nor pending can never become available.
fn references_available(
    state: &ResolutionState,
    category: ComponentCategory,
    key: &str,
    references: &[String],
) -> Result<bool> {
    for reference in references {
        let target = Reference::parse(reference)?;
        if target.targets(category, key) || state.is_resolved(&target) {
            continue;
        }
        if state.is_pending(&target) {
            return Ok(false);
        }
        return Err(NormalizerError::ReferenceNotFound(reference.clone()));
    }
    Ok(true)
}
