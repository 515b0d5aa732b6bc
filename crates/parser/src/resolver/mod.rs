//! Resolution of `$ref` pointers inside `components`
//!
//! Components without references are validated immediately; the rest wait
//! in a pending map and are promoted round by round as their targets become
//! available. A round without any promotion stops the process with
//! [`NormalizerError::CyclicOrUnresolvableReference`].
//!
//! [`NormalizerError::CyclicOrUnresolvableReference`]: openapi_normalizer_common::NormalizerError::CyclicOrUnresolvableReference

mod component;
mod engine;
mod scanner;
mod state;

pub use component::{Component, ComponentBuilder, ResolvedComponent, TypedBuilder};
pub use engine::ComponentsResolver;
pub use scanner::{scan, validate, Reference};
pub use state::{PendingComponent, ResolutionState};
