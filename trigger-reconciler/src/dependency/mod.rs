//! Dependency tracking layer.
//!
//! A Trigger may name another object in its `knative.dev/dependency` annotation.
//! This layer parses that reference, registers interest in the object so its
//! changes re-queue the Trigger, and propagates the object's readiness into
//! `DependencyReady`.

pub(crate) mod annotation;
pub(crate) mod registry;
pub(crate) mod tracker;

pub use annotation::{parse_dependency_annotation, ReferenceError};
pub use registry::ListableTracker;
pub use tracker::{
    evaluate_dependency, DependencyError, DependencyLister, DependencyTracker, TrackingError,
};
