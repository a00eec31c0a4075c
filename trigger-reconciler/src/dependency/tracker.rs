/********************************************************************************
 * Copyright (c) 2026 Contributors to the Eclipse Foundation
 *
 * See the NOTICE file(s) distributed with this work for additional
 * information regarding copyright ownership.
 *
 * This program and the accompanying materials are made available under the
 * terms of the Apache License Version 2.0 which is available at
 * https://www.apache.org/licenses/LICENSE-2.0
 *
 * SPDX-License-Identifier: Apache-2.0
 ********************************************************************************/

//! Dependency readiness evaluation.

use crate::dependency::annotation::{parse_dependency_annotation, ReferenceError};
use crate::model::trigger::{
    REASON_DEPENDENCY_DOES_NOT_EXIST, REASON_DEPENDENCY_GET_FAILED, REASON_GENERATION_NOT_EQUAL,
    REASON_LISTER_DOES_NOT_EXIST, REASON_REFERENCE_ERROR, REASON_TRACKING_ERROR,
};
use crate::model::{ObjectKey, ObjectReference, Source, Trigger};
use crate::observability::events;
use crate::store::StoreError;
use async_trait::async_trait;
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::sync::Arc;
use tracing::{debug, info};

const COMPONENT: &str = "dependency_tracker";

/// Failures to register interest in, or to list, a dependency kind.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum TrackingError {
    InvalidReference(String),
    NoLister { api_version: String, kind: String },
    Unavailable(String),
}

impl Display for TrackingError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            TrackingError::InvalidReference(reason) => write!(f, "invalid reference: {reason}"),
            TrackingError::NoLister { api_version, kind } => {
                write!(f, "no lister registered for {api_version}, Kind={kind}")
            }
            TrackingError::Unavailable(reason) => write!(f, "tracker unavailable: {reason}"),
        }
    }
}

impl Error for TrackingError {}

/// Why a dependency could not be evaluated.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum DependencyError {
    Reference(ReferenceError),
    Tracking(TrackingError),
    Lister(TrackingError),
    Get(StoreError),
}

impl DependencyError {
    /// A malformed annotation cannot heal without a spec edit.
    pub fn is_retryable(&self) -> bool {
        !matches!(self, DependencyError::Reference(_))
    }
}

impl Display for DependencyError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            DependencyError::Reference(err) => write!(f, "{err}"),
            DependencyError::Tracking(err) => write!(f, "tracking dependency: {err}"),
            DependencyError::Lister(err) => {
                write!(f, "propagating dependency readiness: retrieving lister: {err}")
            }
            DependencyError::Get(err) => {
                write!(f, "propagating dependency readiness: getting the dependency: {err}")
            }
        }
    }
}

impl Error for DependencyError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            DependencyError::Reference(err) => Some(err),
            DependencyError::Tracking(err) | DependencyError::Lister(err) => Some(err),
            DependencyError::Get(err) => Some(err),
        }
    }
}

/// Namespaced read access to one dependency kind.
#[async_trait]
pub trait DependencyLister: Send + Sync {
    async fn get(&self, namespace: &str, name: &str) -> Result<Source, StoreError>;
}

/// Watches dependencies on behalf of their owners.
///
/// Registration must be idempotent: owners re-register on every pass.
#[async_trait]
pub trait DependencyTracker: Send + Sync {
    /// Records that `owner` must be re-reconciled when `reference`, taken in the
    /// owner's namespace, changes.
    async fn track_in_namespace(
        &self,
        owner: &ObjectKey,
        reference: &ObjectReference,
    ) -> Result<(), TrackingError>;

    fn lister_for(
        &self,
        reference: &ObjectReference,
    ) -> Result<Arc<dyn DependencyLister>, TrackingError>;
}

/// Derives `DependencyReady` for `trigger` from its dependency annotation.
///
/// The condition is always written before an error is returned. A dependency
/// whose status lags its spec leaves the condition `Unknown` and is not an error:
/// the dependency's next status update re-queues the Trigger through the tracker.
pub async fn evaluate_dependency(
    tracker: &dyn DependencyTracker,
    trigger: &mut Trigger,
) -> Result<(), DependencyError> {
    let Some(annotation) = trigger.dependency_annotation().map(str::to_string) else {
        trigger.status.mark_dependency_succeeded();
        return Ok(());
    };

    let reference = match parse_dependency_annotation(&annotation) {
        Ok(reference) => reference,
        Err(err) => {
            trigger.status.mark_dependency_failed(
                REASON_REFERENCE_ERROR,
                format!(
                    "Unable to unmarshal objectReference from dependency annotation of trigger: {}",
                    err.reason
                ),
            );
            return Err(DependencyError::Reference(err));
        }
    };

    if let Err(err) = tracker.track_in_namespace(&trigger.key(), &reference).await {
        debug!(
            event = events::DEPENDENCY_TRACK_FAILED,
            component = COMPONENT,
            namespace = trigger.namespace(),
            trigger = trigger.name(),
            err = %err,
            "unable to track dependency"
        );
        trigger.status.mark_dependency_unknown(
            REASON_TRACKING_ERROR,
            format!("Unable to track dependency: {err}"),
        );
        return Err(DependencyError::Tracking(err));
    }

    let lister = match tracker.lister_for(&reference) {
        Ok(lister) => lister,
        Err(err) => {
            trigger.status.mark_dependency_unknown(
                REASON_LISTER_DOES_NOT_EXIST,
                format!("Failed to retrieve lister: {err}"),
            );
            return Err(DependencyError::Lister(err));
        }
    };

    let dependency = match lister.get(trigger.namespace(), &reference.name).await {
        Ok(dependency) => dependency,
        Err(err) => {
            if err.is_not_found() {
                trigger.status.mark_dependency_failed(
                    REASON_DEPENDENCY_DOES_NOT_EXIST,
                    format!("Dependency does not exist: {err}"),
                );
            } else {
                trigger.status.mark_dependency_unknown(
                    REASON_DEPENDENCY_GET_FAILED,
                    format!("Failed to get dependency: {err}"),
                );
            }
            return Err(DependencyError::Get(err));
        }
    };

    if !dependency.is_status_current() {
        info!(
            event = events::DEPENDENCY_GENERATION_MISMATCH,
            component = COMPONENT,
            namespace = trigger.namespace(),
            trigger = trigger.name(),
            generation = dependency.metadata.generation,
            observed_generation = dependency.status.observed_generation,
            "dependency generation is not equal to its observed generation"
        );
        trigger.status.mark_dependency_unknown(
            REASON_GENERATION_NOT_EQUAL,
            format!(
                "The dependency's metadata.generation, {}, is not equal to its status.observedGeneration, {}.",
                dependency.metadata.generation, dependency.status.observed_generation
            ),
        );
        return Ok(());
    }

    trigger
        .status
        .propagate_dependency_status(&dependency.status.conditions);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::{
        evaluate_dependency, DependencyError, DependencyLister, DependencyTracker, TrackingError,
    };
    use crate::model::condition::{Condition, ConditionStatus, Conditions, READY};
    use crate::model::trigger::{
        DEPENDENCY_ANNOTATION, DEPENDENCY_READY, REASON_DEPENDENCY_DOES_NOT_EXIST,
        REASON_DEPENDENCY_GET_FAILED, REASON_GENERATION_NOT_EQUAL, REASON_LISTER_DOES_NOT_EXIST,
        REASON_REFERENCE_ERROR, REASON_TRACKING_ERROR,
    };
    use crate::model::{Destination, ObjectKey, ObjectMeta, ObjectReference, Source, SourceStatus};
    use crate::model::Trigger;
    use crate::store::StoreError;
    use async_trait::async_trait;
    use std::sync::Arc;

    const PING: &str = r#"{"kind":"PingSource","name":"ping","apiVersion":"sources.knative.dev/v1"}"#;

    #[derive(Clone)]
    enum ListerState {
        Missing,
        Down,
        Serving(Option<Source>),
    }

    struct FixedLister(ListerState);

    #[async_trait]
    impl DependencyLister for FixedLister {
        async fn get(&self, namespace: &str, name: &str) -> Result<Source, StoreError> {
            match &self.0 {
                ListerState::Serving(source) => source
                    .clone()
                    .ok_or_else(|| StoreError::not_found("PingSource", namespace, name)),
                _ => Err(StoreError::Unavailable("informer cache stopped".to_string())),
            }
        }
    }

    struct FixedTracker {
        fail_tracking: bool,
        lister: ListerState,
    }

    #[async_trait]
    impl DependencyTracker for FixedTracker {
        async fn track_in_namespace(
            &self,
            _owner: &ObjectKey,
            _reference: &ObjectReference,
        ) -> Result<(), TrackingError> {
            if self.fail_tracking {
                return Err(TrackingError::Unavailable("informer not synced".to_string()));
            }
            Ok(())
        }

        fn lister_for(
            &self,
            reference: &ObjectReference,
        ) -> Result<Arc<dyn DependencyLister>, TrackingError> {
            if let ListerState::Missing = self.lister {
                return Err(TrackingError::NoLister {
                    api_version: reference.api_version.clone(),
                    kind: reference.kind.clone(),
                });
            }
            Ok(Arc::new(FixedLister(self.lister.clone())))
        }
    }

    fn source(generation: i64, observed_generation: i64, ready: ConditionStatus) -> Source {
        let mut metadata = ObjectMeta::new("ns1", "ping");
        metadata.generation = generation;
        Source {
            metadata,
            status: SourceStatus {
                observed_generation,
                conditions: Conditions::new(vec![Condition::new(READY, ready, "", "")]),
            },
        }
    }

    fn trigger_with_dependency(annotation: Option<&str>) -> Trigger {
        let mut trigger = Trigger::new("ns1", "t1", "b1", Destination::from_uri("http://svc/"));
        if let Some(annotation) = annotation {
            trigger
                .metadata
                .annotations
                .insert(DEPENDENCY_ANNOTATION.to_string(), annotation.to_string());
        }
        trigger
    }

    fn dependency_ready(trigger: &Trigger) -> &Condition {
        trigger
            .status
            .get_condition(DEPENDENCY_READY)
            .expect("DependencyReady should be set")
    }

    #[tokio::test]
    async fn no_annotation_is_vacuously_ready() {
        let tracker = FixedTracker {
            fail_tracking: true,
            lister: ListerState::Serving(None),
        };
        let mut trigger = trigger_with_dependency(None);

        evaluate_dependency(&tracker, &mut trigger).await.unwrap();

        assert!(dependency_ready(&trigger).is_true());
    }

    #[tokio::test]
    async fn malformed_annotation_is_permanent() {
        let tracker = FixedTracker {
            fail_tracking: false,
            lister: ListerState::Serving(None),
        };
        let mut trigger = trigger_with_dependency(Some("{"));

        let err = evaluate_dependency(&tracker, &mut trigger).await.unwrap_err();

        assert!(matches!(err, DependencyError::Reference(_)));
        assert!(!err.is_retryable());
        assert_eq!(dependency_ready(&trigger).status, ConditionStatus::False);
        assert_eq!(dependency_ready(&trigger).reason, REASON_REFERENCE_ERROR);
    }

    #[tokio::test]
    async fn tracking_failure_is_unknown_and_retryable() {
        let tracker = FixedTracker {
            fail_tracking: true,
            lister: ListerState::Serving(None),
        };
        let mut trigger = trigger_with_dependency(Some(PING));

        let err = evaluate_dependency(&tracker, &mut trigger).await.unwrap_err();

        assert!(err.is_retryable());
        assert_eq!(dependency_ready(&trigger).status, ConditionStatus::Unknown);
        assert_eq!(dependency_ready(&trigger).reason, REASON_TRACKING_ERROR);
    }

    #[tokio::test]
    async fn missing_dependency_is_false() {
        let tracker = FixedTracker {
            fail_tracking: false,
            lister: ListerState::Serving(None),
        };
        let mut trigger = trigger_with_dependency(Some(PING));

        let err = evaluate_dependency(&tracker, &mut trigger).await.unwrap_err();

        assert!(matches!(err, DependencyError::Get(ref e) if e.is_not_found()));
        assert_eq!(dependency_ready(&trigger).status, ConditionStatus::False);
        assert_eq!(
            dependency_ready(&trigger).reason,
            REASON_DEPENDENCY_DOES_NOT_EXIST
        );
    }

    #[tokio::test]
    async fn stale_dependency_is_unknown_without_error() {
        let tracker = FixedTracker {
            fail_tracking: false,
            lister: ListerState::Serving(Some(source(3, 2, ConditionStatus::True))),
        };
        let mut trigger = trigger_with_dependency(Some(PING));

        evaluate_dependency(&tracker, &mut trigger)
            .await
            .expect("staleness is not an error");

        assert_eq!(dependency_ready(&trigger).status, ConditionStatus::Unknown);
        assert_eq!(dependency_ready(&trigger).reason, REASON_GENERATION_NOT_EQUAL);
    }

    #[tokio::test]
    async fn current_dependency_readiness_is_copied() {
        let tracker = FixedTracker {
            fail_tracking: false,
            lister: ListerState::Serving(Some(source(2, 2, ConditionStatus::False))),
        };
        let mut trigger = trigger_with_dependency(Some(PING));

        evaluate_dependency(&tracker, &mut trigger).await.unwrap();
        assert_eq!(dependency_ready(&trigger).status, ConditionStatus::False);

        let tracker = FixedTracker {
            fail_tracking: false,
            lister: ListerState::Serving(Some(source(2, 2, ConditionStatus::True))),
        };
        evaluate_dependency(&tracker, &mut trigger).await.unwrap();
        assert!(dependency_ready(&trigger).is_true());
    }

    #[tokio::test]
    async fn unregistered_kind_is_unknown_and_retryable() {
        let tracker = FixedTracker {
            fail_tracking: false,
            lister: ListerState::Missing,
        };
        let mut trigger = trigger_with_dependency(Some(PING));

        let err = evaluate_dependency(&tracker, &mut trigger).await.unwrap_err();

        assert!(matches!(err, DependencyError::Lister(TrackingError::NoLister { .. })));
        assert!(err.is_retryable());
        assert_eq!(dependency_ready(&trigger).status, ConditionStatus::Unknown);
        assert_eq!(dependency_ready(&trigger).reason, REASON_LISTER_DOES_NOT_EXIST);
    }

    #[tokio::test]
    async fn unavailable_lister_is_unknown_and_retryable() {
        let tracker = FixedTracker {
            fail_tracking: false,
            lister: ListerState::Down,
        };
        let mut trigger = trigger_with_dependency(Some(PING));

        let err = evaluate_dependency(&tracker, &mut trigger).await.unwrap_err();

        assert!(matches!(err, DependencyError::Get(StoreError::Unavailable(_))));
        assert!(err.is_retryable());
        assert_eq!(dependency_ready(&trigger).status, ConditionStatus::Unknown);
        assert_eq!(dependency_ready(&trigger).reason, REASON_DEPENDENCY_GET_FAILED);
    }
}
