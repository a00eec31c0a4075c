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

use crate::dependency::DependencyError;
use crate::infrastructure::InfrastructureError;
use crate::reconciler::event::ReconcileEvent;
use crate::store::StoreError;
use crate::subscriber::ResolveError;
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::time::Duration;

/// Warning reason attached to events produced from a failed pass.
pub const REASON_INTERNAL_ERROR: &str = "InternalError";

/// Failure of one reconcile or finalize pass.
///
/// Everything is retried with backoff except `Permanent` and malformed
/// dependency annotations, which cannot heal without an edit to the Trigger.
#[derive(Debug)]
pub enum ReconcileError {
    BrokerLookup(StoreError),
    SubscriberResolution(ResolveError),
    Infrastructure(InfrastructureError),
    Dependency(DependencyError),
    Store(StoreError),
    DeadlineExceeded(Duration),
    Permanent {
        context: String,
        source: Box<ReconcileError>,
    },
}

impl ReconcileError {
    pub fn permanent(context: &str, source: ReconcileError) -> Self {
        ReconcileError::Permanent {
            context: context.to_string(),
            source: Box::new(source),
        }
    }

    pub fn is_retryable(&self) -> bool {
        match self {
            ReconcileError::Permanent { .. } => false,
            ReconcileError::Dependency(err) => err.is_retryable(),
            _ => true,
        }
    }

    pub fn is_conflict(&self) -> bool {
        matches!(self, ReconcileError::Store(err) if err.is_conflict())
    }

    /// Warning event describing this failure.
    pub fn to_event(&self) -> ReconcileEvent {
        ReconcileEvent::warning(REASON_INTERNAL_ERROR, self.to_string())
    }
}

impl Display for ReconcileError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            ReconcileError::BrokerLookup(err) => write!(f, "getting broker: {err}"),
            ReconcileError::SubscriberResolution(err) => {
                write!(f, "resolving subscriber: {err}")
            }
            ReconcileError::Infrastructure(err) => {
                write!(f, "reconciling retry topic and subscription: {err}")
            }
            ReconcileError::Dependency(err) => write!(f, "{err}"),
            ReconcileError::Store(err) => write!(f, "writing trigger: {err}"),
            ReconcileError::DeadlineExceeded(timeout) => {
                write!(f, "reconcile did not finish within {}s", timeout.as_secs_f64())
            }
            ReconcileError::Permanent { context, source } => write!(f, "{context}: {source}"),
        }
    }
}

impl Error for ReconcileError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            ReconcileError::BrokerLookup(err) | ReconcileError::Store(err) => Some(err),
            ReconcileError::SubscriberResolution(err) => Some(err),
            ReconcileError::Infrastructure(err) => Some(err),
            ReconcileError::Dependency(err) => Some(err),
            ReconcileError::DeadlineExceeded(_) => None,
            ReconcileError::Permanent { source, .. } => Some(source.as_ref()),
        }
    }
}

impl From<ResolveError> for ReconcileError {
    fn from(err: ResolveError) -> Self {
        ReconcileError::SubscriberResolution(err)
    }
}

impl From<InfrastructureError> for ReconcileError {
    fn from(err: InfrastructureError) -> Self {
        ReconcileError::Infrastructure(err)
    }
}

impl From<DependencyError> for ReconcileError {
    fn from(err: DependencyError) -> Self {
        ReconcileError::Dependency(err)
    }
}

#[cfg(test)]
mod tests {
    use super::ReconcileError;
    use crate::dependency::{DependencyError, ReferenceError};
    use crate::infrastructure::InfrastructureError;
    use crate::model::ObjectKey;
    use crate::store::StoreError;
    use std::error::Error;

    #[test]
    fn permanent_errors_are_not_retried() {
        let err = ReconcileError::permanent(
            "Error won't be retried, please manually delete PubSub resources",
            InfrastructureError::Topic("denied".to_string()).into(),
        );

        assert!(!err.is_retryable());
        assert_eq!(
            err.to_string(),
            "Error won't be retried, please manually delete PubSub resources: \
             reconciling retry topic and subscription: retry topic: denied"
        );
        assert!(err.source().is_some());
    }

    #[test]
    fn malformed_annotation_is_not_retried() {
        let err: ReconcileError = DependencyError::Reference(ReferenceError {
            annotation: "{".to_string(),
            reason: "EOF".to_string(),
        })
        .into();

        assert!(!err.is_retryable());
    }

    #[test]
    fn store_conflicts_are_retryable() {
        let err = ReconcileError::Store(StoreError::Conflict {
            key: ObjectKey::new("ns1", "t1"),
            expected: 1,
            actual: 2,
        });

        assert!(err.is_retryable());
        assert!(err.is_conflict());
    }
}
