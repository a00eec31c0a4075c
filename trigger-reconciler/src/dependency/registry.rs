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

//! In-memory tracker: owner registrations plus per-kind listers.

use crate::dependency::tracker::{DependencyLister, DependencyTracker, TrackingError};
use crate::model::{ObjectKey, ObjectReference};
use async_trait::async_trait;
use std::collections::{BTreeSet, HashMap};
use std::sync::Arc;
use tokio::sync::Mutex;

/// Identity of one tracked dependency, always namespaced.
#[derive(Clone, Debug, Eq, Hash, PartialEq)]
struct TrackedReference {
    api_version: String,
    kind: String,
    namespace: String,
    name: String,
}

impl TrackedReference {
    fn new(reference: &ObjectReference, namespace: &str) -> Self {
        Self {
            api_version: reference.api_version.clone(),
            kind: reference.kind.clone(),
            namespace: namespace.to_string(),
            name: reference.name.clone(),
        }
    }
}

/// Registration table keyed by dependency identity, with listers keyed by kind.
///
/// Registering the same `(owner, reference)` pair twice leaves one registration.
#[derive(Default)]
pub struct ListableTracker {
    registrations: Mutex<HashMap<TrackedReference, BTreeSet<ObjectKey>>>,
    listers: HashMap<(String, String), Arc<dyn DependencyLister>>,
}

impl ListableTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Makes dependencies of `api_version`/`kind` resolvable through `lister`.
    pub fn with_lister(
        mut self,
        api_version: &str,
        kind: &str,
        lister: Arc<dyn DependencyLister>,
    ) -> Self {
        self.listers
            .insert((api_version.to_string(), kind.to_string()), lister);
        self
    }

    /// Owners that must be re-reconciled after `reference` changed.
    ///
    /// `reference.namespace` must be set.
    pub async fn owners_of(&self, reference: &ObjectReference) -> Vec<ObjectKey> {
        let tracked = TrackedReference::new(reference, &reference.namespace);
        self.registrations
            .lock()
            .await
            .get(&tracked)
            .map(|owners| owners.iter().cloned().collect())
            .unwrap_or_default()
    }

    /// Drops every registration held by `owner`. Returns `true` when any existed.
    pub async fn forget(&self, owner: &ObjectKey) -> bool {
        let mut registrations = self.registrations.lock().await;
        let mut removed = false;
        registrations.retain(|_, owners| {
            removed |= owners.remove(owner);
            !owners.is_empty()
        });
        removed
    }
}

#[async_trait]
impl DependencyTracker for ListableTracker {
    async fn track_in_namespace(
        &self,
        owner: &ObjectKey,
        reference: &ObjectReference,
    ) -> Result<(), TrackingError> {
        if reference.api_version.is_empty() || reference.kind.is_empty() {
            return Err(TrackingError::InvalidReference(
                "apiVersion and kind are required".to_string(),
            ));
        }
        if reference.name.is_empty() {
            return Err(TrackingError::InvalidReference(
                "name is required".to_string(),
            ));
        }

        let tracked = TrackedReference::new(reference, &owner.namespace);
        let mut registrations = self.registrations.lock().await;
        registrations
            .entry(tracked)
            .or_default()
            .insert(owner.clone());
        Ok(())
    }

    fn lister_for(
        &self,
        reference: &ObjectReference,
    ) -> Result<Arc<dyn DependencyLister>, TrackingError> {
        self.listers
            .get(&(reference.api_version.clone(), reference.kind.clone()))
            .cloned()
            .ok_or_else(|| TrackingError::NoLister {
                api_version: reference.api_version.clone(),
                kind: reference.kind.clone(),
            })
    }
}

#[cfg(test)]
mod tests {
    use super::ListableTracker;
    use crate::dependency::tracker::{DependencyLister, DependencyTracker, TrackingError};
    use crate::model::{ObjectKey, ObjectReference, Source};
    use crate::store::StoreError;
    use async_trait::async_trait;
    use std::sync::Arc;

    struct EmptyLister;

    #[async_trait]
    impl DependencyLister for EmptyLister {
        async fn get(&self, namespace: &str, name: &str) -> Result<Source, StoreError> {
            Err(StoreError::not_found("PingSource", namespace, name))
        }
    }

    fn ping() -> ObjectReference {
        ObjectReference::new("sources.knative.dev/v1", "PingSource", "", "ping")
    }

    #[tokio::test]
    async fn registration_is_idempotent_and_namespaced_by_owner() {
        let tracker = ListableTracker::new();
        let owner = ObjectKey::new("ns1", "t1");

        tracker.track_in_namespace(&owner, &ping()).await.unwrap();
        tracker.track_in_namespace(&owner, &ping()).await.unwrap();

        let in_ns1 = ObjectReference::new("sources.knative.dev/v1", "PingSource", "ns1", "ping");
        let in_ns2 = ObjectReference::new("sources.knative.dev/v1", "PingSource", "ns2", "ping");
        assert_eq!(tracker.owners_of(&in_ns1).await, vec![owner]);
        assert!(tracker.owners_of(&in_ns2).await.is_empty());
    }

    #[tokio::test]
    async fn forget_drops_only_that_owner() {
        let tracker = ListableTracker::new();
        let t1 = ObjectKey::new("ns1", "t1");
        let t2 = ObjectKey::new("ns1", "t2");
        tracker.track_in_namespace(&t1, &ping()).await.unwrap();
        tracker.track_in_namespace(&t2, &ping()).await.unwrap();

        assert!(tracker.forget(&t1).await);
        assert!(!tracker.forget(&t1).await);

        let in_ns1 = ObjectReference::new("sources.knative.dev/v1", "PingSource", "ns1", "ping");
        assert_eq!(tracker.owners_of(&in_ns1).await, vec![t2]);
    }

    #[tokio::test]
    async fn lister_lookup_is_keyed_by_kind() {
        let tracker = ListableTracker::new().with_lister(
            "sources.knative.dev/v1",
            "PingSource",
            Arc::new(EmptyLister),
        );

        assert!(tracker.lister_for(&ping()).is_ok());

        let other = ObjectReference::new("sources.knative.dev/v1", "ApiServerSource", "", "a");
        assert!(matches!(
            tracker.lister_for(&other),
            Err(TrackingError::NoLister { .. })
        ));
    }

    #[tokio::test]
    async fn incomplete_reference_cannot_be_tracked() {
        let tracker = ListableTracker::new();
        let owner = ObjectKey::new("ns1", "t1");
        let reference = ObjectReference::new("", "PingSource", "", "ping");

        assert!(matches!(
            tracker.track_in_namespace(&owner, &reference).await,
            Err(TrackingError::InvalidReference(_))
        ));
    }
}
