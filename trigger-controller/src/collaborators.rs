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

//! Stand-ins for the provider and resolver when running against a snapshot.

use async_trait::async_trait;
use std::collections::BTreeMap;
use tokio::sync::Mutex;
use tracing::info;
use trigger_reconciler::model::Destination;
use trigger_reconciler::{
    Broker, InfrastructureError, ResolveError, RetryTarget, RetryTopicProvisioner, UriResolver,
};

/// Logs every provider change it would make and remembers the resulting state.
#[derive(Default)]
pub(crate) struct LoggingProvisioner {
    provisioned: Mutex<BTreeMap<String, RetryTarget>>,
}

#[async_trait]
impl RetryTopicProvisioner for LoggingProvisioner {
    async fn ensure(&self, target: &RetryTarget) -> Result<(), InfrastructureError> {
        let mut provisioned = self.provisioned.lock().await;
        if provisioned.get(&target.topic_id) == Some(target) {
            return Ok(());
        }
        info!(
            topic = %target.topic_id,
            subscription = %target.subscription_id,
            retry_policy = ?target.retry_policy,
            dead_letter_policy = ?target.dead_letter_policy,
            "ensuring retry topic and subscription"
        );
        provisioned.insert(target.topic_id.clone(), target.clone());
        Ok(())
    }

    async fn delete(&self, target: &RetryTarget) -> Result<(), InfrastructureError> {
        if self
            .provisioned
            .lock()
            .await
            .remove(&target.topic_id)
            .is_some()
        {
            info!(
                topic = %target.topic_id,
                subscription = %target.subscription_id,
                "deleting retry topic and subscription"
            );
        }
        Ok(())
    }
}

/// Resolves `ref` destinations to in-cluster service addresses.
pub(crate) struct ServiceDomainResolver {
    cluster_domain: String,
}

impl ServiceDomainResolver {
    pub(crate) fn new(cluster_domain: &str) -> Self {
        Self {
            cluster_domain: cluster_domain.to_string(),
        }
    }
}

#[async_trait]
impl UriResolver for ServiceDomainResolver {
    async fn resolve(
        &self,
        destination: &Destination,
        _parent: &Broker,
    ) -> Result<String, ResolveError> {
        match (&destination.reference, &destination.uri) {
            (Some(reference), path) => {
                if reference.namespace.is_empty() {
                    return Err(ResolveError(format!(
                        "reference {}/{} has no namespace",
                        reference.kind, reference.name
                    )));
                }
                let base = format!(
                    "http://{}.{}.svc.{}",
                    reference.name, reference.namespace, self.cluster_domain
                );
                match path {
                    Some(path) => Ok(format!("{base}/{}", path.trim_start_matches('/'))),
                    None => Ok(format!("{base}/")),
                }
            }
            (None, Some(uri)) => Ok(uri.clone()),
            (None, None) => Err(ResolveError(
                "destination has neither ref nor uri".to_string(),
            )),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::ServiceDomainResolver;
    use trigger_reconciler::model::Destination;
    use trigger_reconciler::{Broker, ObjectReference, UriResolver};

    #[tokio::test]
    async fn references_resolve_to_service_addresses() {
        let resolver = ServiceDomainResolver::new("cluster.local");
        let broker = Broker::new("ns1", "b1", "googlecloud");
        let mut destination =
            Destination::from_reference(ObjectReference::new("v1", "Service", "ns1", "display"));

        assert_eq!(
            resolver.resolve(&destination, &broker).await.unwrap(),
            "http://display.ns1.svc.cluster.local/"
        );

        destination.uri = Some("/events".to_string());
        assert_eq!(
            resolver.resolve(&destination, &broker).await.unwrap(),
            "http://display.ns1.svc.cluster.local/events"
        );
    }

    #[tokio::test]
    async fn empty_destination_fails() {
        let resolver = ServiceDomainResolver::new("cluster.local");
        let broker = Broker::new("ns1", "b1", "googlecloud");

        assert!(resolver
            .resolve(&Destination::default(), &broker)
            .await
            .is_err());
    }
}
