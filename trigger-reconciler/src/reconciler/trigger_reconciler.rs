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

//! Per-Trigger reconcile and finalize passes.

use crate::config::ReconcilerConfig;
use crate::dependency::{evaluate_dependency, DependencyTracker};
use crate::infrastructure::{RetryTopicProvisioner, RoutingInfrastructure};
use crate::model::trigger::REASON_BROKER_DOES_NOT_EXIST;
use crate::model::{Broker, DeliverySpec, Trigger};
use crate::observability::events;
use crate::reconciler::error::ReconcileError;
use crate::reconciler::event::ReconcileEvent;
use crate::store::BrokerLister;
use crate::subscriber::{resolve_subscriber, UriResolver};
use std::sync::Arc;
use tracing::{debug, error, info, warn};

const COMPONENT: &str = "trigger_reconciler";

const CLASS_MISMATCH_CONTEXT: &str =
    "Error won't be retried, please manually delete PubSub resources";

/// Outcome of one pass: an optional event to record, or a failure.
pub type ReconcileResult = Result<Option<ReconcileEvent>, ReconcileError>;

/// Converges one Trigger's retry infrastructure and status toward its spec.
///
/// Both passes mutate only the Trigger handed in. Persisting it is the caller's
/// job, so a pass can be re-run on a fresh copy without side effects beyond the
/// idempotent collaborator calls.
pub struct TriggerReconciler {
    brokers: Arc<dyn BrokerLister>,
    resolver: Arc<dyn UriResolver>,
    infrastructure: RoutingInfrastructure,
    tracker: Arc<dyn DependencyTracker>,
    config: ReconcilerConfig,
}

impl TriggerReconciler {
    pub fn new(
        brokers: Arc<dyn BrokerLister>,
        resolver: Arc<dyn UriResolver>,
        provisioner: Arc<dyn RetryTopicProvisioner>,
        tracker: Arc<dyn DependencyTracker>,
        config: ReconcilerConfig,
    ) -> Self {
        Self {
            brokers,
            resolver,
            infrastructure: RoutingInfrastructure::new(provisioner),
            tracker,
            config,
        }
    }

    pub fn config(&self) -> &ReconcilerConfig {
        &self.config
    }

    /// Reconciles a Trigger that is not being deleted.
    pub async fn reconcile_kind(&self, trigger: &mut Trigger) -> ReconcileResult {
        debug!(
            event = events::RECONCILE_START,
            component = COMPONENT,
            namespace = trigger.namespace(),
            trigger = trigger.name(),
            broker = %trigger.spec.broker,
            "reconciling trigger"
        );

        let broker = match self
            .brokers
            .get(trigger.namespace(), &trigger.spec.broker)
            .await
        {
            Ok(broker) => broker,
            Err(err) if err.is_not_found() => {
                error!(
                    event = events::BROKER_NOT_FOUND,
                    component = COMPONENT,
                    namespace = trigger.namespace(),
                    trigger = trigger.name(),
                    broker = %trigger.spec.broker,
                    "trigger does not have broker"
                );
                let message = format!("Broker {:?} does not exist", trigger.spec.broker);
                trigger
                    .status
                    .mark_broker_failed(REASON_BROKER_DOES_NOT_EXIST, message);
                return self.finalize_kind(trigger).await;
            }
            Err(err) => {
                warn!(
                    event = events::BROKER_LOOKUP_FAILED,
                    component = COMPONENT,
                    namespace = trigger.namespace(),
                    trigger = trigger.name(),
                    broker = %trigger.spec.broker,
                    err = %err,
                    "unable to get broker"
                );
                return Err(ReconcileError::BrokerLookup(err));
            }
        };

        if broker.metadata.is_deleting() {
            info!(
                event = events::BROKER_DELETING,
                component = COMPONENT,
                namespace = trigger.namespace(),
                trigger = trigger.name(),
                broker = %trigger.spec.broker,
                "broker is being deleted, releasing trigger resources"
            );
            return self.finalize_kind(trigger).await;
        }

        if broker.class() != Some(self.config.broker_class.as_str()) {
            return self.release_foreign_class(trigger, &broker).await;
        }

        let outcome = self.reconcile(trigger, &broker).await;
        match &outcome {
            Ok(_) => info!(
                event = events::RECONCILE_OK,
                component = COMPONENT,
                namespace = trigger.namespace(),
                trigger = trigger.name(),
                ready = trigger.status.is_ready(),
                "trigger reconciled"
            ),
            Err(err) => warn!(
                event = events::RECONCILE_FAILED,
                component = COMPONENT,
                namespace = trigger.namespace(),
                trigger = trigger.name(),
                retryable = err.is_retryable(),
                err = %err,
                "trigger reconcile failed"
            ),
        }
        outcome
    }

    /// Releases the retry resources of a Trigger this reconciler once managed.
    ///
    /// Triggers without the finalizer were never provisioned here and are left
    /// alone without any provider call.
    pub async fn finalize_kind(&self, trigger: &mut Trigger) -> ReconcileResult {
        if !trigger.metadata.has_finalizer(&self.config.finalizer) {
            debug!(
                event = events::FINALIZE_SKIPPED,
                component = COMPONENT,
                namespace = trigger.namespace(),
                trigger = trigger.name(),
                "trigger carries no finalizer, nothing to release"
            );
            return Ok(None);
        }

        debug!(
            event = events::FINALIZE_START,
            component = COMPONENT,
            namespace = trigger.namespace(),
            trigger = trigger.name(),
            "finalizing trigger"
        );

        if let Err(err) = self.infrastructure.delete(trigger).await {
            warn!(
                event = events::FINALIZE_FAILED,
                component = COMPONENT,
                namespace = trigger.namespace(),
                trigger = trigger.name(),
                err = %err,
                "trigger finalize failed"
            );
            return Err(err.into());
        }

        info!(
            event = events::FINALIZE_OK,
            component = COMPONENT,
            namespace = trigger.namespace(),
            trigger = trigger.name(),
            "trigger finalized"
        );
        Ok(Some(ReconcileEvent::trigger_finalized(&trigger.key())))
    }

    // The Broker belongs to another reconciler. Whatever this reconciler created
    // earlier is released best effort, and the retry conditions are forced ready
    // so they never block a Trigger that is now someone else's.
    async fn release_foreign_class(
        &self,
        trigger: &mut Trigger,
        broker: &Broker,
    ) -> ReconcileResult {
        info!(
            event = events::BROKER_CLASS_MISMATCH,
            component = COMPONENT,
            namespace = trigger.namespace(),
            trigger = trigger.name(),
            broker = %trigger.spec.broker,
            broker_class = broker.class().unwrap_or_default(),
            "broker class is not owned by this reconciler"
        );

        let outcome = self.finalize_kind(trigger).await;

        trigger.status.mark_topic_ready();
        trigger.status.mark_subscription_ready();

        outcome.map_err(|err| ReconcileError::permanent(CLASS_MISMATCH_CONTEXT, err))
    }

    async fn reconcile(&self, trigger: &mut Trigger, broker: &Broker) -> ReconcileResult {
        trigger.status.initialize_conditions();
        trigger.status.propagate_broker_status(&broker.status);

        resolve_subscriber(self.resolver.as_ref(), trigger, broker).await?;

        let delivery = self.effective_delivery(trigger, broker);
        self.infrastructure.ensure(trigger, &delivery).await?;

        evaluate_dependency(self.tracker.as_ref(), trigger).await?;

        Ok(Some(ReconcileEvent::trigger_reconciled(&trigger.key())))
    }

    /// Trigger delivery wins over the Broker's, which wins over the configured default.
    fn effective_delivery(&self, trigger: &Trigger, broker: &Broker) -> DeliverySpec {
        trigger
            .spec
            .delivery
            .as_ref()
            .or(broker.spec.delivery.as_ref())
            .unwrap_or(&self.config.default_delivery)
            .clone()
    }
}

#[cfg(test)]
mod tests {
    use super::TriggerReconciler;
    use crate::config::ReconcilerConfig;
    use crate::dependency::{DependencyLister, DependencyTracker, TrackingError};
    use crate::infrastructure::{InfrastructureError, RetryTarget, RetryTopicProvisioner};
    use crate::model::trigger::{BROKER_READY, REASON_BROKER_DOES_NOT_EXIST};
    use crate::model::{
        Broker, ConditionStatus, DeliverySpec, Destination, ObjectKey, ObjectReference, Trigger,
    };
    use crate::store::{BrokerLister, StoreError};
    use crate::subscriber::{ResolveError, UriResolver};
    use async_trait::async_trait;
    use std::sync::{Arc, Mutex};
    use std::time::Duration;

    struct OneBroker(Option<Broker>);

    #[async_trait]
    impl BrokerLister for OneBroker {
        async fn get(&self, namespace: &str, name: &str) -> Result<Broker, StoreError> {
            self.0
                .clone()
                .filter(|b| b.metadata.namespace == namespace && b.metadata.name == name)
                .ok_or_else(|| StoreError::not_found("Broker", namespace, name))
        }
    }

    struct FixedResolver;

    #[async_trait]
    impl UriResolver for FixedResolver {
        async fn resolve(
            &self,
            _destination: &Destination,
            _parent: &Broker,
        ) -> Result<String, ResolveError> {
            Ok("http://svc.ns1.svc.cluster.local/".to_string())
        }
    }

    #[derive(Default)]
    struct CountingProvisioner {
        ensured: Mutex<Vec<RetryTarget>>,
        deletes: Mutex<usize>,
    }

    #[async_trait]
    impl RetryTopicProvisioner for CountingProvisioner {
        async fn ensure(&self, target: &RetryTarget) -> Result<(), InfrastructureError> {
            self.ensured.lock().unwrap().push(target.clone());
            Ok(())
        }

        async fn delete(&self, _target: &RetryTarget) -> Result<(), InfrastructureError> {
            *self.deletes.lock().unwrap() += 1;
            Ok(())
        }
    }

    struct NoTracker;

    #[async_trait]
    impl DependencyTracker for NoTracker {
        async fn track_in_namespace(
            &self,
            _owner: &ObjectKey,
            _reference: &ObjectReference,
        ) -> Result<(), TrackingError> {
            Ok(())
        }

        fn lister_for(
            &self,
            reference: &ObjectReference,
        ) -> Result<Arc<dyn DependencyLister>, TrackingError> {
            Err(TrackingError::NoLister {
                api_version: reference.api_version.clone(),
                kind: reference.kind.clone(),
            })
        }
    }

    fn reconciler(
        broker: Option<Broker>,
        provisioner: Arc<CountingProvisioner>,
    ) -> TriggerReconciler {
        TriggerReconciler::new(
            Arc::new(OneBroker(broker)),
            Arc::new(FixedResolver),
            provisioner,
            Arc::new(NoTracker),
            ReconcilerConfig::default(),
        )
    }

    fn trigger() -> Trigger {
        Trigger::new("ns1", "t1", "b1", Destination::from_uri("http://svc/"))
    }

    #[tokio::test]
    async fn delivery_falls_back_from_trigger_to_broker_to_default() {
        let provisioner = Arc::new(CountingProvisioner::default());
        let mut broker = Broker::new("ns1", "b1", "googlecloud");
        broker.spec.delivery = Some(DeliverySpec {
            backoff_delay: Some("PT5S".to_string()),
            ..Default::default()
        });
        let reconciler = reconciler(Some(broker), provisioner.clone());

        let mut with_own = trigger();
        with_own.spec.delivery = Some(DeliverySpec {
            backoff_delay: Some("PT2S".to_string()),
            ..Default::default()
        });
        reconciler.reconcile_kind(&mut with_own).await.unwrap();
        reconciler.reconcile_kind(&mut trigger()).await.unwrap();

        let ensured = provisioner.ensured.lock().unwrap();
        let minimums: Vec<Duration> = ensured
            .iter()
            .map(|t| t.retry_policy.as_ref().unwrap().minimum_backoff)
            .collect();
        assert_eq!(minimums, vec![Duration::from_secs(2), Duration::from_secs(5)]);
    }

    #[tokio::test]
    async fn broker_without_delivery_uses_configured_default() {
        let provisioner = Arc::new(CountingProvisioner::default());
        let reconciler = reconciler(
            Some(Broker::new("ns1", "b1", "googlecloud")),
            provisioner.clone(),
        );

        reconciler.reconcile_kind(&mut trigger()).await.unwrap();

        let ensured = provisioner.ensured.lock().unwrap();
        let policy = ensured[0].retry_policy.as_ref().unwrap();
        assert_eq!(policy.minimum_backoff, Duration::from_secs(1));
    }

    #[tokio::test]
    async fn missing_broker_without_finalizer_touches_nothing() {
        let provisioner = Arc::new(CountingProvisioner::default());
        let reconciler = reconciler(None, provisioner.clone());
        let mut trigger = trigger();

        let outcome = reconciler.reconcile_kind(&mut trigger).await.unwrap();

        assert!(outcome.is_none());
        assert_eq!(*provisioner.deletes.lock().unwrap(), 0);
        let broker_ready = trigger.status.get_condition(BROKER_READY).unwrap();
        assert_eq!(broker_ready.status, ConditionStatus::False);
        assert_eq!(broker_ready.reason, REASON_BROKER_DOES_NOT_EXIST);
        assert_eq!(broker_ready.message, "Broker \"b1\" does not exist");
    }
}
