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

//! Ensure/delete orchestration over the retry topic provisioner.

use crate::infrastructure::provisioner::{InfrastructureError, RetryTopicProvisioner};
use crate::infrastructure::retry_target::RetryTarget;
use crate::model::trigger::{
    REASON_FINALIZE_SUBSCRIPTION_FAILED, REASON_FINALIZE_TOPIC_FAILED,
    REASON_SUBSCRIPTION_DELETED, REASON_SUBSCRIPTION_RECONCILE_FAILED, REASON_TOPIC_DELETED,
    REASON_TOPIC_RECONCILE_FAILED,
};
use crate::model::{DeliverySpec, Trigger};
use crate::observability::events;
use std::sync::Arc;
use tracing::{debug, warn};

const COMPONENT: &str = "routing_infrastructure";

/// Drives a Trigger's retry topic and subscription and records the result in
/// `TopicReady` / `SubscriptionReady`.
#[derive(Clone)]
pub struct RoutingInfrastructure {
    provisioner: Arc<dyn RetryTopicProvisioner>,
}

impl RoutingInfrastructure {
    pub fn new(provisioner: Arc<dyn RetryTopicProvisioner>) -> Self {
        Self { provisioner }
    }

    /// Creates or updates the retry resources for `trigger` with `delivery`.
    pub async fn ensure(
        &self,
        trigger: &mut Trigger,
        delivery: &DeliverySpec,
    ) -> Result<(), InfrastructureError> {
        let target = RetryTarget::from_trigger(trigger, Some(delivery));

        match self.provisioner.ensure(&target).await {
            Ok(()) => {
                debug!(
                    event = events::INFRA_ENSURE_OK,
                    component = COMPONENT,
                    namespace = trigger.namespace(),
                    trigger = trigger.name(),
                    topic = %target.topic_id,
                    "retry topic and subscription ensured"
                );
                trigger.status.mark_topic_ready();
                trigger.status.mark_subscription_ready();
                Ok(())
            }
            Err(err) => {
                warn!(
                    event = events::INFRA_ENSURE_FAILED,
                    component = COMPONENT,
                    namespace = trigger.namespace(),
                    trigger = trigger.name(),
                    topic = %target.topic_id,
                    err = %err,
                    "failed to reconcile retry resources"
                );
                match &err {
                    InfrastructureError::Topic(reason) => {
                        trigger.status.mark_topic_failed(
                            REASON_TOPIC_RECONCILE_FAILED,
                            format!("Failed to reconcile Pub/Sub topic: {reason}"),
                        );
                    }
                    InfrastructureError::Subscription(reason) => {
                        trigger.status.mark_topic_ready();
                        trigger.status.mark_subscription_failed(
                            REASON_SUBSCRIPTION_RECONCILE_FAILED,
                            format!("Failed to reconcile Pub/Sub subscription: {reason}"),
                        );
                    }
                }
                Err(err)
            }
        }
    }

    /// Deletes the retry resources for `trigger`. Absent resources are not an error.
    pub async fn delete(&self, trigger: &mut Trigger) -> Result<(), InfrastructureError> {
        let target = RetryTarget::from_trigger(trigger, None);

        match self.provisioner.delete(&target).await {
            Ok(()) => {
                debug!(
                    event = events::INFRA_DELETE_OK,
                    component = COMPONENT,
                    namespace = trigger.namespace(),
                    trigger = trigger.name(),
                    topic = %target.topic_id,
                    "retry topic and subscription deleted"
                );
                trigger.status.mark_topic_unknown(
                    REASON_TOPIC_DELETED,
                    format!("Topic {} deleted", target.topic_id),
                );
                trigger.status.mark_subscription_unknown(
                    REASON_SUBSCRIPTION_DELETED,
                    format!("Subscription {} deleted", target.subscription_id),
                );
                Ok(())
            }
            Err(err) => {
                warn!(
                    event = events::INFRA_DELETE_FAILED,
                    component = COMPONENT,
                    namespace = trigger.namespace(),
                    trigger = trigger.name(),
                    topic = %target.topic_id,
                    err = %err,
                    "failed to delete retry resources"
                );
                match &err {
                    InfrastructureError::Topic(reason) => {
                        trigger.status.mark_topic_unknown(
                            REASON_FINALIZE_TOPIC_FAILED,
                            format!("Failed to delete Pub/Sub topic: {reason}"),
                        );
                    }
                    InfrastructureError::Subscription(reason) => {
                        trigger.status.mark_subscription_unknown(
                            REASON_FINALIZE_SUBSCRIPTION_FAILED,
                            format!("Failed to delete Pub/Sub subscription: {reason}"),
                        );
                    }
                }
                Err(err)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::RoutingInfrastructure;
    use crate::infrastructure::provisioner::{InfrastructureError, RetryTopicProvisioner};
    use crate::infrastructure::retry_target::RetryTarget;
    use crate::model::trigger::{
        REASON_FINALIZE_SUBSCRIPTION_FAILED, REASON_SUBSCRIPTION_RECONCILE_FAILED,
        REASON_TOPIC_DELETED, SUBSCRIPTION_READY, TOPIC_READY,
    };
    use crate::model::{ConditionStatus, DeliverySpec, Destination, Trigger};
    use async_trait::async_trait;
    use std::sync::{Arc, Mutex};

    /// Returns the configured outcome and records every target it saw.
    #[derive(Default)]
    struct ScriptedProvisioner {
        outcome: Option<InfrastructureError>,
        ensured: Mutex<Vec<RetryTarget>>,
        deleted: Mutex<Vec<RetryTarget>>,
    }

    #[async_trait]
    impl RetryTopicProvisioner for ScriptedProvisioner {
        async fn ensure(&self, target: &RetryTarget) -> Result<(), InfrastructureError> {
            self.ensured.lock().unwrap().push(target.clone());
            self.outcome.clone().map_or(Ok(()), Err)
        }

        async fn delete(&self, target: &RetryTarget) -> Result<(), InfrastructureError> {
            self.deleted.lock().unwrap().push(target.clone());
            self.outcome.clone().map_or(Ok(()), Err)
        }
    }

    fn trigger() -> Trigger {
        let mut trigger = Trigger::new("ns1", "t1", "b1", Destination::from_uri("http://svc/"));
        trigger.status.initialize_conditions();
        trigger
    }

    fn status_of(trigger: &Trigger, type_: &str) -> (ConditionStatus, String) {
        let condition = trigger.status.get_condition(type_).unwrap();
        (condition.status, condition.reason.clone())
    }

    #[tokio::test]
    async fn ensure_success_marks_both_ready() {
        let provisioner = Arc::new(ScriptedProvisioner::default());
        let infrastructure = RoutingInfrastructure::new(provisioner.clone());
        let mut trigger = trigger();

        infrastructure
            .ensure(&mut trigger, &DeliverySpec::default())
            .await
            .unwrap();

        assert!(trigger.status.get_condition(TOPIC_READY).unwrap().is_true());
        assert!(trigger
            .status
            .get_condition(SUBSCRIPTION_READY)
            .unwrap()
            .is_true());
        let ensured = provisioner.ensured.lock().unwrap();
        assert_eq!(ensured.len(), 1);
        assert!(ensured[0].retry_policy.is_some());
    }

    #[tokio::test]
    async fn subscription_failure_keeps_topic_ready() {
        let provisioner = Arc::new(ScriptedProvisioner {
            outcome: Some(InfrastructureError::Subscription("quota".to_string())),
            ..Default::default()
        });
        let infrastructure = RoutingInfrastructure::new(provisioner);
        let mut trigger = trigger();

        assert!(infrastructure
            .ensure(&mut trigger, &DeliverySpec::default())
            .await
            .is_err());

        assert!(trigger.status.get_condition(TOPIC_READY).unwrap().is_true());
        assert_eq!(
            status_of(&trigger, SUBSCRIPTION_READY),
            (
                ConditionStatus::False,
                REASON_SUBSCRIPTION_RECONCILE_FAILED.to_string()
            )
        );
        assert!(!trigger.status.is_ready());
    }

    #[tokio::test]
    async fn delete_marks_conditions_unknown() {
        let provisioner = Arc::new(ScriptedProvisioner::default());
        let infrastructure = RoutingInfrastructure::new(provisioner.clone());
        let mut trigger = trigger();

        infrastructure.delete(&mut trigger).await.unwrap();

        assert_eq!(
            status_of(&trigger, TOPIC_READY),
            (ConditionStatus::Unknown, REASON_TOPIC_DELETED.to_string())
        );
        assert!(provisioner.deleted.lock().unwrap()[0]
            .retry_policy
            .is_none());
    }

    #[tokio::test]
    async fn delete_failure_names_the_failing_resource() {
        let provisioner = Arc::new(ScriptedProvisioner {
            outcome: Some(InfrastructureError::Subscription("permission denied".to_string())),
            ..Default::default()
        });
        let infrastructure = RoutingInfrastructure::new(provisioner);
        let mut trigger = trigger();

        assert!(infrastructure.delete(&mut trigger).await.is_err());

        assert_eq!(
            status_of(&trigger, SUBSCRIPTION_READY),
            (
                ConditionStatus::Unknown,
                REASON_FINALIZE_SUBSCRIPTION_FAILED.to_string()
            )
        );
    }
}
