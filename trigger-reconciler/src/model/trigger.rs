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

//! Trigger resource and its status lifecycle.
//!
//! Every `mark_*` helper updates the dependent condition and recomputes the
//! top-level `Ready` condition in the same step, so callers can return an error
//! right after marking without leaving the two out of sync.

use crate::model::broker::BrokerStatus;
use crate::model::condition::{
    derive_condition, Condition, ConditionSet, ConditionStatus, Conditions, READY,
};
use crate::model::delivery::DeliverySpec;
use crate::model::meta::{ObjectKey, ObjectMeta};
use crate::model::reference::Destination;
use serde::{Deserialize, Serialize};

/// Annotation holding a JSON object reference to the Trigger's dependency.
pub const DEPENDENCY_ANNOTATION: &str = "knative.dev/dependency";

pub const BROKER_READY: &str = "BrokerReady";
pub const SUBSCRIBER_RESOLVED: &str = "SubscriberResolved";
pub const DEPENDENCY_READY: &str = "DependencyReady";
pub const TOPIC_READY: &str = "TopicReady";
pub const SUBSCRIPTION_READY: &str = "SubscriptionReady";

pub const REASON_BROKER_DOES_NOT_EXIST: &str = "BrokerDoesNotExist";
pub const REASON_BROKER_NOT_CONFIGURED: &str = "BrokerNotConfigured";
pub const REASON_SUBSCRIBER_UNRESOLVED: &str = "Unable to get the Subscriber's URI";
pub const REASON_REFERENCE_ERROR: &str = "ReferenceError";
pub const REASON_TRACKING_ERROR: &str = "TrackingError";
pub const REASON_LISTER_DOES_NOT_EXIST: &str = "ListerDoesNotExist";
pub const REASON_DEPENDENCY_DOES_NOT_EXIST: &str = "DependencyDoesNotExist";
pub const REASON_DEPENDENCY_GET_FAILED: &str = "DependencyGetFailed";
pub const REASON_GENERATION_NOT_EQUAL: &str = "GenerationNotEqual";
pub const REASON_DEPENDENCY_UNKNOWN: &str = "DependencyUnknown";
pub const REASON_TOPIC_RECONCILE_FAILED: &str = "TopicReconcileFailed";
pub const REASON_SUBSCRIPTION_RECONCILE_FAILED: &str = "SubscriptionReconcileFailed";
pub const REASON_TOPIC_DELETED: &str = "TopicDeleted";
pub const REASON_SUBSCRIPTION_DELETED: &str = "SubscriptionDeleted";
pub const REASON_FINALIZE_TOPIC_FAILED: &str = "FinalizeTopicFailed";
pub const REASON_FINALIZE_SUBSCRIPTION_FAILED: &str = "FinalizeSubscriptionFailed";

pub static TRIGGER_CONDITIONS: ConditionSet = ConditionSet::new(
    READY,
    &[
        BROKER_READY,
        SUBSCRIBER_RESOLVED,
        DEPENDENCY_READY,
        TOPIC_READY,
        SUBSCRIPTION_READY,
    ],
);

/// Routing entity binding a Broker to a subscriber.
#[derive(Clone, Debug, Default, Deserialize, Eq, PartialEq, Serialize)]
pub struct Trigger {
    pub metadata: ObjectMeta,
    pub spec: TriggerSpec,
    #[serde(default)]
    pub status: TriggerStatus,
}

#[derive(Clone, Debug, Default, Deserialize, Eq, PartialEq, Serialize)]
pub struct TriggerSpec {
    pub broker: String,
    pub subscriber: Destination,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub delivery: Option<DeliverySpec>,
}

#[derive(Clone, Debug, Default, Deserialize, Eq, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TriggerStatus {
    #[serde(default)]
    pub observed_generation: i64,
    #[serde(default)]
    pub conditions: Conditions,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub subscriber_uri: Option<String>,
}

impl Trigger {
    pub fn new(namespace: &str, name: &str, broker: &str, subscriber: Destination) -> Self {
        Self {
            metadata: ObjectMeta::new(namespace, name),
            spec: TriggerSpec {
                broker: broker.to_string(),
                subscriber,
                delivery: None,
            },
            status: TriggerStatus::default(),
        }
    }

    pub fn key(&self) -> ObjectKey {
        self.metadata.key()
    }

    pub fn namespace(&self) -> &str {
        &self.metadata.namespace
    }

    pub fn name(&self) -> &str {
        &self.metadata.name
    }

    pub fn dependency_annotation(&self) -> Option<&str> {
        self.metadata.annotation(DEPENDENCY_ANNOTATION)
    }
}

impl TriggerStatus {
    pub fn get_condition(&self, type_: &str) -> Option<&Condition> {
        self.conditions.get(type_)
    }

    pub fn is_ready(&self) -> bool {
        TRIGGER_CONDITIONS.is_happy(&self.conditions)
    }

    pub fn initialize_conditions(&mut self) {
        TRIGGER_CONDITIONS.initialize(&mut self.conditions);
    }

    /// Mirrors the Broker's top-level readiness into `BrokerReady`.
    pub fn propagate_broker_status(&mut self, broker_status: &BrokerStatus) {
        let Some(ready) = derive_condition(&broker_status.conditions) else {
            self.mark_broker_unknown(
                REASON_BROKER_NOT_CONFIGURED,
                "Broker has not yet been reconciled.".to_string(),
            );
            return;
        };

        match ready.status {
            ConditionStatus::True => {
                TRIGGER_CONDITIONS.mark_true(&mut self.conditions, BROKER_READY)
            }
            ConditionStatus::False => {
                self.mark_broker_failed(&format!("Broker/{}", ready.reason), ready.message)
            }
            ConditionStatus::Unknown => {
                self.mark_broker_unknown(&format!("Broker/{}", ready.reason), ready.message)
            }
        }
    }

    pub fn mark_broker_failed(&mut self, reason: &str, message: String) {
        TRIGGER_CONDITIONS.mark_false(&mut self.conditions, BROKER_READY, reason, message);
    }

    pub fn mark_broker_unknown(&mut self, reason: &str, message: String) {
        TRIGGER_CONDITIONS.mark_unknown(&mut self.conditions, BROKER_READY, reason, message);
    }

    pub fn mark_subscriber_resolved_succeeded(&mut self) {
        TRIGGER_CONDITIONS.mark_true(&mut self.conditions, SUBSCRIBER_RESOLVED);
    }

    pub fn mark_subscriber_resolved_failed(&mut self, reason: &str, message: String) {
        TRIGGER_CONDITIONS.mark_false(&mut self.conditions, SUBSCRIBER_RESOLVED, reason, message);
    }

    pub fn mark_dependency_succeeded(&mut self) {
        TRIGGER_CONDITIONS.mark_true(&mut self.conditions, DEPENDENCY_READY);
    }

    pub fn mark_dependency_failed(&mut self, reason: &str, message: String) {
        TRIGGER_CONDITIONS.mark_false(&mut self.conditions, DEPENDENCY_READY, reason, message);
    }

    pub fn mark_dependency_unknown(&mut self, reason: &str, message: String) {
        TRIGGER_CONDITIONS.mark_unknown(&mut self.conditions, DEPENDENCY_READY, reason, message);
    }

    /// Mirrors a dependency's top-level readiness into `DependencyReady`.
    pub fn propagate_dependency_status(&mut self, dependency_conditions: &Conditions) {
        match derive_condition(dependency_conditions) {
            Some(ready) if ready.status == ConditionStatus::True => {
                self.mark_dependency_succeeded()
            }
            Some(ready) if ready.status == ConditionStatus::False => {
                self.mark_dependency_failed(&ready.reason, ready.message)
            }
            Some(ready) => self.mark_dependency_unknown(&ready.reason, ready.message),
            None => self.mark_dependency_unknown(
                REASON_DEPENDENCY_UNKNOWN,
                "Dependency has not reported readiness".to_string(),
            ),
        }
    }

    pub fn mark_topic_ready(&mut self) {
        TRIGGER_CONDITIONS.mark_true(&mut self.conditions, TOPIC_READY);
    }

    pub fn mark_topic_failed(&mut self, reason: &str, message: String) {
        TRIGGER_CONDITIONS.mark_false(&mut self.conditions, TOPIC_READY, reason, message);
    }

    pub fn mark_topic_unknown(&mut self, reason: &str, message: String) {
        TRIGGER_CONDITIONS.mark_unknown(&mut self.conditions, TOPIC_READY, reason, message);
    }

    pub fn mark_subscription_ready(&mut self) {
        TRIGGER_CONDITIONS.mark_true(&mut self.conditions, SUBSCRIPTION_READY);
    }

    pub fn mark_subscription_failed(&mut self, reason: &str, message: String) {
        TRIGGER_CONDITIONS.mark_false(&mut self.conditions, SUBSCRIPTION_READY, reason, message);
    }

    pub fn mark_subscription_unknown(&mut self, reason: &str, message: String) {
        TRIGGER_CONDITIONS.mark_unknown(&mut self.conditions, SUBSCRIPTION_READY, reason, message);
    }
}
