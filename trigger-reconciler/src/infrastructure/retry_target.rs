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

//! Retry topic/subscription identity and delivery policy derived from a Trigger.

use crate::model::{BackoffPolicy, DeliverySpec, ObjectKey, Trigger};
use std::collections::BTreeMap;
use std::time::Duration;

const RETRY_RESOURCE_PREFIX: &str = "cre-tgr";
const DEAD_LETTER_SCHEME: &str = "pubsub://";

pub const LABEL_RESOURCE: &str = "events.cloud.google.com/resource";
pub const LABEL_NAMESPACE: &str = "events.cloud.google.com/namespace";
pub const LABEL_TRIGGER: &str = "events.cloud.google.com/trigger";
pub const LABEL_BROKER: &str = "events.cloud.google.com/broker";

/// Provider-side bounds for retry backoff.
pub const DEFAULT_MINIMUM_BACKOFF: Duration = Duration::from_secs(1);
pub const MAXIMUM_BACKOFF: Duration = Duration::from_secs(600);

/// Provider-side bounds for dead-letter delivery attempts.
pub const MIN_DELIVERY_ATTEMPTS: u32 = 5;
pub const MAX_DELIVERY_ATTEMPTS: u32 = 100;

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct RetryPolicy {
    pub minimum_backoff: Duration,
    pub maximum_backoff: Duration,
}

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct DeadLetterPolicy {
    /// Project owning the dead-letter topic, `None` for the provider's default project.
    pub project: Option<String>,
    pub topic: String,
    pub max_delivery_attempts: u32,
}

/// Everything the provider needs to converge one Trigger's retry resources.
///
/// The topic and subscription ids include the Trigger uid so a Trigger deleted and
/// recreated under the same name never adopts its predecessor's resources.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct RetryTarget {
    pub trigger: ObjectKey,
    pub broker: String,
    pub topic_id: String,
    pub subscription_id: String,
    pub labels: BTreeMap<String, String>,
    pub retry_policy: Option<RetryPolicy>,
    pub dead_letter_policy: Option<DeadLetterPolicy>,
}

impl RetryTarget {
    /// Builds the target for `trigger`. Passing no delivery spec yields a key-only
    /// target, which is all deletion needs.
    pub fn from_trigger(trigger: &Trigger, delivery: Option<&DeliverySpec>) -> Self {
        let resource_id = retry_resource_id(trigger);

        let labels = BTreeMap::from([
            (LABEL_RESOURCE.to_string(), "trigger".to_string()),
            (LABEL_NAMESPACE.to_string(), trigger.namespace().to_string()),
            (LABEL_TRIGGER.to_string(), trigger.name().to_string()),
            (LABEL_BROKER.to_string(), trigger.spec.broker.clone()),
        ]);

        Self {
            trigger: trigger.key(),
            broker: trigger.spec.broker.clone(),
            topic_id: resource_id.clone(),
            subscription_id: resource_id,
            labels,
            retry_policy: delivery.map(retry_policy),
            dead_letter_policy: delivery.and_then(dead_letter_policy),
        }
    }
}

fn retry_resource_id(trigger: &Trigger) -> String {
    format!(
        "{RETRY_RESOURCE_PREFIX}_{}_{}_{}",
        trigger.namespace(),
        trigger.name(),
        trigger.metadata.uid
    )
}

fn retry_policy(delivery: &DeliverySpec) -> RetryPolicy {
    let minimum_backoff = delivery
        .backoff_delay()
        .unwrap_or(DEFAULT_MINIMUM_BACKOFF)
        .min(MAXIMUM_BACKOFF);

    let maximum_backoff = match delivery.backoff_policy {
        Some(BackoffPolicy::Linear) => minimum_backoff,
        Some(BackoffPolicy::Exponential) | None => MAXIMUM_BACKOFF,
    };

    RetryPolicy {
        minimum_backoff,
        maximum_backoff,
    }
}

fn dead_letter_policy(delivery: &DeliverySpec) -> Option<DeadLetterPolicy> {
    let uri = delivery.dead_letter_sink.as_ref()?.uri.as_deref()?;
    let path = uri.strip_prefix(DEAD_LETTER_SCHEME)?.trim_end_matches('/');
    let (project, topic) = match path.split_once('/') {
        Some((project, topic)) => (Some(project.to_string()), topic),
        None => (None, path),
    };
    if topic.is_empty() || topic.contains('/') {
        return None;
    }

    let max_delivery_attempts = delivery
        .retry
        .unwrap_or(MIN_DELIVERY_ATTEMPTS)
        .clamp(MIN_DELIVERY_ATTEMPTS, MAX_DELIVERY_ATTEMPTS);

    Some(DeadLetterPolicy {
        project,
        topic: topic.to_string(),
        max_delivery_attempts,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Destination;

    fn trigger() -> Trigger {
        let mut trigger = Trigger::new("ns1", "t1", "b1", Destination::from_uri("http://svc/"));
        trigger.metadata.uid = "0a1b".to_string();
        trigger
    }

    #[test]
    fn resource_ids_are_derived_from_identity() {
        let target = RetryTarget::from_trigger(&trigger(), None);

        assert_eq!(target.topic_id, "cre-tgr_ns1_t1_0a1b");
        assert_eq!(target.subscription_id, "cre-tgr_ns1_t1_0a1b");
        assert_eq!(target.labels.get(LABEL_BROKER).map(String::as_str), Some("b1"));
        assert!(target.retry_policy.is_none());
        assert!(target.dead_letter_policy.is_none());
    }

    #[test]
    fn exponential_policy_uses_delay_as_minimum() {
        let delivery = DeliverySpec {
            retry: Some(3),
            backoff_policy: Some(BackoffPolicy::Exponential),
            backoff_delay: Some("PT2S".to_string()),
            dead_letter_sink: None,
        };

        let policy = RetryTarget::from_trigger(&trigger(), Some(&delivery))
            .retry_policy
            .unwrap();

        assert_eq!(policy.minimum_backoff, Duration::from_secs(2));
        assert_eq!(policy.maximum_backoff, MAXIMUM_BACKOFF);
    }

    #[test]
    fn linear_policy_pins_maximum_to_minimum_and_caps_delay() {
        let delivery = DeliverySpec {
            backoff_policy: Some(BackoffPolicy::Linear),
            backoff_delay: Some("PT20M".to_string()),
            ..Default::default()
        };

        let policy = RetryTarget::from_trigger(&trigger(), Some(&delivery))
            .retry_policy
            .unwrap();

        assert_eq!(policy.minimum_backoff, MAXIMUM_BACKOFF);
        assert_eq!(policy.maximum_backoff, MAXIMUM_BACKOFF);
    }

    #[test]
    fn dead_letter_policy_requires_pubsub_sink_and_clamps_attempts() {
        let mut delivery = DeliverySpec {
            retry: Some(2),
            dead_letter_sink: Some(Destination::from_uri("pubsub://dead-letters")),
            ..Default::default()
        };

        let policy = RetryTarget::from_trigger(&trigger(), Some(&delivery))
            .dead_letter_policy
            .unwrap();
        assert_eq!(policy.project, None);
        assert_eq!(policy.topic, "dead-letters");
        assert_eq!(policy.max_delivery_attempts, MIN_DELIVERY_ATTEMPTS);

        delivery.retry = Some(1_000);
        delivery.dead_letter_sink = Some(Destination::from_uri("pubsub://my-project/dead-letters"));
        let policy = RetryTarget::from_trigger(&trigger(), Some(&delivery))
            .dead_letter_policy
            .unwrap();
        assert_eq!(policy.project.as_deref(), Some("my-project"));
        assert_eq!(policy.max_delivery_attempts, MAX_DELIVERY_ATTEMPTS);

        delivery.dead_letter_sink = Some(Destination::from_uri("http://sink/"));
        assert!(RetryTarget::from_trigger(&trigger(), Some(&delivery))
            .dead_letter_policy
            .is_none());
    }
}
