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

use trigger_reconciler::model::{
    Condition, ConditionStatus, Conditions, Destination, ObjectMeta, SourceStatus, READY,
};
use trigger_reconciler::{Broker, ObjectReference, Source, Trigger};

pub const OWNED_CLASS: &str = "googlecloud";
pub const PING_API_VERSION: &str = "sources.knative.dev/v1";
pub const PING_KIND: &str = "PingSource";

/// Broker of `class` with no status at all.
pub fn broker(namespace: &str, name: &str, class: &str) -> Broker {
    Broker::new(namespace, name, class)
}

/// Owned-class Broker reporting `Ready=True`.
pub fn ready_broker(namespace: &str, name: &str) -> Broker {
    let mut broker = Broker::new(namespace, name, OWNED_CLASS);
    broker.status.conditions = Conditions::new(vec![Condition::new(
        READY,
        ConditionStatus::True,
        "",
        "",
    )]);
    broker
}

/// `v1/Service` subscriber with the namespace left for the Trigger to default.
pub fn service_subscriber(name: &str) -> Destination {
    Destination::from_reference(ObjectReference::new("v1", "Service", "", name))
}

pub fn trigger(namespace: &str, name: &str, broker: &str) -> Trigger {
    Trigger::new(namespace, name, broker, service_subscriber("display"))
}

/// Dependency annotation value pointing at the PingSource `name`.
pub fn dependency_annotation(name: &str) -> String {
    format!(r#"{{"kind":"{PING_KIND}","name":"{name}","apiVersion":"{PING_API_VERSION}"}}"#)
}

pub fn ping_source(
    namespace: &str,
    name: &str,
    generation: i64,
    observed_generation: i64,
    ready: ConditionStatus,
) -> Source {
    let mut metadata = ObjectMeta::new(namespace, name);
    metadata.generation = generation;
    Source {
        metadata,
        status: SourceStatus {
            observed_generation,
            conditions: Conditions::new(vec![Condition::new(READY, ready, "", "")]),
        },
    }
}
