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

use crate::model::condition::Conditions;
use crate::model::delivery::DeliverySpec;
use crate::model::meta::ObjectMeta;
use serde::{Deserialize, Serialize};

/// Annotation naming the reconciler variant that owns a Broker.
pub const BROKER_CLASS_ANNOTATION: &str = "eventing.knative.dev/broker.class";

/// Parent aggregate a Trigger binds to. Only ever read by this crate.
#[derive(Clone, Debug, Default, Deserialize, Eq, PartialEq, Serialize)]
pub struct Broker {
    pub metadata: ObjectMeta,
    #[serde(default)]
    pub spec: BrokerSpec,
    #[serde(default)]
    pub status: BrokerStatus,
}

#[derive(Clone, Debug, Default, Deserialize, Eq, PartialEq, Serialize)]
pub struct BrokerSpec {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub delivery: Option<DeliverySpec>,
}

#[derive(Clone, Debug, Default, Deserialize, Eq, PartialEq, Serialize)]
pub struct BrokerStatus {
    #[serde(default)]
    pub conditions: Conditions,
}

impl Broker {
    pub fn new(namespace: &str, name: &str, class: &str) -> Self {
        let mut metadata = ObjectMeta::new(namespace, name);
        metadata
            .annotations
            .insert(BROKER_CLASS_ANNOTATION.to_string(), class.to_string());
        Self {
            metadata,
            ..Default::default()
        }
    }

    pub fn class(&self) -> Option<&str> {
        self.metadata.annotation(BROKER_CLASS_ANNOTATION)
    }
}
