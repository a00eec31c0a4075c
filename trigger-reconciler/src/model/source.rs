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
use crate::model::meta::ObjectMeta;
use serde::{Deserialize, Serialize};

/// Duck-typed view of any object a Trigger may depend on.
///
/// Only the fields needed for readiness propagation are modelled.
#[derive(Clone, Debug, Default, Deserialize, Eq, PartialEq, Serialize)]
pub struct Source {
    pub metadata: ObjectMeta,
    #[serde(default)]
    pub status: SourceStatus,
}

#[derive(Clone, Debug, Default, Deserialize, Eq, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SourceStatus {
    #[serde(default)]
    pub observed_generation: i64,
    #[serde(default)]
    pub conditions: Conditions,
}

impl Source {
    /// `false` while the source has not caught up with its latest spec.
    pub fn is_status_current(&self) -> bool {
        self.metadata.generation == self.status.observed_generation
    }
}
