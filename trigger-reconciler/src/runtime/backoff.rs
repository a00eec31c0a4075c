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

use crate::config::BackoffConfig;
use crate::model::ObjectKey;
use std::collections::HashMap;
use std::time::Duration;
use tokio::sync::Mutex;

/// Per-key exponential requeue delay: `base * 2^failures`, capped at `max`.
pub struct ExponentialBackoff {
    base: Duration,
    max: Duration,
    failures: Mutex<HashMap<ObjectKey, u32>>,
}

impl ExponentialBackoff {
    pub fn new(base: Duration, max: Duration) -> Self {
        Self {
            base,
            max,
            failures: Mutex::new(HashMap::new()),
        }
    }

    pub fn from_config(config: &BackoffConfig) -> Self {
        Self::new(config.base(), config.max_duration())
    }

    /// Records one more failure for `key` and returns how long to wait before retrying it.
    pub async fn next_delay(&self, key: &ObjectKey) -> Duration {
        let mut failures = self.failures.lock().await;
        let count = failures.entry(key.clone()).or_insert(0);
        let exponent = *count;
        *count = count.saturating_add(1);

        self.base
            .checked_mul(2u32.saturating_pow(exponent))
            .map_or(self.max, |delay| delay.min(self.max))
    }

    pub async fn failures(&self, key: &ObjectKey) -> u32 {
        self.failures.lock().await.get(key).copied().unwrap_or(0)
    }

    /// Resets `key` after a successful pass.
    pub async fn forget(&self, key: &ObjectKey) {
        self.failures.lock().await.remove(key);
    }
}
