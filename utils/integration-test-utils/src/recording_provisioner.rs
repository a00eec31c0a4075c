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

use async_trait::async_trait;
use std::collections::BTreeMap;
use std::sync::Mutex;
use std::time::Duration;
use tracing::debug;
use trigger_reconciler::{InfrastructureError, RetryTarget, RetryTopicProvisioner};

/// Which provider call should fail, and on which resource.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum ProvisionerFailure {
    EnsureTopic,
    EnsureSubscription,
    DeleteTopic,
    DeleteSubscription,
}

#[derive(Default)]
struct Ledger {
    provisioned: BTreeMap<String, RetryTarget>,
    ensure_calls: usize,
    delete_calls: usize,
    creates: usize,
    updates: usize,
    deletes: usize,
}

/// In-memory provider that keeps what it provisioned and counts real changes.
///
/// `ensure` of an identical target is a no-op, a changed target counts as an
/// update, and `delete` of an absent target succeeds without counting.
#[derive(Default)]
pub struct RecordingProvisioner {
    ledger: Mutex<Ledger>,
    failure: Mutex<Option<ProvisionerFailure>>,
    ensure_delay: Option<Duration>,
}

impl RecordingProvisioner {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn failing(failure: ProvisionerFailure) -> Self {
        Self {
            failure: Mutex::new(Some(failure)),
            ..Default::default()
        }
    }

    /// Makes every `ensure` sleep for `delay` before answering.
    pub fn with_ensure_delay(mut self, delay: Duration) -> Self {
        self.ensure_delay = Some(delay);
        self
    }

    pub fn set_failure(&self, failure: Option<ProvisionerFailure>) {
        *self.failure.lock().expect("failure mode poisoned") = failure;
    }

    pub fn provisioned(&self, topic_id: &str) -> Option<RetryTarget> {
        self.ledger().provisioned.get(topic_id).cloned()
    }

    pub fn provisioned_count(&self) -> usize {
        self.ledger().provisioned.len()
    }

    pub fn ensure_calls(&self) -> usize {
        self.ledger().ensure_calls
    }

    pub fn delete_calls(&self) -> usize {
        self.ledger().delete_calls
    }

    pub fn creates(&self) -> usize {
        self.ledger().creates
    }

    pub fn updates(&self) -> usize {
        self.ledger().updates
    }

    pub fn deletes(&self) -> usize {
        self.ledger().deletes
    }

    fn ledger(&self) -> std::sync::MutexGuard<'_, Ledger> {
        self.ledger.lock().expect("provisioner ledger poisoned")
    }

    fn failure(&self) -> Option<ProvisionerFailure> {
        *self.failure.lock().expect("failure mode poisoned")
    }
}

#[async_trait]
impl RetryTopicProvisioner for RecordingProvisioner {
    async fn ensure(&self, target: &RetryTarget) -> Result<(), InfrastructureError> {
        if let Some(delay) = self.ensure_delay {
            tokio::time::sleep(delay).await;
        }

        let mut ledger = self.ledger();
        ledger.ensure_calls += 1;
        match self.failure() {
            Some(ProvisionerFailure::EnsureTopic) => {
                return Err(InfrastructureError::Topic("topic creation refused".to_string()))
            }
            Some(ProvisionerFailure::EnsureSubscription) => {
                return Err(InfrastructureError::Subscription(
                    "subscription creation refused".to_string(),
                ))
            }
            _ => {}
        }

        match ledger.provisioned.get(&target.topic_id) {
            Some(existing) if existing == target => {}
            Some(_) => {
                debug!("updating retry resources {}", target.topic_id);
                ledger.updates += 1;
                ledger
                    .provisioned
                    .insert(target.topic_id.clone(), target.clone());
            }
            None => {
                debug!("creating retry resources {}", target.topic_id);
                ledger.creates += 1;
                ledger
                    .provisioned
                    .insert(target.topic_id.clone(), target.clone());
            }
        }
        Ok(())
    }

    async fn delete(&self, target: &RetryTarget) -> Result<(), InfrastructureError> {
        let mut ledger = self.ledger();
        ledger.delete_calls += 1;
        match self.failure() {
            Some(ProvisionerFailure::DeleteTopic) => {
                return Err(InfrastructureError::Topic("topic deletion refused".to_string()))
            }
            Some(ProvisionerFailure::DeleteSubscription) => {
                return Err(InfrastructureError::Subscription(
                    "subscription deletion refused".to_string(),
                ))
            }
            _ => {}
        }

        if ledger.provisioned.remove(&target.topic_id).is_some() {
            debug!("deleted retry resources {}", target.topic_id);
            ledger.deletes += 1;
        }
        Ok(())
    }
}
