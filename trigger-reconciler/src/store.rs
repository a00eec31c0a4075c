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

//! Object-store capabilities.
//!
//! Brokers are reachable through a read-only lister while Triggers get a client
//! with write access, so the reconciler can never mutate a Broker by accident.

use crate::model::{Broker, ObjectKey, Trigger};
use async_trait::async_trait;
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Failures reported by the object store.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum StoreError {
    NotFound {
        kind: &'static str,
        key: ObjectKey,
    },
    /// The write carried a stale `resource_version`.
    Conflict {
        key: ObjectKey,
        expected: u64,
        actual: u64,
    },
    Unavailable(String),
}

impl StoreError {
    pub fn not_found(kind: &'static str, namespace: &str, name: &str) -> Self {
        StoreError::NotFound {
            kind,
            key: ObjectKey::new(namespace, name),
        }
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, StoreError::NotFound { .. })
    }

    pub fn is_conflict(&self) -> bool {
        matches!(self, StoreError::Conflict { .. })
    }
}

impl Display for StoreError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            StoreError::NotFound { kind, key } => write!(f, "{kind} \"{key}\" not found"),
            StoreError::Conflict {
                key,
                expected,
                actual,
            } => write!(
                f,
                "conflicting write on {key}: resource version {expected} is stale, current is {actual}"
            ),
            StoreError::Unavailable(reason) => write!(f, "object store unavailable: {reason}"),
        }
    }
}

impl Error for StoreError {}

/// Read-only view of Brokers.
#[async_trait]
pub trait BrokerLister: Send + Sync {
    async fn get(&self, namespace: &str, name: &str) -> Result<Broker, StoreError>;
}

/// Read/write access to Triggers.
///
/// `update` persists metadata and spec, `update_status` persists only the status.
/// Both reject writes whose `resource_version` does not match the stored object.
#[async_trait]
pub trait TriggerClient: Send + Sync {
    async fn get(&self, key: &ObjectKey) -> Result<Trigger, StoreError>;

    async fn list(&self) -> Result<Vec<Trigger>, StoreError>;

    async fn update(&self, trigger: &Trigger) -> Result<Trigger, StoreError>;

    async fn update_status(&self, trigger: &Trigger) -> Result<Trigger, StoreError>;
}
