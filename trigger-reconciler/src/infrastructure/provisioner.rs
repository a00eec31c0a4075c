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

use crate::infrastructure::retry_target::RetryTarget;
use async_trait::async_trait;
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Provider failure, attributed to the resource that failed.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum InfrastructureError {
    Topic(String),
    Subscription(String),
}

impl Display for InfrastructureError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            InfrastructureError::Topic(reason) => write!(f, "retry topic: {reason}"),
            InfrastructureError::Subscription(reason) => {
                write!(f, "retry subscription: {reason}")
            }
        }
    }
}

impl Error for InfrastructureError {}

/// Message-transport provider owning retry topics and subscriptions.
///
/// Both calls must be idempotent. `ensure` with an unchanged target must not
/// recreate anything and updates a changed policy in place; `delete` of absent
/// resources succeeds.
#[async_trait]
pub trait RetryTopicProvisioner: Send + Sync {
    async fn ensure(&self, target: &RetryTarget) -> Result<(), InfrastructureError>;

    async fn delete(&self, target: &RetryTarget) -> Result<(), InfrastructureError>;
}
