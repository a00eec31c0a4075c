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

use crate::model::{BackoffPolicy, DeliverySpec};
use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::time::Duration;

pub const DEFAULT_BROKER_CLASS: &str = "googlecloud";
pub const DEFAULT_FINALIZER: &str = "googlecloud";

#[derive(Debug)]
pub enum ConfigError {
    Parse(String),
    Invalid(String),
}

impl Display for ConfigError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigError::Parse(reason) => write!(f, "unable to parse reconciler config: {reason}"),
            ConfigError::Invalid(reason) => write!(f, "invalid reconciler config: {reason}"),
        }
    }
}

impl Error for ConfigError {}

#[derive(Deserialize, Serialize, Debug, Clone, Eq, PartialEq)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct ReconcilerConfig {
    /// Broker class this reconciler owns. Triggers of other classes are released.
    #[serde(default = "default_broker_class")]
    pub broker_class: String,
    #[serde(default = "default_finalizer")]
    pub finalizer: String,
    #[serde(default = "default_reconcile_timeout_secs")]
    pub reconcile_timeout_secs: u64,
    #[serde(default)]
    pub backoff: BackoffConfig,
    /// Delivery used when neither the Trigger nor its Broker sets one.
    #[serde(default = "default_delivery")]
    pub default_delivery: DeliverySpec,
}

#[derive(Deserialize, Serialize, Debug, Clone, Eq, PartialEq)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct BackoffConfig {
    #[serde(default = "default_backoff_base_millis")]
    pub base_millis: u64,
    #[serde(default = "default_backoff_max_secs")]
    pub max_secs: u64,
}

impl Default for ReconcilerConfig {
    fn default() -> Self {
        Self {
            broker_class: default_broker_class(),
            finalizer: default_finalizer(),
            reconcile_timeout_secs: default_reconcile_timeout_secs(),
            backoff: BackoffConfig::default(),
            default_delivery: default_delivery(),
        }
    }
}

impl Default for BackoffConfig {
    fn default() -> Self {
        Self {
            base_millis: default_backoff_base_millis(),
            max_secs: default_backoff_max_secs(),
        }
    }
}

impl ReconcilerConfig {
    pub fn from_json5(contents: &str) -> Result<Self, ConfigError> {
        let config: Self =
            json5::from_str(contents).map_err(|e| ConfigError::Parse(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.broker_class.is_empty() {
            return Err(ConfigError::Invalid("brokerClass must not be empty".to_string()));
        }
        if self.finalizer.is_empty() {
            return Err(ConfigError::Invalid("finalizer must not be empty".to_string()));
        }
        if self.reconcile_timeout_secs == 0 {
            return Err(ConfigError::Invalid(
                "reconcileTimeoutSecs must be positive".to_string(),
            ));
        }
        if self.backoff.base_millis == 0 || self.backoff.max_duration() < self.backoff.base() {
            return Err(ConfigError::Invalid(
                "backoff requires 0 < baseMillis <= maxSecs".to_string(),
            ));
        }
        if let Some(delay) = &self.default_delivery.backoff_delay {
            if self.default_delivery.backoff_delay().is_none() {
                return Err(ConfigError::Invalid(format!(
                    "defaultDelivery.backoffDelay {delay:?} is not an ISO-8601 duration"
                )));
            }
        }
        Ok(())
    }

    pub fn reconcile_timeout(&self) -> Duration {
        Duration::from_secs(self.reconcile_timeout_secs)
    }
}

impl BackoffConfig {
    pub fn base(&self) -> Duration {
        Duration::from_millis(self.base_millis)
    }

    pub fn max_duration(&self) -> Duration {
        Duration::from_secs(self.max_secs)
    }
}

fn default_broker_class() -> String {
    DEFAULT_BROKER_CLASS.to_string()
}

fn default_finalizer() -> String {
    DEFAULT_FINALIZER.to_string()
}

fn default_reconcile_timeout_secs() -> u64 {
    30
}

fn default_backoff_base_millis() -> u64 {
    5
}

fn default_backoff_max_secs() -> u64 {
    1000
}

fn default_delivery() -> DeliverySpec {
    DeliverySpec {
        retry: Some(6),
        backoff_policy: Some(BackoffPolicy::Exponential),
        backoff_delay: Some("PT1S".to_string()),
        dead_letter_sink: None,
    }
}

#[cfg(test)]
mod tests {
    use super::{ConfigError, ReconcilerConfig};
    use crate::model::BackoffPolicy;
    use std::time::Duration;

    #[test]
    fn empty_document_yields_defaults() {
        let config = ReconcilerConfig::from_json5("{}").unwrap();

        assert_eq!(config, ReconcilerConfig::default());
        assert_eq!(config.broker_class, "googlecloud");
        assert_eq!(config.reconcile_timeout(), Duration::from_secs(30));
        assert_eq!(config.default_delivery.retry, Some(6));
        assert_eq!(
            config.default_delivery.backoff_policy,
            Some(BackoffPolicy::Exponential)
        );
    }

    #[test]
    fn json5_overrides_are_applied() {
        let config = ReconcilerConfig::from_json5(
            r#"{
                // comments are allowed
                brokerClass: "custom",
                backoff: { baseMillis: 10 },
                defaultDelivery: { retry: 3, backoffPolicy: "linear", backoffDelay: "PT0.5S" },
            }"#,
        )
        .unwrap();

        assert_eq!(config.broker_class, "custom");
        assert_eq!(config.backoff.base_millis, 10);
        assert_eq!(config.backoff.max_secs, 1000);
        assert_eq!(
            config.default_delivery.backoff_delay(),
            Some(Duration::from_millis(500))
        );
    }

    #[test]
    fn unknown_fields_are_rejected() {
        assert!(matches!(
            ReconcilerConfig::from_json5("{ brokerClas: \"typo\" }"),
            Err(ConfigError::Parse(_))
        ));
    }

    #[test]
    fn invalid_values_are_rejected() {
        assert!(matches!(
            ReconcilerConfig::from_json5("{ reconcileTimeoutSecs: 0 }"),
            Err(ConfigError::Invalid(_))
        ));
        assert!(matches!(
            ReconcilerConfig::from_json5("{ defaultDelivery: { backoffDelay: \"1s\" } }"),
            Err(ConfigError::Invalid(_))
        ));
    }
}
