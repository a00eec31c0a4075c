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

use crate::model::ObjectKey;
use std::fmt::{Display, Formatter};

pub const TRIGGER_RECONCILED: &str = "TriggerReconciled";
pub const TRIGGER_FINALIZED: &str = "TriggerFinalized";

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum EventType {
    Normal,
    Warning,
}

impl Display for EventType {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            EventType::Normal => write!(f, "Normal"),
            EventType::Warning => write!(f, "Warning"),
        }
    }
}

/// Human-facing record of a reconcile outcome, attached to the Trigger.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct ReconcileEvent {
    pub event_type: EventType,
    pub reason: String,
    pub message: String,
}

impl ReconcileEvent {
    pub fn normal(reason: &str, message: impl Into<String>) -> Self {
        Self {
            event_type: EventType::Normal,
            reason: reason.to_string(),
            message: message.into(),
        }
    }

    pub fn warning(reason: &str, message: impl Into<String>) -> Self {
        Self {
            event_type: EventType::Warning,
            reason: reason.to_string(),
            message: message.into(),
        }
    }

    pub fn trigger_reconciled(key: &ObjectKey) -> Self {
        Self::normal(
            TRIGGER_RECONCILED,
            format!("Trigger reconciled: \"{}/{}\"", key.namespace, key.name),
        )
    }

    pub fn trigger_finalized(key: &ObjectKey) -> Self {
        Self::normal(
            TRIGGER_FINALIZED,
            format!("Trigger finalized: \"{}/{}\"", key.namespace, key.name),
        )
    }
}

impl Display for ReconcileEvent {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} {}: {}", self.event_type, self.reason, self.message)
    }
}

#[cfg(test)]
mod tests {
    use super::{EventType, ReconcileEvent};
    use crate::model::ObjectKey;

    #[test]
    fn outcome_events_quote_the_trigger_key() {
        let key = ObjectKey::new("ns1", "t1");

        let reconciled = ReconcileEvent::trigger_reconciled(&key);
        assert_eq!(reconciled.event_type, EventType::Normal);
        assert_eq!(reconciled.reason, "TriggerReconciled");
        assert_eq!(reconciled.message, "Trigger reconciled: \"ns1/t1\"");

        assert_eq!(
            ReconcileEvent::trigger_finalized(&key).to_string(),
            "Normal TriggerFinalized: Trigger finalized: \"ns1/t1\""
        );
    }
}
