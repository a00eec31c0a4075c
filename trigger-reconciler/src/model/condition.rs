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

//! Tri-state readiness conditions and the happy-condition manager.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Top-level condition every kind in this crate reports.
pub const READY: &str = "Ready";

#[derive(Clone, Copy, Debug, Default, Deserialize, Eq, Hash, PartialEq, Serialize)]
pub enum ConditionStatus {
    True,
    False,
    #[default]
    Unknown,
}

impl ConditionStatus {
    pub fn is_true(self) -> bool {
        self == ConditionStatus::True
    }
}

#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Condition {
    #[serde(rename = "type")]
    pub type_: String,
    pub status: ConditionStatus,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub reason: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_transition_time: Option<DateTime<Utc>>,
}

impl Condition {
    pub fn new(
        type_: &str,
        status: ConditionStatus,
        reason: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Self {
            type_: type_.to_string(),
            status,
            reason: reason.into(),
            message: message.into(),
            last_transition_time: None,
        }
    }

    pub fn is_true(&self) -> bool {
        self.status.is_true()
    }

    fn same_observation(&self, other: &Condition) -> bool {
        self.status == other.status
            && self.reason == other.reason
            && self.message == other.message
    }
}

/// Ordered condition list as it is persisted in an object's status.
#[derive(Clone, Debug, Default, Deserialize, Eq, PartialEq, Serialize)]
#[serde(transparent)]
pub struct Conditions(Vec<Condition>);

impl Conditions {
    pub fn new(conditions: Vec<Condition>) -> Self {
        Self(conditions)
    }

    pub fn get(&self, type_: &str) -> Option<&Condition> {
        self.0.iter().find(|c| c.type_ == type_)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Condition> {
        self.0.iter()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Stores `condition`, replacing any condition of the same type.
    ///
    /// Writing an identical observation is a no-op. The transition time only moves
    /// when the status itself flips. Returns `true` when anything changed.
    pub fn set(&mut self, mut condition: Condition) -> bool {
        match self.0.iter_mut().find(|c| c.type_ == condition.type_) {
            Some(existing) if existing.same_observation(&condition) => false,
            Some(existing) => {
                condition.last_transition_time = if existing.status == condition.status {
                    existing.last_transition_time
                } else {
                    Some(Utc::now())
                };
                *existing = condition;
                true
            }
            None => {
                condition.last_transition_time = Some(Utc::now());
                self.0.push(condition);
                true
            }
        }
    }
}

/// Observation derived from another object's top-level condition.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct ConditionUpdate {
    pub status: ConditionStatus,
    pub reason: String,
    pub message: String,
}

/// Reads the top-level `Ready` condition of a foreign condition list.
///
/// Returns `None` when the foreign object has not reported readiness yet, leaving the
/// caller to decide the fallback reason.
pub fn derive_condition(source: &Conditions) -> Option<ConditionUpdate> {
    source.get(READY).map(|ready| ConditionUpdate {
        status: ready.status,
        reason: ready.reason.clone(),
        message: ready.message.clone(),
    })
}

/// Happy-condition manager: a top-level condition computed from dependents.
///
/// Any `False` dependent makes the happy condition `False` with that dependent's
/// reason, otherwise any `Unknown` (or missing) dependent makes it `Unknown`,
/// otherwise it is `True`.
#[derive(Debug)]
pub struct ConditionSet {
    happy: &'static str,
    dependents: &'static [&'static str],
}

impl ConditionSet {
    pub const fn new(happy: &'static str, dependents: &'static [&'static str]) -> Self {
        Self { happy, dependents }
    }

    pub fn happy(&self) -> &'static str {
        self.happy
    }

    pub fn dependents(&self) -> &'static [&'static str] {
        self.dependents
    }

    /// Sets every missing condition to `Unknown`, keeping existing observations.
    pub fn initialize(&self, conditions: &mut Conditions) {
        for type_ in self.dependents {
            if conditions.get(type_).is_none() {
                conditions.set(Condition::new(type_, ConditionStatus::Unknown, "", ""));
            }
        }
        self.recompute_happy(conditions);
    }

    pub fn mark_true(&self, conditions: &mut Conditions, type_: &str) {
        conditions.set(Condition::new(type_, ConditionStatus::True, "", ""));
        self.recompute_happy(conditions);
    }

    pub fn mark_false(
        &self,
        conditions: &mut Conditions,
        type_: &str,
        reason: &str,
        message: String,
    ) {
        conditions.set(Condition::new(type_, ConditionStatus::False, reason, message));
        self.recompute_happy(conditions);
    }

    pub fn mark_unknown(
        &self,
        conditions: &mut Conditions,
        type_: &str,
        reason: &str,
        message: String,
    ) {
        conditions.set(Condition::new(type_, ConditionStatus::Unknown, reason, message));
        self.recompute_happy(conditions);
    }

    pub fn is_happy(&self, conditions: &Conditions) -> bool {
        conditions.get(self.happy).is_some_and(Condition::is_true)
    }

    fn recompute_happy(&self, conditions: &mut Conditions) {
        let mut unknown: Option<Condition> = None;

        for type_ in self.dependents {
            match conditions.get(type_) {
                Some(c) if c.status == ConditionStatus::False => {
                    let failed = Condition::new(
                        self.happy,
                        ConditionStatus::False,
                        c.reason.clone(),
                        c.message.clone(),
                    );
                    conditions.set(failed);
                    return;
                }
                Some(c) if c.status == ConditionStatus::Unknown => {
                    unknown.get_or_insert_with(|| {
                        Condition::new(
                            self.happy,
                            ConditionStatus::Unknown,
                            c.reason.clone(),
                            c.message.clone(),
                        )
                    });
                }
                Some(_) => {}
                None => {
                    unknown.get_or_insert_with(|| {
                        Condition::new(self.happy, ConditionStatus::Unknown, "", "")
                    });
                }
            }
        }

        let happy = unknown
            .unwrap_or_else(|| Condition::new(self.happy, ConditionStatus::True, "", ""));
        conditions.set(happy);
    }
}
