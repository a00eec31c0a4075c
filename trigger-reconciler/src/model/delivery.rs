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

//! Retry and dead-letter delivery options.

use crate::model::reference::Destination;
use serde::{Deserialize, Serialize};
use std::time::Duration;

#[derive(Clone, Copy, Debug, Deserialize, Eq, PartialEq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum BackoffPolicy {
    Exponential,
    Linear,
}

#[derive(Clone, Debug, Default, Deserialize, Eq, PartialEq, Serialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct DeliverySpec {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub retry: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub backoff_policy: Option<BackoffPolicy>,
    /// ISO-8601 duration such as `PT1S` or `PT0.5S`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub backoff_delay: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dead_letter_sink: Option<Destination>,
}

impl DeliverySpec {
    /// Parsed `backoff_delay`. Unparsable values read as absent.
    pub fn backoff_delay(&self) -> Option<Duration> {
        self.backoff_delay.as_deref().and_then(parse_iso8601_duration)
    }
}

const NANOS_PER_SEC: u128 = 1_000_000_000;

/// Parses the time-based subset of ISO-8601 durations (`PnDTnHnMnS`).
///
/// Year and month designators are rejected since they have no fixed length.
/// Fractions are exact down to the nanosecond.
pub fn parse_iso8601_duration(value: &str) -> Option<Duration> {
    let rest = value.strip_prefix('P')?;
    if rest.is_empty() {
        return None;
    }

    let (date_part, time_part) = match rest.split_once('T') {
        Some((date, time)) if !time.is_empty() => (date, Some(time)),
        Some(_) => return None,
        None => (rest, None),
    };

    let mut total = Duration::ZERO;
    for (amount, designator) in split_components(date_part)? {
        let unit_secs = match designator {
            'W' => 7 * 86_400,
            'D' => 86_400,
            _ => return None,
        };
        total = total.checked_add(component_duration(amount, unit_secs)?)?;
    }
    if let Some(time_part) = time_part {
        for (amount, designator) in split_components(time_part)? {
            let unit_secs = match designator {
                'H' => 3_600,
                'M' => 60,
                'S' => 1,
                _ => return None,
            };
            total = total.checked_add(component_duration(amount, unit_secs)?)?;
        }
    }

    Some(total)
}

fn split_components(part: &str) -> Option<Vec<(&str, char)>> {
    let mut components = Vec::new();
    let mut start = 0;

    for (index, ch) in part.char_indices() {
        if ch.is_ascii_digit() || ch == '.' || ch == ',' {
            continue;
        }
        if index == start {
            return None;
        }
        components.push((&part[start..index], ch));
        start = index + ch.len_utf8();
    }

    if start != part.len() {
        return None;
    }
    Some(components)
}

/// `amount` units of `unit_secs` seconds, where `amount` may carry a fraction.
fn component_duration(amount: &str, unit_secs: u64) -> Option<Duration> {
    let (whole, fraction) = amount
        .split_once(|c: char| c == '.' || c == ',')
        .unwrap_or((amount, ""));
    if whole.is_empty() && fraction.is_empty() {
        return None;
    }
    if !whole.bytes().chain(fraction.bytes()).all(|b| b.is_ascii_digit()) {
        return None;
    }

    let whole: u128 = if whole.is_empty() { 0 } else { whole.parse().ok()? };
    let fraction = &fraction[..fraction.len().min(9)];
    let (numerator, scale) = if fraction.is_empty() {
        (0u128, 1u128)
    } else {
        (fraction.parse().ok()?, 10u128.pow(fraction.len() as u32))
    };

    let unit_nanos = u128::from(unit_secs) * NANOS_PER_SEC;
    let nanos = whole
        .checked_mul(unit_nanos)?
        .checked_add(numerator * unit_nanos / scale)?;
    let secs = u64::try_from(nanos / NANOS_PER_SEC).ok()?;
    Some(Duration::new(secs, (nanos % NANOS_PER_SEC) as u32))
}
