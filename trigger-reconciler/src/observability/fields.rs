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

//! Value-format helpers for structured log fields.

use crate::model::{ObjectKey, ObjectReference};

const NONE: &str = "none";

/// `ns/name` rendering used for the `trigger` key in controller-level events.
pub fn format_key(key: &ObjectKey) -> String {
    key.to_string()
}

/// `apiVersion/Kind ns/name` rendering of a dependency reference.
pub fn format_reference(reference: &ObjectReference) -> String {
    let namespace = if reference.namespace.is_empty() {
        NONE
    } else {
        reference.namespace.as_str()
    };
    format!(
        "{}/{} {}/{}",
        reference.api_version, reference.kind, namespace, reference.name
    )
}
