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

//! Parsing of the dependency annotation.

use crate::model::ObjectReference;
use std::error::Error;
use std::fmt::{Display, Formatter};

/// The dependency annotation could not be turned into an object reference.
///
/// Editing the Trigger is the only way out of this state, so it is never retried.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct ReferenceError {
    pub annotation: String,
    pub reason: String,
}

impl Display for ReferenceError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "getting object ref from dependency annotation {:?}: {}",
            self.annotation, self.reason
        )
    }
}

impl Error for ReferenceError {}

/// Parses `{"kind": .., "name": .., "apiVersion": ..}` into a reference.
///
/// The namespace is always left empty: dependencies live next to their Trigger.
pub fn parse_dependency_annotation(annotation: &str) -> Result<ObjectReference, ReferenceError> {
    let reference_error = |reason: String| ReferenceError {
        annotation: annotation.to_string(),
        reason,
    };

    let mut reference: ObjectReference =
        serde_json::from_str(annotation).map_err(|err| reference_error(err.to_string()))?;

    let missing: Vec<&str> = [
        ("apiVersion", reference.api_version.is_empty()),
        ("kind", reference.kind.is_empty()),
        ("name", reference.name.is_empty()),
    ]
    .into_iter()
    .filter_map(|(field, empty)| empty.then_some(field))
    .collect();

    if !missing.is_empty() {
        return Err(reference_error(format!(
            "missing field(s): {}",
            missing.join(", ")
        )));
    }

    reference.namespace.clear();
    Ok(reference)
}
