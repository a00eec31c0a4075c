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
use std::sync::Mutex;
use tracing::debug;
use trigger_reconciler::model::Destination;
use trigger_reconciler::{Broker, ResolveError, UriResolver};

/// Resolves references to cluster-local service addresses, or fails every call.
#[derive(Default)]
pub struct StaticUriResolver {
    failure: Option<String>,
    requests: Mutex<Vec<Destination>>,
}

impl StaticUriResolver {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn failing(reason: &str) -> Self {
        Self {
            failure: Some(reason.to_string()),
            ..Default::default()
        }
    }

    /// Destinations exactly as the reconciler handed them over.
    pub fn requests(&self) -> Vec<Destination> {
        self.requests.lock().expect("request log poisoned").clone()
    }
}

#[async_trait]
impl UriResolver for StaticUriResolver {
    async fn resolve(
        &self,
        destination: &Destination,
        parent: &Broker,
    ) -> Result<String, ResolveError> {
        debug!(
            "resolving {destination:?} for broker {}",
            parent.metadata.key()
        );
        self.requests
            .lock()
            .expect("request log poisoned")
            .push(destination.clone());

        if let Some(reason) = &self.failure {
            return Err(ResolveError(reason.clone()));
        }

        match (&destination.reference, &destination.uri) {
            (Some(reference), _) => Ok(format!(
                "http://{}.{}.svc.cluster.local/",
                reference.name, reference.namespace
            )),
            (None, Some(uri)) => Ok(uri.clone()),
            (None, None) => Err(ResolveError("destination is empty".to_string())),
        }
    }
}
