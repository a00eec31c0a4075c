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

//! Subscriber address resolution.

use crate::model::trigger::REASON_SUBSCRIBER_UNRESOLVED;
use crate::model::{Broker, Destination, Trigger};
use crate::observability::events;
use async_trait::async_trait;
use std::error::Error;
use std::fmt::{Display, Formatter};
use tracing::error;

const COMPONENT: &str = "subscriber_resolver";

/// The destination could not be turned into a callable address.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct ResolveError(pub String);

impl Display for ResolveError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl Error for ResolveError {}

/// Resolves destinations into URIs.
///
/// `parent` is the resolution context: the object on whose behalf the address is
/// needed, usable as the default owner of same-namespace references.
#[async_trait]
pub trait UriResolver: Send + Sync {
    async fn resolve(&self, destination: &Destination, parent: &Broker)
        -> Result<String, ResolveError>;
}

/// Copy of the Trigger's subscriber with an empty reference namespace defaulted to
/// the Trigger's own namespace. Cross-namespace references are kept verbatim.
pub fn namespaced_subscriber(trigger: &Trigger) -> Destination {
    let mut destination = trigger.spec.subscriber.clone();
    if let Some(reference) = destination.reference.as_mut() {
        if reference.namespace.is_empty() {
            reference.namespace = trigger.namespace().to_string();
        }
    }
    destination
}

/// Resolves the Trigger's subscriber and records the outcome in its status.
///
/// On failure the previously resolved URI is cleared so a stale address is never
/// reported next to a failed `SubscriberResolved` condition.
pub async fn resolve_subscriber(
    resolver: &dyn UriResolver,
    trigger: &mut Trigger,
    broker: &Broker,
) -> Result<(), ResolveError> {
    let destination = namespaced_subscriber(trigger);

    match resolver.resolve(&destination, broker).await {
        Ok(uri) => {
            trigger.status.subscriber_uri = Some(uri);
            trigger.status.mark_subscriber_resolved_succeeded();
            Ok(())
        }
        Err(err) => {
            error!(
                event = events::SUBSCRIBER_RESOLVE_FAILED,
                component = COMPONENT,
                namespace = trigger.namespace(),
                trigger = trigger.name(),
                err = %err,
                "unable to get the subscriber's URI"
            );
            trigger
                .status
                .mark_subscriber_resolved_failed(REASON_SUBSCRIBER_UNRESOLVED, err.to_string());
            trigger.status.subscriber_uri = None;
            Err(err)
        }
    }
}
