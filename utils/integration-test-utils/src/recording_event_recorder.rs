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

use std::sync::Mutex;
use tracing::debug;
use trigger_reconciler::{EventRecorder, EventType, ObjectKey, ReconcileEvent};

/// Keeps every recorded event in order.
#[derive(Default)]
pub struct RecordingEventRecorder {
    events: Mutex<Vec<(ObjectKey, ReconcileEvent)>>,
}

impl RecordingEventRecorder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn events(&self) -> Vec<(ObjectKey, ReconcileEvent)> {
        self.events.lock().expect("event log poisoned").clone()
    }

    pub fn reasons_for(&self, key: &ObjectKey) -> Vec<String> {
        self.events()
            .into_iter()
            .filter(|(k, _)| k == key)
            .map(|(_, event)| event.reason)
            .collect()
    }

    pub fn warnings(&self) -> Vec<ReconcileEvent> {
        self.events()
            .into_iter()
            .map(|(_, event)| event)
            .filter(|event| event.event_type == EventType::Warning)
            .collect()
    }
}

impl EventRecorder for RecordingEventRecorder {
    fn record(&self, key: &ObjectKey, event: &ReconcileEvent) {
        debug!("{key}: recording {event}");
        self.events
            .lock()
            .expect("event log poisoned")
            .push((key.clone(), event.clone()));
    }
}
