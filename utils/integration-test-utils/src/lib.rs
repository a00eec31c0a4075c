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

mod fixtures;
pub use fixtures::{
    broker, dependency_annotation, ping_source, ready_broker, service_subscriber, trigger,
    OWNED_CLASS, PING_API_VERSION, PING_KIND,
};
mod recording_event_recorder;
pub use recording_event_recorder::RecordingEventRecorder;
mod recording_provisioner;
pub use recording_provisioner::{ProvisionerFailure, RecordingProvisioner};
mod static_uri_resolver;
pub use static_uri_resolver::StaticUriResolver;

use tracing_subscriber::EnvFilter;

/// Installs a test-friendly `tracing` subscriber once per test binary.
///
/// Honors `RUST_LOG`; repeated calls are no-ops.
pub fn init_logging() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}
