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

//! # trigger-reconciler
//!
//! `trigger-reconciler` converges the retry infrastructure of event-routing
//! Triggers. A Trigger binds a parent Broker to a subscriber; for every Trigger
//! whose Broker belongs to the configured class, the reconciler keeps one retry
//! topic and one retry subscription at the message-transport provider, and
//! reports progress through the Trigger's `Ready` condition.
//!
//! Typical usage is centered on [`TriggerReconciler`] for single passes and on
//! [`TriggerController`] for a queue-driven control loop.
//!
//! ## Reconcile contract
//!
//! - Passes are level-triggered: running one twice on unchanged inputs yields
//!   the same status and makes no new provider writes.
//! - A Trigger whose Broker is gone or being deleted is finalized. One whose
//!   Broker belongs to another class is released and kept ready.
//! - Finalization only touches the provider when the Trigger carries the
//!   configured finalizer.
//! - Every failure is recorded in the matching condition before the pass
//!   returns it.
//!
//! ## Internal architecture map
//!
//! - Model: Trigger, Broker, dependency and condition types
//! - Dependency: annotation parsing, tracking and readiness propagation
//! - Subscriber: destination namespace defaulting and URI resolution
//! - Infrastructure: retry target derivation and provider orchestration
//! - Reconciler: `reconcile_kind` / `finalize_kind`
//! - Runtime: work queue, backoff and controller driver
//!
//! ## Observability model
//!
//! The crate uses `tracing` for logs/events with canonical event names from
//! [`observability::events`]. Library code never installs a global subscriber.
//! Binaries and tests are responsible for one-time `tracing_subscriber`
//! initialization at process boundaries.

pub mod config;
pub mod dependency;
pub mod infrastructure;
pub mod model;
#[doc(hidden)]
pub mod observability;
pub mod reconciler;
pub mod runtime;
pub mod store;
pub mod subscriber;

pub use config::{BackoffConfig, ConfigError, ReconcilerConfig};
pub use dependency::{DependencyLister, DependencyTracker, ListableTracker};
pub use infrastructure::{InfrastructureError, RetryTarget, RetryTopicProvisioner};
pub use model::{Broker, ObjectKey, ObjectReference, Source, Trigger};
pub use reconciler::{
    EventType, ReconcileError, ReconcileEvent, TriggerReconciler, TRIGGER_FINALIZED, TRIGGER_RECONCILED,
};
pub use runtime::{EventRecorder, TracingEventRecorder, TriggerController, WorkQueue};
pub use store::{BrokerLister, StoreError, TriggerClient};
pub use subscriber::{ResolveError, UriResolver};
