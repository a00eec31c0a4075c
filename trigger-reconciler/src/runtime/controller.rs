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

//! Controller driver: queue workers, finalizer bookkeeping and status write-back.

use crate::dependency::ListableTracker;
use crate::model::{ObjectKey, ObjectReference, Trigger};
use crate::observability::{events, fields};
use crate::reconciler::{EventType, ReconcileError, ReconcileEvent, TriggerReconciler};
use crate::runtime::backoff::ExponentialBackoff;
use crate::runtime::work_queue::WorkQueue;
use crate::store::TriggerClient;
use std::future::Future;
use std::sync::Arc;
use tracing::{debug, info, warn};

const COMPONENT: &str = "trigger_controller";

/// Sink for the events a pass produces about a Trigger.
pub trait EventRecorder: Send + Sync {
    fn record(&self, key: &ObjectKey, event: &ReconcileEvent);
}

/// Records events as `tracing` events.
#[derive(Clone, Copy, Debug, Default)]
pub struct TracingEventRecorder;

impl EventRecorder for TracingEventRecorder {
    fn record(&self, key: &ObjectKey, event: &ReconcileEvent) {
        match event.event_type {
            EventType::Normal => info!(
                event = events::EVENT_RECORDED,
                component = COMPONENT,
                trigger = %fields::format_key(key),
                reason = %event.reason,
                "{}",
                event.message
            ),
            EventType::Warning => warn!(
                event = events::EVENT_RECORDED,
                component = COMPONENT,
                trigger = %fields::format_key(key),
                reason = %event.reason,
                "{}",
                event.message
            ),
        }
    }
}

/// Runs the reconciler for queued Trigger keys and persists what it produced.
pub struct TriggerController {
    reconciler: TriggerReconciler,
    triggers: Arc<dyn TriggerClient>,
    tracker: Arc<ListableTracker>,
    recorder: Arc<dyn EventRecorder>,
    queue: Arc<WorkQueue>,
    backoff: ExponentialBackoff,
}

impl TriggerController {
    /// `tracker` must be the tracker `reconciler` registers dependencies with.
    pub fn new(
        reconciler: TriggerReconciler,
        triggers: Arc<dyn TriggerClient>,
        tracker: Arc<ListableTracker>,
        recorder: Arc<dyn EventRecorder>,
    ) -> Self {
        let backoff = ExponentialBackoff::from_config(&reconciler.config().backoff);
        Self {
            reconciler,
            triggers,
            tracker,
            recorder,
            queue: Arc::new(WorkQueue::new()),
            backoff,
        }
    }

    pub fn queue(&self) -> &Arc<WorkQueue> {
        &self.queue
    }

    pub async fn enqueue(&self, key: ObjectKey) -> bool {
        self.queue.add(key).await
    }

    /// Queues every stored Trigger. Returns how many keys were newly queued.
    pub async fn enqueue_all(&self) -> Result<usize, ReconcileError> {
        let triggers = self.triggers.list().await.map_err(ReconcileError::Store)?;
        let mut queued = 0;
        for trigger in triggers {
            if self.queue.add(trigger.key()).await {
                queued += 1;
            }
        }
        Ok(queued)
    }

    /// Re-queues every Trigger tracking `reference`. Returns the re-queued keys.
    pub async fn dependency_changed(&self, reference: &ObjectReference) -> Vec<ObjectKey> {
        let owners = self.tracker.owners_of(reference).await;
        for owner in &owners {
            self.queue.add(owner.clone()).await;
        }
        debug!(
            event = events::DEPENDENCY_CHANGED,
            component = COMPONENT,
            dependency = %fields::format_reference(reference),
            owners = owners.len(),
            "dependency changed, owners re-queued"
        );
        owners
    }

    /// Processes queued keys with `workers` concurrent workers until shutdown.
    pub async fn run(self: Arc<Self>, workers: usize) {
        let mut handles = Vec::with_capacity(workers);
        for worker_id in 0..workers.max(1) {
            let controller = Arc::clone(&self);
            handles.push(tokio::spawn(async move {
                controller.worker(worker_id).await;
            }));
        }
        for handle in handles {
            if let Err(err) = handle.await {
                warn!(
                    event = events::WORKER_STOP,
                    component = COMPONENT,
                    err = %err,
                    "worker task ended abnormally"
                );
            }
        }
    }

    pub async fn shutdown(&self) {
        self.queue.shutdown().await;
    }

    /// Processes keys on the current task until nothing is immediately queued.
    ///
    /// Delayed retries scheduled meanwhile are not waited for.
    pub async fn drain(&self) -> usize {
        let mut processed = 0;
        while !self.queue.is_empty().await {
            if !self.process_next().await {
                break;
            }
            processed += 1;
        }
        processed
    }

    /// Takes one key from the queue and handles it. Returns `false` after shutdown.
    pub async fn process_next(&self) -> bool {
        let Some(key) = self.queue.get().await else {
            return false;
        };

        match self.reconcile_key(&key).await {
            Ok(()) => self.backoff.forget(&key).await,
            Err(err) => {
                self.recorder.record(&key, &err.to_event());
                if err.is_retryable() {
                    let delay = self.backoff.next_delay(&key).await;
                    let attempts = self.backoff.failures(&key).await;
                    debug!(
                        event = events::QUEUE_REQUEUE,
                        component = COMPONENT,
                        trigger = %fields::format_key(&key),
                        attempts,
                        delay_ms = delay.as_millis() as u64,
                        err = %err,
                        "requeueing trigger"
                    );
                    self.queue.add_after(key.clone(), delay);
                } else {
                    warn!(
                        event = events::QUEUE_DROP_PERMANENT,
                        component = COMPONENT,
                        trigger = %fields::format_key(&key),
                        err = %err,
                        "permanent error, trigger will not be retried"
                    );
                    self.backoff.forget(&key).await;
                }
            }
        }

        self.queue.done(&key).await;
        true
    }

    /// One full pass for `key`: load, finalize or reconcile, persist.
    pub async fn reconcile_key(&self, key: &ObjectKey) -> Result<(), ReconcileError> {
        let original = match self.triggers.get(key).await {
            Ok(trigger) => trigger,
            Err(err) if err.is_not_found() => {
                debug!(
                    event = events::TRIGGER_GONE,
                    component = COMPONENT,
                    trigger = %fields::format_key(key),
                    "trigger no longer exists"
                );
                self.tracker.forget(key).await;
                return Ok(());
            }
            Err(err) => return Err(ReconcileError::Store(err)),
        };

        if original.metadata.is_deleting() {
            self.finalize(original).await
        } else {
            self.reconcile(original).await
        }
    }

    async fn reconcile(&self, original: Trigger) -> Result<(), ReconcileError> {
        let finalizer = &self.reconciler.config().finalizer;
        let mut current = original;

        if !current.metadata.has_finalizer(finalizer) {
            current.metadata.add_finalizer(finalizer);
            current = self
                .triggers
                .update(&current)
                .await
                .map_err(ReconcileError::Store)?;
            debug!(
                event = events::FINALIZER_ADDED,
                component = COMPONENT,
                trigger = %fields::format_key(&current.key()),
                finalizer = %finalizer,
                "finalizer added"
            );
        }

        let mut trigger = current.clone();
        let outcome = self
            .with_deadline(self.reconciler.reconcile_kind(&mut trigger))
            .await?;
        trigger.status.observed_generation = trigger.metadata.generation;

        self.write_status(&current, &trigger).await?;
        self.finish(&trigger.key(), outcome)
    }

    async fn finalize(&self, original: Trigger) -> Result<(), ReconcileError> {
        let finalizer = &self.reconciler.config().finalizer;
        if !original.metadata.has_finalizer(finalizer) {
            return Ok(());
        }

        let mut trigger = original.clone();
        let outcome = self
            .with_deadline(self.reconciler.finalize_kind(&mut trigger))
            .await?;

        let mut latest = self.write_status(&original, &trigger).await?;
        let event = outcome?;

        latest.metadata.remove_finalizer(finalizer);
        self.triggers
            .update(&latest)
            .await
            .map_err(ReconcileError::Store)?;
        self.tracker.forget(&latest.key()).await;
        debug!(
            event = events::FINALIZER_REMOVED,
            component = COMPONENT,
            trigger = %fields::format_key(&latest.key()),
            finalizer = %finalizer,
            "finalizer removed"
        );

        self.finish(&latest.key(), Ok(event))
    }

    async fn with_deadline<F, T>(&self, pass: F) -> Result<T, ReconcileError>
    where
        F: Future<Output = T>,
    {
        let timeout = self.reconciler.config().reconcile_timeout();
        tokio::time::timeout(timeout, pass).await.map_err(|_| {
            warn!(
                event = events::RECONCILE_DEADLINE_EXCEEDED,
                component = COMPONENT,
                timeout_secs = timeout.as_secs(),
                "reconcile pass exceeded its deadline"
            );
            ReconcileError::DeadlineExceeded(timeout)
        })
    }

    /// Persists `updated.status` on top of `stored` when it changed. Returns the
    /// freshest stored copy.
    async fn write_status(
        &self,
        stored: &Trigger,
        updated: &Trigger,
    ) -> Result<Trigger, ReconcileError> {
        if stored.status == updated.status {
            debug!(
                event = events::STATUS_UPDATE_SKIPPED,
                component = COMPONENT,
                trigger = %fields::format_key(&stored.key()),
                "status unchanged"
            );
            return Ok(stored.clone());
        }

        let mut desired = stored.clone();
        desired.status = updated.status.clone();
        match self.triggers.update_status(&desired).await {
            Ok(written) => {
                debug!(
                    event = events::STATUS_UPDATE_OK,
                    component = COMPONENT,
                    trigger = %fields::format_key(&stored.key()),
                    ready = written.status.is_ready(),
                    "status updated"
                );
                Ok(written)
            }
            Err(err) => {
                if err.is_conflict() {
                    debug!(
                        event = events::STATUS_UPDATE_CONFLICT,
                        component = COMPONENT,
                        trigger = %fields::format_key(&stored.key()),
                        err = %err,
                        "status update conflicted with a newer write"
                    );
                }
                Err(ReconcileError::Store(err))
            }
        }
    }

    fn finish(
        &self,
        key: &ObjectKey,
        outcome: Result<Option<ReconcileEvent>, ReconcileError>,
    ) -> Result<(), ReconcileError> {
        if let Some(event) = outcome? {
            self.recorder.record(key, &event);
        }
        Ok(())
    }

    async fn worker(&self, worker_id: usize) {
        debug!(
            event = events::WORKER_START,
            component = COMPONENT,
            worker_id,
            "worker started"
        );
        while self.process_next().await {}
        debug!(
            event = events::WORKER_STOP,
            component = COMPONENT,
            worker_id,
            "worker stopped"
        );
    }
}
