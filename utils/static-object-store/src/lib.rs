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

//! In-memory object store seeded from a static JSON snapshot.
//!
//! Implements the Broker, Trigger and dependency read/write capabilities with
//! the same optimistic-concurrency rules a cluster API server applies: every
//! accepted write bumps `resourceVersion`, writes carrying a stale version are
//! rejected, spec changes bump `generation`, and a Trigger marked for deletion
//! disappears once its last finalizer is removed.

use arc_swap::ArcSwap;
use async_trait::async_trait;
use chrono::Utc;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};
use std::fs::{self, canonicalize};
use std::path::PathBuf;
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::debug;
use trigger_reconciler::{
    Broker, BrokerLister, DependencyLister, ObjectKey, Source, StoreError, Trigger, TriggerClient,
};
use uuid::Uuid;

/// On-disk shape of a store snapshot.
#[derive(Clone, Debug, Default, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct Snapshot {
    #[serde(default)]
    pub brokers: Vec<Broker>,
    #[serde(default)]
    pub triggers: Vec<Trigger>,
    #[serde(default)]
    pub sources: Vec<Source>,
}

impl Snapshot {
    pub fn from_file(static_file: &str) -> Result<Self, StoreError> {
        let snapshot_file = canonicalize(PathBuf::from(static_file)).map_err(|e| {
            StoreError::Unavailable(format!("static snapshot file not found: {e:?}"))
        })?;
        debug!("loading object store snapshot from {snapshot_file:?}");

        let data = fs::read_to_string(snapshot_file)
            .map_err(|e| StoreError::Unavailable(format!("unable to read file: {e:?}")))?;

        serde_json::from_str(&data)
            .map_err(|e| StoreError::Unavailable(format!("unable to parse JSON: {e:?}")))
    }
}

#[derive(Default)]
struct Objects {
    brokers: BTreeMap<ObjectKey, Broker>,
    triggers: BTreeMap<ObjectKey, Trigger>,
    last_resource_version: u64,
}

impl Objects {
    fn next_resource_version(&mut self) -> u64 {
        self.last_resource_version += 1;
        self.last_resource_version
    }
}

/// Process-local object store.
///
/// Dependency objects live in a lock-free snapshot since they are read on every
/// reconcile pass and only replaced wholesale by tests and loaders.
#[derive(Default)]
pub struct StaticObjectStore {
    objects: Mutex<Objects>,
    sources: ArcSwap<HashMap<ObjectKey, Source>>,
}

impl StaticObjectStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn from_snapshot(snapshot: Snapshot) -> Self {
        let store = Self::new();
        for broker in snapshot.brokers {
            store.put_broker(broker).await;
        }
        for trigger in snapshot.triggers {
            store.put_trigger(trigger).await;
        }
        for source in snapshot.sources {
            store.put_source(source);
        }
        store
    }

    pub async fn from_file(static_file: &str) -> Result<Self, StoreError> {
        Ok(Self::from_snapshot(Snapshot::from_file(static_file)?).await)
    }

    /// Creates or replaces a Broker.
    pub async fn put_broker(&self, mut broker: Broker) -> Broker {
        let mut objects = self.objects.lock().await;
        prepare_new(&mut broker.metadata, objects.next_resource_version());
        objects
            .brokers
            .insert(broker.metadata.key(), broker.clone());
        broker
    }

    pub async fn delete_broker(&self, namespace: &str, name: &str) -> bool {
        let mut objects = self.objects.lock().await;
        objects
            .brokers
            .remove(&ObjectKey::new(namespace, name))
            .is_some()
    }

    /// Sets the Broker's deletion timestamp without removing it.
    pub async fn mark_broker_deleting(
        &self,
        namespace: &str,
        name: &str,
    ) -> Result<(), StoreError> {
        let mut objects = self.objects.lock().await;
        let resource_version = objects.next_resource_version();
        let broker = objects
            .brokers
            .get_mut(&ObjectKey::new(namespace, name))
            .ok_or_else(|| StoreError::not_found("Broker", namespace, name))?;
        broker.metadata.deletion_timestamp = Some(Utc::now());
        broker.metadata.resource_version = resource_version;
        Ok(())
    }

    /// Creates or replaces a Trigger, assigning a uid when it has none.
    pub async fn put_trigger(&self, mut trigger: Trigger) -> Trigger {
        let mut objects = self.objects.lock().await;
        prepare_new(&mut trigger.metadata, objects.next_resource_version());
        objects
            .triggers
            .insert(trigger.metadata.key(), trigger.clone());
        trigger
    }

    /// Requests deletion. Triggers without finalizers go away at once, others are
    /// only marked until their finalizers are removed.
    pub async fn delete_trigger(&self, key: &ObjectKey) -> Result<(), StoreError> {
        let mut objects = self.objects.lock().await;
        let resource_version = objects.next_resource_version();
        let trigger = objects
            .triggers
            .get_mut(key)
            .ok_or_else(|| StoreError::not_found("Trigger", &key.namespace, &key.name))?;

        if trigger.metadata.finalizers.is_empty() {
            objects.triggers.remove(key);
            return Ok(());
        }
        if trigger.metadata.deletion_timestamp.is_none() {
            trigger.metadata.deletion_timestamp = Some(Utc::now());
            trigger.metadata.resource_version = resource_version;
        }
        Ok(())
    }

    /// Creates or replaces a dependency object.
    pub fn put_source(&self, mut source: Source) {
        if source.metadata.generation == 0 {
            source.metadata.generation = 1;
        }
        let key = source.metadata.key();
        self.sources.rcu(|sources| {
            let mut sources = HashMap::clone(sources);
            sources.insert(key.clone(), source.clone());
            sources
        });
    }

    pub fn delete_source(&self, namespace: &str, name: &str) -> bool {
        let key = ObjectKey::new(namespace, name);
        let existed = self.sources.load().contains_key(&key);
        self.sources.rcu(|sources| {
            let mut sources = HashMap::clone(sources);
            sources.remove(&key);
            sources
        });
        existed
    }
}

fn prepare_new(metadata: &mut trigger_reconciler::model::ObjectMeta, resource_version: u64) {
    if metadata.uid.is_empty() {
        metadata.uid = Uuid::new_v4().to_string();
    }
    if metadata.generation == 0 {
        metadata.generation = 1;
    }
    metadata.resource_version = resource_version;
}

fn check_version(stored: &Trigger, incoming: &Trigger) -> Result<(), StoreError> {
    if stored.metadata.resource_version != incoming.metadata.resource_version {
        return Err(StoreError::Conflict {
            key: stored.key(),
            expected: incoming.metadata.resource_version,
            actual: stored.metadata.resource_version,
        });
    }
    Ok(())
}

#[async_trait]
impl BrokerLister for StaticObjectStore {
    async fn get(&self, namespace: &str, name: &str) -> Result<Broker, StoreError> {
        self.objects
            .lock()
            .await
            .brokers
            .get(&ObjectKey::new(namespace, name))
            .cloned()
            .ok_or_else(|| StoreError::not_found("Broker", namespace, name))
    }
}

#[async_trait]
impl TriggerClient for StaticObjectStore {
    async fn get(&self, key: &ObjectKey) -> Result<Trigger, StoreError> {
        self.objects
            .lock()
            .await
            .triggers
            .get(key)
            .cloned()
            .ok_or_else(|| StoreError::not_found("Trigger", &key.namespace, &key.name))
    }

    async fn list(&self) -> Result<Vec<Trigger>, StoreError> {
        Ok(self.objects.lock().await.triggers.values().cloned().collect())
    }

    async fn update(&self, trigger: &Trigger) -> Result<Trigger, StoreError> {
        let key = trigger.key();
        let mut objects = self.objects.lock().await;
        let resource_version = objects.next_resource_version();
        let stored = objects
            .triggers
            .get_mut(&key)
            .ok_or_else(|| StoreError::not_found("Trigger", &key.namespace, &key.name))?;
        check_version(stored, trigger)?;

        let spec_changed = stored.spec != trigger.spec;
        let mut metadata = trigger.metadata.clone();
        metadata.uid = stored.metadata.uid.clone();
        metadata.deletion_timestamp = stored.metadata.deletion_timestamp;
        metadata.generation = stored.metadata.generation + i64::from(spec_changed);
        metadata.resource_version = resource_version;

        stored.metadata = metadata;
        stored.spec = trigger.spec.clone();
        let written = stored.clone();

        if written.metadata.is_deleting() && written.metadata.finalizers.is_empty() {
            debug!("trigger {key} released its last finalizer, removing it");
            objects.triggers.remove(&key);
        }
        Ok(written)
    }

    async fn update_status(&self, trigger: &Trigger) -> Result<Trigger, StoreError> {
        let key = trigger.key();
        let mut objects = self.objects.lock().await;
        let resource_version = objects.next_resource_version();
        let stored = objects
            .triggers
            .get_mut(&key)
            .ok_or_else(|| StoreError::not_found("Trigger", &key.namespace, &key.name))?;
        check_version(stored, trigger)?;

        stored.status = trigger.status.clone();
        stored.metadata.resource_version = resource_version;
        Ok(stored.clone())
    }
}

#[async_trait]
impl DependencyLister for StaticObjectStore {
    async fn get(&self, namespace: &str, name: &str) -> Result<Source, StoreError> {
        self.sources
            .load()
            .get(&ObjectKey::new(namespace, name))
            .cloned()
            .ok_or_else(|| StoreError::not_found("Source", namespace, name))
    }
}
