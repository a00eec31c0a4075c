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

mod collaborators;
mod config;

use crate::collaborators::{LoggingProvisioner, ServiceDomainResolver};
use crate::config::Config;
use clap::Parser;
use static_object_store::StaticObjectStore;
use std::fs;
use std::sync::Arc;
use tracing::{info, warn};
use trigger_reconciler::{
    ListableTracker, TracingEventRecorder, TriggerClient, TriggerController, TriggerReconciler,
};

#[derive(Parser)]
#[command()]
struct ControllerArgs {
    #[arg(short, long, value_name = "FILE")]
    config: String,
    /// Overrides `snapshot_file` from the config.
    #[arg(short, long, value_name = "FILE")]
    snapshot: Option<String>,
    /// Overrides `workers` from the config.
    #[arg(short, long)]
    workers: Option<usize>,
    /// Process the initial queue once and exit instead of running until Ctrl-C.
    #[arg(long)]
    once: bool,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let _ = tracing_subscriber::fmt::try_init();

    info!("Started trigger-controller");

    let args = ControllerArgs::parse();
    let contents = fs::read_to_string(&args.config)
        .map_err(|e| format!("Unable to read config file {}: {e:?}", args.config))?;
    let config: Config =
        json5::from_str(&contents).map_err(|e| format!("Unable to parse config file: {e:?}"))?;
    config.reconciler.validate()?;

    let snapshot = args
        .snapshot
        .or(config.snapshot_file.clone())
        .ok_or("no snapshot file given in config or on the command line")?;
    let store = Arc::new(StaticObjectStore::from_file(&snapshot).await?);

    let mut tracker = ListableTracker::new();
    for dependency_kind in &config.dependency_kinds {
        tracker = tracker.with_lister(
            &dependency_kind.api_version,
            &dependency_kind.kind,
            store.clone(),
        );
    }
    let tracker = Arc::new(tracker);

    let reconciler = TriggerReconciler::new(
        store.clone(),
        Arc::new(ServiceDomainResolver::new(&config.cluster_domain)),
        Arc::new(LoggingProvisioner::default()),
        tracker.clone(),
        config.reconciler.clone(),
    );
    let controller = Arc::new(TriggerController::new(
        reconciler,
        store.clone(),
        tracker,
        Arc::new(TracingEventRecorder),
    ));

    let queued = controller.enqueue_all().await?;
    info!("queued {queued} triggers from {snapshot}");

    if args.once {
        let processed = controller.drain().await;
        info!("processed {processed} keys");
    } else {
        let workers = args.workers.unwrap_or(config.workers);
        let running = tokio::spawn(Arc::clone(&controller).run(workers));
        tokio::signal::ctrl_c().await?;
        info!("shutting down");
        controller.shutdown().await;
        if let Err(err) = running.await {
            warn!("controller workers ended abnormally: {err}");
        }
    }

    for trigger in store.list().await? {
        println!("{}", serde_json::to_string_pretty(&trigger)?);
    }

    Ok(())
}
