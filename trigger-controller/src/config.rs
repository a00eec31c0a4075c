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

use serde::{Deserialize, Serialize};
use trigger_reconciler::ReconcilerConfig;

#[derive(Deserialize, Serialize, Debug, Clone)]
#[serde(deny_unknown_fields)]
pub struct Config {
    pub(crate) snapshot_file: Option<String>,
    #[serde(default = "default_workers")]
    pub(crate) workers: usize,
    #[serde(default = "default_cluster_domain")]
    pub(crate) cluster_domain: String,
    #[serde(default)]
    pub(crate) dependency_kinds: Vec<DependencyKind>,
    #[serde(default)]
    pub(crate) reconciler: ReconcilerConfig,
}

#[derive(Deserialize, Serialize, Debug, Clone)]
#[serde(deny_unknown_fields)]
pub struct DependencyKind {
    pub(crate) api_version: String,
    pub(crate) kind: String,
}

fn default_workers() -> usize {
    2
}

fn default_cluster_domain() -> String {
    "cluster.local".to_string()
}

#[cfg(test)]
mod tests {
    use super::Config;

    #[test]
    fn shipped_config_parses() {
        let contents = include_str!("../config/controller.json5");
        let config: Config = json5::from_str(contents).unwrap();

        assert_eq!(config.workers, 2);
        assert_eq!(config.dependency_kinds[0].kind, "PingSource");
        assert!(config.reconciler.validate().is_ok());
    }

    #[test]
    fn reconciler_section_is_optional() {
        let config: Config = json5::from_str("{}").unwrap();

        assert_eq!(config.reconciler.broker_class, "googlecloud");
        assert_eq!(config.cluster_domain, "cluster.local");
    }
}
