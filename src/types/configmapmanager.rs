// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0
use kube::{CustomResource, ResourceExt};
use serde::{Deserialize, Serialize};

/// Desired ConfigMap contents, converged into the manager's own namespace.
#[derive(CustomResource, Serialize, Deserialize, Clone, Debug, Default, schemars::JsonSchema)]
#[kube(
    group = "blacksyrius.ci.com",
    version = "v1",
    kind = "ConfigMapManager",
    shortname = "cmm"
)]
#[kube(namespaced)]
#[serde(rename_all = "camelCase")]
pub struct ConfigMapManagerSpec {
    #[serde(default)]
    pub config_maps: Vec<ConfigMapSpec>,
}

/// One target ConfigMap and the keys to merge into it
#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq, Eq, schemars::JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct ConfigMapSpec {
    pub name: String,
    #[serde(default)]
    pub updates: Vec<ConfigMapUpdate>,
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq, schemars::JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct ConfigMapUpdate {
    pub key: String,
    pub new_value: String,
}

impl ConfigMapUpdate {
    pub fn new(key: impl Into<String>, new_value: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            new_value: new_value.into(),
        }
    }
}

impl ConfigMapManager {
    /// Check whether any target of this manager is the given ConfigMap.
    /// Managers only ever touch ConfigMaps in their own namespace.
    pub fn targets(&self, namespace: &str, config_map: &str) -> bool {
        self.namespace().as_deref() == Some(namespace)
            && self.spec.config_maps.iter().any(|cm| cm.name == config_map)
    }
}
