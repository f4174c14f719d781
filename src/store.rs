// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

//! Resource store seam between the reconciliation core and the cluster.
//!
//! Implementations classify failures the same way: a missing object on `get`
//! is `Ok(None)`, a 409 on a write is
//! [`ManagerError::Conflict`](crate::error::ManagerError::Conflict), anything
//! else is fatal to the current pass.

use crate::error::Result;
use async_trait::async_trait;
use k8s_openapi::api::apps::v1::Deployment;
use k8s_openapi::api::core::v1::ConfigMap;

#[async_trait]
pub trait ResourceStore: Send + Sync {
    async fn get_config_map(&self, namespace: &str, name: &str) -> Result<Option<ConfigMap>>;

    async fn create_config_map(&self, config_map: &ConfigMap) -> Result<ConfigMap>;

    /// Write back a ConfigMap that was previously read. The carried
    /// `resourceVersion` must still be current.
    async fn update_config_map(&self, config_map: &ConfigMap) -> Result<ConfigMap>;

    async fn list_deployments(&self, namespace: &str) -> Result<Vec<Deployment>>;

    async fn update_deployment(&self, deployment: &Deployment) -> Result<Deployment>;
}
