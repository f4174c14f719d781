// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

//! [`ResourceStore`] backed by the Kubernetes API

use crate::error::{ManagerError, Result};
use crate::store::ResourceStore;
use async_trait::async_trait;
use k8s_openapi::api::apps::v1::Deployment;
use k8s_openapi::api::core::v1::ConfigMap;
use kube::{
    api::{ListParams, PostParams},
    Api, Client, ResourceExt,
};
use tracing::{debug, instrument};

const CONFIG_MAP: &str = "ConfigMap";
const DEPLOYMENT: &str = "Deployment";

#[derive(Clone)]
pub struct KubeStore {
    client: Client,
}

impl KubeStore {
    pub fn new(client: Client) -> Self {
        Self { client }
    }

    fn config_maps(&self, namespace: &str) -> Api<ConfigMap> {
        Api::namespaced(self.client.clone(), namespace)
    }

    fn deployments(&self, namespace: &str) -> Api<Deployment> {
        Api::namespaced(self.client.clone(), namespace)
    }
}

/// Namespace and name of an object about to be written
fn identity<K: ResourceExt>(kind: &str, obj: &K) -> Result<(String, String)> {
    let name = obj.name_any();
    let namespace = obj.namespace().ok_or_else(|| {
        ManagerError::InvalidResource(format!("{} {} has no namespace", kind, name))
    })?;
    Ok((namespace, name))
}

#[async_trait]
impl ResourceStore for KubeStore {
    #[instrument(skip(self))]
    async fn get_config_map(&self, namespace: &str, name: &str) -> Result<Option<ConfigMap>> {
        match self.config_maps(namespace).get(name).await {
            Ok(cm) => Ok(Some(cm)),
            Err(kube::Error::Api(err)) if err.code == 404 => {
                debug!("ConfigMap {}/{} not found", namespace, name);
                Ok(None)
            }
            Err(e) => Err(ManagerError::from_store(CONFIG_MAP, namespace, name, e)),
        }
    }

    #[instrument(skip(self, config_map), fields(config_map = %config_map.name_any()))]
    async fn create_config_map(&self, config_map: &ConfigMap) -> Result<ConfigMap> {
        let (namespace, name) = identity(CONFIG_MAP, config_map)?;
        self.config_maps(&namespace)
            .create(&PostParams::default(), config_map)
            .await
            .map_err(|e| ManagerError::from_store(CONFIG_MAP, &namespace, &name, e))
    }

    #[instrument(skip(self, config_map), fields(config_map = %config_map.name_any()))]
    async fn update_config_map(&self, config_map: &ConfigMap) -> Result<ConfigMap> {
        let (namespace, name) = identity(CONFIG_MAP, config_map)?;
        self.config_maps(&namespace)
            .replace(&name, &PostParams::default(), config_map)
            .await
            .map_err(|e| ManagerError::from_store(CONFIG_MAP, &namespace, &name, e))
    }

    #[instrument(skip(self))]
    async fn list_deployments(&self, namespace: &str) -> Result<Vec<Deployment>> {
        let list = self
            .deployments(namespace)
            .list(&ListParams::default())
            .await
            .map_err(|e| ManagerError::from_store(DEPLOYMENT, namespace, "*", e))?;
        Ok(list.items)
    }

    #[instrument(skip(self, deployment), fields(deployment = %deployment.name_any()))]
    async fn update_deployment(&self, deployment: &Deployment) -> Result<Deployment> {
        let (namespace, name) = identity(DEPLOYMENT, deployment)?;
        self.deployments(&namespace)
            .replace(&name, &PostParams::default(), deployment)
            .await
            .map_err(|e| ManagerError::from_store(DEPLOYMENT, &namespace, &name, e))
    }
}
