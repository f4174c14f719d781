// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

//! ConfigMapManager reconciler - converges managed ConfigMaps on every change.

use crate::config::Config;
use crate::error::{ManagerError, Result};
use crate::kubernetes::KubeStore;
use crate::sync::converge;
use crate::types::ConfigMapManager;
use futures::StreamExt;
use k8s_openapi::api::core::v1::ConfigMap;
use kube::{
    runtime::{controller::Action, reflector::ObjectRef, watcher, Controller},
    Api, Client, Resource, ResourceExt,
};
use std::sync::Arc;
use tracing::{debug, error, info, warn};

pub struct ConfigMapManagerReconciler {
    client: Client,
    store: KubeStore,
    config: Config,
}

impl ConfigMapManagerReconciler {
    pub fn new(client: Client, config: Config) -> Self {
        Self {
            store: KubeStore::new(client.clone()),
            client,
            config,
        }
    }

    fn api<K>(&self) -> Api<K>
    where
        K: Resource<Scope = k8s_openapi::NamespaceResourceScope>,
        K::DynamicType: Default,
    {
        match &self.config.watch_namespace {
            Some(namespace) => Api::namespaced(self.client.clone(), namespace),
            None => Api::all(self.client.clone()),
        }
    }

    pub async fn run(self) -> anyhow::Result<()> {
        let managers: Api<ConfigMapManager> = self.api();
        let config_maps: Api<ConfigMap> = self.api();

        let controller = Controller::new(managers, watcher::Config::default());
        let reflector = controller.store();
        let context = Arc::new(self);

        controller
            // Edits to a managed ConfigMap re-trigger every manager targeting it
            .watches(config_maps, watcher::Config::default(), move |cm: ConfigMap| {
                managers_targeting(&reflector.state(), &cm)
            })
            .run(reconcile, error_policy, context)
            .for_each(|res| async move {
                match res {
                    Ok(o) => debug!("Reconciled ConfigMapManager: {:?}", o),
                    Err(e) => warn!("Reconciliation error: {:?}", e),
                }
            })
            .await;

        Ok(())
    }
}

/// Managers in the ConfigMap's namespace that list it as a target
pub fn managers_targeting(
    managers: &[Arc<ConfigMapManager>],
    config_map: &ConfigMap,
) -> Vec<ObjectRef<ConfigMapManager>> {
    let Some(namespace) = config_map.namespace() else {
        return Vec::new();
    };
    let name = config_map.name_any();

    managers
        .iter()
        .filter(|m| m.targets(&namespace, &name))
        .map(|m| ObjectRef::from_obj(m.as_ref()))
        .collect()
}

async fn reconcile(
    manager: Arc<ConfigMapManager>,
    ctx: Arc<ConfigMapManagerReconciler>,
) -> Result<Action> {
    let name = manager.name_any();
    let namespace = manager.namespace().unwrap_or_default();

    debug!("Reconciling ConfigMapManager: {}/{}", namespace, name);

    let report = converge(&ctx.store, &manager).await?;
    if report.changed() {
        info!(
            "ConfigMapManager {}/{} converged: {:?}",
            namespace, name, report.targets
        );
    }

    // Level-triggered: the watches bring us back on any relevant change
    Ok(Action::await_change())
}

fn error_policy(
    manager: Arc<ConfigMapManager>,
    error: &ManagerError,
    ctx: Arc<ConfigMapManagerReconciler>,
) -> Action {
    requeue_for(error, &ctx.config, &manager)
}

fn requeue_for(error: &ManagerError, config: &Config, manager: &ConfigMapManager) -> Action {
    if error.is_conflict() {
        warn!(
            "Conflict reconciling {}/{}, retrying: {}",
            manager.namespace().unwrap_or_default(),
            manager.name_any(),
            error
        );
        Action::requeue(config.conflict_requeue)
    } else {
        error!(
            "Reconciliation error for {}/{}: {}",
            manager.namespace().unwrap_or_default(),
            manager.name_any(),
            error
        );
        Action::requeue(config.error_requeue)
    }
}
