// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

//! Convergence of a ConfigMapManager's targets into the cluster

use crate::error::{ManagerError, Result};
use crate::store::ResourceStore;
use crate::sync::diff::diff;
use crate::sync::workloads::restart_dependents;
use crate::types::{ConfigMapManager, ConfigMapSpec};
use chrono::Utc;
use k8s_openapi::api::core::v1::ConfigMap;
use kube::{api::ObjectMeta, ResourceExt};
use tracing::{debug, info, instrument};

/// What a pass did to one target ConfigMap
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TargetOutcome {
    Created,
    Updated { keys: Vec<String> },
    Unchanged,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TargetReport {
    pub config_map: String,
    pub outcome: TargetOutcome,
    /// Deployments whose rollout was triggered by this target
    pub restarted: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ConvergeReport {
    pub targets: Vec<TargetReport>,
}

impl ConvergeReport {
    /// Whether any target was created or updated
    pub fn changed(&self) -> bool {
        self.targets
            .iter()
            .any(|t| t.outcome != TargetOutcome::Unchanged)
    }
}

/// Converge every target of `manager`, in declaration order.
///
/// The first error aborts the pass; targets already written stay written.
#[instrument(skip(store, manager), fields(manager = %manager.name_any()))]
pub async fn converge<S: ResourceStore + ?Sized>(
    store: &S,
    manager: &ConfigMapManager,
) -> Result<ConvergeReport> {
    let Some(namespace) = manager.namespace() else {
        return Err(ManagerError::InvalidResource(format!(
            "ConfigMapManager {} has no namespace",
            manager.name_any()
        )));
    };

    let mut report = ConvergeReport::default();
    for target in &manager.spec.config_maps {
        report
            .targets
            .push(converge_target(store, &namespace, target).await?);
    }

    Ok(report)
}

async fn converge_target<S: ResourceStore + ?Sized>(
    store: &S,
    namespace: &str,
    target: &ConfigMapSpec,
) -> Result<TargetReport> {
    let outcome = match store.get_config_map(namespace, &target.name).await? {
        None => {
            create_config_map(store, namespace, target).await?;
            TargetOutcome::Created
        }
        Some(observed) => match update_config_map(store, observed, target).await? {
            Some(keys) => TargetOutcome::Updated { keys },
            None => {
                debug!("ConfigMap {}/{} is up to date", namespace, target.name);
                TargetOutcome::Unchanged
            }
        },
    };

    let restarted = if outcome == TargetOutcome::Unchanged {
        Vec::new()
    } else {
        restart_dependents(store, namespace, &target.name, Utc::now()).await?
    };

    Ok(TargetReport {
        config_map: target.name.clone(),
        outcome,
        restarted,
    })
}

async fn create_config_map<S: ResourceStore + ?Sized>(
    store: &S,
    namespace: &str,
    target: &ConfigMapSpec,
) -> Result<()> {
    let merged = diff(None, &target.updates);
    let config_map = ConfigMap {
        metadata: ObjectMeta {
            name: Some(target.name.clone()),
            namespace: Some(namespace.to_string()),
            ..Default::default()
        },
        data: Some(merged.data),
        ..Default::default()
    };

    store.create_config_map(&config_map).await?;
    info!("Created ConfigMap {}/{}", namespace, target.name);
    Ok(())
}

/// Write the merged data back if anything changed, returning the changed keys
async fn update_config_map<S: ResourceStore + ?Sized>(
    store: &S,
    mut observed: ConfigMap,
    target: &ConfigMapSpec,
) -> Result<Option<Vec<String>>> {
    let merged = diff(observed.data.as_ref(), &target.updates);
    if !merged.changed {
        return Ok(None);
    }

    observed.data = Some(merged.data);
    store.update_config_map(&observed).await?;
    info!(
        "Updated ConfigMap {}/{} keys {:?}",
        observed.namespace().unwrap_or_default(),
        target.name,
        merged.changed_keys
    );
    Ok(Some(merged.changed_keys))
}
