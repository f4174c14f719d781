// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

//! Discovery and restart of workloads that consume a ConfigMap

use crate::constants::annotations;
use crate::error::Result;
use crate::store::ResourceStore;
use chrono::{DateTime, SecondsFormat, Utc};
use k8s_openapi::api::apps::v1::Deployment;
use kube::ResourceExt;
use std::collections::BTreeMap;
use tracing::{debug, info, instrument};

/// Check if a deployment's pod template mounts the ConfigMap as a volume or
/// loads it through `envFrom`
pub fn uses_config_map(deployment: &Deployment, config_map: &str) -> bool {
    let Some(pod_spec) = deployment
        .spec
        .as_ref()
        .and_then(|s| s.template.spec.as_ref())
    else {
        return false;
    };

    let in_volumes = pod_spec.volumes.iter().flatten().any(|volume| {
        volume
            .config_map
            .as_ref()
            .is_some_and(|cm| cm.name == config_map)
    });
    if in_volumes {
        return true;
    }

    pod_spec.containers.iter().any(|container| {
        container.env_from.iter().flatten().any(|source| {
            source
                .config_map_ref
                .as_ref()
                .is_some_and(|r| r.name == config_map)
        })
    })
}

/// Render a restart timestamp as RFC3339 with second precision
pub fn restart_timestamp(now: DateTime<Utc>) -> String {
    now.to_rfc3339_opts(SecondsFormat::Secs, true)
}

/// Set the restart annotation on the deployment's pod template
pub fn stamp_restart(deployment: &mut Deployment, now: DateTime<Utc>) {
    let template = &mut deployment.spec.get_or_insert_with(Default::default).template;
    template
        .metadata
        .get_or_insert_with(Default::default)
        .annotations
        .get_or_insert_with(BTreeMap::new)
        .insert(annotations::RESTARTED_AT.to_string(), restart_timestamp(now));
}

/// Restart every deployment in `namespace` that consumes `config_map`.
///
/// Deployments are processed in listing order; the first failed update stops
/// the rest. Returns the names of the restarted deployments.
#[instrument(skip(store, now))]
pub async fn restart_dependents<S: ResourceStore + ?Sized>(
    store: &S,
    namespace: &str,
    config_map: &str,
    now: DateTime<Utc>,
) -> Result<Vec<String>> {
    let deployments = store.list_deployments(namespace).await?;
    let mut restarted = Vec::new();

    for mut deployment in deployments {
        let name = deployment.name_any();
        if !uses_config_map(&deployment, config_map) {
            debug!("Deployment {}/{} does not use {}", namespace, name, config_map);
            continue;
        }

        stamp_restart(&mut deployment, now);
        store.update_deployment(&deployment).await?;
        info!(
            "Restarted deployment {}/{} after change to ConfigMap {}",
            namespace, name, config_map
        );
        restarted.push(name);
    }

    Ok(restarted)
}
