// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

//! CRD rendering and availability checking

use crate::constants::crd::{POLL_INTERVAL_SECS, POLL_MAX_INTERVAL_SECS};
use crate::constants::API_GROUP;
use crate::error::Result;
use crate::types::ConfigMapManager;
use anyhow::Context;
use kube::{discovery::Discovery, Client, CustomResourceExt};
use std::time::Duration;
use tokio::time::sleep;
use tracing::{info, warn};

const KIND: &str = "ConfigMapManager";
const VERSION: &str = "v1";

/// Render the ConfigMapManager CustomResourceDefinition as YAML
pub fn crd_yaml() -> anyhow::Result<String> {
    serde_yaml::to_string(&ConfigMapManager::crd()).context("Failed to serialize CRD")
}

/// Wait for the ConfigMapManager CRD to become available in the cluster.
/// This uses exponential backoff starting at POLL_INTERVAL_SECS seconds.
pub async fn wait_for_manager_crd(client: &Client) -> Result<()> {
    let mut interval = POLL_INTERVAL_SECS;

    loop {
        match check_manager_crd_exists(client).await {
            Ok(true) => {
                info!("{} CRD ({}/{}) is available", KIND, API_GROUP, VERSION);
                return Ok(());
            }
            Ok(false) => {
                info!(
                    "{} CRD ({}/{}) not yet available, waiting {} seconds...",
                    KIND, API_GROUP, VERSION, interval
                );
            }
            Err(e) => {
                warn!(
                    "Error checking for {} CRD: {}, retrying in {} seconds...",
                    KIND, e, interval
                );
            }
        }

        sleep(Duration::from_secs(interval)).await;

        interval = (interval * 2).min(POLL_MAX_INTERVAL_SECS);
    }
}

async fn check_manager_crd_exists(client: &Client) -> Result<bool> {
    let discovery = Discovery::new(client.clone())
        .filter(&[API_GROUP])
        .run()
        .await?;

    let found = discovery
        .groups()
        .filter(|group| group.name() == API_GROUP)
        .flat_map(|group| group.recommended_resources())
        .any(|(ar, _)| ar.kind == KIND && ar.version == VERSION);
    Ok(found)
}
