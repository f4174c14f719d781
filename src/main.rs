// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0
use anyhow::Result;
use clap::{Parser, Subcommand};
use kube::Client;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use configmap_manager::config::Config;
use configmap_manager::constants::OPERATOR_NAME;
use configmap_manager::kubernetes::{crd_yaml, wait_for_manager_crd};
use configmap_manager::reconcilers::ConfigMapManagerReconciler;

#[derive(Parser)]
#[command(
    name = "configmap-manager",
    version,
    about = "Converges ConfigMaps and restarts their consumers"
)]
struct Cli {
    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand)]
enum Command {
    /// Run the controller (default)
    Run,
    /// Print the ConfigMapManager CRD as YAML
    Crd,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    if let Some(Command::Crd) = cli.command {
        print!("{}", crd_yaml()?);
        return Ok(());
    }

    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    info!("Starting {} operator", OPERATOR_NAME);

    // Load configuration
    let config = Config::from_env()?;
    info!(
        "Configuration loaded: watch_namespace={}",
        config.watch_namespace.as_deref().unwrap_or("<all>")
    );

    // Create Kubernetes client
    let client = Client::try_default().await?;
    info!("Connected to Kubernetes cluster");

    info!("Waiting for ConfigMapManager CRD to become available...");
    wait_for_manager_crd(&client).await?;

    let reconciler = ConfigMapManagerReconciler::new(client, config);

    info!("Starting reconciler...");
    reconciler.run().await?;

    // This should never be reached as the reconciler runs forever
    warn!("Reconciler stopped unexpectedly");
    Ok(())
}
