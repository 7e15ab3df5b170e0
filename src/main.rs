// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0
use anyhow::{bail, Result};
use kube::Client;
use std::sync::Arc;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use keptn_addon::config::{AddonOverrides, Config};
use keptn_addon::kubernetes::{wait_for_helm_chart_crd, KubeApplier, KubeSecretStore};
use keptn_addon::{ClusterAddon, KeptnAddon};

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    info!("Starting Keptn addon");

    // Load configuration
    let config = Config::from_env()?;
    let overrides = AddonOverrides::from_env()?;
    info!("Configuration loaded: plane={:?}", config.plane);

    // Create Kubernetes client
    let client = Client::try_default().await?;
    info!("Connected to Kubernetes cluster");

    if config.wait_for_crd {
        info!("Waiting for HelmChart CRD to become available...");
        wait_for_helm_chart_crd(&client, config.crd_timeout).await?;
    }

    let store = Arc::new(KubeSecretStore::new(client.clone()));
    let addon = KeptnAddon::new(config.plane, overrides, store)?;
    let handle = addon.deploy(&KubeApplier::new(client)).await?;

    for (id, outcome) in handle.report().iter() {
        info!("{}: {}", id, outcome);
    }

    if !handle.report().is_success() {
        warn!("Release {} was not fully applied", handle.release_name());
        bail!(
            "{} of {} resources were not applied",
            handle.report().failures().count(),
            handle.report().len()
        );
    }

    info!(
        "Release {} deployed to namespace {}",
        handle.release_name(),
        handle.namespace()
    );
    Ok(())
}
