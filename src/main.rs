// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0
use anyhow::Result;
use kube::Client;
use std::sync::Arc;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use toolchain_operator::config::Config;
use toolchain_operator::constants::OPERATOR_NAME;
use toolchain_operator::kubernetes::{required_apis, wait_for_apis};
use toolchain_operator::reconcilers::{SharedInfraController, ToolChainEnablerReconciler};

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    info!("Starting {}", OPERATOR_NAME);

    let config = Config::from_env()?;
    info!(
        "Configuration loaded: watch_namespace={}, registration_timeout={:?}",
        config.watch_namespace, config.registration_timeout
    );

    let client = Client::try_default().await?;
    info!("Connected to Kubernetes cluster");

    info!("Waiting for required APIs to become available...");
    wait_for_apis(&client, &required_apis()).await?;

    let reconciler = Arc::new(ToolChainEnablerReconciler::new(client.clone(), config)?);
    let infra_controller = SharedInfraController::new(client.clone(), reconciler.clone());

    info!("Starting reconcilers...");

    tokio::try_join!(reconciler.run(), infra_controller.run())?;

    // Both loops run until their watch streams end
    warn!("All reconcilers stopped unexpectedly");
    Ok(())
}
