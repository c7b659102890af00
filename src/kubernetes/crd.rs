// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

//! API availability checking utilities

use crate::constants::crd::{POLL_INTERVAL_SECS, POLL_MAX_INTERVAL_SECS};
use crate::error::Result;
use crate::types::{OAuthClient, Route, ToolChainEnabler};
use kube::{discovery::Discovery, Client, Resource};
use std::time::Duration;
use tokio::time::sleep;
use tracing::{info, warn};

/// An API resource the operator cannot work without
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequiredApi {
    pub group: String,
    pub version: String,
    pub kind: String,
}

impl RequiredApi {
    pub fn of<K: Resource<DynamicType = ()>>() -> Self {
        Self {
            group: K::group(&()).to_string(),
            version: K::version(&()).to_string(),
            kind: K::kind(&()).to_string(),
        }
    }
}

impl std::fmt::Display for RequiredApi {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} ({}/{})", self.kind, self.group, self.version)
    }
}

/// The ToolChainEnabler CRD plus the OpenShift APIs used during reconcile
pub fn required_apis() -> Vec<RequiredApi> {
    vec![
        RequiredApi::of::<ToolChainEnabler>(),
        RequiredApi::of::<OAuthClient>(),
        RequiredApi::of::<Route>(),
    ]
}

/// Wait until every API in `apis` is served by the cluster.
/// This uses exponential backoff starting at POLL_INTERVAL_SECS seconds.
pub async fn wait_for_apis(client: &Client, apis: &[RequiredApi]) -> Result<()> {
    for api in apis {
        wait_for_api(client, api).await?;
    }
    Ok(())
}

async fn wait_for_api(client: &Client, api: &RequiredApi) -> Result<()> {
    let mut interval = POLL_INTERVAL_SECS;

    loop {
        match check_api_exists(client, api).await {
            Ok(true) => {
                info!("{} is available", api);
                return Ok(());
            }
            Ok(false) => {
                info!(
                    "{} not yet available, waiting {} seconds...",
                    api, interval
                );
            }
            Err(e) => {
                warn!(
                    "Error checking for {}: {}, retrying in {} seconds...",
                    api, e, interval
                );
            }
        }

        sleep(Duration::from_secs(interval)).await;

        // Exponential backoff with max cap
        interval = (interval * 2).min(POLL_MAX_INTERVAL_SECS);
    }
}

/// Check if the API resource exists by attempting to discover it.
async fn check_api_exists(client: &Client, api: &RequiredApi) -> Result<bool> {
    let discovery = Discovery::new(client.clone())
        .filter(&[api.group.as_str()])
        .run()
        .await?;

    for group in discovery.groups() {
        if group.name() == api.group {
            for (ar, _) in group.recommended_resources() {
                if ar.kind == api.kind && ar.version == api.version {
                    return Ok(true);
                }
            }
        }
    }

    Ok(false)
}
