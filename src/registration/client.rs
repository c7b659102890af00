// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

use crate::error::{Result, ToolchainError};
use crate::registration::payload::{CreateClusterData, CreateClusterRequest};
use crate::registration::toolchain_config::ToolChainConfig;
use reqwest::StatusCode;
use serde::Deserialize;
use std::time::Duration;
use tracing::{debug, info, instrument};

/// Client for the auth service and the cluster management service.
pub struct ClusterService {
    http: reqwest::Client,
    config: ToolChainConfig,
}

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
}

impl ClusterService {
    pub fn new(http: reqwest::Client, config: ToolChainConfig) -> Self {
        Self { http, config }
    }

    pub fn cluster_url(&self) -> &str {
        &self.config.cluster_url
    }

    /// Build the shared HTTP client used for every registration call
    pub fn http_client(timeout: Duration) -> Result<reqwest::Client> {
        Ok(reqwest::Client::builder().timeout(timeout).build()?)
    }

    /// POST /api/token with the toolchain client credentials
    #[instrument(skip(self), fields(auth_url = %self.config.auth_url))]
    pub async fn access_token(&self) -> Result<String> {
        let url = format!("{}/api/token", self.config.auth_url.trim_end_matches('/'));
        debug!("Requesting service account token: {}", url);
        let form = [
            ("client_id", self.config.client_id.as_str()),
            ("client_secret", self.config.client_secret.as_str()),
            ("grant_type", "client_credentials"),
        ];

        let resp = self
            .http
            .post(&url)
            .form(&form)
            .send()
            .await
            .map_err(|e| ToolchainError::Auth(e.to_string()))?;
        let status = resp.status();
        if status != StatusCode::OK {
            let body = resp.text().await.unwrap_or_default();
            return Err(ToolchainError::Auth(format!("{}: {}", status, body.trim())));
        }

        let token: TokenResponse = resp
            .json()
            .await
            .map_err(|e| ToolchainError::Auth(format!("invalid token response: {}", e)))?;
        Ok(token.access_token)
    }

    /// Register the cluster. Only a 201 counts as success.
    #[instrument(skip(self, data), fields(cluster = %data.name))]
    pub async fn create_cluster(&self, data: &CreateClusterData) -> Result<()> {
        let token = self.access_token().await?;
        let url = format!("{}/api/clusters", self.config.cluster_url.trim_end_matches('/'));
        debug!("Adding cluster configuration: {}", url);

        let resp = self
            .http
            .post(&url)
            .bearer_auth(token)
            .json(&CreateClusterRequest { data })
            .send()
            .await?;

        let status = resp.status();
        if status != StatusCode::CREATED {
            let body = resp.text().await.unwrap_or_default();
            return Err(ToolchainError::Registration {
                status: status.to_string(),
                body,
            });
        }

        info!("Cluster {} registered", data.name);
        Ok(())
    }
}
