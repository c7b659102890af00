// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

//! Endpoints and credentials used to register the cluster.

use crate::constants::secret_keys;
use crate::error::{Result, ToolchainError};
use crate::types::ToolChainEnablerSpec;
use k8s_openapi::api::core::v1::Secret;
use kube::{Api, Client};
use std::fmt;
use tracing::instrument;
use url::Url;

/// Validated endpoints and client credentials for one reconcile pass
#[derive(Clone, PartialEq, Eq)]
pub struct ToolChainConfig {
    pub auth_url: String,
    pub cluster_url: String,
    pub cluster_name: String,
    pub client_id: String,
    pub client_secret: String,
}

impl fmt::Debug for ToolChainConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ToolChainConfig")
            .field("auth_url", &self.auth_url)
            .field("cluster_url", &self.cluster_url)
            .field("cluster_name", &self.cluster_name)
            .field("client_id", &self.client_id)
            .field("client_secret", &"<redacted>")
            .finish()
    }
}

impl ToolChainConfig {
    /// Validate the enabler spec, then read the client credentials from the
    /// referenced secret. No call is made before the spec itself is valid.
    #[instrument(skip(client, spec), fields(secret = %spec.tool_chain_secret_name))]
    pub async fn load(client: &Client, namespace: &str, spec: &ToolChainEnablerSpec) -> Result<Self> {
        validate_spec(spec)?;

        let secrets: Api<Secret> = Api::namespaced(client.clone(), namespace);
        let secret = secrets
            .get(&spec.tool_chain_secret_name)
            .await
            .map_err(|source| ToolchainError::SecretLookup {
                name: spec.tool_chain_secret_name.clone(),
                source,
            })?;

        Self::from_parts(spec, &secret)
    }

    /// Combine an already validated spec with the credentials secret
    pub fn from_parts(spec: &ToolChainEnablerSpec, secret: &Secret) -> Result<Self> {
        let client_id = secret_value(secret, secret_keys::CLIENT_ID, &spec.tool_chain_secret_name)?;
        let client_secret =
            secret_value(secret, secret_keys::CLIENT_SECRET, &spec.tool_chain_secret_name)?;

        Ok(ToolChainConfig {
            auth_url: spec.auth_url.clone(),
            cluster_url: spec.cluster_url.clone(),
            cluster_name: spec.cluster_name.clone(),
            client_id,
            client_secret,
        })
    }
}

/// Check the URLs and the secret reference of an enabler spec
pub fn validate_spec(spec: &ToolChainEnablerSpec) -> Result<()> {
    validate_url(&spec.auth_url, "auth service")?;
    validate_url(&spec.cluster_url, "cluster service")?;
    if spec.tool_chain_secret_name.is_empty() {
        return Err(ToolchainError::InvalidConfig(format!(
            "'{}' is empty",
            secret_keys::SPEC_FIELD
        )));
    }
    Ok(())
}

fn validate_url(service_url: &str, service_name: &str) -> Result<()> {
    if service_url.is_empty() {
        return Err(ToolchainError::InvalidConfig(format!(
            "'{}' url is empty",
            service_name
        )));
    }
    let url = Url::parse(service_url).map_err(|e| {
        ToolchainError::InvalidConfig(format!(
            "invalid url for {}: '{}': {}",
            service_name, service_url, e
        ))
    })?;
    if url.host_str().map_or(true, str::is_empty) {
        return Err(ToolchainError::InvalidConfig(format!(
            "invalid url '{}' (missing scheme or host?) for: {}",
            service_url, service_name
        )));
    }
    Ok(())
}

fn secret_value(secret: &Secret, key: &str, secret_name: &str) -> Result<String> {
    secret
        .data
        .as_ref()
        .and_then(|data| data.get(key))
        .filter(|value| !value.0.is_empty())
        .map(|value| String::from_utf8_lossy(&value.0).to_string())
        .ok_or_else(|| {
            ToolchainError::InvalidConfig(format!(
                "'{}' is empty in secret '{}'",
                key, secret_name
            ))
        })
}
