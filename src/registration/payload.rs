// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

//! Cluster description sent to the cluster management service.

use serde::Serialize;

/// Registration payload. Fields are declared in key order so the encoded
/// JSON is stable.
#[derive(Serialize, Clone, Debug, Default, PartialEq, Eq)]
#[serde(rename_all = "kebab-case")]
pub struct CreateClusterData {
    pub api_url: String,
    pub app_dns: String,
    pub auth_client_default_scope: String,
    pub auth_client_id: String,
    pub auth_client_secret: String,
    pub name: String,
    pub service_account_token: String,
    pub service_account_username: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub token_provider_id: Option<String>,
    #[serde(rename = "type")]
    pub type_: String,
}

/// Body of `POST /api/clusters`
#[derive(Serialize, Debug)]
pub struct CreateClusterRequest<'a> {
    pub data: &'a CreateClusterData,
}

/// The facts contributed by one assembly step. Unset fields leave the
/// accumulated payload untouched.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ClusterFacts {
    pub name: Option<String>,
    pub api_url: Option<String>,
    pub app_dns: Option<String>,
    pub auth_client_id: Option<String>,
    pub auth_client_secret: Option<String>,
    pub auth_client_default_scope: Option<String>,
    pub service_account_username: Option<String>,
    pub service_account_token: Option<String>,
    pub token_provider_id: Option<String>,
    pub type_: Option<String>,
}

impl CreateClusterData {
    /// Overlay the facts gathered by a step
    pub fn apply(mut self, facts: ClusterFacts) -> Self {
        fn set(field: &mut String, value: Option<String>) {
            if let Some(value) = value {
                *field = value;
            }
        }

        set(&mut self.name, facts.name);
        set(&mut self.api_url, facts.api_url);
        set(&mut self.app_dns, facts.app_dns);
        set(&mut self.auth_client_id, facts.auth_client_id);
        set(&mut self.auth_client_secret, facts.auth_client_secret);
        set(&mut self.auth_client_default_scope, facts.auth_client_default_scope);
        set(&mut self.service_account_username, facts.service_account_username);
        set(&mut self.service_account_token, facts.service_account_token);
        set(&mut self.type_, facts.type_);
        if facts.token_provider_id.is_some() {
            self.token_provider_id = facts.token_provider_id;
        }
        self
    }
}
