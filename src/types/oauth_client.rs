// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

//! OpenShift `oauth.openshift.io/v1` OAuthClient.
//!
//! The object keeps its fields at the top level instead of under `spec`, so it
//! is wired into kube through the k8s-openapi traits rather than the
//! `CustomResource` derive.

use k8s_openapi::apimachinery::pkg::apis::meta::v1::ObjectMeta;
use serde::{Deserialize, Serialize};

const API_VERSION: &str = "oauth.openshift.io/v1";
const KIND: &str = "OAuthClient";

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct OAuthClient {
    #[serde(default = "api_version")]
    pub api_version: String,
    #[serde(default = "kind")]
    pub kind: String,
    #[serde(default)]
    pub metadata: ObjectMeta,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub secret: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub grant_method: Option<String>,
    #[serde(rename = "redirectURIs", default, skip_serializing_if = "Vec::is_empty")]
    pub redirect_uris: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub access_token_max_age_seconds: Option<i32>,
}

fn api_version() -> String {
    API_VERSION.to_string()
}

fn kind() -> String {
    KIND.to_string()
}

impl Default for OAuthClient {
    fn default() -> Self {
        OAuthClient {
            api_version: api_version(),
            kind: kind(),
            metadata: ObjectMeta::default(),
            secret: None,
            grant_method: None,
            redirect_uris: Vec::new(),
            access_token_max_age_seconds: None,
        }
    }
}

impl k8s_openapi::Resource for OAuthClient {
    const API_VERSION: &'static str = API_VERSION;
    const GROUP: &'static str = "oauth.openshift.io";
    const KIND: &'static str = KIND;
    const VERSION: &'static str = "v1";
    const URL_PATH_SEGMENT: &'static str = "oauthclients";
    type Scope = k8s_openapi::ClusterResourceScope;
}

impl k8s_openapi::Metadata for OAuthClient {
    type Ty = ObjectMeta;

    fn metadata(&self) -> &ObjectMeta {
        &self.metadata
    }

    fn metadata_mut(&mut self) -> &mut ObjectMeta {
        &mut self.metadata
    }
}
