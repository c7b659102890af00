// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0
use k8s_openapi::apimachinery::pkg::apis::meta::v1::OwnerReference;
use kube::{CustomResource, Resource};
use serde::{Deserialize, Serialize};

/// Requests that the cluster is enabled for the toolchain and registered with
/// the cluster management service.
#[derive(CustomResource, Serialize, Deserialize, Clone, Debug, Default, PartialEq, schemars::JsonSchema)]
#[kube(group = "codeready.io", version = "v1alpha1", kind = "ToolChainEnabler")]
#[kube(namespaced, shortname = "tce")]
pub struct ToolChainEnablerSpec {
    /// Base URL of the auth service issuing registration tokens
    #[serde(rename = "authURL", default)]
    pub auth_url: String,
    /// Base URL of the cluster management service
    #[serde(rename = "clusterURL", default)]
    pub cluster_url: String,
    #[serde(rename = "clusterName", default)]
    pub cluster_name: String,
    /// Secret in the same namespace holding `tc.client.id` and `tc.client.secret`
    #[serde(rename = "toolChainSecretName", default)]
    pub tool_chain_secret_name: String,
}

impl ToolChainEnabler {
    /// Controller reference stamped on every object this enabler owns.
    /// None until the API server has assigned a uid.
    pub fn owner_reference(&self) -> Option<OwnerReference> {
        self.controller_owner_ref(&())
    }

    /// Check whether an owner reference points at a ToolChainEnabler
    pub fn is_owner_kind(owner: &OwnerReference) -> bool {
        owner.kind == Self::kind(&()) && owner.api_version == Self::api_version(&())
    }
}
