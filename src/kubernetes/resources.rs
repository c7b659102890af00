// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

//! Desired shapes of the objects the operator manages.
//!
//! Every builder is a plain value constructor; nothing here talks to the API
//! server. Owner references are only set, never read back.

use crate::constants::{online_registration, toolchain, RBAC_API_GROUP};
use crate::error::Result;
use crate::types::OAuthClient;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;
use k8s_openapi::api::core::v1::ServiceAccount;
use k8s_openapi::api::rbac::v1::{ClusterRoleBinding, RoleRef, Subject};
use k8s_openapi::apimachinery::pkg::apis::meta::v1::OwnerReference;
use kube::api::ObjectMeta;
use rand::rngs::OsRng;
use rand::RngCore;

/// Bytes of entropy in a generated OAuth client secret (256 bits)
const OAUTH_SECRET_BYTES: usize = 32;

fn owned_metadata(name: &str, namespace: Option<&str>, owner: Option<&OwnerReference>) -> ObjectMeta {
    ObjectMeta {
        name: Some(name.to_string()),
        namespace: namespace.map(str::to_string),
        owner_references: owner.map(|o| vec![o.clone()]),
        ..Default::default()
    }
}

fn service_account_subject(name: &str, namespace: &str) -> Subject {
    Subject {
        kind: "ServiceAccount".to_string(),
        name: name.to_string(),
        namespace: Some(namespace.to_string()),
        api_group: None,
    }
}

fn cluster_role(name: &str) -> RoleRef {
    RoleRef {
        api_group: RBAC_API_GROUP.to_string(),
        kind: "ClusterRole".to_string(),
        name: name.to_string(),
    }
}

/// Shared `online-registration` service account in `openshift-infra`
pub fn online_registration_service_account() -> ServiceAccount {
    ServiceAccount {
        metadata: owned_metadata(
            online_registration::SA_NAME,
            Some(online_registration::NAMESPACE),
            None,
        ),
        ..Default::default()
    }
}

/// Shared binding of the `online-registration` cluster role
pub fn online_registration_binding() -> ClusterRoleBinding {
    ClusterRoleBinding {
        metadata: owned_metadata(online_registration::BINDING_NAME, None, None),
        subjects: Some(vec![service_account_subject(
            online_registration::SA_NAME,
            online_registration::NAMESPACE,
        )]),
        role_ref: cluster_role(online_registration::ROLE_NAME),
    }
}

/// Toolchain service account in the enabler's namespace
pub fn toolchain_service_account(namespace: &str, owner: Option<&OwnerReference>) -> ServiceAccount {
    ServiceAccount {
        metadata: owned_metadata(toolchain::SA_NAME, Some(namespace), owner),
        ..Default::default()
    }
}

fn toolchain_binding(
    binding: &str,
    role: &str,
    namespace: &str,
    owner: Option<&OwnerReference>,
) -> ClusterRoleBinding {
    ClusterRoleBinding {
        metadata: owned_metadata(binding, None, owner),
        subjects: Some(vec![service_account_subject(toolchain::SA_NAME, namespace)]),
        role_ref: cluster_role(role),
    }
}

/// Grants the toolchain service account the `self-provisioner` cluster role
pub fn self_provisioner_binding(namespace: &str, owner: Option<&OwnerReference>) -> ClusterRoleBinding {
    toolchain_binding(
        toolchain::SELF_PROVISIONER_BINDING,
        toolchain::SELF_PROVISIONER_ROLE,
        namespace,
        owner,
    )
}

/// Grants the toolchain service account the `dsaas-cluster-admin` cluster role.
/// The cluster role itself is expected to be installed with the operator.
pub fn cluster_admin_binding(namespace: &str, owner: Option<&OwnerReference>) -> ClusterRoleBinding {
    toolchain_binding(
        toolchain::CLUSTER_ADMIN_BINDING,
        toolchain::CLUSTER_ADMIN_ROLE,
        namespace,
        owner,
    )
}

/// OAuth client used by the toolchain auth service
pub fn toolchain_oauth_client(secret: String, owner: Option<&OwnerReference>) -> OAuthClient {
    OAuthClient {
        metadata: owned_metadata(toolchain::OAUTH_CLIENT_NAME, None, owner),
        secret: Some(secret),
        grant_method: Some(toolchain::OAUTH_GRANT_METHOD.to_string()),
        redirect_uris: vec![toolchain::OAUTH_REDIRECT_URI.to_string()],
        access_token_max_age_seconds: Some(0),
        ..Default::default()
    }
}

/// Random URL-safe string carrying 256 bits from the OS random source
pub fn generate_oauth_secret() -> Result<String> {
    let mut bytes = [0u8; OAUTH_SECRET_BYTES];
    OsRng.try_fill_bytes(&mut bytes)?;
    Ok(URL_SAFE_NO_PAD.encode(bytes))
}
