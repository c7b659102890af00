// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

//! Get-or-create for the objects the operator manages.
//!
//! An object that already exists is left untouched, whatever its content. A
//! create that loses a race against another pass (409 AlreadyExists) counts
//! as success.

use crate::constants::{online_registration, toolchain};
use crate::error::{is_already_exists, is_not_found, Result, ToolchainError};
use crate::kubernetes::resources;
use crate::types::OAuthClient;
use k8s_openapi::api::core::v1::ServiceAccount;
use k8s_openapi::api::rbac::v1::ClusterRoleBinding;
use k8s_openapi::apimachinery::pkg::apis::meta::v1::OwnerReference;
use kube::{api::PostParams, Api, Client, Resource, ResourceExt};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::fmt::Debug;
use tracing::{debug, info, instrument};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EnsureOutcome {
    Existing,
    Created,
}

/// Create `desired` through `api` unless an object with its name exists.
///
/// The desired object is only built when the GET reports 404, so expensive
/// construction (such as secret generation) is skipped for existing objects.
pub async fn ensure<K, F>(api: &Api<K>, kind: &'static str, name: &str, desired: F) -> Result<EnsureOutcome>
where
    K: Resource + Clone + DeserializeOwned + Serialize + Debug,
    F: FnOnce() -> Result<K>,
{
    match api.get(name).await {
        Ok(_) => {
            debug!("{} {} already exists", kind, name);
            Ok(EnsureOutcome::Existing)
        }
        Err(err) if is_not_found(&err) => {
            info!("Creating {} {}", kind, name);
            let object = desired()?;
            match api.create(&PostParams::default(), &object).await {
                Ok(created) => {
                    info!("{} {} created successfully", kind, created.name_any());
                    Ok(EnsureOutcome::Created)
                }
                Err(err) if is_already_exists(&err) => {
                    debug!("{} {} was created concurrently", kind, name);
                    Ok(EnsureOutcome::Existing)
                }
                Err(source) => Err(ToolchainError::CreateFailed {
                    kind,
                    name: name.to_string(),
                    source,
                }),
            }
        }
        Err(source) => Err(ToolchainError::GetFailed {
            kind,
            name: name.to_string(),
            source,
        }),
    }
}

/// Ensures the objects shared by every enabler and owned by none of them
pub struct SharedInfraEnsurer {
    client: Client,
}

impl SharedInfraEnsurer {
    pub fn new(client: Client) -> Self {
        Self { client }
    }

    #[instrument(skip(self))]
    pub async fn ensure_service_account(&self) -> Result<EnsureOutcome> {
        let api: Api<ServiceAccount> =
            Api::namespaced(self.client.clone(), online_registration::NAMESPACE);
        ensure(&api, "service account", online_registration::SA_NAME, || {
            Ok(resources::online_registration_service_account())
        })
        .await
    }

    #[instrument(skip(self))]
    pub async fn ensure_cluster_role_binding(&self) -> Result<EnsureOutcome> {
        let api: Api<ClusterRoleBinding> = Api::all(self.client.clone());
        ensure(&api, "clusterrolebinding", online_registration::BINDING_NAME, || {
            Ok(resources::online_registration_binding())
        })
        .await
    }
}

/// Ensures the objects owned by a single ToolChainEnabler
pub struct ToolchainEnsurer {
    client: Client,
    namespace: String,
    owner: Option<OwnerReference>,
}

impl ToolchainEnsurer {
    pub fn new(client: Client, namespace: &str, owner: Option<OwnerReference>) -> Self {
        Self {
            client,
            namespace: namespace.to_string(),
            owner,
        }
    }

    #[instrument(skip(self), fields(namespace = %self.namespace))]
    pub async fn ensure_service_account(&self) -> Result<EnsureOutcome> {
        let api: Api<ServiceAccount> = Api::namespaced(self.client.clone(), &self.namespace);
        ensure(&api, "service account", toolchain::SA_NAME, || {
            Ok(resources::toolchain_service_account(
                &self.namespace,
                self.owner.as_ref(),
            ))
        })
        .await
    }

    /// Bind the toolchain service account to the self-provisioner role, then
    /// to the cluster admin role. Stops at the first failure.
    #[instrument(skip(self), fields(namespace = %self.namespace))]
    pub async fn ensure_cluster_role_bindings(&self) -> Result<[EnsureOutcome; 2]> {
        let api: Api<ClusterRoleBinding> = Api::all(self.client.clone());

        let self_provisioner = ensure(&api, "clusterrolebinding", toolchain::SELF_PROVISIONER_BINDING, || {
            Ok(resources::self_provisioner_binding(
                &self.namespace,
                self.owner.as_ref(),
            ))
        })
        .await?;

        let cluster_admin = ensure(&api, "clusterrolebinding", toolchain::CLUSTER_ADMIN_BINDING, || {
            Ok(resources::cluster_admin_binding(
                &self.namespace,
                self.owner.as_ref(),
            ))
        })
        .await?;

        Ok([self_provisioner, cluster_admin])
    }

    /// The secret of an existing client is neither regenerated nor compared.
    #[instrument(skip(self))]
    pub async fn ensure_oauth_client(&self) -> Result<EnsureOutcome> {
        let api: Api<OAuthClient> = Api::all(self.client.clone());
        ensure(&api, "oauthclient", toolchain::OAUTH_CLIENT_NAME, || {
            let secret = resources::generate_oauth_secret()?;
            Ok(resources::toolchain_oauth_client(secret, self.owner.as_ref()))
        })
        .await
    }
}
