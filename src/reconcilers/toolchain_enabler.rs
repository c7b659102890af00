// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

//! ToolChainEnabler reconciler - enables the cluster for the toolchain and
//! registers it with the cluster management service.

use crate::config::Config;
use crate::constants::{online_registration, registration};
use crate::error::{Result, ToolchainError};
use crate::kubernetes::{SharedInfraEnsurer, ToolchainEnsurer};
use crate::reconcilers::infra::shared_account_watcher_config;
use crate::registration::{assemble, ClusterInfoContext, ClusterService, ToolChainConfig, CANONICAL_PIPELINE};
use crate::types::{OAuthClient, ToolChainEnabler};
use futures::StreamExt;
use k8s_openapi::api::core::v1::ServiceAccount;
use k8s_openapi::api::rbac::v1::ClusterRoleBinding;
use kube::{
    runtime::{controller::Action, reflector::ObjectRef, reflector::Store, Controller},
    Api, Client, Resource, ResourceExt,
};
use kube_runtime::watcher::Config as WatcherConfig;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, error, info, instrument, warn};

/// The namespaced name a reconcile pass is run for
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReconcileRequest {
    pub namespace: String,
    pub name: String,
}

impl ReconcileRequest {
    pub fn new(namespace: &str, name: &str) -> Self {
        Self {
            namespace: namespace.to_string(),
            name: name.to_string(),
        }
    }
}

pub struct ToolChainEnablerReconciler {
    client: Client,
    config: Config,
    http: reqwest::Client,
}

impl ToolChainEnablerReconciler {
    pub fn new(client: Client, config: Config) -> Result<Self> {
        let http = ClusterService::http_client(config.registration_timeout)?;
        Ok(Self { client, config, http })
    }

    pub async fn run(self: Arc<Self>) -> anyhow::Result<()> {
        let namespace = self.config.watch_namespace.clone();
        let enablers: Api<ToolChainEnabler> = Api::namespaced(self.client.clone(), &namespace);
        let service_accounts: Api<ServiceAccount> = Api::namespaced(self.client.clone(), &namespace);
        let bindings: Api<ClusterRoleBinding> = Api::all(self.client.clone());
        let oauth_clients: Api<OAuthClient> = Api::all(self.client.clone());
        let shared_accounts: Api<ServiceAccount> =
            Api::namespaced(self.client.clone(), online_registration::NAMESPACE);

        info!("Watching ToolChainEnablers in namespace {}", namespace);
        let binding_namespace = namespace.clone();
        let oauth_namespace = namespace.clone();

        let controller = Controller::new(enablers, WatcherConfig::default());
        let known_enablers = controller.store();

        controller
            .owns(service_accounts, WatcherConfig::default())
            .watches(bindings, WatcherConfig::default(), move |binding| {
                enabler_owners(&binding, &binding_namespace)
            })
            .watches(oauth_clients, WatcherConfig::default(), move |client| {
                enabler_owners(&client, &oauth_namespace)
            })
            // Deleted shared accounts are restored by the enabler passes
            .watches(shared_accounts, shared_account_watcher_config(), move |_| {
                all_enablers(&known_enablers)
            })
            .run(reconcile, error_policy, self)
            .for_each(|res| async move {
                match res {
                    Ok(o) => debug!("Reconciled enabler: {:?}", o),
                    Err(e) => warn!("Reconciliation error: {:?}", e),
                }
            })
            .await;

        Ok(())
    }

    /// Run one pass for `request`. Shared infra is ensured on every pass; a
    /// request from the shared infra namespace stops right after it.
    #[instrument(skip(self), fields(namespace = %request.namespace, name = %request.name))]
    pub async fn reconcile_request(&self, request: &ReconcileRequest) -> Result<Action> {
        let namespace = if request.namespace.is_empty() {
            self.config.watch_namespace.as_str()
        } else {
            request.namespace.as_str()
        };
        let from_shared_infra = namespace == online_registration::NAMESPACE;

        let enabler = if from_shared_infra {
            None
        } else {
            let enablers: Api<ToolChainEnabler> = Api::namespaced(self.client.clone(), namespace);
            let found = enablers
                .get_opt(&request.name)
                .await
                .map_err(|source| ToolchainError::GetFailed {
                    kind: "toolchainenabler",
                    name: request.name.clone(),
                    source,
                })?;
            match found {
                Some(enabler) => Some(enabler),
                None => {
                    debug!("ToolChainEnabler {}/{} is gone", namespace, request.name);
                    return Ok(Action::await_change());
                }
            }
        };

        let shared = SharedInfraEnsurer::new(self.client.clone());
        shared.ensure_service_account().await?;
        shared.ensure_cluster_role_binding().await?;

        let Some(enabler) = enabler else {
            debug!("Shared infra in place");
            return Ok(Action::await_change());
        };

        let ensurer = ToolchainEnsurer::new(self.client.clone(), namespace, enabler.owner_reference());
        ensurer.ensure_service_account().await?;
        ensurer.ensure_cluster_role_bindings().await?;
        ensurer.ensure_oauth_client().await?;

        let config = ToolChainConfig::load(&self.client, namespace, &enabler.spec).await?;
        let context = ClusterInfoContext::new(self.client.clone(), namespace, &config.cluster_name);
        let data = assemble(&context, &CANONICAL_PIPELINE).await?;

        let service = ClusterService::new(self.http.clone(), config);
        match service.create_cluster(&data).await {
            Ok(()) => Ok(Action::await_change()),
            Err(e) => {
                error!(
                    cluster_name = %data.name,
                    cluster_service_url = %service.cluster_url(),
                    "Failed to register cluster: {}",
                    e
                );
                Ok(Action::requeue(Duration::from_secs(
                    registration::REQUEUE_AFTER_SECS,
                )))
            }
        }
    }

    /// What to do after a failed pass. Malformed configuration waits for the
    /// ToolChainEnabler to change; anything else is retried.
    pub fn error_action(&self, error: &ToolchainError) -> Action {
        if error.is_retryable() {
            Action::requeue(self.config.error_requeue)
        } else {
            Action::await_change()
        }
    }
}

/// Map an object to the ToolChainEnablers controlling it. Cluster scoped
/// children carry no namespace, so the enablers are looked up in `namespace`.
fn enabler_owners<K: Resource>(object: &K, namespace: &str) -> Vec<ObjectRef<ToolChainEnabler>> {
    object
        .owner_references()
        .iter()
        .filter(|owner| ToolChainEnabler::is_owner_kind(owner))
        .map(|owner| ObjectRef::new(&owner.name).within(namespace))
        .collect()
}

fn all_enablers(store: &Store<ToolChainEnabler>) -> Vec<ObjectRef<ToolChainEnabler>> {
    store
        .state()
        .iter()
        .map(|enabler| ObjectRef::from_obj(enabler.as_ref()))
        .collect()
}

async fn reconcile(enabler: Arc<ToolChainEnabler>, ctx: Arc<ToolChainEnablerReconciler>) -> Result<Action> {
    let namespace = enabler.namespace().unwrap_or_default();
    ctx.reconcile_request(&ReconcileRequest::new(&namespace, &enabler.name_any()))
        .await
}

fn error_policy(
    enabler: Arc<ToolChainEnabler>,
    error: &ToolchainError,
    ctx: Arc<ToolChainEnablerReconciler>,
) -> Action {
    error!("Reconciliation of {} failed: {}", enabler.name_any(), error);
    ctx.error_action(error)
}
