// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

//! Shared infra controller - keeps the online registration service account
//! and its binding in place, retrying failed passes on the controller queue.

use crate::constants::online_registration;
use crate::error::{Result, ToolchainError};
use crate::reconcilers::toolchain_enabler::{ReconcileRequest, ToolChainEnablerReconciler};
use futures::StreamExt;
use k8s_openapi::api::core::v1::ServiceAccount;
use k8s_openapi::api::rbac::v1::ClusterRoleBinding;
use kube::{
    runtime::{controller::Action, reflector::ObjectRef, Controller},
    Api, Client, ResourceExt,
};
use kube_runtime::watcher::Config as WatcherConfig;
use std::sync::Arc;
use tracing::{debug, info, warn};

pub struct SharedInfraController {
    client: Client,
    reconciler: Arc<ToolChainEnablerReconciler>,
}

impl SharedInfraController {
    pub fn new(client: Client, reconciler: Arc<ToolChainEnablerReconciler>) -> Self {
        Self { client, reconciler }
    }

    pub async fn run(self) -> anyhow::Result<()> {
        let service_accounts: Api<ServiceAccount> =
            Api::namespaced(self.client.clone(), online_registration::NAMESPACE);
        let bindings: Api<ClusterRoleBinding> = Api::all(self.client.clone());

        info!(
            "Watching service account {}/{}",
            online_registration::NAMESPACE,
            online_registration::SA_NAME
        );

        Controller::new(service_accounts, shared_account_watcher_config())
            .watches(bindings, shared_binding_watcher_config(), |_| {
                Some(shared_account_ref())
            })
            .run(reconcile, error_policy, self.reconciler)
            .for_each(|res| async move {
                match res {
                    Ok(o) => debug!("Reconciled shared infra: {:?}", o),
                    Err(e) => warn!("Shared infra reconciliation error: {:?}", e),
                }
            })
            .await;

        Ok(())
    }
}

/// Watch restricted to the online registration service account
pub fn shared_account_watcher_config() -> WatcherConfig {
    WatcherConfig::default().fields(&format!("metadata.name={}", online_registration::SA_NAME))
}

fn shared_binding_watcher_config() -> WatcherConfig {
    WatcherConfig::default().fields(&format!(
        "metadata.name={}",
        online_registration::BINDING_NAME
    ))
}

fn shared_account_ref() -> ObjectRef<ServiceAccount> {
    ObjectRef::new(online_registration::SA_NAME).within(online_registration::NAMESPACE)
}

async fn reconcile(sa: Arc<ServiceAccount>, ctx: Arc<ToolChainEnablerReconciler>) -> Result<Action> {
    let namespace = sa
        .namespace()
        .unwrap_or_else(|| online_registration::NAMESPACE.to_string());
    ctx.reconcile_request(&ReconcileRequest::new(&namespace, &sa.name_any()))
        .await
}

fn error_policy(
    sa: Arc<ServiceAccount>,
    error: &ToolchainError,
    ctx: Arc<ToolChainEnablerReconciler>,
) -> Action {
    warn!("Shared infra pass for {} failed: {}", sa.name_any(), error);
    ctx.error_action(error)
}
