// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

//! Gathers the facts describing this cluster into a registration payload.
//!
//! Each [`ConfigStep`] reads what it needs from a [`ClusterInfoContext`] and
//! returns its own [`ClusterFacts`]; no step sees another step's output.
//! [`assemble`] runs the steps in order and stops at the first error.

use crate::constants::{registration, toolchain};
use crate::error::{Result, ToolchainError};
use crate::registration::payload::{ClusterFacts, CreateClusterData};
use crate::types::route::sub_domain;
use crate::types::{OAuthClient, Route, RouteSpec, RouteTargetReference};
use k8s_openapi::api::core::v1::{Secret, ServiceAccount};
use kube::{
    api::{DeleteParams, PostParams},
    Api, Client, ResourceExt,
};
use tracing::{debug, info, instrument, warn};

/// Everything the assembly steps may read
#[derive(Clone)]
pub struct ClusterInfoContext {
    pub client: Client,
    /// Namespace of the enabler, home of the toolchain service account
    pub namespace: String,
    pub cluster_name: String,
}

impl ClusterInfoContext {
    pub fn new(client: Client, namespace: &str, cluster_name: &str) -> Self {
        Self {
            client,
            namespace: namespace.to_string(),
            cluster_name: cluster_name.to_string(),
        }
    }
}

/// One independently failable fact-gathering step
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigStep {
    Name,
    AppDns,
    ApiUrl,
    OAuthClient,
    ServiceAccount,
    TokenProvider,
    TypeOsd,
}

/// Steps run for every registration, cheapest local facts before the scratch route
pub const CANONICAL_PIPELINE: [ConfigStep; 7] = [
    ConfigStep::Name,
    ConfigStep::AppDns,
    ConfigStep::ApiUrl,
    ConfigStep::OAuthClient,
    ConfigStep::ServiceAccount,
    ConfigStep::TokenProvider,
    ConfigStep::TypeOsd,
];

impl ConfigStep {
    pub fn name(&self) -> &'static str {
        match self {
            ConfigStep::Name => "name",
            ConfigStep::AppDns => "app-dns",
            ConfigStep::ApiUrl => "api-url",
            ConfigStep::OAuthClient => "oauth-client",
            ConfigStep::ServiceAccount => "service-account",
            ConfigStep::TokenProvider => "token-provider",
            ConfigStep::TypeOsd => "type-osd",
        }
    }

    pub async fn gather(&self, ctx: &ClusterInfoContext) -> Result<ClusterFacts> {
        match self {
            ConfigStep::Name => Ok(with_name(ctx)),
            ConfigStep::AppDns => with_app_dns(ctx).await,
            ConfigStep::ApiUrl => Ok(with_api_url(ctx)),
            ConfigStep::OAuthClient => with_oauth_client(ctx).await,
            ConfigStep::ServiceAccount => with_service_account(ctx).await,
            ConfigStep::TokenProvider => Ok(with_token_provider()),
            ConfigStep::TypeOsd => Ok(with_type_osd()),
        }
    }
}

/// Run `steps` in order, folding their facts into one payload. The first
/// failing step's error is returned as is and later steps never run.
#[instrument(skip(ctx, steps), fields(cluster = %ctx.cluster_name))]
pub async fn assemble(ctx: &ClusterInfoContext, steps: &[ConfigStep]) -> Result<CreateClusterData> {
    let mut data = CreateClusterData::default();
    for step in steps {
        debug!("Gathering cluster {}", step.name());
        let facts = step.gather(ctx).await?;
        data = data.apply(facts);
    }
    Ok(data)
}

pub fn with_name(ctx: &ClusterInfoContext) -> ClusterFacts {
    ClusterFacts {
        name: Some(ctx.cluster_name.clone()),
        ..Default::default()
    }
}

pub fn with_api_url(ctx: &ClusterInfoContext) -> ClusterFacts {
    ClusterFacts {
        api_url: Some(api_url(&ctx.cluster_name)),
        ..Default::default()
    }
}

pub fn api_url(cluster_name: &str) -> String {
    format!("https://api.{}.openshift.com/", cluster_name)
}

pub async fn with_app_dns(ctx: &ClusterInfoContext) -> Result<ClusterFacts> {
    let app_dns = routing_sub_domain(ctx).await?;
    Ok(ClusterFacts {
        app_dns: Some(app_dns),
        ..Default::default()
    })
}

pub async fn with_oauth_client(ctx: &ClusterInfoContext) -> Result<ClusterFacts> {
    let clients: Api<OAuthClient> = Api::all(ctx.client.clone());
    let client = clients
        .get(toolchain::OAUTH_CLIENT_NAME)
        .await
        .map_err(|source| ToolchainError::GetFailed {
            kind: "oauthclient",
            name: toolchain::OAUTH_CLIENT_NAME.to_string(),
            source,
        })?;

    Ok(ClusterFacts {
        auth_client_id: Some(toolchain::OAUTH_CLIENT_NAME.to_string()),
        auth_client_secret: Some(client.secret.unwrap_or_default()),
        auth_client_default_scope: Some(toolchain::OAUTH_DEFAULT_SCOPE.to_string()),
        ..Default::default()
    })
}

/// Read the token of the toolchain service account. Every referenced secret
/// is read and a failed read aborts the step. Docker config secrets are
/// skipped and the last token secret wins.
pub async fn with_service_account(ctx: &ClusterInfoContext) -> Result<ClusterFacts> {
    let accounts: Api<ServiceAccount> = Api::namespaced(ctx.client.clone(), &ctx.namespace);
    let sa = accounts
        .get(toolchain::SA_NAME)
        .await
        .map_err(|source| ToolchainError::GetFailed {
            kind: "service account",
            name: toolchain::SA_NAME.to_string(),
            source,
        })?;

    let references = sa.secrets.clone().unwrap_or_default();
    if references.is_empty() {
        return Err(ToolchainError::NoSecretReference(sa.name_any()));
    }

    let secrets: Api<Secret> = Api::namespaced(ctx.client.clone(), &ctx.namespace);
    let mut token_secret = None;
    for reference in references.iter().filter_map(|r| r.name.as_deref()) {
        let secret = secrets
            .get(reference)
            .await
            .map_err(|source| ToolchainError::GetFailed {
                kind: "secret",
                name: reference.to_string(),
                source,
            })?;
        if secret.type_.as_deref() == Some(registration::SERVICE_ACCOUNT_TOKEN_TYPE) {
            token_secret = Some(secret);
        }
    }

    let Some(token_secret) = token_secret else {
        return Err(ToolchainError::NoTokenSecret {
            sa: sa.name_any(),
            secret_type: registration::SERVICE_ACCOUNT_TOKEN_TYPE.to_string(),
        });
    };

    let token = token_secret
        .data
        .as_ref()
        .and_then(|data| data.get("token"))
        .map(|token| String::from_utf8_lossy(&token.0).to_string())
        .unwrap_or_default();

    Ok(ClusterFacts {
        service_account_username: Some(format!(
            "system:serviceaccount:{}:{}",
            ctx.namespace,
            toolchain::SA_NAME
        )),
        service_account_token: Some(token),
        ..Default::default()
    })
}

pub fn with_token_provider() -> ClusterFacts {
    ClusterFacts {
        token_provider_id: Some(uuid::Uuid::new_v4().to_string()),
        ..Default::default()
    }
}

pub fn with_type_osd() -> ClusterFacts {
    ClusterFacts {
        type_: Some(registration::CLUSTER_TYPE_OSD.to_string()),
        ..Default::default()
    }
}

/// Create a scratch route, read the host the router assigned to it and strip
/// the first label. The route is deleted whatever happens after its creation;
/// a failed delete is only logged.
#[instrument(skip(ctx), fields(namespace = %ctx.namespace))]
async fn routing_sub_domain(ctx: &ClusterInfoContext) -> Result<String> {
    let routes: Api<Route> = Api::namespaced(ctx.client.clone(), &ctx.namespace);
    let route_name = format!(
        "{}-{}",
        toolchain::APP_DNS_ROUTE_PREFIX,
        &uuid::Uuid::new_v4().simple().to_string()[..8]
    );
    let scratch = Route::new(
        &route_name,
        RouteSpec {
            host: None,
            to: RouteTargetReference {
                kind: "Service".to_string(),
                name: route_name.clone(),
            },
        },
    );

    let created = routes
        .create(&PostParams::default(), &scratch)
        .await
        .map_err(|source| ToolchainError::CreateFailed {
            kind: "route",
            name: route_name.clone(),
            source,
        })?;

    let result = read_sub_domain(&routes, &created).await;

    match routes.delete(&route_name, &DeleteParams::default()).await {
        Ok(_) => debug!("Deleted scratch route {}", route_name),
        Err(e) => warn!("Failed to delete scratch route {}: {}", route_name, e),
    }

    if let Ok(app_dns) = &result {
        info!("Discovered apps sub-domain {}", app_dns);
    }
    result
}

async fn read_sub_domain(routes: &Api<Route>, created: &Route) -> Result<String> {
    let name = created.name_any();
    let host = match created.host() {
        Some(host) => host.to_string(),
        None => routes
            .get(&name)
            .await
            .map_err(|source| ToolchainError::GetFailed {
                kind: "route",
                name: name.clone(),
                source,
            })?
            .host()
            .map(str::to_string)
            .ok_or_else(|| ToolchainError::AppDns(format!("route {} has no host assigned", name)))?,
    };

    sub_domain(&host)
        .map(str::to_string)
        .ok_or_else(|| ToolchainError::AppDns(format!("route host '{}' has no sub-domain", host)))
}
