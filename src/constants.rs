// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

/// The operator name as it appears in logs
pub const OPERATOR_NAME: &str = "toolchain-operator";

/// Objects owned by a ToolChainEnabler
pub mod toolchain {
    /// Service account created in the ToolChainEnabler's namespace
    pub const SA_NAME: &str = "toolchain-sre";
    /// OAuth client registered for the toolchain auth service
    pub const OAUTH_CLIENT_NAME: &str = "codeready-toolchain";
    pub const OAUTH_DEFAULT_SCOPE: &str = "user:full";
    pub const OAUTH_REDIRECT_URI: &str = "https://auth.openshift.io/";
    pub const OAUTH_GRANT_METHOD: &str = "auto";

    pub const SELF_PROVISIONER_BINDING: &str = "system:toolchain-sre:self-provisioner";
    pub const SELF_PROVISIONER_ROLE: &str = "self-provisioner";
    pub const CLUSTER_ADMIN_BINDING: &str = "system:toolchain-sre:dsaas-cluster-admin";
    pub const CLUSTER_ADMIN_ROLE: &str = "dsaas-cluster-admin";

    /// Prefix of the transient route used to discover the apps sub-domain
    pub const APP_DNS_ROUTE_PREFIX: &str = "toolchain-appdns";
}

/// Shared objects reconciled on every pass
pub mod online_registration {
    pub const NAMESPACE: &str = "openshift-infra";
    pub const SA_NAME: &str = "online-registration";
    pub const BINDING_NAME: &str = "online-registration";
    pub const ROLE_NAME: &str = "online-registration";
}

/// Keys of the secret referenced by `toolChainSecretName`
pub mod secret_keys {
    pub const CLIENT_ID: &str = "tc.client.id";
    pub const CLIENT_SECRET: &str = "tc.client.secret";
    pub const SPEC_FIELD: &str = "toolChainSecretName";
}

/// Values reported to the cluster management service
pub mod registration {
    pub const CLUSTER_TYPE_OSD: &str = "OSD";
    pub const SERVICE_ACCOUNT_TOKEN_TYPE: &str = "kubernetes.io/service-account-token";
    /// Fixed delay before retrying a failed registration call
    pub const REQUEUE_AFTER_SECS: u64 = 5;
}

pub const RBAC_API_GROUP: &str = "rbac.authorization.k8s.io";

/// API polling configuration
pub mod crd {
    /// Initial polling interval in seconds when waiting for an API
    pub const POLL_INTERVAL_SECS: u64 = 10;
    /// Maximum polling interval in seconds (exponential backoff cap)
    pub const POLL_MAX_INTERVAL_SECS: u64 = 60;
}
