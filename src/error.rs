// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ToolchainError {
    #[error("Kubernetes API error: {0}")]
    KubeError(#[from] kube::Error),

    #[error("failed to get {kind} {name}: {source}")]
    GetFailed {
        kind: &'static str,
        name: String,
        #[source]
        source: kube::Error,
    },

    #[error("failed to create {kind} {name}: {source}")]
    CreateFailed {
        kind: &'static str,
        name: String,
        #[source]
        source: kube::Error,
    },

    #[error("{0}")]
    InvalidConfig(String),

    #[error("failed to get secret '{name}': {source}")]
    SecretLookup {
        name: String,
        #[source]
        source: kube::Error,
    },

    #[error("couldn't find any secret reference for sa {0}")]
    NoSecretReference(String),

    #[error("couldn't find any secret reference for sa {sa} of type {secret_type}")]
    NoTokenSecret { sa: String, secret_type: String },

    #[error("failed to discover apps sub-domain: {0}")]
    AppDns(String),

    #[error("failed to generate oauth client secret: {0}")]
    SecretGeneration(#[from] rand::Error),

    #[error("failed to obtain access token from auth service: {0}")]
    Auth(String),

    #[error("received unexpected response code while adding cluster configuration in cluster management service. Response status: {status}. Response body: {body}")]
    Registration { status: String, body: String },

    #[error("HTTP request error: {0}")]
    Http(#[from] reqwest::Error),
}

impl ToolchainError {
    /// False for malformed configuration; only an edit of the
    /// ToolChainEnabler can change it.
    pub fn is_retryable(&self) -> bool {
        !matches!(self, ToolchainError::InvalidConfig(_))
    }
}

pub type Result<T> = std::result::Result<T, ToolchainError>;

/// True when the API server answered 404 for the request
pub fn is_not_found(err: &kube::Error) -> bool {
    matches!(err, kube::Error::Api(resp) if resp.code == 404)
}

/// True when the API server answered 409 AlreadyExists for a create
pub fn is_already_exists(err: &kube::Error) -> bool {
    matches!(err, kube::Error::Api(resp) if resp.code == 409 && resp.reason == "AlreadyExists")
}
