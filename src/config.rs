// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0
use anyhow::{Context, Result};
use std::env;
use std::time::Duration;

const DEFAULT_REGISTRATION_TIMEOUT_SECS: u64 = 30;
const DEFAULT_ERROR_REQUEUE_SECS: u64 = 30;

/// Operator configuration loaded from environment variables
#[derive(Debug, Clone)]
pub struct Config {
    /// Namespace holding the ToolChainEnabler resources. Requests coming from
    /// cluster scoped children are resolved against it.
    pub watch_namespace: String,
    /// Timeout applied to calls against the auth and cluster services
    pub registration_timeout: Duration,
    /// Delay before a failed reconcile is retried
    pub error_requeue: Duration,
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self> {
        let watch_namespace = env::var("WATCH_NAMESPACE")
            .context("WATCH_NAMESPACE environment variable not set")?;
        if watch_namespace.is_empty() {
            anyhow::bail!("WATCH_NAMESPACE must not be empty");
        }

        let registration_timeout = Duration::from_secs(secs_from_env(
            "REGISTRATION_TIMEOUT_SECS",
            DEFAULT_REGISTRATION_TIMEOUT_SECS,
        )?);
        let error_requeue =
            Duration::from_secs(secs_from_env("ERROR_REQUEUE_SECS", DEFAULT_ERROR_REQUEUE_SECS)?);

        Ok(Config {
            watch_namespace,
            registration_timeout,
            error_requeue,
        })
    }

    /// Configuration with default timings for the given namespace
    pub fn for_namespace(watch_namespace: &str) -> Self {
        Config {
            watch_namespace: watch_namespace.to_string(),
            registration_timeout: Duration::from_secs(DEFAULT_REGISTRATION_TIMEOUT_SECS),
            error_requeue: Duration::from_secs(DEFAULT_ERROR_REQUEUE_SECS),
        }
    }
}

fn secs_from_env(key: &str, default: u64) -> Result<u64> {
    match env::var(key) {
        Ok(value) => value
            .parse()
            .with_context(|| format!("{} must be a number of seconds, got '{}'", key, value)),
        Err(_) => Ok(default),
    }
}
