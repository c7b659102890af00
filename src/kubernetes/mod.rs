// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

//! Kubernetes utilities for API discovery, desired objects and get-or-create.

pub mod crd;
pub mod ensure;
pub mod resources;

pub use crd::{required_apis, wait_for_apis};
pub use ensure::{ensure, EnsureOutcome, SharedInfraEnsurer, ToolchainEnsurer};
