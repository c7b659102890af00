// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

//! Kubernetes reconcilers that react to watch events.

pub mod infra;
pub mod toolchain_enabler;

pub use infra::SharedInfraController;
pub use toolchain_enabler::{ReconcileRequest, ToolChainEnablerReconciler};
