// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

//! Registration of this cluster with the cluster management service.

pub mod assembler;
pub mod client;
pub mod payload;
pub mod toolchain_config;

pub use assembler::{assemble, ClusterInfoContext, ConfigStep, CANONICAL_PIPELINE};
pub use client::ClusterService;
pub use payload::{ClusterFacts, CreateClusterData};
pub use toolchain_config::ToolChainConfig;
