// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

//! Resource types read and written by the operator.

pub mod oauth_client;
pub mod route;
pub mod toolchain_enabler;

pub use oauth_client::OAuthClient;
pub use route::{Route, RouteSpec, RouteTargetReference};
pub use toolchain_enabler::{ToolChainEnabler, ToolChainEnablerSpec};
