// SPDX-FileCopyrightText: 2026 Postpilot Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! HTTP gateway for per-user credential configuration.
//!
//! Authenticated callers read and write their own social platform API keys;
//! the gateway never decides identity itself and never returns another
//! user's records.

pub mod auth;
pub mod handlers;
pub mod server;

pub use auth::{auth_middleware, StaticTokenAuth};
pub use server::{build_router, start_server, GatewayState, ServerConfig};
