// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! # HRTI Server
//!
//! Hosts HLA federation executions in one process and serves remote
//! federates over TCP.
//!
//! Each connection owns one federate session. Requests and replies are
//! length-prefixed JSON frames; callbacks queued for the federate are pushed
//! to the client as they arrive.
//!
//! ```text
//! client --[4-byte BE length][{"id":1,"request":{"op":"join",...}}]--> server
//! client <--[{"type":"response","id":1,"reply":{...}}]---------------- server
//! client <--[{"type":"callback","callback":{...}}]-------------------- server
//! ```

pub mod config;
pub mod server;

pub use config::{ConfigError, FederationSeed, ServerConfig};
pub use server::{RtiServer, ServerError};
