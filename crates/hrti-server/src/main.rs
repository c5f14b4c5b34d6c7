// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! HRTI Server
//!
//! Standalone RTI process for federations whose federates run in separate
//! processes or on separate hosts.
//!
//! # Usage
//!
//! ```bash
//! # Start server on default port (8989)
//! hrti-server
//!
//! # Custom port, federations created from a config file
//! hrti-server --port 9000 --config rti.json
//!
//! # Leave objects in place when a federate drops its connection
//! hrti-server --disconnect-action unconditionally-divest-attributes
//! ```

use clap::Parser;
use hrti::ResignAction;
use hrti_server::{RtiServer, ServerConfig};
use std::net::SocketAddr;
use std::path::PathBuf;
use tracing::info;
use tracing_subscriber::EnvFilter;

/// HRTI Server - HLA run-time infrastructure for remote federates
#[derive(Parser, Debug)]
#[command(name = "hrti-server")]
#[command(author, version, about, long_about = None)]
struct Args {
    /// TCP port to listen on
    #[arg(short, long, default_value = "8989")]
    port: u16,

    /// Bind address (0.0.0.0 for all interfaces)
    #[arg(short, long, default_value = "0.0.0.0")]
    bind: String,

    /// Configuration file (JSON format)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Maximum number of connected federates
    #[arg(long, default_value = "256")]
    max_connections: usize,

    /// Resign action applied when a joined federate disconnects
    #[arg(long, default_value = "cancel-then-delete-then-divest")]
    disconnect_action: ResignAction,

    /// Log level (trace, debug, info, warn, error); RUST_LOG takes precedence
    #[arg(long, default_value = "info")]
    log_level: String,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    let args = Args::parse();

    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&args.log_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_thread_ids(true)
        .try_init()?;

    let config = if let Some(config_path) = args.config {
        info!("Loading config from {:?}", config_path);
        ServerConfig::from_file(&config_path)?
    } else {
        ServerConfig {
            bind_address: args.bind.parse()?,
            port: args.port,
            max_connections: args.max_connections,
            disconnect_action: args.disconnect_action,
            ..Default::default()
        }
    };

    let addr = SocketAddr::new(config.bind_address, config.port);

    info!("+----------------------------------------------------+");
    info!(
        "|       HRTI Server v{}                           |",
        env!("CARGO_PKG_VERSION")
    );
    info!("+----------------------------------------------------+");
    info!("|  Bind:        {:36} |", addr);
    info!("|  Federations: {:36} |", config.federations.len());
    info!("|  Max feds:    {:36} |", config.max_connections);
    info!(
        "|  On drop:     {:36} |",
        format!("{:?}", config.disconnect_action)
    );
    info!("+----------------------------------------------------+");

    let server = RtiServer::new(config)?;

    let server_handle = server.clone();
    tokio::spawn(async move {
        tokio::signal::ctrl_c().await.ok();
        info!("Shutdown signal received, stopping server...");
        server_handle.shutdown();
    });

    server.run().await?;

    info!("RTI server stopped");
    Ok(())
}
