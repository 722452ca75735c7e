//! CLI command implementations.

pub mod config;
pub mod heartbeat;
pub mod query;
pub mod start;
pub mod version;

use anyhow::{Context, Result};
use viewservice_client::{Client, ClientConfig};
use viewservice_config::ViewServiceConfig;

/// Builds the multi-threaded runtime the async commands run on.
pub(crate) fn runtime() -> Result<tokio::runtime::Runtime> {
    tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
        .context("Failed to start async runtime")
}

/// A client for `server`, or for the configured bind address when omitted.
pub(crate) fn client(config: &ViewServiceConfig, server: Option<String>) -> Client {
    let addr = server.unwrap_or_else(|| config.server.bind_address.clone());
    Client::new(
        addr,
        ClientConfig {
            request_timeout: config.request_timeout(),
        },
    )
}
