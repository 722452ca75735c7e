//! Server configuration.

use std::net::SocketAddr;

use viewservice::ServiceConfig;

/// Default cap on simultaneously open client connections.
pub const DEFAULT_MAX_CONNECTIONS: usize = 1024;

/// Configuration for a view service daemon.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Address to listen on. Port 0 picks a free port.
    pub bind_addr: SocketAddr,

    /// Heartbeat and failure-detection timing.
    pub service: ServiceConfig,

    /// Connections beyond this are closed on accept.
    pub max_connections: usize,
}

impl ServerConfig {
    pub fn new(bind_addr: SocketAddr) -> Self {
        Self {
            bind_addr,
            service: ServiceConfig::default(),
            max_connections: DEFAULT_MAX_CONNECTIONS,
        }
    }

    pub fn with_service(mut self, service: ServiceConfig) -> Self {
        self.service = service;
        self
    }

    pub fn with_max_connections(mut self, max_connections: usize) -> Self {
        self.max_connections = max_connections;
        self
    }
}
