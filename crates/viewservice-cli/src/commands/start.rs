//! Start command - runs the view service.

use std::net::SocketAddr;

use anyhow::{Context, Result};
use tracing::info;
use viewservice_config::ViewServiceConfig;
use viewservice_server::{Server, ServerConfig};

/// Command-line values that take precedence over the loaded configuration.
#[derive(Debug, Default)]
pub struct Overrides {
    pub address: Option<String>,
    pub ping_interval_ms: Option<u64>,
    pub dead_pings: Option<u32>,
    pub max_connections: Option<usize>,
}

impl Overrides {
    fn apply(self, config: &mut ViewServiceConfig) {
        if let Some(address) = self.address {
            config.server.bind_address = address;
        }
        if let Some(ms) = self.ping_interval_ms {
            config.detector.ping_interval_ms = ms;
        }
        if let Some(n) = self.dead_pings {
            config.detector.dead_pings = n;
        }
        if let Some(n) = self.max_connections {
            config.server.max_connections = n;
        }
    }
}

pub fn run(mut config: ViewServiceConfig, overrides: Overrides) -> Result<()> {
    overrides.apply(&mut config);

    let bind_addr: SocketAddr = config
        .server
        .bind_address
        .parse()
        .with_context(|| format!("Invalid bind address '{}'", config.server.bind_address))?;
    let service = config
        .service_config()
        .context("Invalid detector configuration")?;

    let server_config = ServerConfig::new(bind_addr)
        .with_service(service)
        .with_max_connections(config.server.max_connections);

    super::runtime()?.block_on(async move {
        let server = Server::bind(server_config)
            .await
            .context("Failed to start view service")?;
        let local_addr = server.local_addr()?;

        println!();
        println!("View service");
        println!();
        println!("  Bind address:  {local_addr}");
        println!("  Ping interval: {:?}", service.ping_interval);
        println!("  Dead after:    {:?}", service.dead_timeout());
        println!();
        println!("Press Ctrl+C to stop.");
        println!();

        let shutdown = server.shutdown_handle();
        tokio::spawn(async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                info!("received Ctrl+C, shutting down");
                shutdown.shutdown();
            }
        });

        server.run().await.context("Server error during operation")?;

        println!();
        println!("View service stopped.");
        Ok(())
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn overrides_replace_only_given_values() {
        let mut config = ViewServiceConfig::default();
        Overrides {
            address: Some("0.0.0.0:9000".to_string()),
            dead_pings: Some(7),
            ..Overrides::default()
        }
        .apply(&mut config);

        assert_eq!(config.server.bind_address, "0.0.0.0:9000");
        assert_eq!(config.detector.dead_pings, 7);
        assert_eq!(config.detector.ping_interval_ms, 100);
        assert_eq!(config.server.max_connections, 1024);
    }
}
