//! Configuration management commands.

use anyhow::{Result, bail};
use viewservice_config::ViewServiceConfig;

/// Show the effective configuration.
pub fn show(config: &ViewServiceConfig, format: &str) -> Result<()> {
    match format {
        "toml" => println!("{}", config.to_toml_string()?),
        "text" => {
            println!("View Service Configuration");
            println!("==========================\n");

            println!("Server:");
            println!("  Bind address: {}", config.server.bind_address);
            println!("  Max connections: {}", config.server.max_connections);
            println!();

            println!("Detector:");
            println!("  Ping interval: {} ms", config.detector.ping_interval_ms);
            println!("  Dead pings: {}", config.detector.dead_pings);
            println!();

            println!("Client:");
            println!("  Request timeout: {} ms", config.client.request_timeout_ms);
            println!();

            println!("Log:");
            println!("  Filter: {}", config.log.filter);
        }
        other => bail!("Unknown format '{other}' (expected text or toml)"),
    }
    Ok(())
}
