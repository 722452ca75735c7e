//! One-shot `get` and `ping` commands.

use anyhow::{Context, Result};
use viewservice_config::ViewServiceConfig;
use viewservice_types::{ServerId, ViewNumber};

pub fn get(config: &ViewServiceConfig, server: Option<String>) -> Result<()> {
    let mut client = super::client(config, server);
    let view = super::runtime()?
        .block_on(client.get())
        .with_context(|| format!("Failed to query view service at {}", client.addr()))?;
    println!("{view}");
    Ok(())
}

pub fn ping(
    config: &ViewServiceConfig,
    server: Option<String>,
    id: &str,
    viewnum: u64,
) -> Result<()> {
    let me = ServerId::parse(id).context("Server identity must not be empty")?;
    let mut client = super::client(config, server);
    let view = super::runtime()?
        .block_on(client.ping(&me, ViewNumber::new(viewnum)))
        .with_context(|| format!("Failed to ping view service at {}", client.addr()))?;
    println!("{view}");
    println!("  role of {me}: {}", view.role_of(&me));
    Ok(())
}
