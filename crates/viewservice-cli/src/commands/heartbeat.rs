//! Heartbeat command - pings like a replica server until interrupted.

use std::time::Duration;

use anyhow::{Context, Result};
use tracing::info;
use viewservice_client::Heartbeat;
use viewservice_config::ViewServiceConfig;
use viewservice_types::ServerId;

pub fn run(config: &ViewServiceConfig, server: Option<String>, id: &str) -> Result<()> {
    let me = ServerId::parse(id).context("Server identity must not be empty")?;
    let period = Duration::from_millis(config.detector.ping_interval_ms);
    let client = super::client(config, server);

    println!("Pinging {} as {me} every {period:?}. Press Ctrl+C to stop.", client.addr());

    super::runtime()?.block_on(async move {
        let heartbeat = Heartbeat::spawn(client, me.clone(), period);
        let mut views = heartbeat.subscribe();

        loop {
            tokio::select! {
                changed = views.changed() => {
                    if changed.is_err() {
                        break;
                    }
                    let view = views.borrow_and_update().clone();
                    println!("{view} ({})", view.role_of(&me));
                }
                _ = tokio::signal::ctrl_c() => {
                    info!(server = %me, "stopping heartbeat");
                    break;
                }
            }
        }

        heartbeat.stop();
        Ok(())
    })
}
