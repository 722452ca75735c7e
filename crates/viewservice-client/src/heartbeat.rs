//! Periodic heartbeat driver for replica servers.

use std::time::Duration;

use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::{MissedTickBehavior, interval};
use tracing::debug;
use viewservice_types::{ServerId, View, ViewNumber};

use crate::client::Client;

/// Pings the view service on a fixed interval on behalf of one server.
///
/// Each ping reports the number of the last view received, which is how a
/// primary acknowledges its view and a backup signals that it has caught
/// up. A fresh heartbeat starts from view 0, exactly like a restarted
/// server. Dropping the handle stops the pings.
#[derive(Debug)]
pub struct Heartbeat {
    me: ServerId,
    view: watch::Receiver<View>,
    task: JoinHandle<()>,
}

impl Heartbeat {
    /// Starts pinging immediately, then every `period`.
    pub fn spawn(mut client: Client, me: ServerId, period: Duration) -> Self {
        let (tx, rx) = watch::channel(View::initial());
        let id = me.clone();

        let task = tokio::spawn(async move {
            let mut viewnum = ViewNumber::ZERO;
            let mut ticker = interval(period);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

            loop {
                ticker.tick().await;
                match client.ping(&id, viewnum).await {
                    Ok(view) => {
                        viewnum = view.viewnum;
                        tx.send_replace(view);
                    }
                    Err(e) => debug!(server = %id, error = %e, "heartbeat failed"),
                }
            }
        });

        Self { me, view: rx, task }
    }

    pub fn me(&self) -> &ServerId {
        &self.me
    }

    /// The last view received from the service.
    pub fn view(&self) -> View {
        self.view.borrow().clone()
    }

    /// A receiver that observes every view this heartbeat receives.
    pub fn subscribe(&self) -> watch::Receiver<View> {
        self.view.clone()
    }

    /// Stops pinging, as if the server had crashed.
    pub fn stop(self) {
        drop(self);
    }
}

impl Drop for Heartbeat {
    fn drop(&mut self) {
        self.task.abort();
    }
}
