//! TCP listener, failure detector task and shutdown.

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use tokio::net::TcpListener;
use tokio::sync::{Semaphore, watch};
use tokio::task::JoinSet;
use tokio::time::{MissedTickBehavior, interval};
use tracing::{debug, error, info, warn};
use viewservice::ViewService;

use crate::config::ServerConfig;
use crate::connection::Connection;
use crate::error::{ServerError, ServerResult};
use crate::handler::RequestHandler;

/// Stops a running [`Server`]. Cloneable; any clone may trigger shutdown.
#[derive(Debug, Clone)]
pub struct ShutdownHandle {
    tx: Arc<watch::Sender<bool>>,
}

impl ShutdownHandle {
    /// Stops accepting connections, ends the detector task and closes open
    /// connections. Idempotent.
    pub fn shutdown(&self) {
        self.tx.send_replace(true);
    }

    pub fn is_shutdown(&self) -> bool {
        *self.tx.borrow()
    }
}

/// Resolves once shutdown has been signalled (or every handle is gone).
pub(crate) async fn wait_for_shutdown(rx: &mut watch::Receiver<bool>) {
    while !*rx.borrow_and_update() {
        if rx.changed().await.is_err() {
            return;
        }
    }
}

/// The view service daemon.
pub struct Server {
    listener: TcpListener,
    service: Arc<ViewService>,
    config: ServerConfig,
    shutdown: ShutdownHandle,
}

impl Server {
    /// Binds the listener and creates an empty view service.
    pub async fn bind(config: ServerConfig) -> ServerResult<Self> {
        let service = Arc::new(ViewService::new(config.service)?);
        let listener = TcpListener::bind(config.bind_addr)
            .await
            .map_err(|source| ServerError::BindFailed {
                addr: config.bind_addr,
                source,
            })?;
        let (tx, _rx) = watch::channel(false);

        Ok(Self {
            listener,
            service,
            config,
            shutdown: ShutdownHandle { tx: Arc::new(tx) },
        })
    }

    /// The bound address (useful when binding port 0).
    pub fn local_addr(&self) -> ServerResult<SocketAddr> {
        Ok(self.listener.local_addr()?)
    }

    pub fn service(&self) -> Arc<ViewService> {
        Arc::clone(&self.service)
    }

    pub fn shutdown_handle(&self) -> ShutdownHandle {
        self.shutdown.clone()
    }

    /// Serves until shutdown is requested or the listener fails.
    pub async fn run(self) -> ServerResult<()> {
        let Self {
            listener,
            service,
            config,
            shutdown,
        } = self;
        let addr = listener.local_addr()?;
        let timing = *service.config();
        info!(%addr, ping_interval = ?timing.ping_interval, dead_pings = timing.dead_pings, "view service listening");

        let detector = tokio::spawn(run_detector(
            Arc::clone(&service),
            timing.ping_interval,
            shutdown.tx.subscribe(),
        ));

        let handler = RequestHandler::new(service);
        let slots = Arc::new(Semaphore::new(config.max_connections));
        let mut connections = JoinSet::new();
        let mut shutdown_rx = shutdown.tx.subscribe();

        let result = loop {
            tokio::select! {
                () = wait_for_shutdown(&mut shutdown_rx) => break Ok(()),
                accepted = listener.accept() => match accepted {
                    Ok((stream, peer)) => {
                        let Ok(permit) = Arc::clone(&slots).try_acquire_owned() else {
                            warn!(%peer, max = config.max_connections, "connection limit reached");
                            continue;
                        };
                        let connection = Connection::new(stream, peer, permit);
                        let handler = handler.clone();
                        let rx = shutdown.tx.subscribe();
                        connections.spawn(async move {
                            if let Err(e) = connection.serve(handler, rx).await {
                                debug!(%peer, error = %e, "connection error");
                            }
                        });
                    }
                    Err(e) => {
                        error!(error = %e, "accept failed, shutting down");
                        break Err(ServerError::AcceptFailed(e));
                    }
                },
                Some(_) = connections.join_next(), if !connections.is_empty() => {}
            }
        };

        drop(listener);
        shutdown.shutdown();
        if let Err(e) = detector.await {
            error!(error = %e, "detector task failed");
        }
        while connections.join_next().await.is_some() {}
        info!(%addr, "view service stopped");

        result
    }
}

/// Ticks the view service every `period` until shutdown.
async fn run_detector(
    service: Arc<ViewService>,
    period: Duration,
    mut shutdown: watch::Receiver<bool>,
) {
    let mut ticker = interval(period);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

    loop {
        tokio::select! {
            _ = ticker.tick() => {
                service.tick();
            }
            () = wait_for_shutdown(&mut shutdown) => break,
        }
    }
    debug!("detector stopped");
}
