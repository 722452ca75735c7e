//! # viewservice-server: view service daemon
//!
//! This crate exposes a [`ViewService`](viewservice::ViewService) over TCP
//! using the protocol defined in `viewservice-wire`, and drives its failure
//! detector on a fixed period.
//!
//! ## Architecture
//!
//! ```text
//! ┌────────────────────────────────────────────────────────┐
//! │                  viewservice-server                     │
//! │  ┌────────────┐   ┌─────────────┐   ┌───────────────┐   │
//! │  │  Listener  │ → │ Connection  │ → │ RequestHandler │  │
//! │  │  (TCP)     │   │ (task each) │   │  ping / get    │  │
//! │  └────────────┘   └─────────────┘   └───────┬───────┘   │
//! │                                             ▼           │
//! │  ┌────────────┐                     ┌───────────────┐   │
//! │  │ Detector   │ ───── tick() ─────► │  ViewService  │   │
//! │  │ (interval) │                     │  (one mutex)  │   │
//! │  └────────────┘                     └───────────────┘   │
//! └────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//!
//! ```ignore
//! use viewservice_server::{Server, ServerConfig};
//!
//! let server = Server::bind(ServerConfig::new("127.0.0.1:7700".parse()?)).await?;
//! let shutdown = server.shutdown_handle();
//! tokio::spawn(server.run());
//! // ...
//! shutdown.shutdown();
//! ```

mod config;
mod connection;
mod error;
mod handler;
mod server;

pub use config::{DEFAULT_MAX_CONNECTIONS, ServerConfig};
pub use error::{ServerError, ServerResult};
pub use handler::RequestHandler;
pub use server::{Server, ShutdownHandle};
