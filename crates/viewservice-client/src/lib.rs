//! # viewservice-client: client for the view service
//!
//! [`Client`] issues `Ping` and `Get` calls; [`Heartbeat`] runs the periodic
//! ping loop a replica server needs to hold (and acknowledge) its role.
//!
//! ## Usage
//!
//! ```ignore
//! use viewservice_client::{Client, ClientConfig, Heartbeat};
//! use viewservice_types::ServerId;
//!
//! let mut client = Client::new("127.0.0.1:7700", ClientConfig::default());
//! let view = client.get().await?;
//! println!("{view}");
//!
//! // As a replica server:
//! let me = ServerId::parse("127.0.0.1:7801").unwrap();
//! let heartbeat = Heartbeat::spawn(
//!     Client::new("127.0.0.1:7700", ClientConfig::default()),
//!     me,
//!     std::time::Duration::from_millis(100),
//! );
//! ```

mod client;
mod error;
mod heartbeat;

pub use client::{Client, ClientConfig, DEFAULT_REQUEST_TIMEOUT};
pub use error::{ClientError, ClientResult};
pub use heartbeat::Heartbeat;
