//! # viewservice: primary/backup view assignment
//!
//! The view service tracks which replica server is primary, which is backup,
//! and which are idle, learning about servers only from their periodic
//! heartbeats.
//!
//! - [`ViewState`]: the pure state machine (heartbeats, detector ticks)
//! - [`ViewService`]: the mutex-guarded shell the transport calls into
//! - [`ServiceConfig`]: heartbeat interval and dead threshold
//!
//! # Safety property
//!
//! The view only advances on a detector tick, and only after the primary of
//! the current view has acknowledged it by pinging with its number. This
//! keeps at most one view live from the replication layer's perspective.
//!
//! ```
//! use viewservice::{ServiceConfig, ViewService};
//! use viewservice_types::{ServerId, ViewNumber};
//!
//! let service = ViewService::new(ServiceConfig::default()).unwrap();
//! let a = ServerId::parse("a").unwrap();
//!
//! let reply = service.ping(a.clone(), ViewNumber::ZERO);
//! assert!(reply.viewnum.is_zero());
//! assert_eq!(service.get().viewnum, ViewNumber::new(1));
//! assert_eq!(service.get().primary, Some(a));
//! ```

mod config;
mod error;
mod service;
mod state;


pub use config::{DEFAULT_DEAD_PINGS, DEFAULT_PING_INTERVAL, ServiceConfig};
pub use error::{Result, ViewServiceError};
pub use service::ViewService;
pub use state::{Liveness, TickOutcome, ViewState};
pub use viewservice_types::{Role, ServerId, View, ViewNumber};
