//! # viewservice-wire: Binary wire protocol for the view service
//!
//! Every message travels in a [`Frame`]: a fixed header followed by a
//! postcard-encoded body.
//!
//! ```text
//! ┌──────────┬─────────┬──────────┬─────────────────────┐
//! │ magic    │ version │ length   │ payload (postcard)  │
//! │ "VSVC"   │ u16 BE  │ u32 BE   │ `length` bytes      │
//! └──────────┴─────────┴──────────┴─────────────────────┘
//! ```
//!
//! The RPC surface is two calls:
//! - `Ping(me, viewnum) -> View`: a replica heartbeat
//! - `Get() -> View`: the current view

mod error;
mod frame;
mod message;

pub use error::{WireError, WireResult};
pub use frame::{FRAME_HEADER_SIZE, FRAME_MAGIC, Frame, MAX_FRAME_SIZE, PROTOCOL_VERSION};
pub use message::{
    ErrorCode, ErrorResponse, GetReply, GetRequest, PingReply, PingRequest, Request, RequestId,
    RequestPayload, Response, ResponsePayload,
};
