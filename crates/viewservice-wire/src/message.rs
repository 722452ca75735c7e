//! Request and response envelopes.

use serde::{Deserialize, Serialize};
use viewservice_types::{View, ViewNumber};

use crate::error::{WireError, WireResult};
use crate::frame::{Frame, PROTOCOL_VERSION};

/// Client-chosen identifier echoed back in the matching response.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct RequestId(pub u64);

impl RequestId {
    pub fn new(id: u64) -> Self {
        Self(id)
    }

    /// Returns this id and advances `self` to the next one.
    pub fn take_next(&mut self) -> Self {
        let id = *self;
        self.0 = self.0.wrapping_add(1);
        id
    }
}

// ============================================================================
// Requests
// ============================================================================

/// Heartbeat from a replica server.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PingRequest {
    /// The caller's identity.
    pub me: String,
    /// The last view number the caller has seen.
    pub viewnum: ViewNumber,
}

/// Query for the current view.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct GetRequest;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum RequestPayload {
    Ping(PingRequest),
    Get(GetRequest),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Request {
    pub id: RequestId,
    pub payload: RequestPayload,
}

impl Request {
    pub fn new(id: RequestId, payload: RequestPayload) -> Self {
        Self { id, payload }
    }

    pub fn ping(id: RequestId, me: impl Into<String>, viewnum: ViewNumber) -> Self {
        Self::new(
            id,
            RequestPayload::Ping(PingRequest {
                me: me.into(),
                viewnum,
            }),
        )
    }

    pub fn get(id: RequestId) -> Self {
        Self::new(id, RequestPayload::Get(GetRequest))
    }

    pub fn to_frame(&self) -> WireResult<Frame> {
        Ok(Frame::new(postcard::to_allocvec(self)?))
    }

    pub fn from_frame(frame: &Frame) -> WireResult<Self> {
        check_version(frame)?;
        Ok(postcard::from_bytes(&frame.payload)?)
    }
}

// ============================================================================
// Responses
// ============================================================================

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PingReply {
    pub view: View,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GetReply {
    pub view: View,
}

/// Protocol-level failure codes. The view service operations themselves
/// never fail.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ErrorCode {
    UnsupportedVersion,
    InvalidRequest,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub code: ErrorCode,
    pub message: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum ResponsePayload {
    Ping(PingReply),
    Get(GetReply),
    Error(ErrorResponse),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Response {
    pub id: RequestId,
    pub payload: ResponsePayload,
}

impl Response {
    pub fn new(id: RequestId, payload: ResponsePayload) -> Self {
        Self { id, payload }
    }

    pub fn error(id: RequestId, code: ErrorCode, message: impl Into<String>) -> Self {
        Self::new(
            id,
            ResponsePayload::Error(ErrorResponse {
                code,
                message: message.into(),
            }),
        )
    }

    pub fn to_frame(&self) -> WireResult<Frame> {
        Ok(Frame::new(postcard::to_allocvec(self)?))
    }

    pub fn from_frame(frame: &Frame) -> WireResult<Self> {
        check_version(frame)?;
        Ok(postcard::from_bytes(&frame.payload)?)
    }
}

fn check_version(frame: &Frame) -> WireResult<()> {
    if frame.version == PROTOCOL_VERSION {
        Ok(())
    } else {
        Err(WireError::UnsupportedVersion(frame.version))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bytes::BytesMut;
    use proptest::prelude::*;
    use viewservice_types::ServerId;

    #[test]
    fn request_ids_advance() {
        let mut next = RequestId::new(7);
        assert_eq!(next.take_next(), RequestId(7));
        assert_eq!(next.take_next(), RequestId(8));
        assert_eq!(next, RequestId(9));
    }

    #[test]
    fn ping_request_through_frame() {
        let request = Request::ping(RequestId::new(1), "10.0.0.1:7000", ViewNumber::new(4));

        let mut buf = BytesMut::from(&request.to_frame().unwrap().encode_to_bytes().unwrap()[..]);
        let frame = Frame::decode(&mut buf).unwrap().unwrap();

        assert_eq!(Request::from_frame(&frame).unwrap(), request);
    }

    #[test]
    fn view_with_empty_slots_survives_encoding() {
        let view = View::new(ViewNumber::new(3), ServerId::parse("b"), None);
        let response = Response::new(
            RequestId::new(2),
            ResponsePayload::Get(GetReply { view: view.clone() }),
        );

        let decoded = Response::from_frame(&response.to_frame().unwrap()).unwrap();
        match decoded.payload {
            ResponsePayload::Get(reply) => assert_eq!(reply.view, view),
            other => panic!("unexpected payload: {other:?}"),
        }
    }

    #[test]
    fn other_versions_are_rejected() {
        let mut frame = Request::get(RequestId::new(1)).to_frame().unwrap();
        frame.version = PROTOCOL_VERSION + 1;
        assert!(matches!(
            Request::from_frame(&frame),
            Err(WireError::UnsupportedVersion(v)) if v == PROTOCOL_VERSION + 1
        ));
    }

    #[test]
    fn garbage_payload_is_a_serialization_error() {
        let frame = Frame::new(vec![0xff; 3]);
        assert!(matches!(
            Request::from_frame(&frame),
            Err(WireError::Serialization(_))
        ));
    }

    proptest! {
        #[test]
        fn arbitrary_bytes_never_panic_the_decoder(bytes in prop::collection::vec(any::<u8>(), 0..256)) {
            let mut buf = BytesMut::from(&bytes[..]);
            if let Ok(Some(frame)) = Frame::decode(&mut buf) {
                let _ = Request::from_frame(&frame);
                let _ = Response::from_frame(&frame);
            }
        }
    }
}
