//! Request handler that routes requests to the view service.

use std::sync::Arc;

use tracing::{debug, instrument};
use viewservice::ViewService;
use viewservice_types::ServerId;
use viewservice_wire::{
    ErrorCode, Frame, GetReply, PingReply, PingRequest, Request, RequestId, RequestPayload,
    Response, ResponsePayload, WireError,
};

/// Answers decoded requests from the shared [`ViewService`].
#[derive(Debug, Clone)]
pub struct RequestHandler {
    service: Arc<ViewService>,
}

impl RequestHandler {
    pub fn new(service: Arc<ViewService>) -> Self {
        Self { service }
    }

    /// Decodes and answers one frame. Undecodable requests get an error
    /// response rather than closing the connection.
    pub fn handle_frame(&self, frame: &Frame) -> Response {
        match Request::from_frame(frame) {
            Ok(request) => self.handle(request),
            Err(WireError::UnsupportedVersion(version)) => Response::error(
                RequestId::default(),
                ErrorCode::UnsupportedVersion,
                format!("unsupported protocol version {version}"),
            ),
            Err(e) => Response::error(
                RequestId::default(),
                ErrorCode::InvalidRequest,
                e.to_string(),
            ),
        }
    }

    #[instrument(skip_all, fields(request_id = request.id.0))]
    pub fn handle(&self, request: Request) -> Response {
        let payload = match request.payload {
            RequestPayload::Ping(ping) => ResponsePayload::Ping(self.ping(ping)),
            RequestPayload::Get(_) => ResponsePayload::Get(GetReply {
                view: self.service.get(),
            }),
        };
        Response::new(request.id, payload)
    }

    fn ping(&self, ping: PingRequest) -> PingReply {
        let view = match ServerId::parse(ping.me) {
            Some(from) => self.service.ping(from, ping.viewnum),
            // An empty identity cannot hold a role; answer like a query.
            None => {
                debug!("ping without identity");
                self.service.get()
            }
        };
        PingReply { view }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use viewservice::ServiceConfig;
    use viewservice_types::ViewNumber;

    fn handler() -> RequestHandler {
        RequestHandler::new(Arc::new(ViewService::new(ServiceConfig::default()).unwrap()))
    }

    fn view_of(response: Response) -> viewservice_types::View {
        match response.payload {
            ResponsePayload::Ping(reply) => reply.view,
            ResponsePayload::Get(reply) => reply.view,
            ResponsePayload::Error(e) => panic!("unexpected error: {e:?}"),
        }
    }

    #[test]
    fn echoes_request_id() {
        let response = handler().handle(Request::get(RequestId::new(42)));
        assert_eq!(response.id, RequestId::new(42));
    }

    #[test]
    fn ping_then_get() {
        let handler = handler();

        let reply = view_of(handler.handle(Request::ping(RequestId::new(1), "a", ViewNumber::ZERO)));
        assert!(reply.viewnum.is_zero());
        assert_eq!(reply.primary, ServerId::parse("a"));

        let current = view_of(handler.handle(Request::get(RequestId::new(2))));
        assert_eq!(current.viewnum, ViewNumber::new(1));
    }

    #[test]
    fn empty_identity_does_not_bootstrap() {
        let handler = handler();
        let reply = view_of(handler.handle(Request::ping(RequestId::new(1), "", ViewNumber::ZERO)));
        assert!(reply.viewnum.is_zero());
        assert!(reply.primary.is_none());
    }

    #[test]
    fn version_mismatch_is_reported() {
        let mut frame = Request::get(RequestId::new(1)).to_frame().unwrap();
        frame.version += 1;

        let response = handler().handle_frame(&frame);
        assert!(matches!(
            response.payload,
            ResponsePayload::Error(ref e) if e.code == ErrorCode::UnsupportedVersion
        ));
    }
}
