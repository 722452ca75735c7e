//! Request/response client.

use std::time::Duration;

use bytes::BytesMut;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpStream;
use tracing::{debug, warn};
use viewservice_types::{ServerId, View, ViewNumber};
use viewservice_wire::{Frame, Request, RequestId, RequestPayload, Response, ResponsePayload};

use crate::error::{ClientError, ClientResult};

/// Default bound on a single call, connection setup included.
pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_millis(500);

/// Client configuration.
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Bound on a single call, connection setup included.
    pub request_timeout: Duration,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            request_timeout: DEFAULT_REQUEST_TIMEOUT,
        }
    }
}

/// Client for a single view service.
///
/// The connection is opened on first use and discarded after any failure,
/// so the next call reconnects.
#[derive(Debug)]
pub struct Client {
    addr: String,
    config: ClientConfig,
    conn: Option<Connection>,
    next_id: RequestId,
}

impl Client {
    pub fn new(addr: impl Into<String>, config: ClientConfig) -> Self {
        Self {
            addr: addr.into(),
            config,
            conn: None,
            next_id: RequestId::new(1),
        }
    }

    pub fn addr(&self) -> &str {
        &self.addr
    }

    /// Heartbeat as `me`, which last saw view `viewnum`.
    pub async fn ping(&mut self, me: &ServerId, viewnum: ViewNumber) -> ClientResult<View> {
        let payload = RequestPayload::Ping(viewservice_wire::PingRequest {
            me: me.as_str().to_owned(),
            viewnum,
        });
        match self.call(payload).await? {
            ResponsePayload::Ping(reply) => Ok(reply.view),
            other => Err(unexpected("ping", &other)),
        }
    }

    /// Fetches the current view.
    pub async fn get(&mut self) -> ClientResult<View> {
        match self.call(RequestPayload::Get(viewservice_wire::GetRequest)).await? {
            ResponsePayload::Get(reply) => Ok(reply.view),
            other => Err(unexpected("get", &other)),
        }
    }

    /// The current primary, or `None` if there is none or the service
    /// cannot be reached.
    pub async fn primary(&mut self) -> Option<ServerId> {
        match self.get().await {
            Ok(view) => view.primary,
            Err(e) => {
                warn!(addr = %self.addr, error = %e, "view service unreachable");
                None
            }
        }
    }

    async fn call(&mut self, payload: RequestPayload) -> ClientResult<ResponsePayload> {
        let request = Request::new(self.next_id.take_next(), payload);
        let timeout = self.config.request_timeout;

        let response = tokio::time::timeout(timeout, self.round_trip(&request))
            .await
            .map_err(|_| ClientError::Timeout(timeout))??;

        if response.id != request.id {
            return Err(ClientError::UnexpectedResponse(format!(
                "response id {} for request {}",
                response.id.0, request.id.0
            )));
        }
        match response.payload {
            ResponsePayload::Error(e) => Err(ClientError::Server {
                code: e.code,
                message: e.message,
            }),
            payload => Ok(payload),
        }
    }

    /// Sends one request and reads its response. The connection is only
    /// put back once the exchange completes.
    async fn round_trip(&mut self, request: &Request) -> ClientResult<Response> {
        let mut conn = match self.conn.take() {
            Some(conn) => conn,
            None => {
                debug!(addr = %self.addr, "connecting");
                Connection::open(&self.addr).await?
            }
        };
        let response = conn.exchange(request).await?;
        self.conn = Some(conn);
        Ok(response)
    }
}

fn unexpected(call: &str, payload: &ResponsePayload) -> ClientError {
    ClientError::UnexpectedResponse(format!("{call} answered with {payload:?}"))
}

#[derive(Debug)]
struct Connection {
    stream: TcpStream,
    read_buf: BytesMut,
}

impl Connection {
    async fn open(addr: &str) -> ClientResult<Self> {
        let stream = TcpStream::connect(addr).await?;
        stream.set_nodelay(true)?;
        Ok(Self {
            stream,
            read_buf: BytesMut::with_capacity(1024),
        })
    }

    async fn exchange(&mut self, request: &Request) -> ClientResult<Response> {
        let bytes = request.to_frame()?.encode_to_bytes()?;
        self.stream.write_all(&bytes).await?;

        loop {
            if let Some(frame) = Frame::decode(&mut self.read_buf)? {
                return Ok(Response::from_frame(&frame)?);
            }
            if self.stream.read_buf(&mut self.read_buf).await? == 0 {
                return Err(ClientError::ConnectionClosed);
            }
        }
    }
}
