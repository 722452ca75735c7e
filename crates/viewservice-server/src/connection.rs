//! Per-connection request loop.

use std::net::SocketAddr;

use bytes::BytesMut;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpStream;
use tokio::sync::{OwnedSemaphorePermit, watch};
use tracing::debug;
use viewservice_wire::Frame;

use crate::error::ServerResult;
use crate::handler::RequestHandler;
use crate::server::wait_for_shutdown;

const BUFFER_SIZE: usize = 4 * 1024;

/// A client connection. Holds one slot of the connection limit while open.
pub(crate) struct Connection {
    stream: TcpStream,
    peer: SocketAddr,
    read_buf: BytesMut,
    write_buf: BytesMut,
    _permit: OwnedSemaphorePermit,
}

impl Connection {
    pub(crate) fn new(stream: TcpStream, peer: SocketAddr, permit: OwnedSemaphorePermit) -> Self {
        Self {
            stream,
            peer,
            read_buf: BytesMut::with_capacity(BUFFER_SIZE),
            write_buf: BytesMut::with_capacity(BUFFER_SIZE),
            _permit: permit,
        }
    }

    /// Answers requests in arrival order until the peer disconnects, a frame
    /// is malformed, or the server shuts down.
    pub(crate) async fn serve(
        mut self,
        handler: RequestHandler,
        mut shutdown: watch::Receiver<bool>,
    ) -> ServerResult<()> {
        debug!(peer = %self.peer, "connection opened");

        loop {
            while let Some(frame) = Frame::decode(&mut self.read_buf)? {
                let response = handler.handle_frame(&frame);
                response.to_frame()?.encode(&mut self.write_buf)?;
            }
            if !self.write_buf.is_empty() {
                self.stream.write_all(&self.write_buf).await?;
                self.write_buf.clear();
            }

            tokio::select! {
                read = self.stream.read_buf(&mut self.read_buf) => {
                    if read? == 0 {
                        debug!(peer = %self.peer, "connection closed by peer");
                        return Ok(());
                    }
                }
                () = wait_for_shutdown(&mut shutdown) => {
                    debug!(peer = %self.peer, "connection closed by shutdown");
                    return Ok(());
                }
            }
        }
    }
}
