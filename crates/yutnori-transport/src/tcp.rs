//! The raw-TCP `Transport`/`Connection` implementation: TCP, no TLS,
//! one connection per client.

use std::net::SocketAddr;

use tokio::net::tcp::{OwnedReadHalf, OwnedWriteHalf};
use tokio::net::{TcpListener, TcpStream};

use crate::TransportError;

/// Accepts new incoming connections. The only implementor today is
/// [`TcpTransport`]; the trait exists so `yutnori-server`'s accept
/// loop names a shape rather than a concrete socket type, leaving room
/// for other backends later.
#[allow(async_fn_in_trait)]
pub trait Transport: Send + 'static {
    type Connection: Connection;

    async fn accept(&mut self) -> Result<Self::Connection, TransportError>;
}

/// A single accepted connection, split into an independent reader
/// half and writer half — the reader and writer tasks each own one.
pub trait Connection: Send + 'static {
    type Reader: tokio::io::AsyncRead + Unpin + Send + 'static;
    type Writer: tokio::io::AsyncWrite + Unpin + Send + 'static;

    fn split(self) -> (Self::Reader, Self::Writer);
    fn peer_addr(&self) -> Option<SocketAddr>;
}

/// Listens for and accepts TCP connections.
pub struct TcpTransport {
    listener: TcpListener,
}

impl TcpTransport {
    pub async fn bind(port: u16) -> Result<Self, TransportError> {
        let listener = TcpListener::bind(("0.0.0.0", port)).await?;
        tracing::info!(%port, "tcp transport listening");
        Ok(Self { listener })
    }

    pub fn local_addr(&self) -> Result<SocketAddr, TransportError> {
        Ok(self.listener.local_addr()?)
    }
}

impl Transport for TcpTransport {
    type Connection = TcpConnection;

    async fn accept(&mut self) -> Result<Self::Connection, TransportError> {
        let (stream, addr) = self.listener.accept().await?;
        stream.set_nodelay(true).ok();
        tracing::debug!(%addr, "accepted tcp connection");
        Ok(TcpConnection { stream, addr })
    }
}

/// One accepted TCP connection, not yet split.
pub struct TcpConnection {
    stream: TcpStream,
    addr: SocketAddr,
}

impl Connection for TcpConnection {
    type Reader = OwnedReadHalf;
    type Writer = OwnedWriteHalf;

    fn split(self) -> (Self::Reader, Self::Writer) {
        self.stream.into_split()
    }

    fn peer_addr(&self) -> Option<SocketAddr> {
        Some(self.addr)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::codec::{read_request, write_message, write_request};
    use yutnori_protocol::{ClientId, ClientRequest, ServerMessage};

    #[tokio::test]
    async fn test_tcp_transport_accepts_and_frames_round_trip() {
        let mut transport = TcpTransport::bind(0).await.unwrap();
        let addr = transport.local_addr().unwrap();

        let client_task = tokio::spawn(async move {
            let mut client = TcpStream::connect(addr).await.unwrap();
            write_request(&mut client, &ClientRequest::BeginRoll).await.unwrap();
        });

        let conn = transport.accept().await.unwrap();
        assert!(conn.peer_addr().is_some());
        let (mut reader, _writer) = conn.split();
        let req = read_request(&mut reader).await.unwrap();
        assert_eq!(req, ClientRequest::BeginRoll);

        client_task.await.unwrap();
    }

    #[tokio::test]
    async fn test_server_message_flows_over_a_real_socket() {
        let mut transport = TcpTransport::bind(0).await.unwrap();
        let addr = transport.local_addr().unwrap();

        let server_task = tokio::spawn(async move {
            let conn = transport.accept().await.unwrap();
            let (_reader, mut writer) = conn.split();
            write_message(
                &mut writer,
                &ServerMessage::Connect { client_id: ClientId("abc".into()) },
            )
            .await
            .unwrap();
        });

        let mut client = TcpStream::connect(addr).await.unwrap();
        let (kind, payload) = crate::codec::read_frame(&mut client).await.unwrap();
        let msg = yutnori_protocol::frame::decode_message(kind, &payload).unwrap();
        assert_eq!(msg, ServerMessage::Connect { client_id: ClientId("abc".into()) });

        server_task.await.unwrap();
    }
}
