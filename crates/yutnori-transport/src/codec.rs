//! Frame I/O over an async byte stream: block for exactly a header,
//! then exactly its payload, retrying transient timeout-class errors
//! and surfacing everything else.
//!
//! These are free functions over any `AsyncRead`/`AsyncWrite` half
//! rather than methods on [`crate::Connection`] so a single writer
//! half can be held independently of its reader half — that's the
//! split the dedicated reader/writer tasks need.

use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};

use yutnori_protocol::frame::{self, FrameHeader, HEADER_LEN};
use yutnori_protocol::{ClientRequest, Kind, ServerMessage};

use crate::TransportError;

fn is_retryable(err: &std::io::Error) -> bool {
    matches!(
        err.kind(),
        std::io::ErrorKind::TimedOut
            | std::io::ErrorKind::WouldBlock
            | std::io::ErrorKind::Interrupted
    )
}

async fn read_exact_retrying<R: AsyncRead + Unpin>(
    reader: &mut R,
    buf: &mut [u8],
) -> Result<(), TransportError> {
    let mut filled = 0;
    while filled < buf.len() {
        match reader.read(&mut buf[filled..]).await {
            Ok(0) => return Err(TransportError::ConnectionClosed),
            Ok(n) => filled += n,
            Err(e) if is_retryable(&e) => continue,
            Err(e) => return Err(TransportError::Io(e)),
        }
    }
    Ok(())
}

async fn write_all_retrying<W: AsyncWrite + Unpin>(
    writer: &mut W,
    buf: &[u8],
) -> Result<(), TransportError> {
    let mut written = 0;
    while written < buf.len() {
        match writer.write(&buf[written..]).await {
            Ok(0) => return Err(TransportError::ConnectionClosed),
            Ok(n) => written += n,
            Err(e) if is_retryable(&e) => continue,
            Err(e) => return Err(TransportError::Io(e)),
        }
    }
    Ok(())
}

/// Reads one complete frame: the 3-byte header, then its payload.
pub async fn read_frame<R: AsyncRead + Unpin>(
    reader: &mut R,
) -> Result<(Kind, Vec<u8>), TransportError> {
    let mut header_bytes = [0u8; HEADER_LEN];
    read_exact_retrying(reader, &mut header_bytes).await?;
    let FrameHeader { kind, payload_len } = frame::parse_header(header_bytes)?;

    let mut payload = vec![0u8; payload_len as usize];
    if payload_len > 0 {
        read_exact_retrying(reader, &mut payload).await?;
    }
    Ok((kind, payload))
}

/// Reads one frame and decodes it as a client request.
pub async fn read_request<R: AsyncRead + Unpin>(
    reader: &mut R,
) -> Result<ClientRequest, TransportError> {
    let (kind, payload) = read_frame(reader).await?;
    Ok(frame::decode_request(kind, &payload)?)
}

/// Encodes and writes a client request as a single frame. Symmetric
/// to [`write_message`]; mainly useful for test clients driving a
/// real socket against the server.
pub async fn write_request<W: AsyncWrite + Unpin>(
    writer: &mut W,
    request: &ClientRequest,
) -> Result<(), TransportError> {
    let frame = frame::encode_request(request)?;
    write_all_retrying(writer, &frame).await
}

/// Encodes and writes a server message as a single frame. The write
/// loop only ever touches this stream's writer half, so this is
/// atomic with respect to any other writer of the same connection,
/// enforced by construction rather than a lock — see `yutnori-server`.
pub async fn write_message<W: AsyncWrite + Unpin>(
    writer: &mut W,
    message: &ServerMessage,
) -> Result<(), TransportError> {
    let frame = frame::encode_message(message)?;
    write_all_retrying(writer, &frame).await
}

/// Writes an already-encoded frame verbatim. Used by `yutnori-server`'s
/// writer task to flush frames a room broadcast pre-serialized once for
/// every recipient, instead of re-encoding the same message per member.
pub async fn write_frame_bytes<W: AsyncWrite + Unpin>(
    writer: &mut W,
    frame: &[u8],
) -> Result<(), TransportError> {
    write_all_retrying(writer, frame).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;
    use yutnori_protocol::ClientId;

    #[tokio::test]
    async fn test_read_frame_reads_exactly_header_then_payload() {
        let frame = frame::encode_request(&ClientRequest::CreateRoom {
            name: "table".into(),
        })
        .unwrap();
        let mut cursor = Cursor::new(frame);
        let (kind, payload) = read_frame(&mut cursor).await.unwrap();
        assert_eq!(kind, Kind::CreateRoom);
        assert!(!payload.is_empty());
    }

    #[tokio::test]
    async fn test_read_request_round_trips_a_unit_request() {
        let frame = frame::encode_request(&ClientRequest::BeginRoll).unwrap();
        let mut cursor = Cursor::new(frame);
        let req = read_request(&mut cursor).await.unwrap();
        assert_eq!(req, ClientRequest::BeginRoll);
    }

    #[tokio::test]
    async fn test_read_frame_on_empty_stream_reports_closed() {
        let mut cursor = Cursor::new(Vec::<u8>::new());
        let err = read_frame(&mut cursor).await.unwrap_err();
        assert!(matches!(err, TransportError::ConnectionClosed));
    }

    #[tokio::test]
    async fn test_write_message_then_read_it_back() {
        let msg = ServerMessage::Connect { client_id: ClientId("c1".into()) };
        let mut buf = Vec::new();
        write_message(&mut buf, &msg).await.unwrap();

        let mut cursor = Cursor::new(buf);
        let (kind, payload) = read_frame(&mut cursor).await.unwrap();
        let decoded = frame::decode_message(kind, &payload).unwrap();
        assert_eq!(decoded, msg);
    }
}
