//! Where bytes come from: a raw-TCP `Transport`/`Connection` pair and
//! the frame-retry I/O built on top of them.
//!
//! `yutnori-protocol` owns the pure frame <-> message mapping;
//! everything here is the socket plumbing around it.

mod codec;
mod error;
mod tcp;

pub use codec::{read_frame, read_request, write_frame_bytes, write_message, write_request};
pub use error::TransportError;
pub use tcp::{Connection, TcpConnection, TcpTransport, Transport};
