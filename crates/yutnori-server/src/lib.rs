//! The accept loop and per-connection endpoint that tie the rest of
//! the workspace into a running server: bind a TCP listener, hand each
//! accepted connection to a freshly spawned [`endpoint::spawn_endpoint`],
//! routing through one shared [`hub::HubHandle`].

mod endpoint;
mod error;
mod hub;

pub use error::ServerError;
pub use hub::{spawn_hub, HubHandle};

use yutnori_transport::{Connection, TcpTransport, Transport};

/// Binds a TCP listener on `port` and runs the accept loop forever,
/// spawning one endpoint per accepted connection. Returns only if the
/// listener itself fails to bind.
pub async fn run(port: u16) -> Result<(), ServerError> {
    let mut transport = TcpTransport::bind(port).await?;
    tracing::info!(%port, "listening");

    let hub = spawn_hub();

    loop {
        match transport.accept().await {
            Ok(conn) => {
                tracing::debug!(peer = ?conn.peer_addr(), "accepted connection");
                endpoint::spawn_endpoint(conn, hub.clone());
            }
            Err(error) => {
                tracing::error!(%error, "accept failed");
            }
        }
    }
}
