//! The client endpoint: a dedicated reader task and a dedicated writer
//! task per accepted connection.
//!
//! There is no client-initiated handshake here — the server pushes
//! `Connect` unprompted — and the writer must run independently of the
//! reader so a room broadcast can reach a member while that member's
//! own reader is still blocked on a socket read.
//!
//! The writer is the sole mutator of `current_room`: it is the only
//! task that ever receives [`RoomEvent::Joined`]/[`RoomEvent::Left`]
//! from a room, and it publishes the current value through a `watch`
//! channel the reader only ever reads from. The reader keeps its own
//! clone of the outbound sender so it can answer "no current room"
//! negatives without round-tripping through the hub.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::{mpsc, watch, Notify};

use yutnori_protocol::{frame, ClientId, ClientRequest, ServerMessage};
use yutnori_room::{OutboundSender, RoomEvent, RoomHandle};
use yutnori_transport::{Connection, TransportError};

use crate::hub::HubHandle;

/// How many outbound frames a connection's queue may back up before it
/// is considered stuck and torn down. The queue itself is unbounded (a
/// room broadcast must never block on one slow member), so this bound
/// is enforced by the writer inspecting its own backlog rather than by
/// channel backpressure.
const MAX_QUEUE_BACKLOG: usize = 128;

const KEEPALIVE_INTERVAL: Duration = Duration::from_secs(60);

/// Accepts one already-established connection, assigns it a fresh
/// [`ClientId`], and spawns its reader/writer task pair plus a small
/// supervisor that tears down room membership and hub bookkeeping once
/// both exit. Returns immediately — it does not wait for the
/// connection to close.
pub fn spawn_endpoint<C: Connection>(conn: C, hub: HubHandle) {
    let client_id = ClientId::generate();
    let (reader, writer) = conn.split();
    let (room_tx, room_rx) = watch::channel::<Option<RoomHandle>>(None);
    let (out_tx, out_rx): (OutboundSender, mpsc::UnboundedReceiver<RoomEvent>) =
        mpsc::unbounded_channel();
    let disconnect = Arc::new(Notify::new());

    let supervisor_room_rx = room_rx.clone();
    let supervisor_hub = hub.clone();
    let supervisor_client_id = client_id.clone();

    let reader_task = tokio::spawn(reader_loop(
        client_id.clone(),
        reader,
        out_tx.clone(),
        hub.clone(),
        room_rx,
        Arc::clone(&disconnect),
    ));
    let writer_task = tokio::spawn(writer_loop(writer, out_rx, room_tx, Arc::clone(&disconnect)));

    tokio::spawn(async move {
        hub.register(client_id, out_tx).await;
        let _ = reader_task.await;
        let _ = writer_task.await;

        if let Some(room) = supervisor_room_rx.borrow().clone() {
            let _ = room.exit(supervisor_client_id.clone()).await;
        }
        supervisor_hub.unregister(supervisor_client_id).await;
    });
}

async fn reader_loop<R>(
    client_id: ClientId,
    mut reader: R,
    local: OutboundSender,
    hub: HubHandle,
    room_rx: watch::Receiver<Option<RoomHandle>>,
    disconnect: Arc<Notify>,
) where
    R: tokio::io::AsyncRead + Unpin,
{
    loop {
        tokio::select! {
            biased;
            _ = disconnect.notified() => break,
            result = yutnori_transport::read_request(&mut reader) => {
                match result {
                    Ok(request) => handle_request(&client_id, request, &local, &hub, &room_rx).await,
                    Err(TransportError::ConnectionClosed) => {
                        tracing::debug!(%client_id, "connection closed by peer");
                        break;
                    }
                    Err(error) => {
                        tracing::debug!(%client_id, %error, "connection read failed");
                        break;
                    }
                }
            }
        }
    }
    disconnect.notify_waiters();
}

/// Sends a response straight onto this connection's own outbound
/// queue, bypassing both the hub and any room.
fn reply_locally(local: &OutboundSender, message: &ServerMessage) {
    match frame::encode_message(message) {
        Ok(bytes) => {
            let _ = local.send(RoomEvent::Frame(Arc::from(bytes.into_boxed_slice())));
        }
        Err(error) => tracing::error!(%error, ?message, "failed to encode a local reply"),
    }
}

async fn handle_request(
    client_id: &ClientId,
    request: ClientRequest,
    local: &OutboundSender,
    hub: &HubHandle,
    room_rx: &watch::Receiver<Option<RoomHandle>>,
) {
    let current_room = room_rx.borrow().clone();

    match request {
        ClientRequest::CreateRoom { name } => hub.create_room(client_id.clone(), name).await,
        ClientRequest::EnterRoom { room_id, name } => {
            hub.enter_room(client_id.clone(), room_id, name).await
        }
        ClientRequest::ExitRoom => match current_room {
            Some(room) => {
                let _ = room.exit(client_id.clone()).await;
            }
            None => reply_locally(local, &ServerMessage::ExitRoom { exit: false }),
        },
        ClientRequest::SetPieceCount { piece_count } => match current_room {
            Some(room) => {
                let _ = room.set_piece_count(client_id.clone(), piece_count).await;
            }
            None => reply_locally(
                local,
                &ServerMessage::SetPieceCount { should_set: false, piece_count },
            ),
        },
        ClientRequest::Ready { is_ready } => {
            if let Some(room) = current_room {
                let _ = room.ready(client_id.clone(), is_ready).await;
            } else {
                tracing::debug!(%client_id, "Ready from a connection with no current room");
            }
        }
        ClientRequest::KickPlayer { player } => {
            if let Some(room) = current_room {
                let _ = room.kick(client_id.clone(), player).await;
            } else {
                tracing::debug!(%client_id, "KickPlayer from a connection with no current room");
            }
        }
        ClientRequest::StartGame => match current_room {
            Some(room) => {
                let _ = room.start_game(client_id.clone()).await;
            }
            None => reply_locally(
                local,
                &ServerMessage::StartGame { should_start: false, starting_player: None },
            ),
        },
        ClientRequest::BeginRoll => {
            if let Some(room) = current_room {
                let _ = room.begin_roll(client_id.clone()).await;
            } else {
                tracing::debug!(%client_id, "BeginRoll from a connection with no current room");
            }
        }
        ClientRequest::BeginMove { roll, piece, cell } => match current_room {
            Some(room) => {
                let _ = room.begin_move(client_id.clone(), roll, piece, cell).await;
            }
            None => reply_locally(
                local,
                &ServerMessage::BeginMove {
                    player: client_id.clone(),
                    should_move: false,
                    roll,
                    cell,
                    piece,
                    finished: false,
                },
            ),
        },
        ClientRequest::EndMove { roll, piece, cell } => {
            if let Some(room) = current_room {
                let _ = room.end_move(client_id.clone(), roll, piece, cell).await;
            } else {
                tracing::debug!(%client_id, "EndMove from a connection with no current room");
            }
        }
        ClientRequest::ChangeName { name } => {
            if let Some(room) = current_room {
                let _ = room.change_name(client_id.clone(), name).await;
            } else {
                tracing::debug!(%client_id, "ChangeName from a connection with no current room");
            }
        }
    }
}

async fn writer_loop<W>(
    mut writer: W,
    mut events: mpsc::UnboundedReceiver<RoomEvent>,
    room_tx: watch::Sender<Option<RoomHandle>>,
    disconnect: Arc<Notify>,
) where
    W: tokio::io::AsyncWrite + Unpin,
{
    let mut keepalive = tokio::time::interval(KEEPALIVE_INTERVAL);
    keepalive.tick().await; // first tick fires immediately; the real period starts now

    loop {
        tokio::select! {
            biased;
            _ = disconnect.notified() => break,
            event = events.recv() => {
                let Some(event) = event else { break };
                if events.len() > MAX_QUEUE_BACKLOG {
                    tracing::warn!("outbound queue overflowed, tearing down connection");
                    break;
                }
                match event {
                    RoomEvent::Frame(bytes) => {
                        if yutnori_transport::write_frame_bytes(&mut writer, &bytes).await.is_err() {
                            break;
                        }
                        keepalive.reset();
                    }
                    RoomEvent::Joined(handle) => {
                        let _ = room_tx.send(Some(handle));
                    }
                    RoomEvent::Left => {
                        let _ = room_tx.send(None);
                    }
                }
            }
            _ = keepalive.tick() => {
                if yutnori_transport::write_message(&mut writer, &ServerMessage::Keepalive).await.is_err() {
                    break;
                }
            }
        }
    }

    disconnect.notify_waiters();
}
