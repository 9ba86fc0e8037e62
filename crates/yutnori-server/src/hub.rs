//! The hub: the one actor that owns the room table and the set of
//! connections not (yet) attributed to any room.
//!
//! A `HashMap<RoomId, _>` plus a monotonic id allocator, owning
//! `yutnori_room::RoomHandle`s rather than a generic game handle (this
//! server only ever plays one game). Structured as its own
//! mailbox-driven actor task rather than a `Mutex`-guarded struct,
//! matching how every other owner of mutable state in this workspace
//! (the room itself) is structured: one task, no locks.

use std::collections::HashMap;
use std::sync::Arc;

use tokio::sync::mpsc;

use yutnori_protocol::{frame, ClientId, RoomId, ServerMessage};
use yutnori_room::{spawn_room, OutboundSender, RoomEvent, RoomHandle};

/// How many in-flight commands the hub's mailbox buffers. Matches
/// `yutnori-room`'s per-room `MAILBOX_CAPACITY` — the hub sees one
/// CreateRoom/EnterRoom per connecting player, an order of magnitude
/// less traffic than a single busy room, so the same bound is ample.
const MAILBOX_CAPACITY: usize = 64;

enum HubCommand {
    Register { client_id: ClientId, sender: OutboundSender },
    Unregister { client_id: ClientId },
    CreateRoom { client_id: ClientId, name: String },
    EnterRoom { client_id: ClientId, room_id: RoomId, name: String },
}

/// A cheap, cloneable reference to the running hub actor. Every
/// accepted connection is handed one of these; it never blocks beyond
/// the mailbox send itself, same discipline as `yutnori_room::RoomHandle`.
#[derive(Clone)]
pub struct HubHandle {
    sender: mpsc::Sender<HubCommand>,
}

impl HubHandle {
    /// Registers a freshly accepted connection's outbound queue and
    /// pushes its `Connect` handshake carrying the freshly generated
    /// client identifier, immediately after accept.
    pub async fn register(&self, client_id: ClientId, sender: OutboundSender) {
        let _ = self.sender.send(HubCommand::Register { client_id, sender }).await;
    }

    /// Drops a connection's bookkeeping once its reader and writer
    /// tasks have both exited. Room membership is cleaned up by the
    /// endpoint itself (it knows its own `current_room`); the hub only
    /// forgets the connection's pending-room outbox.
    pub async fn unregister(&self, client_id: ClientId) {
        let _ = self.sender.send(HubCommand::Unregister { client_id }).await;
    }

    pub async fn create_room(&self, client_id: ClientId, name: String) {
        let _ = self.sender.send(HubCommand::CreateRoom { client_id, name }).await;
    }

    pub async fn enter_room(&self, client_id: ClientId, room_id: RoomId, name: String) {
        let _ = self.sender.send(HubCommand::EnterRoom { client_id, room_id, name }).await;
    }
}

struct Hub {
    rooms: HashMap<RoomId, RoomHandle>,
    connections: HashMap<ClientId, OutboundSender>,
}

impl Hub {
    fn send_to(&self, client_id: &ClientId, message: &ServerMessage) {
        let Some(sender) = self.connections.get(client_id) else { return };
        match frame::encode_message(message) {
            Ok(bytes) => {
                let _ = sender.send(RoomEvent::Frame(Arc::from(bytes.into_boxed_slice())));
            }
            Err(error) => {
                tracing::error!(%client_id, %error, ?message, "failed to encode message to a pending connection");
            }
        }
    }

    fn handle_register(&mut self, client_id: ClientId, sender: OutboundSender) {
        tracing::debug!(%client_id, "connection registered");
        self.connections.insert(client_id.clone(), sender);
        self.send_to(&client_id, &ServerMessage::Connect { client_id });
    }

    fn handle_unregister(&mut self, client_id: ClientId) {
        tracing::debug!(%client_id, "connection unregistered");
        self.connections.remove(&client_id);
    }

    fn handle_create_room(&mut self, client_id: ClientId, name: String, empty_tx: mpsc::Sender<RoomId>) {
        let Some(sender) = self.connections.get(&client_id).cloned() else {
            tracing::warn!(%client_id, "CreateRoom from an unregistered connection");
            return;
        };

        let room_id = RoomId::generate();
        self.send_to(&client_id, &ServerMessage::CreateRoom { room_id: room_id.clone() });

        let handle = spawn_room(room_id.clone(), client_id, name, sender, empty_tx);
        self.rooms.insert(room_id.clone(), handle);
        tracing::info!(%room_id, "room created");
    }

    async fn handle_enter_room(&mut self, client_id: ClientId, room_id: RoomId, name: String) {
        let Some(room) = self.rooms.get(&room_id) else {
            self.send_to(
                &client_id,
                &ServerMessage::EnterRoom {
                    room_id,
                    join: false,
                    master: None,
                    piece_count: 0,
                    players: Vec::new(),
                },
            );
            return;
        };

        let Some(sender) = self.connections.get(&client_id).cloned() else {
            tracing::warn!(%client_id, "EnterRoom from an unregistered connection");
            return;
        };

        let _ = room.enter(client_id, name, sender).await;
    }

    fn handle_room_emptied(&mut self, room_id: RoomId) {
        if self.rooms.remove(&room_id).is_some() {
            tracing::info!(%room_id, "room destroyed");
        }
    }
}

/// Spawns the hub actor and returns a handle to it. The hub runs for
/// the lifetime of the process; there is no shutdown command.
pub fn spawn_hub() -> HubHandle {
    let (sender, mut receiver) = mpsc::channel(MAILBOX_CAPACITY);
    let (empty_tx, mut empty_rx) = mpsc::channel::<RoomId>(MAILBOX_CAPACITY);

    let mut hub = Hub { rooms: HashMap::new(), connections: HashMap::new() };

    tokio::spawn(async move {
        tracing::info!("hub started");
        loop {
            tokio::select! {
                command = receiver.recv() => {
                    let Some(command) = command else { break };
                    match command {
                        HubCommand::Register { client_id, sender } => hub.handle_register(client_id, sender),
                        HubCommand::Unregister { client_id } => hub.handle_unregister(client_id),
                        HubCommand::CreateRoom { client_id, name } => {
                            hub.handle_create_room(client_id, name, empty_tx.clone())
                        }
                        HubCommand::EnterRoom { client_id, room_id, name } => {
                            hub.handle_enter_room(client_id, room_id, name).await
                        }
                    }
                }
                room_id = empty_rx.recv() => {
                    let Some(room_id) = room_id else { continue };
                    hub.handle_room_emptied(room_id);
                }
            }
        }
        tracing::info!("hub stopped");
    });

    HubHandle { sender }
}
