//! The room actor: a single serialized mailbox owning one table, its
//! members, and one [`GameInstance`]. Written directly against
//! `yutnori_game::GameInstance` rather than a generic trait object,
//! since this server plays exactly one game. See `DESIGN.md` for why.

use std::collections::HashMap;
use std::sync::Arc;

use tokio::sync::mpsc;

use yutnori_game::{GameInstance, GameState, Player, MAX_PIECE_COUNT, MAX_PLAYER_COUNT, MIN_PLAYER_COUNT};
use yutnori_protocol::{frame, Cell, ClientId, PlayerView, RoomId, ServerMessage};

use crate::error::RoomError;

/// The smallest legal piece count; mirrors [`MAX_PIECE_COUNT`] on the
/// other end of the clamp.
const MIN_PIECE_COUNT: u8 = 2;

/// The piece count a freshly created room starts with, before its
/// master ever calls `SetPieceCount`.
const DEFAULT_PIECE_COUNT: u8 = 4;

/// How many in-flight commands a room's mailbox buffers before senders
/// start waiting.
const MAILBOX_CAPACITY: usize = 64;

/// What a member's dedicated writer task receives from the room it is
/// (or was) a member of. `Frame` is a pre-serialized wire frame, built
/// once per broadcast and handed out as a shared `Arc` so fanning a
/// message out to every member costs one JSON encode, not N.
///
/// `Joined`/`Left` are the notifications that let the writer task be
/// "the single mutator of the endpoint's current_room pointer" (spec
/// §4.5) without the room needing to reach into endpoint state itself.
pub enum RoomEvent {
    Frame(Arc<[u8]>),
    Joined(RoomHandle),
    Left,
}

/// The per-member outbound channel. Owned by the member's writer task
/// on the receiving end; the room holds the sending end for as long as
/// the member is present.
pub type OutboundSender = mpsc::UnboundedSender<RoomEvent>;

fn player_view(player: &Player) -> PlayerView {
    PlayerView {
        client_id: player.client_id.clone(),
        name: player.name.clone(),
        is_ready: player.is_ready,
        pieces: player.pieces.clone(),
    }
}

fn encode(message: &ServerMessage) -> Option<Arc<[u8]>> {
    match frame::encode_message(message) {
        Ok(bytes) => Some(Arc::from(bytes.into_boxed_slice())),
        Err(error) => {
            tracing::error!(%error, ?message, "failed to encode outbound message, dropping it");
            None
        }
    }
}

enum RoomCommand {
    Enter { client_id: ClientId, name: String, sender: OutboundSender },
    Exit { initiator: ClientId, target: ClientId, kicked: bool },
    Ready { client_id: ClientId, is_ready: bool },
    StartGame { client_id: ClientId },
    SetPieceCount { client_id: ClientId, piece_count: u8 },
    ChangeName { client_id: ClientId, name: String },
    BeginRoll { client_id: ClientId },
    BeginMove { client_id: ClientId, roll: i8, piece: u8, cell: Cell },
    EndMove { client_id: ClientId, roll: i8, piece: u8, cell: Cell },
}

/// A cheap, cloneable reference to a running room actor. Every method
/// forwards a command into the actor's mailbox and returns as soon as
/// it is enqueued — the room never replies to the handle directly; its
/// responses travel back out through the members' [`OutboundSender`]s.
#[derive(Clone)]
pub struct RoomHandle {
    room_id: RoomId,
    sender: mpsc::Sender<RoomCommand>,
}

impl RoomHandle {
    pub fn room_id(&self) -> &RoomId {
        &self.room_id
    }

    async fn dispatch(&self, command: RoomCommand) -> Result<(), RoomError> {
        self.sender
            .send(command)
            .await
            .map_err(|_| RoomError::Unavailable(self.room_id.clone()))
    }

    pub async fn enter(
        &self,
        client_id: ClientId,
        name: String,
        sender: OutboundSender,
    ) -> Result<(), RoomError> {
        self.dispatch(RoomCommand::Enter { client_id, name, sender }).await
    }

    pub async fn exit(&self, client_id: ClientId) -> Result<(), RoomError> {
        self.dispatch(RoomCommand::Exit {
            initiator: client_id.clone(),
            target: client_id,
            kicked: false,
        })
        .await
    }

    pub async fn kick(&self, initiator: ClientId, target: ClientId) -> Result<(), RoomError> {
        self.dispatch(RoomCommand::Exit { initiator, target, kicked: true }).await
    }

    pub async fn ready(&self, client_id: ClientId, is_ready: bool) -> Result<(), RoomError> {
        self.dispatch(RoomCommand::Ready { client_id, is_ready }).await
    }

    pub async fn start_game(&self, client_id: ClientId) -> Result<(), RoomError> {
        self.dispatch(RoomCommand::StartGame { client_id }).await
    }

    pub async fn set_piece_count(&self, client_id: ClientId, piece_count: u8) -> Result<(), RoomError> {
        self.dispatch(RoomCommand::SetPieceCount { client_id, piece_count }).await
    }

    pub async fn change_name(&self, client_id: ClientId, name: String) -> Result<(), RoomError> {
        self.dispatch(RoomCommand::ChangeName { client_id, name }).await
    }

    pub async fn begin_roll(&self, client_id: ClientId) -> Result<(), RoomError> {
        self.dispatch(RoomCommand::BeginRoll { client_id }).await
    }

    pub async fn begin_move(
        &self,
        client_id: ClientId,
        roll: i8,
        piece: u8,
        cell: Cell,
    ) -> Result<(), RoomError> {
        self.dispatch(RoomCommand::BeginMove { client_id, roll, piece, cell }).await
    }

    pub async fn end_move(
        &self,
        client_id: ClientId,
        roll: i8,
        piece: u8,
        cell: Cell,
    ) -> Result<(), RoomError> {
        self.dispatch(RoomCommand::EndMove { client_id, roll, piece, cell }).await
    }
}

/// Owns the member table and the single [`GameInstance`] for one room.
/// Runs as a lone tokio task; every field here is touched by exactly
/// one task, so nothing needs a lock.
struct RoomActor {
    room_id: RoomId,
    handle: RoomHandle,
    master: ClientId,
    piece_count: u8,
    players: Vec<Player>,
    outboxes: HashMap<ClientId, OutboundSender>,
    game: GameInstance,
    on_empty: mpsc::Sender<RoomId>,
    should_terminate: bool,
}

impl RoomActor {
    fn send_to(&self, client_id: &ClientId, message: &ServerMessage) {
        let Some(sender) = self.outboxes.get(client_id) else { return };
        let Some(bytes) = encode(message) else { return };
        let _ = sender.send(RoomEvent::Frame(bytes));
    }

    fn broadcast(&self, message: &ServerMessage) {
        let Some(bytes) = encode(message) else { return };
        for sender in self.outboxes.values() {
            let _ = sender.send(RoomEvent::Frame(bytes.clone()));
        }
    }

    fn broadcast_all(&self, messages: &[ServerMessage]) {
        for message in messages {
            self.broadcast(message);
        }
    }

    fn handle_enter(&mut self, client_id: ClientId, name: String, sender: OutboundSender) {
        if self.players.len() >= MAX_PLAYER_COUNT {
            let response = ServerMessage::EnterRoom {
                room_id: self.room_id.clone(),
                join: false,
                master: None,
                piece_count: self.piece_count,
                players: Vec::new(),
            };
            if let Some(bytes) = encode(&response) {
                let _ = sender.send(RoomEvent::Frame(bytes));
            }
            return;
        }

        let snapshot = ServerMessage::EnterRoom {
            room_id: self.room_id.clone(),
            join: true,
            master: Some(self.master.clone()),
            piece_count: self.piece_count,
            players: self.players.iter().map(player_view).collect(),
        };
        if let Some(bytes) = encode(&snapshot) {
            let _ = sender.send(RoomEvent::Frame(bytes));
        }

        self.broadcast(&ServerMessage::PlayerJoined { client_id: client_id.clone(), name: name.clone() });

        self.outboxes.insert(client_id.clone(), sender.clone());
        self.players.push(Player::new(client_id, name));
        let _ = sender.send(RoomEvent::Joined(self.handle.clone()));
    }

    fn handle_exit(&mut self, initiator: ClientId, target: ClientId, kicked: bool) {
        if kicked && initiator != self.master {
            return;
        }

        let Some(idx) = self.players.iter().position(|p| p.client_id == target) else { return };
        self.players.swap_remove(idx);
        let departing_sender = self.outboxes.remove(&target);
        let notify_departing = |sender: &OutboundSender| {
            if !kicked {
                if let Some(bytes) = encode(&ServerMessage::ExitRoom { exit: true }) {
                    let _ = sender.send(RoomEvent::Frame(bytes));
                }
            }
            let _ = sender.send(RoomEvent::Left);
        };

        if self.players.is_empty() {
            self.should_terminate = true;
            if let Some(sender) = departing_sender {
                notify_departing(&sender);
            }
            return;
        }

        if self.game.state != GameState::GameEnded {
            self.game.reset(&mut self.players);
        }

        let new_master = if self.master == target {
            let idx = rand::Rng::random_range(&mut rand::rng(), 0..self.players.len());
            let chosen = self.players[idx].client_id.clone();
            self.master = chosen.clone();
            Some(chosen)
        } else {
            None
        };

        self.broadcast(&ServerMessage::PlayerLeft { player: target, master: new_master, kicked });

        if let Some(sender) = departing_sender {
            notify_departing(&sender);
        }
    }

    fn handle_ready(&mut self, client_id: ClientId, is_ready: bool) {
        let Some(player) = self.players.iter_mut().find(|p| p.client_id == client_id) else { return };
        player.is_ready = is_ready;
        self.broadcast(&ServerMessage::Ready { player: client_id, is_ready });
    }

    fn handle_start_game(&mut self, client_id: ClientId) {
        let eligible = client_id == self.master
            && self.players.len() >= MIN_PLAYER_COUNT
            && self.players.iter().all(|p| p.is_ready)
            && self.game.state == GameState::GameEnded;

        if !eligible {
            self.send_to(
                &client_id,
                &ServerMessage::StartGame { should_start: false, starting_player: None },
            );
            return;
        }

        let mut rng = rand::rng();
        match self.game.start_game(&mut self.players, self.piece_count, &mut rng) {
            Ok(messages) => self.broadcast_all(&messages),
            Err(error) => {
                tracing::debug!(room_id = %self.room_id, %error, "start_game rejected");
                self.send_to(
                    &client_id,
                    &ServerMessage::StartGame { should_start: false, starting_player: None },
                );
            }
        }
    }

    fn handle_set_piece_count(&mut self, client_id: ClientId, piece_count: u8) {
        let eligible = client_id == self.master && self.game.state == GameState::GameEnded;
        if !eligible {
            self.send_to(
                &client_id,
                &ServerMessage::SetPieceCount { should_set: false, piece_count: self.piece_count },
            );
            return;
        }

        self.piece_count = piece_count.clamp(MIN_PIECE_COUNT, MAX_PIECE_COUNT);
        self.broadcast(&ServerMessage::SetPieceCount { should_set: true, piece_count: self.piece_count });
    }

    fn handle_change_name(&mut self, client_id: ClientId, name: String) {
        let Some(player) = self.players.iter_mut().find(|p| p.client_id == client_id) else { return };
        player.name = name.clone();
        self.broadcast(&ServerMessage::ChangeName { player: client_id, name });
    }

    fn handle_begin_roll(&mut self, client_id: ClientId) {
        let mut rng = rand::rng();
        match self.game.begin_roll(&self.players, &client_id, &mut rng) {
            Ok(messages) => self.broadcast_all(&messages),
            Err(error) => tracing::debug!(room_id = %self.room_id, %client_id, %error, "begin_roll rejected"),
        }
    }

    fn handle_begin_move(&mut self, client_id: ClientId, roll: i8, piece: u8, cell: Cell) {
        let messages = self.game.begin_move(&mut self.players, &client_id, roll, piece, cell);
        self.broadcast_all(&messages);
    }

    fn handle_end_move(&mut self, client_id: ClientId, _roll: i8, _piece: u8, _cell: Cell) {
        let member_ids: Vec<ClientId> = self.players.iter().map(|p| p.client_id.clone()).collect();
        match self.game.end_move(&mut self.players, &client_id, &member_ids) {
            Ok(messages) => self.broadcast_all(&messages),
            Err(error) => tracing::debug!(room_id = %self.room_id, %client_id, %error, "end_move rejected"),
        }
    }

    async fn run(mut self, mut receiver: mpsc::Receiver<RoomCommand>) {
        tracing::info!(room_id = %self.room_id, "room actor started");

        while let Some(command) = receiver.recv().await {
            match command {
                RoomCommand::Enter { client_id, name, sender } => self.handle_enter(client_id, name, sender),
                RoomCommand::Exit { initiator, target, kicked } => self.handle_exit(initiator, target, kicked),
                RoomCommand::Ready { client_id, is_ready } => self.handle_ready(client_id, is_ready),
                RoomCommand::StartGame { client_id } => self.handle_start_game(client_id),
                RoomCommand::SetPieceCount { client_id, piece_count } => {
                    self.handle_set_piece_count(client_id, piece_count)
                }
                RoomCommand::ChangeName { client_id, name } => self.handle_change_name(client_id, name),
                RoomCommand::BeginRoll { client_id } => self.handle_begin_roll(client_id),
                RoomCommand::BeginMove { client_id, roll, piece, cell } => {
                    self.handle_begin_move(client_id, roll, piece, cell)
                }
                RoomCommand::EndMove { client_id, roll, piece, cell } => {
                    self.handle_end_move(client_id, roll, piece, cell)
                }
            }

            if self.should_terminate {
                break;
            }
        }

        tracing::info!(room_id = %self.room_id, "room actor stopped");
        let _ = self.on_empty.send(self.room_id.clone()).await;
    }
}

/// Creates a new room with `creator` as its sole initial member and
/// master, and spawns its actor task. Mirrors the Hub's CreateRoom
/// handling: mints a new room with the client as master and sole
/// initial member, then enters the creator into the room.
///
/// `on_empty` is notified with this room's id once its last member
/// leaves and the actor is about to stop, so the Hub can drop it from
/// its table and destroy it.
pub fn spawn_room(
    room_id: RoomId,
    creator_id: ClientId,
    creator_name: String,
    creator_sender: OutboundSender,
    on_empty: mpsc::Sender<RoomId>,
) -> RoomHandle {
    let (sender, receiver) = mpsc::channel(MAILBOX_CAPACITY);
    let handle = RoomHandle { room_id: room_id.clone(), sender };

    let mut players = Vec::with_capacity(1);
    players.push(Player::new(creator_id.clone(), creator_name));

    let mut outboxes = HashMap::new();
    outboxes.insert(creator_id.clone(), creator_sender.clone());
    let _ = creator_sender.send(RoomEvent::Joined(handle.clone()));

    let actor = RoomActor {
        room_id,
        handle: handle.clone(),
        master: creator_id,
        piece_count: DEFAULT_PIECE_COUNT,
        players,
        outboxes,
        game: GameInstance::new(DEFAULT_PIECE_COUNT),
        on_empty,
        should_terminate: false,
    };

    tokio::spawn(actor.run(receiver));
    handle
}
