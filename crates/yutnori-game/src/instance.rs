//! The per-room game state machine.
//!
//! `GameInstance` holds everything about a room's game *except* the
//! player roster itself — `players` is borrowed from the room actor
//! for the duration of each call rather than duplicated here. Keeping
//! one authoritative `Vec<Player>` (owned by the room, see
//! `yutnori-room`) avoids two copies of piece state ever drifting
//! apart. See `DESIGN.md`.
//!
//! Every public method here is the full, atomic handling of one
//! mailbox action: each transition in the room's mailbox loop is
//! atomic, and that's exactly the granularity of these methods — call
//! one, get back the messages to broadcast.

use std::collections::HashSet;

use rand::Rng;
use tracing::debug;
use yutnori_board::move_sequence;
use yutnori_protocol::{Cell, ClientId, ServerMessage};

use crate::error::GameError;
use crate::player::Player;
use crate::roll::{self, RollOutcome, RollPool};
use crate::state::GameState;

/// The move currently awaiting every member's `EndMove` ack.
#[derive(Debug, Clone, PartialEq)]
pub struct PendingMove {
    pub client: ClientId,
    pub roll: i8,
    pub piece: u8,
    pub cell: Cell,
}

/// The game data and state machine for a single room.
#[derive(Debug, Clone)]
pub struct GameInstance {
    pub piece_count: u8,
    pub state: GameState,
    pub turn_idx: usize,
    pub rolls: RollPool,
    pub end_move_acks: HashSet<ClientId>,
    pub current_move: Option<PendingMove>,
    pub current_move_finishes: bool,
}

impl GameInstance {
    pub fn new(piece_count: u8) -> Self {
        Self {
            piece_count,
            state: GameState::GameEnded,
            turn_idx: 0,
            rolls: RollPool::new(),
            end_move_acks: HashSet::new(),
            current_move: None,
            current_move_finishes: false,
        }
    }

    fn require_state(&self, expected: GameState) -> Result<(), GameError> {
        if self.state == expected { Ok(()) } else { Err(GameError::InvalidState) }
    }

    fn require_turn(&self, players: &[Player], client: &ClientId) -> Result<(), GameError> {
        if players[self.turn_idx].client_id == *client {
            Ok(())
        } else {
            Err(GameError::NotYourTurn(client.clone()))
        }
    }

    fn advance_turn(&mut self, players: &[Player]) -> ClientId {
        self.turn_idx = (self.turn_idx + 1) % players.len();
        players[self.turn_idx].client_id.clone()
    }

    /// Re-homes every player's pieces and clears readiness, idempotently.
    /// Called on mid-game departure and as the first step of a fresh
    /// game.
    pub fn reset(&mut self, players: &mut [Player]) {
        for player in players.iter_mut() {
            player.reset_pieces(self.piece_count);
            player.is_ready = false;
        }
        self.state = GameState::GameEnded;
        self.turn_idx = 0;
        self.rolls.clear();
        self.end_move_acks.clear();
        self.current_move = None;
        self.current_move_finishes = false;
    }

    /// `StartGame`: legality (master + all-ready + `GameEnded`) is the
    /// room actor's job; this assumes the caller already checked it
    /// and only rejects on a stale state.
    pub fn start_game<R: Rng + ?Sized>(
        &mut self,
        players: &mut [Player],
        piece_count: u8,
        rng: &mut R,
    ) -> Result<Vec<ServerMessage>, GameError> {
        self.require_state(GameState::GameEnded)?;
        self.piece_count = piece_count;
        self.reset(players);
        self.turn_idx = rng.random_range(0..players.len());
        self.state = GameState::CanRoll;

        let starting = players[self.turn_idx].client_id.clone();
        Ok(vec![
            ServerMessage::StartGame {
                should_start: true,
                starting_player: Some(starting.clone()),
            },
            ServerMessage::BeginTurn,
            ServerMessage::CanRoll { player: starting },
        ])
    }

    /// `BeginRoll`: draws a throw, folds it into the pool, and applies
    /// every automatic transition that follows — the whole `CanRoll →
    /// BeginRoll → EndRoll → ...` chain is one atomic mailbox action.
    pub fn begin_roll<R: Rng + ?Sized>(
        &mut self,
        players: &[Player],
        initiator: &ClientId,
        rng: &mut R,
    ) -> Result<Vec<ServerMessage>, GameError> {
        self.require_state(GameState::CanRoll)?;
        self.require_turn(players, initiator)?;

        let current = &players[self.turn_idx];
        let outcome = roll::throw(rng);
        let record = self.rolls.record(outcome, current.all_pieces_at_start());
        let should_append = !matches!(record, RollOutcome::Miss | RollOutcome::Wasted);

        let mut out = vec![ServerMessage::EndRoll { should_append, roll: outcome }];

        if roll::grants_bonus_roll(outcome) {
            self.state = GameState::CanRoll;
        } else if self.rolls.is_empty() {
            let next_player = self.advance_turn(players);
            out.push(ServerMessage::EndTurn { next_player: next_player.clone() });
            out.push(ServerMessage::BeginTurn);
            out.push(ServerMessage::CanRoll { player: next_player });
            self.state = GameState::CanRoll;
        } else {
            out.push(ServerMessage::SelectingMove { player: initiator.clone() });
            self.state = GameState::SelectingMove;
        }

        Ok(out)
    }

    /// `BeginMove`: every rejection reason — wrong state, wrong
    /// player, bad piece/roll/cell — folds into a single
    /// `should_move = false` broadcast rather than an error, so this
    /// never returns `Err`; state only changes on success.
    pub fn begin_move(
        &mut self,
        players: &mut [Player],
        initiator: &ClientId,
        roll: i8,
        piece_idx: u8,
        cell: Cell,
    ) -> Vec<ServerMessage> {
        let legal = self.check_move_legality(players, initiator, roll, piece_idx, cell);

        let Some(finished) = legal else {
            debug!(%initiator, roll, piece_idx, ?cell, "illegal BeginMove");
            return vec![ServerMessage::BeginMove {
                player: initiator.clone(),
                should_move: false,
                roll,
                cell,
                piece: piece_idx,
                finished: false,
            }];
        };

        self.rolls.take(roll);
        self.current_move = Some(PendingMove {
            client: initiator.clone(),
            roll,
            piece: piece_idx,
            cell,
        });
        self.current_move_finishes = finished;
        self.end_move_acks.clear();
        self.state = GameState::BeginMove;

        vec![ServerMessage::BeginMove {
            player: initiator.clone(),
            should_move: true,
            roll,
            cell,
            piece: piece_idx,
            finished,
        }]
    }

    /// Returns `Some(finished)` if the move is legal, `None` otherwise.
    fn check_move_legality(
        &self,
        players: &[Player],
        initiator: &ClientId,
        roll: i8,
        piece_idx: u8,
        cell: Cell,
    ) -> Option<bool> {
        if self.state != GameState::SelectingMove {
            return None;
        }
        let mover = &players[self.turn_idx];
        if mover.client_id != *initiator {
            return None;
        }
        let piece = *mover.pieces.get(piece_idx as usize)?;
        if piece.finished {
            return None;
        }
        if !self.rolls.as_slice().contains(&roll) {
            return None;
        }

        let (path_a, path_b, finish_a) = move_sequence(piece, roll);
        if path_a.last() == Some(&cell) {
            Some(finish_a)
        } else if path_b.last() == Some(&cell) {
            Some(false)
        } else {
            None
        }
    }

    /// `EndMove`: records one member's ack; once every current member
    /// has acked, applies the pending move's consequences.
    pub fn end_move(
        &mut self,
        players: &mut [Player],
        member: &ClientId,
        member_ids: &[ClientId],
    ) -> Result<Vec<ServerMessage>, GameError> {
        self.require_state(GameState::BeginMove)?;
        self.end_move_acks.insert(member.clone());

        if !member_ids.iter().all(|id| self.end_move_acks.contains(id)) {
            return Ok(Vec::new());
        }

        self.apply_pending_move(players)
    }

    fn apply_pending_move(
        &mut self,
        players: &mut [Player],
    ) -> Result<Vec<ServerMessage>, GameError> {
        let mv = self.current_move.take().ok_or(GameError::InvalidState)?;
        let finished_flag = self.current_move_finishes;
        self.end_move_acks.clear();

        let turn_idx = self.turn_idx;
        let mover_id = players[turn_idx].client_id.clone();

        // 1. Carry set.
        let piece_at_start = players[turn_idx]
            .pieces
            .get(mv.piece as usize)
            .ok_or(GameError::UnknownPiece(mv.piece))?
            .at_start;
        let from_cell = players[turn_idx].pieces[mv.piece as usize].cell;
        let carried: Vec<u8> = if piece_at_start {
            vec![mv.piece]
        } else {
            players[turn_idx].pieces_at(from_cell)
        };
        for idx in &carried {
            let piece = &mut players[turn_idx].pieces[*idx as usize];
            piece.cell = mv.cell;
            piece.at_start = false;
            piece.finished = finished_flag;
        }

        // 2. Stomp.
        let mut stomped = false;
        for (idx, player) in players.iter_mut().enumerate() {
            if idx == turn_idx {
                continue;
            }
            for piece in player.pieces.iter_mut() {
                if piece.is_on_board() && piece.cell == mv.cell {
                    piece.cell = Cell::BottomRight;
                    piece.at_start = true;
                    stomped = true;
                }
            }
        }

        // 3-6. Termination, re-roll, turn advance, or continue selecting.
        let mut out = Vec::new();
        if players[turn_idx].all_pieces_finished() {
            self.state = GameState::GameEnded;
            out.push(ServerMessage::EndGame { winner: mover_id });
        } else if stomped {
            self.state = GameState::CanRoll;
            out.push(ServerMessage::CanRoll { player: mover_id });
        } else if self.rolls.is_empty() {
            let next_player = self.advance_turn(players);
            out.push(ServerMessage::EndTurn { next_player: next_player.clone() });
            out.push(ServerMessage::BeginTurn);
            out.push(ServerMessage::CanRoll { player: next_player });
            self.state = GameState::CanRoll;
        } else {
            self.state = GameState::SelectingMove;
            out.push(ServerMessage::SelectingMove { player: mover_id });
        }

        Ok(out)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;
    use yutnori_protocol::Piece;

    fn two_players() -> Vec<Player> {
        let mut alice = Player::new(ClientId("alice".into()), "Alice".into());
        let mut bob = Player::new(ClientId("bob".into()), "Bob".into());
        alice.reset_pieces(4);
        bob.reset_pieces(4);
        vec![alice, bob]
    }

    fn member_ids(players: &[Player]) -> Vec<ClientId> {
        players.iter().map(|p| p.client_id.clone()).collect()
    }

    #[test]
    fn test_start_game_enters_can_roll_for_a_random_player() {
        let mut game = GameInstance::new(4);
        let mut players = two_players();
        let mut rng = StdRng::seed_from_u64(1);
        let msgs = game.start_game(&mut players, 4, &mut rng).unwrap();
        assert_eq!(game.state, GameState::CanRoll);
        assert!(matches!(msgs[0], ServerMessage::StartGame { should_start: true, .. }));
        assert!(matches!(msgs[1], ServerMessage::BeginTurn));
        assert!(matches!(msgs[2], ServerMessage::CanRoll { .. }));
    }

    #[test]
    fn test_start_game_rejects_unless_game_ended() {
        let mut game = GameInstance::new(4);
        game.state = GameState::SelectingMove;
        let mut players = two_players();
        let mut rng = StdRng::seed_from_u64(1);
        assert!(matches!(
            game.start_game(&mut players, 4, &mut rng),
            Err(GameError::InvalidState)
        ));
    }

    #[test]
    fn test_begin_roll_rejects_wrong_turn_player() {
        let mut game = GameInstance::new(4);
        let mut players = two_players();
        let mut rng = StdRng::seed_from_u64(1);
        game.start_game(&mut players, 4, &mut rng).unwrap();
        let not_turn = if players[game.turn_idx].client_id == players[0].client_id {
            players[1].client_id.clone()
        } else {
            players[0].client_id.clone()
        };
        assert!(matches!(
            game.begin_roll(&players, &not_turn, &mut rng),
            Err(GameError::NotYourTurn(_))
        ));
    }

    #[test]
    fn test_begin_move_legal_from_start() {
        let mut game = GameInstance::new(4);
        let mut players = two_players();
        game.turn_idx = 0;
        game.state = GameState::SelectingMove;
        game.rolls = RollPool::new();
        game.rolls.record(3, true);

        let msgs = game.begin_move(
            &mut players,
            &players[0].client_id.clone(),
            3,
            0,
            Cell::Right2,
        );
        assert_eq!(msgs.len(), 1);
        assert!(matches!(
            msgs[0],
            ServerMessage::BeginMove { should_move: true, finished: false, .. }
        ));
        assert_eq!(game.state, GameState::BeginMove);
        assert!(!game.rolls.as_slice().contains(&3));
    }

    #[test]
    fn test_begin_move_illegal_cell_does_not_change_state() {
        let mut game = GameInstance::new(4);
        let mut players = two_players();
        game.turn_idx = 0;
        game.state = GameState::SelectingMove;
        game.rolls.record(3, true);

        let msgs = game.begin_move(
            &mut players,
            &players[0].client_id.clone(),
            3,
            0,
            Cell::Right1,
        );
        assert!(matches!(msgs[0], ServerMessage::BeginMove { should_move: false, .. }));
        assert_eq!(game.state, GameState::SelectingMove);
    }

    #[test]
    fn test_end_move_waits_for_every_member_before_applying() {
        let mut game = GameInstance::new(4);
        let mut players = two_players();
        game.turn_idx = 0;
        game.state = GameState::SelectingMove;
        game.rolls.record(3, true);
        game.begin_move(&mut players, &players[0].client_id.clone(), 3, 0, Cell::Right2);

        let ids = member_ids(&players);
        let alice = players[0].client_id.clone();
        let bob = players[1].client_id.clone();

        let msgs = game.end_move(&mut players, &alice, &ids).unwrap();
        assert!(msgs.is_empty(), "should wait for bob's ack too");
        assert_eq!(game.state, GameState::BeginMove);

        let msgs = game.end_move(&mut players, &bob, &ids).unwrap();
        assert!(!msgs.is_empty());
        assert!(players[0].pieces[0].is_on_board());
        assert_eq!(players[0].pieces[0].cell, Cell::Right2);
    }

    #[test]
    fn test_apply_move_carries_stacked_pieces_together() {
        let mut game = GameInstance::new(4);
        let mut players = two_players();
        players[0].pieces[0] = Piece { at_start: false, finished: false, cell: Cell::Right1 };
        players[0].pieces[1] = Piece { at_start: false, finished: false, cell: Cell::Right1 };
        game.turn_idx = 0;
        game.state = GameState::SelectingMove;
        game.rolls.record(2, false);

        game.begin_move(&mut players, &players[0].client_id.clone(), 2, 0, Cell::Right3);
        let ids = member_ids(&players);
        let alice = players[0].client_id.clone();
        let bob = players[1].client_id.clone();
        game.end_move(&mut players, &alice, &ids).unwrap();
        game.end_move(&mut players, &bob, &ids).unwrap();

        assert_eq!(players[0].pieces[0].cell, Cell::Right3);
        assert_eq!(players[0].pieces[1].cell, Cell::Right3, "stacked piece carries along");
    }

    #[test]
    fn test_apply_move_stomps_opponent_and_grants_reroll() {
        let mut game = GameInstance::new(4);
        let mut players = two_players();
        players[1].pieces[0] = Piece { at_start: false, finished: false, cell: Cell::Right2 };
        game.turn_idx = 0;
        game.state = GameState::SelectingMove;
        game.rolls.record(2, false);

        game.begin_move(&mut players, &players[0].client_id.clone(), 2, 0, Cell::Right2);
        let ids = member_ids(&players);
        let alice = players[0].client_id.clone();
        let bob = players[1].client_id.clone();
        let msgs = game.end_move(&mut players, &alice, &ids).unwrap();
        let msgs2 = game.end_move(&mut players, &bob, &ids).unwrap();
        let all_msgs = [msgs, msgs2].concat();

        assert!(players[1].pieces[0].at_start);
        assert_eq!(players[1].pieces[0].cell, Cell::BottomRight);
        assert_eq!(game.state, GameState::CanRoll);
        assert_eq!(game.turn_idx, 0, "stomping player keeps the turn");
        assert!(all_msgs.iter().any(|m| matches!(m, ServerMessage::CanRoll { .. })));
    }

    #[test]
    fn test_apply_move_ends_game_when_every_piece_finishes() {
        let mut game = GameInstance::new(1);
        let mut players = two_players();
        players[0].pieces.truncate(1);
        players[1].pieces.truncate(1);
        players[0].pieces[0] = Piece { at_start: false, finished: false, cell: Cell::Bottom3 };
        game.turn_idx = 0;
        game.state = GameState::SelectingMove;
        game.rolls.record(3, false);

        game.begin_move(&mut players, &players[0].client_id.clone(), 3, 0, Cell::BottomRight);
        let ids = member_ids(&players);
        let alice = players[0].client_id.clone();
        let bob = players[1].client_id.clone();
        game.end_move(&mut players, &alice, &ids).unwrap();
        let msgs = game.end_move(&mut players, &bob, &ids).unwrap();

        assert_eq!(game.state, GameState::GameEnded);
        assert!(players[0].pieces[0].finished);
        assert!(matches!(msgs[0], ServerMessage::EndGame { .. }));
    }

    #[test]
    fn test_reset_is_idempotent() {
        let mut game = GameInstance::new(4);
        let mut players = two_players();
        players[0].pieces[0].at_start = false;
        players[0].pieces[0].cell = Cell::Right2;
        players[0].is_ready = true;

        game.reset(&mut players);
        let after_once = players.clone();
        game.reset(&mut players);
        assert_eq!(players[0].pieces, after_once[0].pieces);
        assert_eq!(players[0].is_ready, after_once[0].is_ready);
        assert!(players[0].all_pieces_at_start());
        assert!(!players[0].is_ready);
        assert_eq!(game.state, GameState::GameEnded);
    }
}
