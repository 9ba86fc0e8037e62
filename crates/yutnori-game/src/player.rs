use yutnori_protocol::{Cell, ClientId, Piece};

/// Largest number of pieces a room can be configured to play with.
pub const MAX_PIECE_COUNT: u8 = 6;

/// Largest number of players a single room admits.
pub const MAX_PLAYER_COUNT: usize = 6;

/// Fewest players required before the master can start the game.
pub const MIN_PLAYER_COUNT: usize = 2;

/// One seat at the table: identity, display name, and the pieces this
/// player is moving around the board.
#[derive(Debug, Clone)]
pub struct Player {
    pub client_id: ClientId,
    pub name: String,
    pub is_ready: bool,
    pub pieces: Vec<Piece>,
}

impl Player {
    pub fn new(client_id: ClientId, name: String) -> Self {
        Self { client_id, name, is_ready: false, pieces: Vec::new() }
    }

    /// Resets this player's pieces to `piece_count` fresh start pieces,
    /// called once at game start.
    pub fn reset_pieces(&mut self, piece_count: u8) {
        self.pieces = (0..piece_count).map(|_| Piece::new_at_start()).collect();
    }

    pub fn all_pieces_at_start(&self) -> bool {
        self.pieces.iter().all(|p| p.at_start)
    }

    pub fn all_pieces_finished(&self) -> bool {
        !self.pieces.is_empty() && self.pieces.iter().all(|p| p.finished)
    }

    /// Pieces of this player currently sitting on `cell`, by index.
    pub fn pieces_at(&self, cell: Cell) -> Vec<u8> {
        self.pieces
            .iter()
            .enumerate()
            .filter(|(_, p)| p.is_on_board() && p.cell == cell)
            .map(|(i, _)| i as u8)
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reset_pieces_creates_fresh_pieces_at_start() {
        let mut player = Player::new(ClientId("p1".into()), "Alice".into());
        player.reset_pieces(4);
        assert_eq!(player.pieces.len(), 4);
        assert!(player.all_pieces_at_start());
        assert!(!player.all_pieces_finished());
    }

    #[test]
    fn test_all_pieces_finished_is_false_with_no_pieces() {
        let player = Player::new(ClientId("p1".into()), "Alice".into());
        assert!(!player.all_pieces_finished());
    }

    #[test]
    fn test_pieces_at_finds_matching_on_board_pieces() {
        let mut player = Player::new(ClientId("p1".into()), "Alice".into());
        player.reset_pieces(2);
        player.pieces[0].at_start = false;
        player.pieces[0].cell = Cell::Right2;
        assert_eq!(player.pieces_at(Cell::Right2), vec![0]);
        assert_eq!(player.pieces_at(Cell::Right3), Vec::<u8>::new());
    }
}
