//! The board's cell enumeration and the `Piece` data type.
//!
//! These are wire types: `Cell` serializes as a small integer (its
//! enum ordinal). The actual movement rules live in
//! `yutnori-board`, which only consumes these types — it doesn't own
//! them, because both the protocol layer (payloads carry `Cell`s) and
//! the board layer (rules operate on `Cell`s) need them.

use serde::{Deserialize, Serialize};
use serde_repr::{Deserialize_repr, Serialize_repr};

/// One of the 29 named positions on the Yutnori board.
///
/// `BottomRight` is both the starting cell and the finish gateway.
/// The four side runs (`Right0..3`, `Top0..3`, `Left0..3`,
/// `Bottom0..3`) form the outer ring between corners; the two
/// diagonal half-runs (`MainDiagonal0..3`, `AntiDiagonal0..3`) are the
/// shortcuts through `Center`.
///
/// `#[derive(Serialize_repr, Deserialize_repr)]` (from `serde_repr`)
/// makes this serialize as its ordinal (`0`, `1`, ... `28`) instead of
/// a string like `"BottomRight"` — that's what "serialized as a small
/// integer" means on the wire. Ordinals below are part of the wire
/// contract: do not renumber.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize_repr, Deserialize_repr,
)]
#[repr(u8)]
pub enum Cell {
    BottomRight = 0,
    TopRight = 1,
    TopLeft = 2,
    BottomLeft = 3,

    Right0 = 4,
    Right1 = 5,
    Right2 = 6,
    Right3 = 7,

    Top0 = 8,
    Top1 = 9,
    Top2 = 10,
    Top3 = 11,

    Left0 = 12,
    Left1 = 13,
    Left2 = 14,
    Left3 = 15,

    Bottom0 = 16,
    Bottom1 = 17,
    Bottom2 = 18,
    Bottom3 = 19,

    MainDiagonal0 = 20,
    MainDiagonal1 = 21,
    MainDiagonal2 = 22,
    MainDiagonal3 = 23,

    AntiDiagonal0 = 24,
    AntiDiagonal1 = 25,
    AntiDiagonal2 = 26,
    AntiDiagonal3 = 27,

    Center = 28,
}

/// A single game piece belonging to a player.
///
/// Invariants: a finished piece is never `at_start`; an `at_start`
/// piece always sits at `Cell::BottomRight`; a piece that's actually
/// on the board has both flags `false`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Piece {
    pub at_start: bool,
    pub finished: bool,
    pub cell: Cell,
}

impl Piece {
    /// A fresh piece, waiting to enter the board.
    pub fn new_at_start() -> Self {
        Self {
            at_start: true,
            finished: false,
            cell: Cell::BottomRight,
        }
    }

    /// Returns `true` if this piece currently occupies the board
    /// (neither waiting to start nor finished).
    pub fn is_on_board(&self) -> bool {
        !self.at_start && !self.finished
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cell_serializes_as_ordinal() {
        assert_eq!(serde_json::to_string(&Cell::BottomRight).unwrap(), "0");
        assert_eq!(serde_json::to_string(&Cell::Center).unwrap(), "28");
    }

    #[test]
    fn test_cell_round_trip() {
        let c = Cell::AntiDiagonal2;
        let json = serde_json::to_string(&c).unwrap();
        let back: Cell = serde_json::from_str(&json).unwrap();
        assert_eq!(c, back);
    }

    #[test]
    fn test_piece_new_at_start_invariants() {
        let p = Piece::new_at_start();
        assert!(p.at_start);
        assert!(!p.finished);
        assert_eq!(p.cell, Cell::BottomRight);
        assert!(!p.is_on_board());
    }

    #[test]
    fn test_piece_is_on_board() {
        let p = Piece {
            at_start: false,
            finished: false,
            cell: Cell::Right2,
        };
        assert!(p.is_on_board());
    }
}
