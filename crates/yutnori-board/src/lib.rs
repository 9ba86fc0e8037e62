//! Pure board geometry for the 29-cell Yutnori track.
//!
//! Every function here is total and side-effect free: given a cell (and
//! a roll, or a piece), they compute where a piece goes. None of them
//! know about players, turns, or the rolls pool — that lives in
//! `yutnori-game`, which is the only consumer of this crate.
//!
//! The track is a square ring of 20 cells (4 corners + 4 runs of 4)
//! plus two diagonals of 4 cells each crossing at [`Cell::Center`], for
//! 29 cells total. Two of the four corners, `TopRight` and `TopLeft`,
//! are also the entry points onto the diagonal shortcuts: the
//! *default* forward step from either one is onto its diagonal, not
//! onward around the ring. Concretely, the only loop forward movement
//! ever actually walks is:
//!
//! `BottomRight -> Right0..3 -> TopRight -> AntiDiagonal0,1 -> Center
//! -> AntiDiagonal2,3 -> BottomLeft -> Bottom0..3 -> BottomRight`
//!
//! `TopLeft`, `Left0..3`, `MainDiagonal0..3` and `Top0..3` only ever
//! come up as back-step (`roll == -1`) targets — nothing in forward
//! play lands on them. That's a real asymmetry in this board, not an
//! oversight; see `DESIGN.md`.

use yutnori_protocol::{Cell, Piece};

/// The deterministic single-step forward advance shared by [`next_cell`]
/// and [`next_passing_cell`] for every cell except the two each of them
/// special-cases (`BottomRight`/`Center`, see those functions).
fn ring_step(cell: Cell) -> Cell {
    use Cell::*;
    match cell {
        BottomRight => Right0,
        Right0 => Right1,
        Right1 => Right2,
        Right2 => Right3,
        Right3 => TopRight,
        TopRight => AntiDiagonal0,
        AntiDiagonal0 => AntiDiagonal1,
        AntiDiagonal1 => Center,
        AntiDiagonal2 => AntiDiagonal3,
        AntiDiagonal3 => BottomLeft,
        BottomLeft => Bottom0,
        Bottom0 => Bottom1,
        Bottom1 => Bottom2,
        Bottom2 => Bottom3,
        Bottom3 => BottomRight,
        TopLeft => MainDiagonal0,
        MainDiagonal0 => MainDiagonal1,
        MainDiagonal1 => Center,
        MainDiagonal2 => MainDiagonal3,
        MainDiagonal3 => BottomRight,
        Left0 => Left1,
        Left1 => Left2,
        Left2 => Left3,
        Left3 => BottomLeft,
        Top0 => Top1,
        Top1 => Top2,
        Top2 => Top3,
        Top3 => TopLeft,
        Center => MainDiagonal2,
    }
}

/// The default forward step, used for the first hop of a move (the
/// piece's current cell, consulting whether it's still `at_start`).
///
/// `BottomRight` is the one cell whose step depends on `at_start`: a
/// piece waiting to enter the board (`at_start = true`) steps onto
/// `Right0`; a piece already on the board that steps again from
/// `BottomRight` (having lapped all the way around) has crossed the
/// finish line.
pub fn next_cell(cell: Cell, at_start: bool) -> (Cell, bool) {
    if cell == Cell::BottomRight && !at_start {
        return (Cell::BottomRight, true);
    }
    (ring_step(cell), false)
}

/// The single-step advance used for cells a move passes through without
/// landing there as the final cell of a `next_cell` call. Identical to
/// [`next_cell`] everywhere except `BottomRight`, which always finishes
/// a piece that passes through it, and `Center`, whose exit diagonal
/// depends on which diagonal `prev` entered it from.
pub fn next_passing_cell(prev: Cell, cell: Cell) -> (Cell, bool) {
    match cell {
        Cell::BottomRight => (Cell::BottomRight, true),
        Cell::Center => {
            let next = match prev {
                Cell::AntiDiagonal1 => Cell::AntiDiagonal2,
                // MainDiagonal1, or any other arrival: fall back to the
                // same default `ring_step` takes from a fresh landing.
                _ => Cell::MainDiagonal2,
            };
            (next, false)
        }
        other => (ring_step(other), false),
    }
}

/// Returns `cell`'s geometric predecessor(s) on the ring. Most cells
/// have exactly one; `BottomRight`, `BottomLeft`, and `Center` sit at a
/// fork between the outer ring and a diagonal, so they have two. Cells
/// with only one predecessor return it twice, so callers never need to
/// special-case the arity.
pub fn prev_cell(cell: Cell) -> (Cell, Cell) {
    use Cell::*;
    match cell {
        BottomRight => (Bottom3, MainDiagonal3),
        BottomLeft => (Left3, AntiDiagonal3),
        Center => (MainDiagonal1, AntiDiagonal1),

        Right0 => (BottomRight, BottomRight),
        Right1 => (Right0, Right0),
        Right2 => (Right1, Right1),
        Right3 => (Right2, Right2),
        TopRight => (Right3, Right3),

        Top0 => (TopRight, TopRight),
        Top1 => (Top0, Top0),
        Top2 => (Top1, Top1),
        Top3 => (Top2, Top2),
        TopLeft => (Top3, Top3),

        Left0 => (TopLeft, TopLeft),
        Left1 => (Left0, Left0),
        Left2 => (Left1, Left1),
        Left3 => (Left2, Left2),

        Bottom0 => (BottomLeft, BottomLeft),
        Bottom1 => (Bottom0, Bottom0),
        Bottom2 => (Bottom1, Bottom1),
        Bottom3 => (Bottom2, Bottom2),

        MainDiagonal0 => (TopLeft, TopLeft),
        MainDiagonal1 => (MainDiagonal0, MainDiagonal0),
        MainDiagonal2 => (Center, Center),
        MainDiagonal3 => (MainDiagonal2, MainDiagonal2),

        AntiDiagonal0 => (TopRight, TopRight),
        AntiDiagonal1 => (AntiDiagonal0, AntiDiagonal0),
        AntiDiagonal2 => (Center, Center),
        AntiDiagonal3 => (AntiDiagonal2, AntiDiagonal2),
    }
}

/// Computes the landing path(s) for moving `piece` by `roll`.
///
/// Returns `(path_a, path_b, finish)`. Each path holds only the cells
/// *entered* (not the piece's current cell); its last element, if any,
/// is a legal landing target. `finish` is set when `path_a`'s walk
/// crosses the finish line before `roll` cells are consumed — `path_a`
/// is truncated at the finishing cell.
///
/// - `roll == -1`: a piece still `at_start` has nowhere to back up
///   from, so both paths are empty. Otherwise both paths are the one
///   or two predecessors of the piece's cell (`finish` is always
///   `false` — backing up never finishes a piece).
/// - `roll >= 1`: `path_a` is one [`next_cell`] step followed by
///   `roll - 1` [`next_passing_cell`] steps; `path_b` is always empty.
///
/// `roll == 0` is never passed in by the game layer, but is handled
/// here as an empty `path_a` rather than panicking.
pub fn move_sequence(piece: Piece, roll: i8) -> (Vec<Cell>, Vec<Cell>, bool) {
    if roll == 0 {
        return (Vec::new(), Vec::new(), false);
    }
    if roll < 0 {
        if piece.at_start {
            return (Vec::new(), Vec::new(), false);
        }
        let (a, b) = prev_cell(piece.cell);
        return (vec![a], vec![b], false);
    }

    let mut path = Vec::with_capacity(roll as usize);
    let (first, mut finished) = next_cell(piece.cell, piece.at_start);
    path.push(first);

    if !finished {
        let mut prev = piece.cell;
        let mut current = first;
        for _ in 1..roll {
            let (next, f) = next_passing_cell(prev, current);
            prev = current;
            current = next;
            path.push(current);
            if f {
                finished = true;
                break;
            }
        }
    }

    (path, Vec::new(), finished)
}
