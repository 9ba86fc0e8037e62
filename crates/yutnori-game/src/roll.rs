//! The yut-stick throw: a discrete distribution over seven outcomes,
//! and the pool a player accumulates across bonus throws within a
//! single turn.

use rand::Rng;

/// The roll outcomes and their relative weights, in percent. The
/// middle three throws (`1`, `2`, `3`) are twice as likely as the
/// extremes (`-1`, `0`, `4`, `5`).
const OUTCOMES: [i8; 7] = [-1, 0, 1, 2, 3, 4, 5];
const WEIGHTS: [u32; 7] = [10, 10, 20, 20, 20, 10, 10];

/// Draws a single throw from the weighted distribution.
pub fn throw<R: Rng + ?Sized>(rng: &mut R) -> i8 {
    let total: u32 = WEIGHTS.iter().sum();
    let mut pick = rng.random_range(0..total);
    for (outcome, weight) in OUTCOMES.iter().zip(WEIGHTS.iter()) {
        if pick < *weight {
            return *outcome;
        }
        pick -= weight;
    }
    unreachable!("weights sum to `total`, so `pick` is always consumed")
}

/// Whether a throw grants the player an extra roll before they have
/// to move a piece — the classic "yut" (4) and "mo" (5) bonus.
pub fn grants_bonus_roll(outcome: i8) -> bool {
    outcome == 4 || outcome == 5
}

/// The rolls a player has accumulated this turn, waiting to be spent
/// on piece moves.
///
/// Mutation rules (per throw, applied in [`RollPool::record`]):
/// - `0` clears the pool and ends the turn immediately — a player
///   with a pending bonus throw still loses it on a miss.
/// - `-1` is discarded without being added to the pool when every one
///   of the player's pieces is still at start and the pool is already
///   empty — there is nothing on the board to back up.
/// - Otherwise the throw is appended to the pool.
#[derive(Debug, Clone, Default)]
pub struct RollPool {
    rolls: Vec<i8>,
}

/// What happened to a freshly drawn throw once folded into the pool.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RollOutcome {
    /// The throw was appended; pool play continues.
    Appended,
    /// A `0` ("nil") cleared the pool; the turn is over.
    Miss,
    /// A `-1` with nothing on the board and an empty pool; discarded.
    Wasted,
}

impl RollPool {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.rolls.is_empty()
    }

    pub fn as_slice(&self) -> &[i8] {
        &self.rolls
    }

    /// Folds a freshly drawn throw into the pool, given whether every
    /// one of the roller's pieces currently sits at start.
    pub fn record(&mut self, outcome: i8, all_pieces_at_start: bool) -> RollOutcome {
        if outcome == 0 {
            self.rolls.clear();
            return RollOutcome::Miss;
        }
        if outcome == -1 && all_pieces_at_start && self.rolls.is_empty() {
            return RollOutcome::Wasted;
        }
        self.rolls.push(outcome);
        RollOutcome::Appended
    }

    /// Removes one instance of `roll` from the pool, if present.
    pub fn take(&mut self, roll: i8) -> bool {
        if let Some(pos) = self.rolls.iter().position(|r| *r == roll) {
            self.rolls.remove(pos);
            true
        } else {
            false
        }
    }

    pub fn clear(&mut self) {
        self.rolls.clear();
    }
}
