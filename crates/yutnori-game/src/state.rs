/// Where a game instance currently sits in its turn cycle.
///
/// Transitions flow in one direction per turn:
///
/// ```text
/// GameStarted → BeginTurn → CanRoll → BeginRoll → EndRoll
///   → (CanRoll again, on a bonus throw)
///   → SelectingMove → BeginMove → EndMove
///   → (SelectingMove again, while rolls remain in the pool)
///   → EndTurn → BeginTurn (next player) → ... → GameEnded
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GameState {
    GameStarted,
    BeginTurn,
    CanRoll,
    BeginRoll,
    EndRoll,
    SelectingMove,
    BeginMove,
    EndMove,
    EndTurn,
    GameEnded,
}
