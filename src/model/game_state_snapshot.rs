use super::{GameBoard, GamePhase, GameState, Tile, TimerState};

/// Immutable view of a session for the rendering layer.
///
/// Fields are readable everywhere but can only be set here, so a view can
/// never write back into engine state.
#[readonly::make]
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct GameStateSnapshot {
    pub tiles: Vec<Tile>,
    pub generation: u32,
    pub phase: GamePhase,
    pub score: u32,
    pub time_remaining: u32,
    pub level: u32,
    pub matches_this_round: u32,
    pub matches_total: u32,
    pub round_over: bool,
    pub game_over: bool,
    pub paused: bool,
    pub message: Option<String>,
}

impl GameStateSnapshot {
    pub fn capture(
        board: &GameBoard,
        state: &GameState,
        timer_state: &TimerState,
        message: Option<String>,
    ) -> Self {
        Self {
            tiles: board.tiles().to_vec(),
            generation: board.generation(),
            phase: state.phase,
            score: state.score,
            time_remaining: timer_state.remaining_secs,
            level: state.level,
            matches_this_round: state.matches_this_round,
            matches_total: state.matches_total,
            round_over: state.round_over,
            game_over: state.game_over,
            paused: timer_state.is_paused(),
            message,
        }
    }

    pub fn revealed_tiles(&self) -> impl Iterator<Item = &Tile> {
        self.tiles
            .iter()
            .filter(|tile| tile.is_revealed && !tile.is_matched)
    }
}
