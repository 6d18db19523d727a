use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
pub enum GamePhase {
    #[default]
    NotStarted,
    Playing,
    /// Transient while a finished round is being closed out.
    RoundComplete,
    /// Terminal until the next `StartGame`/`Restart`.
    GameComplete,
}

/// Score and progression counters for one playthrough.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameState {
    pub phase: GamePhase,
    pub score: u32,
    pub level: u32,
    pub matches_this_round: u32,
    pub matches_total: u32,
    pub round_over: bool,
    pub game_over: bool,
    pub grid_tile_count: usize,
}

impl Default for GameState {
    fn default() -> Self {
        Self {
            phase: GamePhase::NotStarted,
            score: 0,
            level: 1,
            matches_this_round: 0,
            matches_total: 0,
            round_over: false,
            game_over: false,
            grid_tile_count: 0,
        }
    }
}

impl GameState {
    pub fn fresh(grid_tile_count: usize) -> Self {
        Self {
            phase: GamePhase::Playing,
            grid_tile_count,
            ..Self::default()
        }
    }

    pub fn is_playing(&self) -> bool {
        self.phase == GamePhase::Playing && !self.round_over && !self.game_over
    }
}
