use crate::model::Difficulty;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use uuid::Uuid;

/// Summary of one finished game.
#[derive(Debug, Clone, Serialize, Deserialize, Eq, PartialEq)]
pub struct GameStats {
    pub final_score: u32,
    pub level_reached: u32,
    pub matches_total: u32,
    pub rounds_completed: u32,
    pub play_time: Duration,
    pub difficulty: Difficulty,
    pub timestamp: i64,
    pub playthrough_id: Uuid,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq, Eq)]
pub struct GlobalStats {
    pub difficulty: Difficulty,
    pub total_games_played: u32,
    pub total_time_played: Duration,
    pub total_matches: u32,
    pub best_score: u32,
}
