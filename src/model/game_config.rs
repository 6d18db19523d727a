use serde::{Deserialize, Serialize};
use std::time::Duration;

use super::{Color, Difficulty};

/// What happens when the two revealed tiles do not match.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, Default)]
pub enum MismatchPolicy {
    /// Flip both tiles back after `GameConfig::revert_delay` and keep playing.
    #[default]
    RevertAndContinue,
    /// A single miss ends the game.
    EndRoundOnMismatch,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameConfig {
    pub difficulty: Difficulty,
    /// Seconds on the clock at the start of every level.
    pub time_budget_secs: u32,
    pub match_unit_value: u32,
    /// Pairs required to clear a level.
    pub match_goal: u32,
    /// Seconds of remaining time that earn no bonus on level advance.
    pub bonus_threshold_secs: u32,
    pub starting_tile_count: usize,
    pub tile_count_step: usize,
    /// Extra seconds granted on top of the budget after a level advance.
    pub level_time_extension_secs: u32,
    pub mismatch_policy: MismatchPolicy,
    pub revert_delay: Duration,
    pub palette: Vec<Color>,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self::for_difficulty(Difficulty::Classic)
    }
}

impl GameConfig {
    pub fn for_difficulty(difficulty: Difficulty) -> Self {
        let classic = GameConfig {
            difficulty,
            time_budget_secs: 30,
            match_unit_value: 10,
            match_goal: 10,
            bonus_threshold_secs: 0,
            starting_tile_count: 16,
            tile_count_step: 2,
            level_time_extension_secs: 0,
            mismatch_policy: MismatchPolicy::RevertAndContinue,
            revert_delay: Duration::from_millis(1000),
            palette: Color::all(),
        };
        match difficulty {
            Difficulty::Relaxed => GameConfig {
                time_budget_secs: 45,
                match_goal: 8,
                starting_tile_count: 12,
                level_time_extension_secs: 5,
                revert_delay: Duration::from_millis(1500),
                ..classic
            },
            Difficulty::Classic => classic,
            Difficulty::Strict => GameConfig {
                time_budget_secs: 20,
                revert_delay: Duration::from_millis(600),
                mismatch_policy: MismatchPolicy::EndRoundOnMismatch,
                ..classic
            },
        }
    }

    pub fn with_mismatch_policy(mut self, policy: MismatchPolicy) -> Self {
        self.mismatch_policy = policy;
        self
    }

    /// Largest deck the palette can pair up: two tiles per distinct color.
    pub fn max_tile_count(&self) -> usize {
        let mut colors = self.palette.clone();
        colors.sort();
        colors.dedup();
        colors.len() * 2
    }

    /// Grid size for a 1-based level, capped by what the palette can supply.
    pub fn tile_count_for_level(&self, level: u32) -> usize {
        let growth = self.tile_count_step * level.saturating_sub(1) as usize;
        (self.starting_tile_count + growth).min(self.max_tile_count())
    }

    /// Time on the clock after advancing to a new level.
    pub fn level_time_budget(&self) -> u32 {
        self.time_budget_secs + self.level_time_extension_secs
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_classic_defaults() {
        let config = GameConfig::default();
        assert_eq!(config.difficulty, Difficulty::Classic);
        assert_eq!(config.time_budget_secs, 30);
        assert_eq!(config.match_unit_value, 10);
        assert_eq!(config.match_goal, 10);
        assert_eq!(config.mismatch_policy, MismatchPolicy::RevertAndContinue);
    }

    #[test]
    fn test_strict_ends_round_on_mismatch() {
        let config = GameConfig::for_difficulty(Difficulty::Strict);
        assert_eq!(config.mismatch_policy, MismatchPolicy::EndRoundOnMismatch);
    }

    #[test]
    fn test_tile_count_grows_and_caps() {
        let config = GameConfig::default();
        assert_eq!(config.tile_count_for_level(1), 16);
        assert_eq!(config.tile_count_for_level(2), 18);
        assert_eq!(config.tile_count_for_level(5), 24);
        // 13 colors pair up into at most 26 tiles
        assert_eq!(config.tile_count_for_level(50), 26);
    }
}
