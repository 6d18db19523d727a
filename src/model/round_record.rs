use serde::{Deserialize, Serialize};

/// One completed round. Appended to the history and never touched again.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoundRecord {
    pub round_index: u32,
    pub matches_in_round: u32,
    pub score_at_round_end: u32,
}

/// The blob handed to the persistence collaborator, keyed by `name`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlayerData {
    pub name: String,
    #[serde(default)]
    pub history: Vec<RoundRecord>,
}

impl PlayerData {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            history: Vec::new(),
        }
    }

    /// Append a closed round; its index continues the player's history.
    pub fn push_round(&mut self, matches_in_round: u32, score_at_round_end: u32) -> RoundRecord {
        let record = RoundRecord {
            round_index: self.history.len() as u32,
            matches_in_round,
            score_at_round_end,
        };
        self.history.push(record);
        record
    }

    pub fn best_score(&self) -> Option<u32> {
        self.history.iter().map(|r| r.score_at_round_end).max()
    }
}
