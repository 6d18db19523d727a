use crate::error::Result;
use crate::game::settings::Settings;
use crate::model::{Difficulty, GameStats, GlobalStats, PlayerData};
use log::{info, warn};
use serde::de::DeserializeOwned;
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

const MAX_HIGH_SCORES: usize = 20;

/// File-backed store for high scores, aggregate stats and per-player round
/// history. Everything is JSON; unreadable files are treated as empty.
#[derive(Debug)]
pub struct StatsManager {
    data_dir: PathBuf,
    scores: HashMap<Difficulty, Vec<GameStats>>,
    global_stats: HashMap<Difficulty, GlobalStats>,
}

impl StatsManager {
    pub fn new() -> Self {
        Self::with_data_dir(Settings::data_dir())
    }

    pub fn with_data_dir(data_dir: impl Into<PathBuf>) -> Self {
        let data_dir = data_dir.into();
        if !data_dir.exists() {
            let _ = fs::create_dir_all(&data_dir);
        }

        let mut manager = Self {
            data_dir,
            scores: HashMap::new(),
            global_stats: HashMap::new(),
        };

        manager.load_all();
        manager
    }

    fn scores_path(&self, difficulty: Difficulty) -> PathBuf {
        self.data_dir.join(format!(
            "scores_{}.json",
            difficulty.to_string().to_lowercase()
        ))
    }

    fn global_stats_path(&self, difficulty: Difficulty) -> PathBuf {
        self.data_dir.join(format!(
            "global_stats_{}.json",
            difficulty.to_string().to_lowercase()
        ))
    }

    fn player_path(&self, name: &str) -> PathBuf {
        let slug: String = name
            .chars()
            .map(|c| {
                if c.is_ascii_alphanumeric() || c == '-' || c == '_' {
                    c.to_ascii_lowercase()
                } else {
                    '_'
                }
            })
            .collect();
        let slug = if slug.is_empty() { "player".to_string() } else { slug };
        self.data_dir.join(format!("player_{}.json", slug))
    }

    fn load_all(&mut self) {
        for difficulty in Difficulty::all() {
            let scores = read_json(&self.scores_path(difficulty)).unwrap_or_default();
            self.scores.insert(difficulty, scores);

            let global_stats =
                read_json(&self.global_stats_path(difficulty)).unwrap_or(GlobalStats {
                    difficulty,
                    ..Default::default()
                });
            self.global_stats.insert(difficulty, global_stats);
        }
    }

    fn save_scores(&self, difficulty: Difficulty) -> Result<()> {
        if let Some(scores) = self.scores.get(&difficulty) {
            let contents = serde_json::to_string_pretty(scores)?;
            fs::write(self.scores_path(difficulty), contents)?;
        }
        Ok(())
    }

    fn save_global_stats(&self, difficulty: Difficulty) -> Result<()> {
        if let Some(stats) = self.global_stats.get(&difficulty) {
            let contents = serde_json::to_string_pretty(stats)?;
            fs::write(self.global_stats_path(difficulty), contents)?;
        }
        Ok(())
    }

    pub fn record_game(&mut self, stats: &GameStats) -> Result<()> {
        let difficulty = stats.difficulty;

        let scores = self.scores.entry(difficulty).or_default();
        scores.push(stats.clone());
        // Highest score first; the earlier game wins a tie
        scores.sort_by(|a, b| {
            b.final_score
                .cmp(&a.final_score)
                .then(a.timestamp.cmp(&b.timestamp))
        });
        scores.truncate(MAX_HIGH_SCORES);

        let global_stats = self
            .global_stats
            .entry(difficulty)
            .or_insert_with(|| GlobalStats {
                difficulty,
                ..Default::default()
            });
        global_stats.total_games_played += 1;
        global_stats.total_time_played += stats.play_time;
        global_stats.total_matches += stats.matches_total;
        global_stats.best_score = global_stats.best_score.max(stats.final_score);

        self.save_scores(difficulty)?;
        self.save_global_stats(difficulty)?;
        info!(
            target: "stats",
            "Recorded {} game: score {}, level {}",
            difficulty, stats.final_score, stats.level_reached
        );

        Ok(())
    }

    pub fn get_high_scores(&self, difficulty: Difficulty, limit: usize) -> Vec<GameStats> {
        self.scores
            .get(&difficulty)
            .map(|scores| scores.iter().take(limit).cloned().collect())
            .unwrap_or_default()
    }

    pub fn get_global_stats(&self, difficulty: Difficulty) -> GlobalStats {
        self.global_stats
            .get(&difficulty)
            .cloned()
            .unwrap_or_else(|| GlobalStats {
                difficulty,
                ..Default::default()
            })
    }

    /// A player's saved history; missing or corrupt data yields an empty one.
    pub fn load_player(&self, name: &str) -> PlayerData {
        match read_json::<PlayerData>(&self.player_path(name)) {
            Some(data) if data.name == name => data,
            Some(data) => {
                warn!(
                    target: "stats",
                    "Player file for {:?} belongs to {:?}; starting fresh", name, data.name
                );
                PlayerData::new(name)
            }
            None => PlayerData::new(name),
        }
    }

    pub fn save_player(&self, data: &PlayerData) -> Result<()> {
        let contents = serde_json::to_string_pretty(data)?;
        fs::write(self.player_path(&data.name), contents)?;
        Ok(())
    }
}

impl Default for StatsManager {
    fn default() -> Self {
        Self::new()
    }
}

fn read_json<T: DeserializeOwned>(path: &Path) -> Option<T> {
    let contents = fs::read_to_string(path).ok()?;
    match serde_json::from_str(&contents) {
        Ok(value) => Some(value),
        Err(err) => {
            warn!(target: "stats", "Ignoring unreadable {:?}: {}", path, err);
            None
        }
    }
}
