mod color;
mod difficulty;
mod game_board;
mod game_config;
mod game_engine_command;
mod game_engine_event;
mod game_state;
pub mod game_state_snapshot;
mod game_stats;
mod match_result;
mod round_record;
mod tile;
mod timer_state;

pub use color::Color;
pub use difficulty::Difficulty;
pub use game_board::GameBoard;
pub use game_config::{GameConfig, MismatchPolicy};
pub use game_engine_command::{GameEngineCommand, SettingsChange};
pub use game_engine_event::GameEngineEvent;
pub use game_state::{GamePhase, GameState};
pub use game_state_snapshot::GameStateSnapshot;
pub use game_stats::{GameStats, GlobalStats};
pub use match_result::{MatchResult, RevertToken};
pub use round_record::{PlayerData, RoundRecord};
pub use tile::{Tile, TileId};
pub use timer_state::TimerState;
