use std::time::Duration;

use super::{GameStateSnapshot, GameStats, RevertToken, RoundRecord, TimerState};
use crate::game::settings::Settings;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GameEngineEvent {
    /// Published after every accepted mutation.
    SnapshotUpdated(GameStateSnapshot),
    /// Two tiles did not match; the host should send
    /// `GameEngineCommand::RevertMismatch(token)` after `delay`.
    MismatchRevertScheduled {
        token: RevertToken,
        delay: Duration,
    },
    RoundCompleted(RoundRecord),
    LevelAdvanced {
        level: u32,
        tile_count: usize,
        time_bonus: u32,
    },
    BoardRefilled {
        generation: u32,
    },
    TimerStateChanged(TimerState),
    GameCompleted(GameStats),
    SettingsChanged(Settings),
}
