use super::{Difficulty, MismatchPolicy, RevertToken, TileId};

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SettingsChange {
    pub difficulty: Option<Difficulty>,
    pub mismatch_policy: Option<MismatchPolicy>,
    pub player_name: Option<String>,
}

/// Everything that can mutate a session. The engine applies these one at a
/// time, in arrival order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GameEngineCommand {
    StartGame,
    Restart,
    Tap(TileId),
    Tick,
    RevertMismatch(RevertToken),
    Pause,
    Resume,
    InitDisplay,
    ChangeSettings(SettingsChange),
}
