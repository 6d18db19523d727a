use super::TileId;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MatchResult {
    Matched,
    Mismatched,
}

/// Handle for a deferred "flip these two back" action.
///
/// Only honoured while the board still has the same generation; a token from
/// a replaced grid is inert.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct RevertToken {
    pub generation: u32,
    pub tiles: [TileId; 2],
}
