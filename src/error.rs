use thiserror::Error;

/// Errors surfaced by the game core.
///
/// Invalid taps are not errors; the engine ignores them so a stale view never
/// breaks a session.
#[derive(Debug, Error)]
pub enum GameError {
    /// A deck needs at least one pair.
    #[error("Invalid tile count {0}: a deck needs at least 2 tiles")]
    InvalidTileCount(usize),

    /// The palette cannot supply one distinct color per pair (plus filler).
    #[error(
        "Insufficient palette: {tile_count} tiles need {required} distinct colors, \
         palette has {available}"
    )]
    InsufficientPalette {
        tile_count: usize,
        required: usize,
        available: usize,
    },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, GameError>;
