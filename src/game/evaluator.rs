use crate::model::{GameBoard, MatchResult, RevertToken, Tile, TileId};

/// Exact color equality; symmetric and free of side effects.
pub fn evaluate(first: &Tile, second: &Tile) -> MatchResult {
    if first.color == second.color {
        MatchResult::Matched
    } else {
        MatchResult::Mismatched
    }
}

/// Apply the flag changes for an evaluated pair.
///
/// A match locks both tiles face up. A mismatch leaves them revealed and hands
/// back the token for the deferred flip; scoring and round decisions belong to
/// the engine.
pub fn apply(
    board: &mut GameBoard,
    first: TileId,
    second: TileId,
    result: MatchResult,
) -> Option<RevertToken> {
    match result {
        MatchResult::Matched => {
            board.mark_matched(first);
            board.mark_matched(second);
            None
        }
        MatchResult::Mismatched => Some(RevertToken {
            generation: board.generation(),
            tiles: [first, second],
        }),
    }
}

/// Flip a mismatched pair back, unless the token is from a replaced board.
pub fn revert(board: &mut GameBoard, token: &RevertToken) -> bool {
    if token.generation != board.generation() {
        return false;
    }
    let mut reverted = false;
    for id in token.tiles {
        reverted |= board.hide(id);
    }
    reverted
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Color;

    #[test]
    fn test_evaluate_is_symmetric() {
        let colors = Color::all();
        for (i, &a) in colors.iter().enumerate() {
            for (j, &b) in colors.iter().enumerate() {
                let first = Tile::new(TileId(i as u64), a);
                let second = Tile::new(TileId(100 + j as u64), b);
                assert_eq!(evaluate(&first, &second), evaluate(&second, &first));
                assert_eq!(evaluate(&first, &second) == MatchResult::Matched, a == b);
            }
        }
    }

    #[test]
    fn test_apply_match_locks_tiles() {
        let mut board = GameBoard::parse("1:red+ 2:blue 3:red+ 4:blue", 0);
        let token = apply(&mut board, TileId(1), TileId(3), MatchResult::Matched);
        assert!(token.is_none());
        for id in [1, 3] {
            let tile = board.get(TileId(id)).unwrap();
            assert!(tile.is_matched);
            assert!(tile.is_revealed);
        }
    }

    #[test]
    fn test_mismatch_reverts_on_same_generation() {
        let mut board = GameBoard::parse("1:red+ 2:blue+ 3:red 4:blue", 5);
        let token = apply(&mut board, TileId(1), TileId(2), MatchResult::Mismatched).unwrap();
        assert_eq!(token.generation, 5);
        assert!(board.get(TileId(1)).unwrap().is_revealed, "stays up until reverted");

        assert!(revert(&mut board, &token));
        assert!(!board.get(TileId(1)).unwrap().is_revealed);
        assert!(!board.get(TileId(2)).unwrap().is_revealed);
    }

    #[test]
    fn test_stale_revert_is_inert() {
        let mut board = GameBoard::parse("1:red+ 2:blue+", 5);
        let token = RevertToken {
            generation: 4,
            tiles: [TileId(1), TileId(2)],
        };
        assert!(!revert(&mut board, &token));
        assert!(board.get(TileId(1)).unwrap().is_revealed);
    }
}
