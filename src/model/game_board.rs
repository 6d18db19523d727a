use itertools::Itertools;

use super::{Tile, TileId};

/// The live grid of tiles.
///
/// `generation` changes every time the grid is replaced, so anything keyed by
/// it (a deferred mismatch revert, a stale tap) can tell it belongs to a board
/// that no longer exists.
#[derive(Clone, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct GameBoard {
    tiles: Vec<Tile>,
    generation: u32,
}

impl std::fmt::Debug for GameBoard {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let cells = self.tiles.iter().map(|tile| tile.to_string()).join(" ");
        write!(f, "gen {}|{}|", self.generation, cells)
    }
}

impl GameBoard {
    /// Swap in a freshly generated deck and bump the generation.
    pub fn replace(&mut self, tiles: Vec<Tile>) {
        self.tiles = tiles;
        self.generation = self.generation.wrapping_add(1);
    }

    pub fn tiles(&self) -> &[Tile] {
        &self.tiles
    }

    pub fn generation(&self) -> u32 {
        self.generation
    }

    pub fn len(&self) -> usize {
        self.tiles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tiles.is_empty()
    }

    pub fn get(&self, id: TileId) -> Option<&Tile> {
        self.tiles.iter().find(|tile| tile.id == id)
    }

    fn get_mut(&mut self, id: TileId) -> Option<&mut Tile> {
        self.tiles.iter_mut().find(|tile| tile.id == id)
    }

    pub fn reveal(&mut self, id: TileId) -> bool {
        match self.get_mut(id) {
            Some(tile) if tile.is_selectable() => {
                tile.is_revealed = true;
                true
            }
            _ => false,
        }
    }

    /// Turn a revealed, unmatched tile face down again.
    pub fn hide(&mut self, id: TileId) -> bool {
        match self.get_mut(id) {
            Some(tile) if tile.is_revealed && !tile.is_matched => {
                tile.is_revealed = false;
                true
            }
            _ => false,
        }
    }

    pub fn mark_matched(&mut self, id: TileId) {
        if let Some(tile) = self.get_mut(id) {
            tile.is_revealed = true;
            tile.is_matched = true;
        }
    }

    /// No two unmatched tiles share a color, so nothing left on the board can
    /// be matched. A lone filler tile does not keep a board open.
    pub fn is_cleared(&self) -> bool {
        self.tiles
            .iter()
            .filter(|tile| !tile.is_matched)
            .map(|tile| tile.color)
            .counts()
            .values()
            .all(|&count| count < 2)
    }

    #[cfg(test)]
    /// Parse a board of the form "1:red 2:blue+ 3:red 4:blue*" (see `Tile::parse`)
    pub fn parse(input: &str, generation: u32) -> Self {
        let tiles = input.split_whitespace().map(Tile::parse).collect();
        Self { tiles, generation }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Color;

    #[test]
    fn test_parse_board() {
        let board = GameBoard::parse("1:red 2:blue+ 3:red 4:blue*", 7);
        assert_eq!(board.len(), 4);
        assert_eq!(board.generation(), 7);
        assert_eq!(board.get(TileId(3)).unwrap().color, Color::Red);
        assert!(board.get(TileId(2)).unwrap().is_revealed);
        assert!(board.get(TileId(4)).unwrap().is_matched);
        assert!(board.get(TileId(9)).is_none());
    }

    #[test]
    fn test_reveal_only_selectable_tiles() {
        let mut board = GameBoard::parse("1:red 2:blue+ 3:red 4:blue*", 0);
        assert!(board.reveal(TileId(1)));
        assert!(!board.reveal(TileId(1)), "already revealed");
        assert!(!board.reveal(TileId(4)), "already matched");
        assert!(!board.reveal(TileId(42)), "unknown id");
    }

    #[test]
    fn test_hide_never_touches_matched_tiles() {
        let mut board = GameBoard::parse("1:red+ 2:red*", 0);
        assert!(board.hide(TileId(1)));
        assert!(!board.get(TileId(1)).unwrap().is_revealed);
        assert!(!board.hide(TileId(2)));
        assert!(board.get(TileId(2)).unwrap().is_revealed);
    }

    #[test]
    fn test_is_cleared() {
        let board = GameBoard::parse("1:red* 2:red* 3:blue 4:blue", 0);
        assert!(!board.is_cleared());

        let board = GameBoard::parse("1:red* 2:red* 3:blue* 4:blue*", 0);
        assert!(board.is_cleared());

        // the filler of an odd board has no partner
        let board = GameBoard::parse("1:red* 2:red* 3:green", 0);
        assert!(board.is_cleared());
    }

    #[test]
    fn test_replace_bumps_generation() {
        let mut board = GameBoard::parse("1:red 2:red", 3);
        board.replace(vec![Tile::parse("5:teal"), Tile::parse("6:teal")]);
        assert_eq!(board.generation(), 4);
        assert_eq!(board.tiles()[0].id, TileId(5));
    }
}
