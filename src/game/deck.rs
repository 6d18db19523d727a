use log::trace;
use rand::seq::SliceRandom;
use rand::Rng;

use crate::error::{GameError, Result};
use crate::model::{Color, Tile, TileId};

/// Builds shuffled decks where every color forms exactly one pair.
///
/// An odd tile count gets one extra filler tile in a color of its own, so it
/// can never be matched. Tile ids come from a counter owned by the generator
/// and are never handed out twice.
#[derive(Debug, Default)]
pub struct DeckGenerator {
    next_id: u64,
}

impl DeckGenerator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn generate<R: Rng + ?Sized>(
        &mut self,
        tile_count: usize,
        palette: &[Color],
        rng: &mut R,
    ) -> Result<Vec<Tile>> {
        if tile_count < 2 {
            return Err(GameError::InvalidTileCount(tile_count));
        }

        let mut colors = palette.to_vec();
        colors.sort();
        colors.dedup();

        let pair_count = tile_count / 2;
        let required = tile_count.div_ceil(2);
        if colors.len() < required {
            return Err(GameError::InsufficientPalette {
                tile_count,
                required,
                available: colors.len(),
            });
        }

        colors.shuffle(rng);
        colors.truncate(required);

        let mut tiles: Vec<Tile> = Vec::with_capacity(tile_count);
        for &color in &colors[..pair_count] {
            tiles.push(Tile::new(self.allocate_id(), color));
            tiles.push(Tile::new(self.allocate_id(), color));
        }
        if tile_count % 2 == 1 {
            let filler = colors[pair_count];
            tiles.push(Tile::new(self.allocate_id(), filler));
        }

        tiles.shuffle(rng);
        trace!(target: "deck", "Generated deck: {:?}", tiles);
        Ok(tiles)
    }

    fn allocate_id(&mut self) -> TileId {
        let id = TileId(self.next_id);
        self.next_id += 1;
        id
    }
}
