use log::trace;

use crate::model::{GameBoard, TileId};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SelectionOutcome {
    Ignored,
    FirstSelected(TileId),
    PairReady(TileId, TileId),
}

/// Holds the face-up tiles waiting for a match check. Never more than two.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct SelectionTracker {
    buffer: Vec<TileId>,
}

impl SelectionTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Tapping the tile that is already selected counts as a revealed tile
    /// and is ignored, never toggled off.
    pub fn select(&mut self, board: &mut GameBoard, id: TileId, accepting: bool) -> SelectionOutcome {
        if !accepting || self.buffer.len() >= 2 {
            trace!(target: "selection", "Ignoring {}: not accepting taps", id);
            return SelectionOutcome::Ignored;
        }
        if !board.reveal(id) {
            trace!(target: "selection", "Ignoring {}: unknown, revealed or matched", id);
            return SelectionOutcome::Ignored;
        }

        self.buffer.push(id);
        match self.buffer[..] {
            [first] => SelectionOutcome::FirstSelected(first),
            [first, second] => SelectionOutcome::PairReady(first, second),
            _ => unreachable!("selection buffer holds at most two tiles"),
        }
    }

    pub fn selected(&self) -> &[TileId] {
        &self.buffer
    }

    pub fn clear(&mut self) {
        self.buffer.clear();
    }
}
