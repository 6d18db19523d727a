use serde::{Deserialize, Serialize};

use super::Color;

#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Deserialize, Serialize)]
pub struct TileId(pub u64);

impl std::fmt::Display for TileId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "#{}", self.0)
    }
}

impl std::fmt::Debug for TileId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "#{}", self.0)
    }
}

#[derive(Clone, Copy, PartialEq, Eq, Hash, Deserialize, Serialize)]
pub struct Tile {
    pub id: TileId,
    pub color: Color,
    pub is_revealed: bool,
    pub is_matched: bool,
}

impl Tile {
    pub fn new(id: TileId, color: Color) -> Self {
        Self {
            id,
            color,
            is_revealed: false,
            is_matched: false,
        }
    }

    /// Can this tile still take part in a selection?
    pub fn is_selectable(&self) -> bool {
        !self.is_matched && !self.is_revealed
    }

    #[cfg(test)]
    /// Parse a tile from a string of the form "3:red", "4:red+" (revealed) or "5:red*" (matched)
    pub fn parse(s: &str) -> Self {
        let (id, rest) = s.split_once(':').unwrap();
        let id = TileId(id.parse().unwrap());
        let (name, is_revealed, is_matched) = if let Some(name) = rest.strip_suffix('*') {
            (name, true, true)
        } else if let Some(name) = rest.strip_suffix('+') {
            (name, true, false)
        } else {
            (rest, false, false)
        };
        let color = Color::all()
            .into_iter()
            .find(|c| c.name() == name)
            .unwrap();
        Self {
            id,
            color,
            is_revealed,
            is_matched,
        }
    }
}

impl std::fmt::Display for Tile {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let marker = if self.is_matched {
            "*"
        } else if self.is_revealed {
            "+"
        } else {
            ""
        };
        write!(f, "{}:{}{}", self.id.0, self.color, marker)
    }
}

impl std::fmt::Debug for Tile {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self)
    }
}
