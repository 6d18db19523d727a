use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Color {
    Red,
    Blue,
    Green,
    Yellow,
    Orange,
    Purple,
    Pink,
    Brown,
    Cyan,
    Mint,
    Indigo,
    Teal,
    Gray,
}

impl Color {
    /// The full palette, in declaration order.
    pub fn all() -> Vec<Color> {
        vec![
            Color::Red,
            Color::Blue,
            Color::Green,
            Color::Yellow,
            Color::Orange,
            Color::Purple,
            Color::Pink,
            Color::Brown,
            Color::Cyan,
            Color::Mint,
            Color::Indigo,
            Color::Teal,
            Color::Gray,
        ]
    }

    pub fn name(&self) -> &'static str {
        match self {
            Color::Red => "red",
            Color::Blue => "blue",
            Color::Green => "green",
            Color::Yellow => "yellow",
            Color::Orange => "orange",
            Color::Purple => "purple",
            Color::Pink => "pink",
            Color::Brown => "brown",
            Color::Cyan => "cyan",
            Color::Mint => "mint",
            Color::Indigo => "indigo",
            Color::Teal => "teal",
            Color::Gray => "gray",
        }
    }
}

impl std::fmt::Display for Color {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name())
    }
}
