use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, Default)]
pub enum Difficulty {
    Relaxed,
    #[default]
    Classic,
    Strict,
}

impl Difficulty {
    pub fn all() -> Vec<Difficulty> {
        vec![Difficulty::Relaxed, Difficulty::Classic, Difficulty::Strict]
    }
}

impl std::fmt::Display for Difficulty {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Difficulty::Relaxed => "Relaxed",
            Difficulty::Classic => "Classic",
            Difficulty::Strict => "Strict",
        };
        write!(f, "{}", name)
    }
}
