mod destroyable;
pub mod error;
pub mod events;
pub mod game;
pub mod model;

pub use error::{GameError, Result};
