pub mod deck;
pub mod evaluator;
pub mod game_engine;
pub mod selection;
pub mod session;
pub mod settings;
pub mod stats_manager;
pub mod timer_driver;

pub use deck::DeckGenerator;
pub use game_engine::GameEngine;
pub use selection::{SelectionOutcome, SelectionTracker};
pub use session::{Session, SnapshotProjection};
pub use settings::Settings;
pub use stats_manager::StatsManager;
pub use timer_driver::{SessionInput, TimerDriver};
