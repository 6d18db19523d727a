use log::{debug, error, info, trace};
use rand::rngs::StdRng;
use rand::{RngCore, SeedableRng};
use std::cell::RefCell;
use std::rc::Rc;
use std::time::SystemTime;
use uuid::Uuid;

use super::deck::DeckGenerator;
use super::evaluator;
use super::selection::{SelectionOutcome, SelectionTracker};
use super::settings::Settings;
use crate::destroyable::Destroyable;
use crate::error::Result;
use crate::events::{EventEmitter, EventObserver, Unsubscriber};
use crate::model::{
    GameBoard, GameConfig, GameEngineCommand, GameEngineEvent, GamePhase, GameState,
    GameStateSnapshot, GameStats, MatchResult, MismatchPolicy, PlayerData, RevertToken,
    SettingsChange, TileId, TimerState,
};

/// The round/level controller.
///
/// Owns the board, score, countdown and round history of one session. All
/// mutation goes through `handle_command`; every accepted change is published
/// as a `GameStateSnapshot`. Commands that arrive while the game is not
/// running are dropped without touching state.
pub struct GameEngine {
    config: GameConfig,
    /// Applied by the next `StartGame`/`Restart`, never mid-game.
    pending_config: Option<GameConfig>,
    settings: Settings,
    board: GameBoard,
    state: GameState,
    timer_state: TimerState,
    selection: SelectionTracker,
    deck: DeckGenerator,
    rng: Box<dyn RngCore>,
    seed: u64,
    player: PlayerData,
    message: Option<String>,
    debug_mode: bool,
    current_playthrough_id: Uuid,
    subscription_id: Option<Unsubscriber<GameEngineCommand>>,
    game_engine_event_emitter: EventEmitter<GameEngineEvent>,
}

impl Destroyable for GameEngine {
    fn destroy(&mut self) {
        if let Some(subscription_id) = self.subscription_id.take() {
            subscription_id.unsubscribe();
        }
    }
}

impl GameEngine {
    pub fn new(
        game_engine_command_observer: EventObserver<GameEngineCommand>,
        game_engine_event_emitter: EventEmitter<GameEngineEvent>,
        settings: Settings,
        player: PlayerData,
        seed: Option<u64>,
    ) -> Rc<RefCell<Self>> {
        let seed = seed.unwrap_or_else(|| rand::rng().next_u64());
        let game_engine = Self {
            config: settings.game_config(),
            pending_config: None,
            settings,
            board: GameBoard::default(),
            state: GameState::default(),
            timer_state: TimerState::default(),
            selection: SelectionTracker::new(),
            deck: DeckGenerator::new(),
            rng: Box::new(StdRng::seed_from_u64(seed)),
            seed,
            player,
            message: None,
            debug_mode: Settings::is_debug_mode(),
            current_playthrough_id: Uuid::new_v4(),
            subscription_id: None,
            game_engine_event_emitter,
        };
        let refcell = Rc::new(RefCell::new(game_engine));
        GameEngine::wire_subscription(refcell.clone(), game_engine_command_observer);
        refcell
    }

    fn wire_subscription(
        game_engine: Rc<RefCell<Self>>,
        game_engine_command_observer: EventObserver<GameEngineCommand>,
    ) {
        let handler = game_engine.clone();
        let subscription_id = game_engine_command_observer.subscribe(move |command| {
            let mut game_engine = handler.borrow_mut();
            game_engine.handle_command(command.clone());
        });
        game_engine.borrow_mut().subscription_id = Some(subscription_id);
    }

    /// Swap the random source used for every later deck.
    pub fn set_rng(&mut self, rng: Box<dyn RngCore>) {
        self.rng = rng;
    }

    /// Takes effect on the next `StartGame`/`Restart`.
    pub fn set_config(&mut self, config: GameConfig) {
        self.pending_config = Some(config);
    }

    pub fn seed(&self) -> u64 {
        self.seed
    }

    pub fn phase(&self) -> GamePhase {
        self.state.phase
    }

    pub fn handle_command(&mut self, command: GameEngineCommand) {
        trace!(target: "game_engine", "Handling command: {:?}", command);
        match command {
            GameEngineCommand::StartGame | GameEngineCommand::Restart => self.start_game(),
            GameEngineCommand::Tap(tile_id) => self.handle_tap(tile_id),
            GameEngineCommand::Tick => self.handle_tick(),
            GameEngineCommand::RevertMismatch(token) => self.revert_mismatch(token),
            GameEngineCommand::Pause => self.pause_game(),
            GameEngineCommand::Resume => self.resume_game(),
            GameEngineCommand::InitDisplay => self.sync_board_display(),
            GameEngineCommand::ChangeSettings(change) => self.change_settings(change),
        }
    }

    fn start_game(&mut self) {
        if let Some(config) = self.pending_config.take() {
            self.config = config;
        }
        let tile_count = self.config.tile_count_for_level(1);
        let tiles = match self
            .deck
            .generate(tile_count, &self.config.palette, self.rng.as_mut())
        {
            Ok(tiles) => tiles,
            Err(err) => {
                error!(target: "game_engine", "Cannot start game: {}", err);
                self.message = Some(err.to_string());
                self.sync_board_display();
                return;
            }
        };

        info!(
            target: "game_engine",
            "New game; difficulty: {}; seed: {}; tiles: {}",
            self.config.difficulty, self.seed, tile_count
        );
        self.board.replace(tiles);
        self.state = GameState::fresh(tile_count);
        self.timer_state = TimerState::new(self.config.time_budget_secs, SystemTime::now());
        self.selection.clear();
        self.current_playthrough_id = Uuid::new_v4();
        self.message = Some("Find the pairs!".to_string());
        self.log_board();

        self.game_engine_event_emitter
            .emit(GameEngineEvent::TimerStateChanged(self.timer_state.clone()));
        self.sync_board_display();
    }

    fn accepting_input(&self) -> bool {
        self.state.is_playing() && !self.timer_state.is_paused()
    }

    fn handle_tap(&mut self, tile_id: TileId) {
        let accepting = self.accepting_input();
        match self.selection.select(&mut self.board, tile_id, accepting) {
            SelectionOutcome::Ignored => (),
            SelectionOutcome::FirstSelected(_) => {
                self.message = None;
                self.sync_board_display();
            }
            SelectionOutcome::PairReady(first, second) => {
                self.selection.clear();
                self.evaluate_pair(first, second);
                self.sync_board_display();
            }
        }
    }

    fn evaluate_pair(&mut self, first: TileId, second: TileId) {
        let (Some(first_tile), Some(second_tile)) = (self.board.get(first), self.board.get(second))
        else {
            return;
        };
        let result = evaluator::evaluate(first_tile, second_tile);
        trace!(
            target: "game_engine",
            "{:?} vs {:?}: {:?}", first_tile, second_tile, result
        );
        let revert_token = evaluator::apply(&mut self.board, first, second, result);

        match (result, revert_token) {
            (MatchResult::Matched, _) => self.record_match(),
            (MatchResult::Mismatched, Some(token)) => self.record_mismatch(token),
            (MatchResult::Mismatched, None) => (),
        }
    }

    fn record_match(&mut self) {
        self.state.matches_this_round += 1;
        self.state.matches_total += 1;
        self.state.score += self.config.match_unit_value;
        self.message = Some("Match!".to_string());

        if self.state.matches_this_round >= self.config.match_goal {
            self.advance_level();
        } else if self.board.is_cleared() {
            self.refill_board();
        }
    }

    fn record_mismatch(&mut self, token: RevertToken) {
        match self.config.mismatch_policy {
            MismatchPolicy::RevertAndContinue => {
                self.message = Some("No match".to_string());
                self.game_engine_event_emitter
                    .emit(GameEngineEvent::MismatchRevertScheduled {
                        token,
                        delay: self.config.revert_delay,
                    });
            }
            MismatchPolicy::EndRoundOnMismatch => {
                self.state.phase = GamePhase::RoundComplete;
                self.finish_game("Wrong pair! Game over.");
            }
        }
    }

    fn advance_level(&mut self) {
        self.state.phase = GamePhase::RoundComplete;
        self.close_round();

        let time_bonus = self
            .timer_state
            .remaining_secs
            .saturating_sub(self.config.bonus_threshold_secs);
        self.state.score += time_bonus;
        self.state.level += 1;
        self.state.matches_this_round = 0;
        self.state.grid_tile_count = self.config.tile_count_for_level(self.state.level);

        if let Err(err) = self.regenerate_board() {
            error!(target: "game_engine", "Cannot build level {}: {}", self.state.level, err);
            self.finish_game("Out of tiles! Game over.");
            return;
        }

        self.timer_state = self
            .timer_state
            .replenished(self.config.level_time_budget());
        self.state.phase = GamePhase::Playing;
        self.message = Some(format!("Level {}!", self.state.level));
        info!(
            target: "game_engine",
            "Advanced to level {} ({} tiles, +{} time bonus)",
            self.state.level, self.state.grid_tile_count, time_bonus
        );

        self.game_engine_event_emitter
            .emit(GameEngineEvent::LevelAdvanced {
                level: self.state.level,
                tile_count: self.state.grid_tile_count,
                time_bonus,
            });
        self.game_engine_event_emitter
            .emit(GameEngineEvent::TimerStateChanged(self.timer_state.clone()));
    }

    /// Every pair on the board is gone but the goal is not reached yet: deal a
    /// new board at the same level, keeping score and counters.
    fn refill_board(&mut self) {
        if let Err(err) = self.regenerate_board() {
            error!(target: "game_engine", "Cannot refill board: {}", err);
            self.finish_game("Out of tiles! Game over.");
            return;
        }
        debug!(target: "game_engine", "Board refilled at level {}", self.state.level);
        self.message = Some("Board cleared, here's more!".to_string());
        self.game_engine_event_emitter
            .emit(GameEngineEvent::BoardRefilled {
                generation: self.board.generation(),
            });
    }

    fn regenerate_board(&mut self) -> Result<()> {
        let tiles = self.deck.generate(
            self.state.grid_tile_count,
            &self.config.palette,
            self.rng.as_mut(),
        )?;
        self.board.replace(tiles);
        self.selection.clear();
        self.log_board();
        Ok(())
    }

    fn revert_mismatch(&mut self, token: RevertToken) {
        if !self.state.is_playing() {
            return;
        }
        if evaluator::revert(&mut self.board, &token) {
            self.sync_board_display();
        } else {
            trace!(target: "game_engine", "Dropping stale revert {:?}", token);
        }
    }

    fn handle_tick(&mut self) {
        if !self.accepting_input() {
            return;
        }
        self.timer_state = self.timer_state.ticked();
        self.game_engine_event_emitter
            .emit(GameEngineEvent::TimerStateChanged(self.timer_state.clone()));

        if self.timer_state.is_expired() {
            self.finish_game("Time's up!");
        }
        self.sync_board_display();
    }

    fn close_round(&mut self) {
        let record = self
            .player
            .push_round(self.state.matches_this_round, self.state.score);
        self.game_engine_event_emitter
            .emit(GameEngineEvent::RoundCompleted(record));
    }

    fn finish_game(&mut self, message: &str) {
        self.close_round();
        self.state.round_over = true;
        self.state.game_over = true;
        self.state.phase = GamePhase::GameComplete;
        self.selection.clear();
        self.timer_state = self.timer_state.ended(SystemTime::now());
        self.message = Some(message.to_string());
        info!(
            target: "game_engine",
            "Game over at level {} with score {}", self.state.level, self.state.score
        );

        self.game_engine_event_emitter
            .emit(GameEngineEvent::TimerStateChanged(self.timer_state.clone()));
        self.game_engine_event_emitter
            .emit(GameEngineEvent::GameCompleted(self.get_game_stats()));
    }

    fn pause_game(&mut self) {
        if self.state.is_playing() && !self.timer_state.is_paused() {
            self.timer_state = self.timer_state.paused(SystemTime::now());
            self.message = Some("Paused".to_string());
            self.game_engine_event_emitter
                .emit(GameEngineEvent::TimerStateChanged(self.timer_state.clone()));
            self.sync_board_display();
        }
    }

    fn resume_game(&mut self) {
        if self.timer_state.is_paused() {
            self.timer_state = self.timer_state.resumed(SystemTime::now());
            self.message = None;
            self.game_engine_event_emitter
                .emit(GameEngineEvent::TimerStateChanged(self.timer_state.clone()));
            self.sync_board_display();
        }
    }

    fn change_settings(&mut self, change: SettingsChange) {
        self.settings.apply(&change);
        self.pending_config = Some(self.settings.game_config());
        if let Some(name) = change.player_name {
            if name != self.player.name {
                self.player = PlayerData::new(name);
            }
        }
        self.game_engine_event_emitter
            .emit(GameEngineEvent::SettingsChanged(self.settings.clone()));
    }

    fn sync_board_display(&mut self) {
        self.game_engine_event_emitter
            .emit(GameEngineEvent::SnapshotUpdated(self.snapshot()));
    }

    fn log_board(&self) {
        if self.debug_mode {
            debug!(target: "game_engine", "Board: {:?}", self.board);
        }
    }

    pub fn snapshot(&self) -> GameStateSnapshot {
        GameStateSnapshot::capture(
            &self.board,
            &self.state,
            &self.timer_state,
            self.message.clone(),
        )
    }

    pub fn get_game_stats(&self) -> GameStats {
        GameStats {
            final_score: self.state.score,
            level_reached: self.state.level,
            matches_total: self.state.matches_total,
            rounds_completed: self.state.level.saturating_sub(1),
            play_time: self.timer_state.elapsed(),
            difficulty: self.config.difficulty,
            timestamp: chrono::Utc::now().timestamp(),
            playthrough_id: self.current_playthrough_id,
        }
    }

    /// The persistence blob: player name plus every round closed so far.
    pub fn player_data(&self) -> PlayerData {
        self.player.clone()
    }

    #[cfg(test)]
    pub(crate) fn set_board(&mut self, input: &str) {
        let parsed = GameBoard::parse(input, 0);
        self.board.replace(parsed.tiles().to_vec());
        self.state.grid_tile_count = self.board.len();
        self.selection.clear();
    }
}
