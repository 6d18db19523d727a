use log::{info, trace, warn};
use std::cell::RefCell;
use std::rc::Rc;
use std::time::Duration;
use tokio::sync::mpsc::{self, UnboundedReceiver, UnboundedSender};
use tokio::task::JoinHandle;

use super::game_engine::GameEngine;
use super::settings::Settings;
use super::timer_driver::{SessionInput, TimerDriver};
use crate::destroyable::Destroyable;
use crate::events::{Channel, EventEmitter, EventHandler, EventObserver, Unsubscriber};
use crate::model::{
    GameEngineCommand, GameEngineEvent, GamePhase, GameStateSnapshot, GameStats, PlayerData,
    RevertToken,
};

const DEFAULT_TICK_PERIOD: Duration = Duration::from_secs(1);

/// Keeps the most recent snapshot the engine published.
#[derive(Debug, Default)]
pub struct SnapshotProjection {
    latest: Option<GameStateSnapshot>,
}

impl SnapshotProjection {
    pub fn latest(&self) -> Option<&GameStateSnapshot> {
        self.latest.as_ref()
    }
}

impl EventHandler<GameEngineEvent> for SnapshotProjection {
    fn handle_event(&mut self, event: &GameEngineEvent) {
        if let GameEngineEvent::SnapshotUpdated(snapshot) = event {
            self.latest = Some(snapshot.clone());
        }
    }
}

/// Work the engine asked for while a command was being handled. Drained by
/// the session once the engine borrow has been released.
#[derive(Debug, Default)]
struct SessionInbox {
    pending_reverts: Vec<(RevertToken, Duration)>,
    level_advanced: bool,
    completed: Option<GameStats>,
}

impl EventHandler<GameEngineEvent> for SessionInbox {
    fn handle_event(&mut self, event: &GameEngineEvent) {
        match event {
            GameEngineEvent::MismatchRevertScheduled { token, delay } => {
                self.pending_reverts.push((*token, *delay));
            }
            GameEngineEvent::LevelAdvanced { .. } => {
                self.level_advanced = true;
            }
            GameEngineEvent::GameCompleted(stats) => {
                self.completed = Some(stats.clone());
            }
            _ => {}
        }
    }
}

/// Serializes host input, timer pulses and deferred reverts onto one engine.
pub struct Session {
    engine: Rc<RefCell<GameEngine>>,
    commands: EventEmitter<GameEngineCommand>,
    events: EventObserver<GameEngineEvent>,
    sender: UnboundedSender<SessionInput>,
    receiver: UnboundedReceiver<SessionInput>,
    tick_period: Duration,
    timer: Option<TimerDriver>,
    timer_epoch: u64,
    reverts: Vec<JoinHandle<()>>,
    projection: Rc<RefCell<SnapshotProjection>>,
    inbox: Rc<RefCell<SessionInbox>>,
    subscription: Option<Unsubscriber<GameEngineEvent>>,
}

impl Session {
    pub fn new(settings: Settings, player: PlayerData, seed: Option<u64>) -> Self {
        let (commands, command_observer) = Channel::<GameEngineCommand>::new();
        let (event_emitter, events) = Channel::<GameEngineEvent>::new();
        let engine = GameEngine::new(command_observer, event_emitter, settings, player, seed);
        let (sender, receiver) = mpsc::unbounded_channel();

        let projection = Rc::new(RefCell::new(SnapshotProjection::default()));
        let inbox = Rc::new(RefCell::new(SessionInbox::default()));
        let subscription = {
            let projection = projection.clone();
            let inbox = inbox.clone();
            events.subscribe(move |event: &GameEngineEvent| {
                projection.borrow_mut().handle_event(event);
                inbox.borrow_mut().handle_event(event);
            })
        };

        Self {
            engine,
            commands,
            events,
            sender,
            receiver,
            tick_period: DEFAULT_TICK_PERIOD,
            timer: None,
            timer_epoch: 0,
            reverts: Vec::new(),
            projection,
            inbox,
            subscription: Some(subscription),
        }
    }

    pub fn with_tick_period(mut self, tick_period: Duration) -> Self {
        self.tick_period = tick_period;
        self
    }

    pub fn engine(&self) -> Rc<RefCell<GameEngine>> {
        self.engine.clone()
    }

    /// Engine events, for renderers and other observers. Listeners must not
    /// borrow the engine; they may queue input through `sender()`.
    pub fn events(&self) -> EventObserver<GameEngineEvent> {
        self.events.clone()
    }

    pub fn sender(&self) -> UnboundedSender<SessionInput> {
        self.sender.clone()
    }

    pub fn latest_snapshot(&self) -> Option<GameStateSnapshot> {
        self.projection.borrow().latest().cloned()
    }

    /// Drive the engine until a game completes, returning its stats. Returns
    /// `None` when the engine refuses to start a game.
    pub async fn run_until_complete(&mut self) -> Option<GameStats> {
        while let Some(input) = self.receiver.recv().await {
            match input {
                SessionInput::Command(command) => {
                    if !self.dispatch(command) {
                        warn!(target: "session", "Engine did not start a game; ending session");
                        return None;
                    }
                }
                SessionInput::Timer { epoch } if epoch == self.timer_epoch => {
                    self.dispatch(GameEngineCommand::Tick);
                }
                SessionInput::Timer { epoch } => {
                    trace!(target: "session", "Dropping pulse from timer epoch {}", epoch);
                }
            }

            let completed = self.inbox.borrow_mut().completed.take();
            if let Some(stats) = completed {
                self.stop_timers();
                info!(
                    target: "session",
                    "Session finished with score {} at level {}",
                    stats.final_score, stats.level_reached
                );
                return Some(stats);
            }
        }
        None
    }

    /// Apply one command. Returns false when a start/restart left no game
    /// running.
    fn dispatch(&mut self, command: GameEngineCommand) -> bool {
        let restarts = matches!(
            command,
            GameEngineCommand::StartGame | GameEngineCommand::Restart
        );
        self.commands.emit(command);

        let level_advanced = std::mem::take(&mut self.inbox.borrow_mut().level_advanced);
        if restarts {
            self.stop_timers();
            let phase = self.engine.borrow().phase();
            if phase != GamePhase::Playing {
                return false;
            }
            self.start_timer();
        } else if level_advanced {
            // the new level's budget counts from a fresh period
            self.start_timer();
        }

        let reverts = std::mem::take(&mut self.inbox.borrow_mut().pending_reverts);
        for (token, delay) in reverts {
            trace!(target: "session", "Reverting {:?} in {:?}", token, delay);
            self.reverts.push(TimerDriver::schedule_once(
                self.sender.clone(),
                delay,
                SessionInput::Command(GameEngineCommand::RevertMismatch(token)),
            ));
        }
        self.reverts.retain(|handle| !handle.is_finished());
        true
    }

    fn start_timer(&mut self) {
        if let Some(mut timer) = self.timer.take() {
            timer.cancel();
        }
        self.timer_epoch += 1;
        self.timer = Some(TimerDriver::spawn(
            self.sender.clone(),
            self.tick_period,
            self.timer_epoch,
        ));
    }

    fn stop_timers(&mut self) {
        if let Some(mut timer) = self.timer.take() {
            timer.cancel();
        }
        for handle in self.reverts.drain(..) {
            handle.abort();
        }
    }
}

impl Destroyable for Session {
    fn destroy(&mut self) {
        self.stop_timers();
        if let Some(subscription) = self.subscription.take() {
            subscription.unsubscribe();
        }
        self.engine.borrow_mut().destroy();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game::stats_manager::StatsManager;
    use crate::model::{Color, GameConfig, Tile, TileId};
    use crate::tests::init_logger;
    use std::cell::Cell;
    use tempfile::tempdir;
    use tokio::time::{self, Instant};

    fn session(time_budget_secs: u32) -> Session {
        let session = Session::new(Settings::default(), PlayerData::new("tester"), Some(11));
        session.engine().borrow_mut().set_config(GameConfig {
            time_budget_secs,
            starting_tile_count: 6,
            match_goal: 3,
            ..GameConfig::default()
        });
        session
    }

    fn start(session: &Session) {
        session
            .sender()
            .send(SessionInput::Command(GameEngineCommand::StartGame))
            .unwrap();
    }

    #[tokio::test(start_paused = true)]
    async fn test_timer_runs_game_to_timeout() {
        init_logger();
        let mut session = session(3);
        let began = Instant::now();
        start(&session);

        let stats = session.run_until_complete().await.unwrap();
        assert_eq!(stats.final_score, 0);
        assert_eq!(stats.level_reached, 1);
        assert!(began.elapsed() >= Duration::from_secs(3));
        assert!(began.elapsed() < Duration::from_secs(4));

        let snapshot = session.latest_snapshot().unwrap();
        assert!(snapshot.game_over);
        assert_eq!(snapshot.time_remaining, 0);
        assert_eq!(session.engine().borrow().phase(), GamePhase::GameComplete);
    }

    #[tokio::test(start_paused = true)]
    async fn test_stale_timer_pulses_are_dropped() {
        init_logger();
        let mut session = session(3);
        let began = Instant::now();
        start(&session);
        for _ in 0..50 {
            session
                .sender()
                .send(SessionInput::Timer { epoch: 0 })
                .unwrap();
        }

        session.run_until_complete().await.unwrap();
        assert!(began.elapsed() >= Duration::from_secs(3));
    }

    #[tokio::test(start_paused = true)]
    async fn test_mismatch_is_reverted_after_delay() {
        init_logger();
        let mut session = session(5);
        let sender = session.sender();
        let tapped = Rc::new(Cell::new(false));
        let log = Rc::new(RefCell::new(Vec::new()));

        let _subscription = {
            let tapped = tapped.clone();
            let log = log.clone();
            session.events().subscribe(move |event: &GameEngineEvent| {
                log.borrow_mut().push(event.clone());
                let GameEngineEvent::SnapshotUpdated(snapshot) = event else {
                    return;
                };
                if tapped.get() || snapshot.phase != GamePhase::Playing {
                    return;
                }
                let first: Tile = snapshot.tiles[0];
                let other = snapshot
                    .tiles
                    .iter()
                    .find(|tile| tile.color != first.color)
                    .unwrap();
                for id in [first.id, other.id] {
                    sender
                        .send(SessionInput::Command(GameEngineCommand::Tap(id)))
                        .unwrap();
                }
                tapped.set(true);
            })
        };

        start(&session);
        let stats = session.run_until_complete().await.unwrap();
        assert_eq!(stats.final_score, 0);

        let log = log.borrow();
        let scheduled = log
            .iter()
            .position(|event| matches!(event, GameEngineEvent::MismatchRevertScheduled { .. }))
            .unwrap();
        let reverted = log[scheduled..].iter().any(|event| match event {
            GameEngineEvent::SnapshotUpdated(snapshot) => {
                snapshot.phase == GamePhase::Playing && snapshot.revealed_tiles().count() == 0
            }
            _ => false,
        });
        assert!(reverted);
    }

    #[tokio::test(start_paused = true)]
    async fn test_destroy_stops_engine_listening() {
        init_logger();
        let mut session = session(3);
        session.destroy();
        session.commands.emit(GameEngineCommand::StartGame);
        assert_eq!(session.engine().borrow().phase(), GamePhase::NotStarted);
        assert!(session.latest_snapshot().is_none());
    }

    #[tokio::test(start_paused = true)]
    async fn test_failed_start_ends_session() {
        init_logger();
        let mut session = session(3);
        session.engine().borrow_mut().set_config(GameConfig {
            palette: vec![Color::Red],
            starting_tile_count: 1,
            ..GameConfig::default()
        });
        start(&session);

        let outcome =
            time::timeout(Duration::from_secs(3600), session.run_until_complete()).await;
        assert!(matches!(outcome, Ok(None)));
        assert_eq!(session.engine().borrow().phase(), GamePhase::NotStarted);
    }

    #[tokio::test(start_paused = true)]
    async fn test_level_advance_restarts_tick_period() {
        init_logger();
        let mut session = Session::new(Settings::default(), PlayerData::new("tester"), Some(3));
        session.engine().borrow_mut().set_config(GameConfig {
            time_budget_secs: 3,
            starting_tile_count: 2,
            match_goal: 1,
            ..GameConfig::default()
        });
        let first_deck = Rc::new(RefCell::new(Vec::new()));
        let _watch = {
            let first_deck = first_deck.clone();
            session.events().subscribe(move |event: &GameEngineEvent| {
                if let GameEngineEvent::SnapshotUpdated(snapshot) = event {
                    let mut deck = first_deck.borrow_mut();
                    if deck.is_empty() {
                        deck.extend(snapshot.tiles.iter().map(|tile| tile.id));
                    }
                }
            })
        };

        let sender = session.sender();
        let began = Instant::now();
        start(&session);
        // Match the only pair halfway between two ticks
        let late_match = async {
            time::sleep(Duration::from_millis(1500)).await;
            for id in first_deck.borrow().iter() {
                sender
                    .send(SessionInput::Command(GameEngineCommand::Tap(*id)))
                    .unwrap();
            }
        };
        let (stats, ()) = tokio::join!(session.run_until_complete(), late_match);

        let stats = stats.unwrap();
        assert_eq!(stats.level_reached, 2);
        // three full seconds after the match at 1.5s
        assert!(began.elapsed() >= Duration::from_millis(4500));
        assert!(began.elapsed() < Duration::from_secs(5));
    }

    fn flow_session(seed: u64) -> Session {
        let session = Session::new(Settings::default(), PlayerData::new("flow"), Some(seed));
        session.engine().borrow_mut().set_config(GameConfig {
            time_budget_secs: 4,
            match_goal: 3,
            starting_tile_count: 6,
            tile_count_step: 2,
            revert_delay: Duration::from_millis(300),
            ..GameConfig::default()
        });
        session
    }

    /// Flips matching pairs on every quiet snapshot until `stop_at_level`.
    fn pair_finder(session: &Session, stop_at_level: u32) -> Unsubscriber<GameEngineEvent> {
        let sender = session.sender();
        session.events().subscribe(move |event: &GameEngineEvent| {
            let GameEngineEvent::SnapshotUpdated(snapshot) = event else {
                return;
            };
            if snapshot.phase != GamePhase::Playing
                || snapshot.level >= stop_at_level
                || snapshot.revealed_tiles().next().is_some()
            {
                return;
            }
            let open: Vec<_> = snapshot.tiles.iter().filter(|t| !t.is_matched).collect();
            let pair = open.iter().find_map(|a| {
                open.iter()
                    .find(|b| b.id != a.id && b.color == a.color)
                    .map(|b| (a.id, b.id))
            });
            if let Some((a, b)) = pair {
                for id in [a, b] {
                    let _ = sender.send(SessionInput::Command(GameEngineCommand::Tap(id)));
                }
            }
        })
    }

    #[tokio::test(start_paused = true)]
    async fn test_matching_player_advances_and_history_persists() {
        init_logger();
        let dir = tempdir().unwrap();
        let stats_manager = StatsManager::with_data_dir(dir.path());
        let mut session = flow_session(5);
        let advanced = Rc::new(Cell::new(0u32));
        let _player = pair_finder(&session, 3);
        let _levels = {
            let advanced = advanced.clone();
            session.events().subscribe(move |event: &GameEngineEvent| {
                if let GameEngineEvent::LevelAdvanced { level, .. } = event {
                    advanced.set(*level);
                }
            })
        };

        start(&session);
        let stats = session.run_until_complete().await.unwrap();

        assert_eq!(advanced.get(), 3);
        assert_eq!(stats.level_reached, 3);
        assert_eq!(stats.matches_total, 6);
        assert!(stats.final_score >= 60);

        let player = session.engine().borrow().player_data();
        // Two level advances plus the round cut short by the clock
        assert_eq!(player.history.len(), 3);
        assert_eq!(player.history[0].matches_in_round, 3);
        assert_eq!(player.history[2].matches_in_round, 0);

        stats_manager.save_player(&player).unwrap();
        assert_eq!(stats_manager.load_player("flow"), player);
    }

    #[tokio::test(start_paused = true)]
    async fn test_restart_mid_game_resets_countdown() {
        init_logger();
        let mut session = flow_session(9);
        let sender = session.sender();
        let restarted = Rc::new(Cell::new(false));
        let remaining = Rc::new(RefCell::new(Vec::new()));

        let _watch = {
            let restarted = restarted.clone();
            let remaining = remaining.clone();
            session.events().subscribe(move |event: &GameEngineEvent| {
                if let GameEngineEvent::SnapshotUpdated(snapshot) = event {
                    remaining.borrow_mut().push(snapshot.time_remaining);
                    if snapshot.time_remaining == 2 && !restarted.get() {
                        restarted.set(true);
                        let _ = sender.send(SessionInput::Command(GameEngineCommand::Restart));
                    }
                }
            })
        };

        let began = Instant::now();
        start(&session);
        let stats = session.run_until_complete().await.unwrap();

        assert!(restarted.get());
        assert_eq!(stats.final_score, 0);
        // Two seconds before the restart, a full budget after it
        assert!(began.elapsed() >= Duration::from_secs(6));
        assert!(remaining.borrow().iter().filter(|&&t| t == 4).count() >= 2);
    }

    #[tokio::test(start_paused = true)]
    async fn test_taps_on_unknown_tiles_change_nothing() {
        init_logger();
        let mut session = flow_session(2);
        let sender = session.sender();
        start(&session);
        for id in [9_000, 9_001, 9_002] {
            sender
                .send(SessionInput::Command(GameEngineCommand::Tap(TileId(id))))
                .unwrap();
        }

        let stats = session.run_until_complete().await.unwrap();
        assert_eq!(stats.final_score, 0);
        assert_eq!(stats.matches_total, 0);
        let snapshot = session.latest_snapshot().unwrap();
        assert_eq!(snapshot.revealed_tiles().count(), 0);
        assert!(snapshot.game_over);
    }
}
