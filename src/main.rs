use log::{info, warn};
use std::cell::Cell;
use std::rc::Rc;
use tokio::sync::mpsc::UnboundedSender;

use squaregame::events::Unsubscriber;
use squaregame::game::{Session, SessionInput, Settings, StatsManager};
use squaregame::model::{GameEngineCommand, GameEngineEvent, GamePhase, GameStateSnapshot, TileId};

/// The demo player stops tapping once it reaches this level and lets the
/// clock run out.
const TARGET_LEVEL: u32 = 3;

/// Every this many turns the demo player flips a wrong pair on purpose.
const MISS_EVERY: u32 = 4;

fn init_logging() {
    env_logger::init();
}

/// Picks the next pair to flip from a snapshot: normally a matching pair,
/// occasionally a deliberate miss.
fn next_pair(snapshot: &GameStateSnapshot, miss: bool) -> Option<(TileId, TileId)> {
    let open: Vec<_> = snapshot.tiles.iter().filter(|tile| !tile.is_matched).collect();
    let first = open
        .iter()
        .find(|tile| open.iter().any(|o| o.id != tile.id && o.color == tile.color))?;
    let partner = || {
        open.iter()
            .find(|tile| tile.id != first.id && tile.color == first.color)
    };
    let second = match miss {
        true => open
            .iter()
            .find(|tile| tile.color != first.color)
            .or_else(partner)?,
        false => partner()?,
    };
    Some((first.id, second.id))
}

fn attach_auto_player(
    session: &Session,
    sender: UnboundedSender<SessionInput>,
) -> Unsubscriber<GameEngineEvent> {
    let turn = Rc::new(Cell::new(0u32));
    session.events().subscribe(move |event: &GameEngineEvent| match event {
        GameEngineEvent::SnapshotUpdated(snapshot) => {
            if snapshot.phase != GamePhase::Playing
                || snapshot.paused
                || snapshot.level >= TARGET_LEVEL
                || snapshot.revealed_tiles().next().is_some()
            {
                return;
            }
            turn.set(turn.get() + 1);
            if let Some((first, second)) = next_pair(snapshot, turn.get() % MISS_EVERY == 0) {
                for id in [first, second] {
                    let _ = sender.send(SessionInput::Command(GameEngineCommand::Tap(id)));
                }
            }
        }
        GameEngineEvent::LevelAdvanced {
            level,
            tile_count,
            time_bonus,
        } => {
            println!(
                "Level {}: {} tiles (+{} bonus)",
                level, tile_count, time_bonus
            );
        }
        GameEngineEvent::RoundCompleted(record) => {
            println!(
                "Round {} closed: {} matches, score {}",
                record.round_index, record.matches_in_round, record.score_at_round_end
            );
        }
        _ => {}
    })
}

#[tokio::main(flavor = "current_thread")]
async fn main() {
    init_logging();

    let settings = Settings::load();
    let mut stats_manager = StatsManager::new();
    let player = stats_manager.load_player(&settings.player_name);
    let seed = Settings::seed_from_env();
    info!(
        "Starting {} game for {} ({} rounds on record)",
        settings.difficulty,
        player.name,
        player.history.len()
    );

    let mut session = Session::new(settings, player, seed);
    info!("Deck seed: {}", session.engine().borrow().seed());
    let _auto_player = attach_auto_player(&session, session.sender());

    if session
        .sender()
        .send(SessionInput::Command(GameEngineCommand::StartGame))
        .is_err()
    {
        return;
    }

    let Some(stats) = session.run_until_complete().await else {
        warn!("Session ended without a result");
        return;
    };
    println!(
        "Game over: score {}, level {}, {} matches in {}s",
        stats.final_score,
        stats.level_reached,
        stats.matches_total,
        stats.play_time.as_secs()
    );

    if let Err(err) = stats_manager.record_game(&stats) {
        warn!("Failed to record game: {}", err);
    }
    let player = session.engine().borrow().player_data();
    if let Err(err) = stats_manager.save_player(&player) {
        warn!("Failed to save player {:?}: {}", player.name, err);
    }
    if let Some(best) = player.best_score() {
        println!("Best round score for {}: {}", player.name, best);
    }
}
