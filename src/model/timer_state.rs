use std::time::{Duration, SystemTime};

use serde_with::serde_as;
use serde_with::TimestampSeconds;

/// Countdown clock for the current level plus wall-clock bookkeeping for the
/// whole playthrough.
///
/// `remaining_secs` only moves on driver ticks; the timestamps track how long
/// the player actually spent in the game, excluding pauses.
#[serde_as]
#[derive(Clone, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct TimerState {
    pub remaining_secs: u32,
    #[serde_as(as = "Option<TimestampSeconds>")]
    pub paused_timestamp: Option<SystemTime>,
    pub paused_duration: Duration,
    #[serde_as(as = "TimestampSeconds")]
    pub started_timestamp: SystemTime,
    #[serde_as(as = "Option<TimestampSeconds>")]
    pub ended_timestamp: Option<SystemTime>,
}

impl Default for TimerState {
    fn default() -> Self {
        Self::new(0, SystemTime::now())
    }
}

impl TimerState {
    pub fn new(remaining_secs: u32, now: SystemTime) -> Self {
        Self {
            remaining_secs,
            paused_timestamp: None,
            paused_duration: Duration::from_secs(0),
            started_timestamp: now,
            ended_timestamp: None,
        }
    }

    pub fn is_paused(&self) -> bool {
        self.paused_timestamp.is_some()
    }

    pub fn is_expired(&self) -> bool {
        self.remaining_secs == 0
    }

    /// Wall-clock play time, excluding pauses.
    pub fn elapsed(&self) -> Duration {
        let until_time = self
            .paused_timestamp
            .or(self.ended_timestamp)
            .unwrap_or(SystemTime::now());

        until_time
            .duration_since(self.started_timestamp)
            .unwrap_or(Duration::default())
            .saturating_sub(self.paused_duration)
    }

    /// One driver tick. Never goes below zero.
    pub fn ticked(&self) -> TimerState {
        let mut new_state = self.clone();
        new_state.remaining_secs = new_state.remaining_secs.saturating_sub(1);
        new_state
    }

    pub fn replenished(&self, secs: u32) -> TimerState {
        let mut new_state = self.clone();
        new_state.remaining_secs = secs;
        new_state
    }

    pub fn paused(&self, now: SystemTime) -> TimerState {
        let mut new_state = self.clone();
        new_state.paused_timestamp = Some(now);
        new_state
    }

    pub fn resumed(&self, now: SystemTime) -> TimerState {
        let mut new_state = self.clone();
        if let Some(pause_time) = new_state.paused_timestamp.take() {
            new_state.paused_duration = new_state
                .paused_duration
                .saturating_add(now.duration_since(pause_time).unwrap_or_default());
        }
        new_state
    }

    pub fn ended(&self, now: SystemTime) -> TimerState {
        let mut new_state = self.clone();
        new_state.ended_timestamp = Some(now);
        new_state
    }
}
