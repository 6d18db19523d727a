use log::trace;
use std::time::Duration;
use tokio::sync::mpsc::UnboundedSender;
use tokio::task::JoinHandle;
use tokio::time::{self, Instant, MissedTickBehavior};

use crate::model::GameEngineCommand;

/// What the session loop consumes: host commands, and timer pulses stamped
/// with the epoch of the driver that produced them.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionInput {
    Command(GameEngineCommand),
    Timer { epoch: u64 },
}

/// Periodic tick source. Dropping or cancelling it aborts the task.
pub struct TimerDriver {
    epoch: u64,
    handle: Option<JoinHandle<()>>,
}

impl TimerDriver {
    pub fn spawn(sender: UnboundedSender<SessionInput>, period: Duration, epoch: u64) -> Self {
        let handle = tokio::spawn(async move {
            let mut interval = time::interval_at(Instant::now() + period, period);
            interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
            loop {
                interval.tick().await;
                if sender.send(SessionInput::Timer { epoch }).is_err() {
                    break;
                }
            }
        });
        trace!(target: "timer_driver", "Started timer epoch {}", epoch);
        Self {
            epoch,
            handle: Some(handle),
        }
    }

    /// One-shot deferred input, e.g. flipping a mismatched pair back.
    pub fn schedule_once(
        sender: UnboundedSender<SessionInput>,
        delay: Duration,
        input: SessionInput,
    ) -> JoinHandle<()> {
        tokio::spawn(async move {
            time::sleep(delay).await;
            let _ = sender.send(input);
        })
    }

    pub fn is_running(&self) -> bool {
        self.handle
            .as_ref()
            .map(|handle| !handle.is_finished())
            .unwrap_or(false)
    }

    pub fn cancel(&mut self) {
        if let Some(handle) = self.handle.take() {
            handle.abort();
            trace!(target: "timer_driver", "Cancelled timer epoch {}", self.epoch);
        }
    }
}

impl Drop for TimerDriver {
    fn drop(&mut self) {
        self.cancel();
    }
}
