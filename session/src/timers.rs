//! Timer tasks feeding the session channel.

use std::time::Duration;

use dungeon_defence_core::Event;
use tokio::{
    sync::mpsc::UnboundedSender,
    task::JoinHandle,
    time::{self, Instant, MissedTickBehavior},
};

/// Periodic task delivering [`Event::AdvanceTimerFired`].
#[derive(Debug)]
pub struct AdvanceTimer {
    period: Duration,
    task: Option<JoinHandle<()>>,
}

impl AdvanceTimer {
    /// Creates a stopped timer ticking every `period` once started.
    #[must_use]
    pub fn new(period: Duration) -> Self {
        Self { period, task: None }
    }

    /// Starts ticking. The first tick arrives one period from now; starting an
    /// active timer does nothing.
    pub fn start(&mut self, events: UnboundedSender<Event>) {
        if self.is_active() {
            return;
        }

        let period = self.period;
        self.task = Some(tokio::spawn(async move {
            let mut ticks = time::interval_at(Instant::now() + period, period);
            ticks.set_missed_tick_behavior(MissedTickBehavior::Skip);
            loop {
                let _ = ticks.tick().await;
                if events.send(Event::AdvanceTimerFired).is_err() {
                    break;
                }
            }
        }));
        tracing::debug!(period_ms = period.as_millis(), "advance timer started");
    }

    /// Stops ticking. Safe to call on a stopped timer.
    pub fn stop(&mut self) {
        if let Some(task) = self.task.take() {
            task.abort();
            tracing::debug!("advance timer stopped");
        }
    }

    /// Reports whether the timer is ticking.
    #[must_use]
    pub fn is_active(&self) -> bool {
        self.task.as_ref().is_some_and(|task| !task.is_finished())
    }
}

impl Drop for AdvanceTimer {
    fn drop(&mut self) {
        self.stop();
    }
}

/// One-shot task delivering [`Event::LevelAdvanceDue`].
#[derive(Debug, Default)]
pub struct LevelAdvanceTimer {
    task: Option<JoinHandle<()>>,
}

impl LevelAdvanceTimer {
    /// Creates a disarmed timer.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Arms the timer, replacing any pending delay.
    pub fn schedule(&mut self, delay: Duration, events: UnboundedSender<Event>) {
        self.cancel();
        self.task = Some(tokio::spawn(async move {
            time::sleep(delay).await;
            let _ = events.send(Event::LevelAdvanceDue);
        }));
        tracing::debug!(delay_ms = delay.as_millis(), "level advance scheduled");
    }

    /// Disarms the timer. Safe to call when nothing is pending.
    pub fn cancel(&mut self) {
        if let Some(task) = self.task.take() {
            task.abort();
        }
    }

    /// Reports whether a level advance is still pending.
    #[must_use]
    pub fn is_pending(&self) -> bool {
        self.task.as_ref().is_some_and(|task| !task.is_finished())
    }
}

impl Drop for LevelAdvanceTimer {
    fn drop(&mut self) {
        self.cancel();
    }
}
