//! Pausable periodic ticker.
//!
//! Paused means no timer exists at all, so an idle feed never wakes up.
//! Resuming creates a fresh interval whose first tick is one period away.

use std::time::Duration;

use tokio::time::{Instant, Interval, MissedTickBehavior, interval_at};

/// Shortest period accepted. Tokio intervals panic on a zero period.
pub const MIN_PERIOD: Duration = Duration::from_millis(1);

#[derive(Debug)]
pub struct PausableTicker {
    period: Duration,
    interval: Option<Interval>,
}

impl PausableTicker {
    /// Create a paused ticker. Periods below [`MIN_PERIOD`] are raised to it.
    pub fn new(period: Duration) -> Self {
        Self {
            period: period.max(MIN_PERIOD),
            interval: None,
        }
    }

    #[inline]
    pub fn is_paused(&self) -> bool {
        self.interval.is_none()
    }

    /// Start ticking unless already running.
    pub fn resume(&mut self) {
        if self.interval.is_none() {
            let mut interval = interval_at(Instant::now() + self.period, self.period);
            interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
            self.interval = Some(interval);
        }
    }

    pub fn pause(&mut self) {
        self.interval = None;
    }

    /// Wait for the next tick. Never completes while paused.
    pub async fn tick(&mut self) {
        match self.interval.as_mut() {
            Some(interval) => {
                interval.tick().await;
            }
            None => std::future::pending().await,
        }
    }
}
