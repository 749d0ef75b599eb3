//! Tick scheduling for the single-writer shelf loop.
//!
//! Provides portable tick pacing without async/await or platform timers.
//! The caller is responsible for sleeping between ticks and for feeding
//! in the clock, which keeps the engine testable with synthetic time.

use embassy_time::{Duration, Instant};

use crate::shelf::ShelfModel;
use crate::transport::Transport;

/// Default tick rate for transitions and animation pacing (60 Hz).
pub const DEFAULT_TICK_RATE_HZ: u32 = 60;

/// Default tick interval derived from the tick rate.
pub const DEFAULT_TICK_INTERVAL: Duration =
    Duration::from_millis(1000 / DEFAULT_TICK_RATE_HZ as u64);

/// Result of one scheduler tick.
#[derive(Debug, Clone, Copy)]
pub struct TickResult {
    /// The deadline for the next tick.
    pub next_deadline: Instant,
    /// How long to wait until the next tick (zero if behind schedule).
    pub sleep_duration: Duration,
}

/// Paces `ShelfModel::tick` calls with drift correction.
///
/// If the loop stalls by more than two intervals the schedule is reset
/// to `now` instead of burning through the backlog in a burst.
#[derive(Debug, Clone)]
pub struct ShelfScheduler {
    tick_interval: Duration,
    next_tick: Instant,
}

impl ShelfScheduler {
    pub fn new() -> Self {
        Self::with_interval(DEFAULT_TICK_INTERVAL)
    }

    pub fn with_interval(tick_interval: Duration) -> Self {
        Self {
            tick_interval,
            next_tick: Instant::from_millis(0),
        }
    }

    /// Run one shelf tick and compute the next deadline.
    pub fn tick<T: Transport, const C: usize>(
        &mut self,
        shelf: &mut ShelfModel<'_, T, C>,
        now: Instant,
    ) -> TickResult {
        let max_drift = self.tick_interval.as_millis() * 2;
        if now.as_millis() > self.next_tick.as_millis() + max_drift {
            self.next_tick = now;
        }

        shelf.tick(now);

        self.next_tick += self.tick_interval;

        let sleep_duration = if self.next_tick.as_millis() > now.as_millis() {
            Duration::from_millis(self.next_tick.as_millis() - now.as_millis())
        } else {
            Duration::from_millis(0)
        };

        TickResult {
            next_deadline: self.next_tick,
            sleep_duration,
        }
    }
}

impl Default for ShelfScheduler {
    fn default() -> Self {
        Self::new()
    }
}
