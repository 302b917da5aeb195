//! Countdown engine
//!
//! A countdown is a pure function of `(start time, duration, now)`: no timer
//! thread lives here. The host loop is expected to call [`Countdown::tick`]
//! at roughly [`crate::constants::countdown::TICK_INTERVAL_MS`] resolution;
//! the engine computes the remaining time, derives the display values, and
//! guarantees that expiry is observed exactly once no matter how many ticks
//! arrive after zero.
//!
//! Exclusivity is the owner's job: the synchronizer holds at most one
//! countdown and always replaces it wholesale, so two countdowns never tick
//! concurrently for one player.

use serde::Serialize;

use crate::{constants, round::Round};

/// Current wall clock in epoch milliseconds
pub fn wall_clock_ms() -> i64 {
    web_time::SystemTime::now()
        .duration_since(web_time::SystemTime::UNIX_EPOCH)
        .map_or(0, |elapsed| elapsed.as_millis() as i64)
}

/// One countdown observation, ready for display
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Tick {
    /// Remaining time in milliseconds
    pub remaining_ms: u64,
    /// Remaining whole seconds, rounded up
    pub seconds: u64,
    /// Remaining fraction of the total duration, in `[0, 1]`
    pub fraction: f64,
    /// Whether the remaining fraction is below the urgency threshold
    pub urgent: bool,
}

/// Outcome of one tick
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum TickOutcome {
    /// Time remains; display values attached
    Running(Tick),
    /// The countdown just reached zero; fired at most once per countdown
    Expired,
    /// The countdown had already expired on an earlier tick
    AlreadyExpired,
}

/// A running countdown for one round
#[derive(Debug, Clone, Copy)]
pub struct Countdown {
    end_time: i64,
    total_ms: u64,
    fired: bool,
}

impl Countdown {
    /// Starts a countdown for the given round timing
    pub fn new(start_time: i64, duration: u64) -> Self {
        Self {
            end_time: start_time + (duration as i64) * 1000,
            total_ms: duration * 1000,
            fired: false,
        }
    }

    /// Starts a countdown for a round
    pub fn for_round(round: &Round) -> Self {
        Self::new(round.start_time, round.duration)
    }

    /// Observes the countdown at `now_ms`
    ///
    /// Returns [`TickOutcome::Expired`] exactly once, on the first tick at
    /// or past zero; later ticks return [`TickOutcome::AlreadyExpired`].
    pub fn tick(&mut self, now_ms: i64) -> TickOutcome {
        let remaining = self.end_time.saturating_sub(now_ms).max(0) as u64;
        if remaining == 0 {
            if self.fired {
                return TickOutcome::AlreadyExpired;
            }
            self.fired = true;
            return TickOutcome::Expired;
        }

        let fraction = if self.total_ms == 0 {
            0.0
        } else {
            remaining as f64 / self.total_ms as f64
        };
        TickOutcome::Running(Tick {
            remaining_ms: remaining,
            seconds: remaining.div_ceil(1000),
            fraction,
            urgent: fraction < constants::countdown::URGENT_FRACTION,
        })
    }

    /// Whether expiry has already been observed
    pub fn expired(&self) -> bool {
        self.fired
    }
}
