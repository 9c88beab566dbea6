//! Game clock for the Skirmish event pump.
//!
//! The clock is the single source of truth for "now". It is shared between
//! the tick driver, which advances it, and the scheduler, which reads it to
//! stamp and compare records. The whole pump runs on one thread, so sharing
//! is an `Rc<TickClock>` with a `Cell` inside rather than a lock.
//!
//! # Design Principles
//!
//! - The tick never decreases. [`TickClock::advance_by`] is the only way to
//!   move it, and it uses checked arithmetic.
//! - Tick 0 is the session start.

use std::cell::Cell;

use skirmish_events::{Clock, Tick};

/// Errors that can occur during clock operations.
#[derive(Debug, thiserror::Error)]
pub enum ClockError {
    /// Tick counter would overflow.
    #[error("tick counter overflow: cannot advance {by} ticks past {tick}")]
    TickOverflow {
        /// Tick at the time of the call.
        tick: Tick,
        /// Requested step.
        by: Tick,
    },
}

/// Monotonic tick counter shared by the driver and the scheduler.
#[derive(Debug, Default)]
pub struct TickClock {
    tick: Cell<Tick>,
}

impl TickClock {
    /// Create a clock at tick 0.
    pub const fn new() -> Self {
        Self::starting_at(0)
    }

    /// Create a clock at an arbitrary tick (useful for tests and resumed
    /// sessions).
    pub const fn starting_at(tick: Tick) -> Self {
        Self {
            tick: Cell::new(tick),
        }
    }

    /// Return the current tick.
    pub fn tick(&self) -> Tick {
        self.tick.get()
    }

    /// Advance by one tick. Returns the new tick.
    ///
    /// # Errors
    ///
    /// Returns [`ClockError::TickOverflow`] if the counter would exceed
    /// `u64::MAX`.
    pub fn advance(&self) -> Result<Tick, ClockError> {
        self.advance_by(1)
    }

    /// Advance by `by` ticks. Returns the new tick.
    ///
    /// # Errors
    ///
    /// Returns [`ClockError::TickOverflow`] if the counter would exceed
    /// `u64::MAX`.
    pub fn advance_by(&self, by: Tick) -> Result<Tick, ClockError> {
        let tick = self.tick.get();
        let next = tick
            .checked_add(by)
            .ok_or(ClockError::TickOverflow { tick, by })?;
        self.tick.set(next);
        Ok(next)
    }
}

impl Clock for TickClock {
    fn current_tick(&self) -> Tick {
        self.tick.get()
    }
}
