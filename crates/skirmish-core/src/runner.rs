//! Tick driver and bounded session loop.
//!
//! [`TickDriver`] owns the shared [`TickClock`] and the [`Scheduler`] that
//! reads it. One [`TickDriver::step`] advances the clock and runs the tick
//! drain. [`run_session`] wraps the driver with the control plane:
//!
//! - **Scripted events**: entries from the session config are enqueued once
//!   the clock reaches their `at_tick`
//! - **Demand pump**: on-demand events are drained before every tick
//! - **Bounded run**: stop after `max_ticks`, or once everything drained
//!   when the session is unbounded
//! - **Pacing**: sleep `tick_interval_ms` between ticks

use std::collections::VecDeque;
use std::rc::Rc;

use skirmish_events::{
    DrainReport, EventDelay, EventProducer, GameplayHandlers, QueueStats, Scheduler,
    SchedulerError, SoldierRegistry, Tick,
};
use skirmish_types::GameEvent;
use tracing::{debug, info, warn};

use crate::clock::{ClockError, TickClock};
use crate::config::{ScriptedEvent, SessionConfig};

/// Errors that can occur while driving ticks.
#[derive(Debug, thiserror::Error)]
pub enum RunnerError {
    /// The clock could not advance.
    #[error("clock error: {source}")]
    Clock {
        /// The underlying clock error.
        #[from]
        source: ClockError,
    },

    /// An event could not be enqueued.
    #[error("scheduler error: {source}")]
    Scheduler {
        /// The underlying scheduler error.
        #[from]
        source: SchedulerError,
    },
}

/// What one tick did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TickSummary {
    /// The tick that ran.
    pub tick: Tick,
    /// Drain report, or `None` if the drain failed part way.
    pub report: Option<DrainReport>,
    /// Channel sizes after the drain.
    pub stats: QueueStats,
}

/// Why a session stopped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionEndReason {
    /// `max_ticks` ticks ran.
    MaxTicksReached,
    /// Unbounded session with no script left and every channel empty.
    Drained,
}

/// Result of a session run.
#[derive(Debug)]
pub struct SessionResult {
    /// The reason the session ended.
    pub end_reason: SessionEndReason,
    /// The last tick summary, if any tick ran.
    pub final_summary: Option<TickSummary>,
    /// Total number of ticks executed.
    pub total_ticks: u64,
    /// Every tick and demand drain report merged together.
    pub totals: DrainReport,
}

/// Callback invoked after each tick completes.
pub trait TickCallback {
    /// Called after every tick, including ticks whose drain failed.
    fn on_tick(&mut self, summary: &TickSummary);
}

/// A no-op tick callback.
pub struct NoOpCallback;

impl TickCallback for NoOpCallback {
    fn on_tick(&mut self, _summary: &TickSummary) {}
}

/// Clock plus scheduler, stepped one tick at a time.
#[derive(Debug)]
pub struct TickDriver {
    clock: Rc<TickClock>,
    scheduler: Scheduler<Rc<TickClock>>,
}

impl TickDriver {
    /// Create a driver at tick 0 with room for `capacity` records per channel.
    pub fn new(capacity: usize) -> Self {
        Self::with_clock(Rc::new(TickClock::new()), capacity)
    }

    /// Create a driver around an existing clock.
    pub fn with_clock(clock: Rc<TickClock>, capacity: usize) -> Self {
        let scheduler = Scheduler::with_capacity(Rc::clone(&clock), capacity);
        Self { clock, scheduler }
    }

    /// The shared clock.
    pub const fn clock(&self) -> &Rc<TickClock> {
        &self.clock
    }

    /// Read-only access to the scheduler.
    pub const fn scheduler(&self) -> &Scheduler<Rc<TickClock>> {
        &self.scheduler
    }

    /// Mutable access to the scheduler.
    pub const fn scheduler_mut(&mut self) -> &mut Scheduler<Rc<TickClock>> {
        &mut self.scheduler
    }

    /// Advance the clock one tick and run the tick drain.
    ///
    /// A failed drain is logged and reported as `report: None`; records it
    /// had not reached stay queued for the next tick.
    ///
    /// # Errors
    ///
    /// Returns [`RunnerError::Clock`] if the tick counter would overflow.
    pub fn step<W>(&mut self, world: &mut W) -> Result<TickSummary, RunnerError>
    where
        W: SoldierRegistry + GameplayHandlers + ?Sized,
    {
        let tick = self.clock.advance()?;
        let report = match self.scheduler.run_tick(world) {
            Ok(report) => Some(report),
            Err(err) => {
                warn!(tick, %err, "Tick drain failed, continuing");
                None
            }
        };
        Ok(TickSummary {
            tick,
            report,
            stats: self.scheduler.stats(),
        })
    }

    /// Drain the demand channel at the current tick.
    ///
    /// Returns `None` if the drain failed; the failure is logged.
    pub fn pump_demand<W>(&mut self, world: &mut W) -> Option<DrainReport>
    where
        W: SoldierRegistry + GameplayHandlers + ?Sized,
    {
        match self.scheduler.run_demand_only(world) {
            Ok(report) => Some(report),
            Err(err) => {
                warn!(tick = self.clock.tick(), %err, "Demand drain failed");
                None
            }
        }
    }
}

impl EventProducer for TickDriver {
    fn enqueue_event(&mut self, event: GameEvent, delay: EventDelay) -> Result<(), SchedulerError> {
        self.scheduler.enqueue_event(event, delay)
    }
}

/// Run ticks until a termination condition is met.
///
/// Each iteration enqueues the scripted events due at the current tick,
/// drains the demand channel, then steps one tick.
///
/// # Errors
///
/// Returns [`RunnerError`] if the clock overflows or a scripted event cannot
/// be enqueued.
pub async fn run_session<W>(
    driver: &mut TickDriver,
    world: &mut W,
    session: &SessionConfig,
    callback: &mut dyn TickCallback,
) -> Result<SessionResult, RunnerError>
where
    W: SoldierRegistry + GameplayHandlers + ?Sized,
{
    let mut script: Vec<ScriptedEvent> = session.script.clone();
    script.sort_by_key(|entry| entry.at_tick);
    let mut script = VecDeque::from(script);

    let mut totals = DrainReport::default();
    let mut final_summary: Option<TickSummary> = None;
    let mut total_ticks: u64 = 0;

    info!(
        max_ticks = session.max_ticks,
        tick_interval_ms = session.tick_interval_ms,
        scripted = script.len(),
        "Session starting"
    );

    let end_reason = loop {
        // --- Check bounds ---
        if session.max_ticks > 0 && total_ticks >= session.max_ticks {
            info!(
                tick = driver.clock().tick(),
                max_ticks = session.max_ticks,
                "Tick limit reached"
            );
            break SessionEndReason::MaxTicksReached;
        }
        if session.max_ticks == 0 && script.is_empty() && driver.scheduler().is_idle() {
            info!(tick = driver.clock().tick(), "All events drained");
            break SessionEndReason::Drained;
        }

        // --- Inject scripted events ---
        let now = driver.clock().tick();
        while let Some(entry) = script.pop_front() {
            if entry.at_tick > now {
                script.push_front(entry);
                break;
            }
            debug!(
                tick = now,
                kind = %entry.event.kind(),
                delay = entry.delay,
                "Scripted event enqueued"
            );
            let delay = entry.delay();
            driver.enqueue_event(entry.event, delay)?;
        }

        // --- Demand, then tick ---
        if let Some(report) = driver.pump_demand(world) {
            totals.merge(&report);
        }
        let summary = driver.step(world)?;
        if let Some(report) = summary.report.as_ref() {
            totals.merge(report);
        }
        total_ticks = total_ticks.saturating_add(1);
        callback.on_tick(&summary);
        final_summary = Some(summary);

        // --- Sleep for tick interval ---
        if session.tick_interval_ms > 0 {
            tokio::time::sleep(tokio::time::Duration::from_millis(session.tick_interval_ms)).await;
        }
    };

    Ok(SessionResult {
        end_reason,
        final_summary,
        total_ticks,
        totals,
    })
}

/// Log the session end.
pub fn log_session_end(result: &SessionResult) {
    info!(
        reason = ?result.end_reason,
        total_ticks = result.total_ticks,
        final_tick = result.final_summary.as_ref().map(|s| s.tick),
        dispatched = result.totals.dispatched,
        promoted = result.totals.promoted,
        dropped_invalid = result.totals.dropped_invalid,
        dropped_stale = result.totals.dropped_stale,
        pending = result.final_summary.as_ref().map(|s| s.stats.total()),
        "Session ended"
    );
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use skirmish_events::{DEMAND_EVENT_DELAY, EventSink, SoldierHandle};
    use skirmish_types::{
        BeginFireWeapon, Direction, FireWeapon, GetNewPath, Noise, SetDesiredDirection, SoldierId,
        SoldierRef, WeaponHit,
    };

    use super::*;
    use crate::roster::SoldierRoster;

    /// Roster plus a log of `(tick, soldier)` for every direction change.
    struct Field {
        clock: Rc<TickClock>,
        roster: SoldierRoster,
        turns: Vec<(Tick, SoldierId)>,
    }

    impl Field {
        fn new(clock: &Rc<TickClock>, deployed: u16) -> Self {
            let mut roster = SoldierRoster::new(8);
            for _ in 0..deployed {
                roster.spawn().unwrap();
            }
            Self {
                clock: Rc::clone(clock),
                roster,
                turns: Vec::new(),
            }
        }
    }

    impl SoldierRegistry for Field {
        fn lookup(&self, id: SoldierId) -> Option<SoldierHandle> {
            self.roster.lookup(id)
        }
    }

    impl GameplayHandlers for Field {
        fn get_new_path(&mut self, _: SoldierHandle, _: &GetNewPath, _: &mut EventSink) {}

        fn set_desired_direction(
            &mut self,
            soldier: SoldierHandle,
            _: &SetDesiredDirection,
            _: &mut EventSink,
        ) {
            self.turns.push((self.clock.tick(), soldier.id));
        }

        fn begin_fire_weapon(&mut self, _: SoldierHandle, _: &BeginFireWeapon, _: &mut EventSink) {}

        fn fire_weapon(&mut self, _: SoldierHandle, _: &FireWeapon, _: &mut EventSink) {}

        fn weapon_hit(
            &mut self,
            _: SoldierHandle,
            _: SoldierHandle,
            _: &WeaponHit,
            _: &mut EventSink,
        ) {
        }

        fn noise(&mut self, _: Option<SoldierHandle>, _: &Noise, _: &mut EventSink) {}
    }

    fn turn(id: u16) -> GameEvent {
        GameEvent::SetDesiredDirection(SetDesiredDirection {
            soldier: SoldierRef::new(id, 1),
            direction: Direction::East,
        })
    }

    fn scripted(at_tick: u64, delay: u16, id: u16) -> ScriptedEvent {
        ScriptedEvent {
            at_tick,
            delay,
            event: turn(id),
        }
    }

    fn session(max_ticks: u64, script: Vec<ScriptedEvent>) -> SessionConfig {
        SessionConfig {
            tick_interval_ms: 0,
            max_ticks,
            seed: 0,
            script,
        }
    }

    #[test]
    fn step_advances_clock_and_dispatches() {
        let mut driver = TickDriver::new(4);
        let mut field = Field::new(driver.clock(), 1);
        driver.enqueue_event(turn(0), EventDelay::IMMEDIATE).unwrap();

        let summary = driver.step(&mut field).unwrap();
        assert_eq!(summary.tick, 1);
        assert_eq!(summary.report.unwrap().dispatched, 1);
        assert_eq!(summary.stats.total(), 0);
        assert_eq!(field.turns, vec![(1, SoldierId(0))]);
    }

    #[test]
    fn step_leaves_demand_channel_alone() {
        let mut driver = TickDriver::new(4);
        let mut field = Field::new(driver.clock(), 1);
        driver.enqueue_event(turn(0), EventDelay::OnDemand).unwrap();

        let summary = driver.step(&mut field).unwrap();
        assert_eq!(summary.stats.demand, 1);
        assert!(field.turns.is_empty());

        let report = driver.pump_demand(&mut field).unwrap();
        assert_eq!(report.dispatched, 1);
        assert_eq!(field.turns, vec![(1, SoldierId(0))]);
    }

    #[test]
    fn step_surfaces_clock_overflow() {
        let mut driver = TickDriver::with_clock(Rc::new(TickClock::starting_at(u64::MAX)), 1);
        let mut field = Field::new(driver.clock(), 0);
        assert!(matches!(
            driver.step(&mut field),
            Err(RunnerError::Clock { .. })
        ));
    }

    #[tokio::test]
    async fn session_stops_at_max_ticks() {
        let mut driver = TickDriver::new(4);
        let mut field = Field::new(driver.clock(), 1);

        let result = run_session(&mut driver, &mut field, &session(5, Vec::new()), &mut NoOpCallback)
            .await
            .unwrap();
        assert_eq!(result.end_reason, SessionEndReason::MaxTicksReached);
        assert_eq!(result.total_ticks, 5);
        assert_eq!(result.final_summary.unwrap().tick, 5);
    }

    #[tokio::test]
    async fn scripted_events_run_on_the_tick_after_injection() {
        let mut driver = TickDriver::new(4);
        let mut field = Field::new(driver.clock(), 2);
        let script = vec![scripted(2, 0, 1), scripted(0, 0, 0)];

        run_session(&mut driver, &mut field, &session(4, script), &mut NoOpCallback)
            .await
            .unwrap();
        assert_eq!(field.turns, vec![(1, SoldierId(0)), (3, SoldierId(1))]);
    }

    #[tokio::test]
    async fn scripted_demand_event_runs_before_the_tick() {
        let mut driver = TickDriver::new(4);
        let mut field = Field::new(driver.clock(), 1);
        let script = vec![scripted(2, DEMAND_EVENT_DELAY, 0)];

        run_session(&mut driver, &mut field, &session(4, script), &mut NoOpCallback)
            .await
            .unwrap();
        assert_eq!(field.turns, vec![(2, SoldierId(0))]);
    }

    #[tokio::test]
    async fn scripted_delay_counts_from_promotion() {
        let mut driver = TickDriver::new(4);
        let mut field = Field::new(driver.clock(), 1);
        let script = vec![scripted(0, 2, 0)];

        let result = run_session(&mut driver, &mut field, &session(6, script), &mut NoOpCallback)
            .await
            .unwrap();
        assert_eq!(field.turns, vec![(4, SoldierId(0))]);
        assert_eq!(result.totals.promoted, 1);
        assert_eq!(result.totals.dispatched, 1);
        assert_eq!(result.totals.removed, 1);
    }

    #[tokio::test]
    async fn unbounded_session_ends_when_drained() {
        let mut driver = TickDriver::new(4);
        let mut field = Field::new(driver.clock(), 1);
        let script = vec![scripted(0, 1, 0)];

        let result = run_session(&mut driver, &mut field, &session(0, script), &mut NoOpCallback)
            .await
            .unwrap();
        assert_eq!(result.end_reason, SessionEndReason::Drained);
        assert_eq!(result.total_ticks, 3);
        assert_eq!(field.turns, vec![(3, SoldierId(0))]);
    }

    #[tokio::test]
    async fn callback_sees_every_tick() {
        struct Count(Vec<Tick>);
        impl TickCallback for Count {
            fn on_tick(&mut self, summary: &TickSummary) {
                self.0.push(summary.tick);
            }
        }

        let mut driver = TickDriver::new(4);
        let mut field = Field::new(driver.clock(), 0);
        let mut count = Count(Vec::new());
        run_session(&mut driver, &mut field, &session(3, Vec::new()), &mut count)
            .await
            .unwrap();
        assert_eq!(count.0, vec![1, 2, 3]);
    }
}
