//! The event scheduler: enqueue, promote, expire.
//!
//! A [`Scheduler`] owns three channels (see [`Channel`]):
//!
//! - **Primary** receives every event enqueued with a tick delay. Each
//!   [`run_tick`] drains it completely: zero-delay records dispatch right
//!   away, the rest are re-stamped with the current tick and moved to Delayed.
//! - **Delayed** holds promoted records. After the primary drain, each due
//!   record (more than `delay` ticks since promotion) is dispatched and marked
//!   expired, then every expired record is compacted out in one stable pass.
//! - **Demand** receives events enqueued with [`EventDelay::OnDemand`] and is
//!   drained only by [`run_demand_only`], so player actions can run between
//!   ticks.
//!
//! Events that handlers enqueue while a drain is running are buffered in an
//! [`EventSink`] and appended after the drain call returns.
//!
//! [`run_tick`]: Scheduler::run_tick
//! [`run_demand_only`]: Scheduler::run_demand_only

use skirmish_types::GameEvent;
use tracing::{debug, warn};

use crate::clock::{Clock, Tick};
use crate::dispatch::{self, DispatchOutcome, DropReason};
use crate::error::SchedulerError;
use crate::queue::{QueueStats, QueueStore};
use crate::record::{Channel, EventDelay, EventRecord};
use crate::sink::{EventProducer, EventSink};
use crate::world::{GameplayHandlers, SoldierRegistry};

/// What a single drain call did.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DrainReport {
    /// Tick the drain ran at.
    pub tick: Tick,
    /// Records whose handler ran.
    pub dispatched: usize,
    /// Records moved from Primary or Demand into Delayed.
    pub promoted: usize,
    /// Records dropped because their target was missing or inactive.
    pub dropped_invalid: usize,
    /// Records dropped because their target slot had been recycled.
    pub dropped_stale: usize,
    /// Expired records compacted out of Delayed.
    pub removed: usize,
    /// Follow-up events handlers enqueued during the drain.
    pub produced: usize,
}

impl DrainReport {
    const fn at(tick: Tick) -> Self {
        Self {
            tick,
            dispatched: 0,
            promoted: 0,
            dropped_invalid: 0,
            dropped_stale: 0,
            removed: 0,
            produced: 0,
        }
    }

    const fn record(&mut self, outcome: DispatchOutcome) {
        match outcome {
            DispatchOutcome::Executed(_) => {
                self.dispatched = self.dispatched.saturating_add(1);
            }
            DispatchOutcome::Dropped(_, DropReason::InvalidTarget { .. }) => {
                self.dropped_invalid = self.dropped_invalid.saturating_add(1);
            }
            DispatchOutcome::Dropped(_, DropReason::StaleTarget { .. }) => {
                self.dropped_stale = self.dropped_stale.saturating_add(1);
            }
        }
    }

    /// Total records that reached the dispatcher, executed or dropped.
    pub const fn handled(&self) -> usize {
        self.dispatched
            .saturating_add(self.dropped_invalid)
            .saturating_add(self.dropped_stale)
    }

    /// Add another report's counters to this one, keeping the later tick.
    pub const fn merge(&mut self, other: &Self) {
        if other.tick > self.tick {
            self.tick = other.tick;
        }
        self.dispatched = self.dispatched.saturating_add(other.dispatched);
        self.promoted = self.promoted.saturating_add(other.promoted);
        self.dropped_invalid = self.dropped_invalid.saturating_add(other.dropped_invalid);
        self.dropped_stale = self.dropped_stale.saturating_add(other.dropped_stale);
        self.removed = self.removed.saturating_add(other.removed);
        self.produced = self.produced.saturating_add(other.produced);
    }
}

/// Owner of every pending event.
#[derive(Debug)]
pub struct Scheduler<C> {
    clock: C,
    store: QueueStore,
}

impl<C: Clock> Scheduler<C> {
    /// Create a scheduler with empty channels reading time from `clock`.
    pub fn new(clock: C) -> Self {
        Self {
            clock,
            store: QueueStore::new(),
        }
    }

    /// Create a scheduler with room for `capacity` records per channel.
    pub fn with_capacity(clock: C, capacity: usize) -> Self {
        Self {
            clock,
            store: QueueStore::with_capacity(capacity),
        }
    }

    /// The clock this scheduler stamps records with.
    pub const fn clock(&self) -> &C {
        &self.clock
    }

    /// Read-only view of the channels.
    pub const fn store(&self) -> &QueueStore {
        &self.store
    }

    /// Per-channel record counts.
    pub fn stats(&self) -> QueueStats {
        self.store.stats()
    }

    /// Whether every channel is empty.
    pub fn is_idle(&self) -> bool {
        self.stats().total() == 0
    }

    /// Append an event to `channel`, stamped at the current tick.
    fn enqueue(
        &mut self,
        event: GameEvent,
        delay: u16,
        channel: Channel,
    ) -> Result<(), SchedulerError> {
        let now = self.clock.current_tick();
        self.store
            .push(channel, EventRecord::new(event, delay, now))
    }

    /// Discard every pending primary record without dispatching it.
    ///
    /// Delayed and demand records are left alone. Returns the number of
    /// records discarded.
    pub fn clear_primary(&mut self) -> usize {
        let cleared = self.store.clear(Channel::Primary);
        debug!(cleared, "Primary event queue cleared");
        cleared
    }

    /// Drain the primary channel, then dispatch and expire due delayed records.
    ///
    /// Never touches the demand channel.
    ///
    /// # Errors
    ///
    /// Returns [`SchedulerError`] if a channel cannot grow or a scan position
    /// goes missing. Work done before the failure is not rolled back.
    pub fn run_tick<W>(&mut self, world: &mut W) -> Result<DrainReport, SchedulerError>
    where
        W: SoldierRegistry + GameplayHandlers + ?Sized,
    {
        let now = self.clock.current_tick();
        let mut report = DrainReport::at(now);
        let mut sink = EventSink::new(now);

        let drained = self
            .drain_immediate(Channel::Primary, now, world, &mut sink, &mut report)
            .and_then(|()| self.drain_delayed_expired(now, world, &mut sink, &mut report));

        report.produced = self.flush(sink)?;
        drained?;

        debug!(
            tick = now,
            dispatched = report.dispatched,
            promoted = report.promoted,
            removed = report.removed,
            dropped = report.dropped_invalid.saturating_add(report.dropped_stale),
            "Tick events drained"
        );
        Ok(report)
    }

    /// Drain only the demand channel.
    ///
    /// Used for player-triggered actions that should not wait for the next
    /// tick. Never touches the primary or delayed channels' dispatch.
    ///
    /// # Errors
    ///
    /// Returns [`SchedulerError`] if a channel cannot grow.
    pub fn run_demand_only<W>(&mut self, world: &mut W) -> Result<DrainReport, SchedulerError>
    where
        W: SoldierRegistry + GameplayHandlers + ?Sized,
    {
        let now = self.clock.current_tick();
        let mut report = DrainReport::at(now);
        let mut sink = EventSink::new(now);

        let drained = self.drain_immediate(Channel::Demand, now, world, &mut sink, &mut report);

        report.produced = self.flush(sink)?;
        drained?;
        Ok(report)
    }

    /// Empty `channel` from the head: dispatch zero-delay records, promote
    /// the rest into Delayed with a fresh timestamp.
    fn drain_immediate<W>(
        &mut self,
        channel: Channel,
        now: Tick,
        world: &mut W,
        sink: &mut EventSink,
        report: &mut DrainReport,
    ) -> Result<(), SchedulerError>
    where
        W: SoldierRegistry + GameplayHandlers + ?Sized,
    {
        while let Some(mut record) = self.store.pop_front(channel) {
            if record.delay() == 0 {
                report.record(dispatch::execute(&record, world, sink));
            } else {
                record.restamp(now);
                self.store.push(Channel::Delayed, record)?;
                report.promoted = report.promoted.saturating_add(1);
            }
        }
        Ok(())
    }

    /// Dispatch and expire every due delayed record, then remove the expired
    /// ones.
    fn drain_delayed_expired<W>(
        &mut self,
        now: Tick,
        world: &mut W,
        sink: &mut EventSink,
        report: &mut DrainReport,
    ) -> Result<(), SchedulerError>
    where
        W: SoldierRegistry + GameplayHandlers + ?Sized,
    {
        let pending = self.store.len(Channel::Delayed);
        for index in 0..pending {
            let record = self.store.get_mut(Channel::Delayed, index)?;
            if record.is_expired() || !record.is_due(now) {
                continue;
            }
            report.record(dispatch::execute(record, world, sink));
            record.expire();
        }

        report.removed = report
            .removed
            .saturating_add(self.store.remove_expired(Channel::Delayed));
        Ok(())
    }

    /// Append buffered follow-up events to their channels.
    fn flush(&mut self, sink: EventSink) -> Result<usize, SchedulerError> {
        let mut produced: usize = 0;
        for (channel, record) in sink.into_records() {
            if let Err(err) = self.store.push(channel, record) {
                warn!(%channel, %err, "Dropping buffered follow-up events");
                return Err(err);
            }
            produced = produced.saturating_add(1);
        }
        Ok(produced)
    }
}

impl<C: Clock> EventProducer for Scheduler<C> {
    /// Route the sentinel delay to Demand and everything else to Primary.
    fn enqueue_event(&mut self, event: GameEvent, delay: EventDelay) -> Result<(), SchedulerError> {
        let (channel, delay) = delay.route();
        self.enqueue(event, delay, channel)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::cell::Cell;

    use skirmish_types::{
        BeginFireWeapon, Direction, FireTarget, FireWeapon, GetNewPath, GridNo, Noise, NoiseKind,
        SetDesiredDirection, SoldierId, SoldierRef, UniqueToken, WeaponHit,
    };

    use super::*;
    use crate::world::SoldierHandle;

    #[derive(Default)]
    struct TestClock(Cell<Tick>);

    impl TestClock {
        fn at(tick: Tick) -> Self {
            Self(Cell::new(tick))
        }
        fn set(&self, tick: Tick) {
            self.0.set(tick);
        }
    }

    impl Clock for TestClock {
        fn current_tick(&self) -> Tick {
            self.0.get()
        }
    }

    /// Every slot is active with token 1; records handler calls by soldier id.
    #[derive(Default)]
    struct Recorder {
        seen: Vec<(u16, &'static str)>,
        echo_fire: bool,
    }

    impl SoldierRegistry for Recorder {
        fn lookup(&self, id: SoldierId) -> Option<SoldierHandle> {
            Some(SoldierHandle {
                id,
                is_active: true,
                generation_token: UniqueToken(1),
            })
        }
    }

    impl GameplayHandlers for Recorder {
        fn get_new_path(&mut self, s: SoldierHandle, _: &GetNewPath, _: &mut EventSink) {
            self.seen.push((s.id.0, "path"));
        }
        fn set_desired_direction(
            &mut self,
            s: SoldierHandle,
            _: &SetDesiredDirection,
            _: &mut EventSink,
        ) {
            self.seen.push((s.id.0, "turn"));
        }
        fn begin_fire_weapon(&mut self, s: SoldierHandle, _: &BeginFireWeapon, _: &mut EventSink) {
            self.seen.push((s.id.0, "begin"));
        }
        fn fire_weapon(&mut self, s: SoldierHandle, ev: &FireWeapon, sink: &mut EventSink) {
            self.seen.push((s.id.0, "fire"));
            if self.echo_fire {
                sink.enqueue_event(GameEvent::FireWeapon(*ev), EventDelay::IMMEDIATE)
                    .unwrap();
            }
        }
        fn weapon_hit(
            &mut self,
            v: SoldierHandle,
            _: SoldierHandle,
            _: &WeaponHit,
            _: &mut EventSink,
        ) {
            self.seen.push((v.id.0, "hit"));
        }
        fn noise(&mut self, _: Option<SoldierHandle>, _: &Noise, _: &mut EventSink) {
            self.seen.push((0, "noise"));
        }
    }

    fn turn(id: u16) -> GameEvent {
        GameEvent::SetDesiredDirection(SetDesiredDirection {
            soldier: SoldierRef::new(id, 1),
            direction: Direction::East,
        })
    }

    fn fire(id: u16) -> GameEvent {
        GameEvent::FireWeapon(FireWeapon {
            soldier: SoldierRef::new(id, 1),
            target: FireTarget {
                grid: GridNo(1),
                level: 0,
                cube_level: 0,
            },
        })
    }

    #[test]
    fn zero_delay_events_dispatch_in_fifo_order() {
        let clock = TestClock::at(5);
        let mut scheduler = Scheduler::new(&clock);
        let mut world = Recorder::default();
        for id in [4, 1, 3] {
            scheduler.enqueue_event(turn(id), EventDelay::IMMEDIATE).unwrap();
        }

        let report = scheduler.run_tick(&mut world).unwrap();
        assert_eq!(report.dispatched, 3);
        assert_eq!(world.seen, vec![(4, "turn"), (1, "turn"), (3, "turn")]);
        assert!(scheduler.is_idle());
    }

    #[test]
    fn delayed_event_is_restamped_at_promotion() {
        let clock = TestClock::at(10);
        let mut scheduler = Scheduler::new(&clock);
        let mut world = Recorder::default();
        scheduler.enqueue_event(turn(1), EventDelay::Ticks(2)).unwrap();

        clock.set(40);
        let report = scheduler.run_tick(&mut world).unwrap();
        assert_eq!(report.promoted, 1);
        let stamped: Vec<_> = scheduler
            .store()
            .iter(Channel::Delayed)
            .map(EventRecord::timestamp)
            .collect();
        assert_eq!(stamped, vec![40]);

        clock.set(42);
        assert_eq!(scheduler.run_tick(&mut world).unwrap().dispatched, 0);
        clock.set(43);
        let report = scheduler.run_tick(&mut world).unwrap();
        assert_eq!(report.dispatched, 1);
        assert_eq!(report.removed, 1);
        assert!(scheduler.is_idle());
    }

    #[test]
    fn demand_channel_is_separate_from_ticks() {
        let clock = TestClock::at(0);
        let mut scheduler = Scheduler::new(&clock);
        let mut world = Recorder::default();
        scheduler.enqueue_event(turn(1), EventDelay::IMMEDIATE).unwrap();
        scheduler.enqueue_event(turn(2), EventDelay::OnDemand).unwrap();

        scheduler.run_demand_only(&mut world).unwrap();
        assert_eq!(world.seen, vec![(2, "turn")]);

        scheduler.run_tick(&mut world).unwrap();
        assert_eq!(world.seen, vec![(2, "turn"), (1, "turn")]);
    }

    #[test]
    fn follow_ups_wait_for_the_next_drain() {
        let clock = TestClock::at(0);
        let mut scheduler = Scheduler::new(&clock);
        let mut world = Recorder {
            echo_fire: true,
            ..Recorder::default()
        };
        scheduler.enqueue_event(fire(7), EventDelay::IMMEDIATE).unwrap();

        let report = scheduler.run_tick(&mut world).unwrap();
        assert_eq!(report.dispatched, 1);
        assert_eq!(report.produced, 1);
        assert_eq!(scheduler.stats().primary, 1);

        let report = scheduler.run_tick(&mut world).unwrap();
        assert_eq!(report.dispatched, 1);
        assert_eq!(world.seen.len(), 2);
    }

    #[test]
    fn clear_primary_leaves_other_channels() {
        let clock = TestClock::at(0);
        let mut scheduler = Scheduler::new(&clock);
        let mut world = Recorder::default();
        scheduler.enqueue_event(turn(1), EventDelay::Ticks(4)).unwrap();
        scheduler.run_tick(&mut world).unwrap();
        scheduler.enqueue_event(turn(2), EventDelay::IMMEDIATE).unwrap();
        scheduler.enqueue_event(turn(3), EventDelay::OnDemand).unwrap();

        assert_eq!(scheduler.clear_primary(), 1);
        assert_eq!(
            scheduler.stats(),
            QueueStats {
                primary: 0,
                delayed: 1,
                demand: 1
            }
        );
    }

    #[test]
    fn noise_without_maker_dispatches() {
        let clock = TestClock::at(0);
        let mut scheduler = Scheduler::new(&clock);
        let mut world = Recorder::default();
        let noise = GameEvent::Noise(Noise {
            maker: None,
            grid: GridNo(3),
            level: 0,
            volume: 5,
            kind: NoiseKind::Creaking,
        });
        scheduler.enqueue_event(noise, EventDelay::IMMEDIATE).unwrap();
        assert_eq!(scheduler.run_tick(&mut world).unwrap().dispatched, 1);
    }

    #[test]
    fn merge_sums_counters() {
        let mut total = DrainReport::at(3);
        let mut other = DrainReport::at(4);
        other.dispatched = 2;
        other.dropped_stale = 1;
        total.merge(&other);
        total.merge(&other);
        assert_eq!(total.tick, 4);
        assert_eq!(total.dispatched, 4);
        assert_eq!(total.handled(), 6);
    }
}
