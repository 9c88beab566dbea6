//! The schedulable unit and the channels it lives in.

use serde::Serialize;
use skirmish_types::GameEvent;

use crate::clock::Tick;

/// Raw delay value that routes an event to the demand channel.
pub const DEMAND_EVENT_DELAY: u16 = u16::MAX;

/// One of the three independent queues held by the scheduler.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Channel {
    /// Freshly enqueued events, drained every tick.
    Primary,
    /// Events waiting for their delay to elapse.
    Delayed,
    /// Player-triggered events, drained out of band.
    Demand,
}

impl core::fmt::Display for Channel {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::Primary => f.write_str("primary"),
            Self::Delayed => f.write_str("delayed"),
            Self::Demand => f.write_str("demand"),
        }
    }
}

/// How long an event should wait before it runs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EventDelay {
    /// Run after this many ticks have elapsed since promotion (0 = next drain).
    Ticks(u16),
    /// Run on the next demand drain, independent of the tick cadence.
    OnDemand,
}

impl EventDelay {
    /// Run on the next tick drain.
    pub const IMMEDIATE: Self = Self::Ticks(0);

    /// The channel an event with this delay is enqueued on, and the delay
    /// value its record carries.
    pub const fn route(self) -> (Channel, u16) {
        match self {
            Self::Ticks(delay) => (Channel::Primary, delay),
            Self::OnDemand => (Channel::Demand, 0),
        }
    }
}

impl From<u16> for EventDelay {
    fn from(raw: u16) -> Self {
        if raw == DEMAND_EVENT_DELAY {
            Self::OnDemand
        } else {
            Self::Ticks(raw)
        }
    }
}

/// A scheduled event together with its timing state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EventRecord {
    timestamp: Tick,
    delay: u16,
    expired: bool,
    payload: GameEvent,
}

impl EventRecord {
    /// Create a fresh, unexpired record stamped at `now`.
    pub const fn new(payload: GameEvent, delay: u16, now: Tick) -> Self {
        Self {
            timestamp: now,
            delay,
            expired: false,
            payload,
        }
    }

    /// Tick the record was last stamped at (enqueue or promotion).
    pub const fn timestamp(&self) -> Tick {
        self.timestamp
    }

    /// Ticks to wait after promotion.
    pub const fn delay(&self) -> u16 {
        self.delay
    }

    /// Whether the record has been dispatched and awaits removal.
    pub const fn is_expired(&self) -> bool {
        self.expired
    }

    /// The event to dispatch.
    pub const fn payload(&self) -> &GameEvent {
        &self.payload
    }

    /// Whether more than `delay` ticks have passed since the timestamp.
    pub fn is_due(&self, now: Tick) -> bool {
        now.saturating_sub(self.timestamp) > Tick::from(self.delay)
    }

    pub(crate) const fn restamp(&mut self, now: Tick) {
        self.timestamp = now;
    }

    pub(crate) const fn expire(&mut self) {
        self.expired = true;
    }
}

#[cfg(test)]
mod tests {
    use skirmish_types::{GridNo, Noise, NoiseKind};

    use super::*;

    fn noise() -> GameEvent {
        GameEvent::Noise(Noise {
            maker: None,
            grid: GridNo(1),
            level: 0,
            volume: 10,
            kind: NoiseKind::Movement,
        })
    }

    #[test]
    fn sentinel_routes_to_demand() {
        assert_eq!(EventDelay::from(DEMAND_EVENT_DELAY), EventDelay::OnDemand);
        assert_eq!(EventDelay::OnDemand.route(), (Channel::Demand, 0));
        assert_eq!(EventDelay::from(5).route(), (Channel::Primary, 5));
        assert_eq!(EventDelay::from(65_534), EventDelay::Ticks(65_534));
    }

    #[test]
    fn due_requires_strictly_more_than_delay() {
        let record = EventRecord::new(noise(), 5, 100);
        assert!(!record.is_due(100));
        assert!(!record.is_due(105));
        assert!(record.is_due(106));
    }

    #[test]
    fn zero_delay_is_due_one_tick_later() {
        let record = EventRecord::new(noise(), 0, 10);
        assert!(!record.is_due(10));
        assert!(record.is_due(11));
    }

    #[test]
    fn restamp_moves_the_window() {
        let mut record = EventRecord::new(noise(), 2, 0);
        record.restamp(50);
        assert_eq!(record.timestamp(), 50);
        assert!(!record.is_due(52));
        assert!(record.is_due(53));
    }

    #[test]
    fn records_start_unexpired() {
        let mut record = EventRecord::new(noise(), 0, 0);
        assert!(!record.is_expired());
        record.expire();
        assert!(record.is_expired());
    }
}
