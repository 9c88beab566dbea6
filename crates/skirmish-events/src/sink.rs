//! Buffer for events produced while a drain is running.
//!
//! Handlers cannot reach the scheduler's channels while it is draining them.
//! They push follow-ups into an [`EventSink`] instead, and the scheduler
//! appends the buffered records to their channels once the drain call ends.
//! A follow-up therefore never runs inside the pass that produced it.

use skirmish_types::GameEvent;

use crate::clock::Tick;
use crate::error::SchedulerError;
use crate::record::{Channel, EventDelay, EventRecord};

/// Anything events can be enqueued on.
pub trait EventProducer {
    /// Schedule `event` to run after `delay`.
    ///
    /// # Errors
    ///
    /// Returns [`SchedulerError::AllocationExhausted`] if the event cannot be
    /// stored.
    fn enqueue_event(&mut self, event: GameEvent, delay: EventDelay) -> Result<(), SchedulerError>;
}

/// Events buffered during one drain call.
#[derive(Debug)]
pub struct EventSink {
    now: Tick,
    buffered: Vec<(Channel, EventRecord)>,
}

impl EventSink {
    /// Create an empty sink that stamps records at `now`.
    pub const fn new(now: Tick) -> Self {
        Self {
            now,
            buffered: Vec::new(),
        }
    }

    /// Tick the current drain runs at.
    pub const fn now(&self) -> Tick {
        self.now
    }

    /// Number of buffered events.
    pub fn len(&self) -> usize {
        self.buffered.len()
    }

    /// Whether nothing has been buffered.
    pub fn is_empty(&self) -> bool {
        self.buffered.is_empty()
    }

    /// Consume the sink, yielding each record with its destination channel.
    pub fn into_records(self) -> impl Iterator<Item = (Channel, EventRecord)> {
        self.buffered.into_iter()
    }
}

impl EventProducer for EventSink {
    fn enqueue_event(&mut self, event: GameEvent, delay: EventDelay) -> Result<(), SchedulerError> {
        let (channel, delay) = delay.route();
        self.buffered
            .try_reserve(1)
            .map_err(|source| SchedulerError::AllocationExhausted { channel, source })?;
        self.buffered
            .push((channel, EventRecord::new(event, delay, self.now)));
        Ok(())
    }
}
