//! Storage for the three event channels.
//!
//! Records are held by value in FIFO order. Moving a record between channels
//! pops it from one deque and pushes it onto another; nothing is shared.

use std::collections::VecDeque;

use serde::Serialize;

use crate::error::SchedulerError;
use crate::record::{Channel, EventRecord};

/// Per-channel record counts.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct QueueStats {
    /// Records waiting in the primary channel.
    pub primary: usize,
    /// Records waiting in the delayed channel.
    pub delayed: usize,
    /// Records waiting in the demand channel.
    pub demand: usize,
}

impl QueueStats {
    /// Total records across all channels.
    pub const fn total(&self) -> usize {
        self.primary
            .saturating_add(self.delayed)
            .saturating_add(self.demand)
    }
}

/// Three independent FIFO channels of [`EventRecord`]s.
#[derive(Debug, Default)]
pub struct QueueStore {
    primary: VecDeque<EventRecord>,
    delayed: VecDeque<EventRecord>,
    demand: VecDeque<EventRecord>,
}

impl QueueStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an empty store with room for `capacity` records per channel.
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            primary: VecDeque::with_capacity(capacity),
            delayed: VecDeque::with_capacity(capacity),
            demand: VecDeque::with_capacity(capacity),
        }
    }

    const fn channel(&self, channel: Channel) -> &VecDeque<EventRecord> {
        match channel {
            Channel::Primary => &self.primary,
            Channel::Delayed => &self.delayed,
            Channel::Demand => &self.demand,
        }
    }

    const fn channel_mut(&mut self, channel: Channel) -> &mut VecDeque<EventRecord> {
        match channel {
            Channel::Primary => &mut self.primary,
            Channel::Delayed => &mut self.delayed,
            Channel::Demand => &mut self.demand,
        }
    }

    /// Append a record to the tail of a channel.
    ///
    /// # Errors
    ///
    /// Returns [`SchedulerError::AllocationExhausted`] if the channel cannot
    /// grow. The record is dropped in that case.
    pub fn push(&mut self, channel: Channel, record: EventRecord) -> Result<(), SchedulerError> {
        let queue = self.channel_mut(channel);
        queue
            .try_reserve(1)
            .map_err(|source| SchedulerError::AllocationExhausted { channel, source })?;
        queue.push_back(record);
        Ok(())
    }

    /// Remove and return the head of a channel, if any.
    pub fn pop_front(&mut self, channel: Channel) -> Option<EventRecord> {
        self.channel_mut(channel).pop_front()
    }

    /// Borrow the record at `index` for in-place updates.
    ///
    /// # Errors
    ///
    /// Returns [`SchedulerError::QueueCorruption`] if the channel has no
    /// record at that position.
    pub fn get_mut(
        &mut self,
        channel: Channel,
        index: usize,
    ) -> Result<&mut EventRecord, SchedulerError> {
        let queue = self.channel_mut(channel);
        let len = queue.len();
        queue
            .get_mut(index)
            .ok_or(SchedulerError::QueueCorruption {
                channel,
                index,
                len,
            })
    }

    /// Remove every expired record from a channel in one stable pass.
    ///
    /// Unexpired records keep their relative order. Returns the number of
    /// records removed.
    pub fn remove_expired(&mut self, channel: Channel) -> usize {
        let queue = self.channel_mut(channel);
        let before = queue.len();
        queue.retain(|record| !record.is_expired());
        before.saturating_sub(queue.len())
    }

    /// Drop every record in a channel. Returns how many were dropped.
    pub fn clear(&mut self, channel: Channel) -> usize {
        let queue = self.channel_mut(channel);
        let dropped = queue.len();
        queue.clear();
        dropped
    }

    /// Number of records in a channel.
    pub fn len(&self, channel: Channel) -> usize {
        self.channel(channel).len()
    }

    /// Whether a channel holds no records.
    pub fn is_empty(&self, channel: Channel) -> bool {
        self.channel(channel).is_empty()
    }

    /// Iterate a channel front to back.
    pub fn iter(&self, channel: Channel) -> impl Iterator<Item = &EventRecord> {
        self.channel(channel).iter()
    }

    /// Snapshot of every channel's length.
    pub fn stats(&self) -> QueueStats {
        QueueStats {
            primary: self.primary.len(),
            delayed: self.delayed.len(),
            demand: self.demand.len(),
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use skirmish_types::{Direction, GameEvent, SetDesiredDirection, SoldierRef};

    use super::*;

    fn turn(id: u16) -> EventRecord {
        EventRecord::new(
            GameEvent::SetDesiredDirection(SetDesiredDirection {
                soldier: SoldierRef::new(id, 1),
                direction: Direction::North,
            }),
            0,
            0,
        )
    }

    fn ids(store: &QueueStore, channel: Channel) -> Vec<u16> {
        store
            .iter(channel)
            .filter_map(|record| record.payload().primary_soldier())
            .map(|id| id.0)
            .collect()
    }

    #[test]
    fn channels_are_independent_fifos() {
        let mut store = QueueStore::new();
        store.push(Channel::Primary, turn(1)).unwrap();
        store.push(Channel::Demand, turn(2)).unwrap();
        store.push(Channel::Primary, turn(3)).unwrap();

        assert_eq!(ids(&store, Channel::Primary), vec![1, 3]);
        assert_eq!(ids(&store, Channel::Demand), vec![2]);
        assert!(store.is_empty(Channel::Delayed));

        let head = store.pop_front(Channel::Primary).unwrap();
        assert_eq!(head.payload().primary_soldier().map(|id| id.0), Some(1));
    }

    #[test]
    fn pop_on_empty_channel_is_none() {
        let mut store = QueueStore::with_capacity(4);
        assert!(store.pop_front(Channel::Primary).is_none());
    }

    #[test]
    fn get_mut_past_the_end_reports_corruption() {
        let mut store = QueueStore::new();
        store.push(Channel::Delayed, turn(1)).unwrap();
        let err = store.get_mut(Channel::Delayed, 3).unwrap_err();
        assert!(matches!(
            err,
            SchedulerError::QueueCorruption {
                channel: Channel::Delayed,
                index: 3,
                len: 1
            }
        ));
    }

    #[test]
    fn remove_expired_keeps_order_of_survivors() {
        let mut store = QueueStore::new();
        for id in 1..=5 {
            store.push(Channel::Delayed, turn(id)).unwrap();
        }
        store.get_mut(Channel::Delayed, 1).unwrap().expire();
        store.get_mut(Channel::Delayed, 3).unwrap().expire();

        assert_eq!(store.remove_expired(Channel::Delayed), 2);
        assert_eq!(ids(&store, Channel::Delayed), vec![1, 3, 5]);
        assert_eq!(store.remove_expired(Channel::Delayed), 0);
    }

    #[test]
    fn stats_count_each_channel() {
        let mut store = QueueStore::new();
        store.push(Channel::Primary, turn(1)).unwrap();
        store.push(Channel::Delayed, turn(2)).unwrap();
        store.push(Channel::Delayed, turn(3)).unwrap();
        let stats = store.stats();
        assert_eq!(
            stats,
            QueueStats {
                primary: 1,
                delayed: 2,
                demand: 0
            }
        );
        assert_eq!(stats.total(), 3);
        assert_eq!(store.clear(Channel::Delayed), 2);
        assert_eq!(store.len(Channel::Delayed), 0);
    }

    #[test]
    fn stats_serialize_as_flat_counts() {
        let stats = QueueStats {
            primary: 2,
            delayed: 0,
            demand: 1,
        };
        let json = serde_json::to_string(&stats).unwrap();
        assert_eq!(json, r#"{"primary":2,"delayed":0,"demand":1}"#);
    }
}
