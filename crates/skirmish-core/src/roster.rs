//! Soldier roster: the slot table events are validated against.
//!
//! The tactical map has a fixed number of soldier slots. A slot is reused
//! after its occupant dies, and every reuse bumps the slot's
//! [`UniqueToken`]. Events remember the token their target had when they
//! were created, so an event aimed at a dead soldier never lands on whoever
//! took the slot afterwards.

use skirmish_events::{SoldierHandle, SoldierRegistry};
use skirmish_types::{SoldierId, SoldierRef, UniqueToken};
use tracing::debug;

/// Errors that can occur when changing the roster.
#[derive(Debug, thiserror::Error)]
pub enum RosterError {
    /// Every slot is occupied.
    #[error("roster is full ({capacity} slots)")]
    Full {
        /// Number of slots in the roster.
        capacity: usize,
    },

    /// The id is outside the roster.
    #[error("soldier {id} is outside the roster")]
    UnknownSlot {
        /// The requested slot.
        id: SoldierId,
    },

    /// The slot exists but holds no living soldier.
    #[error("soldier {id} is not active")]
    NotActive {
        /// The requested slot.
        id: SoldierId,
    },
}

#[derive(Debug, Clone, Copy, Default)]
struct Slot {
    active: bool,
    token: UniqueToken,
}

/// Fixed-size table of soldier slots.
#[derive(Debug, Clone)]
pub struct SoldierRoster {
    slots: Vec<Slot>,
}

impl SoldierRoster {
    /// Create a roster with `capacity` empty slots, all at token 0.
    pub fn new(capacity: u16) -> Self {
        Self {
            slots: vec![Slot::default(); usize::from(capacity)],
        }
    }

    /// Number of slots.
    pub fn capacity(&self) -> usize {
        self.slots.len()
    }

    /// Number of slots holding a living soldier.
    pub fn active_count(&self) -> usize {
        self.slots.iter().filter(|slot| slot.active).count()
    }

    /// Deploy a soldier into the lowest free slot.
    ///
    /// The slot's token is bumped, so references to any earlier occupant
    /// become stale. Returns a reference to the new occupant.
    ///
    /// # Errors
    ///
    /// Returns [`RosterError::Full`] if no slot is free.
    pub fn spawn(&mut self) -> Result<SoldierRef, RosterError> {
        let capacity = self.slots.len();
        let (slot, raw) = self
            .slots
            .iter_mut()
            .zip(0..=u16::MAX)
            .find(|(slot, _)| !slot.active)
            .ok_or(RosterError::Full { capacity })?;

        slot.active = true;
        slot.token = slot.token.next();

        let soldier = SoldierRef {
            id: SoldierId(raw),
            token: slot.token,
        };
        debug!(%soldier, "Soldier deployed");
        Ok(soldier)
    }

    /// Mark the soldier in `id` as dead, freeing the slot.
    ///
    /// The token is kept until the slot is reused.
    ///
    /// # Errors
    ///
    /// Returns [`RosterError::UnknownSlot`] if the id is outside the roster,
    /// or [`RosterError::NotActive`] if the slot is already empty.
    pub fn kill(&mut self, id: SoldierId) -> Result<SoldierRef, RosterError> {
        let slot = self
            .slots
            .get_mut(usize::from(id.0))
            .ok_or(RosterError::UnknownSlot { id })?;
        if !slot.active {
            return Err(RosterError::NotActive { id });
        }
        slot.active = false;

        let soldier = SoldierRef {
            id,
            token: slot.token,
        };
        debug!(%soldier, "Soldier removed");
        Ok(soldier)
    }

    /// Reference to the current occupant of `id`, if it is alive.
    pub fn current(&self, id: SoldierId) -> Option<SoldierRef> {
        self.slots
            .get(usize::from(id.0))
            .filter(|slot| slot.active)
            .map(|slot| SoldierRef {
                id,
                token: slot.token,
            })
    }

    /// References to every living soldier, lowest slot first.
    pub fn active(&self) -> impl Iterator<Item = SoldierRef> + '_ {
        self.slots
            .iter()
            .zip(0..=u16::MAX)
            .filter(|(slot, _)| slot.active)
            .map(|(slot, raw)| SoldierRef {
                id: SoldierId(raw),
                token: slot.token,
            })
    }
}

impl SoldierRegistry for SoldierRoster {
    fn lookup(&self, id: SoldierId) -> Option<SoldierHandle> {
        self.slots
            .get(usize::from(id.0))
            .map(|slot| SoldierHandle {
                id,
                is_active: slot.active,
                generation_token: slot.token,
            })
    }
}
