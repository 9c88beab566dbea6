//! Collaborator contracts the dispatcher calls into.
//!
//! The event pump knows nothing about soldiers beyond "is this slot live, and
//! which generation occupies it". Everything else (pathing, ballistics,
//! hearing) sits behind [`GameplayHandlers`].

use skirmish_types::{
    BeginFireWeapon, FireWeapon, GetNewPath, Noise, SetDesiredDirection, SoldierId, UniqueToken,
    WeaponHit,
};

use crate::sink::EventSink;

/// A point-in-time view of one roster slot.
///
/// Handles are copied out of the registry and never held past a single
/// dispatch, so they may be stale by the next lookup.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SoldierHandle {
    /// Slot id.
    pub id: SoldierId,
    /// Whether the slot holds a living, deployed soldier.
    pub is_active: bool,
    /// Generation of the current occupant.
    pub generation_token: UniqueToken,
}

/// Identity lookup for event targets.
pub trait SoldierRegistry {
    /// Look up a slot. `None` means the id is outside the roster.
    fn lookup(&self, id: SoldierId) -> Option<SoldierHandle>;
}

/// The gameplay side of each event kind.
///
/// Every method receives targets that have already been validated against
/// the registry. Return values are not inspected. Follow-up events go
/// through `sink` and run on a later drain.
pub trait GameplayHandlers {
    /// Plot a path to `event.dest` and start walking.
    fn get_new_path(&mut self, soldier: SoldierHandle, event: &GetNewPath, sink: &mut EventSink);

    /// Turn towards `event.direction`.
    fn set_desired_direction(
        &mut self,
        soldier: SoldierHandle,
        event: &SetDesiredDirection,
        sink: &mut EventSink,
    );

    /// Store the fire target on the soldier and start the firing animation.
    fn begin_fire_weapon(
        &mut self,
        soldier: SoldierHandle,
        event: &BeginFireWeapon,
        sink: &mut EventSink,
    );

    /// Store the fire target on the soldier and release the shot.
    fn fire_weapon(&mut self, soldier: SoldierHandle, event: &FireWeapon, sink: &mut EventSink);

    /// Apply a hit from `attacker` to `victim`.
    fn weapon_hit(
        &mut self,
        victim: SoldierHandle,
        attacker: SoldierHandle,
        event: &WeaponHit,
        sink: &mut EventSink,
    );

    /// Propagate a noise. `source` is `None` for environmental noise.
    fn noise(&mut self, source: Option<SoldierHandle>, event: &Noise, sink: &mut EventSink);
}
