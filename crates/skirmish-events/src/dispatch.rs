//! Identity-checked dispatch of a single record.
//!
//! [`execute`] matches exhaustively on the payload, so a new [`GameEvent`]
//! variant does not compile until it has an arm here. Each arm resolves its
//! target through the [`SoldierRegistry`] before calling the handler:
//!
//! 1. Unknown or inactive slot: the event is dropped as an invalid target.
//! 2. Generation token differs from the one captured at enqueue: the slot was
//!    recycled since, and the event is dropped as stale.
//! 3. Otherwise the matching [`GameplayHandlers`] method runs.
//!
//! Drops are logged at debug level and reported through [`DispatchOutcome`].
//! They are not errors: a queued action whose soldier died in the meantime
//! simply does not happen.

use skirmish_types::{EventKind, GameEvent, SoldierId, SoldierRef, UniqueToken};
use tracing::debug;

use crate::record::EventRecord;
use crate::sink::EventSink;
use crate::world::{GameplayHandlers, SoldierHandle, SoldierRegistry};

/// Why an event was dropped instead of executed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DropReason {
    /// The addressed slot does not exist or holds no active soldier.
    InvalidTarget {
        /// The slot that was looked up.
        soldier: SoldierId,
    },
    /// The slot is active but now belongs to a different generation.
    StaleTarget {
        /// The slot that was looked up.
        soldier: SoldierId,
        /// Token captured when the event was created.
        expected: UniqueToken,
        /// Token the slot holds now.
        found: UniqueToken,
    },
}

impl core::fmt::Display for DropReason {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::InvalidTarget { soldier } => write!(f, "soldier {soldier} is not active"),
            Self::StaleTarget {
                soldier,
                expected,
                found,
            } => write!(
                f,
                "soldier {soldier} slot recycled (expected token {expected}, found {found})"
            ),
        }
    }
}

/// What happened to a dispatched record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DispatchOutcome {
    /// The gameplay handler ran.
    Executed(EventKind),
    /// The event was discarded without calling any handler.
    Dropped(EventKind, DropReason),
}

/// Dispatch one record to its gameplay handler.
///
/// The record is only borrowed; the caller decides whether to drop or expire
/// it afterwards.
pub fn execute<W>(record: &EventRecord, world: &mut W, sink: &mut EventSink) -> DispatchOutcome
where
    W: SoldierRegistry + GameplayHandlers + ?Sized,
{
    let kind = record.payload().kind();
    match route(record.payload(), world, sink) {
        Ok(()) => {
            debug!(%kind, stamped_at = record.timestamp(), "Event dispatched");
            DispatchOutcome::Executed(kind)
        }
        Err(reason) => {
            debug!(%kind, %reason, "Event dropped");
            DispatchOutcome::Dropped(kind, reason)
        }
    }
}

fn route<W>(payload: &GameEvent, world: &mut W, sink: &mut EventSink) -> Result<(), DropReason>
where
    W: SoldierRegistry + GameplayHandlers + ?Sized,
{
    match payload {
        GameEvent::GetNewPath(ev) => {
            let soldier = validate(&*world, ev.soldier)?;
            debug!(soldier = %soldier.id, dest = %ev.dest, anim = %ev.movement_anim, "GetNewPath");
            world.get_new_path(soldier, ev, sink);
        }
        GameEvent::SetDesiredDirection(ev) => {
            let soldier = validate(&*world, ev.soldier)?;
            debug!(soldier = %soldier.id, direction = ?ev.direction, "SetDesiredDirection");
            world.set_desired_direction(soldier, ev, sink);
        }
        GameEvent::BeginFireWeapon(ev) => {
            let soldier = validate(&*world, ev.soldier)?;
            debug!(soldier = %soldier.id, target = %ev.target.grid, "BeginFireWeapon");
            world.begin_fire_weapon(soldier, ev, sink);
        }
        GameEvent::FireWeapon(ev) => {
            let soldier = validate(&*world, ev.soldier)?;
            debug!(soldier = %soldier.id, target = %ev.target.grid, "FireWeapon");
            world.fire_weapon(soldier, ev, sink);
        }
        GameEvent::WeaponHit(ev) => {
            let victim = resolve_active(&*world, ev.victim)?;
            let attacker = resolve_active(&*world, ev.attacker)?;
            debug!(victim = %victim.id, attacker = %attacker.id, damage = ev.damage, "WeaponHit");
            world.weapon_hit(victim, attacker, ev, sink);
        }
        GameEvent::Noise(ev) => {
            let source = match ev.maker {
                Some(maker) => Some(validate(&*world, maker)?),
                None => None,
            };
            debug!(
                maker = ?source.map(|s| s.id),
                grid = %ev.grid,
                level = ev.level,
                kind = ?ev.kind,
                volume = ev.volume,
                "Noise"
            );
            world.noise(source, ev, sink);
        }
    }
    Ok(())
}

/// Resolve a slot that must hold an active soldier.
fn resolve_active<R>(registry: &R, id: SoldierId) -> Result<SoldierHandle, DropReason>
where
    R: SoldierRegistry + ?Sized,
{
    registry
        .lookup(id)
        .filter(|handle| handle.is_active)
        .ok_or(DropReason::InvalidTarget { soldier: id })
}

/// Resolve a slot and check it is still held by the generation in `target`.
fn validate<R>(registry: &R, target: SoldierRef) -> Result<SoldierHandle, DropReason>
where
    R: SoldierRegistry + ?Sized,
{
    let handle = resolve_active(registry, target.id)?;
    if handle.generation_token != target.token {
        return Err(DropReason::StaleTarget {
            soldier: target.id,
            expected: target.token,
            found: handle.generation_token,
        });
    }
    Ok(handle)
}
