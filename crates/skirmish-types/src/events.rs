//! Game event payloads.
//!
//! [`GameEvent`] is the closed set of actions that can be scheduled. Every
//! variant wraps a payload struct so handlers can take the kind-specific
//! fields by reference.

use serde::{Deserialize, Serialize};

use crate::enums::{Direction, HitLocation, NoiseKind};
use crate::ids::{AnimationId, GridNo, SoldierId, SoldierRef, WeaponIndex};

/// Where a shot is aimed: grid tile plus the vertical placement inside it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct FireTarget {
    /// Target tile.
    pub grid: GridNo,
    /// Map level of the target (0 ground, 1 roof).
    #[serde(default)]
    pub level: i8,
    /// Height band within the tile the shot is aimed at.
    #[serde(default)]
    pub cube_level: i8,
}

/// A position in world units.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct WorldPos {
    /// East-west coordinate.
    pub x: i16,
    /// North-south coordinate.
    pub y: i16,
    /// Height.
    pub z: i16,
}

/// Ask a soldier to plot and start walking a new path.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct GetNewPath {
    /// The soldier that should move.
    pub soldier: SoldierRef,
    /// Destination tile.
    pub dest: GridNo,
    /// Animation to use while walking.
    pub movement_anim: AnimationId,
}

/// Turn a soldier to face a direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SetDesiredDirection {
    /// The soldier that should turn.
    pub soldier: SoldierRef,
    /// The direction to face.
    pub direction: Direction,
}

/// Start the firing animation towards a target.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BeginFireWeapon {
    /// The shooter.
    pub soldier: SoldierRef,
    /// Where the shot goes.
    pub target: FireTarget,
}

/// Release the shot itself.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct FireWeapon {
    /// The shooter.
    pub soldier: SoldierRef,
    /// Where the shot goes.
    pub target: FireTarget,
}

/// A projectile or melee strike landed on a soldier.
///
/// Addresses two soldiers by plain slot id. Both must be active when the
/// event is dispatched.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct WeaponHit {
    /// The soldier that was hit.
    pub victim: SoldierId,
    /// The soldier that fired.
    pub attacker: SoldierId,
    /// Weapon used.
    pub weapon: WeaponIndex,
    /// Hit point damage.
    pub damage: i16,
    /// Breath (stamina) damage.
    #[serde(default)]
    pub breath_loss: i16,
    /// Direction the hit came from.
    pub direction: Direction,
    /// Impact position.
    #[serde(default)]
    pub position: WorldPos,
    /// Distance the projectile travelled.
    #[serde(default)]
    pub range: i16,
    /// Special effect code (burst, knife, dart ...), opaque to the pump.
    #[serde(default)]
    pub special: u8,
    /// Aimed body part.
    #[serde(default)]
    pub location: HitLocation,
}

/// A noise made somewhere on the map.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Noise {
    /// The soldier making the noise, `None` for environmental noise.
    #[serde(default)]
    pub maker: Option<SoldierRef>,
    /// Origin tile.
    pub grid: GridNo,
    /// Map level of the origin.
    #[serde(default)]
    pub level: i8,
    /// Loudness.
    pub volume: u8,
    /// Classification for the hearing model.
    pub kind: NoiseKind,
}

/// Every action the event pump can schedule.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum GameEvent {
    /// See [`GetNewPath`].
    GetNewPath(GetNewPath),
    /// See [`SetDesiredDirection`].
    SetDesiredDirection(SetDesiredDirection),
    /// See [`BeginFireWeapon`].
    BeginFireWeapon(BeginFireWeapon),
    /// See [`FireWeapon`].
    FireWeapon(FireWeapon),
    /// See [`WeaponHit`].
    WeaponHit(WeaponHit),
    /// See [`Noise`].
    Noise(Noise),
}

/// Payload-free discriminant of a [`GameEvent`], for logging and tallies.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EventKind {
    /// [`GameEvent::GetNewPath`].
    GetNewPath,
    /// [`GameEvent::SetDesiredDirection`].
    SetDesiredDirection,
    /// [`GameEvent::BeginFireWeapon`].
    BeginFireWeapon,
    /// [`GameEvent::FireWeapon`].
    FireWeapon,
    /// [`GameEvent::WeaponHit`].
    WeaponHit,
    /// [`GameEvent::Noise`].
    Noise,
}

impl core::fmt::Display for EventKind {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        let name = match self {
            Self::GetNewPath => "get_new_path",
            Self::SetDesiredDirection => "set_desired_direction",
            Self::BeginFireWeapon => "begin_fire_weapon",
            Self::FireWeapon => "fire_weapon",
            Self::WeaponHit => "weapon_hit",
            Self::Noise => "noise",
        };
        f.write_str(name)
    }
}

impl GameEvent {
    /// Return the kind of this event.
    pub const fn kind(&self) -> EventKind {
        match self {
            Self::GetNewPath(_) => EventKind::GetNewPath,
            Self::SetDesiredDirection(_) => EventKind::SetDesiredDirection,
            Self::BeginFireWeapon(_) => EventKind::BeginFireWeapon,
            Self::FireWeapon(_) => EventKind::FireWeapon,
            Self::WeaponHit(_) => EventKind::WeaponHit,
            Self::Noise(_) => EventKind::Noise,
        }
    }

    /// Slot id of the soldier this event is primarily about, if any.
    ///
    /// For a weapon hit this is the victim; environmental noise has none.
    pub fn primary_soldier(&self) -> Option<SoldierId> {
        match self {
            Self::GetNewPath(ev) => Some(ev.soldier.id),
            Self::SetDesiredDirection(ev) => Some(ev.soldier.id),
            Self::BeginFireWeapon(ev) => Some(ev.soldier.id),
            Self::FireWeapon(ev) => Some(ev.soldier.id),
            Self::WeaponHit(ev) => Some(ev.victim),
            Self::Noise(ev) => ev.maker.map(|maker| maker.id),
        }
    }
}

impl From<GetNewPath> for GameEvent {
    fn from(ev: GetNewPath) -> Self {
        Self::GetNewPath(ev)
    }
}

impl From<SetDesiredDirection> for GameEvent {
    fn from(ev: SetDesiredDirection) -> Self {
        Self::SetDesiredDirection(ev)
    }
}

impl From<BeginFireWeapon> for GameEvent {
    fn from(ev: BeginFireWeapon) -> Self {
        Self::BeginFireWeapon(ev)
    }
}

impl From<FireWeapon> for GameEvent {
    fn from(ev: FireWeapon) -> Self {
        Self::FireWeapon(ev)
    }
}

impl From<WeaponHit> for GameEvent {
    fn from(ev: WeaponHit) -> Self {
        Self::WeaponHit(ev)
    }
}

impl From<Noise> for GameEvent {
    fn from(ev: Noise) -> Self {
        Self::Noise(ev)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::panic)]
mod tests {
    use super::*;

    fn fire() -> GameEvent {
        GameEvent::FireWeapon(FireWeapon {
            soldier: SoldierRef::new(3, 7),
            target: FireTarget {
                grid: GridNo(10),
                level: 0,
                cube_level: 20,
            },
        })
    }

    #[test]
    fn kind_matches_variant() {
        assert_eq!(fire().kind(), EventKind::FireWeapon);
        assert_eq!(fire().kind().to_string(), "fire_weapon");
    }

    #[test]
    fn weapon_hit_primary_is_victim() {
        let hit = GameEvent::WeaponHit(WeaponHit {
            victim: SoldierId(9),
            attacker: SoldierId(3),
            weapon: WeaponIndex(1),
            damage: 12,
            breath_loss: 0,
            direction: Direction::East,
            position: WorldPos::default(),
            range: 4,
            special: 0,
            location: HitLocation::Torso,
        });
        assert_eq!(hit.primary_soldier(), Some(SoldierId(9)));
    }

    #[test]
    fn environmental_noise_has_no_primary_soldier() {
        let noise = GameEvent::Noise(Noise {
            maker: None,
            grid: GridNo(55),
            level: 0,
            volume: 40,
            kind: NoiseKind::Explosion,
        });
        assert_eq!(noise.primary_soldier(), None);
    }

    #[test]
    fn events_parse_from_tagged_yaml() {
        let yaml = "
event: get_new_path
soldier: { id: 4, token: 2 }
dest: 812
movement_anim: 1
";
        let event: GameEvent = serde_yml::from_str(yaml).unwrap();
        assert_eq!(
            event,
            GameEvent::GetNewPath(GetNewPath {
                soldier: SoldierRef::new(4, 2),
                dest: GridNo(812),
                movement_anim: AnimationId(1),
            })
        );
    }

    #[test]
    fn noise_defaults_optional_fields() {
        let yaml = "
event: noise
grid: 300
volume: 25
kind: gunfire
";
        let event: GameEvent = serde_yml::from_str(yaml).unwrap();
        let GameEvent::Noise(noise) = event else {
            panic!("expected a noise event, got {event:?}");
        };
        assert_eq!(noise.maker, None);
        assert_eq!(noise.level, 0);
        assert_eq!(noise.kind, NoiseKind::Gunfire);
    }
}
