//! Enumerations carried inside event payloads.
//!
//! Each enum mirrors a small integer code used by the game data. `TryFrom<u8>`
//! converts raw codes, rejecting anything outside the known range.

use serde::{Deserialize, Serialize};

/// A raw code did not match any variant of the target enum.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[error("unknown {kind} code: {value}")]
pub struct UnknownCode {
    /// Name of the enum that rejected the code.
    pub kind: &'static str,
    /// The rejected raw value.
    pub value: u8,
}

/// One of the eight compass directions a soldier can face.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Direction {
    /// Code 0.
    North,
    /// Code 1.
    NorthEast,
    /// Code 2.
    East,
    /// Code 3.
    SouthEast,
    /// Code 4.
    South,
    /// Code 5.
    SouthWest,
    /// Code 6.
    West,
    /// Code 7.
    NorthWest,
}

impl Direction {
    /// All directions in code order.
    pub const ALL: [Self; 8] = [
        Self::North,
        Self::NorthEast,
        Self::East,
        Self::SouthEast,
        Self::South,
        Self::SouthWest,
        Self::West,
        Self::NorthWest,
    ];

    /// The direction facing the other way.
    #[must_use]
    pub const fn opposite(self) -> Self {
        match self {
            Self::North => Self::South,
            Self::NorthEast => Self::SouthWest,
            Self::East => Self::West,
            Self::SouthEast => Self::NorthWest,
            Self::South => Self::North,
            Self::SouthWest => Self::NorthEast,
            Self::West => Self::East,
            Self::NorthWest => Self::SouthEast,
        }
    }
}

impl TryFrom<u8> for Direction {
    type Error = UnknownCode;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        Self::ALL
            .get(usize::from(value))
            .copied()
            .ok_or(UnknownCode {
                kind: "direction",
                value,
            })
    }
}

/// Classification of a noise, used by the hearing model to weight it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NoiseKind {
    /// Unclassified noise.
    Unknown,
    /// Footsteps and other movement.
    Movement,
    /// Creaking floors or doors.
    Creaking,
    /// Wading or swimming.
    Splashing,
    /// A bullet striking something.
    BulletImpact,
    /// A weapon being fired.
    Gunfire,
    /// An explosion.
    Explosion,
    /// A scream from a wounded soldier.
    Scream,
    /// A thrown rock landing.
    RockImpact,
    /// A grenade landing before it goes off.
    GrenadeImpact,
    /// Breaking glass.
    WindowSmashing,
    /// A door being kicked in.
    DoorSmashing,
    /// An alarm only the defenders can hear.
    SilentAlarm,
}

impl NoiseKind {
    /// All noise kinds in code order.
    pub const ALL: [Self; 13] = [
        Self::Unknown,
        Self::Movement,
        Self::Creaking,
        Self::Splashing,
        Self::BulletImpact,
        Self::Gunfire,
        Self::Explosion,
        Self::Scream,
        Self::RockImpact,
        Self::GrenadeImpact,
        Self::WindowSmashing,
        Self::DoorSmashing,
        Self::SilentAlarm,
    ];
}

impl TryFrom<u8> for NoiseKind {
    type Error = UnknownCode;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        Self::ALL
            .get(usize::from(value))
            .copied()
            .ok_or(UnknownCode {
                kind: "noise kind",
                value,
            })
    }
}

/// Body part a shot was aimed at.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HitLocation {
    /// No aimed shot; the location is rolled by the damage model.
    #[default]
    Random,
    /// Aimed at the head.
    Head,
    /// Aimed at the torso.
    Torso,
    /// Aimed at the legs.
    Legs,
}

impl TryFrom<u8> for HitLocation {
    type Error = UnknownCode;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            0 => Ok(Self::Random),
            1 => Ok(Self::Head),
            2 => Ok(Self::Torso),
            3 => Ok(Self::Legs),
            _ => Err(UnknownCode {
                kind: "hit location",
                value,
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn direction_codes_follow_compass_order() {
        assert_eq!(Direction::try_from(0), Ok(Direction::North));
        assert_eq!(Direction::try_from(3), Ok(Direction::SouthEast));
        assert_eq!(Direction::try_from(7), Ok(Direction::NorthWest));
        assert!(Direction::try_from(8).is_err());
    }

    #[test]
    fn opposite_is_an_involution() {
        for dir in Direction::ALL {
            assert_eq!(dir.opposite().opposite(), dir);
            assert_ne!(dir.opposite(), dir);
        }
    }

    #[test]
    fn noise_kind_rejects_out_of_range() {
        assert_eq!(NoiseKind::try_from(5), Ok(NoiseKind::Gunfire));
        assert_eq!(NoiseKind::try_from(12), Ok(NoiseKind::SilentAlarm));
        let err = NoiseKind::try_from(13);
        assert_eq!(
            err,
            Err(UnknownCode {
                kind: "noise kind",
                value: 13
            })
        );
    }

    #[test]
    fn hit_location_defaults_to_random() {
        assert_eq!(HitLocation::default(), HitLocation::Random);
        assert_eq!(HitLocation::try_from(2), Ok(HitLocation::Torso));
        assert!(HitLocation::try_from(4).is_err());
    }
}
