//! Strongly-typed numeric wrappers for identifiers and map indices.
//!
//! Soldier slots, generation tokens, grid indices and animation ids are all
//! small integers in the game data. Wrapping each in its own newtype keeps a
//! grid number from being passed where a soldier id is expected.

use serde::{Deserialize, Serialize};

/// Generates a newtype wrapper around an integer with standard derives.
macro_rules! define_id {
    (
        $(#[$meta:meta])*
        $name:ident($inner:ty)
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(pub $inner);

        impl $name {
            /// Wrap a raw value.
            pub const fn new(raw: $inner) -> Self {
                Self(raw)
            }

            /// Return the raw inner value.
            pub const fn into_inner(self) -> $inner {
                self.0
            }
        }

        impl core::fmt::Display for $name {
            fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl From<$inner> for $name {
            fn from(raw: $inner) -> Self {
                Self(raw)
            }
        }

        impl From<$name> for $inner {
            fn from(id: $name) -> Self {
                id.0
            }
        }
    };
}

define_id! {
    /// Slot index of a soldier in the tactical roster.
    ///
    /// Slots are reused after a soldier dies, so an id alone does not
    /// identify a unit over time. Pair it with a [`UniqueToken`].
    SoldierId(u16)
}

define_id! {
    /// Per-slot generation counter distinguishing the current occupant of a
    /// soldier slot from any earlier occupant.
    UniqueToken(u32)
}

define_id! {
    /// Index of a tile in the tactical map grid.
    GridNo(i16)
}

define_id! {
    /// Movement animation to play while walking a new path.
    AnimationId(u16)
}

define_id! {
    /// Item index of the weapon that produced a hit.
    WeaponIndex(u16)
}

impl UniqueToken {
    /// Return the token that follows this one, wrapping at `u32::MAX`.
    #[must_use]
    pub const fn next(self) -> Self {
        Self(self.0.wrapping_add(1))
    }
}

/// A soldier addressed by slot id and the generation token it had when the
/// event was created.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SoldierRef {
    /// Roster slot of the addressed soldier.
    pub id: SoldierId,
    /// Generation token of the slot at event creation time.
    pub token: UniqueToken,
}

impl SoldierRef {
    /// Build a reference from raw slot and token values.
    pub const fn new(id: u16, token: u32) -> Self {
        Self {
            id: SoldierId(id),
            token: UniqueToken(token),
        }
    }
}

impl core::fmt::Display for SoldierRef {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "{}#{}", self.id, self.token)
    }
}
