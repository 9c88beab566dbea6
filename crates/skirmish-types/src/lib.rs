//! Shared type definitions for the Skirmish event pump.
//!
//! Every crate in the workspace names soldiers, grid tiles and scheduled
//! actions through the types defined here.
//!
//! # Modules
//!
//! - [`ids`] -- Integer newtypes for soldier slots, generation tokens and grid tiles
//! - [`enums`] -- Direction, noise and hit-location codes
//! - [`events`] -- The [`GameEvent`] sum type and its payload structs

pub mod enums;
pub mod events;
pub mod ids;

// Re-export all public types at crate root for convenience.
pub use enums::{Direction, HitLocation, NoiseKind, UnknownCode};
pub use events::{
    BeginFireWeapon, EventKind, FireTarget, FireWeapon, GameEvent, GetNewPath, Noise,
    SetDesiredDirection, WeaponHit, WorldPos,
};
pub use ids::{AnimationId, GridNo, SoldierId, SoldierRef, UniqueToken, WeaponIndex};
