//! Tick clock, configuration, soldier roster, and session driver for the
//! Skirmish event pump.
//!
//! # Modules
//!
//! - [`clock`] -- [`TickClock`], the shared monotonic tick counter.
//! - [`config`] -- Configuration loading from `skirmish-config.yaml` into
//!   strongly-typed structs.
//! - [`roster`] -- [`SoldierRoster`], the slot table events are validated
//!   against.
//! - [`runner`] -- [`TickDriver`] and the bounded [`run_session`] loop.
//!
//! [`TickClock`]: clock::TickClock
//! [`SoldierRoster`]: roster::SoldierRoster
//! [`TickDriver`]: runner::TickDriver
//! [`run_session`]: runner::run_session

pub mod clock;
pub mod config;
pub mod roster;
pub mod runner;
