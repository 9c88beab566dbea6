//! Event queues, delay promotion, and identity-checked dispatch for the
//! Skirmish event pump.
//!
//! Game logic never acts on a movement order or a shot directly. It enqueues
//! a [`GameEvent`] with a delay, and the per-tick driver replays everything
//! that has come due through the [`Scheduler`].
//!
//! # Modules
//!
//! - [`clock`] -- The [`Clock`] contract records are stamped with.
//! - [`record`] -- [`EventRecord`], [`Channel`] and [`EventDelay`].
//! - [`queue`] -- [`QueueStore`], the three FIFO channels.
//! - [`scheduler`] -- [`Scheduler`]: enqueue, `run_tick`, `run_demand_only`, `clear_primary`.
//! - [`dispatch`] -- [`execute`](dispatch::execute): registry checks and the handler match.
//! - [`sink`] -- [`EventSink`] for follow-ups produced during a drain.
//! - [`world`] -- [`SoldierRegistry`] and [`GameplayHandlers`] contracts.
//! - [`error`] -- [`SchedulerError`].
//!
//! [`GameEvent`]: skirmish_types::GameEvent

pub mod clock;
pub mod dispatch;
pub mod error;
pub mod queue;
pub mod record;
pub mod scheduler;
pub mod sink;
pub mod world;

pub use clock::{Clock, Tick};
pub use dispatch::{DispatchOutcome, DropReason};
pub use error::SchedulerError;
pub use queue::{QueueStats, QueueStore};
pub use record::{Channel, DEMAND_EVENT_DELAY, EventDelay, EventRecord};
pub use scheduler::{DrainReport, Scheduler};
pub use sink::{EventProducer, EventSink};
pub use world::{GameplayHandlers, SoldierHandle, SoldierRegistry};
