//! Error types for the skirmish-events crate.
//!
//! Only queue-level failures are errors. A dispatch that finds its target
//! dead or recycled is a normal outcome (see [`DropReason`]) and never
//! reaches this type.
//!
//! [`DropReason`]: crate::dispatch::DropReason

use std::collections::TryReserveError;

use crate::record::Channel;

/// Errors that can occur while enqueuing or draining events.
#[derive(Debug, thiserror::Error)]
pub enum SchedulerError {
    /// A channel could not grow to hold another record.
    #[error("allocation exhausted growing the {channel} channel: {source}")]
    AllocationExhausted {
        /// The channel that failed to grow.
        channel: Channel,
        /// The underlying reservation failure.
        source: TryReserveError,
    },

    /// A scan expected a record at a position the channel no longer has.
    #[error("queue corruption: {channel} channel has no record at position {index} (length {len})")]
    QueueCorruption {
        /// The channel being scanned.
        channel: Channel,
        /// The missing position.
        index: usize,
        /// The channel length when the lookup failed.
        len: usize,
    },
}
