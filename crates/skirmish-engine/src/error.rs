//! Error types for the engine binary.
//!
//! [`EngineError`] wraps every failure mode during startup and the session
//! run so `main` can propagate with `?`.

/// Top-level error for the engine binary.
#[derive(Debug, thiserror::Error)]
pub enum EngineError {
    /// Configuration loading failed.
    #[error("config error: {source}")]
    Config {
        /// The underlying config error.
        #[from]
        source: skirmish_core::config::ConfigError,
    },

    /// Deploying the opening roster failed.
    #[error("roster error: {source}")]
    Roster {
        /// The underlying roster error.
        #[from]
        source: skirmish_core::roster::RosterError,
    },

    /// Staging the opening orders failed.
    #[error("scheduler error: {source}")]
    Scheduler {
        /// The underlying scheduler error.
        #[from]
        source: skirmish_events::SchedulerError,
    },

    /// The session runner failed.
    #[error("runner error: {source}")]
    Runner {
        /// The underlying runner error.
        #[from]
        source: skirmish_core::runner::RunnerError,
    },
}
