//! Configuration loading and typed config structures for the Skirmish engine.
//!
//! The canonical configuration lives in `skirmish-config.yaml` at the project
//! root. This module defines strongly-typed structs that mirror the YAML
//! structure, and provides a loader that reads and validates the file.
//! Every field has a default, so an empty file is a valid configuration.

use std::path::Path;

use serde::Deserialize;
use skirmish_events::EventDelay;
use skirmish_types::GameEvent;

/// Environment variable that overrides `logging.level`.
pub const LOG_LEVEL_ENV: &str = "SKIRMISH_LOG";

/// Errors that can occur when loading configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// Failed to read the configuration file from disk.
    #[error("failed to read config file: {source}")]
    Io {
        /// The underlying I/O error.
        #[from]
        source: std::io::Error,
    },

    /// Failed to parse YAML content.
    #[error("failed to parse config YAML: {source}")]
    Yaml {
        /// The underlying YAML parse error.
        source: serde_yml::Error,
    },

    /// The configuration parsed but describes an impossible setup.
    #[error("invalid configuration: {reason}")]
    Invalid {
        /// Explanation of what is wrong.
        reason: String,
    },
}

impl From<serde_yml::Error> for ConfigError {
    fn from(source: serde_yml::Error) -> Self {
        Self::Yaml { source }
    }
}

/// Top-level engine configuration.
///
/// Mirrors the structure of `skirmish-config.yaml`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct SkirmishConfig {
    /// Session pacing, bounds and the scripted opening.
    #[serde(default)]
    pub session: SessionConfig,

    /// Event queue sizing.
    #[serde(default)]
    pub scheduler: SchedulerConfig,

    /// Soldier roster dimensions.
    #[serde(default)]
    pub roster: RosterConfig,

    /// Logging configuration.
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl SkirmishConfig {
    /// Load configuration from a YAML file at the given path.
    ///
    /// `SKIRMISH_LOG` overrides `logging.level` when set.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Io`] if the file cannot be read,
    /// [`ConfigError::Yaml`] if the content is not valid YAML, or
    /// [`ConfigError::Invalid`] if validation fails.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)?;
        let mut config = Self::parse(&contents)?;
        config.logging.apply_env_overrides();
        Ok(config)
    }

    /// Parse and validate configuration from a YAML string.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Yaml`] if the string is not valid YAML, or
    /// [`ConfigError::Invalid`] if validation fails.
    pub fn parse(yaml: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_yml::from_str(yaml)?;
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.roster.deployed > self.roster.slots {
            return Err(ConfigError::Invalid {
                reason: format!(
                    "roster.deployed ({}) exceeds roster.slots ({})",
                    self.roster.deployed, self.roster.slots
                ),
            });
        }
        if let Some(entry) = self
            .session
            .script
            .iter()
            .find(|entry| self.session.max_ticks > 0 && entry.at_tick >= self.session.max_ticks)
        {
            return Err(ConfigError::Invalid {
                reason: format!(
                    "scripted {} event at tick {} would never run: session.max_ticks is {}",
                    entry.event.kind(),
                    entry.at_tick,
                    self.session.max_ticks
                ),
            });
        }
        Ok(())
    }
}

/// Session pacing and bounds.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct SessionConfig {
    /// Real-time milliseconds between ticks (0 = run flat out).
    #[serde(default = "default_tick_interval_ms")]
    pub tick_interval_ms: u64,

    /// Number of ticks to run before the session ends (0 = unlimited).
    #[serde(default = "default_max_ticks")]
    pub max_ticks: u64,

    /// Random seed for reproducible gameplay rolls.
    #[serde(default = "default_seed")]
    pub seed: u64,

    /// Events to inject at fixed ticks.
    #[serde(default)]
    pub script: Vec<ScriptedEvent>,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            tick_interval_ms: default_tick_interval_ms(),
            max_ticks: default_max_ticks(),
            seed: default_seed(),
            script: Vec::new(),
        }
    }
}

/// An event injected into the scheduler when the session reaches `at_tick`.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ScriptedEvent {
    /// Tick at which the event is enqueued. Must be below `max_ticks` when
    /// the session is bounded.
    pub at_tick: u64,

    /// Raw delay in ticks. `65535` routes to the demand channel.
    #[serde(default)]
    pub delay: u16,

    /// The event itself.
    pub event: GameEvent,
}

impl ScriptedEvent {
    /// The typed delay this entry is enqueued with.
    pub fn delay(&self) -> EventDelay {
        EventDelay::from(self.delay)
    }
}

/// Event queue sizing.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct SchedulerConfig {
    /// Records pre-allocated per channel.
    #[serde(default = "default_initial_capacity")]
    pub initial_capacity: usize,
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        Self {
            initial_capacity: default_initial_capacity(),
        }
    }
}

/// Soldier roster dimensions.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct RosterConfig {
    /// Total soldier slots on the tactical map.
    #[serde(default = "default_slots")]
    pub slots: u16,

    /// Soldiers deployed when the session starts.
    #[serde(default = "default_deployed")]
    pub deployed: u16,
}

impl Default for RosterConfig {
    fn default() -> Self {
        Self {
            slots: default_slots(),
            deployed: default_deployed(),
        }
    }
}

/// Logging configuration.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct LoggingConfig {
    /// Log level filter (trace, debug, info, warn, error, or an `EnvFilter`
    /// directive string).
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Emit JSON lines instead of human-readable output.
    #[serde(default)]
    pub json: bool,
}

impl LoggingConfig {
    /// Override the level from `SKIRMISH_LOG` when set.
    pub fn apply_env_overrides(&mut self) {
        if let Ok(val) = std::env::var(LOG_LEVEL_ENV) {
            self.level = val;
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            json: false,
        }
    }
}

// ---------------------------------------------------------------------------
// Default value functions
// ---------------------------------------------------------------------------

const fn default_tick_interval_ms() -> u64 {
    100
}

const fn default_max_ticks() -> u64 {
    60
}

const fn default_seed() -> u64 {
    42
}

const fn default_initial_capacity() -> usize {
    64
}

const fn default_slots() -> u16 {
    32
}

const fn default_deployed() -> u16 {
    6
}

fn default_log_level() -> String {
    "info".to_owned()
}
