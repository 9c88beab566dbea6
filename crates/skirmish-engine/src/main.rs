//! Demo engine binary for the Skirmish event pump.
//!
//! Wires the tick driver to a seeded demo world and runs one bounded
//! session.
//!
//! # Startup Sequence
//!
//! 1. Load configuration from `skirmish-config.yaml` (or `SKIRMISH_CONFIG`)
//! 2. Initialize structured logging (tracing)
//! 3. Deploy the opening roster on random tiles
//! 4. Stage opening orders when the config carries no script
//! 5. Run the session loop
//! 6. Log the result

mod demo;
mod error;

use std::path::PathBuf;

use skirmish_core::config::{LoggingConfig, SkirmishConfig};
use skirmish_core::runner::{self, TickCallback, TickDriver, TickSummary};
use skirmish_events::EventProducer;
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;

use crate::demo::DemoWorld;
use crate::error::EngineError;

/// Environment variable naming the config file to load.
const CONFIG_PATH_ENV: &str = "SKIRMISH_CONFIG";

/// Config file used when `SKIRMISH_CONFIG` is unset.
const DEFAULT_CONFIG_PATH: &str = "skirmish-config.yaml";

/// Application entry point.
///
/// # Errors
///
/// Returns an error if configuration, deployment or the session fails.
#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // 1. Load configuration.
    let (config, source) = load_config()?;

    // 2. Initialize structured logging.
    init_logging(&config.logging);
    info!("skirmish-engine starting");
    match &source {
        Some(path) => info!(path = %path.display(), "Configuration loaded"),
        None => info!("Config file not found, using defaults"),
    }
    info!(
        seed = config.session.seed,
        max_ticks = config.session.max_ticks,
        tick_interval_ms = config.session.tick_interval_ms,
        slots = config.roster.slots,
        "Session configured"
    );

    // 3. Deploy the opening roster.
    let mut world = build_world(&config)?;

    // 4. Stage opening orders.
    let mut driver = TickDriver::new(config.scheduler.initial_capacity);
    if config.session.script.is_empty() {
        let staged = stage_opening(&mut driver, &mut world)?;
        info!(staged, "Opening orders staged");
    } else {
        info!(scripted = config.session.script.len(), "Using scripted orders");
    }

    // 5. Run the session.
    let mut callback = TickLogger;
    let result = runner::run_session(&mut driver, &mut world, &config.session, &mut callback)
        .await
        .map_err(EngineError::from)?;

    // 6. Log results.
    runner::log_session_end(&result);
    info!(
        end_reason = ?result.end_reason,
        survivors = world.roster().active_count(),
        noises_heard = world.noises_heard(),
        "skirmish-engine shutdown complete"
    );

    Ok(())
}

/// Load configuration from `SKIRMISH_CONFIG` or `skirmish-config.yaml`.
///
/// Returns the path it was read from, or `None` if the file does not exist
/// and defaults were used.
fn load_config() -> Result<(SkirmishConfig, Option<PathBuf>), EngineError> {
    let path = std::env::var_os(CONFIG_PATH_ENV)
        .map_or_else(|| PathBuf::from(DEFAULT_CONFIG_PATH), PathBuf::from);
    if path.exists() {
        let config = SkirmishConfig::from_file(&path)?;
        Ok((config, Some(path)))
    } else {
        let mut config = SkirmishConfig::default();
        config.logging.apply_env_overrides();
        Ok((config, None))
    }
}

/// Install the global subscriber. `RUST_LOG` wins over the configured level.
fn init_logging(logging: &LoggingConfig) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&logging.level));
    if logging.json {
        tracing_subscriber::fmt()
            .json()
            .with_env_filter(filter)
            .with_target(true)
            .init();
    } else {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_target(true)
            .init();
    }
}

fn build_world(config: &SkirmishConfig) -> Result<DemoWorld, EngineError> {
    let mut world = DemoWorld::new(config.roster.slots, config.session.seed);
    let squad = world.deploy(config.roster.deployed)?;
    for soldier in &squad {
        if let Some(trooper) = world.trooper(soldier.id) {
            debug!(%soldier, grid = %trooper.grid, "Trooper placed");
        }
    }
    info!(deployed = squad.len(), "Roster deployed");
    Ok(world)
}

fn stage_opening(driver: &mut TickDriver, world: &mut DemoWorld) -> Result<usize, EngineError> {
    let orders = world.opening_orders();
    let staged = orders.len();
    for (event, delay) in orders {
        driver.enqueue_event(event, delay)?;
    }
    Ok(staged)
}

/// Logs queue depth after every tick.
struct TickLogger;

impl TickCallback for TickLogger {
    fn on_tick(&mut self, summary: &TickSummary) {
        debug!(
            tick = summary.tick,
            dispatched = summary.report.map(|r| r.dispatched),
            primary = summary.stats.primary,
            delayed = summary.stats.delayed,
            demand = summary.stats.demand,
            "Tick complete"
        );
    }
}
