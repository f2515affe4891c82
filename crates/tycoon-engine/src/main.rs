//! Market session binary for the Tycoon economy core.
//!
//! Wires the ledger, the starting town and the property market together
//! and plays a scripted trading session on them. Step outcomes go to
//! stdout as JSON lines; diagnostics go to the tracing subscriber.
//!
//! # Startup Sequence
//!
//! 1. Load configuration from `tycoon-config.yaml` (or the path given as
//!    the first argument)
//! 2. Initialize structured logging (tracing)
//! 3. Create the starting town (24x24 grid, four avenues)
//! 4. Open wallets and wire the market
//! 5. Run the session
//! 6. Log the result

mod error;
mod session;

use std::path::{Path, PathBuf};
use std::sync::Arc;

use tracing::info;
use tracing_subscriber::EnvFilter;
use tycoon_market::{LoggingConfig, MarketConfig};
use tycoon_world::SharedMap;

use crate::error::EngineError;
use crate::session::Session;

/// Config file read when no path is given.
const DEFAULT_CONFIG_PATH: &str = "tycoon-config.yaml";

/// Application entry point for the market session.
///
/// # Errors
///
/// Returns an error if any initialization step or the session fails.
fn main() -> Result<(), Box<dyn std::error::Error>> {
    // 1. Load configuration. Logging depends on it, so report later.
    let config_path = std::env::args()
        .nth(1)
        .map_or_else(|| PathBuf::from(DEFAULT_CONFIG_PATH), PathBuf::from);
    let loaded = load_config(&config_path)?;
    let found = loaded.is_some();
    let config = loaded.unwrap_or_default();

    // 2. Initialize structured logging.
    init_logging(&config.logging);
    info!("tycoon-engine starting");
    if found {
        info!(path = %config_path.display(), "Configuration loaded");
    } else {
        info!(path = %config_path.display(), "Config file not found, using defaults");
    }
    info!(
        base_land_value = %config.valuation.base_land_value,
        commission_rate = %config.commission.rate,
        income_tax = %config.taxes.income,
        "Market parameters"
    );

    // 3. Create the starting town.
    let (map, town) = tycoon_world::create_starting_town()?;
    info!(
        width = map.width(),
        height = map.height(),
        corner_plot = %town.corner_plot,
        "Starting town created"
    );

    // 4. Open wallets and wire the market.
    let session = Session::new(Arc::new(SharedMap::new(map)), town, config);

    // 5. Run the session.
    let summary = session.run()?;

    // 6. Log the result.
    info!(
        month = summary.month,
        transactions = summary.transactions,
        treasury_intake = %summary.treasury_intake,
        total_supply = %summary.total_supply,
        "Session complete"
    );

    Ok(())
}

/// Read `path` if it exists. `None` means the defaults apply.
fn load_config(path: &Path) -> Result<Option<MarketConfig>, EngineError> {
    if path.exists() {
        Ok(Some(MarketConfig::from_file(path)?))
    } else {
        Ok(None)
    }
}

/// Install the global subscriber. `RUST_LOG` wins over the configured level.
fn init_logging(config: &LoggingConfig) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.level));
    if config.json {
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
