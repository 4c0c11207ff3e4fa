//! Kishoka replay binary
//!
//! Replays a strategy over a JSON bar file and prints the report as JSON.
//!
//! # Usage
//!
//! ```bash
//! cargo run -p kishoka-sim --bin kishoka-replay -- bars.json
//!
//! KISHOKA_SYMBOL=USD/JPY KISHOKA_SWING_LENGTH=10 cargo run -p kishoka-sim --bin kishoka-replay -- bars.json
//! ```
//!
//! # Environment Variables
//!
//! - `KISHOKA_STRATEGY`: Strategy identifier (default: kishoka)
//! - `KISHOKA_SYMBOL`: Instrument symbol (default: EUR/USD)
//! - `KISHOKA_ATR`: ATR injected into every evaluation (default: none)
//! - `KISHOKA_SWING_LENGTH`: Swing lookback (default: 14)
//! - `KISHOKA_FIB_LEVELS`: Comma-separated ratios (default: 0,0.5,1)
//! - `KISHOKA_STOP_LOSS_PIPS`: Stop distance beyond the swing (default: 20)
//! - `KISHOKA_PROFIT_SECURE_PIPS`: Minimum target distance (default: 50)
//! - `KISHOKA_RISK_FREE_OFFSET`: Breakeven arming distance (default: 20)
//! - `KISHOKA_BREAKEVEN_OFFSET_PIPS`: Breakeven stop offset (default: 0)
//! - `KISHOKA_TOUCH_TOLERANCE_PIPS`: Swing zone width (default: 5)
//! - `KISHOKA_ATR_MULTIPLIER`: ATR target multiple (default: 1.5)
//! - `KISHOKA_EQUITY_TICK`: Equity tick (default: 0.01)
//! - `KISHOKA_COMMODITY_TICK`: Commodity tick (default: 0.01)

use std::env;

use anyhow::Context;
use kishoka_engine::StrategyRegistry;
use kishoka_sim::{load_bars, replay, Config};
use tracing::info;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

fn main() -> anyhow::Result<()> {
    // Initialize tracing (stderr, so stdout stays valid JSON)
    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(
            EnvFilter::from_default_env()
                .add_directive("kishoka_sim=info".parse()?)
                .add_directive("kishoka_engine=info".parse()?),
        )
        .init();

    // Load configuration
    let config = Config::from_env()?;

    let path = env::args().nth(1).context("usage: kishoka-replay <bars.json>")?;

    info!(
        version = env!("CARGO_PKG_VERSION"),
        strategy = %config.strategy_id,
        symbol = %config.symbol,
        swing_length = config.strategy.swing_length,
        %path,
        "Kishoka replay"
    );

    let series = load_bars(&path).with_context(|| format!("loading {}", path))?;

    let registry = StrategyRegistry::with_kishoka(config.strategy.clone(), config.resolver)?;
    let strategy = registry.get(&config.strategy_id)?;

    let report = replay(strategy, &series, &config.context());
    println!("{}", serde_json::to_string_pretty(&report)?);

    Ok(())
}
