//! Replay configuration.
//!
//! Loads configuration from environment variables with the strategy's
//! defaults.

use std::env;
use std::str::FromStr;

use kishoka_domain::Instrument;
use kishoka_engine::{EvaluationContext, ResolverConfig, StrategyConfig, KISHOKA};
use rust_decimal::Decimal;

use crate::error::{SimError, SimResult};

// =============================================================================
// Configuration
// =============================================================================

/// Replay configuration.
#[derive(Debug, Clone)]
pub struct Config {
    /// Registry identifier of the strategy to replay
    pub strategy_id: String,

    /// Symbol of the replayed instrument (classified with `Instrument::classify`)
    pub symbol: String,

    /// ATR injected into every evaluation, if any
    pub atr: Option<Decimal>,

    /// Strategy parameters
    pub strategy: StrategyConfig,

    /// Pip table parameters
    pub resolver: ResolverConfig,
}

impl Config {
    /// Load configuration from environment variables.
    ///
    /// # Errors
    /// Returns `SimError::Config` for unparsable values and
    /// `SimError::Engine` when the resulting configuration fails validation.
    pub fn from_env() -> SimResult<Self> {
        // Load .env file if present (ignore errors)
        let _ = dotenvy::dotenv();

        let strategy_id = env::var("KISHOKA_STRATEGY").unwrap_or_else(|_| KISHOKA.to_string());
        let symbol = env::var("KISHOKA_SYMBOL").unwrap_or_else(|_| "EUR/USD".to_string());
        let atr = match env::var("KISHOKA_ATR") {
            Ok(val) => Some(parse_decimal("KISHOKA_ATR", &val)?),
            Err(_) => None,
        };

        let strategy = Self::load_strategy_config()?;
        strategy.validate()?;

        let resolver = Self::load_resolver_config()?;
        resolver.validate()?;

        Ok(Self { strategy_id, symbol, atr, strategy, resolver })
    }

    /// Create test configuration (lookback 2, otherwise defaults).
    pub fn test() -> Self {
        Self {
            strategy: StrategyConfig { swing_length: 2, ..Default::default() },
            ..Default::default()
        }
    }

    /// Evaluation context for the configured instrument.
    pub fn context(&self) -> EvaluationContext {
        EvaluationContext { instrument: Instrument::classify(&self.symbol), atr: self.atr }
    }

    fn load_strategy_config() -> SimResult<StrategyConfig> {
        let defaults = StrategyConfig::default();

        let swing_length = match env::var("KISHOKA_SWING_LENGTH") {
            Ok(val) => val
                .parse::<usize>()
                .map_err(|_| SimError::Config(format!("Invalid KISHOKA_SWING_LENGTH: {}", val)))?,
            Err(_) => defaults.swing_length,
        };

        let fib_levels = match env::var("KISHOKA_FIB_LEVELS") {
            Ok(val) => parse_fib_levels(&val)?,
            Err(_) => defaults.fib_levels,
        };

        Ok(StrategyConfig {
            swing_length,
            fib_levels,
            stop_loss_pips: Self::load_decimal_env("KISHOKA_STOP_LOSS_PIPS", defaults.stop_loss_pips)?,
            profit_secure_pips: Self::load_decimal_env("KISHOKA_PROFIT_SECURE_PIPS", defaults.profit_secure_pips)?,
            risk_free_offset: Self::load_decimal_env("KISHOKA_RISK_FREE_OFFSET", defaults.risk_free_offset)?,
            breakeven_offset_pips: Self::load_decimal_env(
                "KISHOKA_BREAKEVEN_OFFSET_PIPS",
                defaults.breakeven_offset_pips,
            )?,
            touch_tolerance_pips: Self::load_decimal_env(
                "KISHOKA_TOUCH_TOLERANCE_PIPS",
                defaults.touch_tolerance_pips,
            )?,
            atr_take_profit_multiplier: Self::load_decimal_env(
                "KISHOKA_ATR_MULTIPLIER",
                defaults.atr_take_profit_multiplier,
            )?,
            level_epsilon: defaults.level_epsilon,
        })
    }

    fn load_resolver_config() -> SimResult<ResolverConfig> {
        let defaults = ResolverConfig::default();

        Ok(ResolverConfig {
            equity_tick: Self::load_decimal_env("KISHOKA_EQUITY_TICK", defaults.equity_tick)?,
            commodity_tick: Self::load_decimal_env("KISHOKA_COMMODITY_TICK", defaults.commodity_tick)?,
            ..defaults
        })
    }

    fn load_decimal_env(key: &str, default: Decimal) -> SimResult<Decimal> {
        match env::var(key) {
            Ok(val) => parse_decimal(key, &val),
            Err(_) => Ok(default),
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            strategy_id: KISHOKA.to_string(),
            symbol: "EUR/USD".to_string(),
            atr: None,
            strategy: StrategyConfig::default(),
            resolver: ResolverConfig::default(),
        }
    }
}

fn parse_decimal(key: &str, val: &str) -> SimResult<Decimal> {
    Decimal::from_str(val.trim()).map_err(|_| SimError::Config(format!("Invalid {} value: {}", key, val)))
}

/// Parse a comma-separated ratio list (`"0.382, 0.5,0.618"`).
///
/// # Errors
/// Returns `SimError::Config` if an entry is not a decimal.
pub fn parse_fib_levels(val: &str) -> SimResult<Vec<Decimal>> {
    val.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(|s| parse_decimal("KISHOKA_FIB_LEVELS", s))
        .collect()
}

// =============================================================================
// Tests
// =============================================================================
