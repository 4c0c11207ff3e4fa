//! Strategy and resolver configuration.
//!
//! Plain values with defaults and validation. Loading them from the
//! environment is the caller's concern.

use std::collections::BTreeMap;

use kishoka_domain::analysis::{fib_label, validate_ratio, RATIO_FULL, RATIO_MID, RATIO_ORIGIN};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

use crate::error::{EngineError, EngineResult};

// =============================================================================
// Strategy Configuration
// =============================================================================

/// Largest accepted swing lookback.
pub const MAX_SWING_LENGTH: usize = 10_000;

/// Parameters of the swing/retracement strategy.
///
/// Distances are in pips and converted through the resolved
/// [`InstrumentSpec`](kishoka_domain::InstrumentSpec).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StrategyConfig {
    /// Swing detection lookback on each side of a candidate bar
    pub swing_length: usize,
    /// Retracement ratios to publish (0, 0.5 and 1 are always included)
    pub fib_levels: Vec<Decimal>,
    /// Pips beyond the swing point the initial stop is placed at
    pub stop_loss_pips: Decimal,
    /// Minimum take-profit distance in pips
    pub profit_secure_pips: Decimal,
    /// Favorable movement in pips that arms breakeven
    pub risk_free_offset: Decimal,
    /// Pips beyond entry the breakeven stop is placed at
    pub breakeven_offset_pips: Decimal,
    /// Width of the touch zone around the swing extremes, in pips
    pub touch_tolerance_pips: Decimal,
    /// ATR multiple competing with `profit_secure_pips` for the target distance
    pub atr_take_profit_multiplier: Decimal,
    /// Swing ranges at or below this are degenerate
    pub level_epsilon: Decimal,
}

impl Default for StrategyConfig {
    fn default() -> Self {
        Self {
            swing_length: 14,
            fib_levels: vec![dec!(0), dec!(0.5), dec!(1)],
            stop_loss_pips: dec!(20),
            profit_secure_pips: dec!(50),
            risk_free_offset: dec!(20),
            breakeven_offset_pips: dec!(0),
            touch_tolerance_pips: dec!(5),
            atr_take_profit_multiplier: dec!(1.5),
            level_epsilon: dec!(0.00000001),
        }
    }
}

impl StrategyConfig {
    /// Bars needed before any swing can be confirmed (`2 * swing_length + 1`).
    pub fn min_bars(&self) -> usize {
        self.swing_length.saturating_mul(2).saturating_add(1)
    }

    /// Validate the configuration.
    ///
    /// # Errors
    /// Returns `EngineError::InvalidConfig` describing the first violation.
    pub fn validate(&self) -> EngineResult<()> {
        if self.swing_length == 0 || self.swing_length > MAX_SWING_LENGTH {
            return Err(EngineError::InvalidConfig(format!(
                "swing_length must be in [1, {}], got {}",
                MAX_SWING_LENGTH, self.swing_length
            )));
        }

        let mut labels = BTreeMap::new();
        for ratio in &self.fib_levels {
            validate_ratio(*ratio).map_err(|e| EngineError::InvalidConfig(e.to_string()))?;
            let ratio = ratio.normalize();
            // Distinct ratios must publish under distinct labels.
            if let Some(other) = labels.insert(fib_label(ratio), ratio) {
                if other != ratio {
                    return Err(EngineError::InvalidConfig(format!(
                        "fib levels {} and {} share the label {}",
                        other,
                        ratio,
                        fib_label(ratio)
                    )));
                }
            }
        }
        for anchor in [RATIO_ORIGIN, RATIO_MID, RATIO_FULL] {
            if let Some(ratio) = labels.get(&fib_label(anchor)).filter(|r| **r != anchor) {
                return Err(EngineError::InvalidConfig(format!(
                    "fib level {} shares the label {} with an anchor level",
                    ratio,
                    fib_label(anchor)
                )));
            }
        }

        if self.stop_loss_pips < Decimal::ZERO {
            return Err(EngineError::InvalidConfig("stop_loss_pips cannot be negative".to_string()));
        }

        if self.profit_secure_pips <= Decimal::ZERO {
            return Err(EngineError::InvalidConfig("profit_secure_pips must be positive".to_string()));
        }

        if self.risk_free_offset <= Decimal::ZERO {
            return Err(EngineError::InvalidConfig("risk_free_offset must be positive".to_string()));
        }

        // A breakeven stop at or beyond the arming distance would close the
        // position on the same update that armed it.
        if self.breakeven_offset_pips < Decimal::ZERO || self.breakeven_offset_pips >= self.risk_free_offset {
            return Err(EngineError::InvalidConfig(format!(
                "breakeven_offset_pips must be in [0, risk_free_offset), got {}",
                self.breakeven_offset_pips
            )));
        }

        if self.touch_tolerance_pips < Decimal::ZERO {
            return Err(EngineError::InvalidConfig("touch_tolerance_pips cannot be negative".to_string()));
        }

        if self.atr_take_profit_multiplier < Decimal::ZERO {
            return Err(EngineError::InvalidConfig(
                "atr_take_profit_multiplier cannot be negative".to_string(),
            ));
        }

        if self.level_epsilon < Decimal::ZERO {
            return Err(EngineError::InvalidConfig("level_epsilon cannot be negative".to_string()));
        }

        Ok(())
    }
}

// =============================================================================
// Resolver Configuration
// =============================================================================

/// Tick sizes for the classes without a fixed market convention.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResolverConfig {
    /// Equity tick
    pub equity_tick: Decimal,
    /// Equity quoting precision
    pub equity_precision: u32,
    /// Commodity tick
    pub commodity_tick: Decimal,
    /// Commodity quoting precision
    pub commodity_precision: u32,
}

impl Default for ResolverConfig {
    fn default() -> Self {
        Self {
            equity_tick: dec!(0.01),
            equity_precision: 2,
            commodity_tick: dec!(0.01),
            commodity_precision: 2,
        }
    }
}

impl ResolverConfig {
    /// Validate the configuration.
    ///
    /// # Errors
    /// Returns `EngineError::InvalidConfig` if a tick is not positive.
    pub fn validate(&self) -> EngineResult<()> {
        if self.equity_tick <= Decimal::ZERO {
            return Err(EngineError::InvalidConfig("equity_tick must be positive".to_string()));
        }
        if self.commodity_tick <= Decimal::ZERO {
            return Err(EngineError::InvalidConfig("commodity_tick must be positive".to_string()));
        }
        Ok(())
    }
}

// =============================================================================
// Tests
// =============================================================================
