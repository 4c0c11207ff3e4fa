//! Outbound signal record
//!
//! The shape consumed by downstream collaborators (execution, reporting):
//!
//! ```text
//! {direction, confidence, entry_price, stop_loss, take_profit,
//!  signal_type = "fibonacci_retracement",
//!  metadata: {risk_reward_ratio, last_swing_high, last_swing_low,
//!             fib_levels: {fib_0, fib_50, fib_100, ...}}}
//! ```

use std::collections::BTreeMap;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::value_objects::Side;

/// Signal type tag of swing/retracement signals.
pub const FIBONACCI_RETRACEMENT: &str = "fibonacci_retracement";

/// Trading recommendation emitted by a strategy
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Signal {
    /// Trade direction
    pub direction: Side,
    /// Deterministic score in `[0, 1]`
    pub confidence: Decimal,
    /// Suggested entry price
    pub entry_price: Decimal,
    /// Initial stop
    pub stop_loss: Decimal,
    /// Initial target
    pub take_profit: Decimal,
    /// Signal family tag
    pub signal_type: String,
    /// Supporting figures
    pub metadata: SignalMetadata,
}

/// Figures explaining a signal
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SignalMetadata {
    /// Reward distance divided by risk distance (0 when risk is zero)
    pub risk_reward_ratio: Decimal,
    /// Price of the swing high the levels were drawn from
    pub last_swing_high: Decimal,
    /// Price of the swing low the levels were drawn from
    pub last_swing_low: Decimal,
    /// Level prices keyed `fib_<percent>`
    pub fib_levels: BTreeMap<String, Decimal>,
}

impl Signal {
    /// Distance from entry to stop.
    pub fn risk(&self) -> Decimal {
        (self.entry_price - self.stop_loss).abs()
    }

    /// Distance from entry to target.
    pub fn reward(&self) -> Decimal {
        (self.take_profit - self.entry_price).abs()
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_signal_wire_shape() {
        let mut fib_levels = BTreeMap::new();
        fib_levels.insert("fib_0".to_string(), dec!(1.118));
        fib_levels.insert("fib_50".to_string(), dec!(1.1265));
        fib_levels.insert("fib_100".to_string(), dec!(1.135));

        let signal = Signal {
            direction: Side::Buy,
            confidence: dec!(0.75),
            entry_price: dec!(1.128),
            stop_loss: dec!(1.116),
            take_profit: dec!(1.133),
            signal_type: FIBONACCI_RETRACEMENT.to_string(),
            metadata: SignalMetadata {
                risk_reward_ratio: dec!(0.4167),
                last_swing_high: dec!(1.135),
                last_swing_low: dec!(1.118),
                fib_levels,
            },
        };

        assert_eq!(signal.risk(), dec!(0.012));
        assert_eq!(signal.reward(), dec!(0.005));

        let json = serde_json::to_value(&signal).unwrap();
        assert_eq!(json["direction"], "buy");
        assert_eq!(json["signal_type"], "fibonacci_retracement");
        assert_eq!(json["metadata"]["fib_levels"]["fib_50"], "1.1265");
        assert_eq!(json["metadata"]["last_swing_low"], "1.118");
    }
}
