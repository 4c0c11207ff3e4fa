//! Value Objects for the Kishoka Domain
//!
//! Small immutable primitives shared by every layer.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Domain errors raised at the input boundary
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DomainError {
    /// Bar sequence is out of order or a bar is internally inconsistent
    #[error("Malformed input: {0}")]
    MalformedInput(String),

    /// Instrument specification is unusable (e.g. non-positive pip size)
    #[error("Invalid instrument: {0}")]
    InvalidInstrument(String),

    /// Fibonacci ratio outside of [0, 1]
    #[error("Invalid ratio: {0}")]
    InvalidRatio(String),
}

// =============================================================================
// Side
// =============================================================================

/// Side represents the trade direction of a signal or position
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Side {
    /// Long (profit when price rises)
    Buy,
    /// Short (profit when price falls)
    Sell,
}

impl Side {
    /// Signed price movement in this side's favor.
    ///
    /// Positive when `to` is better than `from` for the position.
    ///
    /// ```
    /// # use kishoka_domain::Side;
    /// # use rust_decimal_macros::dec;
    /// assert_eq!(Side::Buy.favorable_move(dec!(1.1280), dec!(1.1300)), dec!(0.0020));
    /// assert_eq!(Side::Sell.favorable_move(dec!(1.1280), dec!(1.1300)), dec!(-0.0020));
    /// ```
    pub fn favorable_move(&self, from: Decimal, to: Decimal) -> Decimal {
        match self {
            Side::Buy => to - from,
            Side::Sell => from - to,
        }
    }

    /// Shift `price` by `distance` in this side's favorable direction
    pub fn toward_profit(&self, price: Decimal, distance: Decimal) -> Decimal {
        match self {
            Side::Buy => price + distance,
            Side::Sell => price - distance,
        }
    }

    /// Shift `price` by `distance` against this side
    pub fn toward_loss(&self, price: Decimal, distance: Decimal) -> Decimal {
        match self {
            Side::Buy => price - distance,
            Side::Sell => price + distance,
        }
    }

    /// Lowercase wire name ("buy" / "sell")
    pub fn as_str(&self) -> &'static str {
        match self {
            Side::Buy => "buy",
            Side::Sell => "sell",
        }
    }
}

impl fmt::Display for Side {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Side::Buy => write!(f, "BUY"),
            Side::Sell => write!(f, "SELL"),
        }
    }
}

// =============================================================================
// Tests
// =============================================================================
