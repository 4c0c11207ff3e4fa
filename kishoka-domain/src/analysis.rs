//! Swing points and Fibonacci level sets
//!
//! Derived analytic records. They are recomputed on every evaluation and are
//! never mutated in place.

use std::collections::BTreeMap;

use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

use crate::value_objects::DomainError;

/// Ratio of the retracement origin.
pub const RATIO_ORIGIN: Decimal = dec!(0);
/// Ratio of the midpoint level.
pub const RATIO_MID: Decimal = dec!(0.5);
/// Ratio of the full retracement.
pub const RATIO_FULL: Decimal = dec!(1);

// =============================================================================
// Swing Points
// =============================================================================

/// Which extreme a swing point marks
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SwingKind {
    /// Local maximum of highs
    High,
    /// Local minimum of lows
    Low,
}

/// A local extreme confirmed by a symmetric lookback window
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SwingPoint {
    /// Index of the bar in the evaluated series
    pub index: usize,
    /// High (for `High`) or low (for `Low`) of that bar
    pub price: Decimal,
    /// Extreme type
    pub kind: SwingKind,
}

impl SwingPoint {
    /// Create a swing high.
    pub fn high(index: usize, price: Decimal) -> Self {
        Self { index, price, kind: SwingKind::High }
    }

    /// Create a swing low.
    pub fn low(index: usize, price: Decimal) -> Self {
        Self { index, price, kind: SwingKind::Low }
    }
}

// =============================================================================
// Level Set
// =============================================================================

/// Which way price is expected to retrace
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RetraceDirection {
    /// Swing low is more recent than swing high: price fell and is expected
    /// to retrace upward. 0% is the low, 100% the high.
    BullishRetrace,
    /// Swing high is more recent than swing low: price rose and is expected
    /// to retrace downward. 0% is the high, 100% the low.
    BearishRetrace,
}

/// Retracement levels between the most recent swing high and swing low.
///
/// # Invariants
/// - `swing_high.price > swing_low.price`
/// - `levels[0]` / `levels[1]` are the extremes ordered by recency
/// - `levels[0.5] == (swing_high + swing_low) / 2` regardless of direction
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LevelSet {
    /// Most recent swing high
    pub swing_high: SwingPoint,
    /// Most recent swing low
    pub swing_low: SwingPoint,
    /// Retracement direction implied by which extreme came last
    pub direction: RetraceDirection,
    /// Ratio → price
    pub levels: BTreeMap<Decimal, Decimal>,
}

impl LevelSet {
    /// Price of a requested ratio, if it was computed.
    pub fn level(&self, ratio: Decimal) -> Option<Decimal> {
        self.levels.get(&ratio).copied()
    }

    /// Price at 0%.
    pub fn origin(&self) -> Decimal {
        match self.direction {
            RetraceDirection::BullishRetrace => self.swing_low.price,
            RetraceDirection::BearishRetrace => self.swing_high.price,
        }
    }

    /// Price at 50%.
    pub fn midpoint(&self) -> Decimal {
        (self.swing_high.price + self.swing_low.price) / Decimal::TWO
    }

    /// Price at 100%.
    pub fn full(&self) -> Decimal {
        match self.direction {
            RetraceDirection::BullishRetrace => self.swing_high.price,
            RetraceDirection::BearishRetrace => self.swing_low.price,
        }
    }

    /// Swing high minus swing low.
    pub fn range(&self) -> Decimal {
        self.swing_high.price - self.swing_low.price
    }

    /// Levels keyed by their conventional label (`fib_0`, `fib_50`, ...).
    ///
    /// `fib_0`, `fib_50` and `fib_100` always hold the anchor prices; another
    /// ratio truncating to the same label is dropped.
    pub fn labelled(&self) -> BTreeMap<String, Decimal> {
        let mut labelled = BTreeMap::new();
        for (ratio, price) in &self.levels {
            let label = fib_label(*ratio);
            if is_anchor(*ratio) || !(labelled.contains_key(&label) || is_anchor_label(&label)) {
                labelled.insert(label, *price);
            }
        }
        labelled
    }
}

/// Conventional label of a ratio: `0.5 → "fib_50"`, `0.618 → "fib_61"`.
pub fn fib_label(ratio: Decimal) -> String {
    format!("fib_{}", (ratio * Decimal::ONE_HUNDRED).trunc().normalize())
}

fn is_anchor(ratio: Decimal) -> bool {
    ratio == RATIO_ORIGIN || ratio == RATIO_MID || ratio == RATIO_FULL
}

fn is_anchor_label(label: &str) -> bool {
    [RATIO_ORIGIN, RATIO_MID, RATIO_FULL].iter().any(|anchor| fib_label(*anchor) == label)
}

/// Check a ratio lies within `[0, 1]`.
///
/// # Errors
/// Returns `DomainError::InvalidRatio` otherwise.
pub fn validate_ratio(ratio: Decimal) -> Result<(), DomainError> {
    if ratio < RATIO_ORIGIN || ratio > RATIO_FULL {
        return Err(DomainError::InvalidRatio(format!("{} is outside [0, 1]", ratio)));
    }
    Ok(())
}

// =============================================================================
// Tests
// =============================================================================
