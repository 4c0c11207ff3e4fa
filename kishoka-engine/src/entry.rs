//! Rejection pattern on the latest bar.
//!
//! # Conditions
//!
//! - **Bullish**: the bar's low reaches the swing-low zone
//!   (`low <= swing_low + tolerance`), the bar closes above its open, and the
//!   close is above the 50% level.
//! - **Bearish**: the bar's high reaches the swing-high zone
//!   (`high >= swing_high - tolerance`), the bar closes below its open, and
//!   the close is below the 50% level.
//!
//! # Confidence
//!
//! ```text
//! body_dominance = |close - open| / (high - low)
//! beyond_mid     = clamp01(distance closed past the 50% level / half swing range)
//! confidence     = clamp01(0.5 * body_dominance + 0.5 * beyond_mid), 4 dp
//! ```
//!
//! Both terms grow with the strength of the rejection, so the score is
//! monotonic in each. A zero-range bar never produces a candidate.

use kishoka_domain::{LevelSet, PriceBar, Side};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use tracing::debug;

const CONFIDENCE_DP: u32 = 4;
const HALF: Decimal = dec!(0.5);

/// Result of checking the latest bar against the level set
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CandidateSignal {
    /// Rejection direction, `None` when no pattern formed
    pub direction: Option<Side>,
    /// Bar the pattern formed on
    pub rejection_bar: Option<PriceBar>,
    /// Score in `[0, 1]` (0 when no pattern formed)
    pub confidence: Decimal,
}

impl CandidateSignal {
    /// No pattern.
    pub fn none() -> Self {
        Self { direction: None, rejection_bar: None, confidence: Decimal::ZERO }
    }

    /// A pattern formed.
    pub fn is_directional(&self) -> bool {
        self.direction.is_some()
    }
}

/// Evaluate the last bar of `recent_bars` against `levels`.
///
/// `tolerance` is a price distance (already converted from pips).
pub fn evaluate(levels: &LevelSet, recent_bars: &[PriceBar], tolerance: Decimal) -> CandidateSignal {
    let Some(bar) = recent_bars.last() else {
        return CandidateSignal::none();
    };

    let range = bar.range();
    if range <= Decimal::ZERO {
        return CandidateSignal::none();
    }

    let mid = levels.midpoint();
    let swing_high = levels.swing_high.price;
    let swing_low = levels.swing_low.price;

    let (side, beyond_mid, half_range) = if bar.low <= swing_low + tolerance && bar.is_bullish() && bar.close > mid {
        (Side::Buy, bar.close - mid, swing_high - mid)
    } else if bar.high >= swing_high - tolerance && bar.is_bearish() && bar.close < mid {
        (Side::Sell, mid - bar.close, mid - swing_low)
    } else {
        return CandidateSignal::none();
    };

    let body_dominance = bar.body() / range;
    let beyond = if half_range > Decimal::ZERO { clamp01(beyond_mid / half_range) } else { Decimal::ZERO };
    let confidence = clamp01(HALF * body_dominance + HALF * beyond).round_dp(CONFIDENCE_DP);

    debug!(
        side = %side,
        close = %bar.close,
        midpoint = %mid,
        %confidence,
        "Rejection pattern detected"
    );

    CandidateSignal { direction: Some(side), rejection_bar: Some(bar.clone()), confidence }
}

fn clamp01(value: Decimal) -> Decimal {
    value.max(Decimal::ZERO).min(Decimal::ONE)
}

// =============================================================================
// Tests
// =============================================================================
