//! Buy/sell/hold recommendation derived from an evaluation.

use std::fmt;

use kishoka_domain::Side;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

use crate::evaluation::Evaluation;

/// Confidence reported with a hold.
pub const NEUTRAL_CONFIDENCE: Decimal = dec!(0.5);

/// Number of most recent bars a signal stays actionable for.
pub const RECENT_SIGNAL_BARS: usize = 3;

/// Recommended action
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Action {
    /// Enter long
    Buy,
    /// Enter short
    Sell,
    /// Stay out
    Hold,
}

impl From<Side> for Action {
    fn from(side: Side) -> Self {
        match side {
            Side::Buy => Action::Buy,
            Side::Sell => Action::Sell,
        }
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Action::Buy => write!(f, "buy"),
            Action::Sell => write!(f, "sell"),
            Action::Hold => write!(f, "hold"),
        }
    }
}

/// Recommendation presented to the user
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Recommendation {
    /// What to do
    pub action: Action,
    /// Signal confidence, or 0.5 for a hold
    pub confidence: Decimal,
    /// Entry price (directional only)
    pub entry_price: Option<Decimal>,
    /// Stop (directional only)
    pub stop_loss: Option<Decimal>,
    /// Target (directional only)
    pub take_profit: Option<Decimal>,
    /// Short human-readable explanation
    pub reason: String,
}

impl Recommendation {
    /// Build from an evaluation: the signal if one was emitted, a hold otherwise.
    pub fn from_evaluation(evaluation: &Evaluation) -> Self {
        match &evaluation.signal {
            Some(signal) => Self {
                action: signal.direction.into(),
                confidence: signal.confidence,
                entry_price: Some(signal.entry_price),
                stop_loss: Some(signal.stop_loss),
                take_profit: Some(signal.take_profit),
                reason: format!(
                    "{} rejection between swing high {} and swing low {}",
                    signal.direction.as_str(),
                    signal.metadata.last_swing_high,
                    signal.metadata.last_swing_low
                ),
            },
            None => Self::hold(
                evaluation
                    .skipped
                    .map(|reason| reason.to_string())
                    .unwrap_or_else(|| "no signal".to_string()),
            ),
        }
    }

    /// Build from consecutive evaluations, oldest first.
    ///
    /// The latest signal among the last [`RECENT_SIGNAL_BARS`] evaluations is
    /// recommended; without one the newest evaluation decides the hold reason.
    pub fn from_recent(evaluations: &[Evaluation]) -> Self {
        let recent = &evaluations[evaluations.len().saturating_sub(RECENT_SIGNAL_BARS)..];
        match recent.iter().rev().find(|e| e.has_signal()).or_else(|| recent.last()) {
            Some(evaluation) => Self::from_evaluation(evaluation),
            None => Self::hold("no signal".to_string()),
        }
    }

    fn hold(reason: String) -> Self {
        Self {
            action: Action::Hold,
            confidence: NEUTRAL_CONFIDENCE,
            entry_price: None,
            stop_loss: None,
            take_profit: None,
            reason,
        }
    }
}
