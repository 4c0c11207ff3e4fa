//! Position state owned by the caller
//!
//! The engine never stores positions. Every evaluation receives the previous
//! [`PositionState`] and hands back the next one.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::value_objects::Side;

// =============================================================================
// Open Position
// =============================================================================

/// Risk parameters of a live position
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct OpenPosition {
    /// Position direction
    pub side: Side,
    /// Entry price (close of the rejection bar)
    pub entry_price: Decimal,
    /// Stop currently in force
    pub current_stop: Decimal,
    /// Take-profit target
    pub take_profit: Decimal,
    /// Stop has been moved to breakeven (one-way)
    pub breakeven_armed: bool,
    /// Position reached its scale-in level (set once)
    pub scaled_in: bool,
    /// Pips beyond entry the breakeven stop is placed at
    pub breakeven_offset_pips: Decimal,
    /// 50% retracement level captured at entry, used for the scale-in rule
    pub scale_level: Decimal,
}

impl OpenPosition {
    /// Unrealized movement in the position's favor at `price`.
    pub fn favorable_move(&self, price: Decimal) -> Decimal {
        self.side.favorable_move(self.entry_price, price)
    }

    /// Stop has been reached or crossed at `price`.
    pub fn is_stop_hit(&self, price: Decimal) -> bool {
        match self.side {
            Side::Buy => price <= self.current_stop,
            Side::Sell => price >= self.current_stop,
        }
    }

    /// Target has been reached or crossed at `price`.
    pub fn is_target_hit(&self, price: Decimal) -> bool {
        match self.side {
            Side::Buy => price >= self.take_profit,
            Side::Sell => price <= self.take_profit,
        }
    }
}

// =============================================================================
// Position State Machine
// =============================================================================

/// Position lifecycle.
///
/// ```text
/// Pending ──open──▶ Open ──update/close──▶ Closed
///                    │ breakeven_armed (one-way)
///                    │ scaled_in (once)
/// ```
///
/// `Closed` is terminal: every transition applied to it returns it unchanged.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum PositionState {
    /// No position; a directional signal may open one
    #[default]
    Pending,

    /// Position live, risk rules applied on every update
    Open(OpenPosition),

    /// Position finished
    Closed {
        /// Position as it was when it closed
        position: OpenPosition,
        /// Why it closed
        reason: ExitReason,
        /// Price that triggered the close (None for a caller request without a price)
        exit_price: Option<Decimal>,
    },
}

impl PositionState {
    /// Five-valued lifecycle stage.
    ///
    /// Breakeven and scale-in are independent flags on an open position; when
    /// both are set the later stage, `Scaled`, is reported.
    pub fn status(&self) -> PositionStatus {
        match self {
            PositionState::Pending => PositionStatus::Pending,
            PositionState::Open(p) if p.scaled_in => PositionStatus::Scaled,
            PositionState::Open(p) if p.breakeven_armed => PositionStatus::BreakevenArmed,
            PositionState::Open(_) => PositionStatus::Open,
            PositionState::Closed { .. } => PositionStatus::Closed,
        }
    }

    /// Live position, if any.
    pub fn open_position(&self) -> Option<&OpenPosition> {
        match self {
            PositionState::Open(p) => Some(p),
            _ => None,
        }
    }

    /// True in `Pending`.
    pub fn is_pending(&self) -> bool {
        matches!(self, PositionState::Pending)
    }

    /// True in `Open`.
    pub fn is_open(&self) -> bool {
        matches!(self, PositionState::Open(_))
    }

    /// True in `Closed`.
    pub fn is_closed(&self) -> bool {
        matches!(self, PositionState::Closed { .. })
    }

    /// Stop currently in force (only while open).
    pub fn current_stop(&self) -> Option<Decimal> {
        self.open_position().map(|p| p.current_stop)
    }

    /// Target currently in force (only while open).
    pub fn take_profit(&self) -> Option<Decimal> {
        self.open_position().map(|p| p.take_profit)
    }
}

/// Stage names of the lifecycle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PositionStatus {
    /// Waiting for a signal
    Pending,
    /// Live with initial stop
    Open,
    /// Live with stop at breakeven
    BreakevenArmed,
    /// Live and scaled in
    Scaled,
    /// Finished
    Closed,
}

impl fmt::Display for PositionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            PositionStatus::Pending => "pending",
            PositionStatus::Open => "open",
            PositionStatus::BreakevenArmed => "breakeven_armed",
            PositionStatus::Scaled => "scaled",
            PositionStatus::Closed => "closed",
        };
        write!(f, "{}", name)
    }
}

/// Exit reason for position closure
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum ExitReason {
    /// Price crossed the stop before breakeven was armed
    StopLoss,
    /// Price crossed the stop after it was moved to breakeven
    Breakeven,
    /// Price reached the take-profit target
    TakeProfit,
    /// Caller asked to close
    Manual,
}

impl fmt::Display for ExitReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ExitReason::StopLoss => "stop_loss",
            ExitReason::Breakeven => "breakeven",
            ExitReason::TakeProfit => "take_profit",
            ExitReason::Manual => "manual",
        };
        write!(f, "{}", name)
    }
}

// =============================================================================
// Tests
// =============================================================================
