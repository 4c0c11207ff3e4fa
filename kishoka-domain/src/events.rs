//! Position Events
//!
//! Records of risk-state changes. The execution collaborator translates them
//! into broker order placements and modifications; the engine never calls it.

use crate::entities::ExitReason;
use crate::value_objects::Side;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Risk lifecycle events, in the order they happened within one evaluation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum PositionEvent {
    /// Position opened from a directional signal
    PositionOpened {
        /// Position direction
        side: Side,
        /// Entry price
        entry_price: Decimal,
        /// Initial stop
        stop_loss: Decimal,
        /// Initial target
        take_profit: Decimal,
    },

    /// Stop moved to breakeven after sufficient favorable movement
    BreakevenArmed {
        /// Stop before the move
        previous_stop: Decimal,
        /// Stop after the move
        new_stop: Decimal,
        /// Price that triggered the move
        trigger_price: Decimal,
    },

    /// Price reached the scale-in level
    ScaledIn {
        /// Level that was reached
        level: Decimal,
        /// Price that reached it
        trigger_price: Decimal,
    },

    /// Position closed
    PositionClosed {
        /// Why it closed
        reason: ExitReason,
        /// Price that triggered the close
        exit_price: Option<Decimal>,
    },
}

impl PositionEvent {
    /// Get the event type as a string
    pub fn event_type(&self) -> &'static str {
        match self {
            PositionEvent::PositionOpened { .. } => "position_opened",
            PositionEvent::BreakevenArmed { .. } => "breakeven_armed",
            PositionEvent::ScaledIn { .. } => "scaled_in",
            PositionEvent::PositionClosed { .. } => "position_closed",
        }
    }
}
