//! Position risk state machine.
//!
//! Every transition takes the previous [`PositionState`] and returns the next
//! one inside a [`RiskDecision`]; nothing is remembered between calls.
//!
//! # Update order
//!
//! On each price update of an open position:
//!
//! 1. **Breakeven**: once favorable movement reaches `risk_free_offset` pips,
//!    the stop moves to entry (plus `breakeven_offset_pips`). One-way, once.
//! 2. **Scale-in**: once price is at or beyond the 50% level captured at
//!    entry on the favorable side, `scaled_in` is set. Once.
//! 3. **Exit**: target first, then stop. A stop hit after breakeven is
//!    reported as [`ExitReason::Breakeven`].
//!
//! Transitions applied to a closed position are ignored and flagged stale.

use kishoka_domain::{
    ExitReason, InstrumentSpec, LevelSet, OpenPosition, PositionEvent, PositionState, Side,
};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::config::StrategyConfig;

// =============================================================================
// Entry Plan
// =============================================================================

/// Stop, target and scale level computed for a prospective entry
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct EntryPlan {
    /// Direction
    pub side: Side,
    /// Entry price (close of the rejection bar)
    pub entry_price: Decimal,
    /// Initial stop, rounded to the instrument precision
    pub stop_loss: Decimal,
    /// Initial target, rounded to the instrument precision
    pub take_profit: Decimal,
    /// 50% level at entry
    pub scale_level: Decimal,
}

/// Outcome of a transition
#[derive(Debug, Clone, PartialEq)]
pub struct RiskDecision {
    /// Next state
    pub state: PositionState,
    /// Events produced by the transition, in order
    pub events: Vec<PositionEvent>,
    /// The prior state was closed and the transition was ignored
    pub stale: bool,
}

impl RiskDecision {
    fn unchanged(state: PositionState) -> Self {
        Self { state, events: Vec::new(), stale: false }
    }

    fn stale(state: PositionState) -> Self {
        Self { state, events: Vec::new(), stale: true }
    }
}

// =============================================================================
// Risk Manager
// =============================================================================

/// Applies the stop, target, breakeven and scale-in rules.
#[derive(Debug, Clone, PartialEq)]
pub struct RiskManager {
    stop_loss_pips: Decimal,
    profit_secure_pips: Decimal,
    risk_free_offset: Decimal,
    breakeven_offset_pips: Decimal,
    atr_multiplier: Decimal,
}

impl RiskManager {
    /// Build from a (validated) strategy configuration.
    pub fn from_config(config: &StrategyConfig) -> Self {
        Self {
            stop_loss_pips: config.stop_loss_pips,
            profit_secure_pips: config.profit_secure_pips,
            risk_free_offset: config.risk_free_offset,
            breakeven_offset_pips: config.breakeven_offset_pips,
            atr_multiplier: config.atr_take_profit_multiplier,
        }
    }

    /// Compute stop, target and scale level for an entry.
    ///
    /// The stop sits `stop_loss_pips` beyond the swing point on the losing
    /// side (below the swing low for a buy, above the swing high for a sell).
    /// The target distance is the larger of `profit_secure_pips` and
    /// `atr * atr_take_profit_multiplier`; a negative ATR is ignored.
    pub fn plan_entry(
        &self,
        side: Side,
        entry_price: Decimal,
        levels: &LevelSet,
        spec: &InstrumentSpec,
        atr: Option<Decimal>,
    ) -> EntryPlan {
        let anchor = match side {
            Side::Buy => levels.swing_low.price,
            Side::Sell => levels.swing_high.price,
        };
        let stop_loss = spec.round_price(side.toward_loss(anchor, spec.pips_to_price(self.stop_loss_pips)));

        let fixed = spec.pips_to_price(self.profit_secure_pips);
        let dynamic = atr.filter(|a| *a >= Decimal::ZERO).map(|a| a * self.atr_multiplier).unwrap_or(Decimal::ZERO);
        let take_profit = spec.round_price(side.toward_profit(entry_price, fixed.max(dynamic)));

        EntryPlan { side, entry_price, stop_loss, take_profit, scale_level: levels.midpoint() }
    }

    /// Open a position from a plan.
    ///
    /// Only a `Pending` prior opens; an open prior is returned unchanged and a
    /// closed prior is flagged stale.
    pub fn open(&self, prior: PositionState, plan: &EntryPlan) -> RiskDecision {
        match prior {
            PositionState::Pending => {
                let position = OpenPosition {
                    side: plan.side,
                    entry_price: plan.entry_price,
                    current_stop: plan.stop_loss,
                    take_profit: plan.take_profit,
                    breakeven_armed: false,
                    scaled_in: false,
                    breakeven_offset_pips: self.breakeven_offset_pips,
                    scale_level: plan.scale_level,
                };

                info!(
                    side = %plan.side,
                    entry = %plan.entry_price,
                    stop = %plan.stop_loss,
                    target = %plan.take_profit,
                    "Position opened"
                );

                RiskDecision {
                    state: PositionState::Open(position),
                    events: vec![PositionEvent::PositionOpened {
                        side: plan.side,
                        entry_price: plan.entry_price,
                        stop_loss: plan.stop_loss,
                        take_profit: plan.take_profit,
                    }],
                    stale: false,
                }
            },
            PositionState::Open(_) => {
                debug!("Position already open, entry ignored");
                RiskDecision::unchanged(prior)
            },
            PositionState::Closed { .. } => {
                warn!("Open requested on a closed position");
                RiskDecision::stale(prior)
            },
        }
    }

    /// Apply breakeven, scale-in and exit rules at `price`.
    pub fn update(&self, prior: PositionState, price: Decimal, spec: &InstrumentSpec) -> RiskDecision {
        let mut position = match prior {
            PositionState::Open(position) => position,
            PositionState::Pending => return RiskDecision::unchanged(prior),
            PositionState::Closed { .. } => {
                warn!(%price, "Update on a closed position ignored");
                return RiskDecision::stale(prior);
            },
        };

        let mut events = Vec::new();

        if !position.breakeven_armed && spec.price_to_pips(position.favorable_move(price)) >= self.risk_free_offset {
            let breakeven = spec.round_price(
                position
                    .side
                    .toward_profit(position.entry_price, spec.pips_to_price(position.breakeven_offset_pips)),
            );
            let previous_stop = position.current_stop;
            // The stop only ever tightens.
            position.current_stop = match position.side {
                Side::Buy => previous_stop.max(breakeven),
                Side::Sell => previous_stop.min(breakeven),
            };
            position.breakeven_armed = true;

            info!(%previous_stop, new_stop = %position.current_stop, trigger = %price, "Breakeven armed");
            events.push(PositionEvent::BreakevenArmed {
                previous_stop,
                new_stop: position.current_stop,
                trigger_price: price,
            });
        }

        let at_scale_level = match position.side {
            Side::Buy => price >= position.scale_level,
            Side::Sell => price <= position.scale_level,
        };
        if !position.scaled_in && at_scale_level {
            position.scaled_in = true;

            info!(level = %position.scale_level, trigger = %price, "Scaled in");
            events.push(PositionEvent::ScaledIn { level: position.scale_level, trigger_price: price });
        }

        let exit = if position.is_target_hit(price) {
            Some(ExitReason::TakeProfit)
        } else if position.is_stop_hit(price) {
            Some(if position.breakeven_armed { ExitReason::Breakeven } else { ExitReason::StopLoss })
        } else {
            None
        };

        let state = match exit {
            Some(reason) => {
                info!(%reason, exit_price = %price, entry = %position.entry_price, "Position closed");
                events.push(PositionEvent::PositionClosed { reason, exit_price: Some(price) });
                PositionState::Closed { position, reason, exit_price: Some(price) }
            },
            None => PositionState::Open(position),
        };

        RiskDecision { state, events, stale: false }
    }

    /// Close on caller request.
    ///
    /// A pending prior has nothing to close and is returned unchanged.
    pub fn close(&self, prior: PositionState, price: Option<Decimal>) -> RiskDecision {
        match prior {
            PositionState::Open(position) => {
                info!(exit_price = ?price, "Position closed manually");
                RiskDecision {
                    state: PositionState::Closed { position, reason: ExitReason::Manual, exit_price: price },
                    events: vec![PositionEvent::PositionClosed { reason: ExitReason::Manual, exit_price: price }],
                    stale: false,
                }
            },
            PositionState::Pending => RiskDecision::unchanged(prior),
            PositionState::Closed { .. } => {
                warn!("Close requested on a closed position");
                RiskDecision::stale(prior)
            },
        }
    }
}

impl Default for RiskManager {
    fn default() -> Self {
        Self::from_config(&StrategyConfig::default())
    }
}

// =============================================================================
// Tests
// =============================================================================
