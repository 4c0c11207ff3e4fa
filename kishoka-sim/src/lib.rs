//! Kishoka Replay
//!
//! Walk-forward evaluation of a strategy over a bar history.
//!
//! The strategy is evaluated on every growing prefix of the series, as if the
//! bars arrived one at a time. The position state returned by one evaluation
//! is fed into the next; a closed position is recorded in the trade ledger
//! and the state is reset to `Pending`.
//!
//! Prefixes are borrowed windows over the loaded series, so a replay never
//! copies bars.

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod config;
pub mod error;

use std::collections::VecDeque;
use std::fs;
use std::path::Path;

use chrono::{DateTime, Utc};
use kishoka_domain::{BarSeries, ExitReason, OpenPosition, PositionState, PriceBar, Side};
use kishoka_engine::{EngineWarning, Evaluation, EvaluationContext, Recommendation, StrategyKind, RECENT_SIGNAL_BARS};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

pub use config::Config;
pub use error::{SimError, SimResult};

// =============================================================================
// Report
// =============================================================================

/// One closed position
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Trade {
    /// Direction
    pub side: Side,
    /// Entry price
    pub entry_price: Decimal,
    /// Exit price (None for a manual close without a price)
    pub exit_price: Option<Decimal>,
    /// Why it closed
    pub reason: ExitReason,
    /// Result in pips (positive is a gain)
    pub pips: Decimal,
    /// Timestamp of the bar the position opened on
    pub opened_at: DateTime<Utc>,
    /// Timestamp of the bar the position closed on
    pub closed_at: DateTime<Utc>,
    /// Whether the position had scaled in
    pub scaled_in: bool,
}

/// Summary of a replay
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReplayReport {
    /// Replayed strategy identifier
    pub strategy: String,
    /// Bars replayed
    pub bars: usize,
    /// Evaluations that emitted a signal
    pub signals: usize,
    /// Closed positions, in order
    pub trades: Vec<Trade>,
    /// Trades with a positive pip result
    pub wins: usize,
    /// Trades with a negative pip result
    pub losses: usize,
    /// Sum of trade pips
    pub net_pips: Decimal,
    /// Winning share of all trades, 4 dp (0 without trades)
    pub win_rate: Decimal,
    /// Gross winning pips over gross losing pips, 4 dp.
    /// `None` when nothing was lost (unbounded).
    pub profit_factor: Option<Decimal>,
    /// Largest peak-to-trough fall of cumulative trade pips (0 or positive)
    pub max_drawdown_pips: Decimal,
    /// Position still open after the last bar
    pub open_position: Option<OpenPosition>,
    /// Distinct warnings raised along the way
    pub warnings: Vec<EngineWarning>,
    /// Recommendation as of the last bar
    pub recommendation: Recommendation,
}

// =============================================================================
// Replay
// =============================================================================

/// Replay `strategy` over `series`.
pub fn replay(strategy: &StrategyKind, series: &BarSeries, ctx: &EvaluationContext) -> ReplayReport {
    let mut state = PositionState::Pending;
    let mut opened_at = None;
    let mut signals = 0;
    let mut trades = Vec::new();
    let mut warnings: Vec<EngineWarning> = Vec::new();
    let mut recent: VecDeque<Evaluation> = VecDeque::with_capacity(RECENT_SIGNAL_BARS);

    for len in 1..=series.len() {
        let prefix = series.prefix(len);
        let evaluation = strategy.evaluate(prefix, ctx, state);
        let Some(bar) = prefix.last() else {
            continue;
        };

        if evaluation.has_signal() {
            signals += 1;
        }
        for warning in &evaluation.warnings {
            if !warnings.contains(warning) {
                warnings.push(warning.clone());
            }
        }

        let next_state = evaluation.state;
        let instrument = evaluation.instrument;
        if recent.len() == RECENT_SIGNAL_BARS {
            recent.pop_front();
        }
        recent.push_back(evaluation);

        state = match next_state {
            PositionState::Closed { position, reason, exit_price } => {
                let pips = exit_price
                    .map(|price| instrument.price_to_pips(position.favorable_move(price)))
                    .unwrap_or(Decimal::ZERO);
                let trade = Trade {
                    side: position.side,
                    entry_price: position.entry_price,
                    exit_price,
                    reason,
                    pips,
                    opened_at: opened_at.take().unwrap_or(bar.timestamp),
                    closed_at: bar.timestamp,
                    scaled_in: position.scaled_in,
                };
                debug!(side = %trade.side, %reason, pips = %trade.pips, "Trade recorded");
                trades.push(trade);
                PositionState::Pending
            },
            next @ PositionState::Open(_) => {
                if !state.is_open() {
                    opened_at = Some(bar.timestamp);
                }
                next
            },
            PositionState::Pending => PositionState::Pending,
        };
    }

    let metrics = TradeMetrics::from_trades(&trades);
    let recommendation = Recommendation::from_recent(recent.make_contiguous());

    info!(
        strategy = strategy.id(),
        bars = series.len(),
        signals,
        trades = trades.len(),
        wins = metrics.wins,
        losses = metrics.losses,
        net_pips = %metrics.net_pips,
        win_rate = %metrics.win_rate,
        max_drawdown_pips = %metrics.max_drawdown_pips,
        "Replay finished"
    );

    ReplayReport {
        strategy: strategy.id().to_string(),
        bars: series.len(),
        signals,
        trades,
        wins: metrics.wins,
        losses: metrics.losses,
        net_pips: metrics.net_pips,
        win_rate: metrics.win_rate,
        profit_factor: metrics.profit_factor,
        max_drawdown_pips: metrics.max_drawdown_pips,
        open_position: state.open_position().copied(),
        warnings,
        recommendation,
    }
}

// =============================================================================
// Metrics
// =============================================================================

/// Trade ledger summary, in pips
#[derive(Debug, Clone, PartialEq)]
struct TradeMetrics {
    wins: usize,
    losses: usize,
    net_pips: Decimal,
    win_rate: Decimal,
    profit_factor: Option<Decimal>,
    max_drawdown_pips: Decimal,
}

impl TradeMetrics {
    fn from_trades(trades: &[Trade]) -> Self {
        let mut wins = 0;
        let mut losses = 0;
        let mut gross_profit = Decimal::ZERO;
        let mut gross_loss = Decimal::ZERO;

        // Drawdown is measured from the running peak, starting flat.
        let mut equity = Decimal::ZERO;
        let mut peak = Decimal::ZERO;
        let mut max_drawdown_pips = Decimal::ZERO;

        for trade in trades {
            if trade.pips > Decimal::ZERO {
                wins += 1;
                gross_profit += trade.pips;
            } else if trade.pips < Decimal::ZERO {
                losses += 1;
                gross_loss -= trade.pips;
            }

            equity += trade.pips;
            peak = peak.max(equity);
            max_drawdown_pips = max_drawdown_pips.max(peak - equity);
        }

        let win_rate = if trades.is_empty() {
            Decimal::ZERO
        } else {
            (Decimal::from(wins) / Decimal::from(trades.len())).round_dp(4)
        };

        let profit_factor = if gross_loss > Decimal::ZERO {
            Some((gross_profit / gross_loss).round_dp(4))
        } else {
            None
        };

        Self { wins, losses, net_pips: equity, win_rate, profit_factor, max_drawdown_pips }
    }
}

/// Read a JSON array of bars and validate it into a series.
///
/// # Errors
/// Returns `SimError::Io` if the file cannot be read, `SimError::Json` if it
/// is not a bar list and `SimError::Domain` if the bars are inconsistent or
/// out of order.
pub fn load_bars(path: impl AsRef<Path>) -> SimResult<BarSeries> {
    let raw = fs::read_to_string(path)?;
    let bars: Vec<PriceBar> = serde_json::from_str(&raw)?;
    Ok(BarSeries::new(bars)?)
}

// =============================================================================
// Tests
// =============================================================================
