//! Signal assembly.

use kishoka_domain::{LevelSet, Signal, SignalMetadata, FIBONACCI_RETRACEMENT};
use rust_decimal::Decimal;

use crate::entry::CandidateSignal;
use crate::risk::EntryPlan;

const RISK_REWARD_DP: u32 = 4;

/// Combine a candidate, its level set and the entry plan into a signal.
///
/// Returns `None` when the candidate has no direction, the level set is
/// missing, or the plan was made for the other side.
pub fn assemble(candidate: &CandidateSignal, levels: Option<&LevelSet>, plan: &EntryPlan) -> Option<Signal> {
    let direction = candidate.direction?;
    let levels = levels?;
    if direction != plan.side {
        return None;
    }

    let risk = (plan.entry_price - plan.stop_loss).abs();
    let reward = (plan.take_profit - plan.entry_price).abs();
    let risk_reward_ratio = if risk.is_zero() { Decimal::ZERO } else { (reward / risk).round_dp(RISK_REWARD_DP) };

    Some(Signal {
        direction,
        confidence: candidate.confidence,
        entry_price: plan.entry_price,
        stop_loss: plan.stop_loss,
        take_profit: plan.take_profit,
        signal_type: FIBONACCI_RETRACEMENT.to_string(),
        metadata: SignalMetadata {
            risk_reward_ratio,
            last_swing_high: levels.swing_high.price,
            last_swing_low: levels.swing_low.price,
            fib_levels: levels.labelled(),
        },
    })
}
