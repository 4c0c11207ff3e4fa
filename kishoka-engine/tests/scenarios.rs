//! End-to-end strategy scenarios.
//!
//! Flow covered:
//! 1. V / inverted-V swing detection
//! 2. BullishRetrace level set from the latest swing pair
//! 3. Bullish rejection -> Buy signal, stop below the swing low, position opened
//! 4. Breakeven armed exactly once on later bars
//! 5. Flat market -> no levels, no signal
//!
//! The bearish mirror of 2-4 runs a short through the same lifecycle.

use kishoka_domain::{
    ExitReason, Instrument, PositionEvent, PositionState, PositionStatus, RetraceDirection, Side, SwingKind,
    SwingPoint,
};
use kishoka_engine::{
    fibonacci, swing, Action, EngineWarning, EvaluationContext, KishokaStrategy, Recommendation, ResolverConfig,
    SkipReason, StrategyConfig, StrategyRegistry,
};
use kishoka_testkit::{bearish_rejection_bars, bullish_rejection_bars, extend_series, flat_bars, v_shape_bars};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;

fn strategy() -> KishokaStrategy {
    let config = StrategyConfig { swing_length: 2, ..Default::default() };
    KishokaStrategy::new(config, ResolverConfig::default()).unwrap()
}

fn eurusd() -> EvaluationContext {
    EvaluationContext::new(Instrument::classify("EUR/USD"))
}

// =============================================================================
// Scenario 1: V / inverted-V
// =============================================================================

#[test]
fn test_v_shape_swings() {
    let series = v_shape_bars();
    let points = swing::detect(series.bars(), 2);

    assert_eq!(points, vec![SwingPoint::low(2, dec!(1.14)), SwingPoint::high(5, dec!(1.22))]);

    let latest = swing::latest(&points);
    assert_eq!(latest.low.map(|p| p.index), Some(2));
    assert_eq!(latest.high.map(|p| p.index), Some(5));
    assert!(points.iter().any(|p| p.kind == SwingKind::High));
}

// =============================================================================
// Scenario 2: level set
// =============================================================================

#[test]
fn test_bullish_retrace_levels() {
    let analysis = strategy().analyze(bullish_rejection_bars().bars());
    let levels = analysis.levels.unwrap();

    assert_eq!(levels.direction, RetraceDirection::BullishRetrace);
    assert_eq!(levels.swing_high, SwingPoint::high(3, dec!(1.1350)));
    assert_eq!(levels.swing_low, SwingPoint::low(7, dec!(1.1180)));

    let labelled = levels.labelled();
    assert_eq!(labelled["fib_0"], dec!(1.118));
    assert_eq!(labelled["fib_50"], dec!(1.1265));
    assert_eq!(labelled["fib_100"], dec!(1.135));
}

// =============================================================================
// Scenario 3: bullish rejection
// =============================================================================

#[test]
fn test_bullish_rejection_signal() {
    let evaluation = strategy().evaluate(&bullish_rejection_bars(), &eurusd(), PositionState::Pending);

    let signal = evaluation.signal.clone().unwrap();
    assert_eq!(signal.direction, Side::Buy);
    assert_eq!(signal.entry_price, dec!(1.1280));
    assert_eq!(signal.stop_loss, dec!(1.1160));
    assert_eq!(signal.take_profit, dec!(1.1330));
    assert_eq!(signal.signal_type, "fibonacci_retracement");
    assert_eq!(signal.metadata.risk_reward_ratio, dec!(0.4167));
    assert!(signal.confidence > Decimal::ZERO && signal.confidence <= Decimal::ONE);

    assert!(evaluation.skipped.is_none());
    assert!(evaluation.warnings.is_empty());
    assert_eq!(evaluation.state.status(), PositionStatus::Open);
    assert_eq!(evaluation.state.current_stop(), Some(dec!(1.1160)));
    assert!(matches!(evaluation.events[..], [PositionEvent::PositionOpened { side: Side::Buy, .. }]));
}

#[test]
fn test_signal_wire_shape() {
    let evaluation = strategy().evaluate(&bullish_rejection_bars(), &eurusd(), PositionState::Pending);
    let json = serde_json::to_value(evaluation.signal.unwrap()).unwrap();

    assert_eq!(json["direction"], "buy");
    assert_eq!(json["signal_type"], "fibonacci_retracement");
    let as_decimal = |value: &serde_json::Value| value.as_str().unwrap().parse::<Decimal>().unwrap();
    assert_eq!(as_decimal(&json["metadata"]["fib_levels"]["fib_50"]), dec!(1.1265));
    assert_eq!(as_decimal(&json["metadata"]["last_swing_low"]), dec!(1.118));
    assert_eq!(as_decimal(&json["stop_loss"]), dec!(1.116));
}

#[test]
fn test_atr_widens_target() {
    let ctx = eurusd().with_atr(dec!(0.0060));
    let evaluation = strategy().evaluate(&bullish_rejection_bars(), &ctx, PositionState::Pending);

    assert_eq!(evaluation.signal.unwrap().take_profit, dec!(1.1370));
}

// =============================================================================
// Scenario 4: breakeven
// =============================================================================

#[test]
fn test_breakeven_armed_once() {
    let strategy = strategy();
    let ctx = eurusd();

    let entry_bars = bullish_rejection_bars();
    let opened = strategy.evaluate(&entry_bars, &ctx, PositionState::Pending).state;

    // Close exactly 20 pips above entry.
    let armed_bars = extend_series(&entry_bars, &[(dec!(1.1280), dec!(1.1305), dec!(1.1275), dec!(1.1300))]);
    let armed = strategy.evaluate(&armed_bars, &ctx, opened);

    // 1.1300 is also past the 50% level on the favorable side.
    assert_eq!(armed.state.status(), PositionStatus::Scaled);
    assert!(armed.state.open_position().unwrap().breakeven_armed);
    assert_eq!(armed.state.current_stop(), Some(dec!(1.1280)));
    assert!(matches!(
        armed.events[..],
        [PositionEvent::BreakevenArmed { .. }, PositionEvent::ScaledIn { .. }]
    ));

    let further_bars = extend_series(&armed_bars, &[(dec!(1.1300), dec!(1.1325), dec!(1.1295), dec!(1.1320))]);
    let further = strategy.evaluate(&further_bars, &ctx, armed.state);

    assert_eq!(further.state.current_stop(), Some(dec!(1.1280)));
    assert!(further.events.is_empty());
}

#[test]
fn test_stop_after_breakeven_reports_breakeven_exit() {
    let strategy = strategy();
    let ctx = eurusd();

    let entry_bars = bullish_rejection_bars();
    let opened = strategy.evaluate(&entry_bars, &ctx, PositionState::Pending).state;
    let armed_bars = extend_series(&entry_bars, &[(dec!(1.1280), dec!(1.1305), dec!(1.1275), dec!(1.1300))]);
    let armed = strategy.evaluate(&armed_bars, &ctx, opened).state;

    let back = extend_series(&armed_bars, &[(dec!(1.1300), dec!(1.1302), dec!(1.1270), dec!(1.1275))]);
    let closed = strategy.evaluate(&back, &ctx, armed);

    assert!(matches!(closed.state, PositionState::Closed { reason: ExitReason::Breakeven, .. }));

    // Closed is terminal.
    let after = strategy.evaluate(&back, &ctx, closed.state);
    assert_eq!(after.state, closed.state);
    assert!(after.warnings.contains(&EngineWarning::StaleState));
}

// =============================================================================
// Bearish mirror
// =============================================================================

#[test]
fn test_bearish_rejection_signal() {
    let evaluation = strategy().evaluate(&bearish_rejection_bars(), &eurusd(), PositionState::Pending);

    let levels = evaluation.levels.clone().unwrap();
    assert_eq!(levels.direction, RetraceDirection::BearishRetrace);
    assert_eq!(levels.swing_low, SwingPoint::low(3, dec!(1.1180)));
    assert_eq!(levels.swing_high, SwingPoint::high(7, dec!(1.1350)));
    assert_eq!(levels.origin(), dec!(1.135));
    assert_eq!(levels.midpoint(), dec!(1.1265));

    let signal = evaluation.signal.clone().unwrap();
    assert_eq!(signal.direction, Side::Sell);
    assert_eq!(signal.entry_price, dec!(1.1250));
    // Stop above the swing high
    assert_eq!(signal.stop_loss, dec!(1.1370));
    assert_eq!(signal.take_profit, dec!(1.1200));
    assert_eq!(signal.metadata.risk_reward_ratio, dec!(0.4167));

    assert!(matches!(evaluation.events[..], [PositionEvent::PositionOpened { side: Side::Sell, .. }]));
    assert_eq!(Recommendation::from_evaluation(&evaluation).action, Action::Sell);
}

#[test]
fn test_short_breakeven_then_breakeven_exit() {
    let strategy = strategy();
    let ctx = eurusd();

    let entry_bars = bearish_rejection_bars();
    let opened = strategy.evaluate(&entry_bars, &ctx, PositionState::Pending).state;
    assert_eq!(opened.current_stop(), Some(dec!(1.1370)));

    // Close exactly 20 pips below entry.
    let armed_bars = extend_series(&entry_bars, &[(dec!(1.1250), dec!(1.1255), dec!(1.1225), dec!(1.1230))]);
    let armed = strategy.evaluate(&armed_bars, &ctx, opened);

    assert_eq!(armed.state.current_stop(), Some(dec!(1.1250)));
    assert!(armed.state.open_position().unwrap().scaled_in);
    assert!(matches!(
        armed.events[..],
        [PositionEvent::BreakevenArmed { .. }, PositionEvent::ScaledIn { .. }]
    ));

    let further_bars = extend_series(&armed_bars, &[(dec!(1.1230), dec!(1.1235), dec!(1.1205), dec!(1.1210))]);
    let further = strategy.evaluate(&further_bars, &ctx, armed.state);
    assert_eq!(further.state.current_stop(), Some(dec!(1.1250)));
    assert!(further.events.is_empty());

    let back = extend_series(&further_bars, &[(dec!(1.1210), dec!(1.1260), dec!(1.1205), dec!(1.1255))]);
    let closed = strategy.evaluate(&back, &ctx, further.state);
    assert!(matches!(
        closed.state,
        PositionState::Closed { reason: ExitReason::Breakeven, exit_price: Some(p), .. } if p == dec!(1.1255)
    ));
}

#[test]
fn test_short_take_profit() {
    let strategy = strategy();
    let ctx = eurusd();

    let entry_bars = bearish_rejection_bars();
    let opened = strategy.evaluate(&entry_bars, &ctx, PositionState::Pending).state;

    let target_bars = extend_series(&entry_bars, &[(dec!(1.1250), dec!(1.1255), dec!(1.1190), dec!(1.1195))]);
    let closed = strategy.evaluate(&target_bars, &ctx, opened);

    assert!(matches!(closed.state, PositionState::Closed { reason: ExitReason::TakeProfit, .. }));
    assert!(matches!(closed.events.last(), Some(PositionEvent::PositionClosed { reason: ExitReason::TakeProfit, .. })));
}

// =============================================================================
// Scenario 5: flat market
// =============================================================================

#[test]
fn test_flat_market() {
    let evaluation = strategy().evaluate(&flat_bars(30, dec!(1.1000)), &eurusd(), PositionState::Pending);

    assert!(evaluation.levels.is_none());
    assert!(evaluation.signal.is_none());
    assert_eq!(evaluation.state, PositionState::Pending);
    assert!(evaluation.skipped.is_some());

    let recommendation = Recommendation::from_evaluation(&evaluation);
    assert_eq!(recommendation.action, Action::Hold);
    assert_eq!(recommendation.confidence, dec!(0.5));
}

#[test]
fn test_equal_swing_prices_are_degenerate() {
    let high = SwingPoint::high(4, dec!(1.1000));
    let low = SwingPoint::low(9, dec!(1.1000));
    assert!(fibonacci::compute(high, low, &[dec!(0.5)], dec!(0.00000001)).is_none());
}

// =============================================================================
// Properties
// =============================================================================

#[test]
fn test_insufficient_data() {
    let bars = v_shape_bars();
    let evaluation = KishokaStrategy::new(StrategyConfig::default(), ResolverConfig::default())
        .unwrap()
        .evaluate(&bars, &eurusd(), PositionState::Pending);

    assert_eq!(evaluation.skipped, Some(SkipReason::InsufficientData { available: 8, required: 29 }));
    assert!(evaluation.signal.is_none());
    assert!(evaluation.swings.is_empty());
}

#[test]
fn test_evaluation_is_deterministic() {
    let strategy = strategy();
    let bars = bullish_rejection_bars();

    let first = strategy.evaluate(&bars, &eurusd(), PositionState::Pending);
    let second = strategy.evaluate(&bars, &eurusd(), PositionState::Pending);
    assert_eq!(first, second);
}

#[test]
fn test_every_prefix_is_safe() {
    let strategy = strategy();
    let bars = bullish_rejection_bars();

    for len in 0..=bars.len() {
        let evaluation = strategy.evaluate(bars.prefix(len), &eurusd(), PositionState::Pending);
        if let Some(signal) = evaluation.signal {
            assert!(signal.confidence >= Decimal::ZERO && signal.confidence <= Decimal::ONE);
        }
    }
}

#[test]
fn test_unclassified_instrument_warns_and_falls_back() {
    let ctx = EvaluationContext::new(Instrument::classify("BTC-PERP"));
    let evaluation = strategy().evaluate(&bullish_rejection_bars(), &ctx, PositionState::Pending);

    assert_eq!(evaluation.instrument.pip_size, dec!(0.01));
    assert_eq!(
        evaluation.warnings,
        vec![EngineWarning::UnknownInstrumentClass("BTC-PERP".to_string())]
    );
}

#[test]
fn test_registry_evaluates_by_id() -> anyhow::Result<()> {
    let config = StrategyConfig { swing_length: 2, ..Default::default() };
    let registry = StrategyRegistry::with_kishoka(config, ResolverConfig::default())?;

    let evaluation = registry.get("kishoka")?.evaluate(&bullish_rejection_bars(), &eurusd(), PositionState::Pending);
    assert!(evaluation.has_signal());
    Ok(())
}
