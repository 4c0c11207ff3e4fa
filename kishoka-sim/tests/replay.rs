//! Replay tests: walk-forward over fixture histories.
//!
//! Flow:
//! 1. Bars 0-9 build a BullishRetrace and a rejection on bar 9 -> position opened
//! 2. Later bars close at the target, or through the stop
//! 3. Verify: trade ledger, pip result, summary metrics

use kishoka_domain::{ExitReason, Side};
use kishoka_engine::{Action, KishokaStrategy, StrategyKind};
use kishoka_sim::{load_bars, replay, Config};
use kishoka_testkit::{bearish_rejection_bars, bullish_rejection_bars, extend_series, flat_bars};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;

fn strategy(config: &Config) -> StrategyKind {
    KishokaStrategy::new(config.strategy.clone(), config.resolver).unwrap().into()
}

#[test]
fn test_replay_take_profit() {
    let config = Config::test();
    let series = extend_series(&bullish_rejection_bars(), &[(dec!(1.1280), dec!(1.1340), dec!(1.1275), dec!(1.1335))]);

    let report = replay(&strategy(&config), &series, &config.context());

    assert_eq!(report.strategy, "kishoka");
    assert_eq!(report.bars, 11);
    assert_eq!(report.signals, 1);
    assert_eq!(report.trades.len(), 1);

    let trade = &report.trades[0];
    assert_eq!(trade.side, Side::Buy);
    assert_eq!(trade.entry_price, dec!(1.1280));
    assert_eq!(trade.exit_price, Some(dec!(1.1335)));
    assert_eq!(trade.reason, ExitReason::TakeProfit);
    assert_eq!(trade.pips, dec!(55));
    assert!(trade.opened_at < trade.closed_at);

    assert!(trade.scaled_in);

    assert_eq!(report.wins, 1);
    assert_eq!(report.losses, 0);
    assert_eq!(report.net_pips, dec!(55));
    assert_eq!(report.win_rate, Decimal::ONE);
    assert_eq!(report.profit_factor, None);
    assert_eq!(report.max_drawdown_pips, Decimal::ZERO);
    assert!(report.open_position.is_none());
    assert!(report.warnings.is_empty());
}

#[test]
fn test_replay_short_take_profit() {
    let config = Config::test();
    let series = extend_series(&bearish_rejection_bars(), &[(dec!(1.1250), dec!(1.1255), dec!(1.1190), dec!(1.1195))]);

    let report = replay(&strategy(&config), &series, &config.context());

    assert_eq!(report.trades.len(), 1);
    let trade = &report.trades[0];
    assert_eq!(trade.side, Side::Sell);
    assert_eq!(trade.entry_price, dec!(1.1250));
    assert_eq!(trade.reason, ExitReason::TakeProfit);
    assert_eq!(trade.pips, dec!(55));
    assert!(trade.scaled_in);
    assert_eq!(report.wins, 1);
}

#[test]
fn test_replay_stop_loss_after_scale_in() {
    let config = Config::test();
    // Bar 10 closes 10 pips up, past the 50% level; bar 11 falls through the stop.
    let series = extend_series(
        &bullish_rejection_bars(),
        &[
            (dec!(1.1280), dec!(1.1295), dec!(1.1275), dec!(1.1290)),
            (dec!(1.1290), dec!(1.1292), dec!(1.1140), dec!(1.1150)),
        ],
    );

    let report = replay(&strategy(&config), &series, &config.context());

    assert_eq!(report.trades.len(), 1);
    let trade = &report.trades[0];
    assert_eq!(trade.reason, ExitReason::StopLoss);
    assert!(trade.scaled_in);
    assert_eq!(trade.pips, dec!(-130));
    assert_eq!(report.losses, 1);
    assert_eq!(report.net_pips, dec!(-130));
    assert_eq!(report.win_rate, Decimal::ZERO);
    assert_eq!(report.profit_factor, Some(Decimal::ZERO));
    assert_eq!(report.max_drawdown_pips, dec!(130));
}

#[test]
fn test_replay_stop_loss_without_scale_in() {
    let config = Config::test();
    let series = extend_series(&bullish_rejection_bars(), &[(dec!(1.1280), dec!(1.1285), dec!(1.1140), dec!(1.1150))]);

    let report = replay(&strategy(&config), &series, &config.context());

    assert_eq!(report.trades.len(), 1);
    assert_eq!(report.trades[0].reason, ExitReason::StopLoss);
    assert!(!report.trades[0].scaled_in);
}

#[test]
fn test_replay_leaves_position_open() {
    let config = Config::test();
    let report = replay(&strategy(&config), &bullish_rejection_bars(), &config.context());

    assert!(report.trades.is_empty());
    let open = report.open_position.unwrap();
    assert_eq!(open.current_stop, dec!(1.1160));
    assert_eq!(open.take_profit, dec!(1.1330));

    assert_eq!(report.recommendation.action, Action::Buy);
    assert_eq!(report.recommendation.entry_price, Some(dec!(1.1280)));
}

#[test]
fn test_replay_flat_market() {
    let config = Config::test();
    let report = replay(&strategy(&config), &flat_bars(40, dec!(1.2500)), &config.context());

    assert_eq!(report.signals, 0);
    assert!(report.trades.is_empty());
    assert_eq!(report.net_pips, Decimal::ZERO);
}

#[test]
fn test_replay_unclassified_symbol_warns_once() {
    let config = Config { symbol: "BTC-PERP".to_string(), ..Config::test() };
    let report = replay(&strategy(&config), &flat_bars(10, dec!(100)), &config.context());

    assert_eq!(report.warnings.len(), 1);
}

#[test]
fn test_load_bars_from_file() -> anyhow::Result<()> {
    let series = bullish_rejection_bars();
    let path = std::env::temp_dir().join(format!("kishoka-bars-{}.json", std::process::id()));
    std::fs::write(&path, serde_json::to_string(&series)?)?;

    let loaded = load_bars(&path)?;
    std::fs::remove_file(&path)?;

    assert_eq!(loaded, series);
    Ok(())
}
