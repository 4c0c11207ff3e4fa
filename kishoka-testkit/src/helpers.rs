//! Bar and series builders.

use chrono::{DateTime, Duration, TimeZone, Utc};
use kishoka_domain::{BarSeries, PriceBar};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;

use crate::Result;

/// `(open, high, low, close)`
pub type Ohlc = (Decimal, Decimal, Decimal, Decimal);

fn base_time() -> DateTime<Utc> {
    // 2024-01-01T00:00:00Z
    Utc.timestamp_opt(1_704_067_200, 0).single().unwrap_or_default()
}

/// Hourly bar `hour` hours after the fixture epoch.
pub fn bar_at(hour: i64, (open, high, low, close): Ohlc) -> PriceBar {
    PriceBar::new(base_time() + Duration::hours(hour), open, high, low, close, None)
}

/// Build a validated hourly series.
///
/// # Errors
/// Returns the series validation error if a tuple is inconsistent.
pub fn try_series_from_ohlc(rows: &[Ohlc]) -> Result<BarSeries> {
    let bars = rows.iter().enumerate().map(|(i, row)| bar_at(i as i64, *row)).collect();
    Ok(BarSeries::new(bars)?)
}

/// Build a validated hourly series.
///
/// # Panics
/// Panics if a tuple is inconsistent; fixtures are expected to be valid.
pub fn series_from_ohlc(rows: &[Ohlc]) -> BarSeries {
    match try_series_from_ohlc(rows) {
        Ok(series) => series,
        Err(e) => panic!("invalid fixture: {e}"),
    }
}

/// Append hourly bars after the last bar of `series`.
///
/// # Panics
/// Panics if a tuple is inconsistent.
pub fn extend_series(series: &BarSeries, rows: &[Ohlc]) -> BarSeries {
    let start = series.len() as i64;
    let mut bars = series.bars().to_vec();
    bars.extend(rows.iter().enumerate().map(|(i, row)| bar_at(start + i as i64, *row)));
    match BarSeries::new(bars) {
        Ok(series) => series,
        Err(e) => panic!("invalid fixture: {e}"),
    }
}

fn doji(high: Decimal, low: Decimal) -> Ohlc {
    let mid = (high + low) / Decimal::TWO;
    (mid, high, low, mid)
}

/// Eight bars forming a V (low at index 2) then an inverted V (high at
/// index 5) for a lookback of 2.
pub fn v_shape_bars() -> BarSeries {
    series_from_ohlc(&[
        doji(dec!(1.20), dec!(1.18)),
        doji(dec!(1.18), dec!(1.16)),
        doji(dec!(1.16), dec!(1.14)),
        doji(dec!(1.18), dec!(1.16)),
        doji(dec!(1.20), dec!(1.18)),
        doji(dec!(1.22), dec!(1.20)),
        doji(dec!(1.20), dec!(1.18)),
        doji(dec!(1.18), dec!(1.16)),
    ])
}

/// Ten bars for a lookback of 2: swing high 1.1350 at index 3, swing low
/// 1.1180 at index 7 (BullishRetrace, 50% at 1.1265), and a last bar that
/// dips to 1.1182 and closes bullish at 1.1280.
pub fn bullish_rejection_bars() -> BarSeries {
    series_from_ohlc(&[
        (dec!(1.1250), dec!(1.1270), dec!(1.1240), dec!(1.1260)),
        (dec!(1.1260), dec!(1.1300), dec!(1.1250), dec!(1.1290)),
        (dec!(1.1290), dec!(1.1320), dec!(1.1280), dec!(1.1310)),
        (dec!(1.1310), dec!(1.1350), dec!(1.1300), dec!(1.1330)),
        (dec!(1.1330), dec!(1.1340), dec!(1.1290), dec!(1.1300)),
        (dec!(1.1300), dec!(1.1310), dec!(1.1250), dec!(1.1260)),
        (dec!(1.1260), dec!(1.1270), dec!(1.1220), dec!(1.1230)),
        (dec!(1.1230), dec!(1.1240), dec!(1.1180), dec!(1.1190)),
        (dec!(1.1190), dec!(1.1230), dec!(1.1185), dec!(1.1220)),
        (dec!(1.1200), dec!(1.1285), dec!(1.1182), dec!(1.1280)),
    ])
}

/// Mirror image of [`bullish_rejection_bars`]: swing low 1.1180 at index 3,
/// swing high 1.1350 at index 7 (BearishRetrace, 50% at 1.1265), and a last
/// bar that spikes to 1.1348 and closes bearish at 1.1250.
pub fn bearish_rejection_bars() -> BarSeries {
    series_from_ohlc(&[
        (dec!(1.1280), dec!(1.1290), dec!(1.1260), dec!(1.1270)),
        (dec!(1.1270), dec!(1.1280), dec!(1.1230), dec!(1.1240)),
        (dec!(1.1240), dec!(1.1250), dec!(1.1210), dec!(1.1220)),
        (dec!(1.1220), dec!(1.1230), dec!(1.1180), dec!(1.1200)),
        (dec!(1.1200), dec!(1.1240), dec!(1.1190), dec!(1.1230)),
        (dec!(1.1230), dec!(1.1280), dec!(1.1220), dec!(1.1270)),
        (dec!(1.1270), dec!(1.1310), dec!(1.1260), dec!(1.1300)),
        (dec!(1.1300), dec!(1.1350), dec!(1.1290), dec!(1.1340)),
        (dec!(1.1340), dec!(1.1345), dec!(1.1300), dec!(1.1310)),
        (dec!(1.1330), dec!(1.1348), dec!(1.1245), dec!(1.1250)),
    ])
}

/// `count` identical bars at `price`.
pub fn flat_bars(count: usize, price: Decimal) -> BarSeries {
    let rows = vec![(price, price, price, price); count];
    series_from_ohlc(&rows)
}
