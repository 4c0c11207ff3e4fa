//! Swing point detection.
//!
//! A bar is a swing high when its high is the maximum of the window
//! `[i - lookback, i + lookback]`, and a swing low when its low is the
//! minimum. Only bars with a full window on both sides qualify, so the
//! last `lookback` bars are never swing points.
//!
//! Equal extremes inside a window resolve to the earliest bar: a later bar
//! that only ties an earlier one is not a swing.

use kishoka_domain::{PriceBar, SwingKind, SwingPoint};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Most recent swing of each kind
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LatestSwings {
    /// Last swing high by bar index
    pub high: Option<SwingPoint>,
    /// Last swing low by bar index
    pub low: Option<SwingPoint>,
}

impl LatestSwings {
    /// Both extremes, when present.
    pub fn pair(&self) -> Option<(SwingPoint, SwingPoint)> {
        Some((self.high?, self.low?))
    }
}

/// Detect swing highs and lows, ordered by index (a high before a low on
/// the same bar).
///
/// Returns an empty list when `lookback == 0` or there are fewer than
/// `2 * lookback + 1` bars.
pub fn detect(bars: &[PriceBar], lookback: usize) -> Vec<SwingPoint> {
    let mut points = Vec::new();
    if lookback == 0 || bars.is_empty() || (bars.len() - 1) / 2 < lookback {
        return points;
    }

    for i in lookback..bars.len() - lookback {
        let window = &bars[i - lookback..=i + lookback];

        if first_extreme(window, |b| b.high, |candidate, best| candidate > best) == lookback {
            points.push(SwingPoint::high(i, bars[i].high));
        }
        if first_extreme(window, |b| b.low, |candidate, best| candidate < best) == lookback {
            points.push(SwingPoint::low(i, bars[i].low));
        }
    }

    points
}

/// Pick the most recent high and most recent low.
pub fn latest(points: &[SwingPoint]) -> LatestSwings {
    let mut swings = LatestSwings::default();
    for point in points {
        let slot = match point.kind {
            SwingKind::High => &mut swings.high,
            SwingKind::Low => &mut swings.low,
        };
        if !matches!(slot, Some(p) if p.index > point.index) {
            *slot = Some(*point);
        }
    }
    swings
}

/// Position of the first bar whose value strictly beats all earlier ones.
fn first_extreme(
    window: &[PriceBar],
    value: impl Fn(&PriceBar) -> Decimal,
    beats: impl Fn(Decimal, Decimal) -> bool,
) -> usize {
    let mut best_pos = 0;
    let mut best = value(&window[0]);
    for (pos, bar) in window.iter().enumerate().skip(1) {
        let v = value(bar);
        if beats(v, best) {
            best = v;
            best_pos = pos;
        }
    }
    best_pos
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};
    use rust_decimal_macros::dec;

    fn bar(i: i64, high: Decimal, low: Decimal) -> PriceBar {
        let ts = Utc.timestamp_opt(1_700_000_000 + i * 3600, 0).unwrap();
        let mid = (high + low) / Decimal::TWO;
        PriceBar::new(ts, mid, high, low, mid, None)
    }

    fn series(extremes: &[(Decimal, Decimal)]) -> Vec<PriceBar> {
        extremes.iter().enumerate().map(|(i, (h, l))| bar(i as i64, *h, *l)).collect()
    }

    #[test]
    fn test_too_few_bars() {
        let bars = series(&[(dec!(2), dec!(1)), (dec!(3), dec!(2)), (dec!(2), dec!(1))]);
        assert!(detect(&bars, 2).is_empty());
        assert!(detect(&bars, 0).is_empty());
    }

    #[test]
    fn test_single_peak() {
        let bars = series(&[
            (dec!(10), dec!(9)),
            (dec!(11), dec!(10)),
            (dec!(12), dec!(11)),
            (dec!(11), dec!(10)),
            (dec!(10), dec!(9)),
        ]);
        let points = detect(&bars, 2);
        assert_eq!(points, vec![SwingPoint::high(2, dec!(12))]);
    }

    #[test]
    fn test_ties_resolve_to_earliest() {
        // Equal highs at 2 and 3: only index 2 qualifies.
        let bars = series(&[
            (dec!(10), dec!(9)),
            (dec!(11), dec!(10)),
            (dec!(12), dec!(11)),
            (dec!(12), dec!(11)),
            (dec!(11), dec!(10)),
            (dec!(10), dec!(9)),
        ]);
        let highs: Vec<_> = detect(&bars, 2).into_iter().filter(|p| p.kind == SwingKind::High).collect();
        assert_eq!(highs, vec![SwingPoint::high(2, dec!(12))]);
    }

    #[test]
    fn test_latest_picks_highest_index() {
        let points = vec![
            SwingPoint::high(3, dec!(12)),
            SwingPoint::low(5, dec!(8)),
            SwingPoint::high(9, dec!(11)),
            SwingPoint::low(7, dec!(9)),
        ];
        let swings = latest(&points);
        assert_eq!(swings.high, Some(SwingPoint::high(9, dec!(11))));
        assert_eq!(swings.low, Some(SwingPoint::low(7, dec!(9))));
        assert!(swings.pair().is_some());

        assert_eq!(latest(&[]).pair(), None);
    }

    #[test]
    fn test_detection_is_deterministic() {
        let bars = series(&[
            (dec!(10), dec!(9)),
            (dec!(9), dec!(8)),
            (dec!(8), dec!(7)),
            (dec!(9), dec!(8)),
            (dec!(10), dec!(9)),
            (dec!(11), dec!(10)),
            (dec!(10), dec!(9)),
        ]);
        assert_eq!(detect(&bars, 2), detect(&bars, 2));
    }
}
