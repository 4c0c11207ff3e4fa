//! Fibonacci retracement levels from the latest swing pair.

use std::collections::BTreeMap;

use kishoka_domain::analysis::{RATIO_FULL, RATIO_MID, RATIO_ORIGIN};
use kishoka_domain::{LevelSet, RetraceDirection, SwingPoint};
use rust_decimal::Decimal;

/// Compute the level set for a swing pair.
///
/// The pair is degenerate, and `None` is returned, when
/// `high - low <= epsilon`. Ratios outside `[0, 1]` are ignored; 0, 0.5 and 1
/// are always present.
///
/// A high that came after the low gives a [`RetraceDirection::BearishRetrace`]
/// with 0% at the high. Otherwise (including a pair on the same bar) the set
/// is bullish with 0% at the low.
///
/// ```
/// use kishoka_domain::{RetraceDirection, SwingPoint};
/// use kishoka_engine::fibonacci::compute;
/// use rust_decimal_macros::dec;
///
/// let high = SwingPoint::high(3, dec!(1.135));
/// let low = SwingPoint::low(9, dec!(1.118));
/// let set = compute(high, low, &[dec!(0.5)], dec!(0.00000001)).unwrap();
///
/// assert_eq!(set.direction, RetraceDirection::BullishRetrace);
/// assert_eq!(set.level(dec!(0)), Some(dec!(1.118)));
/// assert_eq!(set.level(dec!(0.5)), Some(dec!(1.1265)));
/// assert_eq!(set.level(dec!(1)), Some(dec!(1.135)));
/// ```
pub fn compute(high: SwingPoint, low: SwingPoint, ratios: &[Decimal], epsilon: Decimal) -> Option<LevelSet> {
    let range = high.price - low.price;
    if range <= epsilon {
        return None;
    }

    let direction = if high.index > low.index {
        RetraceDirection::BearishRetrace
    } else {
        RetraceDirection::BullishRetrace
    };

    let mid = (high.price + low.price) / Decimal::TWO;
    let mut levels = BTreeMap::new();

    for &ratio in ratios.iter().chain([RATIO_ORIGIN, RATIO_MID, RATIO_FULL].iter()) {
        if ratio < RATIO_ORIGIN || ratio > RATIO_FULL {
            continue;
        }
        let price = if ratio == RATIO_MID {
            mid
        } else {
            match direction {
                RetraceDirection::BullishRetrace => low.price + range * ratio,
                RetraceDirection::BearishRetrace => high.price - range * ratio,
            }
        };
        levels.insert(ratio.normalize(), price);
    }

    Some(LevelSet { swing_high: high, swing_low: low, direction, levels })
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    const EPS: Decimal = dec!(0.00000001);

    #[test]
    fn test_bullish_retrace_anchors() {
        let set = compute(SwingPoint::high(3, dec!(1.135)), SwingPoint::low(9, dec!(1.118)), &[], EPS).unwrap();

        assert_eq!(set.direction, RetraceDirection::BullishRetrace);
        assert_eq!(set.level(RATIO_ORIGIN), Some(dec!(1.118)));
        assert_eq!(set.level(RATIO_MID), Some(dec!(1.1265)));
        assert_eq!(set.level(RATIO_FULL), Some(dec!(1.135)));
    }

    #[test]
    fn test_bearish_retrace_inverts_mapping() {
        let set = compute(
            SwingPoint::high(9, dec!(1.135)),
            SwingPoint::low(3, dec!(1.118)),
            &[dec!(0.618)],
            EPS,
        )
        .unwrap();

        assert_eq!(set.direction, RetraceDirection::BearishRetrace);
        assert_eq!(set.level(dec!(0)), Some(dec!(1.135)));
        assert_eq!(set.level(dec!(1)), Some(dec!(1.118)));
        assert_eq!(set.level(dec!(0.5)), Some(dec!(1.1265)));
        assert_eq!(set.level(dec!(0.618)), Some(dec!(1.135) - dec!(0.017) * dec!(0.618)));
    }

    #[test]
    fn test_midpoint_is_exact_for_odd_ranges() {
        let set = compute(SwingPoint::high(1, dec!(1.00003)), SwingPoint::low(4, dec!(1.00000)), &[], EPS).unwrap();
        assert_eq!(set.level(RATIO_MID), Some(dec!(1.000015)));
        assert_eq!(set.midpoint(), dec!(1.000015));
    }

    #[test]
    fn test_degenerate_pairs() {
        assert!(compute(SwingPoint::high(1, dec!(1.1)), SwingPoint::low(4, dec!(1.1)), &[], EPS).is_none());
        assert!(compute(SwingPoint::high(1, dec!(1.0)), SwingPoint::low(4, dec!(1.1)), &[], EPS).is_none());
        assert!(compute(SwingPoint::high(1, dec!(1.000000005)), SwingPoint::low(4, dec!(1.0)), &[], EPS).is_none());
    }

    #[test]
    fn test_out_of_range_ratios_ignored() {
        let set = compute(
            SwingPoint::high(1, dec!(2)),
            SwingPoint::low(4, dec!(1)),
            &[dec!(1.618), dec!(-0.1), dec!(0.382)],
            EPS,
        )
        .unwrap();
        assert_eq!(set.levels.len(), 4);
        assert_eq!(set.level(dec!(0.382)), Some(dec!(1.382)));
    }

    #[test]
    fn test_same_bar_pair_is_bullish() {
        let set = compute(SwingPoint::high(5, dec!(2)), SwingPoint::low(5, dec!(1)), &[], EPS).unwrap();
        assert_eq!(set.direction, RetraceDirection::BullishRetrace);
    }

    #[test]
    fn test_near_midpoint_ratio_does_not_replace_fib_50() {
        let set = compute(SwingPoint::high(3, dec!(1.135)), SwingPoint::low(9, dec!(1.118)), &[dec!(0.505)], EPS)
            .unwrap();

        assert_eq!(set.level(dec!(0.505)), Some(dec!(1.126585)));
        assert_eq!(set.labelled()["fib_50"], set.midpoint());
    }
}
