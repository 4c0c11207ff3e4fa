//! Market Data Types
//!
//! Price bars as supplied by the price-fetching collaborator, and the
//! validated [`BarSeries`] that every evaluation consumes.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::value_objects::DomainError;

// =============================================================================
// PriceBar
// =============================================================================

/// OHLC(V) bar.
///
/// Immutable once produced. Gaps between bars are treated as ordinary.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PriceBar {
    /// Bar open time
    pub timestamp: DateTime<Utc>,
    /// Open price
    pub open: Decimal,
    /// High price
    pub high: Decimal,
    /// Low price
    pub low: Decimal,
    /// Close price
    pub close: Decimal,
    /// Traded volume, when the feed provides it
    #[serde(default)]
    pub volume: Option<Decimal>,
}

impl PriceBar {
    /// Create a new bar.
    pub fn new(
        timestamp: DateTime<Utc>,
        open: Decimal,
        high: Decimal,
        low: Decimal,
        close: Decimal,
        volume: Option<Decimal>,
    ) -> Self {
        Self { timestamp, open, high, low, close, volume }
    }

    /// High minus low.
    pub fn range(&self) -> Decimal {
        self.high - self.low
    }

    /// Absolute size of the candle body.
    pub fn body(&self) -> Decimal {
        (self.close - self.open).abs()
    }

    /// Close strictly above open.
    pub fn is_bullish(&self) -> bool {
        self.close > self.open
    }

    /// Close strictly below open.
    pub fn is_bearish(&self) -> bool {
        self.close < self.open
    }

    /// Check the bar is internally consistent.
    ///
    /// # Errors
    /// Returns `DomainError::MalformedInput` when a price is non-positive or
    /// high/low do not bound open and close.
    pub fn validate(&self) -> Result<(), DomainError> {
        if self.low <= Decimal::ZERO {
            return Err(DomainError::MalformedInput(format!(
                "bar at {} has non-positive low {}",
                self.timestamp, self.low
            )));
        }

        if self.high < self.low {
            return Err(DomainError::MalformedInput(format!(
                "bar at {} has high {} below low {}",
                self.timestamp, self.high, self.low
            )));
        }

        let body_top = self.open.max(self.close);
        let body_bottom = self.open.min(self.close);
        if body_top > self.high || body_bottom < self.low {
            return Err(DomainError::MalformedInput(format!(
                "bar at {} has open/close outside its high/low range",
                self.timestamp
            )));
        }

        if matches!(self.volume, Some(v) if v < Decimal::ZERO) {
            return Err(DomainError::MalformedInput(format!(
                "bar at {} has negative volume",
                self.timestamp
            )));
        }

        Ok(())
    }
}

// =============================================================================
// BarSeries
// =============================================================================

/// Chronologically ordered, validated sequence of bars.
///
/// Construction is the only place malformed input is rejected; everything
/// downstream assumes strictly increasing timestamps and consistent bars.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct BarSeries {
    bars: Vec<PriceBar>,
}

impl BarSeries {
    /// Validate and wrap a bar sequence.
    ///
    /// # Errors
    /// Returns `DomainError::MalformedInput` if any bar is inconsistent or
    /// timestamps are not strictly increasing.
    ///
    /// ```
    /// # use kishoka_domain::{BarSeries, PriceBar};
    /// # use chrono::{TimeZone, Utc};
    /// # use rust_decimal_macros::dec;
    /// let t0 = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
    /// let bar = |t| PriceBar::new(t, dec!(1.10), dec!(1.12), dec!(1.09), dec!(1.11), None);
    ///
    /// // Duplicate timestamp is rejected
    /// assert!(BarSeries::new(vec![bar(t0), bar(t0)]).is_err());
    /// ```
    pub fn new(bars: Vec<PriceBar>) -> Result<Self, DomainError> {
        for (i, bar) in bars.iter().enumerate() {
            bar.validate()?;
            if i > 0 && bars[i - 1].timestamp >= bar.timestamp {
                return Err(DomainError::MalformedInput(format!(
                    "timestamps not strictly increasing at index {}: {} then {}",
                    i,
                    bars[i - 1].timestamp,
                    bar.timestamp
                )));
            }
        }
        Ok(Self { bars })
    }

    /// All bars, oldest first.
    pub fn bars(&self) -> &[PriceBar] {
        &self.bars
    }

    /// Number of bars.
    pub fn len(&self) -> usize {
        self.bars.len()
    }

    /// True when the series holds no bars.
    pub fn is_empty(&self) -> bool {
        self.bars.is_empty()
    }

    /// Most recent bar.
    pub fn last(&self) -> Option<&PriceBar> {
        self.bars.last()
    }

    /// Borrowed view of the whole series.
    pub fn window(&self) -> BarWindow<'_> {
        BarWindow { bars: &self.bars }
    }

    /// Borrowed view of the first `len` bars (clamped to the series length).
    pub fn prefix(&self, len: usize) -> BarWindow<'_> {
        BarWindow { bars: &self.bars[..len.min(self.bars.len())] }
    }
}

impl<'de> Deserialize<'de> for BarSeries {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let bars = Vec::<PriceBar>::deserialize(deserializer)?;
        BarSeries::new(bars).map_err(serde::de::Error::custom)
    }
}

// =============================================================================
// BarWindow
// =============================================================================

/// Borrowed run of bars taken from a [`BarSeries`].
///
/// Only a series can hand one out, so a window is always ordered and valid.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BarWindow<'a> {
    bars: &'a [PriceBar],
}

impl<'a> BarWindow<'a> {
    /// Bars in the window, oldest first.
    pub fn bars(&self) -> &'a [PriceBar] {
        self.bars
    }

    /// Number of bars.
    pub fn len(&self) -> usize {
        self.bars.len()
    }

    /// True when the window holds no bars.
    pub fn is_empty(&self) -> bool {
        self.bars.is_empty()
    }

    /// Most recent bar.
    pub fn last(&self) -> Option<&'a PriceBar> {
        self.bars.last()
    }
}

impl<'a> From<&'a BarSeries> for BarWindow<'a> {
    fn from(series: &'a BarSeries) -> Self {
        series.window()
    }
}

// =============================================================================
// Tests
// =============================================================================
