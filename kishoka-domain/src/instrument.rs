//! Instrument classification and pip specification

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::value_objects::DomainError;

/// Instrument classes the pip table knows about
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InstrumentClass {
    /// Currency pair
    Forex,
    /// Listed stock
    Equity,
    /// Metals, energy, agricultural
    Commodity,
}

impl fmt::Display for InstrumentClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            InstrumentClass::Forex => write!(f, "forex"),
            InstrumentClass::Equity => write!(f, "equity"),
            InstrumentClass::Commodity => write!(f, "commodity"),
        }
    }
}

impl FromStr for InstrumentClass {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "forex" | "fx" => Ok(InstrumentClass::Forex),
            "equity" | "stock" => Ok(InstrumentClass::Equity),
            "commodity" => Ok(InstrumentClass::Commodity),
            other => Err(DomainError::InvalidInstrument(format!("unknown class: {}", other))),
        }
    }
}

/// What the caller knows about the instrument being evaluated.
///
/// `Unclassified` carries the raw label; the resolver falls back to a
/// conservative default for it instead of failing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Instrument {
    /// Currency pair; JPY-quoted pairs use a wider pip
    Forex {
        /// Quote currency is JPY
        jpy_quoted: bool,
    },
    /// Listed stock
    Equity,
    /// Metals, energy, agricultural
    Commodity,
    /// Anything the caller could not classify
    Unclassified(String),
}

impl Instrument {
    /// Classify a ticker or pair symbol.
    ///
    /// Pairs are written with a slash (`EUR/USD`, `USD/JPY`). Precious-metal
    /// and energy bases (`XAU/USD`, `WTI/USD`) are commodities. Plain
    /// alphabetic tickers of one to five letters are equities.
    ///
    /// ```
    /// # use kishoka_domain::Instrument;
    /// assert_eq!(Instrument::classify("USD/JPY"), Instrument::Forex { jpy_quoted: true });
    /// assert_eq!(Instrument::classify("AAPL"), Instrument::Equity);
    /// assert_eq!(Instrument::classify("XAU/USD"), Instrument::Commodity);
    /// ```
    pub fn classify(symbol: &str) -> Self {
        const COMMODITY_BASES: &[&str] = &["XAU", "XAG", "XPT", "XPD", "WTI", "BRENT", "NATGAS"];

        let symbol = symbol.trim().to_uppercase();
        if let Some((base, quote)) = symbol.split_once('/') {
            if COMMODITY_BASES.contains(&base) {
                return Instrument::Commodity;
            }
            if base.len() == 3 && quote.len() == 3 {
                return Instrument::Forex { jpy_quoted: quote == "JPY" };
            }
            return Instrument::Unclassified(symbol);
        }

        if (1..=5).contains(&symbol.len()) && symbol.chars().all(|c| c.is_ascii_alphabetic()) {
            return Instrument::Equity;
        }

        Instrument::Unclassified(symbol)
    }

    /// The pip-table class, if classified.
    pub fn class(&self) -> Option<InstrumentClass> {
        match self {
            Instrument::Forex { .. } => Some(InstrumentClass::Forex),
            Instrument::Equity => Some(InstrumentClass::Equity),
            Instrument::Commodity => Some(InstrumentClass::Commodity),
            Instrument::Unclassified(_) => None,
        }
    }
}

impl From<InstrumentClass> for Instrument {
    fn from(class: InstrumentClass) -> Self {
        match class {
            InstrumentClass::Forex => Instrument::Forex { jpy_quoted: false },
            InstrumentClass::Equity => Instrument::Equity,
            InstrumentClass::Commodity => Instrument::Commodity,
        }
    }
}

// =============================================================================
// InstrumentSpec
// =============================================================================

/// Pip size and quoting precision of an instrument
///
/// # Invariants
/// - `pip_size > 0`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct InstrumentSpec {
    /// Class the spec was resolved for (the fallback class for unclassified input)
    pub class: InstrumentClass,
    /// Value of one pip in price units
    pub pip_size: Decimal,
    /// Decimal places prices are quoted with
    pub price_precision: u32,
}

impl InstrumentSpec {
    /// Create a validated spec.
    ///
    /// # Errors
    /// Returns `DomainError::InvalidInstrument` if `pip_size <= 0`.
    pub fn new(class: InstrumentClass, pip_size: Decimal, price_precision: u32) -> Result<Self, DomainError> {
        if pip_size <= Decimal::ZERO {
            return Err(DomainError::InvalidInstrument(format!(
                "pip size must be positive, got {}",
                pip_size
            )));
        }
        Ok(Self { class, pip_size, price_precision })
    }

    /// Convert a pip count into a price distance.
    pub fn pips_to_price(&self, pips: Decimal) -> Decimal {
        pips * self.pip_size
    }

    /// Convert a price distance into pips.
    pub fn price_to_pips(&self, distance: Decimal) -> Decimal {
        distance / self.pip_size
    }

    /// Round a price to the quoting precision.
    pub fn round_price(&self, price: Decimal) -> Decimal {
        price.round_dp(self.price_precision)
    }
}

// =============================================================================
// Tests
// =============================================================================
