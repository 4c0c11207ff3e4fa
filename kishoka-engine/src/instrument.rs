//! Instrument pip resolution.
//!
//! Maps a classified [`Instrument`] to the pip size and quoting precision the
//! risk rules convert distances with. Unclassified input never fails: it gets
//! a conservative fallback and a warning.

use kishoka_domain::{Instrument, InstrumentClass, InstrumentSpec};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use tracing::warn;

use crate::config::ResolverConfig;
use crate::error::EngineResult;
use crate::evaluation::EngineWarning;

const FOREX_PIP: Decimal = dec!(0.0001);
const FOREX_PRECISION: u32 = 5;
const JPY_PIP: Decimal = dec!(0.01);
const JPY_PRECISION: u32 = 3;
const FALLBACK_PIP: Decimal = dec!(0.01);
const FALLBACK_PRECISION: u32 = 2;

/// Resolved spec plus the warning raised while resolving it, if any
#[derive(Debug, Clone, PartialEq)]
pub struct Resolution {
    /// Spec to convert pip distances with
    pub spec: InstrumentSpec,
    /// Set when the fallback was used
    pub warning: Option<EngineWarning>,
}

/// Read-only pip table.
///
/// # Example
///
/// ```
/// use kishoka_engine::{PipResolver, ResolverConfig};
/// use kishoka_domain::Instrument;
/// use rust_decimal_macros::dec;
///
/// let resolver = PipResolver::new(ResolverConfig::default()).unwrap();
/// let resolution = resolver.resolve(&Instrument::classify("EUR/USD"));
/// assert_eq!(resolution.spec.pip_size, dec!(0.0001));
/// assert!(resolution.warning.is_none());
/// ```
#[derive(Debug, Clone)]
pub struct PipResolver {
    config: ResolverConfig,
}

impl PipResolver {
    /// Create a resolver.
    ///
    /// # Errors
    /// Returns `EngineError::InvalidConfig` if a configured tick is not positive.
    pub fn new(config: ResolverConfig) -> EngineResult<Self> {
        config.validate()?;
        Ok(Self { config })
    }

    /// Resolve an instrument, falling back for unclassified input.
    pub fn resolve(&self, instrument: &Instrument) -> Resolution {
        match instrument {
            Instrument::Forex { jpy_quoted: true } => Resolution {
                spec: InstrumentSpec { class: InstrumentClass::Forex, pip_size: JPY_PIP, price_precision: JPY_PRECISION },
                warning: None,
            },
            Instrument::Unclassified(label) => {
                warn!(instrument = %label, pip_size = %FALLBACK_PIP, "Unknown instrument class, using fallback pip");
                Resolution {
                    spec: InstrumentSpec {
                        class: InstrumentClass::Equity,
                        pip_size: FALLBACK_PIP,
                        price_precision: FALLBACK_PRECISION,
                    },
                    warning: Some(EngineWarning::UnknownInstrumentClass(label.clone())),
                }
            },
            classified => {
                // Forex{jpy_quoted: false}, Equity and Commodity all have a class
                let class = classified.class().unwrap_or(InstrumentClass::Equity);
                Resolution { spec: self.resolve_class(class), warning: None }
            },
        }
    }

    /// Table entry of a class (non-JPY convention for Forex).
    pub fn resolve_class(&self, class: InstrumentClass) -> InstrumentSpec {
        let (pip_size, price_precision) = match class {
            InstrumentClass::Forex => (FOREX_PIP, FOREX_PRECISION),
            InstrumentClass::Equity => (self.config.equity_tick, self.config.equity_precision),
            InstrumentClass::Commodity => (self.config.commodity_tick, self.config.commodity_precision),
        };
        InstrumentSpec { class, pip_size, price_precision }
    }
}

impl Default for PipResolver {
    fn default() -> Self {
        Self { config: ResolverConfig::default() }
    }
}

// =============================================================================
// Tests
// =============================================================================
