//! Strategy evaluation and registry.
//!
//! # Evaluation flow
//!
//! ```text
//! BarSeries ─▶ swing::detect ─▶ swing::latest ─▶ fibonacci::compute
//!                                                     │
//!   prior PositionState ─▶ RiskManager::update        ▼
//!   (last close)                 │              entry::evaluate
//!                                │                    │
//!                                ▼                    ▼
//!                        RiskManager::open ◀── plan_entry ─▶ assembler::assemble
//!                                │                                 │
//!                                ▼                                 ▼
//!                         next PositionState                    Signal
//! ```
//!
//! An open prior is updated on the latest close before the series is
//! analyzed, so a position closed on this bar cannot be reopened by a signal
//! on the same bar.

use std::collections::BTreeMap;

use kishoka_domain::{BarWindow, LevelSet, PositionState, PriceBar, SwingPoint};
use tracing::{debug, info};

use crate::assembler;
use crate::config::{ResolverConfig, StrategyConfig};
use crate::entry::{self, CandidateSignal};
use crate::error::{EngineError, EngineResult};
use crate::evaluation::{EngineWarning, Evaluation, EvaluationContext, SkipReason};
use crate::fibonacci;
use crate::instrument::PipResolver;
use crate::risk::RiskManager;
use crate::swing;

/// Identifier of the swing/retracement strategy.
pub const KISHOKA: &str = "kishoka";

// =============================================================================
// Analysis
// =============================================================================

/// Swing and level analysis of a bar series (no risk, no signal)
#[derive(Debug, Clone, PartialEq)]
pub struct Analysis {
    /// Every swing point found
    pub swings: Vec<SwingPoint>,
    /// Level set of the latest swing pair
    pub levels: Option<LevelSet>,
    /// Why no level set is available
    pub skipped: Option<SkipReason>,
}

// =============================================================================
// Kishoka Strategy
// =============================================================================

/// Swing-based Fibonacci retracement strategy with its risk state machine.
///
/// Holds only configuration; safe to share across threads.
#[derive(Debug, Clone)]
pub struct KishokaStrategy {
    config: StrategyConfig,
    resolver: PipResolver,
    risk: RiskManager,
}

impl KishokaStrategy {
    /// Create a strategy.
    ///
    /// # Errors
    /// Returns `EngineError::InvalidConfig` if either configuration is invalid.
    pub fn new(config: StrategyConfig, resolver: ResolverConfig) -> EngineResult<Self> {
        config.validate()?;
        let resolver = PipResolver::new(resolver)?;
        let risk = RiskManager::from_config(&config);
        Ok(Self { config, resolver, risk })
    }

    /// Strategy configuration.
    pub fn config(&self) -> &StrategyConfig {
        &self.config
    }

    /// Detect swings and compute the level set.
    pub fn analyze(&self, bars: &[PriceBar]) -> Analysis {
        let required = self.config.min_bars();
        if bars.len() < required {
            debug!(available = bars.len(), required, "Not enough bars for a swing window");
            return Analysis {
                swings: Vec::new(),
                levels: None,
                skipped: Some(SkipReason::InsufficientData { available: bars.len(), required }),
            };
        }

        let swings = swing::detect(bars, self.config.swing_length);
        let Some((high, low)) = swing::latest(&swings).pair() else {
            debug!(swings = swings.len(), "No swing pair");
            return Analysis { swings, levels: None, skipped: Some(SkipReason::NoSwingPair) };
        };

        match fibonacci::compute(high, low, &self.config.fib_levels, self.config.level_epsilon) {
            Some(levels) => Analysis { swings, levels: Some(levels), skipped: None },
            None => {
                info!(swing_high = %high.price, swing_low = %low.price, "Degenerate swing range, no levels");
                Analysis { swings, levels: None, skipped: Some(SkipReason::DegenerateLevelSet) }
            },
        }
    }

    /// Evaluate the strategy on a series (or a borrowed prefix of one) given
    /// the caller's prior state.
    pub fn evaluate<'a>(
        &self,
        series: impl Into<BarWindow<'a>>,
        ctx: &EvaluationContext,
        prior: PositionState,
    ) -> Evaluation {
        let series = series.into();
        let resolution = self.resolver.resolve(&ctx.instrument);
        let spec = resolution.spec;
        let mut warnings: Vec<EngineWarning> = resolution.warning.into_iter().collect();
        let mut events = Vec::new();

        let mut state = prior;
        match (prior, series.last()) {
            (PositionState::Open(_), Some(last)) => {
                let decision = self.risk.update(prior, last.close, &spec);
                state = decision.state;
                events.extend(decision.events);
            },
            (PositionState::Closed { .. }, _) => warnings.push(EngineWarning::StaleState),
            _ => {},
        }

        let bars = series.bars();
        let analysis = self.analyze(bars);
        let mut evaluation = Evaluation {
            signal: None,
            state,
            instrument: spec,
            swings: analysis.swings,
            levels: analysis.levels,
            candidate: CandidateSignal::none(),
            skipped: analysis.skipped,
            warnings,
            events,
        };

        let Some(levels) = evaluation.levels.as_ref() else {
            return evaluation;
        };

        let tolerance = spec.pips_to_price(self.config.touch_tolerance_pips);
        let candidate = entry::evaluate(levels, bars, tolerance);
        let (Some(side), Some(bar)) = (candidate.direction, candidate.rejection_bar.as_ref()) else {
            debug!("No rejection on the latest bar");
            evaluation.skipped = Some(SkipReason::NoRejection);
            return evaluation;
        };

        let plan = self.risk.plan_entry(side, bar.close, levels, &spec, ctx.atr);
        evaluation.signal = assembler::assemble(&candidate, Some(levels), &plan);
        evaluation.candidate = candidate;

        if evaluation.state.is_pending() {
            let decision = self.risk.open(evaluation.state, &plan);
            evaluation.state = decision.state;
            evaluation.events.extend(decision.events);
        }

        evaluation
    }
}

// =============================================================================
// Strategy Registry
// =============================================================================

/// Closed set of strategies behind one evaluation contract
#[derive(Debug, Clone)]
pub enum StrategyKind {
    /// Swing/retracement strategy
    Kishoka(KishokaStrategy),
}

impl StrategyKind {
    /// Registry identifier.
    pub fn id(&self) -> &'static str {
        match self {
            StrategyKind::Kishoka(_) => KISHOKA,
        }
    }

    /// Evaluate the strategy.
    pub fn evaluate<'a>(
        &self,
        series: impl Into<BarWindow<'a>>,
        ctx: &EvaluationContext,
        prior: PositionState,
    ) -> Evaluation {
        match self {
            StrategyKind::Kishoka(strategy) => strategy.evaluate(series, ctx, prior),
        }
    }
}

impl From<KishokaStrategy> for StrategyKind {
    fn from(strategy: KishokaStrategy) -> Self {
        StrategyKind::Kishoka(strategy)
    }
}

/// Identifier → strategy mapping, built and owned by the caller.
///
/// # Example
///
/// ```
/// use kishoka_engine::{ResolverConfig, StrategyConfig, StrategyRegistry};
///
/// let registry = StrategyRegistry::with_kishoka(StrategyConfig::default(), ResolverConfig::default()).unwrap();
/// assert!(registry.get("kishoka").is_ok());
/// assert!(registry.get("momentum").is_err());
/// ```
#[derive(Debug, Clone, Default)]
pub struct StrategyRegistry {
    strategies: BTreeMap<String, StrategyKind>,
}

impl StrategyRegistry {
    /// Empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry holding the Kishoka strategy.
    ///
    /// # Errors
    /// Returns `EngineError::InvalidConfig` if either configuration is invalid.
    pub fn with_kishoka(config: StrategyConfig, resolver: ResolverConfig) -> EngineResult<Self> {
        let mut registry = Self::new();
        registry.register(KishokaStrategy::new(config, resolver)?);
        Ok(registry)
    }

    /// Register a strategy under its identifier, replacing any previous one.
    pub fn register(&mut self, strategy: impl Into<StrategyKind>) {
        let strategy = strategy.into();
        self.strategies.insert(strategy.id().to_string(), strategy);
    }

    /// Look up a strategy.
    ///
    /// # Errors
    /// Returns `EngineError::UnknownStrategy` if nothing is registered under `id`.
    pub fn get(&self, id: &str) -> EngineResult<&StrategyKind> {
        self.strategies.get(id).ok_or_else(|| EngineError::UnknownStrategy(id.to_string()))
    }

    /// Registered identifiers.
    pub fn ids(&self) -> impl Iterator<Item = &str> {
        self.strategies.keys().map(String::as_str)
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use kishoka_domain::Instrument;
    use kishoka_testkit::{series_from_ohlc, v_shape_bars};
    use rust_decimal_macros::dec;

    fn strategy(swing_length: usize) -> KishokaStrategy {
        let config = StrategyConfig { swing_length, ..Default::default() };
        KishokaStrategy::new(config, ResolverConfig::default()).unwrap()
    }

    #[test]
    fn test_engine_types_are_send_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<KishokaStrategy>();
        assert_send_sync::<StrategyRegistry>();
        assert_send_sync::<Evaluation>();
    }

    #[test]
    fn test_rejects_invalid_config() {
        let config = StrategyConfig { swing_length: 0, ..Default::default() };
        assert!(matches!(
            KishokaStrategy::new(config, ResolverConfig::default()),
            Err(EngineError::InvalidConfig(_))
        ));
    }

    #[test]
    fn test_analyze_insufficient_data() {
        let bars = series_from_ohlc(&[
            (dec!(1.10), dec!(1.11), dec!(1.09), dec!(1.10)),
            (dec!(1.10), dec!(1.12), dec!(1.10), dec!(1.11)),
        ]);
        let analysis = strategy(2).analyze(bars.bars());
        assert_eq!(analysis.skipped, Some(SkipReason::InsufficientData { available: 2, required: 5 }));
    }

    #[test]
    fn test_analyze_v_shape() {
        let bars = v_shape_bars();
        let analysis = strategy(2).analyze(bars.bars());

        assert!(analysis.skipped.is_none());
        let levels = analysis.levels.unwrap();
        assert_eq!(levels.swing_low.index, 2);
        assert_eq!(levels.swing_high.index, 5);
    }

    #[test]
    fn test_registry_lookup() {
        let registry = StrategyRegistry::with_kishoka(StrategyConfig::default(), ResolverConfig::default()).unwrap();

        assert_eq!(registry.ids().collect::<Vec<_>>(), vec!["kishoka"]);
        assert_eq!(registry.get(KISHOKA).unwrap().id(), "kishoka");
        assert!(matches!(registry.get("momentum"), Err(EngineError::UnknownStrategy(_))));
    }

    #[test]
    fn test_closed_prior_flags_stale() {
        let bars = v_shape_bars();
        let ctx = EvaluationContext::new(Instrument::Forex { jpy_quoted: false });
        let prior = PositionState::Closed {
            position: kishoka_domain::OpenPosition {
                side: kishoka_domain::Side::Buy,
                entry_price: dec!(1.15),
                current_stop: dec!(1.14),
                take_profit: dec!(1.20),
                breakeven_armed: false,
                scaled_in: false,
                breakeven_offset_pips: dec!(0),
                scale_level: dec!(1.16),
            },
            reason: kishoka_domain::ExitReason::Manual,
            exit_price: None,
        };

        let evaluation = strategy(2).evaluate(&bars, &ctx, prior);
        assert_eq!(evaluation.state, prior);
        assert!(evaluation.warnings.contains(&EngineWarning::StaleState));
        assert!(evaluation.events.is_empty());
    }
}
