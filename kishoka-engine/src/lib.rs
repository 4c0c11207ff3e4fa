//! Kishoka Engine Layer
//!
//! Pure decision logic, deterministic, no I/O.
//!
//! Given a validated [`BarSeries`](kishoka_domain::BarSeries), an
//! [`EvaluationContext`] and the caller's prior
//! [`PositionState`](kishoka_domain::PositionState), the engine detects swing
//! points, draws Fibonacci retracement levels, checks the latest bar for a
//! rejection, and drives the position risk state machine. It returns an
//! [`Evaluation`] carrying the optional [`Signal`](kishoka_domain::Signal) and
//! the next state. No component keeps memory between calls.

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod assembler;
pub mod config;
pub mod entry;
pub mod error;
pub mod evaluation;
pub mod fibonacci;
pub mod instrument;
pub mod recommendation;
pub mod risk;
pub mod strategy;
pub mod swing;

pub use config::{ResolverConfig, StrategyConfig};
pub use entry::CandidateSignal;
pub use error::{EngineError, EngineResult};
pub use evaluation::{EngineWarning, Evaluation, EvaluationContext, SkipReason};
pub use instrument::{PipResolver, Resolution};
pub use recommendation::{Action, Recommendation, RECENT_SIGNAL_BARS};
pub use risk::{EntryPlan, RiskDecision, RiskManager};
pub use strategy::{Analysis, KishokaStrategy, StrategyKind, StrategyRegistry, KISHOKA};
pub use swing::LatestSwings;
