//! Evaluation input context and output record

use std::fmt;

use kishoka_domain::{Instrument, InstrumentSpec, LevelSet, PositionEvent, PositionState, Signal, SwingPoint};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::entry::CandidateSignal;

/// Per-call facts supplied by the caller alongside the bars
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EvaluationContext {
    /// Instrument being evaluated
    pub instrument: Instrument,
    /// Average true range from the indicator collaborator, if available
    pub atr: Option<Decimal>,
}

impl EvaluationContext {
    /// Context without ATR.
    pub fn new(instrument: Instrument) -> Self {
        Self { instrument, atr: None }
    }

    /// Attach an ATR value.
    pub fn with_atr(mut self, atr: Decimal) -> Self {
        self.atr = Some(atr);
        self
    }
}

/// Why an evaluation produced no signal
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "reason", rename_all = "snake_case")]
pub enum SkipReason {
    /// Not enough bars for a single swing window
    InsufficientData {
        /// Bars supplied
        available: usize,
        /// Bars needed
        required: usize,
    },
    /// No swing high or no swing low in the series
    NoSwingPair,
    /// Swing high does not exceed swing low
    DegenerateLevelSet,
    /// Latest bar formed no rejection pattern
    NoRejection,
}

impl fmt::Display for SkipReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SkipReason::InsufficientData { available, required } => {
                write!(f, "insufficient data: {} bars, need {}", available, required)
            },
            SkipReason::NoSwingPair => write!(f, "no swing high/low pair"),
            SkipReason::DegenerateLevelSet => write!(f, "swing range is degenerate"),
            SkipReason::NoRejection => write!(f, "no rejection pattern on the latest bar"),
        }
    }
}

/// Non-fatal conditions raised during an evaluation
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "warning", content = "detail", rename_all = "snake_case")]
pub enum EngineWarning {
    /// Instrument could not be classified; the fallback pip was used
    UnknownInstrumentClass(String),
    /// A transition targeted a closed position and was ignored
    StaleState,
}

impl fmt::Display for EngineWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EngineWarning::UnknownInstrumentClass(label) => {
                write!(f, "unknown instrument class '{}', fallback pip used", label)
            },
            EngineWarning::StaleState => write!(f, "transition on a closed position ignored"),
        }
    }
}

/// Everything one evaluation produced.
///
/// `signal` and `state` are the outputs; the rest is diagnostics.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Evaluation {
    /// Emitted signal, if a rejection formed
    pub signal: Option<Signal>,
    /// Position state to pass into the next evaluation
    pub state: PositionState,
    /// Spec the pip distances were converted with
    pub instrument: InstrumentSpec,
    /// Every swing point found
    pub swings: Vec<SwingPoint>,
    /// Level set of the latest swing pair
    pub levels: Option<LevelSet>,
    /// Entry check result
    pub candidate: CandidateSignal,
    /// Why no signal was produced
    pub skipped: Option<SkipReason>,
    /// Non-fatal conditions
    pub warnings: Vec<EngineWarning>,
    /// Risk events, in order
    pub events: Vec<PositionEvent>,
}

impl Evaluation {
    /// A signal was emitted.
    pub fn has_signal(&self) -> bool {
        self.signal.is_some()
    }
}
