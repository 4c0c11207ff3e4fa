//! Kishoka Domain Layer
//!
//! Pure domain types with zero I/O dependencies.
//! Contains price bars, derived swing/level records, instrument specs,
//! position state and the outbound signal record.

#![warn(missing_docs)]
#![warn(clippy::all)]

// Public modules
pub mod analysis;
pub mod entities;
pub mod events;
pub mod instrument;
pub mod market_data;
pub mod signal;
pub mod value_objects;

// Re-export commonly used types
pub use analysis::{fib_label, LevelSet, RetraceDirection, SwingKind, SwingPoint};
pub use entities::{ExitReason, OpenPosition, PositionState, PositionStatus};
pub use events::PositionEvent;
pub use instrument::{Instrument, InstrumentClass, InstrumentSpec};
pub use market_data::{BarSeries, BarWindow, PriceBar};
pub use signal::{Signal, SignalMetadata, FIBONACCI_RETRACEMENT};
pub use value_objects::{DomainError, Side};
