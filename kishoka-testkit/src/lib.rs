//! Test helpers for Kishoka engine and replay tests.
//!
//! Provides bar builders and the canonical fixture series (V-shape swing
//! pair, bullish and bearish rejections, flat market).

mod helpers;

pub use helpers::{
    bar_at, bearish_rejection_bars, bullish_rejection_bars, extend_series, flat_bars, series_from_ohlc,
    try_series_from_ohlc, v_shape_bars, Ohlc,
};

/// Result type for fallible helpers.
pub type Result<T> = anyhow::Result<T>;
