//! Concrete bars and validated per-instrument series
//!
//! A [`Series`] is checked once on construction: finite prices, OHLC ordering
//! and strictly ascending timestamps. Everything downstream reads it without
//! re-validating.

use serde::{Deserialize, Serialize};

use crate::{OHLCVExt, PatternError, Result, OHLCV};

// ============================================================
// BAR
// ============================================================

/// One time-boxed price observation
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Bar {
    /// Bar start, in caller-defined units (epoch seconds, millis, ...)
    pub timestamp: i64,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
}

impl Bar {
    pub fn new(timestamp: i64, open: f64, high: f64, low: f64, close: f64) -> Self {
        Self {
            timestamp,
            open,
            high,
            low,
            close,
        }
    }
}

impl OHLCV for Bar {
    fn open(&self) -> f64 {
        self.open
    }

    fn high(&self) -> f64 {
        self.high
    }

    fn low(&self) -> f64 {
        self.low
    }

    fn close(&self) -> f64 {
        self.close
    }

    fn timestamp(&self) -> Option<i64> {
        Some(self.timestamp)
    }
}

// ============================================================
// SERIES
// ============================================================

/// Validated, immutable bar sequence for one instrument, oldest first
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RawSeries")]
pub struct Series {
    symbol: String,
    bars: Vec<Bar>,
}

#[derive(Deserialize)]
struct RawSeries {
    symbol: String,
    bars: Vec<Bar>,
}

impl TryFrom<RawSeries> for Series {
    type Error = PatternError;

    fn try_from(raw: RawSeries) -> Result<Self> {
        Series::new(raw.symbol, raw.bars)
    }
}

impl Series {
    /// Validate and wrap `bars`. An empty series is valid; it classifies as no signal.
    pub fn new(symbol: impl Into<String>, bars: Vec<Bar>) -> Result<Self> {
        validate_bars(&bars)?;
        Ok(Self {
            symbol: symbol.into(),
            bars,
        })
    }

    #[inline]
    pub fn symbol(&self) -> &str {
        &self.symbol
    }

    #[inline]
    pub fn bars(&self) -> &[Bar] {
        &self.bars
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.bars.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.bars.is_empty()
    }

    /// Most recent bar
    #[inline]
    pub fn last(&self) -> Option<&Bar> {
        self.bars.last()
    }
}

/// Check every bar and the timestamp ordering; the error carries the offending index.
pub fn validate_bars<T: OHLCV>(bars: &[T]) -> Result<()> {
    let mut previous: Option<i64> = None;
    for (index, bar) in bars.iter().enumerate() {
        bar.validate().map_err(|err| match err {
            PatternError::MalformedBar { reason, .. } => PatternError::MalformedBar { index, reason },
            other => other,
        })?;

        if let Some(ts) = bar.timestamp() {
            if previous.is_some_and(|prev| ts <= prev) {
                return Err(PatternError::MalformedBar {
                    index,
                    reason: "timestamp not ascending",
                });
            }
            previous = Some(ts);
        }
    }
    Ok(())
}
