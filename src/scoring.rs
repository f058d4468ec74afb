//! Confidence Scorer
//!
//! `confidence = |body| / range * scale`, clamped to `[0, 100]`. Single and
//! two-bar labels score the last bar; a confirmation match scores the union
//! of its bars (open of the first, close of the last, highest high, lowest low).

use crate::{detectors::helpers::CONFIDENCE_SCALE, ClassificationResult, Confidence, Factor, OHLCV};

/// Range-normalized body scorer
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Scorer {
    scale: Factor,
}

impl Default for Scorer {
    fn default() -> Self {
        Self {
            scale: Factor::new_const(CONFIDENCE_SCALE),
        }
    }
}

impl Scorer {
    pub fn new(scale: Factor) -> Self {
        Self { scale }
    }

    #[inline]
    pub fn scale(&self) -> Factor {
        self.scale
    }

    /// Score a classified window. Non-finite intermediate values yield zero.
    ///
    /// The last bar's shape comes from the classification's features; `bars`
    /// is read only for the span of a confirmation match.
    pub fn score<T: OHLCV>(&self, bars: &[T], classification: &ClassificationResult) -> Confidence {
        self.try_score(bars, classification)
            .unwrap_or(Confidence::ZERO)
    }

    /// Like [`Scorer::score`], but `None` when the inputs produce NaN or infinity
    /// so the caller can also drop the labels.
    pub fn try_score<T: OHLCV>(
        &self,
        bars: &[T],
        classification: &ClassificationResult,
    ) -> Option<Confidence> {
        let (body, range) = match (classification.anchor, classification.features) {
            (Some(anchor), _) => span_extent(bars, anchor.start_index, anchor.end_index)?,
            (None, Some(features)) => (features.last.body, features.last.range),
            (None, None) => return Some(Confidence::ZERO),
        };
        self.score_extent(body, range)
    }

    /// `|body| / range * scale` clamped to `[0, 100]`; zero when `range <= 0`.
    pub fn score_extent(&self, body: f64, range: f64) -> Option<Confidence> {
        if !body.is_finite() || !range.is_finite() {
            return None;
        }
        if range <= 0.0 {
            return Some(Confidence::ZERO);
        }

        let raw = body.abs() / range * self.scale.get();
        raw.is_finite().then(|| Confidence::saturating(raw))
    }
}

/// Net body and total excursion over `bars[start..=end]`
fn span_extent<T: OHLCV>(bars: &[T], start: usize, end: usize) -> Option<(f64, f64)> {
    let window = bars.get(start..=end)?;
    let (first, last) = (window.first()?, window.last()?);

    let high = window.iter().map(OHLCV::high).fold(f64::NEG_INFINITY, f64::max);
    let low = window.iter().map(OHLCV::low).fold(f64::INFINITY, f64::min);

    Some((last.close() - first.open(), high - low))
}
