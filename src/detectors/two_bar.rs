//! Two-bar candlestick pattern detectors
//!
//! Patterns: Bullish Engulfing, Bearish Engulfing. The last body must be larger
//! than the previous, opposite-signed body and close beyond the previous open.

#![allow(clippy::default_constructed_unit_structs)]

use std::collections::HashMap;

use super::helpers::engulfs;
use crate::{
    params::{ParamMeta, ParameterizedDetector},
    Direction, Features, PatternDetector, PatternId, PatternMatch, Result,
};

impl_with_defaults!(BullishEngulfingDetector, BearishEngulfingDetector);

// ============================================================
// ENGULFING PATTERNS
// ============================================================

/// Bullish Engulfing - rising bar swallows a falling one
#[derive(Debug, Clone, Copy, Default)]
pub struct BullishEngulfingDetector;

impl PatternDetector for BullishEngulfingDetector {
    fn id(&self) -> PatternId {
        PatternId::BULLISH_ENGULFING
    }

    fn min_bars(&self) -> usize {
        2
    }

    fn detect(&self, features: &Features) -> Option<PatternMatch> {
        let (prev, last) = features.pair()?;

        if prev.body < 0.0
            && last.body > 0.0
            && engulfs(prev.body, last.body)
            && last.close > prev.open
        {
            return Some(PatternMatch::trailing(
                PatternDetector::id(self),
                Direction::Up,
                features,
                2,
            ));
        }
        None
    }
}

impl ParameterizedDetector for BullishEngulfingDetector {
    fn param_meta() -> &'static [ParamMeta] {
        &[]
    }

    fn with_params(_params: &HashMap<&str, f64>) -> Result<Self> {
        Ok(Self)
    }

    fn pattern_id_str() -> &'static str {
        PatternId::BULLISH_ENGULFING.0
    }
}

/// Bearish Engulfing - falling bar swallows a rising one
#[derive(Debug, Clone, Copy, Default)]
pub struct BearishEngulfingDetector;

impl PatternDetector for BearishEngulfingDetector {
    fn id(&self) -> PatternId {
        PatternId::BEARISH_ENGULFING
    }

    fn min_bars(&self) -> usize {
        2
    }

    fn detect(&self, features: &Features) -> Option<PatternMatch> {
        let (prev, last) = features.pair()?;

        if prev.body > 0.0
            && last.body < 0.0
            && engulfs(prev.body, last.body)
            && last.close < prev.open
        {
            return Some(PatternMatch::trailing(
                PatternDetector::id(self),
                Direction::Down,
                features,
                2,
            ));
        }
        None
    }
}

impl ParameterizedDetector for BearishEngulfingDetector {
    fn param_meta() -> &'static [ParamMeta] {
        &[]
    }

    fn with_params(_params: &HashMap<&str, f64>) -> Result<Self> {
        Ok(Self)
    }

    fn pattern_id_str() -> &'static str {
        PatternId::BEARISH_ENGULFING.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::series::Bar;

    fn features(bars: &[Bar]) -> Features {
        Features::from_bars(bars).unwrap()
    }

    #[test]
    fn test_bullish_engulfing() {
        let d = BullishEngulfingDetector::with_defaults();
        let bars = [
            Bar::new(0, 10.0, 12.0, 9.0, 9.5),
            Bar::new(1, 9.5, 10.0, 8.0, 11.0),
        ];
        let m = d.detect(&features(&bars)).unwrap();
        assert_eq!(m.direction, Direction::Up);
        assert_eq!((m.start_index, m.end_index), (0, 1));
    }

    #[test]
    fn test_bullish_engulfing_needs_close_above_prev_open() {
        let d = BullishEngulfingDetector::with_defaults();
        // larger body but closes below prev.open
        let bars = [
            Bar::new(0, 10.0, 12.0, 9.0, 9.5),
            Bar::new(1, 8.0, 10.0, 7.5, 9.0),
        ];
        assert!(d.detect(&features(&bars)).is_none());
        assert!(d.detect(&features(&bars[1..])).is_none());
    }

    #[test]
    fn test_bearish_engulfing() {
        let d = BearishEngulfingDetector::with_defaults();
        let bars = [
            Bar::new(0, 10.0, 11.0, 9.5, 10.5),
            Bar::new(1, 10.6, 10.8, 8.5, 9.0),
        ];
        let m = d.detect(&features(&bars)).unwrap();
        assert_eq!(m.direction, Direction::Down);
        assert!(BullishEngulfingDetector.detect(&features(&bars)).is_none());
    }
}
