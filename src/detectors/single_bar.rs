//! Single-bar candlestick pattern detectors
//!
//! Patterns: Doji, Hammer, Shooting Star. Each reads only the last bar and
//! compares it against its own range, so no lookback average is needed.

use std::collections::HashMap;

use super::helpers::{self, is_doji, is_pin};
use crate::{
    params::{get_factor, get_ratio, ParamMeta, ParameterizedDetector},
    Direction, Factor, Features, PatternDetector, PatternId, PatternMatch, Ratio, Result,
};

impl_with_defaults!(DojiDetector, HammerDetector, ShootingStarDetector);

// ============================================================
// DOJI
// ============================================================

const DOJI_PARAMS: &[ParamMeta] = &[ParamMeta::ratio(
    "max_body_ratio",
    helpers::DOJI_BODY_RATIO,
    (0.01, 0.5),
    "Largest |body| / range still read as a doji",
)];

/// Doji - open and close nearly equal relative to the bar's range
#[derive(Debug, Clone, Copy)]
pub struct DojiDetector {
    pub max_body_ratio: Ratio,
}

impl Default for DojiDetector {
    fn default() -> Self {
        Self {
            max_body_ratio: Ratio::new_const(helpers::DOJI_BODY_RATIO),
        }
    }
}

impl PatternDetector for DojiDetector {
    fn id(&self) -> PatternId {
        PatternId::DOJI
    }

    fn min_bars(&self) -> usize {
        1
    }

    fn detect(&self, features: &Features) -> Option<PatternMatch> {
        let last = features.last;
        if !is_doji(last.body, last.range, self.max_body_ratio.get()) {
            return None;
        }

        Some(PatternMatch::trailing(
            PatternDetector::id(self),
            Direction::Neutral,
            features,
            1,
        ))
    }

    fn validate_config(&self) -> Result<()> {
        DOJI_PARAMS[0].validate(self.max_body_ratio.get())
    }
}

impl ParameterizedDetector for DojiDetector {
    fn param_meta() -> &'static [ParamMeta] {
        DOJI_PARAMS
    }

    fn with_params(params: &HashMap<&str, f64>) -> Result<Self> {
        Ok(Self {
            max_body_ratio: get_ratio(params, &DOJI_PARAMS[0])?,
        })
    }

    fn pattern_id_str() -> &'static str {
        PatternId::DOJI.0
    }
}

// ============================================================
// HAMMER / SHOOTING STAR
// ============================================================

const PIN_PARAMS: &[ParamMeta] = &[ParamMeta::factor(
    "shadow_factor",
    helpers::SHADOW_FACTOR,
    (1.0, 10.0),
    "Minimum long-shadow length in multiples of |body|",
)];

fn validate_shadow_factor(factor: Factor) -> Result<()> {
    PIN_PARAMS[0].validate(factor.get())
}

/// Hammer - rising bar with a long lower shadow and a short upper one
#[derive(Debug, Clone, Copy)]
pub struct HammerDetector {
    pub shadow_factor: Factor,
}

impl Default for HammerDetector {
    fn default() -> Self {
        Self {
            shadow_factor: Factor::new_const(helpers::SHADOW_FACTOR),
        }
    }
}

impl PatternDetector for HammerDetector {
    fn id(&self) -> PatternId {
        PatternId::HAMMER
    }

    fn min_bars(&self) -> usize {
        1
    }

    fn detect(&self, features: &Features) -> Option<PatternMatch> {
        let last = features.last;
        if last.body <= 0.0 {
            return None;
        }
        if !is_pin(
            last.body,
            last.lower_shadow,
            last.upper_shadow,
            self.shadow_factor.get(),
        ) {
            return None;
        }

        Some(PatternMatch::trailing(
            PatternDetector::id(self),
            Direction::Up,
            features,
            1,
        ))
    }

    fn validate_config(&self) -> Result<()> {
        validate_shadow_factor(self.shadow_factor)
    }
}

impl ParameterizedDetector for HammerDetector {
    fn param_meta() -> &'static [ParamMeta] {
        PIN_PARAMS
    }

    fn with_params(params: &HashMap<&str, f64>) -> Result<Self> {
        Ok(Self {
            shadow_factor: get_factor(params, &PIN_PARAMS[0])?,
        })
    }

    fn pattern_id_str() -> &'static str {
        PatternId::HAMMER.0
    }
}

/// Shooting Star - falling bar with a long upper shadow and a short lower one
#[derive(Debug, Clone, Copy)]
pub struct ShootingStarDetector {
    pub shadow_factor: Factor,
}

impl Default for ShootingStarDetector {
    fn default() -> Self {
        Self {
            shadow_factor: Factor::new_const(helpers::SHADOW_FACTOR),
        }
    }
}

impl PatternDetector for ShootingStarDetector {
    fn id(&self) -> PatternId {
        PatternId::SHOOTING_STAR
    }

    fn min_bars(&self) -> usize {
        1
    }

    fn detect(&self, features: &Features) -> Option<PatternMatch> {
        let last = features.last;
        if last.body >= 0.0 {
            return None;
        }
        if !is_pin(
            last.body,
            last.upper_shadow,
            last.lower_shadow,
            self.shadow_factor.get(),
        ) {
            return None;
        }

        Some(PatternMatch::trailing(
            PatternDetector::id(self),
            Direction::Down,
            features,
            1,
        ))
    }

    fn validate_config(&self) -> Result<()> {
        validate_shadow_factor(self.shadow_factor)
    }
}

impl ParameterizedDetector for ShootingStarDetector {
    fn param_meta() -> &'static [ParamMeta] {
        PIN_PARAMS
    }

    fn with_params(params: &HashMap<&str, f64>) -> Result<Self> {
        Ok(Self {
            shadow_factor: get_factor(params, &PIN_PARAMS[0])?,
        })
    }

    fn pattern_id_str() -> &'static str {
        PatternId::SHOOTING_STAR.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::series::Bar;

    fn features(bars: &[(f64, f64, f64, f64)]) -> Features {
        let bars: Vec<Bar> = bars
            .iter()
            .enumerate()
            .map(|(i, &(o, h, l, c))| Bar::new(i as i64, o, h, l, c))
            .collect();
        Features::from_bars(&bars).unwrap()
    }

    #[test]
    fn test_doji() {
        let d = DojiDetector::with_defaults();
        assert!(d.detect(&features(&[(10.0, 12.0, 8.0, 10.0)])).is_some());
        assert!(d.detect(&features(&[(10.0, 12.0, 8.0, 10.39)])).is_some());
        assert!(d.detect(&features(&[(10.0, 12.0, 8.0, 10.5)])).is_none());
    }

    #[test]
    fn test_hammer() {
        let d = HammerDetector::with_defaults();
        // body 1, lower 3, upper 0.5
        let m = d.detect(&features(&[(10.0, 11.5, 7.0, 11.0)])).unwrap();
        assert_eq!(m.direction, Direction::Up);
        // falling bar with the same shape is not a hammer
        assert!(d.detect(&features(&[(11.0, 11.5, 7.0, 10.0)])).is_none());
        // upper shadow as long as the body
        assert!(d.detect(&features(&[(10.0, 12.0, 7.0, 11.0)])).is_none());
    }

    #[test]
    fn test_shooting_star() {
        let d = ShootingStarDetector::with_defaults();
        // body -1, upper 3, lower 0.5
        let m = d.detect(&features(&[(11.0, 14.0, 9.5, 10.0)])).unwrap();
        assert_eq!(m.direction, Direction::Down);
        assert!(d.detect(&features(&[(10.0, 14.0, 9.5, 11.0)])).is_none());
    }

    #[test]
    fn test_with_params() {
        let params = HashMap::from([("shadow_factor", 4.0)]);
        let d = HammerDetector::with_params(&params).unwrap();
        assert_eq!(d.shadow_factor.get(), 4.0);
        // lower shadow 3 < 4 bodies
        assert!(d.detect(&features(&[(10.0, 11.5, 7.0, 11.0)])).is_none());

        assert!(DojiDetector::with_params(&HashMap::from([("max_body_ratio", 0.9)])).is_err());
    }

    #[test]
    fn test_validate_config() {
        let bad = HammerDetector {
            shadow_factor: Factor::new(50.0).unwrap(),
        };
        assert!(bad.validate_config().is_err());
        assert!(HammerDetector::default().validate_config().is_ok());
    }
}
