//! Three-bar candlestick pattern detectors
//!
//! Patterns: Morning Star, Evening Star, Three White Soldiers, Three Black Crows.
//! These run as confirmation rules: every match is appended to the label set
//! and the last one decides the direction.

#![allow(clippy::default_constructed_unit_structs)]

use std::collections::HashMap;

use crate::{
  params::{get_ratio, ParamMeta, ParameterizedDetector},
  Direction, Features, PatternDetector, PatternId, PatternMatch, Ratio, Result,
};

use super::helpers::{self, is_star};

impl_with_defaults!(
  MorningStarDetector,
  EveningStarDetector,
  ThreeWhiteSoldiersDetector,
  ThreeBlackCrowsDetector,
);

// ============================================================
// MORNING STAR / EVENING STAR
// ============================================================

const STAR_PARAMS: &[ParamMeta] = &[ParamMeta::ratio(
  "star_body_ratio",
  helpers::STAR_BODY_RATIO,
  (0.05, 0.9),
  "Largest middle body, as a share of the first body",
)];

/// Morning Star - falling bar, small star, rising bar closing above the first open
#[derive(Debug, Clone, Copy)]
pub struct MorningStarDetector {
  pub star_body_ratio: Ratio,
}

impl Default for MorningStarDetector {
  fn default() -> Self {
    Self { star_body_ratio: Ratio::new_const(helpers::STAR_BODY_RATIO) }
  }
}

impl PatternDetector for MorningStarDetector {
  fn id(&self) -> PatternId {
    PatternId::MORNING_STAR
  }

  fn min_bars(&self) -> usize {
    3
  }

  fn detect(&self, features: &Features) -> Option<PatternMatch> {
    let (first, star, last) = features.triple()?;

    if first.body >= 0.0 || last.body <= 0.0 {
      return None;
    }
    if !is_star(first.body, star.body, self.star_body_ratio.get()) {
      return None;
    }
    if last.close <= first.open {
      return None;
    }

    Some(PatternMatch::trailing(PatternDetector::id(self), Direction::Up, features, 3))
  }

  fn validate_config(&self) -> Result<()> {
    STAR_PARAMS[0].validate(self.star_body_ratio.get())
  }
}

impl ParameterizedDetector for MorningStarDetector {
  fn param_meta() -> &'static [ParamMeta] {
    STAR_PARAMS
  }

  fn with_params(params: &HashMap<&str, f64>) -> Result<Self> {
    Ok(Self { star_body_ratio: get_ratio(params, &STAR_PARAMS[0])? })
  }

  fn pattern_id_str() -> &'static str {
    PatternId::MORNING_STAR.0
  }
}

/// Evening Star - mirror of Morning Star
#[derive(Debug, Clone, Copy)]
pub struct EveningStarDetector {
  pub star_body_ratio: Ratio,
}

impl Default for EveningStarDetector {
  fn default() -> Self {
    Self { star_body_ratio: Ratio::new_const(helpers::STAR_BODY_RATIO) }
  }
}

impl PatternDetector for EveningStarDetector {
  fn id(&self) -> PatternId {
    PatternId::EVENING_STAR
  }

  fn min_bars(&self) -> usize {
    3
  }

  fn detect(&self, features: &Features) -> Option<PatternMatch> {
    let (first, star, last) = features.triple()?;

    if first.body <= 0.0 || last.body >= 0.0 {
      return None;
    }
    if !is_star(first.body, star.body, self.star_body_ratio.get()) {
      return None;
    }
    if last.close >= first.open {
      return None;
    }

    Some(PatternMatch::trailing(PatternDetector::id(self), Direction::Down, features, 3))
  }

  fn validate_config(&self) -> Result<()> {
    STAR_PARAMS[0].validate(self.star_body_ratio.get())
  }
}

impl ParameterizedDetector for EveningStarDetector {
  fn param_meta() -> &'static [ParamMeta] {
    STAR_PARAMS
  }

  fn with_params(params: &HashMap<&str, f64>) -> Result<Self> {
    Ok(Self { star_body_ratio: get_ratio(params, &STAR_PARAMS[0])? })
  }

  fn pattern_id_str() -> &'static str {
    PatternId::EVENING_STAR.0
  }
}

// ============================================================
// THREE WHITE SOLDIERS / THREE BLACK CROWS
// ============================================================

/// Three White Soldiers - three consecutive rising bars
#[derive(Debug, Clone, Copy, Default)]
pub struct ThreeWhiteSoldiersDetector;

impl PatternDetector for ThreeWhiteSoldiersDetector {
  fn id(&self) -> PatternId {
    PatternId::THREE_WHITE_SOLDIERS
  }

  fn min_bars(&self) -> usize {
    3
  }

  fn detect(&self, features: &Features) -> Option<PatternMatch> {
    let (first, second, third) = features.triple()?;

    if first.body > 0.0 && second.body > 0.0 && third.body > 0.0 {
      return Some(PatternMatch::trailing(PatternDetector::id(self), Direction::Up, features, 3));
    }
    None
  }
}

impl ParameterizedDetector for ThreeWhiteSoldiersDetector {
  fn param_meta() -> &'static [ParamMeta] {
    &[]
  }

  fn with_params(_params: &HashMap<&str, f64>) -> Result<Self> {
    Ok(Self)
  }

  fn pattern_id_str() -> &'static str {
    PatternId::THREE_WHITE_SOLDIERS.0
  }
}

/// Three Black Crows - three consecutive falling bars
#[derive(Debug, Clone, Copy, Default)]
pub struct ThreeBlackCrowsDetector;

impl PatternDetector for ThreeBlackCrowsDetector {
  fn id(&self) -> PatternId {
    PatternId::THREE_BLACK_CROWS
  }

  fn min_bars(&self) -> usize {
    3
  }

  fn detect(&self, features: &Features) -> Option<PatternMatch> {
    let (first, second, third) = features.triple()?;

    if first.body < 0.0 && second.body < 0.0 && third.body < 0.0 {
      return Some(PatternMatch::trailing(PatternDetector::id(self), Direction::Down, features, 3));
    }
    None
  }
}

impl ParameterizedDetector for ThreeBlackCrowsDetector {
  fn param_meta() -> &'static [ParamMeta] {
    &[]
  }

  fn with_params(_params: &HashMap<&str, f64>) -> Result<Self> {
    Ok(Self)
  }

  fn pattern_id_str() -> &'static str {
    PatternId::THREE_BLACK_CROWS.0
  }
}
