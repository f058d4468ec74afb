//! Parameter metadata for pattern detectors
//!
//! Every builtin detector publishes the thresholds it reads. The metadata
//! drives config validation and lets callers discover what can be overridden.
//!
//! # Example
//!
//! ```rust
//! use candlerank::params::{ParamMeta, ParamType, ParameterizedDetector};
//! use candlerank::prelude::*;
//!
//! for param in HammerDetector::param_meta() {
//!     println!("{}: {:?} (default: {})", param.name, param.param_type, param.default);
//! }
//! ```

use std::collections::HashMap;

use crate::{Factor, PatternError, Ratio, Result};

// ============================================================
// PARAMETER TYPES
// ============================================================

/// Type of parameter value
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParamType {
  /// Ratio value in 0.0..=1.0
  Ratio,
  /// Positive multiplier
  Factor,
}

/// Metadata for a single detector parameter
#[derive(Debug, Clone)]
pub struct ParamMeta {
  /// Parameter name (e.g., "max_body_ratio")
  pub name: &'static str,
  pub param_type: ParamType,
  pub default: f64,
  /// Accepted interval: (min, max)
  pub range: (f64, f64),
  pub description: &'static str,
}

impl ParamMeta {
  pub const fn ratio(
    name: &'static str,
    default: f64,
    range: (f64, f64),
    description: &'static str,
  ) -> Self {
    Self { name, param_type: ParamType::Ratio, default, range, description }
  }

  pub const fn factor(
    name: &'static str,
    default: f64,
    range: (f64, f64),
    description: &'static str,
  ) -> Self {
    Self { name, param_type: ParamType::Factor, default, range, description }
  }

  /// Validate a value for this parameter
  pub fn validate(&self, value: f64) -> Result<()> {
    if !value.is_finite() {
      return Err(PatternError::InvalidValue("parameter must be finite"));
    }
    let (min, max) = self.range;
    if value < min || value > max {
      return Err(PatternError::OutOfRange { field: self.name, value, min, max });
    }
    Ok(())
  }

  fn value(&self, params: &HashMap<&str, f64>) -> Result<f64> {
    let value = params.get(self.name).copied().unwrap_or(self.default);
    self.validate(value)?;
    Ok(value)
  }
}

// ============================================================
// PARAMETERIZED DETECTOR TRAIT
// ============================================================

/// Trait for detectors that can be built from named parameter values
pub trait ParameterizedDetector: Sized {
  /// Returns metadata for all configurable parameters
  fn param_meta() -> &'static [ParamMeta];

  /// Creates a detector with parameters from a HashMap
  ///
  /// Missing parameters use their default values.
  fn with_params(params: &HashMap<&str, f64>) -> Result<Self>;

  /// Returns the pattern ID string
  fn pattern_id_str() -> &'static str;
}

// ============================================================
// PARAMETER VALUE HELPERS
// ============================================================

/// Read a Ratio parameter, falling back to its default
pub fn get_ratio(params: &HashMap<&str, f64>, meta: &ParamMeta) -> Result<Ratio> {
  Ratio::new(meta.value(params)?)
}

/// Read a Factor parameter, falling back to its default
pub fn get_factor(params: &HashMap<&str, f64>, meta: &ParamMeta) -> Result<Factor> {
  Factor::new(meta.value(params)?)
}

/// Reject parameter names the detector does not declare
pub fn check_known(pattern: &str, meta: &[ParamMeta], params: &HashMap<&str, f64>) -> Result<()> {
  match params.keys().find(|key| !meta.iter().any(|m| m.name == **key)) {
    Some(key) => Err(PatternError::InvalidConfig(format!(
      "pattern '{pattern}' has no parameter '{key}'"
    ))),
    None => Ok(()),
  }
}

// ============================================================
// TESTS
// ============================================================

#[cfg(test)]
mod tests {
  use super::*;

  const RATIO: ParamMeta = ParamMeta::ratio("test_ratio", 0.3, (0.1, 0.5), "Test ratio");
  const FACTOR: ParamMeta = ParamMeta::factor("test_factor", 2.0, (1.0, 5.0), "Test factor");

  #[test]
  fn test_param_meta_constructors() {
    assert_eq!(RATIO.name, "test_ratio");
    assert_eq!(RATIO.param_type, ParamType::Ratio);
    assert_eq!(FACTOR.param_type, ParamType::Factor);
    assert_eq!(FACTOR.default, 2.0);
  }

  #[test]
  fn test_validate_range() {
    assert!(RATIO.validate(0.1).is_ok());
    assert!(RATIO.validate(0.5).is_ok());
    assert!(RATIO.validate(0.05).is_err());
    assert!(RATIO.validate(0.6).is_err());
    assert!(RATIO.validate(f64::NAN).is_err());
  }

  #[test]
  fn test_get_ratio_helper() {
    let mut params = HashMap::new();
    params.insert("test_ratio", 0.4);

    assert!((get_ratio(&params, &RATIO).unwrap().get() - 0.4).abs() < f64::EPSILON);
    assert!((get_ratio(&HashMap::new(), &RATIO).unwrap().get() - 0.3).abs() < f64::EPSILON);
  }

  #[test]
  fn test_get_factor_helper() {
    let params = HashMap::from([("test_factor", 3.0)]);
    assert_eq!(get_factor(&params, &FACTOR).unwrap().get(), 3.0);

    let out_of_range = HashMap::from([("test_factor", 9.0)]);
    assert!(matches!(
      get_factor(&out_of_range, &FACTOR),
      Err(PatternError::OutOfRange { field: "test_factor", .. })
    ));
  }

  #[test]
  fn test_check_known() {
    let meta = [RATIO];
    assert!(check_known("X", &meta, &HashMap::from([("test_ratio", 0.2)])).is_ok());
    assert!(check_known("X", &meta, &HashMap::new()).is_ok());
    assert!(check_known("X", &meta, &HashMap::from([("other", 0.2)])).is_err());
    assert!(check_known("X", &[], &HashMap::from([("other", 0.2)])).is_err());
  }
}
