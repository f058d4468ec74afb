//! Engine configuration
//!
//! Everything has a canonical default, so an empty file is a valid config.
//!
//! ```toml
//! top_n = 5
//! confidence_scale = 80.0
//! forecast_steps = 5
//!
//! [patterns.DOJI]
//! max_body_ratio = 0.05
//!
//! [patterns.HAMMER]
//! shadow_factor = 2.5
//! ```

use std::{collections::HashMap, fs, path::Path};

use serde::{Deserialize, Serialize};

use crate::{
    detectors::helpers::CONFIDENCE_SCALE, forecast::FORECAST_STEPS, BuiltinDetector, Factor,
    PatternError, Result, TopN,
};

/// Ranked list length when nothing is configured
pub const DEFAULT_TOP_N: TopN = TopN::new_const(10);

/// Reporting length, score scale and per-pattern parameter overrides
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct EngineConfig {
    /// Entries per ranked list
    pub top_n: TopN,
    /// Multiplier applied to `|body| / range`
    pub confidence_scale: Factor,
    /// Closes projected past the last bar; 0 disables the forecast
    pub forecast_steps: usize,
    /// Pattern code -> parameter name -> value
    pub patterns: HashMap<String, HashMap<String, f64>>,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            top_n: DEFAULT_TOP_N,
            confidence_scale: Factor::new_const(CONFIDENCE_SCALE),
            forecast_steps: FORECAST_STEPS,
            patterns: HashMap::new(),
        }
    }
}

impl EngineConfig {
    /// Parse and validate a TOML document
    pub fn from_toml_str(s: &str) -> Result<Self> {
        let config: Self =
            toml::from_str(s).map_err(|e| PatternError::InvalidConfig(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Read and parse a TOML file
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let text = fs::read_to_string(path).map_err(|e| {
            PatternError::InvalidConfig(format!("cannot read {}: {e}", path.display()))
        })?;
        Self::from_toml_str(&text)
    }

    /// Every override must name a builtin pattern and one of its parameters, in range
    pub fn validate(&self) -> Result<()> {
        for (id, values) in &self.patterns {
            let values: HashMap<&str, f64> =
                values.iter().map(|(k, v)| (k.as_str(), *v)).collect();
            BuiltinDetector::from_params(id, &values)?;
        }
        Ok(())
    }
}
