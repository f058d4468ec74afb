//! # candlerank - candlestick classification and ranking
//!
//! Labels the most recent bars of each instrument with a candlestick pattern,
//! infers a directional bias, attaches a bounded confidence and picks the
//! strongest bullish and bearish instruments of a batch.
//!
//! ## Quick Start
//!
//! ```rust
//! use candlerank::prelude::*;
//!
//! let engine = PatternEngine::with_defaults();
//!
//! // prev is bearish, last is bullish and closes above prev's open
//! let bars = vec![
//!     Bar::new(1, 10.0, 12.0, 9.0, 9.5),
//!     Bar::new(2, 9.5, 10.0, 8.0, 11.0),
//! ];
//! let instruments = vec![("ACME".to_string(), bars)];
//!
//! let report = engine.run(instruments, TopN::new(5).unwrap());
//! let best = &report.ranking.top_up[0];
//! assert_eq!(best.symbol, "ACME");
//! assert_eq!(best.labels[0], PatternId::BULLISH_ENGULFING);
//! assert_eq!(best.confidence.get(), 40.0);
//! ```

use std::fmt;

pub mod config;
pub mod detectors;
pub mod engine;
pub mod forecast;
pub mod names;
pub mod params;
pub mod ranking;
pub mod scoring;
pub mod series;

pub mod prelude {
    pub use crate::{
        // Config
        config::EngineConfig,
        // Detectors
        detectors::*,
        // Engine
        engine::{scan_parallel, BatchScan, PatternEngine, Report, ScoredInstrument, Skipped},
        // Forecast
        forecast::{forecast, Forecast, ForecastPoint},
        // Names
        names::AssetNames,
        // Parameters
        params::{get_factor, get_ratio, ParamMeta, ParamType, ParameterizedDetector},
        // Ranking
        ranking::{rank, Ranking, RankingEntry},
        // Scoring
        scoring::Scorer,
        // Series
        series::{Bar, Series},
        // Classifier
        BuiltinDetector,
        Candle,
        ClassificationResult,
        Classifier,
        ClassifierBuilder,
        // Types
        Confidence,
        Direction,
        Factor,
        Features,
        OHLCVExt,
        // Core traits
        PatternDetector,
        // Errors
        PatternError,
        PatternId,
        PatternMatch,
        Ratio,
        Result,
        TopN,
        OHLCV,
    };
}

// ============================================================
// ERRORS
// ============================================================

pub type Result<T> = std::result::Result<T, PatternError>;

/// Errors raised while building inputs or configuration.
///
/// Classification, scoring and ranking never fail; only series construction
/// and engine configuration return this type.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum PatternError {
    #[error("Invalid value: {0}")]
    InvalidValue(&'static str),

    #[error("{field} = {value} out of range [{min}, {max}]")]
    OutOfRange {
        field: &'static str,
        value: f64,
        min: f64,
        max: f64,
    },

    #[error("Invalid config: {0}")]
    InvalidConfig(String),

    #[error("Malformed bar at index {index}: {reason}")]
    MalformedBar { index: usize, reason: &'static str },
}

// ============================================================
// VALIDATED TYPES
// ============================================================

/// Normalized value in range 0.0..=1.0
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd)]
pub struct Ratio(f64);

impl Ratio {
    /// Create a new Ratio, validating the value is in [0.0, 1.0]
    pub fn new(value: f64) -> Result<Self> {
        if value.is_nan() || value.is_infinite() {
            return Err(PatternError::InvalidValue(
                "Ratio cannot be NaN or infinite",
            ));
        }
        if !(0.0..=1.0).contains(&value) {
            return Err(PatternError::OutOfRange {
                field: "Ratio",
                value,
                min: 0.0,
                max: 1.0,
            });
        }
        Ok(Self(value))
    }

    #[doc(hidden)]
    pub const fn new_const(value: f64) -> Self {
        Self(value)
    }

    #[inline]
    pub fn get(self) -> f64 {
        self.0
    }
}

impl serde::Serialize for Ratio {
    fn serialize<S: serde::Serializer>(&self, s: S) -> std::result::Result<S::Ok, S::Error> {
        self.0.serialize(s)
    }
}

impl<'de> serde::Deserialize<'de> for Ratio {
    fn deserialize<D: serde::Deserializer<'de>>(d: D) -> std::result::Result<Self, D::Error> {
        let value = f64::deserialize(d)?;
        Ratio::new(value).map_err(serde::de::Error::custom)
    }
}

/// Strictly positive, finite multiplier (shadow factors, confidence scale)
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd)]
pub struct Factor(f64);

impl Factor {
    pub fn new(value: f64) -> Result<Self> {
        if !value.is_finite() {
            return Err(PatternError::InvalidValue("Factor must be finite"));
        }
        if value <= 0.0 {
            return Err(PatternError::InvalidValue("Factor must be > 0"));
        }
        Ok(Self(value))
    }

    #[doc(hidden)]
    pub const fn new_const(value: f64) -> Self {
        Self(value)
    }

    #[inline]
    pub fn get(self) -> f64 {
        self.0
    }
}

impl serde::Serialize for Factor {
    fn serialize<S: serde::Serializer>(&self, s: S) -> std::result::Result<S::Ok, S::Error> {
        self.0.serialize(s)
    }
}

impl<'de> serde::Deserialize<'de> for Factor {
    fn deserialize<D: serde::Deserializer<'de>>(d: D) -> std::result::Result<Self, D::Error> {
        let value = f64::deserialize(d)?;
        Factor::new(value).map_err(serde::de::Error::custom)
    }
}

/// Length of each ranked list (must be > 0)
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct TopN(usize);

impl TopN {
    pub fn new(value: usize) -> Result<Self> {
        if value == 0 {
            return Err(PatternError::InvalidValue("TopN must be > 0"));
        }
        Ok(Self(value))
    }

    #[doc(hidden)]
    pub const fn new_const(value: usize) -> Self {
        Self(value)
    }

    #[inline]
    pub fn get(self) -> usize {
        self.0
    }
}

impl serde::Serialize for TopN {
    fn serialize<S: serde::Serializer>(&self, s: S) -> std::result::Result<S::Ok, S::Error> {
        self.0.serialize(s)
    }
}

impl<'de> serde::Deserialize<'de> for TopN {
    fn deserialize<D: serde::Deserializer<'de>>(d: D) -> std::result::Result<Self, D::Error> {
        let value = usize::deserialize(d)?;
        TopN::new(value).map_err(serde::de::Error::custom)
    }
}

/// Heuristic intensity in 0.0..=100.0. Not a probability.
#[derive(Debug, Clone, Copy, Default, PartialEq, PartialOrd)]
pub struct Confidence(f64);

impl Confidence {
    pub const ZERO: Self = Self(0.0);
    pub const MAX: f64 = 100.0;

    pub fn new(value: f64) -> Result<Self> {
        if value.is_nan() || value.is_infinite() {
            return Err(PatternError::InvalidValue(
                "Confidence cannot be NaN or infinite",
            ));
        }
        if !(0.0..=Self::MAX).contains(&value) {
            return Err(PatternError::OutOfRange {
                field: "Confidence",
                value,
                min: 0.0,
                max: Self::MAX,
            });
        }
        Ok(Self(value))
    }

    /// Clamp into [0, 100]. NaN maps to zero.
    pub fn saturating(value: f64) -> Self {
        if value.is_nan() {
            return Self::ZERO;
        }
        Self(value.clamp(0.0, Self::MAX))
    }

    #[inline]
    pub fn get(self) -> f64 {
        self.0
    }
}

impl serde::Serialize for Confidence {
    fn serialize<S: serde::Serializer>(&self, s: S) -> std::result::Result<S::Ok, S::Error> {
        self.0.serialize(s)
    }
}

impl<'de> serde::Deserialize<'de> for Confidence {
    fn deserialize<D: serde::Deserializer<'de>>(d: D) -> std::result::Result<Self, D::Error> {
        let value = f64::deserialize(d)?;
        Confidence::new(value).map_err(serde::de::Error::custom)
    }
}

impl fmt::Display for Confidence {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.2}", self.0)
    }
}

// ============================================================
// OHLCV TRAITS
// ============================================================

/// Core OHLCV data trait
pub trait OHLCV {
    fn open(&self) -> f64;
    fn high(&self) -> f64;
    fn low(&self) -> f64;
    fn close(&self) -> f64;

    fn timestamp(&self) -> Option<i64> {
        None
    }
}

/// Extension trait with computed properties for OHLCV data
pub trait OHLCVExt: OHLCV {
    /// Signed body: positive for a rising bar, negative for a falling one
    #[inline]
    fn body(&self) -> f64 {
        self.close() - self.open()
    }

    #[inline]
    fn range(&self) -> f64 {
        self.high() - self.low()
    }

    #[inline]
    fn upper_shadow(&self) -> f64 {
        self.high() - self.open().max(self.close())
    }

    #[inline]
    fn lower_shadow(&self) -> f64 {
        self.open().min(self.close()) - self.low()
    }

    /// Validate a single bar: finite values and `low <= min(o,c) <= max(o,c) <= high`.
    ///
    /// The reported index is always 0; series validation rewrites it.
    fn validate(&self) -> Result<()> {
        let values = [self.open(), self.high(), self.low(), self.close()];
        if values.iter().any(|v| v.is_nan()) {
            return Err(PatternError::MalformedBar {
                index: 0,
                reason: "NaN in OHLC",
            });
        }
        if values.iter().any(|v| v.is_infinite()) {
            return Err(PatternError::MalformedBar {
                index: 0,
                reason: "Infinite value in OHLC",
            });
        }
        if self.high() < self.low() {
            return Err(PatternError::MalformedBar {
                index: 0,
                reason: "high < low",
            });
        }
        if self.open().min(self.close()) < self.low() {
            return Err(PatternError::MalformedBar {
                index: 0,
                reason: "body below low",
            });
        }
        if self.open().max(self.close()) > self.high() {
            return Err(PatternError::MalformedBar {
                index: 0,
                reason: "body above high",
            });
        }
        Ok(())
    }
}

impl<T: OHLCV> OHLCVExt for T {}

// ============================================================
// PATTERN IDS AND MATCHES
// ============================================================

/// Unique identifier for a pattern type
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct PatternId(pub &'static str);

impl PatternId {
    pub const BULLISH_ENGULFING: Self = Self("BULLISH_ENGULFING");
    pub const BEARISH_ENGULFING: Self = Self("BEARISH_ENGULFING");
    pub const DOJI: Self = Self("DOJI");
    pub const HAMMER: Self = Self("HAMMER");
    pub const SHOOTING_STAR: Self = Self("SHOOTING_STAR");
    pub const MORNING_STAR: Self = Self("MORNING_STAR");
    pub const EVENING_STAR: Self = Self("EVENING_STAR");
    pub const THREE_WHITE_SOLDIERS: Self = Self("THREE_WHITE_SOLDIERS");
    pub const THREE_BLACK_CROWS: Self = Self("THREE_BLACK_CROWS");

    /// Returns the string identifier
    #[inline]
    pub fn as_str(&self) -> &'static str {
        self.0
    }

    /// Human readable label used in reports. Unknown ids are returned as-is.
    pub fn label(&self) -> &'static str {
        match self.0 {
            "BULLISH_ENGULFING" => "Bullish Engulfing",
            "BEARISH_ENGULFING" => "Bearish Engulfing",
            "DOJI" => "Doji",
            "HAMMER" => "Hammer",
            "SHOOTING_STAR" => "Shooting Star",
            "MORNING_STAR" => "Morning Star",
            "EVENING_STAR" => "Evening Star",
            "THREE_WHITE_SOLDIERS" => "Three White Soldiers",
            "THREE_BLACK_CROWS" => "Three Black Crows",
            other => other,
        }
    }

    /// Direction the builtin rule for this pattern assigns.
    ///
    /// `None` for ids the crate does not know (custom detectors).
    pub fn typical_direction(&self) -> Option<Direction> {
        match self.0 {
            "BULLISH_ENGULFING" | "HAMMER" | "MORNING_STAR" | "THREE_WHITE_SOLDIERS" => {
                Some(Direction::Up)
            }
            "BEARISH_ENGULFING" | "SHOOTING_STAR" | "EVENING_STAR" | "THREE_BLACK_CROWS" => {
                Some(Direction::Down)
            }
            "DOJI" => Some(Direction::Neutral),
            _ => None,
        }
    }
}

impl fmt::Display for PatternId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl serde::Serialize for PatternId {
    fn serialize<S: serde::Serializer>(&self, s: S) -> std::result::Result<S::Ok, S::Error> {
        s.serialize_str(self.label())
    }
}

/// Directional bias of an instrument
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    Up,
    Down,
    Neutral,
}

impl Direction {
    /// Close-vs-open fallback: sign of the body
    #[inline]
    pub fn from_body(body: f64) -> Self {
        if body > 0.0 {
            Direction::Up
        } else if body < 0.0 {
            Direction::Down
        } else {
            Direction::Neutral
        }
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Direction::Up => "up",
            Direction::Down => "down",
            Direction::Neutral => "neutral",
        })
    }
}

/// Result of a single rule firing - Copy, no allocations
#[derive(Debug, Clone, Copy, PartialEq, serde::Serialize)]
pub struct PatternMatch {
    pub pattern_id: PatternId,
    pub direction: Direction,
    /// Index of the first bar of the pattern in the series
    pub start_index: usize,
    /// Index of the last bar of the pattern in the series
    pub end_index: usize,
}

impl PatternMatch {
    /// Match covering the trailing `span` bars of the window described by `features`.
    pub fn trailing(
        pattern_id: PatternId,
        direction: Direction,
        features: &Features,
        span: usize,
    ) -> Self {
        let end_index = features.len.saturating_sub(1);
        Self {
            pattern_id,
            direction,
            start_index: end_index + 1 - span.clamp(1, end_index + 1),
            end_index,
        }
    }

    #[inline]
    pub fn span(&self) -> usize {
        self.end_index - self.start_index + 1
    }
}

// ============================================================
// DERIVED FEATURES
// ============================================================

/// Shape of one bar, computed once and shared by the classifier and scorer
#[derive(Debug, Clone, Copy, PartialEq, serde::Serialize)]
pub struct Candle {
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    /// Signed `close - open`
    pub body: f64,
    /// Raw `high - low`, may be zero
    pub range: f64,
    pub upper_shadow: f64,
    pub lower_shadow: f64,
}

impl Candle {
    pub fn from_bar<T: OHLCV>(bar: &T) -> Self {
        Self {
            open: bar.open(),
            high: bar.high(),
            low: bar.low(),
            close: bar.close(),
            body: bar.body(),
            range: bar.range(),
            upper_shadow: bar.upper_shadow(),
            lower_shadow: bar.lower_shadow(),
        }
    }

    /// `high == low`
    #[inline]
    pub fn is_degenerate(&self) -> bool {
        self.range <= 0.0
    }

    #[inline]
    pub fn direction(&self) -> Direction {
        Direction::from_body(self.body)
    }

    fn is_finite(&self) -> bool {
        [
            self.body,
            self.range,
            self.upper_shadow,
            self.lower_shadow,
        ]
        .iter()
        .all(|v| v.is_finite())
    }
}

/// Shapes of the last three bars of a window plus window-level figures
#[derive(Debug, Clone, Copy, PartialEq, serde::Serialize)]
pub struct Features {
    pub last: Candle,
    pub prev: Option<Candle>,
    pub prev2: Option<Candle>,
    /// Number of bars in the window
    pub len: usize,
    /// `(close(last) - close(first)) / close(first)`, zero when the first close is ~0
    pub net_change: f64,
}

impl Features {
    /// Returns None for an empty window
    pub fn from_bars<T: OHLCV>(bars: &[T]) -> Option<Self> {
        let (last, rest) = bars.split_last()?;
        let prev = rest.last().map(|b| Candle::from_bar(b));
        let prev2 = rest
            .len()
            .checked_sub(2)
            .map(|i| Candle::from_bar(&rest[i]));

        let first_close = bars[0].close();
        let net_change = if first_close.abs() > f64::EPSILON {
            (last.close() - first_close) / first_close
        } else {
            0.0
        };

        Some(Self {
            last: Candle::from_bar(last),
            prev,
            prev2,
            len: bars.len(),
            net_change,
        })
    }

    /// `(prev, last)` when the window has two bars
    #[inline]
    pub fn pair(&self) -> Option<(Candle, Candle)> {
        Some((self.prev?, self.last))
    }

    /// `(prev2, prev, last)` when the window has three bars
    #[inline]
    pub fn triple(&self) -> Option<(Candle, Candle, Candle)> {
        Some((self.prev2?, self.prev?, self.last))
    }

    fn is_finite(&self) -> bool {
        self.last.is_finite()
            && self.prev.map_or(true, |c| c.is_finite())
            && self.prev2.map_or(true, |c| c.is_finite())
    }
}

// ============================================================
// PATTERN DETECTOR TRAIT
// ============================================================

/// A single classification rule: predicate, label and direction
///
/// Object safe, so callers can register their own rules next to the builtin ones.
pub trait PatternDetector: Send + Sync {
    fn id(&self) -> PatternId;
    fn min_bars(&self) -> usize;
    fn detect(&self, features: &Features) -> Option<PatternMatch>;

    fn validate_config(&self) -> Result<()> {
        Ok(())
    }
}

// ============================================================
// BUILTIN DETECTORS - generated via macro
// ============================================================

use std::collections::HashMap;

use detectors::*;
use params::ParameterizedDetector;

/// Macro to generate BuiltinDetector enum without boilerplate
macro_rules! define_builtin_detectors {
    (
        $(
            $variant:ident($detector:ty)
        ),* $(,)?
    ) => {
        /// All builtin detectors - fast path via enum dispatch
        #[derive(Debug, Clone)]
        pub enum BuiltinDetector {
            $($variant($detector)),*
        }

        impl BuiltinDetector {
            #[inline]
            pub fn detect(&self, features: &Features) -> Option<PatternMatch> {
                match self {
                    $(Self::$variant(d) => PatternDetector::detect(d, features)),*
                }
            }

            #[inline]
            pub fn id(&self) -> PatternId {
                match self {
                    $(Self::$variant(d) => PatternDetector::id(d)),*
                }
            }

            #[inline]
            pub fn min_bars(&self) -> usize {
                match self {
                    $(Self::$variant(d) => PatternDetector::min_bars(d)),*
                }
            }

            pub fn validate_config(&self) -> Result<()> {
                match self {
                    $(Self::$variant(d) => PatternDetector::validate_config(d)),*
                }
            }

            /// Build the builtin detector registered under `id` from parameter overrides.
            ///
            /// Unknown ids and unknown parameter names are rejected.
            pub fn from_params(id: &str, overrides: &HashMap<&str, f64>) -> Result<Self> {
                $(
                    if id == <$detector as ParameterizedDetector>::pattern_id_str() {
                        params::check_known(
                            id,
                            <$detector as ParameterizedDetector>::param_meta(),
                            overrides,
                        )?;
                        return Ok(Self::$variant(
                            <$detector as ParameterizedDetector>::with_params(overrides)?,
                        ));
                    }
                )*
                Err(PatternError::InvalidConfig(format!("unknown pattern '{id}'")))
            }
        }
    };
}

define_builtin_detectors! {
    // Two bar
    BullishEngulfing(BullishEngulfingDetector),
    BearishEngulfing(BearishEngulfingDetector),

    // Single bar
    Doji(DojiDetector),
    Hammer(HammerDetector),
    ShootingStar(ShootingStarDetector),

    // Three bar
    MorningStar(MorningStarDetector),
    EveningStar(EveningStarDetector),
    ThreeWhiteSoldiers(ThreeWhiteSoldiersDetector),
    ThreeBlackCrows(ThreeBlackCrowsDetector),
}

/// Generate an array of `BuiltinDetector` variants using `Default::default()` for each inner type.
macro_rules! builtin_defaults {
  ($($variant:ident),* $(,)?) => {
    [$(BuiltinDetector::$variant(Default::default())),*]
  };
}

/// A rule slot: builtin (enum dispatch) or caller supplied (vtable)
enum Rule {
    Builtin(BuiltinDetector),
    Custom(Box<dyn PatternDetector>),
}

impl Rule {
    #[inline]
    fn id(&self) -> PatternId {
        match self {
            Rule::Builtin(d) => d.id(),
            Rule::Custom(d) => d.id(),
        }
    }

    #[inline]
    fn min_bars(&self) -> usize {
        match self {
            Rule::Builtin(d) => d.min_bars(),
            Rule::Custom(d) => d.min_bars(),
        }
    }

    #[inline]
    fn detect(&self, features: &Features) -> Option<PatternMatch> {
        if features.len < self.min_bars() {
            return None;
        }
        match self {
            Rule::Builtin(d) => d.detect(features),
            Rule::Custom(d) => d.detect(features),
        }
    }

    fn validate_config(&self) -> Result<()> {
        match self {
            Rule::Builtin(d) => d.validate_config(),
            Rule::Custom(d) => d.validate_config(),
        }
    }
}

impl fmt::Debug for Rule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Rule::Builtin(d) => write!(f, "Builtin({})", d.id().as_str()),
            Rule::Custom(d) => write!(f, "Custom({})", d.id().as_str()),
        }
    }
}

// ============================================================
// CLASSIFIER
// ============================================================

/// Per-instrument classification: labels in detection order, direction and
/// the features both the classifier and scorer read.
#[derive(Debug, Clone, PartialEq, serde::Serialize)]
pub struct ClassificationResult {
    pub symbol: String,
    pub labels: Vec<PatternId>,
    pub direction: Direction,
    /// None only for an empty series
    pub features: Option<Features>,
    /// Last confirmation rule that matched; its bars feed the multi-bar score
    pub anchor: Option<PatternMatch>,
}

impl ClassificationResult {
    fn unclassified(symbol: &str, features: Option<Features>) -> Self {
        Self {
            symbol: symbol.to_string(),
            labels: Vec::new(),
            direction: Direction::Neutral,
            features,
            anchor: None,
        }
    }

    /// Drop every signal: no labels, neutral direction, no anchor
    pub fn clear_signal(&mut self) {
        self.labels.clear();
        self.direction = Direction::Neutral;
        self.anchor = None;
    }
}

/// Ordered rule evaluation over the trailing bars of a series.
///
/// Primary rules are tried in order and the first match wins. Confirmation
/// rules are all evaluated; each match is appended and the last one sets the
/// direction.
#[derive(Debug)]
pub struct Classifier {
    primary: Vec<Rule>,
    confirmations: Vec<Rule>,
}

impl Default for Classifier {
    fn default() -> Self {
        Self::with_defaults()
    }
}

impl Classifier {
    /// Canonical rule set, no configuration required
    pub fn with_defaults() -> Self {
        let builder = ClassifierBuilder::new().with_all_defaults();
        Self {
            primary: builder.primary,
            confirmations: builder.confirmations,
        }
    }

    /// Ids of the primary rules, in precedence order
    pub fn primary_ids(&self) -> Vec<PatternId> {
        self.primary.iter().map(Rule::id).collect()
    }

    /// Ids of the confirmation rules, in evaluation order
    pub fn confirmation_ids(&self) -> Vec<PatternId> {
        self.confirmations.iter().map(Rule::id).collect()
    }

    /// Classify a window of bars. Never fails.
    ///
    /// Fewer than two bars, a flat last bar (`high == low`) or non-finite
    /// shapes yield no labels and a neutral direction.
    pub fn classify<T: OHLCV>(&self, symbol: &str, bars: &[T]) -> ClassificationResult {
        let features = Features::from_bars(bars);
        let mut result = ClassificationResult::unclassified(symbol, features);

        let Some(features) = features else {
            return result;
        };
        if features.len < 2 || features.last.is_degenerate() || !features.is_finite() {
            return result;
        }

        result.direction = features.last.direction();

        if let Some(m) = self.primary.iter().find_map(|rule| rule.detect(&features)) {
            result.labels.push(m.pattern_id);
            result.direction = m.direction;
        }

        for m in self
            .confirmations
            .iter()
            .filter_map(|rule| rule.detect(&features))
        {
            result.labels.push(m.pattern_id);
            result.direction = m.direction;
            result.anchor = Some(m);
        }

        tracing::trace!(
            symbol,
            labels = result.labels.len(),
            direction = %result.direction,
            "classified"
        );
        result
    }

    pub fn classify_series(&self, series: &series::Series) -> ClassificationResult {
        self.classify(series.symbol(), series.bars())
    }

    fn validate(&self) -> Result<()> {
        for rule in self.primary.iter().chain(&self.confirmations) {
            rule.validate_config()?;
        }
        Ok(())
    }
}

// ============================================================
// BUILDER
// ============================================================

/// Builder for creating Classifier instances
#[derive(Debug, Default)]
pub struct ClassifierBuilder {
    primary: Vec<Rule>,
    confirmations: Vec<Rule>,
}

impl ClassifierBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Canonical primary and confirmation rules
    pub fn with_all_defaults(self) -> Self {
        self.with_primary_defaults().with_confirmation_defaults()
    }

    /// Bullish Engulfing, Bearish Engulfing, Doji, Hammer, Shooting Star (in that order)
    pub fn with_primary_defaults(mut self) -> Self {
        self.primary.extend(
            builtin_defaults![
                BullishEngulfing,
                BearishEngulfing,
                Doji,
                Hammer,
                ShootingStar,
            ]
            .into_iter()
            .map(Rule::Builtin),
        );
        self
    }

    /// Morning Star, Evening Star, Three White Soldiers, Three Black Crows
    pub fn with_confirmation_defaults(mut self) -> Self {
        self.confirmations.extend(
            builtin_defaults![
                MorningStar,
                EveningStar,
                ThreeWhiteSoldiers,
                ThreeBlackCrows,
            ]
            .into_iter()
            .map(Rule::Builtin),
        );
        self
    }

    pub fn custom_primary<D: PatternDetector + 'static>(mut self, detector: D) -> Self {
        self.primary.push(Rule::Custom(Box::new(detector)));
        self
    }

    pub fn custom_confirmation<D: PatternDetector + 'static>(mut self, detector: D) -> Self {
        self.confirmations.push(Rule::Custom(Box::new(detector)));
        self
    }

    /// Replace registered builtin rules with parameterized versions.
    ///
    /// Keys are pattern ids (`"DOJI"`), values map parameter names to values.
    /// Naming a pattern that is not registered is an error.
    pub fn with_overrides(
        mut self,
        overrides: &HashMap<String, HashMap<String, f64>>,
    ) -> Result<Self> {
        for (id, values) in overrides {
            let values: HashMap<&str, f64> =
                values.iter().map(|(k, v)| (k.as_str(), *v)).collect();
            let detector = BuiltinDetector::from_params(id, &values)?;

            let slot = self
                .primary
                .iter_mut()
                .chain(self.confirmations.iter_mut())
                .find(|rule| matches!(rule, Rule::Builtin(_)) && rule.id().as_str() == id)
                .ok_or_else(|| {
                    PatternError::InvalidConfig(format!("pattern '{id}' is not registered"))
                })?;
            *slot = Rule::Builtin(detector);
        }
        Ok(self)
    }

    /// Build the classifier, validating every rule's configuration
    pub fn build(self) -> Result<Classifier> {
        let classifier = Classifier {
            primary: self.primary,
            confirmations: self.confirmations,
        };
        classifier.validate()?;
        Ok(classifier)
    }
}

// ============================================================
// TESTS
// ============================================================
