//! Batch engine: classify and score every instrument, then rank the batch
//!
//! Instruments are independent, so the scan fans out on the rayon pool. The
//! aggregator only runs once the whole batch has been scored.

use std::sync::Arc;

use rayon::prelude::*;
use serde::{Serialize, Serializer};

use crate::{
    config::{EngineConfig, DEFAULT_TOP_N},
    forecast::{forecast, Forecast, FORECAST_STEPS},
    ranking::{rank, Ranking, RankingEntry},
    scoring::Scorer,
    series::{Bar, Series},
    ClassificationResult, Classifier, ClassifierBuilder, Confidence, PatternError, Result, TopN,
};

// ============================================================
// ENGINE
// ============================================================

/// Classifier plus scorer, shared read-only across the batch
#[derive(Debug)]
pub struct PatternEngine {
    classifier: Classifier,
    scorer: Scorer,
    top_n: TopN,
    forecast_steps: usize,
}

impl Default for PatternEngine {
    fn default() -> Self {
        Self::with_defaults()
    }
}

impl PatternEngine {
    pub fn new(classifier: Classifier, scorer: Scorer) -> Self {
        Self {
            classifier,
            scorer,
            top_n: DEFAULT_TOP_N,
            forecast_steps: FORECAST_STEPS,
        }
    }

    /// List length used by [`PatternEngine::report`]
    pub fn with_top_n(mut self, top_n: TopN) -> Self {
        self.top_n = top_n;
        self
    }

    /// Closes projected per instrument; 0 disables the forecast
    pub fn with_forecast_steps(mut self, steps: usize) -> Self {
        self.forecast_steps = steps;
        self
    }

    /// Canonical rules and scale, no configuration required
    pub fn with_defaults() -> Self {
        Self::new(Classifier::with_defaults(), Scorer::default())
    }

    /// Canonical rules with the config's parameter overrides, scale, list
    /// length and forecast horizon applied
    pub fn from_config(config: &EngineConfig) -> Result<Self> {
        let classifier = ClassifierBuilder::new()
            .with_all_defaults()
            .with_overrides(&config.patterns)?
            .build()?;
        Ok(Self::new(classifier, Scorer::new(config.confidence_scale))
            .with_top_n(config.top_n)
            .with_forecast_steps(config.forecast_steps))
    }

    #[inline]
    pub fn classifier(&self) -> &Classifier {
        &self.classifier
    }

    #[inline]
    pub fn scorer(&self) -> &Scorer {
        &self.scorer
    }

    #[inline]
    pub fn top_n(&self) -> TopN {
        self.top_n
    }

    #[inline]
    pub fn forecast_steps(&self) -> usize {
        self.forecast_steps
    }

    /// Classify and score one validated series. Never fails.
    ///
    /// A score that cannot be computed (NaN or infinity) drops the labels and
    /// leaves the instrument neutral with zero confidence.
    pub fn evaluate(&self, series: impl Into<Arc<Series>>) -> ScoredInstrument {
        let series = series.into();
        let mut classification = self.classifier.classify_series(&series);

        let confidence = match self.scorer.try_score(series.bars(), &classification) {
            Some(confidence) => confidence,
            None => {
                classification.clear_signal();
                Confidence::ZERO
            }
        };

        let forecast = forecast(&series, self.forecast_steps);

        ScoredInstrument {
            series,
            classification,
            confidence,
            forecast,
        }
    }

    /// Validate raw bars and evaluate them; a malformed series becomes a skip
    pub fn scan(
        &self,
        symbol: String,
        bars: Vec<Bar>,
    ) -> std::result::Result<ScoredInstrument, Skipped> {
        match Series::new(symbol.as_str(), bars) {
            Ok(series) => Ok(self.evaluate(series)),
            Err(reason) => Err(Skipped { symbol, reason }),
        }
    }

    /// Scan the batch in parallel and rank it
    pub fn run<I>(&self, instruments: I, top_n: TopN) -> Report
    where
        I: IntoParallelIterator<Item = (String, Vec<Bar>)>,
    {
        let scan = scan_parallel(self, instruments);
        Report {
            ranking: scan.rank(top_n),
            skipped: scan.skipped,
        }
    }

    /// [`PatternEngine::run`] with the engine's own `top_n`
    pub fn report<I>(&self, instruments: I) -> Report
    where
        I: IntoParallelIterator<Item = (String, Vec<Bar>)>,
    {
        self.run(instruments, self.top_n)
    }
}

// ============================================================
// RESULTS
// ============================================================

/// One evaluated instrument
#[derive(Debug, Clone)]
pub struct ScoredInstrument {
    pub series: Arc<Series>,
    pub classification: ClassificationResult,
    pub confidence: Confidence,
    pub forecast: Option<Forecast>,
}

impl ScoredInstrument {
    #[inline]
    pub fn symbol(&self) -> &str {
        self.series.symbol()
    }

    /// Aggregator view, keeping a handle on the bars for charting
    pub fn entry(&self) -> RankingEntry {
        let net_change = self
            .classification
            .features
            .map_or(0.0, |f| f.net_change);

        RankingEntry::new(
            self.symbol(),
            self.classification.labels.clone(),
            self.classification.direction,
            self.confidence,
        )
        .with_net_change(if net_change.is_finite() { net_change } else { 0.0 })
        .with_forecast(self.forecast.clone())
        .with_series(Arc::clone(&self.series))
    }
}

/// Instrument left out of the batch, with the reason
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Skipped {
    pub symbol: String,
    #[serde(serialize_with = "serialize_display")]
    pub reason: PatternError,
}

fn serialize_display<S: Serializer>(
    reason: &PatternError,
    s: S,
) -> std::result::Result<S::Ok, S::Error> {
    s.collect_str(reason)
}

/// Output of [`scan_parallel`], in input order
#[derive(Debug, Default)]
pub struct BatchScan {
    pub scored: Vec<ScoredInstrument>,
    pub skipped: Vec<Skipped>,
}

impl BatchScan {
    pub fn entries(&self) -> Vec<RankingEntry> {
        self.scored.iter().map(ScoredInstrument::entry).collect()
    }

    pub fn rank(&self, top_n: TopN) -> Ranking {
        rank(&self.entries(), top_n)
    }
}

/// Ranked lists plus the symbols that never made it into the batch
#[derive(Debug, Clone, Default, Serialize)]
pub struct Report {
    pub ranking: Ranking,
    pub skipped: Vec<Skipped>,
}

// ============================================================
// PARALLEL SCANNING
// ============================================================

/// Validate and evaluate every `(symbol, bars)` pair on the rayon pool
pub fn scan_parallel<I>(engine: &PatternEngine, instruments: I) -> BatchScan
where
    I: IntoParallelIterator<Item = (String, Vec<Bar>)>,
{
    let results: Vec<_> = instruments
        .into_par_iter()
        .map(|(symbol, bars)| engine.scan(symbol, bars))
        .collect();

    let mut scan = BatchScan::default();

    for result in results {
        match result {
            Ok(scored) => scan.scored.push(scored),
            Err(skipped) => {
                tracing::warn!(
                    symbol = %skipped.symbol,
                    reason = %skipped.reason,
                    "skipping malformed series"
                );
                scan.skipped.push(skipped);
            }
        }
    }

    tracing::debug!(
        scored = scan.scored.len(),
        skipped = scan.skipped.len(),
        "batch scanned"
    );
    scan
}
