//! Ranking Aggregator
//!
//! Splits a completed batch by direction, keeps the `top_n` strongest labelled
//! entries of each side and backfills a short side from same-direction entries
//! that carry no label.

use std::{cmp::Ordering, sync::Arc};

use serde::Serialize;

use crate::{
    forecast::Forecast, names::AssetNames, series::Series, Confidence, Direction, PatternId, TopN,
};

/// One instrument as seen by the aggregator
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RankingEntry {
    pub symbol: String,
    pub labels: Vec<PatternId>,
    pub direction: Direction,
    pub confidence: Confidence,
    /// `(close(last) - close(first)) / close(first)` over the classified window
    pub net_change: f64,
    /// Projected closes past the last bar, when the window is long enough
    pub forecast: Option<Forecast>,
    /// Pulled in from the unlabelled pool to fill a short list
    pub backfilled: bool,
    /// Source bars, kept so the delivery side can chart the entry
    #[serde(skip)]
    pub series: Option<Arc<Series>>,
}

impl RankingEntry {
    pub fn new(
        symbol: impl Into<String>,
        labels: Vec<PatternId>,
        direction: Direction,
        confidence: Confidence,
    ) -> Self {
        Self {
            symbol: symbol.into(),
            labels,
            direction,
            confidence,
            net_change: 0.0,
            forecast: None,
            backfilled: false,
            series: None,
        }
    }

    pub fn with_series(mut self, series: Arc<Series>) -> Self {
        self.series = Some(series);
        self
    }

    pub fn with_net_change(mut self, net_change: f64) -> Self {
        self.net_change = net_change;
        self
    }

    pub fn with_forecast(mut self, forecast: Option<Forecast>) -> Self {
        self.forecast = forecast;
        self
    }

    #[inline]
    pub fn has_pattern(&self) -> bool {
        !self.labels.is_empty()
    }

    pub fn display_name<'a>(&'a self, names: &'a AssetNames) -> &'a str {
        names.display_name(&self.symbol)
    }
}

/// Strongest bullish and bearish instruments of a batch
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Ranking {
    pub top_up: Vec<RankingEntry>,
    pub top_down: Vec<RankingEntry>,
}

impl Ranking {
    pub fn is_empty(&self) -> bool {
        self.top_up.is_empty() && self.top_down.is_empty()
    }
}

/// Confidence descending, then symbol ascending
fn by_strength(a: &RankingEntry, b: &RankingEntry) -> Ordering {
    b.confidence
        .get()
        .total_cmp(&a.confidence.get())
        .then_with(|| a.symbol.cmp(&b.symbol))
}

/// Rank a complete batch. Pure: the same batch and `top_n` give the same lists.
pub fn rank(batch: &[RankingEntry], top_n: TopN) -> Ranking {
    Ranking {
        top_up: rank_side(batch, Direction::Up, top_n.get()),
        top_down: rank_side(batch, Direction::Down, top_n.get()),
    }
}

fn rank_side(batch: &[RankingEntry], direction: Direction, top_n: usize) -> Vec<RankingEntry> {
    let (mut labelled, mut pool): (Vec<&RankingEntry>, Vec<&RankingEntry>) = batch
        .iter()
        .filter(|e| e.direction == direction)
        .partition(|e| e.has_pattern());

    labelled.sort_by(|a, b| by_strength(a, b));
    labelled.truncate(top_n);

    let mut side: Vec<RankingEntry> = labelled.into_iter().cloned().collect();

    let missing = top_n - side.len();
    if missing > 0 && !pool.is_empty() {
        pool.sort_by(|a, b| by_strength(a, b));
        let filled = missing.min(pool.len());
        side.extend(pool.into_iter().take(filled).map(|e| RankingEntry {
            backfilled: true,
            ..e.clone()
        }));
        side.sort_by(by_strength);

        tracing::debug!(direction = %direction, filled, "backfilled ranking");
    }

    side
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(symbol: &str, direction: Direction, confidence: f64, labelled: bool) -> RankingEntry {
        let labels = if labelled {
            vec![match direction {
                Direction::Down => PatternId::BEARISH_ENGULFING,
                _ => PatternId::BULLISH_ENGULFING,
            }]
        } else {
            Vec::new()
        };
        RankingEntry::new(symbol, labels, direction, Confidence::new(confidence).unwrap())
    }

    fn symbols(entries: &[RankingEntry]) -> Vec<&str> {
        entries.iter().map(|e| e.symbol.as_str()).collect()
    }

    #[test]
    fn test_partition_and_order() {
        let batch = vec![
            entry("A", Direction::Up, 10.0, true),
            entry("B", Direction::Up, 30.0, true),
            entry("C", Direction::Down, 20.0, true),
            entry("D", Direction::Neutral, 90.0, true),
        ];
        let ranking = rank(&batch, TopN::new(5).unwrap());
        assert_eq!(symbols(&ranking.top_up), vec!["B", "A"]);
        assert_eq!(symbols(&ranking.top_down), vec!["C"]);
    }

    #[test]
    fn test_tie_break_by_symbol() {
        let batch = vec![
            entry("ZED", Direction::Up, 40.0, true),
            entry("ABC", Direction::Up, 40.0, true),
            entry("MID", Direction::Up, 40.0, true),
        ];
        let ranking = rank(&batch, TopN::new(2).unwrap());
        assert_eq!(symbols(&ranking.top_up), vec!["ABC", "MID"]);
    }

    #[test]
    fn test_backfill_from_unlabelled_same_direction() {
        let batch = vec![
            entry("A", Direction::Up, 50.0, true),
            entry("B", Direction::Up, 5.0, false),
            entry("C", Direction::Up, 70.0, false),
            entry("D", Direction::Down, 60.0, false),
        ];
        let ranking = rank(&batch, TopN::new(2).unwrap());
        assert_eq!(symbols(&ranking.top_up), vec!["C", "A"]);
        assert!(ranking.top_up[0].backfilled);
        assert!(!ranking.top_up[1].backfilled);

        assert_eq!(symbols(&ranking.top_down), vec!["D"]);
        assert!(ranking.top_down[0].backfilled);
    }

    #[test]
    fn test_full_side_is_not_backfilled() {
        let batch = vec![
            entry("A", Direction::Up, 50.0, true),
            entry("B", Direction::Up, 99.0, false),
        ];
        let ranking = rank(&batch, TopN::new(1).unwrap());
        assert_eq!(symbols(&ranking.top_up), vec!["A"]);
    }

    #[test]
    fn test_empty_batch() {
        let ranking = rank(&[], TopN::new(3).unwrap());
        assert!(ranking.is_empty());
        assert_eq!(ranking, Ranking::default());
    }
}
