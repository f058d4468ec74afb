//! Integration tests for classification and scoring.
//!
//! Scenarios run through the public engine API on concrete series.

use std::collections::HashMap;

use candlerank::prelude::*;

fn series(ohlc: &[(f64, f64, f64, f64)]) -> Series {
    let bars = ohlc
        .iter()
        .enumerate()
        .map(|(i, &(o, h, l, c))| Bar::new(i as i64, o, h, l, c))
        .collect();
    Series::new("TEST", bars).unwrap()
}

fn evaluate(ohlc: &[(f64, f64, f64, f64)]) -> ScoredInstrument {
    PatternEngine::with_defaults().evaluate(series(ohlc))
}

#[test]
fn concrete_bullish_engulfing_scenario() {
    let scored = evaluate(&[(10.0, 12.0, 9.0, 9.5), (9.5, 10.0, 8.0, 11.0)]);

    assert!(scored
        .classification
        .labels
        .contains(&PatternId::BULLISH_ENGULFING));
    assert_eq!(scored.classification.direction, Direction::Up);
    assert!((scored.confidence.get() - 40.0).abs() < 1e-9);
}

#[test]
fn flat_body_is_doji_with_zero_confidence() {
    for (o, h, l) in [(10.0, 11.0, 9.0), (100.0, 100.5, 90.0), (0.5, 2.0, 0.1)] {
        let scored = evaluate(&[(o, h, l, o + 0.05), (o, h, l, o)]);
        assert_eq!(scored.classification.labels, vec![PatternId::DOJI]);
        assert_eq!(scored.classification.direction, Direction::Neutral);
        assert_eq!(scored.confidence, Confidence::ZERO);
    }
}

#[test]
fn zero_range_bar_has_no_signal() {
    let scored = evaluate(&[(10.0, 11.0, 9.0, 10.5), (10.0, 10.0, 10.0, 10.0)]);
    assert!(scored.classification.labels.is_empty());
    assert_eq!(scored.classification.direction, Direction::Neutral);
    assert_eq!(scored.confidence, Confidence::ZERO);
}

#[test]
fn engulfing_confidence_grows_with_body() {
    // prev {open 10, close 8}; last opens at 7, range fixed at [6, 14]
    let mut previous = 0.0;
    for close in [11.0, 12.0, 13.0, 14.0] {
        let scored = evaluate(&[(10.0, 10.5, 7.5, 8.0), (7.0, 14.0, 6.0, close)]);
        assert_eq!(
            scored.classification.labels,
            vec![PatternId::BULLISH_ENGULFING]
        );
        assert_eq!(scored.classification.direction, Direction::Up);
        assert!(scored.confidence.get() > previous);
        previous = scored.confidence.get();
    }
}

#[test]
fn single_bar_series_has_no_signal() {
    let scored = evaluate(&[(9.5, 10.0, 8.0, 9.8)]);
    assert!(scored.classification.labels.is_empty());
    assert_eq!(scored.classification.direction, Direction::Neutral);
}

#[test]
fn fallback_direction_follows_body() {
    // no rule fires: modest bodies, no engulfing, shadows balanced
    let up = evaluate(&[(10.0, 10.8, 9.6, 10.4), (10.4, 11.2, 10.0, 10.9)]);
    assert!(up.classification.labels.is_empty());
    assert_eq!(up.classification.direction, Direction::Up);

    let down = evaluate(&[(10.9, 11.2, 10.0, 10.4), (10.4, 10.8, 9.6, 9.9)]);
    assert!(down.classification.labels.is_empty());
    assert_eq!(down.classification.direction, Direction::Down);
}

#[test]
fn morning_star_overrides_primary_direction() {
    // the last two bars also engulf; the star formation is appended after it
    let scored = evaluate(&[
        (12.0, 12.2, 9.8, 10.0),
        (9.9, 10.1, 9.4, 9.6),
        (9.7, 12.6, 9.6, 12.5),
    ]);
    let labels = &scored.classification.labels;
    assert_eq!(labels.last(), Some(&PatternId::MORNING_STAR));
    assert_eq!(scored.classification.direction, Direction::Up);

    // union of the three bars: body 12.5 - 12.0, range 12.6 - 9.4
    let expected = 0.5 / 3.2 * 80.0;
    assert!((scored.confidence.get() - expected).abs() < 1e-9);
}

#[test]
fn doji_takes_precedence_over_hammer() {
    let scored = evaluate(&[(10.0, 10.5, 9.5, 10.2), (10.0, 10.06, 8.0, 10.05)]);

    // the last bar is a valid hammer on its own
    let features = scored.classification.features.unwrap();
    assert!(HammerDetector::default().detect(&features).is_some());

    assert_eq!(scored.classification.labels, vec![PatternId::DOJI]);
    assert_eq!(scored.classification.direction, Direction::Neutral);
}

#[test]
fn doji_then_three_black_crows_ends_down() {
    let scored = evaluate(&[
        (13.0, 13.1, 11.8, 12.0),
        (12.0, 12.1, 10.8, 11.0),
        (11.0, 12.0, 10.0, 10.95),
    ]);
    assert_eq!(
        scored.classification.labels,
        vec![PatternId::DOJI, PatternId::THREE_BLACK_CROWS]
    );
    assert_eq!(scored.classification.direction, Direction::Down);
}

#[test]
fn custom_rule_runs_after_builtins() {
    struct GapUp;

    impl PatternDetector for GapUp {
        fn id(&self) -> PatternId {
            PatternId("GAP_UP")
        }

        fn min_bars(&self) -> usize {
            2
        }

        fn detect(&self, features: &Features) -> Option<PatternMatch> {
            let (prev, last) = features.pair()?;
            (last.low > prev.high)
                .then(|| PatternMatch::trailing(self.id(), Direction::Up, features, 2))
        }
    }

    let classifier = ClassifierBuilder::new()
        .with_all_defaults()
        .custom_confirmation(GapUp)
        .build()
        .unwrap();
    let engine = PatternEngine::new(classifier, Scorer::default());

    let scored = engine.evaluate(series(&[(10.0, 10.5, 9.5, 10.2), (11.0, 11.8, 10.8, 11.5)]));
    assert_eq!(scored.classification.labels, vec![PatternId("GAP_UP")]);
    assert_eq!(scored.classification.direction, Direction::Up);
    assert_eq!(scored.classification.anchor.unwrap().span(), 2);
}

#[test]
fn overrides_change_thresholds() {
    let bars = [(10.0, 11.0, 9.0, 10.3), (10.0, 11.0, 9.0, 10.3)];
    assert!(evaluate(&bars).classification.labels.is_empty());

    let overrides = HashMap::from([(
        "DOJI".to_string(),
        HashMap::from([("max_body_ratio".to_string(), 0.2)]),
    )]);
    let classifier = ClassifierBuilder::new()
        .with_all_defaults()
        .with_overrides(&overrides)
        .unwrap()
        .build()
        .unwrap();
    let result = classifier.classify_series(&series(&bars));
    assert_eq!(result.labels, vec![PatternId::DOJI]);
}
