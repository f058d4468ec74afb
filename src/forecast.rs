//! Short-horizon close projection
//!
//! The slope is the mean of the last three bar-to-bar percent changes; each
//! step compounds it onto the last close. Projected timestamps continue the
//! spacing of the last two bars. Descriptive only: ranking never reads it.

use serde::Serialize;

use crate::series::Series;

/// Steps projected by the engine unless configured otherwise
pub const FORECAST_STEPS: usize = 5;

/// Percent changes averaged into the slope
const SLOPE_WINDOW: usize = 3;

/// One projected bar close
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ForecastPoint {
    pub timestamp: i64,
    pub close: f64,
}

/// Projected closes after the last bar of a series
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Forecast {
    /// Mean percent change per bar, as a fraction (`0.01` = 1%)
    pub slope: f64,
    pub points: Vec<ForecastPoint>,
}

/// Project `steps` closes past the end of `series`.
///
/// `None` with fewer than four bars, zero steps, or when a close of zero
/// makes the slope non-finite.
pub fn forecast(series: &Series, steps: usize) -> Option<Forecast> {
    let bars = series.bars();
    if steps == 0 || bars.len() < SLOPE_WINDOW + 1 {
        return None;
    }

    let tail = &bars[bars.len() - SLOPE_WINDOW - 1..];
    let slope = tail
        .windows(2)
        .map(|w| (w[1].close - w[0].close) / w[0].close)
        .sum::<f64>()
        / SLOPE_WINDOW as f64;
    if !slope.is_finite() {
        return None;
    }

    let last = tail[SLOPE_WINDOW];
    let spacing = last.timestamp.saturating_sub(tail[SLOPE_WINDOW - 1].timestamp);

    let points: Vec<ForecastPoint> = (1..=steps)
        .map(|k| ForecastPoint {
            timestamp: last
                .timestamp
                .saturating_add(spacing.saturating_mul(k as i64)),
            close: last.close * (1.0 + slope).powi(k as i32),
        })
        .collect();

    if points.iter().any(|p| !p.close.is_finite()) {
        return None;
    }
    Some(Forecast { slope, points })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::series::Bar;

    fn closes(values: &[f64]) -> Series {
        let bars = values
            .iter()
            .enumerate()
            .map(|(i, &c)| Bar::new(3600 * i as i64, c, c, c, c))
            .collect();
        Series::new("F", bars).unwrap()
    }

    #[test]
    fn test_needs_four_bars() {
        assert!(forecast(&closes(&[100.0, 101.0, 102.0]), 5).is_none());
        assert!(forecast(&closes(&[100.0, 101.0, 102.0, 103.0]), 0).is_none());
        assert!(forecast(&closes(&[100.0, 101.0, 102.0, 103.0]), 5).is_some());
    }

    #[test]
    fn test_slope_is_mean_of_last_three_changes() {
        // first change (+50%) falls outside the window
        let f = forecast(&closes(&[50.0, 75.0, 75.0, 82.5, 74.25]), 2).unwrap();
        // +0%, +10%, -10%
        assert!(f.slope.abs() < 1e-12);
        assert!((f.points[0].close - 74.25).abs() < 1e-9);
    }

    #[test]
    fn test_compounds_and_continues_spacing() {
        let f = forecast(&closes(&[100.0, 110.0, 121.0, 133.1]), 3).unwrap();
        assert!((f.slope - 0.1).abs() < 1e-12);
        assert_eq!(f.points.len(), 3);
        assert!((f.points[0].close - 146.41).abs() < 1e-9);
        assert!((f.points[2].close - 133.1 * 1.1f64.powi(3)).abs() < 1e-9);
        assert_eq!(
            f.points.iter().map(|p| p.timestamp).collect::<Vec<_>>(),
            vec![14_400, 18_000, 21_600]
        );
    }

    #[test]
    fn test_zero_close_gives_none() {
        assert!(forecast(&closes(&[1.0, 0.0, 1.0, 2.0]), 5).is_none());
    }
}
