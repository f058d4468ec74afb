//! Canonical thresholds and shape predicates shared by the detector modules.

// ============================================================
// CANONICAL THRESHOLDS
// ============================================================

/// Stand-in for a zero high-low range in shape ratios
pub const RANGE_EPSILON: f64 = 1e-8;
/// Doji: |body| < range * DOJI_BODY_RATIO
pub const DOJI_BODY_RATIO: f64 = 0.1;
/// Hammer / Shooting Star: long shadow > |body| * SHADOW_FACTOR
pub const SHADOW_FACTOR: f64 = 2.0;
/// Morning / Evening Star: |middle body| < |first body| * STAR_BODY_RATIO
pub const STAR_BODY_RATIO: f64 = 0.3;
/// Confidence = |body| / range * CONFIDENCE_SCALE
pub const CONFIDENCE_SCALE: f64 = 80.0;

// ============================================================
// HELPER FUNCTIONS
// ============================================================

/// Range with zero (or negative noise) replaced by [`RANGE_EPSILON`]
#[inline]
pub fn guarded_range(range: f64) -> f64 {
    if range > 0.0 {
        range
    } else {
        RANGE_EPSILON
    }
}

/// Body is doji-like relative to the bar's own range
#[inline]
pub fn is_doji(body: f64, range: f64, max_body_ratio: f64) -> bool {
    body.abs() < guarded_range(range) * max_body_ratio
}

/// The dominant shadow is at least `factor` bodies long while the opposite
/// shadow stays shorter than the body
#[inline]
pub fn is_pin(body: f64, long_shadow: f64, short_shadow: f64, factor: f64) -> bool {
    let size = body.abs();
    long_shadow > factor * size && short_shadow < size
}

/// Second body is larger than the first, regardless of sign
#[inline]
pub fn engulfs(prev_body: f64, last_body: f64) -> bool {
    last_body.abs() > prev_body.abs()
}

/// Middle body of a star formation is small relative to the first one
#[inline]
pub fn is_star(first_body: f64, star_body: f64, max_ratio: f64) -> bool {
    star_body.abs() < max_ratio * first_body.abs()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_guarded_range() {
        assert_eq!(guarded_range(2.0), 2.0);
        assert_eq!(guarded_range(0.0), RANGE_EPSILON);
        assert_eq!(guarded_range(-0.0), RANGE_EPSILON);
    }

    #[test]
    fn test_is_doji() {
        assert!(is_doji(0.0, 2.0, DOJI_BODY_RATIO));
        assert!(is_doji(-0.19, 2.0, DOJI_BODY_RATIO));
        assert!(!is_doji(0.2, 2.0, DOJI_BODY_RATIO));
        assert!(!is_doji(0.0, 0.0, 0.0));
    }

    #[test]
    fn test_is_pin() {
        // body 1, lower 3, upper 0.5
        assert!(is_pin(1.0, 3.0, 0.5, SHADOW_FACTOR));
        assert!(!is_pin(1.0, 2.0, 0.5, SHADOW_FACTOR));
        assert!(!is_pin(-1.0, 3.0, 1.0, SHADOW_FACTOR));
    }

    #[test]
    fn test_is_star() {
        assert!(is_star(-2.0, 0.5, STAR_BODY_RATIO));
        assert!(!is_star(-2.0, 0.6, STAR_BODY_RATIO));
    }
}
