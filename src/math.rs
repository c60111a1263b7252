//! Percentile, candlestick and axis-scaling statistics shared by the plot projections.
//!
//! calculations follow the nth-element percentile and linear interpolation used throughout
//! the reference InterOp statistics utilities.

/// Linear interpolation between two (x, y) points, evaluated at `xt`.
pub fn interpolate_linear(y1: f64, y2: f64, x1: f64, x2: f64, xt: f64) -> f64 {
    y1 + (y2 - y1) / (x2 - x1) * (xt - x1)
}

/// Interpolated percentile of an already-sorted slice. `percentile` is an integer in `(0, 100]`.
///
/// Panics if `sorted` is empty or `percentile` is out of range; callers are expected to have
/// filtered empty groups out before reaching for a percentile.
pub fn percentile_sorted(sorted: &[f64], percentile: u32) -> f64 {
    assert!(!sorted.is_empty());
    assert!(percentile > 0 && percentile <= 100);

    let n = sorted.len();
    let nth_index = ((percentile as f64 * n as f64 / 100.0).ceil() as usize).saturating_sub(1);

    if nth_index >= n - 1 {
        return sorted[n - 1];
    }

    let y1 = sorted[nth_index];
    let y2 = sorted[nth_index + 1];
    let x1 = 100.0 * (nth_index as f64 + 0.5) / n as f64;
    let x2 = 100.0 * (nth_index as f64 + 1.5) / n as f64;
    interpolate_linear(y1, y2, x1, x2, percentile as f64)
}

/// A five-number summary (min, p25, p50, p75, max) plus the values that fall outside the
/// Tukey whiskers, as produced for every candlestick point in a distribution plot.
#[derive(Debug, Clone, PartialEq)]
pub struct Candlestick {
    pub min: f64,
    pub p25: f64,
    pub p50: f64,
    pub p75: f64,
    pub max: f64,
    pub outliers: Vec<f64>,
}

impl Candlestick {
    /// Summarize `values` (NaNs already excluded by the caller) into a candlestick.
    ///
    /// `values` is sorted in place; ties among equal keys are left in an unspecified order,
    /// matching the non-stable `nth_element`-based reference algorithm.
    pub fn from_values(values: &mut [f64]) -> Option<Self> {
        if values.is_empty() {
            return None;
        }

        values.sort_by(|a, b| a.partial_cmp(b).unwrap());

        let p25 = percentile_sorted(values, 25);
        let p50 = percentile_sorted(values, 50);
        let p75 = percentile_sorted(values, 75);
        let iqr = p75 - p25;
        let lower_whisker = p25 - 1.5 * iqr;
        let upper_whisker = p75 + 1.5 * iqr;

        let mut outliers = Vec::new();
        let mut min = values[0];
        let mut max = values[values.len() - 1];

        for &value in values.iter() {
            if value < lower_whisker || value > upper_whisker {
                outliers.push(value);
            }
        }

        if let Some(&v) = values.iter().find(|&&v| v >= lower_whisker) {
            min = v;
        }
        if let Some(&v) = values.iter().rev().find(|&&v| v <= upper_whisker) {
            max = v;
        }

        Some(Candlestick { min, p25, p50, p75, max, outliers })
    }
}

/// An axis range with an optional human-readable label.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AxisRange {
    pub min: f64,
    pub max: f64,
}

/// Auto-scale a y-axis over `values` (§4.6): `[0 or min y, 1.1 * max y + 1e-4]`, NaNs excluded.
pub fn autoscale_y(values: impl Iterator<Item = f64>) -> AxisRange {
    let (mut min, mut max) = (f64::INFINITY, f64::NEG_INFINITY);
    for value in values.filter(|v| !v.is_nan()) {
        min = min.min(value);
        max = max.max(value);
    }

    if !min.is_finite() || !max.is_finite() {
        return AxisRange { min: 0.0, max: 0.0 };
    }

    AxisRange { min: min.min(0.0), max: 1.1 * max + 1e-4 }
}

/// Auto-scale an x-axis over `values` (§4.6): `[0 or min x, max x]`, NaNs excluded.
pub fn autoscale_x(values: impl Iterator<Item = f64>) -> AxisRange {
    let (mut min, mut max) = (f64::INFINITY, f64::NEG_INFINITY);
    for value in values.filter(|v| !v.is_nan()) {
        min = min.min(value);
        max = max.max(value);
    }

    if !min.is_finite() || !max.is_finite() {
        return AxisRange { min: 0.0, max: 0.0 };
    }

    AxisRange { min: min.min(0.0), max }
}

/// Mean of `values`, skipping NaNs. Returns NaN if every value was NaN (empty group).
pub fn nan_mean(values: impl Iterator<Item = f64>) -> f64 {
    let mut sum = 0.0;
    let mut count = 0u32;

    for value in values {
        if value.is_nan() {
            continue;
        }
        sum += value;
        count += 1;
    }

    if count == 0 {
        f64::NAN
    } else {
        sum / count as f64
    }
}

/// Round-half-away-from-zero to `digits` decimal places, matching the reference table
/// serializer (banker's rounding is explicitly disallowed by §4.8).
pub fn round_half_away_from_zero(value: f32, digits: u32) -> f32 {
    if !value.is_finite() {
        return value;
    }

    let factor = 10f64.powi(digits as i32);
    let scaled = value as f64 * factor;
    let rounded = scaled.abs().floor() + if scaled.abs().fract() >= 0.5 { 1.0 } else { 0.0 };
    (rounded.copysign(scaled) / factor) as f32
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn candlestick_on_one_to_five() {
        let mut values = vec![1.0, 2.0, 3.0, 4.0, 5.0];
        let candle = Candlestick::from_values(&mut values).unwrap();
        assert_eq!(candle.p25, 1.75);
        assert_eq!(candle.p50, 3.0);
        assert_eq!(candle.p75, 4.25);
        assert_eq!(candle.min, 1.0);
        assert_eq!(candle.max, 5.0);
        assert!(candle.outliers.is_empty());
    }

    #[test]
    fn candlestick_orders_min_p25_p50_p75_max() {
        let mut values = vec![9.0, 1.0, 5.0, 3.0, 7.0, 2.0, 8.0];
        let candle = Candlestick::from_values(&mut values).unwrap();
        assert!(candle.min <= candle.p25);
        assert!(candle.p25 <= candle.p50);
        assert!(candle.p50 <= candle.p75);
        assert!(candle.p75 <= candle.max);
    }

    #[test]
    fn candlestick_single_value_collapses_quartiles() {
        let mut values = vec![7.0];
        let candle = Candlestick::from_values(&mut values).unwrap();
        assert_eq!(candle.p25, 7.0);
        assert_eq!(candle.p50, 7.0);
        assert_eq!(candle.p75, 7.0);
    }

    #[test]
    fn autoscale_y_excludes_nan() {
        let range = autoscale_y([1.0, f64::NAN, 3.0].into_iter());
        assert_eq!(range.min, 0.0);
        assert!((range.max - (1.1 * 3.0 + 1e-4)).abs() < 1e-9);
    }

    #[test]
    fn autoscale_respects_min_le_max() {
        let range = autoscale_y([-5.0, 2.0].into_iter());
        assert!(range.min <= range.max);
    }

    #[test]
    fn rounding_is_half_away_from_zero() {
        assert_eq!(round_half_away_from_zero(2.5, 0), 3.0);
        assert_eq!(round_half_away_from_zero(-2.5, 0), -3.0);
        assert_eq!(round_half_away_from_zero(0.125, 2), 0.13);
    }
}
