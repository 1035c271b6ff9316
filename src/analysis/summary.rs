//! Exceedance probability, confidence interval and percentiles.
//!
//! All percentages are on the 0-100 scale. The Wald interval is the default
//! and is known to be poor for small `n` or for probabilities near 0 or 100;
//! the Wilson score interval is available behind the same output shape.

use std::fmt;

use serde::Deserialize;

use crate::model::{ConfidenceInterval, Percentiles, YearlyExtremum};

/// Two-sided 95% normal quantile.
pub const Z_95: f64 = 1.96;

/// Estimator for the exceedance confidence interval.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum IntervalMethod {
    /// Normal approximation, no continuity correction.
    #[default]
    Wald,
    /// Wilson score interval.
    Wilson,
}

impl fmt::Display for IntervalMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            IntervalMethod::Wald => write!(f, "wald"),
            IntervalMethod::Wilson => write!(f, "wilson"),
        }
    }
}

/// Aggregates computed from a non-empty set of yearly extrema.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Summary {
    pub probability: f64,
    pub confidence_interval: ConfidenceInterval,
    pub percentiles: Percentiles,
    /// Number of years whose extremum strictly exceeds the threshold.
    pub exceedances: usize,
    pub sample_size: usize,
}

/// Percentage of `values` strictly greater than `threshold`, or `None` when
/// `values` is empty.
pub fn exceedance_probability(values: &[f64], threshold: f64) -> Option<f64> {
    if values.is_empty() {
        return None;
    }
    let count = values.iter().filter(|&&v| v > threshold).count();
    Some(count as f64 / values.len() as f64 * 100.0)
}

/// Wald 95% interval around `probability` (percent) for sample size `n`.
pub fn wald_interval(probability: f64, n: usize) -> ConfidenceInterval {
    let p = probability / 100.0;
    let standard_error = (p * (1.0 - p) / n as f64).sqrt();
    let margin = Z_95 * standard_error * 100.0;
    ConfidenceInterval {
        low: (probability - margin).clamp(0.0, 100.0),
        high: (probability + margin).clamp(0.0, 100.0),
    }
}

/// Wilson score 95% interval around `probability` (percent) for sample size `n`.
pub fn wilson_interval(probability: f64, n: usize) -> ConfidenceInterval {
    let p = probability / 100.0;
    let n = n as f64;
    let z2 = Z_95 * Z_95;
    let denominator = 1.0 + z2 / n;
    let center = (p + z2 / (2.0 * n)) / denominator;
    let half_width = Z_95 * (p * (1.0 - p) / n + z2 / (4.0 * n * n)).sqrt() / denominator;
    ConfidenceInterval {
        low: ((center - half_width) * 100.0).clamp(0.0, 100.0),
        high: ((center + half_width) * 100.0).clamp(0.0, 100.0),
    }
}

/// Interval by `method`, widened if rounding left `probability` outside it.
pub fn confidence_interval(method: IntervalMethod, probability: f64, n: usize) -> ConfidenceInterval {
    let ci = match method {
        IntervalMethod::Wald => wald_interval(probability, n),
        IntervalMethod::Wilson => wilson_interval(probability, n),
    };
    ConfidenceInterval {
        low: ci.low.min(probability),
        high: ci.high.max(probability),
    }
}

/// Nearest-rank percentile `q` (0-100) of an ascending slice.
///
/// The rank is `ceil(q / 100 * n)`, clamped to `1..=n`; no interpolation.
pub fn nearest_rank(sorted: &[f64], q: f64) -> Option<f64> {
    if sorted.is_empty() {
        return None;
    }
    let rank = ((q / 100.0) * sorted.len() as f64).ceil() as i64 - 1;
    let index = rank.clamp(0, sorted.len() as i64 - 1) as usize;
    Some(sorted[index])
}

/// p25/p50/p75/p90 of `values`, or `None` when empty.
pub fn percentiles(values: &[f64]) -> Option<Percentiles> {
    let mut sorted = values.to_vec();
    sorted.sort_by(|a, b| a.total_cmp(b));
    Some(Percentiles {
        p25: nearest_rank(&sorted, 25.0)?,
        p50: nearest_rank(&sorted, 50.0)?,
        p75: nearest_rank(&sorted, 75.0)?,
        p90: nearest_rank(&sorted, 90.0)?,
    })
}

/// Summarises yearly extrema against `threshold`.
///
/// Returns `None` when `extrema` is empty: the probability is undefined and
/// the caller must report insufficient data.
pub fn summarize(extrema: &[YearlyExtremum], threshold: f64, method: IntervalMethod) -> Option<Summary> {
    let values: Vec<f64> = extrema.iter().map(|e| e.max_value).collect();
    let probability = exceedance_probability(&values, threshold)?;
    let percentiles = percentiles(&values)?;
    let n = values.len();

    Some(Summary {
        probability,
        confidence_interval: confidence_interval(method, probability, n),
        percentiles,
        exceedances: values.iter().filter(|&&v| v > threshold).count(),
        sample_size: n,
    })
}
