//! Exponential Moving Average (EMA).
//!
//! Recursive, non-adjusted: EMA[t] = alpha * x[t] + (1 - alpha) * EMA[t-1],
//! with alpha = 2 / (span + 1).
//! Seed: EMA at the first finite sample equals that sample.
//! Output is NaN until `span` finite samples have been seen; NaN inputs are skipped.
//! Lookback: span - 1 (for a series with no leading NaN).

use super::SeriesIndicator;

#[derive(Debug, Clone)]
pub struct Ema {
    span: usize,
    name: String,
}

impl Ema {
    pub fn new(span: usize) -> Self {
        assert!(span >= 1, "EMA span must be >= 1");
        Self {
            span,
            name: format!("ema_{span}"),
        }
    }
}

impl SeriesIndicator for Ema {
    fn name(&self) -> &str {
        &self.name
    }

    fn lookback(&self) -> usize {
        self.span.saturating_sub(1)
    }

    fn compute(&self, values: &[f64]) -> Vec<f64> {
        ema_of_series(values, self.span)
    }
}

/// Span-parameterised EMA of an arbitrary series.
/// Used directly by composed indicators (MACD signal line).
pub fn ema_of_series(values: &[f64], span: usize) -> Vec<f64> {
    if span == 0 {
        return vec![f64::NAN; values.len()];
    }
    ewm_of_series(values, 2.0 / (span as f64 + 1.0), span)
}

/// Non-adjusted exponentially weighted mean with an explicit smoothing factor.
///
/// NaN samples are skipped: the recursion starts at the first finite sample,
/// `min_periods` counts finite samples only, and a NaN position repeats the
/// last emitted value once the mean is warm.
pub fn ewm_of_series(values: &[f64], alpha: f64, min_periods: usize) -> Vec<f64> {
    let mut result = vec![f64::NAN; values.len()];
    let mut prev: Option<f64> = None;
    let mut seen = 0usize;

    for (i, &v) in values.iter().enumerate() {
        if !v.is_nan() {
            prev = Some(match prev {
                Some(p) => alpha * v + (1.0 - alpha) * p,
                None => v,
            });
            seen += 1;
        }
        if seen >= min_periods {
            if let Some(p) = prev {
                result[i] = p;
            }
        }
    }

    result
}
