//! Series indicators.
//!
//! Every indicator maps an input series to an output series of the same
//! length. Warmup positions hold `f64::NAN`; the feature engine converts
//! NaN to `None` when it assembles feature vectors.
//!
//! No output value at index t may depend on input from index t+1 or later.

pub mod bollinger;
pub mod change;
pub mod ema;
pub mod macd;
pub mod rsi;

pub use bollinger::{Bollinger, BollingerSeries};
pub use change::{pct_change, slope_per_minute};
pub use ema::{ema_of_series, ewm_of_series, Ema};
pub use macd::{Macd, MacdSeries};
pub use rsi::Rsi;

/// Trait for single-output indicators over a numeric series.
pub trait SeriesIndicator: Send + Sync {
    /// Human-readable name (e.g., "ema_21", "rsi_14").
    fn name(&self) -> &str;

    /// Number of leading samples that are NaN before the first valid output.
    fn lookback(&self) -> usize;

    fn compute(&self, values: &[f64]) -> Vec<f64>;
}

/// NaN → None.
pub fn finite(value: f64) -> Option<f64> {
    if value.is_finite() {
        Some(value)
    } else {
        None
    }
}

/// Assert two f64 values are approximately equal (within epsilon).
#[cfg(test)]
pub fn assert_approx(actual: f64, expected: f64, epsilon: f64) {
    assert!(
        (actual - expected).abs() < epsilon,
        "assert_approx failed: actual={actual}, expected={expected}, diff={}, epsilon={epsilon}",
        (actual - expected).abs()
    );
}

/// Default epsilon for indicator tests.
#[cfg(test)]
pub const DEFAULT_EPSILON: f64 = 1e-10;
