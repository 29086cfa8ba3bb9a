//! Relative Strength Index (RSI).
//!
//! Up and down moves are smoothed with Wilder's exponential average
//! (alpha = 1/period, non-adjusted). The first move has no predecessor and
//! counts as zero, so the recursion is seeded at index 0.
//! RSI = 100 - 100 / (1 + avg_gain / avg_loss)
//! Lookback: period - 1.
//! Edge cases: avg_loss == 0 → 100; avg_gain == avg_loss == 0 → 50 (no movement).

use super::ema::ewm_of_series;
use super::SeriesIndicator;

#[derive(Debug, Clone)]
pub struct Rsi {
    period: usize,
    name: String,
}

impl Rsi {
    pub fn new(period: usize) -> Self {
        assert!(period >= 1, "RSI period must be >= 1");
        Self {
            period,
            name: format!("rsi_{period}"),
        }
    }
}

impl SeriesIndicator for Rsi {
    fn name(&self) -> &str {
        &self.name
    }

    fn lookback(&self) -> usize {
        self.period - 1
    }

    fn compute(&self, values: &[f64]) -> Vec<f64> {
        let n = values.len();
        let mut gains = vec![0.0; n];
        let mut losses = vec![0.0; n];

        for i in 1..n {
            let change = values[i] - values[i - 1];
            if change.is_nan() {
                gains[i] = f64::NAN;
                losses[i] = f64::NAN;
            } else if change > 0.0 {
                gains[i] = change;
            } else {
                losses[i] = -change;
            }
        }

        let alpha = 1.0 / self.period as f64;
        let avg_gain = ewm_of_series(&gains, alpha, self.period);
        let avg_loss = ewm_of_series(&losses, alpha, self.period);

        avg_gain
            .iter()
            .zip(&avg_loss)
            .map(|(&g, &l)| {
                if g.is_nan() || l.is_nan() {
                    f64::NAN
                } else {
                    compute_rsi(g, l)
                }
            })
            .collect()
    }
}

fn compute_rsi(avg_gain: f64, avg_loss: f64) -> f64 {
    if avg_loss == 0.0 && avg_gain == 0.0 {
        50.0
    } else if avg_loss == 0.0 {
        100.0
    } else {
        100.0 - 100.0 / (1.0 + avg_gain / avg_loss)
    }
}
