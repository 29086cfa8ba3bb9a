//! Bollinger Bands: moving average +/- standard deviation multiplier.
//!
//! - Middle: SMA(x, period)
//! - Upper: middle + mult * stddev(x, period)
//! - Lower: middle - mult * stddev(x, period)
//!
//! Uses population stddev (divide by N) over the same window as the SMA.
//! Lookback: period - 1.

/// All three bands, index-aligned with the input series.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BollingerSeries {
    pub upper: Vec<f64>,
    pub middle: Vec<f64>,
    pub lower: Vec<f64>,
}

impl BollingerSeries {
    /// Normalized position of `price` inside the band at `i`.
    ///
    /// 0 = lower band, 1 = upper band. A zero-width band (constant window)
    /// puts price in the middle. NaN while the bands are warming up.
    pub fn position(&self, i: usize, price: f64) -> f64 {
        let (upper, lower) = (self.upper[i], self.lower[i]);
        if upper.is_nan() || lower.is_nan() || price.is_nan() {
            return f64::NAN;
        }
        let width = upper - lower;
        if width <= 0.0 {
            0.5
        } else {
            (price - lower) / width
        }
    }
}

#[derive(Debug, Clone)]
pub struct Bollinger {
    period: usize,
    multiplier: f64,
}

impl Bollinger {
    pub fn new(period: usize, multiplier: f64) -> Self {
        assert!(period >= 1, "Bollinger period must be >= 1");
        Self { period, multiplier }
    }

    pub fn lookback(&self) -> usize {
        self.period.saturating_sub(1)
    }

    pub fn compute(&self, values: &[f64]) -> BollingerSeries {
        let n = values.len();
        let mut out = BollingerSeries {
            upper: vec![f64::NAN; n],
            middle: vec![f64::NAN; n],
            lower: vec![f64::NAN; n],
        };

        if n < self.period {
            return out;
        }

        for i in (self.period - 1)..n {
            let window = &values[i + 1 - self.period..=i];
            if window.iter().any(|v| v.is_nan()) {
                continue;
            }

            let mean = window.iter().sum::<f64>() / self.period as f64;
            let variance = window
                .iter()
                .map(|v| {
                    let diff = v - mean;
                    diff * diff
                })
                .sum::<f64>()
                / self.period as f64;
            let stddev = variance.sqrt();

            out.middle[i] = mean;
            out.upper[i] = mean + self.multiplier * stddev;
            out.lower[i] = mean - self.multiplier * stddev;
        }

        out
    }
}
