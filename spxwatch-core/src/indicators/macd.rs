//! MACD: trend-following oscillator.
//!
//! line = EMA(fast) - EMA(slow), signal = EMA(signal_span) of the line,
//! histogram = line - signal. The signal EMA starts at the first valid
//! line value, so it becomes valid `slow + signal_span - 2` samples in.

use super::ema::ema_of_series;

#[derive(Debug, Clone, Default, PartialEq)]
pub struct MacdSeries {
    pub line: Vec<f64>,
    pub signal: Vec<f64>,
    pub histogram: Vec<f64>,
}

#[derive(Debug, Clone)]
pub struct Macd {
    fast: usize,
    slow: usize,
    signal: usize,
}

impl Macd {
    pub fn new(fast: usize, slow: usize, signal: usize) -> Self {
        assert!(fast >= 1 && signal >= 1, "MACD spans must be >= 1");
        assert!(slow > fast, "MACD slow span must exceed fast span");
        Self { fast, slow, signal }
    }

    /// The conventional 12 / 26 / 9 configuration.
    pub fn standard() -> Self {
        Self::new(12, 26, 9)
    }

    pub fn compute(&self, values: &[f64]) -> MacdSeries {
        let fast = ema_of_series(values, self.fast);
        let slow = ema_of_series(values, self.slow);
        let line: Vec<f64> = fast.iter().zip(&slow).map(|(f, s)| f - s).collect();
        let signal = ema_of_series(&line, self.signal);
        let histogram = line.iter().zip(&signal).map(|(l, s)| l - s).collect();
        MacdSeries {
            line,
            signal,
            histogram,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::indicators::{assert_approx, DEFAULT_EPSILON};

    fn trending(n: usize) -> Vec<f64> {
        (0..n).map(|i| 6000.0 + i as f64 * 0.5).collect()
    }

    #[test]
    fn warmup_boundaries() {
        let m = Macd::standard().compute(&trending(40));
        assert!(m.line[24].is_nan());
        assert!(!m.line[25].is_nan());
        assert!(m.signal[32].is_nan());
        assert!(!m.signal[33].is_nan());
        assert!(m.histogram[32].is_nan());
        assert!(!m.histogram[33].is_nan());
    }

    #[test]
    fn histogram_is_line_minus_signal() {
        let m = Macd::standard().compute(&trending(60));
        for i in 33..60 {
            assert_approx(m.histogram[i], m.line[i] - m.signal[i], DEFAULT_EPSILON);
        }
    }

    #[test]
    fn rising_prices_give_positive_line() {
        let m = Macd::standard().compute(&trending(60));
        assert!(m.line[59] > 0.0);
    }

    #[test]
    fn flat_prices_give_zero() {
        let m = Macd::standard().compute(&[5000.0; 50]);
        assert_approx(m.line[49], 0.0, DEFAULT_EPSILON);
        assert_approx(m.histogram[49], 0.0, DEFAULT_EPSILON);
    }
}
