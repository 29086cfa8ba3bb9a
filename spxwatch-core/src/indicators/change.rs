//! Horizon changes: per-minute slope and percentage return over `rows` samples.

/// (x[t] - x[t - rows]) / minutes. NaN when either end is missing.
pub fn slope_per_minute(values: &[f64], rows: usize, minutes: f64) -> Vec<f64> {
    let mut result = vec![f64::NAN; values.len()];
    if rows == 0 || minutes <= 0.0 {
        return result;
    }
    for i in rows..values.len() {
        result[i] = (values[i] - values[i - rows]) / minutes;
    }
    result
}

/// Percentage change (x[t] / x[t - rows] - 1) * 100.
///
/// NaN when the base value is zero or missing.
pub fn pct_change(values: &[f64], rows: usize) -> Vec<f64> {
    let mut result = vec![f64::NAN; values.len()];
    if rows == 0 {
        return result;
    }
    for i in rows..values.len() {
        let base = values[i - rows];
        if base != 0.0 {
            result[i] = (values[i] / base - 1.0) * 100.0;
        }
    }
    result
}
