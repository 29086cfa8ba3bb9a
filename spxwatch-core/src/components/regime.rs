//! Regime classification: pluggable, pure policies over one feature vector.

use serde::{Deserialize, Serialize};

use crate::domain::{FeatureVector, RegimeLabel};

/// Maps the latest feature vector to a regime label.
///
/// Implementations must be total and stateless: the same vector always
/// yields the same label, and missing (warmup) features still classify.
pub trait RegimeClassifier: Send + Sync {
    fn name(&self) -> &str;

    fn classify(&self, features: &FeatureVector) -> RegimeLabel;
}

/// Always returns the configured label (the operator's day-type call).
#[derive(Debug, Clone)]
pub struct FixedRegime {
    label: RegimeLabel,
}

impl FixedRegime {
    pub fn new(label: RegimeLabel) -> Self {
        Self { label }
    }
}

impl RegimeClassifier for FixedRegime {
    fn name(&self) -> &str {
        "fixed"
    }

    fn classify(&self, _features: &FeatureVector) -> RegimeLabel {
        self.label.clone()
    }
}

/// Thresholds for [`TrendStrengthClassifier`].
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TrendStrengthParams {
    /// |30-minute return| (percent) at or above which the day is trending.
    pub min_abs_ret_30m_pct: f64,
    /// |30-minute EMA21 slope| (points per minute) at or above which the day is trending.
    pub min_abs_slope_30m: f64,
    /// Treat a close outside the Bollinger bands as trending.
    pub band_break_is_trend: bool,
}

impl Default for TrendStrengthParams {
    fn default() -> Self {
        Self {
            min_abs_ret_30m_pct: 0.30,
            min_abs_slope_30m: 0.40,
            band_break_is_trend: true,
        }
    }
}

/// Classifies by trend strength: large 30-minute move, steep EMA21, or a
/// band break means `Trending`; everything else is `RangeBound`.
#[derive(Debug, Clone, Default)]
pub struct TrendStrengthClassifier {
    params: TrendStrengthParams,
}

impl TrendStrengthClassifier {
    pub fn new(params: TrendStrengthParams) -> Self {
        Self { params }
    }
}

impl RegimeClassifier for TrendStrengthClassifier {
    fn name(&self) -> &str {
        "trend_strength"
    }

    fn classify(&self, features: &FeatureVector) -> RegimeLabel {
        let p = &self.params;

        let big_move = features
            .ret_30m_pct
            .is_some_and(|r| r.abs() >= p.min_abs_ret_30m_pct);
        let steep = features
            .ema21_slope_30m
            .is_some_and(|s| s.abs() >= p.min_abs_slope_30m);
        let band_break = p.band_break_is_trend
            && features
                .band_position
                .is_some_and(|pos| !(0.0..=1.0).contains(&pos));

        if big_move || steep || band_break {
            RegimeLabel::Trending
        } else {
            RegimeLabel::RangeBound
        }
    }
}

#[cfg(test)]
pub(crate) fn sample_features() -> FeatureVector {
    use chrono::{FixedOffset, TimeZone};

    FeatureVector {
        timestamp: FixedOffset::west_opt(5 * 3600)
            .unwrap()
            .with_ymd_and_hms(2026, 1, 29, 12, 40, 0)
            .unwrap(),
        price: 6000.0,
        expected_move: 40.0,
        otm_premium: 6.0,
        vix: 18.0,
        rsi: Some(50.0),
        macd: Some(0.0),
        macd_signal: Some(0.0),
        macd_hist: Some(0.0),
        bb_upper: Some(6010.0),
        bb_middle: Some(6000.0),
        bb_lower: Some(5990.0),
        band_position: Some(0.5),
        premium_ratio: Some(0.15),
        minutes_to_close: 200,
        ema9: Some(6000.0),
        ema21: Some(6000.0),
        ema50: Some(6000.0),
        ema21_slope_5m: Some(0.0),
        ema21_slope_15m: Some(0.0),
        ema21_slope_30m: Some(0.0),
        ret_5m_pct: Some(0.0),
        ret_15m_pct: Some(0.0),
        ret_30m_pct: Some(0.0),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fixed_ignores_features() {
        let c = FixedRegime::new(RegimeLabel::Trending);
        assert_eq!(c.classify(&sample_features()), RegimeLabel::Trending);
        assert_eq!(c.name(), "fixed");
    }

    #[test]
    fn quiet_tape_is_range_bound() {
        let c = TrendStrengthClassifier::default();
        assert_eq!(c.classify(&sample_features()), RegimeLabel::RangeBound);
    }

    #[test]
    fn large_move_is_trending() {
        let c = TrendStrengthClassifier::default();
        let mut fv = sample_features();
        fv.ret_30m_pct = Some(-0.45);
        assert_eq!(c.classify(&fv), RegimeLabel::Trending);
    }

    #[test]
    fn steep_slope_is_trending() {
        let c = TrendStrengthClassifier::default();
        let mut fv = sample_features();
        fv.ema21_slope_30m = Some(0.6);
        assert_eq!(c.classify(&fv), RegimeLabel::Trending);
    }

    #[test]
    fn band_break_is_trending_unless_disabled() {
        let mut fv = sample_features();
        fv.band_position = Some(1.2);
        assert_eq!(
            TrendStrengthClassifier::default().classify(&fv),
            RegimeLabel::Trending
        );
        let c = TrendStrengthClassifier::new(TrendStrengthParams {
            band_break_is_trend: false,
            ..TrendStrengthParams::default()
        });
        assert_eq!(c.classify(&fv), RegimeLabel::RangeBound);
    }

    #[test]
    fn warmup_vector_still_classifies() {
        let mut fv = sample_features();
        fv.ret_30m_pct = None;
        fv.ema21_slope_30m = None;
        fv.band_position = None;
        assert_eq!(
            TrendStrengthClassifier::default().classify(&fv),
            RegimeLabel::RangeBound
        );
    }

    #[test]
    fn classification_is_repeatable() {
        let c = TrendStrengthClassifier::default();
        let fv = sample_features();
        assert_eq!(c.classify(&fv), c.classify(&fv));
    }
}
