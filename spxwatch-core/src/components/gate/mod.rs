//! Admission gate: decides whether a snapshot is worth sending to the oracle.
//!
//! Two phases, short-circuiting on the first rejection:
//! 1. Global filters (VIX floor/ceiling, session timing), regime-independent.
//! 2. Exactly one regime branch, selected by the regime label.
//!
//! The gate reports through its return value only. A missing feature that a
//! rule needs is a rejection ("insufficient data"), never an error.

pub mod global;
pub mod range_bound;
pub mod trending;

use serde::{Deserialize, Serialize};

use crate::domain::{FeatureVector, GateDecision, GateStage, RegimeLabel};

pub use global::GlobalParams;
pub use range_bound::RangeBoundParams;
pub use trending::TrendingParams;

/// Unwrap a feature a rule depends on, or reject with an insufficient-data rationale.
pub(crate) fn require(value: Option<f64>, what: &str) -> Result<f64, String> {
    value.ok_or_else(|| format!("insufficient data: {what} not yet available"))
}

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct GateParams {
    pub global: GlobalParams,
    pub trending: TrendingParams,
    pub range_bound: RangeBoundParams,
}

impl GateParams {
    pub fn validate(&self) -> Result<(), String> {
        self.global.validate()?;
        self.trending.validate()?;
        self.range_bound.validate()
    }
}

#[derive(Debug, Clone, Default)]
pub struct AdmissionGate {
    params: GateParams,
}

impl AdmissionGate {
    pub fn new(params: GateParams) -> Self {
        Self { params }
    }

    pub fn params(&self) -> &GateParams {
        &self.params
    }

    pub fn evaluate(&self, features: &FeatureVector, regime: &RegimeLabel) -> GateDecision {
        if let Err(reason) = global::check(features, &self.params.global) {
            return GateDecision::reject(GateStage::Global, reason);
        }

        let branch = match regime {
            RegimeLabel::Trending => trending::check(features, &self.params.trending)
                .map_err(|r| (GateStage::Trending, r)),
            RegimeLabel::RangeBound => range_bound::check(features, &self.params.range_bound)
                .map_err(|r| (GateStage::RangeBound, r)),
            RegimeLabel::Unrecognized(label) => Err((
                GateStage::Regime,
                format!("unrecognized regime '{label}'"),
            )),
        };

        match branch {
            Ok(()) => GateDecision::Admit,
            Err((stage, reason)) => GateDecision::reject(stage, reason),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::components::regime::sample_features;

    #[test]
    fn global_filter_precedes_regime_branch() {
        let gate = AdmissionGate::default();
        let mut fv = sample_features();
        fv.vix = 10.0;
        for regime in [
            RegimeLabel::Trending,
            RegimeLabel::RangeBound,
            RegimeLabel::Unrecognized("x".into()),
        ] {
            match gate.evaluate(&fv, &regime) {
                GateDecision::Reject { stage, reason } => {
                    assert_eq!(stage, GateStage::Global);
                    assert!(reason.contains("premiums too thin"));
                }
                GateDecision::Admit => panic!("admitted with VIX below floor"),
            }
        }
    }

    #[test]
    fn unrecognized_regime_rejected() {
        let gate = AdmissionGate::default();
        let d = gate.evaluate(&sample_features(), &RegimeLabel::Unrecognized("choppy".into()));
        assert_eq!(
            d,
            GateDecision::reject(GateStage::Regime, "unrecognized regime 'choppy'")
        );
    }

    #[test]
    fn range_branch_selected() {
        let gate = AdmissionGate::default();
        // sample vector sits mid-band with RSI 50
        let d = gate.evaluate(&sample_features(), &RegimeLabel::RangeBound);
        match d {
            GateDecision::Reject { stage, reason } => {
                assert_eq!(stage, GateStage::RangeBound);
                assert!(reason.contains("middle of range"));
            }
            GateDecision::Admit => panic!("expected rejection"),
        }
    }

    #[test]
    fn trending_admits_exhausted_move() {
        let gate = AdmissionGate::default();
        let mut fv = sample_features();
        fv.rsi = Some(71.0);
        assert!(gate.evaluate(&fv, &RegimeLabel::Trending).is_admitted());
    }

    #[test]
    fn default_params_validate() {
        assert!(GateParams::default().validate().is_ok());
    }
}
