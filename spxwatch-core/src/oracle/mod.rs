//! Decision oracle: the external judge consulted for admitted snapshots.
//!
//! The monitor only ever sees the trait. Responses are validated here so that
//! a malformed decision (confidence outside [0, 1], unknown trade tag) is an
//! [`OracleError`] rather than a silently-accepted recommendation.

pub mod heuristic;
pub mod http;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::domain::{FeatureVector, RegimeLabel, TradeDecision};

pub use heuristic::{HeuristicOracle, HeuristicParams};
pub use http::{HttpOracle, HttpOracleConfig};

#[derive(Debug, Error)]
pub enum OracleError {
    #[error("oracle unreachable: {0}")]
    Transport(String),

    #[error("oracle returned HTTP {status}")]
    HttpStatus { status: u16 },

    #[error("malformed oracle response: {0}")]
    Malformed(String),

    #[error("oracle setup failed: {0}")]
    Setup(String),
}

/// What the oracle is asked to judge.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OracleRequest {
    pub features: FeatureVector,
    pub regime: RegimeLabel,
}

impl OracleRequest {
    pub fn new(features: FeatureVector, regime: RegimeLabel) -> Self {
        Self { features, regime }
    }
}

pub trait DecisionOracle: Send {
    fn name(&self) -> &str;

    fn decide(&self, request: &OracleRequest) -> Result<TradeDecision, OracleError>;
}

/// Reject structurally invalid decisions.
pub fn validated(decision: TradeDecision) -> Result<TradeDecision, OracleError> {
    decision.validate().map_err(OracleError::Malformed)?;
    Ok(decision)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::TradeAction;

    #[test]
    fn out_of_range_confidence_is_malformed() {
        let d = TradeDecision {
            trade: Some(TradeAction::SellPut),
            confidence: 1.4,
            reasons: vec![],
            risk_flags: vec![],
        };
        assert!(matches!(validated(d), Err(OracleError::Malformed(_))));
        assert!(validated(TradeDecision::no_trade(0.0, vec![])).is_ok());
    }

    #[test]
    fn request_serializes_regime_as_label() {
        let req = OracleRequest::new(
            crate::components::regime::sample_features(),
            RegimeLabel::RangeBound,
        );
        let json = serde_json::to_value(&req).unwrap();
        assert_eq!(json["regime"], "range_bound");
        assert_eq!(json["features"]["price"], 6000.0);
    }
}
