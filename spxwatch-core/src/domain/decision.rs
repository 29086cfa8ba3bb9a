//! Oracle decisions and gate decisions.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Trade recommended by the decision oracle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TradeAction {
    #[serde(rename = "SELL_CALL")]
    SellCall,
    #[serde(rename = "SELL_PUT")]
    SellPut,
    #[serde(rename = "NONE")]
    NoTrade,
}

impl TradeAction {
    pub fn as_str(&self) -> &'static str {
        match self {
            TradeAction::SellCall => "SELL_CALL",
            TradeAction::SellPut => "SELL_PUT",
            TradeAction::NoTrade => "NONE",
        }
    }

    /// True for recommendations that can become an alert.
    pub fn is_actionable(&self) -> bool {
        !matches!(self, TradeAction::NoTrade)
    }
}

impl fmt::Display for TradeAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Structured response from the decision oracle.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TradeDecision {
    #[serde(default)]
    pub trade: Option<TradeAction>,
    pub confidence: f64,
    #[serde(default)]
    pub reasons: Vec<String>,
    #[serde(default)]
    pub risk_flags: Vec<String>,
}

impl TradeDecision {
    /// A "no setup" decision with the given reasons.
    pub fn no_trade(confidence: f64, reasons: Vec<String>) -> Self {
        Self {
            trade: Some(TradeAction::NoTrade),
            confidence,
            reasons,
            risk_flags: Vec::new(),
        }
    }

    /// The recommended trade when it is actionable (SELL_CALL / SELL_PUT).
    pub fn actionable_trade(&self) -> Option<TradeAction> {
        self.trade.filter(TradeAction::is_actionable)
    }

    /// Check structural validity: confidence must be a finite value in [0, 1].
    pub fn validate(&self) -> Result<(), String> {
        if !self.confidence.is_finite() || !(0.0..=1.0).contains(&self.confidence) {
            return Err(format!(
                "confidence {} is outside [0, 1]",
                self.confidence
            ));
        }
        Ok(())
    }

    pub fn trade_label(&self) -> &'static str {
        self.trade.map_or("", |t| t.as_str())
    }
}

/// Which rule phase produced a gate rejection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GateStage {
    Global,
    Trending,
    RangeBound,
    Regime,
}

impl fmt::Display for GateStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            GateStage::Global => "global",
            GateStage::Trending => "trending",
            GateStage::RangeBound => "range_bound",
            GateStage::Regime => "regime",
        };
        f.write_str(s)
    }
}

/// Outcome of the admission gate for one snapshot.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum GateDecision {
    Admit,
    Reject { stage: GateStage, reason: String },
}

impl GateDecision {
    pub fn reject(stage: GateStage, reason: impl Into<String>) -> Self {
        GateDecision::Reject {
            stage,
            reason: reason.into(),
        }
    }

    pub fn is_admitted(&self) -> bool {
        matches!(self, GateDecision::Admit)
    }

    /// Human-readable rationale for logs and notifications.
    pub fn rationale(&self) -> &str {
        match self {
            GateDecision::Admit => "admitted",
            GateDecision::Reject { reason, .. } => reason,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decision_parses_oracle_json() {
        let json = r#"{
            "trade": "SELL_CALL",
            "confidence": 0.8,
            "reasons": ["near upper band", "RSI 68"],
            "risk_flags": ["FOMC at 14:00"]
        }"#;
        let decision: TradeDecision = serde_json::from_str(json).unwrap();
        assert_eq!(decision.trade, Some(TradeAction::SellCall));
        assert_eq!(decision.reasons.len(), 2);
        assert!(decision.validate().is_ok());
    }

    #[test]
    fn missing_trade_is_absent() {
        let decision: TradeDecision = serde_json::from_str(r#"{"confidence": 0.2}"#).unwrap();
        assert_eq!(decision.trade, None);
        assert_eq!(decision.actionable_trade(), None);
        assert!(decision.reasons.is_empty());
    }

    #[test]
    fn unknown_trade_tag_is_malformed() {
        let parsed = serde_json::from_str::<TradeDecision>(
            r#"{"trade": "BUY_STRADDLE", "confidence": 0.9}"#,
        );
        assert!(parsed.is_err());
    }

    #[test]
    fn confidence_out_of_range_fails_validation() {
        let decision = TradeDecision::no_trade(1.4, vec![]);
        assert!(decision.validate().is_err());
        let decision = TradeDecision::no_trade(f64::NAN, vec![]);
        assert!(decision.validate().is_err());
    }

    #[test]
    fn none_is_not_actionable() {
        let decision = TradeDecision::no_trade(0.9, vec!["conflicting".into()]);
        assert_eq!(decision.actionable_trade(), None);
    }

    #[test]
    fn gate_rationale() {
        let d = GateDecision::reject(GateStage::Global, "premiums too thin");
        assert!(!d.is_admitted());
        assert_eq!(d.rationale(), "premiums too thin");
        assert_eq!(GateDecision::Admit.rationale(), "admitted");
    }
}
