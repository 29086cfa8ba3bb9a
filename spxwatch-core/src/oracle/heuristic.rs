//! Local rule-based oracle encoding the regime playbook.
//!
//! Range-bound days assume mean reversion: a stretched upper band with
//! RSI above 60 favours SELL_CALL, a stretched lower band with RSI below 40
//! favours SELL_PUT. Trending days trade exhaustion only: overbought or
//! oversold with a decelerating EMA21 slope. Strong momentum means wait for
//! a pullback. Conflicting signals return NONE.

use serde::{Deserialize, Serialize};

use super::{validated, DecisionOracle, OracleError, OracleRequest};
use crate::domain::{FeatureVector, RegimeLabel, TradeAction, TradeDecision};

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HeuristicParams {
    /// Band position at or above which price is "near the upper band".
    pub upper_band_zone: f64,
    /// Band position at or below which price is "near the lower band".
    pub lower_band_zone: f64,
    pub range_rsi_call: f64,
    pub range_rsi_put: f64,
    pub trend_rsi_overbought: f64,
    pub trend_rsi_oversold: f64,
    /// Confidence of a bare qualifying setup, before confirmations.
    pub base_confidence: f64,
    pub max_confidence: f64,
}

impl Default for HeuristicParams {
    fn default() -> Self {
        Self {
            upper_band_zone: 0.8,
            lower_band_zone: 0.2,
            range_rsi_call: 60.0,
            range_rsi_put: 40.0,
            trend_rsi_overbought: 70.0,
            trend_rsi_oversold: 30.0,
            base_confidence: 0.6,
            max_confidence: 0.95,
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct HeuristicOracle {
    params: HeuristicParams,
}

/// Indicators every rule needs; absent ones mean "no call".
struct Inputs {
    rsi: f64,
    band_position: f64,
    macd_hist: f64,
    slope_5m: f64,
    slope_30m: f64,
}

impl Inputs {
    fn from(fv: &FeatureVector) -> Option<Self> {
        Some(Self {
            rsi: fv.rsi?,
            band_position: fv.band_position?,
            macd_hist: fv.macd_hist?,
            slope_5m: fv.ema21_slope_5m?,
            slope_30m: fv.ema21_slope_30m?,
        })
    }
}

fn round2(v: f64) -> f64 {
    (v * 100.0).round() / 100.0
}

impl HeuristicOracle {
    pub fn new(params: HeuristicParams) -> Self {
        Self { params }
    }

    fn finish(&self, trade: TradeAction, score: f64, reasons: Vec<String>) -> TradeDecision {
        let confidence = round2((self.params.base_confidence + score).min(self.params.max_confidence));
        TradeDecision {
            trade: Some(trade),
            confidence,
            reasons,
            risk_flags: Vec::new(),
        }
    }

    fn range_bound(&self, x: &Inputs) -> TradeDecision {
        let p = &self.params;
        let near_upper = x.band_position >= p.upper_band_zone;
        let near_lower = x.band_position <= p.lower_band_zone;

        if near_upper && x.rsi > p.range_rsi_call {
            let mut reasons = vec![
                format!("price near upper band (position {:.2})", x.band_position),
                format!("RSI {:.1} above {:.0}", x.rsi, p.range_rsi_call),
            ];
            let rsi_edge = ((x.rsi - p.range_rsi_call) / 15.0).clamp(0.0, 1.0);
            let band_edge = ((x.band_position - p.upper_band_zone) / 0.4).clamp(0.0, 1.0);
            let mut score = 0.15 * rsi_edge + 0.1 * band_edge;
            if x.macd_hist < 0.0 {
                reasons.push("MACD histogram rolling over".into());
                score += 0.1;
            }
            return self.finish(TradeAction::SellCall, score, reasons);
        }

        if near_lower && x.rsi < p.range_rsi_put {
            let mut reasons = vec![
                format!("price near lower band (position {:.2})", x.band_position),
                format!("RSI {:.1} below {:.0}", x.rsi, p.range_rsi_put),
            ];
            let rsi_edge = ((p.range_rsi_put - x.rsi) / 15.0).clamp(0.0, 1.0);
            let band_edge = ((p.lower_band_zone - x.band_position) / 0.4).clamp(0.0, 1.0);
            let mut score = 0.15 * rsi_edge + 0.1 * band_edge;
            if x.macd_hist > 0.0 {
                reasons.push("MACD histogram turning up".into());
                score += 0.1;
            }
            return self.finish(TradeAction::SellPut, score, reasons);
        }

        if near_upper || near_lower {
            return TradeDecision::no_trade(
                0.5,
                vec!["band stretch not confirmed by RSI: signals conflict".into()],
            );
        }
        TradeDecision::no_trade(0.6, vec!["no band-edge setup".into()])
    }

    fn trending(&self, x: &Inputs) -> TradeDecision {
        let p = &self.params;
        let overbought = x.rsi >= p.trend_rsi_overbought;
        let oversold = x.rsi <= p.trend_rsi_oversold;
        if !overbought && !oversold {
            return TradeDecision::no_trade(0.6, vec!["trend not stretched; no exhaustion".into()]);
        }

        // Short-horizon slope flatter than (or against) the 30-minute slope.
        let decelerating = x.slope_5m.abs() < x.slope_30m.abs() || x.slope_5m * x.slope_30m < 0.0;
        if !decelerating {
            return TradeDecision::no_trade(
                0.55,
                vec!["momentum still accelerating: wait for pullback".into()],
            );
        }

        let (trade, rsi_edge, fading) = if overbought {
            (
                TradeAction::SellCall,
                (x.rsi - p.trend_rsi_overbought) / 15.0,
                x.macd_hist < 0.0,
            )
        } else {
            (
                TradeAction::SellPut,
                (p.trend_rsi_oversold - x.rsi) / 15.0,
                x.macd_hist > 0.0,
            )
        };
        let mut reasons = vec![
            format!(
                "RSI {:.1} {}",
                x.rsi,
                if overbought { "overbought" } else { "oversold" }
            ),
            format!(
                "EMA21 slope decelerating ({:+.3}/min vs {:+.3}/min over 30m)",
                x.slope_5m, x.slope_30m
            ),
        ];
        let mut score = 0.15 * rsi_edge.clamp(0.0, 1.0);
        if fading {
            reasons.push("MACD histogram confirms fading momentum".into());
            score += 0.1;
        }
        self.finish(trade, score, reasons)
    }
}

impl DecisionOracle for HeuristicOracle {
    fn name(&self) -> &str {
        "heuristic"
    }

    fn decide(&self, request: &OracleRequest) -> Result<TradeDecision, OracleError> {
        let Some(inputs) = Inputs::from(&request.features) else {
            return validated(TradeDecision::no_trade(
                0.0,
                vec!["indicators still warming up".into()],
            ));
        };

        let decision = match &request.regime {
            RegimeLabel::RangeBound => self.range_bound(&inputs),
            RegimeLabel::Trending => self.trending(&inputs),
            RegimeLabel::Unrecognized(label) => {
                TradeDecision::no_trade(0.0, vec![format!("no playbook for regime '{label}'")])
            }
        };
        validated(decision)
    }
}
