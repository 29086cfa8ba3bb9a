//! Phase 2, trending branch: fade only exhausted moves.

use serde::{Deserialize, Serialize};

use super::require;
use crate::domain::FeatureVector;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TrendingParams {
    pub max_abs_ret_5m_pct: f64,
    pub max_abs_ret_15m_pct: f64,
    /// EMA21 points per minute over the 15-minute horizon.
    pub max_abs_slope_15m: f64,
    /// RSI strictly inside (low, high) carries no directional edge.
    pub rsi_neutral_low: f64,
    pub rsi_neutral_high: f64,
    pub min_premium_ratio: f64,
}

impl Default for TrendingParams {
    fn default() -> Self {
        Self {
            max_abs_ret_5m_pct: 0.15,
            max_abs_ret_15m_pct: 0.35,
            max_abs_slope_15m: 0.50,
            rsi_neutral_low: 40.0,
            rsi_neutral_high: 60.0,
            min_premium_ratio: 0.10,
        }
    }
}

impl TrendingParams {
    pub fn validate(&self) -> Result<(), String> {
        if self.rsi_neutral_low >= self.rsi_neutral_high {
            return Err("trending rsi_neutral_low must be below rsi_neutral_high".into());
        }
        Ok(())
    }
}

pub fn check(fv: &FeatureVector, p: &TrendingParams) -> Result<(), String> {
    let ret_5m = require(fv.ret_5m_pct, "5m return")?;
    if ret_5m.abs() > p.max_abs_ret_5m_pct {
        return Err(format!(
            "5m return {ret_5m:+.3}% exceeds {:.3}%: momentum too strong to fade",
            p.max_abs_ret_5m_pct
        ));
    }
    let ret_15m = require(fv.ret_15m_pct, "15m return")?;
    if ret_15m.abs() > p.max_abs_ret_15m_pct {
        return Err(format!(
            "15m return {ret_15m:+.3}% exceeds {:.3}%: momentum too strong to fade",
            p.max_abs_ret_15m_pct
        ));
    }

    let slope = require(fv.ema21_slope_15m, "15m EMA21 slope")?;
    if slope.abs() > p.max_abs_slope_15m {
        return Err(format!(
            "EMA21 slope {slope:+.3}/min steeper than {:.3}: trend not exhausted",
            p.max_abs_slope_15m
        ));
    }

    let rsi = require(fv.rsi, "RSI")?;
    if rsi > p.rsi_neutral_low && rsi < p.rsi_neutral_high {
        return Err(format!(
            "RSI {rsi:.1} in neutral band ({:.0}-{:.0}): weak directional edge",
            p.rsi_neutral_low, p.rsi_neutral_high
        ));
    }

    let ratio = require(fv.premium_ratio, "premium ratio")?;
    if ratio < p.min_premium_ratio {
        return Err(format!(
            "premium ratio {ratio:.3} below {:.3}: directional skew suspected",
            p.min_premium_ratio
        ));
    }

    Ok(())
}
