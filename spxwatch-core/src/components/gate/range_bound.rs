//! Phase 2, range-bound branch: mean reversion from a stretched band edge.

use serde::{Deserialize, Serialize};

use super::require;
use crate::domain::FeatureVector;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RangeBoundParams {
    pub max_abs_ret_5m_pct: f64,
    pub max_abs_ret_15m_pct: f64,
    pub max_abs_slope_15m: f64,
    /// RSI at or beyond these levels signals a possible breakout.
    pub rsi_extreme_low: f64,
    pub rsi_extreme_high: f64,
    /// Band positions strictly inside (low, high) have no mean-reversion edge.
    pub dead_zone_low: f64,
    pub dead_zone_high: f64,
    pub rsi_neutral_low: f64,
    pub rsi_neutral_high: f64,
    pub min_premium_ratio: f64,
}

impl Default for RangeBoundParams {
    fn default() -> Self {
        Self {
            max_abs_ret_5m_pct: 0.10,
            max_abs_ret_15m_pct: 0.20,
            max_abs_slope_15m: 0.25,
            rsi_extreme_low: 25.0,
            rsi_extreme_high: 75.0,
            dead_zone_low: 0.35,
            dead_zone_high: 0.65,
            rsi_neutral_low: 45.0,
            rsi_neutral_high: 55.0,
            min_premium_ratio: 0.07,
        }
    }
}

impl RangeBoundParams {
    pub fn validate(&self) -> Result<(), String> {
        if !(0.0 <= self.dead_zone_low
            && self.dead_zone_low < self.dead_zone_high
            && self.dead_zone_high <= 1.0)
        {
            return Err(format!(
                "dead zone ({}, {}) must satisfy 0 <= low < high <= 1",
                self.dead_zone_low, self.dead_zone_high
            ));
        }
        if self.rsi_extreme_low >= self.rsi_extreme_high {
            return Err("range rsi_extreme_low must be below rsi_extreme_high".into());
        }
        if self.rsi_neutral_low >= self.rsi_neutral_high {
            return Err("range rsi_neutral_low must be below rsi_neutral_high".into());
        }
        Ok(())
    }
}

pub fn check(fv: &FeatureVector, p: &RangeBoundParams) -> Result<(), String> {
    let ret_5m = require(fv.ret_5m_pct, "5m return")?;
    if ret_5m.abs() > p.max_abs_ret_5m_pct {
        return Err(format!(
            "5m return {ret_5m:+.3}% beyond {:.3}%: possible breakout",
            p.max_abs_ret_5m_pct
        ));
    }
    let ret_15m = require(fv.ret_15m_pct, "15m return")?;
    if ret_15m.abs() > p.max_abs_ret_15m_pct {
        return Err(format!(
            "15m return {ret_15m:+.3}% beyond {:.3}%: possible breakout",
            p.max_abs_ret_15m_pct
        ));
    }

    let slope = require(fv.ema21_slope_15m, "15m EMA21 slope")?;
    if slope.abs() > p.max_abs_slope_15m {
        return Err(format!(
            "EMA21 slope {slope:+.3}/min above range ceiling {:.3}",
            p.max_abs_slope_15m
        ));
    }

    let rsi = require(fv.rsi, "RSI")?;
    if rsi <= p.rsi_extreme_low || rsi >= p.rsi_extreme_high {
        return Err(format!("RSI {rsi:.1} at an extreme: possible breakout"));
    }

    let position = require(fv.band_position, "band position")?;
    if position > p.dead_zone_low && position < p.dead_zone_high {
        return Err(format!(
            "price in middle of range (band position {position:.2}): no mean-reversion edge"
        ));
    }

    if rsi > p.rsi_neutral_low && rsi < p.rsi_neutral_high {
        return Err(format!(
            "RSI {rsi:.1} too neutral ({:.0}-{:.0})",
            p.rsi_neutral_low, p.rsi_neutral_high
        ));
    }

    let ratio = require(fv.premium_ratio, "premium ratio")?;
    if ratio < p.min_premium_ratio {
        return Err(format!(
            "premium ratio {ratio:.3} compressed below {:.3} even for a range day",
            p.min_premium_ratio
        ));
    }

    Ok(())
}
