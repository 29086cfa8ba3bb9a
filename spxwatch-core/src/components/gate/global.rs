//! Phase 1: regime-independent filters: volatility regime and time of day.

use serde::{Deserialize, Serialize};

use crate::domain::FeatureVector;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GlobalParams {
    pub vix_floor: f64,
    pub vix_ceiling: f64,
    /// More minutes than this until close is too early in the session.
    pub max_minutes_to_close: i64,
    /// Fewer minutes than this until close is too late in the session.
    pub min_minutes_to_close: i64,
}

impl Default for GlobalParams {
    fn default() -> Self {
        Self {
            vix_floor: 12.0,
            vix_ceiling: 30.0,
            max_minutes_to_close: 330,
            min_minutes_to_close: 90,
        }
    }
}

impl GlobalParams {
    pub fn validate(&self) -> Result<(), String> {
        if !(self.vix_floor < self.vix_ceiling) {
            return Err(format!(
                "vix_floor ({}) must be below vix_ceiling ({})",
                self.vix_floor, self.vix_ceiling
            ));
        }
        if self.min_minutes_to_close > self.max_minutes_to_close {
            return Err(format!(
                "min_minutes_to_close ({}) exceeds max_minutes_to_close ({})",
                self.min_minutes_to_close, self.max_minutes_to_close
            ));
        }
        Ok(())
    }
}

/// Err carries the rejection rationale. Checks run in order.
pub fn check(fv: &FeatureVector, p: &GlobalParams) -> Result<(), String> {
    if !fv.vix.is_finite() {
        return Err("insufficient data: VIX missing".into());
    }
    if fv.vix < p.vix_floor {
        return Err(format!(
            "VIX {:.2} below floor {:.2}: premiums too thin",
            fv.vix, p.vix_floor
        ));
    }
    if fv.vix > p.vix_ceiling {
        return Err(format!(
            "VIX {:.2} above ceiling {:.2}: gap risk too high",
            fv.vix, p.vix_ceiling
        ));
    }
    if fv.minutes_to_close > p.max_minutes_to_close {
        return Err(format!(
            "{} min to close: too early in the session (max {})",
            fv.minutes_to_close, p.max_minutes_to_close
        ));
    }
    if fv.minutes_to_close < p.min_minutes_to_close {
        return Err(format!(
            "{} min to close: too late in the session (min {})",
            fv.minutes_to_close, p.min_minutes_to_close
        ));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::components::regime::sample_features;

    #[test]
    fn passes_inside_all_bounds() {
        assert!(check(&sample_features(), &GlobalParams::default()).is_ok());
    }

    #[test]
    fn vix_floor() {
        let mut fv = sample_features();
        fv.vix = 10.0;
        let reason = check(&fv, &GlobalParams::default()).unwrap_err();
        assert!(reason.contains("premiums too thin"), "{reason}");
    }

    #[test]
    fn vix_ceiling() {
        let mut fv = sample_features();
        fv.vix = 35.0;
        let reason = check(&fv, &GlobalParams::default()).unwrap_err();
        assert!(reason.contains("gap risk too high"), "{reason}");
    }

    #[test]
    fn vix_at_bounds_passes() {
        let p = GlobalParams::default();
        let mut fv = sample_features();
        fv.vix = p.vix_floor;
        assert!(check(&fv, &p).is_ok());
        fv.vix = p.vix_ceiling;
        assert!(check(&fv, &p).is_ok());
    }

    #[test]
    fn session_timing() {
        let p = GlobalParams::default();
        let mut fv = sample_features();
        fv.minutes_to_close = 360;
        assert!(check(&fv, &p).unwrap_err().contains("too early"));
        fv.minutes_to_close = 45;
        assert!(check(&fv, &p).unwrap_err().contains("too late"));
    }

    #[test]
    fn vix_checked_before_timing() {
        let mut fv = sample_features();
        fv.vix = 40.0;
        fv.minutes_to_close = 10;
        assert!(check(&fv, &GlobalParams::default())
            .unwrap_err()
            .contains("gap risk"));
    }

    #[test]
    fn validate_rejects_inverted_bounds() {
        let p = GlobalParams {
            vix_floor: 30.0,
            vix_ceiling: 12.0,
            ..GlobalParams::default()
        };
        assert!(p.validate().is_err());
        assert!(GlobalParams::default().validate().is_ok());
    }
}
