//! Alert de-duplication: a two-state cooldown machine.
//!
//! ```text
//!            confident actionable trade
//!   Armed ───────────────────────────────▶ Cooling
//!     ▲                                       │
//!     └──── elapsed >= cooldown (lazy check) ─┘
//! ```
//!
//! Elapsed time is measured between observation timestamps, never the wall
//! clock, so replays behave exactly like live sessions. The persisted record
//! is written on every alert and deleted at the Cooling → Armed transition.

use chrono::{DateTime, FixedOffset};
use serde::{Deserialize, Serialize};

use crate::domain::{TradeAction, TradeDecision};
use crate::state::{load_or_cold_start, AlertState, AlertStore, StateError};

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CooldownParams {
    #[serde(alias = "minutes")]
    pub cooldown_minutes: i64,
    /// Minimum oracle confidence for an admitted recommendation to alert.
    pub confidence_threshold: f64,
    /// When set, a new alert in the same direction as the previous one also
    /// needs price to have moved more than this many points.
    pub price_tolerance_points: Option<f64>,
}

impl Default for CooldownParams {
    fn default() -> Self {
        Self {
            cooldown_minutes: 25,
            confidence_threshold: 0.7,
            price_tolerance_points: None,
        }
    }
}

impl CooldownParams {
    pub fn validate(&self) -> Result<(), String> {
        if self.cooldown_minutes < 0 {
            return Err("cooldown_minutes must be >= 0".into());
        }
        if !(0.0..=1.0).contains(&self.confidence_threshold) {
            return Err(format!(
                "confidence_threshold {} must be within [0, 1]",
                self.confidence_threshold
            ));
        }
        if let Some(tol) = self.price_tolerance_points {
            if !(tol >= 0.0) {
                return Err("price_tolerance_points must be >= 0".into());
            }
        }
        Ok(())
    }
}

/// Result of the once-per-iteration cooldown check.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum CooldownCheck {
    /// No recent alert.
    Armed,
    /// The cooldown just elapsed; persisted state has been cleared.
    Rearmed { elapsed_min: f64 },
    /// Still inside the cooldown window; skip the oracle entirely.
    Cooling { elapsed_min: f64, remaining_min: f64 },
}

impl CooldownCheck {
    pub fn is_cooling(&self) -> bool {
        matches!(self, CooldownCheck::Cooling { .. })
    }
}

/// Whether an oracle decision becomes an alert.
#[derive(Debug, Clone, PartialEq)]
pub enum AlertVerdict {
    Fire(TradeAction),
    NoTrade,
    BelowConfidence { confidence: f64, threshold: f64 },
    WithinPriceTolerance { moved: f64, tolerance: f64 },
    Cooling,
}

impl AlertVerdict {
    pub fn fires(&self) -> bool {
        matches!(self, AlertVerdict::Fire(_))
    }
}

/// Price and direction of the most recent alert, kept across re-arming.
#[derive(Debug, Clone, Copy, PartialEq)]
struct PriceReference {
    /// Unknown when the reference was restored from a persisted record.
    trade: Option<TradeAction>,
    price: f64,
}

pub struct AlertDeduplicator {
    params: CooldownParams,
    state: AlertState,
    store: Box<dyn AlertStore>,
    reference: Option<PriceReference>,
}

impl AlertDeduplicator {
    /// Load state from `store`; unreadable records start cold.
    pub fn new(params: CooldownParams, store: Box<dyn AlertStore>) -> Self {
        let state = load_or_cold_start(store.as_ref());
        Self::with_state(params, state, store)
    }

    pub fn with_state(params: CooldownParams, state: AlertState, store: Box<dyn AlertStore>) -> Self {
        let reference = state.last_alert_price.map(|price| PriceReference { trade: None, price });
        Self {
            params,
            state,
            store,
            reference,
        }
    }

    pub fn params(&self) -> &CooldownParams {
        &self.params
    }

    pub fn state(&self) -> &AlertState {
        &self.state
    }

    pub fn is_cooling(&self) -> bool {
        !self.state.is_cold()
    }

    /// Lazily re-arm when the cooldown has elapsed at observation time `now`.
    pub fn check_cooldown(&mut self, now: DateTime<FixedOffset>) -> CooldownCheck {
        let Some(last) = self.state.last_alert_time else {
            return CooldownCheck::Armed;
        };

        let elapsed_min = (now - last).num_seconds() as f64 / 60.0;
        let cooldown = self.params.cooldown_minutes as f64;
        if elapsed_min < cooldown {
            return CooldownCheck::Cooling {
                elapsed_min,
                remaining_min: cooldown - elapsed_min,
            };
        }

        self.state = AlertState::default();
        if let Err(e) = self.store.clear() {
            tracing::warn!(error = %e, "failed to clear persisted alert state");
        }
        tracing::info!(elapsed_min, "cooldown passed; alerts re-armed");
        CooldownCheck::Rearmed { elapsed_min }
    }

    /// Decide whether `decision` at `price` should alert. Does not change state.
    pub fn evaluate(&self, decision: &TradeDecision, price: f64) -> AlertVerdict {
        if self.is_cooling() {
            return AlertVerdict::Cooling;
        }
        let Some(trade) = decision.actionable_trade() else {
            return AlertVerdict::NoTrade;
        };
        if decision.confidence < self.params.confidence_threshold {
            return AlertVerdict::BelowConfidence {
                confidence: decision.confidence,
                threshold: self.params.confidence_threshold,
            };
        }
        if let (Some(tolerance), Some(reference)) =
            (self.params.price_tolerance_points, self.reference)
        {
            let same_direction = reference.trade.map_or(true, |t| t == trade);
            let moved = (price - reference.price).abs();
            if same_direction && moved <= tolerance {
                return AlertVerdict::WithinPriceTolerance { moved, tolerance };
            }
        }
        AlertVerdict::Fire(trade)
    }

    /// Armed → Cooling. In-memory state changes even if persisting fails.
    pub fn record_alert(
        &mut self,
        trade: TradeAction,
        at: DateTime<FixedOffset>,
        price: f64,
    ) -> Result<(), StateError> {
        self.state = AlertState::new(at, price);
        self.reference = Some(PriceReference {
            trade: Some(trade),
            price,
        });
        self.store.save(&self.state)
    }

    /// Drop the cooldown immediately (operator reset).
    pub fn reset(&mut self) -> Result<(), StateError> {
        self.state = AlertState::default();
        self.reference = None;
        self.store.clear()
    }
}

impl std::fmt::Debug for AlertDeduplicator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AlertDeduplicator")
            .field("params", &self.params)
            .field("state", &self.state)
            .field("reference", &self.reference)
            .finish_non_exhaustive()
    }
}
