//! Observation: one timestamped market snapshot.

use chrono::{DateTime, FixedOffset, Timelike};
use serde::{Deserialize, Serialize};

/// A single market snapshot as delivered by a data provider.
///
/// Timestamps carry the exchange-local offset (America/New_York) so that
/// minute-of-day arithmetic matches the session clock.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Observation {
    pub timestamp: DateTime<FixedOffset>,
    /// Index level (SPX).
    pub price: f64,
    /// Implied expected move for the session, in index points.
    pub expected_move: f64,
    /// Aggregate bid of out-of-the-money 0-DTE options.
    pub otm_premium: f64,
    /// Volatility index level (VIX).
    pub vix: f64,
}

impl Observation {
    pub fn new(
        timestamp: DateTime<FixedOffset>,
        price: f64,
        expected_move: f64,
        otm_premium: f64,
        vix: f64,
    ) -> Self {
        Self {
            timestamp,
            price,
            expected_move,
            otm_premium,
            vix,
        }
    }

    /// Minutes since local midnight.
    pub fn minute_of_day(&self) -> i64 {
        i64::from(self.timestamp.hour()) * 60 + i64::from(self.timestamp.minute())
    }

    /// Returns true if any numeric field is NaN or infinite.
    pub fn is_void(&self) -> bool {
        !(self.price.is_finite()
            && self.expected_move.is_finite()
            && self.otm_premium.is_finite()
            && self.vix.is_finite())
    }
}
