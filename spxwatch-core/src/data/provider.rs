//! Observation provider trait and structured error types.
//!
//! The ObservationProvider trait abstracts over data sources (the snapshot
//! HTTP API, CSV replay files) so the monitor can swap implementations and
//! tests can inject deterministic feeds.

use std::fmt;
use std::path::PathBuf;

use chrono::{DateTime, FixedOffset, NaiveDate, NaiveTime};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::domain::Observation;

use super::session::{market_datetime, today_in_market};

/// Structured error types for data operations.
#[derive(Debug, Error)]
pub enum DataError {
    #[error("network unreachable: {0}")]
    NetworkUnreachable(String),

    #[error("rate limited by provider (retry after {retry_after_secs}s)")]
    RateLimited { retry_after_secs: u64 },

    #[error("provider returned HTTP {status}")]
    HttpStatus { status: u16 },

    #[error("response format changed: {0}")]
    ResponseFormatChanged(String),

    #[error("hard stop: provider is refusing requests (circuit breaker tripped)")]
    CircuitBreakerTripped,

    #[error("cannot read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("malformed CSV: {0}")]
    Csv(String),

    #[error("provider setup failed: {0}")]
    Setup(String),
}

/// Which trading day to fetch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FetchTarget {
    /// The current session.
    Live,
    Date(NaiveDate),
}

impl FetchTarget {
    /// Calendar date this target resolves to in exchange-local time.
    pub fn resolve_date(&self) -> NaiveDate {
        match self {
            FetchTarget::Live => today_in_market(),
            FetchTarget::Date(d) => *d,
        }
    }
}

impl fmt::Display for FetchTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FetchTarget::Live => f.write_str("live"),
            FetchTarget::Date(d) => write!(f, "{}", d.format("%Y-%m-%d")),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FetchRequest {
    /// Grid spacing; off-grid samples are dropped.
    pub interval_min: u32,
    pub target: FetchTarget,
    /// Drop samples later than this wall-clock time on the target date.
    pub cutoff: Option<NaiveTime>,
}

impl FetchRequest {
    pub fn new(interval_min: u32, target: FetchTarget) -> Self {
        Self {
            interval_min,
            target,
            cutoff: None,
        }
    }

    pub fn with_cutoff(mut self, cutoff: Option<NaiveTime>) -> Self {
        self.cutoff = cutoff;
        self
    }

    /// The cutoff as an exchange-local instant, if one is set.
    pub fn cutoff_instant(&self) -> Option<DateTime<FixedOffset>> {
        self.cutoff
            .and_then(|t| market_datetime(self.target.resolve_date(), t))
    }
}

/// Trait for snapshot sources.
///
/// `fetch` returns observations in ascending timestamp order, already reduced
/// to the request's grid and cutoff. An empty vector is a valid answer.
pub trait ObservationProvider: Send + Sync {
    /// Human-readable name of this provider.
    fn name(&self) -> &str;

    fn fetch(&self, request: &FetchRequest) -> Result<Vec<Observation>, DataError>;

    /// Check if the provider is currently available (not rate-limited, not blocked).
    fn is_available(&self) -> bool {
        true
    }
}
