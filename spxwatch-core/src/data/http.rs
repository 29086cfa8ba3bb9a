//! Snapshot HTTP provider.
//!
//! Issues `GET <url>?<params>&date=<YYYY-MM-DD|live>&interval=<source interval>`
//! and expects a JSON array of snapshots. Numeric fields may arrive as numbers
//! or numeric strings. `dateTime` is epoch seconds (UTC) and is converted to
//! exchange-local time before grid reduction.

use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use super::circuit_breaker::CircuitBreaker;
use super::grid::reduce_to_grid;
use super::provider::{DataError, FetchRequest, ObservationProvider};
use super::session::from_epoch_seconds;
use crate::domain::Observation;

/// Number or numeric string, as the snapshot API emits both.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub(crate) enum Numeric {
    Num(f64),
    Text(String),
}

impl Numeric {
    fn to_f64(&self, field: &str) -> Result<f64, DataError> {
        match self {
            Numeric::Num(v) => Ok(*v),
            Numeric::Text(s) => s.trim().parse::<f64>().map_err(|_| {
                DataError::ResponseFormatChanged(format!("{field}: '{s}' is not numeric"))
            }),
        }
    }
}

fn value_or_nan(value: &Option<Numeric>, field: &str) -> Result<f64, DataError> {
    value.as_ref().map_or(Ok(f64::NAN), |v| v.to_f64(field))
}

/// One row of the snapshot payload (JSON or CSV).
#[derive(Debug, Clone, Deserialize)]
pub(crate) struct RawSnapshot {
    #[serde(rename = "dateTime")]
    date_time: Numeric,
    spx: Option<Numeric>,
    #[serde(rename = "spxExpectedMove")]
    expected_move: Option<Numeric>,
    #[serde(rename = "spxOTMBids")]
    otm_bids: Option<Numeric>,
    vix: Option<Numeric>,
}

impl RawSnapshot {
    pub(crate) fn into_observation(self) -> Result<Observation, DataError> {
        let secs = self.date_time.to_f64("dateTime")?;
        if !secs.is_finite() {
            return Err(DataError::ResponseFormatChanged(format!(
                "dateTime {secs} is not a timestamp"
            )));
        }
        let timestamp = from_epoch_seconds(secs as i64).ok_or_else(|| {
            DataError::ResponseFormatChanged(format!("dateTime {secs} out of range"))
        })?;
        Ok(Observation::new(
            timestamp,
            value_or_nan(&self.spx, "spx")?,
            value_or_nan(&self.expected_move, "spxExpectedMove")?,
            value_or_nan(&self.otm_bids, "spxOTMBids")?,
            value_or_nan(&self.vix, "vix")?,
        ))
    }
}

/// Parse a JSON payload body into (unfiltered) observations.
pub fn parse_payload(body: &str) -> Result<Vec<Observation>, DataError> {
    let rows: Vec<RawSnapshot> = serde_json::from_str(body)
        .map_err(|e| DataError::ResponseFormatChanged(format!("payload is not a snapshot array: {e}")))?;
    rows.into_iter().map(RawSnapshot::into_observation).collect()
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HttpSourceConfig {
    pub url: String,
    /// Extra query parameters sent with every request (API keys, symbols).
    pub params: BTreeMap<String, String>,
    pub timeout_secs: u64,
    /// Sampling of the upstream feed, passed through as `interval`.
    pub source_interval: String,
    pub max_retries: u32,
}

impl Default for HttpSourceConfig {
    fn default() -> Self {
        Self {
            url: String::new(),
            params: BTreeMap::new(),
            timeout_secs: 10,
            source_interval: "30".into(),
            max_retries: 2,
        }
    }
}

pub struct HttpProvider {
    client: reqwest::blocking::Client,
    config: HttpSourceConfig,
    circuit_breaker: Arc<CircuitBreaker>,
    base_delay: Duration,
}

impl HttpProvider {
    pub fn new(config: HttpSourceConfig, circuit_breaker: Arc<CircuitBreaker>) -> Result<Self, DataError> {
        let client = reqwest::blocking::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| DataError::Setup(format!("failed to build HTTP client: {e}")))?;

        Ok(Self {
            client,
            config,
            circuit_breaker,
            base_delay: Duration::from_millis(500),
        })
    }

    fn query(&self, request: &FetchRequest) -> Vec<(String, String)> {
        let mut pairs: Vec<(String, String)> = self
            .config
            .params
            .iter()
            .filter(|(k, _)| k.as_str() != "date" && k.as_str() != "interval")
            .map(|(k, v)| (k.clone(), v.clone()))
            .collect();
        pairs.push(("date".into(), request.target.to_string()));
        pairs.push(("interval".into(), self.config.source_interval.clone()));
        pairs
    }

    /// Execute the request with retry and circuit breaker logic.
    fn fetch_body(&self, request: &FetchRequest) -> Result<String, DataError> {
        let query = self.query(request);
        let mut last_error = None;

        for attempt in 0..=self.config.max_retries {
            if attempt > 0 {
                std::thread::sleep(self.base_delay * 2u32.pow(attempt - 1));
            }
            if !self.circuit_breaker.is_allowed() {
                return Err(DataError::CircuitBreakerTripped);
            }

            let resp = match self.client.get(&self.config.url).query(&query).send() {
                Ok(resp) => resp,
                Err(e) => {
                    self.circuit_breaker.record_failure();
                    if e.is_connect() || e.is_timeout() {
                        tracing::debug!(attempt, error = %e, "snapshot request failed; retrying");
                        last_error = Some(DataError::NetworkUnreachable(e.to_string()));
                        continue;
                    }
                    return Err(DataError::NetworkUnreachable(e.to_string()));
                }
            };

            let status = resp.status();
            if status == reqwest::StatusCode::FORBIDDEN {
                self.circuit_breaker.trip();
                return Err(DataError::CircuitBreakerTripped);
            }
            if status == reqwest::StatusCode::TOO_MANY_REQUESTS {
                self.circuit_breaker.record_failure();
                let retry_after_secs = resp
                    .headers()
                    .get("retry-after")
                    .and_then(|v| v.to_str().ok())
                    .and_then(|v| v.parse::<u64>().ok())
                    .unwrap_or(60);
                last_error = Some(DataError::RateLimited { retry_after_secs });
                continue;
            }
            if !status.is_success() {
                self.circuit_breaker.record_failure();
                last_error = Some(DataError::HttpStatus {
                    status: status.as_u16(),
                });
                if status.is_server_error() {
                    continue;
                }
                break;
            }

            let body = resp
                .text()
                .map_err(|e| DataError::NetworkUnreachable(format!("reading body: {e}")))?;
            self.circuit_breaker.record_success();
            return Ok(body);
        }

        Err(last_error.unwrap_or(DataError::NetworkUnreachable("max retries exceeded".into())))
    }
}

impl ObservationProvider for HttpProvider {
    fn name(&self) -> &str {
        "http"
    }

    fn fetch(&self, request: &FetchRequest) -> Result<Vec<Observation>, DataError> {
        let body = self.fetch_body(request)?;
        let observations = parse_payload(&body)?;
        let raw = observations.len();
        let kept = reduce_to_grid(observations, request.interval_min, request.cutoff_instant());
        tracing::debug!(day = %request.target, raw, kept = kept.len(), "fetched snapshots");
        Ok(kept)
    }

    fn is_available(&self) -> bool {
        self.circuit_breaker.is_allowed()
    }
}
