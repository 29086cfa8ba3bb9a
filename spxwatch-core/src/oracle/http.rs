//! Remote oracle: POSTs the request as JSON and expects a `TradeDecision` back.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use super::{validated, DecisionOracle, OracleError, OracleRequest};
use crate::domain::TradeDecision;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HttpOracleConfig {
    pub url: String,
    pub timeout_secs: u64,
    /// Environment variable holding a bearer token, if the endpoint needs one.
    pub api_key_env: Option<String>,
}

impl Default for HttpOracleConfig {
    fn default() -> Self {
        Self {
            url: String::new(),
            timeout_secs: 60,
            api_key_env: None,
        }
    }
}

pub struct HttpOracle {
    client: reqwest::blocking::Client,
    url: String,
    token: Option<String>,
}

impl HttpOracle {
    pub fn new(config: &HttpOracleConfig) -> Result<Self, OracleError> {
        let token = match &config.api_key_env {
            Some(var) => Some(std::env::var(var).map_err(|_| {
                OracleError::Setup(format!("environment variable {var} is not set"))
            })?),
            None => None,
        };
        let client = reqwest::blocking::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| OracleError::Setup(format!("failed to build HTTP client: {e}")))?;

        Ok(Self {
            client,
            url: config.url.clone(),
            token,
        })
    }
}

impl DecisionOracle for HttpOracle {
    fn name(&self) -> &str {
        "http"
    }

    fn decide(&self, request: &OracleRequest) -> Result<TradeDecision, OracleError> {
        let mut builder = self.client.post(&self.url).json(request);
        if let Some(token) = &self.token {
            builder = builder.bearer_auth(token);
        }

        let resp = builder
            .send()
            .map_err(|e| OracleError::Transport(e.to_string()))?;
        let status = resp.status();
        if !status.is_success() {
            return Err(OracleError::HttpStatus {
                status: status.as_u16(),
            });
        }

        let body = resp
            .text()
            .map_err(|e| OracleError::Transport(format!("reading body: {e}")))?;
        let decision: TradeDecision =
            serde_json::from_str(&body).map_err(|e| OracleError::Malformed(e.to_string()))?;
        tracing::debug!(
            trade = decision.trade_label(),
            confidence = decision.confidence,
            "oracle responded"
        );
        validated(decision)
    }
}
