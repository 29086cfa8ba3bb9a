//! Market regime labels.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Coarse market-behavior classification used to select the gating policy.
///
/// `Unrecognized` carries labels produced by configuration or external
/// classifiers that no gate branch handles; the gate always rejects them.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum RegimeLabel {
    Trending,
    RangeBound,
    Unrecognized(String),
}

impl RegimeLabel {
    pub fn as_str(&self) -> &str {
        match self {
            RegimeLabel::Trending => "trending",
            RegimeLabel::RangeBound => "range_bound",
            RegimeLabel::Unrecognized(label) => label,
        }
    }
}

impl From<&str> for RegimeLabel {
    fn from(label: &str) -> Self {
        match label.trim().to_ascii_lowercase().replace(['-', ' '], "_").as_str() {
            "trending" | "trend" => RegimeLabel::Trending,
            "range_bound" | "range" | "rangebound" => RegimeLabel::RangeBound,
            _ => RegimeLabel::Unrecognized(label.to_string()),
        }
    }
}

impl From<String> for RegimeLabel {
    fn from(label: String) -> Self {
        RegimeLabel::from(label.as_str())
    }
}

impl From<RegimeLabel> for String {
    fn from(label: RegimeLabel) -> Self {
        label.as_str().to_string()
    }
}

impl fmt::Display for RegimeLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
