//! Domain types: observations, feature vectors, regimes, decisions.

pub mod decision;
pub mod feature_vector;
pub mod observation;
pub mod regime;

pub use decision::{GateDecision, GateStage, TradeAction, TradeDecision};
pub use feature_vector::FeatureVector;
pub use observation::Observation;
pub use regime::RegimeLabel;
