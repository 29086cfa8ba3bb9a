//! Decision components applied to each feature vector, in loop order:
//! - Regime classifier: labels the session (trending / range-bound)
//! - Admission gate: global filters plus one regime-specific branch
//! - Alert deduplicator: cooldown state machine in front of the notifier

pub mod dedup;
pub mod gate;
pub mod regime;

pub use dedup::{AlertDeduplicator, AlertVerdict, CooldownCheck, CooldownParams};
pub use gate::{AdmissionGate, GateParams, GlobalParams, RangeBoundParams, TrendingParams};
pub use regime::{FixedRegime, RegimeClassifier, TrendStrengthClassifier, TrendStrengthParams};
