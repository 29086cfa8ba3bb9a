//! spxwatch core: observation buffer, feature pipeline, regime gate, alert cooldown.
//!
//! This crate contains everything a single monitor iteration needs:
//! - Domain types (observations, feature vectors, regime labels, decisions)
//! - Bounded, strictly time-ordered observation buffer
//! - Indicator series and full-recompute feature engine
//! - Regime classifiers and the two-phase admission gate
//! - Alert deduplicator and its persisted state
//! - Provider, oracle and notifier traits with HTTP/CSV/console implementations

pub mod buffer;
pub mod components;
pub mod data;
pub mod domain;
pub mod features;
pub mod indicators;
pub mod notify;
pub mod oracle;
pub mod state;

pub use buffer::{AppendOutcome, BufferError, TimeSeriesBuffer};
pub use features::{FeatureConfig, FeatureEngine};
