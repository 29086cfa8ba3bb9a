//! Bounded, time-ordered observation buffer.
//!
//! The buffer is a sliding window: appends must be in non-decreasing timestamp
//! order, an append at the current maximum timestamp replaces the stored
//! observation, and the oldest entries are evicted once `history_size` is
//! exceeded.

use std::collections::VecDeque;

use chrono::{DateTime, FixedOffset};
use thiserror::Error;

use crate::domain::Observation;

#[derive(Debug, Error, PartialEq)]
pub enum BufferError {
    #[error("out-of-order observation at {attempted} (buffer already holds {latest})")]
    OutOfOrder {
        attempted: DateTime<FixedOffset>,
        latest: DateTime<FixedOffset>,
    },

    #[error("buffer is empty")]
    Empty,

    #[error("history_size must be >= 1")]
    ZeroCapacity,
}

/// Outcome of a successful append.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppendOutcome {
    /// A new timestamp was added.
    Inserted,
    /// The observation replaced one with the same timestamp.
    Coalesced,
}

#[derive(Debug, Clone)]
pub struct TimeSeriesBuffer {
    entries: VecDeque<Observation>,
    history_size: usize,
}

impl TimeSeriesBuffer {
    /// # Panics
    /// When `history_size` is zero; see [`TimeSeriesBuffer::try_new`].
    pub fn new(history_size: usize) -> Self {
        assert!(history_size >= 1, "history_size must be >= 1");
        Self {
            entries: VecDeque::with_capacity(history_size + 1),
            history_size,
        }
    }

    pub fn try_new(history_size: usize) -> Result<Self, BufferError> {
        if history_size == 0 {
            return Err(BufferError::ZeroCapacity);
        }
        Ok(Self::new(history_size))
    }

    /// Append an observation, then trim to `history_size`.
    ///
    /// Fails with `OutOfOrder` (leaving the buffer untouched) when the
    /// timestamp is strictly older than the newest stored entry.
    pub fn append(&mut self, observation: Observation) -> Result<AppendOutcome, BufferError> {
        let outcome = match self.entries.back_mut() {
            Some(last) if observation.timestamp < last.timestamp => {
                return Err(BufferError::OutOfOrder {
                    attempted: observation.timestamp,
                    latest: last.timestamp,
                });
            }
            Some(last) if observation.timestamp == last.timestamp => {
                *last = observation;
                AppendOutcome::Coalesced
            }
            _ => {
                self.entries.push_back(observation);
                AppendOutcome::Inserted
            }
        };

        while self.entries.len() > self.history_size {
            self.entries.pop_front();
        }

        Ok(outcome)
    }

    /// Bulk-load history (e.g. the previous session), skipping anything older
    /// than the current maximum. Returns how many observations were accepted.
    pub fn seed<I>(&mut self, observations: I) -> usize
    where
        I: IntoIterator<Item = Observation>,
    {
        observations
            .into_iter()
            .filter(|obs| self.append(*obs).is_ok())
            .count()
    }

    pub fn latest(&self) -> Result<&Observation, BufferError> {
        self.entries.back().ok_or(BufferError::Empty)
    }

    pub fn max_timestamp(&self) -> Option<DateTime<FixedOffset>> {
        self.entries.back().map(|o| o.timestamp)
    }

    /// The last `n` entries in ascending order (fewer if the buffer is shorter).
    pub fn window(&self, n: usize) -> Vec<Observation> {
        let skip = self.entries.len().saturating_sub(n);
        self.entries.iter().skip(skip).copied().collect()
    }

    /// Contiguous view of the whole buffer, oldest first.
    pub fn as_slice(&mut self) -> &[Observation] {
        self.entries.make_contiguous()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Observation> {
        self.entries.iter()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn history_size(&self) -> usize {
        self.history_size
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};

    fn obs(minute: i64, price: f64) -> Observation {
        let base = FixedOffset::west_opt(5 * 3600)
            .unwrap()
            .with_ymd_and_hms(2026, 1, 29, 10, 0, 0)
            .unwrap();
        Observation::new(base + Duration::minutes(minute), price, 40.0, 5.0, 18.0)
    }

    #[test]
    fn zero_capacity_is_an_error() {
        assert_eq!(TimeSeriesBuffer::try_new(0).unwrap_err(), BufferError::ZeroCapacity);
        assert_eq!(TimeSeriesBuffer::try_new(1).unwrap().history_size(), 1);
    }

    #[test]
    fn append_keeps_ascending_order() {
        let mut buf = TimeSeriesBuffer::new(10);
        for m in 0..5 {
            assert_eq!(buf.append(obs(m, 100.0)).unwrap(), AppendOutcome::Inserted);
        }
        let stamps: Vec<_> = buf.iter().map(|o| o.timestamp).collect();
        assert!(stamps.windows(2).all(|w| w[0] < w[1]));
        assert_eq!(buf.len(), 5);
    }

    #[test]
    fn equal_timestamp_coalesces() {
        let mut buf = TimeSeriesBuffer::new(10);
        buf.append(obs(0, 100.0)).unwrap();
        assert_eq!(buf.append(obs(0, 101.5)).unwrap(), AppendOutcome::Coalesced);
        assert_eq!(buf.len(), 1);
        assert_eq!(buf.latest().unwrap().price, 101.5);
    }

    #[test]
    fn out_of_order_rejected_and_buffer_unchanged() {
        let mut buf = TimeSeriesBuffer::new(10);
        buf.append(obs(0, 100.0)).unwrap();
        buf.append(obs(5, 101.0)).unwrap();
        let err = buf.append(obs(3, 99.0)).unwrap_err();
        assert!(matches!(err, BufferError::OutOfOrder { .. }));
        assert_eq!(buf.len(), 2);
        assert_eq!(buf.latest().unwrap().price, 101.0);
    }

    #[test]
    fn trims_oldest_first() {
        let mut buf = TimeSeriesBuffer::new(3);
        for m in 0..6 {
            buf.append(obs(m, 100.0 + m as f64)).unwrap();
        }
        assert_eq!(buf.len(), 3);
        let prices: Vec<f64> = buf.iter().map(|o| o.price).collect();
        assert_eq!(prices, vec![103.0, 104.0, 105.0]);
    }

    #[test]
    fn latest_on_empty_fails() {
        let buf = TimeSeriesBuffer::new(3);
        assert_eq!(buf.latest().unwrap_err(), BufferError::Empty);
        assert!(buf.max_timestamp().is_none());
    }

    #[test]
    fn window_returns_tail() {
        let mut buf = TimeSeriesBuffer::new(10);
        for m in 0..5 {
            buf.append(obs(m, m as f64)).unwrap();
        }
        let w: Vec<f64> = buf.window(2).iter().map(|o| o.price).collect();
        assert_eq!(w, vec![3.0, 4.0]);
        assert_eq!(buf.window(50).len(), 5);
        assert!(buf.window(0).is_empty());
    }

    #[test]
    fn seed_skips_stale_entries() {
        let mut buf = TimeSeriesBuffer::new(10);
        buf.append(obs(10, 100.0)).unwrap();
        let accepted = buf.seed(vec![obs(1, 1.0), obs(10, 2.0), obs(11, 3.0)]);
        assert_eq!(accepted, 2);
        assert_eq!(buf.len(), 2);
    }
}
