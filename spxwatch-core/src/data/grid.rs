//! Grid reduction shared by all providers.

use chrono::{DateTime, FixedOffset, Timelike};

use crate::domain::Observation;

/// Sort ascending, keep on-grid samples (minute divisible by `interval_min`,
/// zero seconds) and drop anything after `cutoff`.
///
/// Duplicate timestamps are left in place; the buffer coalesces them.
pub fn reduce_to_grid(
    mut observations: Vec<Observation>,
    interval_min: u32,
    cutoff: Option<DateTime<FixedOffset>>,
) -> Vec<Observation> {
    let interval = interval_min.max(1);
    observations.sort_by_key(|o| o.timestamp);
    observations.retain(|o| {
        let ts = o.timestamp;
        ts.second() == 0
            && ts.nanosecond() == 0
            && ts.minute() % interval == 0
            && cutoff.map_or(true, |c| ts <= c)
    });
    observations
}
