//! Exchange clock helpers (America/New_York).

use chrono::{DateTime, Datelike, Duration, FixedOffset, NaiveDate, NaiveTime, TimeZone, Utc, Weekday};
use chrono_tz::Tz;
use serde::{Deserialize, Serialize};

pub const MARKET_TZ: Tz = chrono_tz::America::New_York;

/// Current exchange-local time.
pub fn now_in_market() -> DateTime<FixedOffset> {
    Utc::now().with_timezone(&MARKET_TZ).fixed_offset()
}

pub fn today_in_market() -> NaiveDate {
    now_in_market().date_naive()
}

/// Convert epoch seconds to exchange-local time.
pub fn from_epoch_seconds(secs: i64) -> Option<DateTime<FixedOffset>> {
    DateTime::from_timestamp(secs, 0).map(|utc| utc.with_timezone(&MARKET_TZ).fixed_offset())
}

/// Exchange-local instant for a wall-clock date and time.
///
/// Nonexistent local times (DST gap) yield `None`; ambiguous ones resolve to
/// the earlier instant.
pub fn market_datetime(date: NaiveDate, time: NaiveTime) -> Option<DateTime<FixedOffset>> {
    MARKET_TZ
        .from_local_datetime(&date.and_time(time))
        .earliest()
        .map(|dt| dt.fixed_offset())
}

/// The business day before `date`, skipping weekends only.
pub fn previous_business_day(date: NaiveDate) -> NaiveDate {
    let mut day = date - Duration::days(1);
    while matches!(day.weekday(), Weekday::Sat | Weekday::Sun) {
        day -= Duration::days(1);
    }
    day
}

/// Monitoring window within the trading day (wall-clock, exchange-local).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionWindow {
    pub open: NaiveTime,
    pub close: NaiveTime,
}

impl Default for SessionWindow {
    fn default() -> Self {
        Self {
            open: NaiveTime::from_hms_opt(10, 0, 0).unwrap_or(NaiveTime::MIN),
            close: NaiveTime::from_hms_opt(14, 30, 0).unwrap_or(NaiveTime::MIN),
        }
    }
}

impl SessionWindow {
    pub fn validate(&self) -> Result<(), String> {
        if self.open >= self.close {
            return Err(format!(
                "session open {} must be before close {}",
                self.open, self.close
            ));
        }
        Ok(())
    }

    pub fn is_before_open(&self, t: NaiveTime) -> bool {
        t < self.open
    }

    /// True once `t` has reached the end of the window.
    pub fn has_ended(&self, t: NaiveTime) -> bool {
        t >= self.close
    }

    pub fn contains(&self, t: NaiveTime) -> bool {
        self.open <= t && t <= self.close
    }
}
