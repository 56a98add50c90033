// Rental price estimation over a selected date range

use chrono::{DateTime, Duration, NaiveTime, Utc};

pub const DEFAULT_START_OFFSET_DAYS: i64 = 1;
pub const DEFAULT_END_OFFSET_DAYS: i64 = 3;

/// Whole days from `from` to `to`, truncated toward zero. Negative when the
/// range is reversed.
pub fn duration_days(from: DateTime<Utc>, to: DateTime<Utc>) -> i64 {
    (to - from).num_days()
}

/// Total price for the range. Reversed or zero-length ranges cost nothing.
pub fn estimate(daily_rate: f64, from: DateTime<Utc>, to: DateTime<Utc>) -> f64 {
    let days = duration_days(from, to);
    if days > 0 {
        days as f64 * daily_rate
    } else {
        0.0
    }
}

/// Midnight (UTC) at the start of tomorrow, relative to `now`.
pub fn earliest_start(now: DateTime<Utc>) -> DateTime<Utc> {
    (now + Duration::days(1))
        .date_naive()
        .and_time(NaiveTime::MIN)
        .and_utc()
}

/// Any time on tomorrow's calendar day or later is selectable.
pub fn is_selectable_start(candidate: DateTime<Utc>, now: DateTime<Utc>) -> bool {
    candidate.date_naive() >= (now + Duration::days(1)).date_naive()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct DateRange {
    pub from: Option<DateTime<Utc>>,
    pub to: Option<DateTime<Utc>>,
}

impl DateRange {
    pub fn new(from: DateTime<Utc>, to: DateTime<Utc>) -> Self {
        Self {
            from: Some(from),
            to: Some(to),
        }
    }

    /// Range preselected when the booking dialog opens.
    pub fn default_for(now: DateTime<Utc>) -> Self {
        Self::new(
            now + Duration::days(DEFAULT_START_OFFSET_DAYS),
            now + Duration::days(DEFAULT_END_OFFSET_DAYS),
        )
    }

    pub fn is_complete(&self) -> bool {
        self.from.is_some() && self.to.is_some()
    }

    pub fn bounds(&self) -> Option<(DateTime<Utc>, DateTime<Utc>)> {
        Some((self.from?, self.to?))
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BookingEstimate {
    pub duration_days: i64,
    pub total_price: f64,
}

impl BookingEstimate {
    pub fn compute(daily_rate: f64, range: &DateRange) -> Self {
        match range.bounds() {
            Some((from, to)) => Self {
                duration_days: duration_days(from, to).max(0),
                total_price: estimate(daily_rate, from, to),
            },
            None => Self {
                duration_days: 0,
                total_price: 0.0,
            },
        }
    }

    pub fn is_bookable(&self) -> bool {
        self.duration_days > 0
    }
}
