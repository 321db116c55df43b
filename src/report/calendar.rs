use chrono::{Datelike, NaiveDate, Weekday};
use serde::{Deserialize, Serialize};

use crate::error::{ReportError, Result};

/// Inclusive range of calendar days covered by one report
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
pub struct BillingPeriod {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl BillingPeriod {
    pub fn new(start: NaiveDate, end: NaiveDate) -> Result<Self> {
        if start > end {
            return Err(ReportError::InvalidPeriod { start, end });
        }
        Ok(Self { start, end })
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        self.start <= date && date <= self.end
    }

    pub fn days(&self) -> Vec<NaiveDate> {
        enumerate_days(self.start, self.end)
    }

    /// Number of days in the period, 0 if it was deserialized reversed
    pub fn day_count(&self) -> usize {
        let span = (self.end - self.start).num_days();
        usize::try_from(span + 1).unwrap_or(0)
    }
}

/// Every calendar day from `start` to `end` inclusive.
///
/// A reversed range yields an empty list rather than an error.
pub fn enumerate_days(start: NaiveDate, end: NaiveDate) -> Vec<NaiveDate> {
    if start > end {
        return Vec::new();
    }
    start.iter_days().take_while(|day| *day <= end).collect()
}

/// Sundays are the weekly rest day
pub fn is_rest_day(date: NaiveDate) -> bool {
    date.weekday() == Weekday::Sun
}

/// Parse a canonical day key
pub fn parse_day_key(input: &str) -> Result<NaiveDate> {
    NaiveDate::parse_from_str(input.trim(), "%Y-%m-%d")
        .map_err(|_| ReportError::InvalidDate(input.to_string()))
}
