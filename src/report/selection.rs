use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

use super::calendar::{is_rest_day, BillingPeriod};

/// The set of days marked as worked (billable).
///
/// Stored as calendar dates so every operation works on the canonical key;
/// serialized as a list of `"YYYY-MM-DD"` strings. Days outside the current
/// period may remain in the set and are simply never looked up.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(transparent)]
pub struct DaySelection {
    days: BTreeSet<NaiveDate>,
}

impl DaySelection {
    pub fn new() -> Self {
        Self::default()
    }

    /// Every day of the period except rest days
    pub fn default_for(period: &BillingPeriod) -> Self {
        Self {
            days: period
                .days()
                .into_iter()
                .filter(|day| !is_rest_day(*day))
                .collect(),
        }
    }

    /// Discard manual edits and reapply the default policy
    pub fn select_all_non_rest(&mut self, period: &BillingPeriod) {
        *self = Self::default_for(period);
    }

    pub fn clear(&mut self) {
        self.days.clear();
    }

    /// Flip a day's worked status. Returns whether the day is now worked.
    pub fn toggle(&mut self, date: NaiveDate) -> bool {
        if self.days.remove(&date) {
            false
        } else {
            self.days.insert(date);
            true
        }
    }

    pub fn is_worked(&self, date: NaiveDate) -> bool {
        self.days.contains(&date)
    }

    pub fn len(&self) -> usize {
        self.days.len()
    }

    pub fn is_empty(&self) -> bool {
        self.days.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = NaiveDate> + '_ {
        self.days.iter().copied()
    }

    /// Number of selected days that fall inside `period` (0 when reversed)
    pub fn count_within(&self, period: &BillingPeriod) -> usize {
        if period.start > period.end {
            return 0;
        }
        self.days.range(period.start..=period.end).count()
    }
}

impl FromIterator<NaiveDate> for DaySelection {
    fn from_iter<I: IntoIterator<Item = NaiveDate>>(iter: I) -> Self {
        Self {
            days: iter.into_iter().collect(),
        }
    }
}
