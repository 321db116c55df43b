use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::error::{ReportError, Result};
use crate::report::{build_report, BillingPeriod, DaySelection, RateConfig, ReportMetadata, ReportModel};

/// What happens to manual day edits when the billing period changes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PeriodChange {
    /// Reapply the default (non-Sunday) selection for the new period
    ResetSelection,
    /// Keep the current selection untouched
    KeepSelection,
}

/// The operator's working state, persisted in `session.toml`.
///
/// This is the only owner of the selection; reports are built from
/// borrowed snapshots of it.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct Session {
    pub daily_rate: Decimal,
    #[serde(default)]
    pub selection: DaySelection,
    pub period: BillingPeriod,
    pub metadata: ReportMetadata,
}

impl Session {
    /// Start a session with the default selection for `period`
    pub fn new(period: BillingPeriod, daily_rate: Decimal, metadata: ReportMetadata) -> Self {
        Self {
            selection: DaySelection::default_for(&period),
            period,
            daily_rate,
            metadata,
        }
    }

    pub fn set_period(&mut self, period: BillingPeriod, change: PeriodChange) {
        self.period = period;
        if change == PeriodChange::ResetSelection {
            self.selection = DaySelection::default_for(&period);
        }
    }

    pub fn set_daily_rate(&mut self, rate: Decimal) -> Result<()> {
        if rate.is_sign_negative() && !rate.is_zero() {
            return Err(ReportError::InvalidRate {
                value: rate.to_string(),
                reason: "must not be negative".to_string(),
            });
        }
        self.daily_rate = rate;
        Ok(())
    }

    /// Toggle a day of the current period. Returns whether it is now worked.
    pub fn toggle_day(&mut self, date: NaiveDate) -> Result<bool> {
        if !self.period.contains(date) {
            return Err(ReportError::DateOutsidePeriod {
                date,
                start: self.period.start,
                end: self.period.end,
            });
        }
        Ok(self.selection.toggle(date))
    }

    pub fn select_all_non_rest(&mut self) {
        self.selection.select_all_non_rest(&self.period);
    }

    pub fn clear_selection(&mut self) {
        self.selection.clear();
    }

    pub fn rate(&self) -> RateConfig {
        RateConfig::new(self.daily_rate)
    }

    pub fn worked_days(&self) -> usize {
        self.selection.count_within(&self.period)
    }

    pub fn build_report(&self) -> ReportModel {
        build_report(&self.period, &self.selection, &self.rate(), &self.metadata)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn session() -> Session {
        let period = BillingPeriod::new(date(2025, 10, 26), date(2025, 11, 25)).unwrap();
        Session::new(period, Decimal::from(170), ReportMetadata::default())
    }

    #[test]
    fn new_session_preselects_non_sundays() {
        assert_eq!(session().worked_days(), 26);
    }

    #[test]
    fn period_change_resets_selection_by_default() {
        let mut s = session();
        s.toggle_day(date(2025, 10, 27)).unwrap();
        let next = BillingPeriod::new(date(2025, 11, 26), date(2025, 12, 25)).unwrap();
        s.set_period(next, PeriodChange::ResetSelection);
        assert_eq!(s.selection, DaySelection::default_for(&next));
    }

    #[test]
    fn period_change_can_keep_selection() {
        let mut s = session();
        s.toggle_day(date(2025, 10, 27)).unwrap();
        let before = s.selection.clone();
        let next = BillingPeriod::new(date(2025, 10, 20), date(2025, 11, 30)).unwrap();
        s.set_period(next, PeriodChange::KeepSelection);
        assert_eq!(s.selection, before);
    }

    #[test]
    fn toggle_outside_period_is_rejected() {
        let mut s = session();
        let err = s.toggle_day(date(2025, 12, 1)).unwrap_err();
        assert!(matches!(err, ReportError::DateOutsidePeriod { .. }));
    }

    #[test]
    fn negative_rate_is_rejected() {
        let mut s = session();
        assert!(s.set_daily_rate(Decimal::from_str("-1").unwrap()).is_err());
        assert!(s.set_daily_rate(Decimal::ZERO).is_ok());
        assert_eq!(s.daily_rate, Decimal::ZERO);
    }

    #[test]
    fn reversed_period_from_file_counts_no_days() {
        let mut s = session();
        s.period = BillingPeriod {
            start: date(2025, 11, 30),
            end: date(2025, 11, 1),
        };
        assert_eq!(s.worked_days(), 0);

        let report = s.build_report();
        assert_eq!(report.summary.total_worked_days, 0);
        assert!(report.detail_pages.is_empty());
        assert_eq!(report.total_pages(), 1);
    }

    #[test]
    fn session_round_trips_through_toml() {
        let s = session();
        let text = toml::to_string_pretty(&s).unwrap();
        assert!(text.contains("2025-10-27"));
        let back: Session = toml::from_str(&text).unwrap();
        assert_eq!(back, s);
    }
}
