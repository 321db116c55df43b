use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::calendar::{is_rest_day, BillingPeriod};
use super::money::{compute_summary, RateConfig, SummaryRow};
use super::paginate::{paginate, total_pages, DetailPage, DEFAULT_PAGE_SIZE};
use super::selection::DaySelection;

/// Identifying fields printed on the report. None of them feed a computation.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
pub struct ReportMetadata {
    pub report_number: String,
    pub project_name: String,
    pub client_name: String,
    pub client_tax_id: String,
    pub unit_plate: String,
    pub unit_description: String,
    /// Model year shown in the summary table
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub unit_year: Option<String>,
}

/// A single calendar day of the period with its two independent flags
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct DayEntry {
    pub date: NaiveDate,
    pub is_worked: bool,
    pub is_rest_day: bool,
}

/// Fully computed report: one summary sheet plus the detail sheets
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ReportModel {
    pub period: BillingPeriod,
    pub metadata: ReportMetadata,
    pub daily_rate: Decimal,
    pub summary: SummaryRow,
    pub detail_pages: Vec<DetailPage>,
}

impl ReportModel {
    pub fn total_pages(&self) -> usize {
        total_pages(self.detail_pages.len())
    }

    pub fn file_name(&self) -> String {
        format!("Valorizacion_{}.pdf", self.metadata.report_number)
    }

    pub fn entries(&self) -> impl Iterator<Item = &DayEntry> {
        self.detail_pages.iter().flat_map(|page| page.entries.iter())
    }
}

/// Classify every day of the period against the selection
pub fn classify_days(period: &BillingPeriod, selection: &DaySelection) -> Vec<DayEntry> {
    period
        .days()
        .into_iter()
        .map(|date| DayEntry {
            date,
            is_worked: selection.is_worked(date),
            is_rest_day: is_rest_day(date),
        })
        .collect()
}

/// Build the report from scratch. Same inputs, same model.
pub fn build_report(
    period: &BillingPeriod,
    selection: &DaySelection,
    rate: &RateConfig,
    metadata: &ReportMetadata,
) -> ReportModel {
    let entries = classify_days(period, selection);
    let worked = entries.iter().filter(|entry| entry.is_worked).count();
    let summary = compute_summary(rate, u32::try_from(worked).unwrap_or(u32::MAX));

    let mut detail_pages = paginate(&entries, DEFAULT_PAGE_SIZE);
    if let Some(last) = detail_pages.last_mut() {
        last.totals = Some(summary);
    }

    tracing::debug!(
        days = entries.len(),
        worked,
        pages = detail_pages.len(),
        "built report"
    );

    ReportModel {
        period: *period,
        metadata: metadata.clone(),
        daily_rate: rate.daily_rate,
        summary,
        detail_pages,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn metadata() -> ReportMetadata {
        ReportMetadata {
            report_number: "15".to_string(),
            project_name: "Cerro Verde, Arequipa".to_string(),
            client_name: "KAMPFER SAC".to_string(),
            client_tax_id: "20600121503".to_string(),
            unit_plate: "VDM-872".to_string(),
            unit_description: "CAMIONETA TOYOTA HILUX".to_string(),
            unit_year: None,
        }
    }

    fn reference_report() -> ReportModel {
        let period = BillingPeriod::new(date(2025, 10, 26), date(2025, 11, 25)).unwrap();
        let selection = DaySelection::default_for(&period);
        let rate = RateConfig::new(Decimal::from_str("170.00").unwrap());
        build_report(&period, &selection, &rate, &metadata())
    }

    #[test]
    fn reference_report_shape() {
        let report = reference_report();
        assert_eq!(report.summary.total_worked_days, 26);
        assert_eq!(report.summary.period_total, Decimal::from_str("5215.60").unwrap());
        assert_eq!(report.detail_pages.len(), 2);
        assert_eq!(report.total_pages(), 3);
        assert_eq!(report.entries().count(), 31);
        assert_eq!(report.entries().filter(|e| e.is_rest_day).count(), 5);
        assert_eq!(report.file_name(), "Valorizacion_15.pdf");
    }

    #[test]
    fn only_last_page_has_totals() {
        let report = reference_report();
        assert!(report.detail_pages[0].totals.is_none());
        assert_eq!(report.detail_pages[1].totals, Some(report.summary));
    }

    #[test]
    fn build_is_deterministic() {
        assert_eq!(reference_report(), reference_report());
    }

    #[test]
    fn stale_selection_outside_period_is_ignored() {
        let period = BillingPeriod::new(date(2025, 11, 1), date(2025, 11, 3)).unwrap();
        let selection: DaySelection = [date(2025, 10, 31), date(2025, 11, 3)].into_iter().collect();
        let rate = RateConfig::new(Decimal::from(100));
        let report = build_report(&period, &selection, &rate, &metadata());
        assert_eq!(report.summary.total_worked_days, 1);
    }

    #[test]
    fn empty_selection_yields_zero_totals() {
        let period = BillingPeriod::new(date(2025, 11, 1), date(2025, 11, 30)).unwrap();
        let rate = RateConfig::new(Decimal::from(170));
        let report = build_report(&period, &DaySelection::new(), &rate, &metadata());
        assert!(report.summary.period_total.is_zero());
        assert_eq!(report.detail_pages.len(), 2);
    }

    #[test]
    fn reversed_period_has_only_summary_page() {
        let period = BillingPeriod {
            start: date(2025, 11, 30),
            end: date(2025, 11, 1),
        };
        let rate = RateConfig::new(Decimal::from(170));
        let report = build_report(&period, &DaySelection::new(), &rate, &metadata());
        assert!(report.detail_pages.is_empty());
        assert_eq!(report.total_pages(), 1);
    }
}
