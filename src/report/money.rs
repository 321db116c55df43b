use rust_decimal::Decimal;
use serde::Serialize;

/// IGV (value-added tax) applied to every billed amount: 18%
pub const TAX_RATE: Decimal = Decimal::from_parts(18, 0, 0, false, 2);

/// Daily rate for the rented unit
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct RateConfig {
    pub daily_rate: Decimal,
}

impl RateConfig {
    pub fn new(daily_rate: Decimal) -> Self {
        Self { daily_rate }
    }

    pub fn tax_rate(&self) -> Decimal {
        TAX_RATE
    }
}

/// Unit and period amounts for the summary sheet.
///
/// Values are exact; rounding to two digits happens only when formatting.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct SummaryRow {
    pub total_worked_days: u32,
    pub unit_subtotal: Decimal,
    pub unit_tax: Decimal,
    pub unit_total: Decimal,
    pub period_subtotal: Decimal,
    pub period_tax: Decimal,
    pub period_total: Decimal,
}

pub fn compute_summary(rate: &RateConfig, total_worked_days: u32) -> SummaryRow {
    let unit_subtotal = rate.daily_rate;
    let unit_tax = unit_subtotal * TAX_RATE;
    let period_subtotal = Decimal::from(total_worked_days) * unit_subtotal;
    let period_tax = period_subtotal * TAX_RATE;

    SummaryRow {
        total_worked_days,
        unit_subtotal,
        unit_tax,
        unit_total: unit_subtotal + unit_tax,
        period_subtotal,
        period_tax,
        period_total: period_subtotal + period_tax,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    fn dec(s: &str) -> Decimal {
        Decimal::from_str(s).unwrap()
    }

    #[test]
    fn tax_rate_is_eighteen_percent() {
        assert_eq!(TAX_RATE, dec("0.18"));
        assert_eq!(RateConfig::new(dec("1")).tax_rate(), dec("0.18"));
    }

    #[test]
    fn reference_period_totals() {
        let summary = compute_summary(&RateConfig::new(dec("170.00")), 26);
        assert_eq!(summary.total_worked_days, 26);
        assert_eq!(summary.unit_tax, dec("30.60"));
        assert_eq!(summary.unit_total, dec("200.60"));
        assert_eq!(summary.period_subtotal, dec("4420.00"));
        assert_eq!(summary.period_tax, dec("795.60"));
        assert_eq!(summary.period_total, dec("5215.60"));
    }

    #[test]
    fn zero_rate_is_all_zero() {
        let summary = compute_summary(&RateConfig::new(Decimal::ZERO), 26);
        assert!(summary.unit_total.is_zero());
        assert!(summary.period_total.is_zero());
    }

    #[test]
    fn zero_days_is_zero_period() {
        let summary = compute_summary(&RateConfig::new(dec("170")), 0);
        assert_eq!(summary.unit_total, dec("200.6"));
        assert!(summary.period_subtotal.is_zero());
        assert!(summary.period_tax.is_zero());
        assert!(summary.period_total.is_zero());
    }

    #[test]
    fn no_intermediate_rounding() {
        // 0.005 * 0.18 = 0.0009 would vanish if rounded per unit
        let summary = compute_summary(&RateConfig::new(dec("0.005")), 1000);
        assert_eq!(summary.unit_tax, dec("0.0009"));
        assert_eq!(summary.period_tax, dec("0.9"));
        assert_eq!(summary.period_total, dec("5.9"));
    }
}
