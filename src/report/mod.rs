mod calendar;
mod format;
mod model;
mod money;
mod paginate;
mod selection;

pub use calendar::{enumerate_days, is_rest_day, parse_day_key, BillingPeriod};
pub use format::{
    detail_label, format_amount, format_currency, format_date, format_date_short,
    month_year_label, NumberFormat, WORKED_SHIFTS,
};
pub use model::{build_report, classify_days, DayEntry, ReportMetadata, ReportModel};
pub use money::{compute_summary, RateConfig, SummaryRow, TAX_RATE};
pub use paginate::{paginate, total_pages, DetailPage, DEFAULT_PAGE_SIZE};
pub use selection::DaySelection;
