pub mod config;
pub mod error;
pub mod logging;
pub mod pdf;
pub mod report;

pub use config::{Config, Issuer, PeriodChange, Session};
pub use error::{ReportError, Result};
pub use pdf::{export_report, Renderer, TypstRenderer};
pub use report::{build_report, BillingPeriod, DaySelection, RateConfig, ReportMetadata, ReportModel};
