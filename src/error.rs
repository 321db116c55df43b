use chrono::NaiveDate;
use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ReportError {
    #[error("Config directory not found at {0}. Run 'valorizacion init' to create it.")]
    ConfigNotFound(PathBuf),

    #[error("Config file not found: {0}")]
    ConfigFileNotFound(PathBuf),

    #[error("Failed to parse config file {path}: {source}")]
    ConfigParse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    #[error("Failed to write session file: {0}")]
    SessionWrite(#[from] toml::ser::Error),

    #[error("Config directory already exists at {0}")]
    AlreadyInitialized(PathBuf),

    #[error("Invalid date '{0}'. Expected YYYY-MM-DD (e.g., '2025-10-26')")]
    InvalidDate(String),

    #[error("Invalid billing period: start {start} is after end {end}")]
    InvalidPeriod { start: NaiveDate, end: NaiveDate },

    #[error("Date {date} is outside the billing period {start} to {end}")]
    DateOutsidePeriod {
        date: NaiveDate,
        start: NaiveDate,
        end: NaiveDate,
    },

    #[error("Invalid daily rate '{value}': {reason}")]
    InvalidRate { value: String, reason: String },

    #[error("Failed to serialize report data: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Typst not found. Install it from https://typst.app/ or run: cargo install typst-cli")]
    TypstNotFound,

    #[error("Failed to generate PDF: {0}")]
    PdfGeneration(String),

    #[error("An export is already in progress (lock file {0}). Wait for it to finish.")]
    ExportInProgress(PathBuf),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, ReportError>;
