use serde::{Deserialize, Serialize};

use crate::report::NumberFormat;

#[derive(Debug, Deserialize, Serialize)]
pub struct Config {
    pub issuer: Issuer,
    #[serde(default)]
    pub format: NumberFormat,
    pub pdf: PdfSettings,
}

/// The rental company issuing the report, printed in the summary header
#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct Issuer {
    pub name: String,
    pub tax_id: String,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    /// Closing note printed at the bottom of the summary sheet
    #[serde(default)]
    pub footer_note: Option<String>,
}

#[derive(Debug, Deserialize, Serialize)]
pub struct PdfSettings {
    pub output_dir: String,
}
