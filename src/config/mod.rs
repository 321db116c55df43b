mod company;
mod session;

pub use company::{Config, Issuer, PdfSettings};
pub use session::{PeriodChange, Session};

use crate::error::{ReportError, Result};
use crate::report::{parse_day_key, BillingPeriod, ReportMetadata};
use directories::ProjectDirs;
use rust_decimal::Decimal;
use std::fs;
use std::path::{Path, PathBuf};

/// Get the config directory path (XDG config dir, or ~/.valorizacion/)
pub fn config_dir() -> Result<PathBuf> {
    if let Some(proj_dirs) = ProjectDirs::from("", "", "valorizacion") {
        return Ok(proj_dirs.config_dir().to_path_buf());
    }

    let home = dirs_home().ok_or_else(|| {
        ReportError::Io(std::io::Error::new(
            std::io::ErrorKind::NotFound,
            "Could not determine home directory",
        ))
    })?;

    Ok(home.join(".valorizacion"))
}

fn dirs_home() -> Option<PathBuf> {
    std::env::var_os("HOME").map(PathBuf::from)
}

/// Expand ~ in paths
pub fn expand_path(path: &str) -> PathBuf {
    if let Some(rest) = path.strip_prefix("~/") {
        if let Some(home) = dirs_home() {
            return home.join(rest);
        }
    }
    PathBuf::from(path)
}

/// Resolve the configured output directory; relative paths are taken from
/// the config directory
pub fn resolve_output_dir(output_dir: &str, cfg_dir: &Path) -> PathBuf {
    let path = expand_path(output_dir);
    if path.is_absolute() {
        path
    } else {
        cfg_dir.join(path)
    }
}

/// Load the main config.toml
pub fn load_config(cfg_dir: &Path) -> Result<Config> {
    let path = cfg_dir.join("config.toml");
    if !path.exists() {
        return Err(ReportError::ConfigFileNotFound(path));
    }
    let content = fs::read_to_string(&path)?;
    toml::from_str(&content).map_err(|e| ReportError::ConfigParse { path, source: e })
}

/// Load session.toml
pub fn load_session(cfg_dir: &Path) -> Result<Session> {
    let path = cfg_dir.join("session.toml");
    if !path.exists() {
        return Err(ReportError::ConfigFileNotFound(path));
    }
    let content = fs::read_to_string(&path)?;
    toml::from_str(&content).map_err(|e| ReportError::ConfigParse { path, source: e })
}

/// Save session.toml
pub fn save_session(cfg_dir: &Path, session: &Session) -> Result<()> {
    let path = cfg_dir.join("session.toml");
    let content = toml::to_string_pretty(session)?;
    fs::write(&path, content)?;
    tracing::debug!(path = %path.display(), "saved session");
    Ok(())
}

/// Session written by `init`: a one-month period with a sample unit
pub fn initial_session() -> Result<Session> {
    let period = BillingPeriod::new(parse_day_key("2025-10-26")?, parse_day_key("2025-11-25")?)?;

    let metadata = ReportMetadata {
        report_number: "1".to_string(),
        project_name: "Project name".to_string(),
        client_name: "CLIENT SAC".to_string(),
        client_tax_id: "20000000001".to_string(),
        unit_plate: "ABC-123".to_string(),
        unit_description: "CAMIONETA 4X4".to_string(),
        unit_year: None,
    };

    Ok(Session::new(period, Decimal::from(170), metadata))
}

/// Template content for config.toml
pub const CONFIG_TEMPLATE: &str = r#"[issuer]
name = "Your Rental Company"
tax_id = "20000000000"          # RUC
# phone = "+51 900000000"       # optional
# email = "billing@example.com" # optional
# footer_note = "This report covers the rental service only."  # optional

[format]
currency_symbol = "S/"
thousands_separator = ","
decimal_separator = "."

[pdf]
output_dir = "output"  # relative to this directory, or an absolute/~ path
"#;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn template_parses() {
        let config: Config = toml::from_str(CONFIG_TEMPLATE).unwrap();
        assert_eq!(config.issuer.tax_id, "20000000000");
        assert_eq!(config.format.currency_symbol, "S/");
        assert!(config.issuer.phone.is_none());
    }

    #[test]
    fn format_section_is_optional() {
        let config: Config = toml::from_str(
            "[issuer]\nname = \"X\"\ntax_id = \"1\"\n\n[pdf]\noutput_dir = \"out\"\n",
        )
        .unwrap();
        assert_eq!(config.format.decimal_separator, ".");
    }

    #[test]
    fn relative_output_dir_is_under_config_dir() {
        let cfg = Path::new("/tmp/cfg");
        assert_eq!(resolve_output_dir("output", cfg), PathBuf::from("/tmp/cfg/output"));
        assert_eq!(resolve_output_dir("/srv/out", cfg), PathBuf::from("/srv/out"));
    }

    #[test]
    fn initial_session_has_default_selection() {
        let session = initial_session().unwrap();
        assert_eq!(session.worked_days(), 26);
        assert_eq!(session.period.day_count(), 31);
    }
}
