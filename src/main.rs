use chrono::Datelike;
use clap::{Parser, Subcommand};
use rust_decimal::Decimal;
use std::path::{Path, PathBuf};
use tabled::{builder::Builder, settings::Style, Table, Tabled};

use valorizacion::config::{
    config_dir, initial_session, load_config, load_session, resolve_output_dir, save_session,
    PeriodChange, Session, CONFIG_TEMPLATE,
};
use valorizacion::error::{ReportError, Result};
use valorizacion::logging;
use valorizacion::pdf::{export_in_progress, export_report, TypstRenderer};
use valorizacion::report::{
    detail_label, format_currency, format_date, format_date_short, is_rest_day,
    month_year_label, parse_day_key, BillingPeriod, DetailPage, NumberFormat, ReportModel,
    WORKED_SHIFTS,
};

#[derive(Parser)]
#[command(name = "valorizacion")]
#[command(version, about = "Vehicle rental billing report generator", long_about = None)]
struct Cli {
    /// Path to config directory (default: XDG config dir or ~/.valorizacion)
    #[arg(short = 'C', long, global = true)]
    config_dir: Option<PathBuf>,

    /// Increase log verbosity (-v info, -vv debug)
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Initialize config directory with a template config and a sample session
    Init,

    /// Show the current session and export state
    Status,

    /// Set the billing period
    Period {
        /// First day of the period (YYYY-MM-DD)
        #[arg(long)]
        start: String,

        /// Last day of the period, inclusive (YYYY-MM-DD)
        #[arg(long)]
        end: String,

        /// Keep manual day selections instead of reapplying Mon-Sat
        #[arg(long)]
        keep_selection: bool,
    },

    /// Set the daily rate (before tax)
    Rate {
        /// Amount per worked day, e.g. 170.00
        amount: String,
    },

    /// Edit report details (shows them when no option is given)
    Set {
        /// Report number
        #[arg(long)]
        report_number: Option<String>,

        /// Project name
        #[arg(long)]
        project: Option<String>,

        /// Client name
        #[arg(long)]
        client: Option<String>,

        /// Client tax ID (RUC)
        #[arg(long)]
        client_ruc: Option<String>,

        /// Unit plate
        #[arg(long)]
        plate: Option<String>,

        /// Unit description
        #[arg(long)]
        unit: Option<String>,

        /// Unit model year
        #[arg(long)]
        year: Option<String>,
    },

    /// Toggle worked status of one or more days
    Toggle {
        /// Days in format YYYY-MM-DD
        #[arg(required = true, value_name = "DATE")]
        dates: Vec<String>,
    },

    /// Mark every day except Sundays as worked (discards manual edits)
    SelectAll,

    /// Mark every day as not worked
    Clear,

    /// Show the period as a calendar with worked days
    Days,

    /// Print the report to the terminal
    Preview {
        /// Print the computed report as JSON
        #[arg(long)]
        json: bool,
    },

    /// Export the report as a PDF (Valorizacion_<number>.pdf)
    Export {
        /// Custom output file path (default: output_dir/Valorizacion_<number>.pdf)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Open exported PDF with system default viewer
        #[arg(long)]
        open: bool,
    },
}

fn main() {
    if let Err(e) = run() {
        eprintln!("Error: {e}");
        std::process::exit(1);
    }
}

fn run() -> Result<()> {
    let cli = Cli::parse();
    logging::init(cli.verbose);

    // Determine config directory
    let cfg_dir = match cli.config_dir {
        Some(p) => p,
        None => config_dir()?,
    };

    match cli.command {
        Commands::Init => cmd_init(&cfg_dir),
        Commands::Status => cmd_status(&cfg_dir),
        Commands::Period {
            start,
            end,
            keep_selection,
        } => cmd_period(&cfg_dir, &start, &end, keep_selection),
        Commands::Rate { amount } => cmd_rate(&cfg_dir, &amount),
        Commands::Set {
            report_number,
            project,
            client,
            client_ruc,
            plate,
            unit,
            year,
        } => cmd_set(
            &cfg_dir,
            MetadataEdit {
                report_number,
                project,
                client,
                client_ruc,
                plate,
                unit,
                year,
            },
        ),
        Commands::Toggle { dates } => cmd_toggle(&cfg_dir, &dates),
        Commands::SelectAll => cmd_select_all(&cfg_dir),
        Commands::Clear => cmd_clear(&cfg_dir),
        Commands::Days => cmd_days(&cfg_dir),
        Commands::Preview { json } => cmd_preview(&cfg_dir, json),
        Commands::Export { output, open } => cmd_export(&cfg_dir, output, open),
    }
}

fn ensure_initialized(cfg_dir: &Path) -> Result<()> {
    if !cfg_dir.exists() {
        return Err(ReportError::ConfigNotFound(cfg_dir.to_path_buf()));
    }
    Ok(())
}

/// Load the session, apply `edit`, and save it back
fn update_session<T>(
    cfg_dir: &Path,
    edit: impl FnOnce(&mut Session) -> Result<T>,
) -> Result<(Session, T)> {
    ensure_initialized(cfg_dir)?;
    let mut session = load_session(cfg_dir)?;
    let out = edit(&mut session)?;
    save_session(cfg_dir, &session)?;
    Ok((session, out))
}

/// Initialize config directory with template files
fn cmd_init(cfg_dir: &Path) -> Result<()> {
    use std::fs;

    if cfg_dir.exists() {
        return Err(ReportError::AlreadyInitialized(cfg_dir.to_path_buf()));
    }

    fs::create_dir_all(cfg_dir)?;
    fs::create_dir_all(cfg_dir.join("output"))?;
    fs::write(cfg_dir.join("config.toml"), CONFIG_TEMPLATE)?;
    save_session(cfg_dir, &initial_session()?)?;

    println!("Initialized valorizacion config at: {}", cfg_dir.display());
    println!();
    println!("Next steps:");
    println!(
        "  1. Edit your company details:  $EDITOR {}/config.toml",
        cfg_dir.display()
    );
    println!("  2. Set the billing period:     valorizacion period --start <date> --end <date>");
    println!("  3. Fill in report details:     valorizacion set --report-number <n> --client <name> ...");
    println!();
    println!("Then review and export:");
    println!("  valorizacion preview");
    println!("  valorizacion export");

    Ok(())
}

/// Show session status
fn cmd_status(cfg_dir: &Path) -> Result<()> {
    ensure_initialized(cfg_dir)?;

    let config = load_config(cfg_dir)?;
    let session = load_session(cfg_dir)?;
    let report = session.build_report();
    let output_dir = resolve_output_dir(&config.pdf.output_dir, cfg_dir);

    println!("Valorizacion Status");
    println!("{}", "-".repeat(50));
    println!("Config directory: {}", cfg_dir.display());
    println!("Issuer:           {}", config.issuer.name);
    println!("Report number:    {}", session.metadata.report_number);
    println!(
        "Period:           {} to {} ({} days)",
        session.period.start,
        session.period.end,
        session.period.day_count()
    );
    println!(
        "Daily rate:       {}",
        format_currency(session.daily_rate, &config.format)
    );
    println!("Worked days:      {}", report.summary.total_worked_days);
    println!(
        "Total:            {}",
        format_currency(report.summary.period_total, &config.format)
    );
    println!("Pages:            {}", report.total_pages());
    println!(
        "Output:           {}",
        output_dir.join(report.file_name()).display()
    );
    let state = if export_in_progress(cfg_dir) {
        "in progress"
    } else {
        "idle"
    };
    println!("Export:           {state}");

    Ok(())
}

fn parse_period(start: &str, end: &str) -> Result<BillingPeriod> {
    BillingPeriod::new(parse_day_key(start)?, parse_day_key(end)?)
}

/// Set the billing period
fn cmd_period(cfg_dir: &Path, start: &str, end: &str, keep_selection: bool) -> Result<()> {
    let period = parse_period(start, end)?;
    let change = if keep_selection {
        PeriodChange::KeepSelection
    } else {
        PeriodChange::ResetSelection
    };

    let (session, _) = update_session(cfg_dir, |s| {
        s.set_period(period, change);
        Ok(())
    })?;

    println!(
        "Period set to {} - {} ({} days)",
        format_date(period.start),
        format_date(period.end),
        period.day_count()
    );
    match change {
        PeriodChange::ResetSelection => println!(
            "  Selection reset: {} worked days (Sundays excluded)",
            session.worked_days()
        ),
        PeriodChange::KeepSelection => println!(
            "  Selection kept: {} worked days in period",
            session.worked_days()
        ),
    }

    Ok(())
}

fn parse_rate(input: &str) -> Result<Decimal> {
    input
        .trim()
        .parse::<Decimal>()
        .map_err(|_| ReportError::InvalidRate {
            value: input.to_string(),
            reason: "must be a number".to_string(),
        })
}

/// Set the daily rate
fn cmd_rate(cfg_dir: &Path, amount: &str) -> Result<()> {
    let rate = parse_rate(amount)?;
    let (session, _) = update_session(cfg_dir, |s| s.set_daily_rate(rate))?;
    let config = load_config(cfg_dir)?;

    let summary = session.build_report().summary;
    println!(
        "Daily rate set to {} ({} with IGV)",
        format_currency(summary.unit_subtotal, &config.format),
        format_currency(summary.unit_total, &config.format)
    );

    Ok(())
}

struct MetadataEdit {
    report_number: Option<String>,
    project: Option<String>,
    client: Option<String>,
    client_ruc: Option<String>,
    plate: Option<String>,
    unit: Option<String>,
    year: Option<String>,
}

impl MetadataEdit {
    fn is_empty(&self) -> bool {
        self.report_number.is_none()
            && self.project.is_none()
            && self.client.is_none()
            && self.client_ruc.is_none()
            && self.plate.is_none()
            && self.unit.is_none()
            && self.year.is_none()
    }
}

#[derive(Tabled)]
struct FieldRow {
    #[tabled(rename = "FIELD")]
    field: &'static str,
    #[tabled(rename = "VALUE")]
    value: String,
}

/// Edit report metadata
fn cmd_set(cfg_dir: &Path, edit: MetadataEdit) -> Result<()> {
    let changed = !edit.is_empty();

    let (session, _) = update_session(cfg_dir, |s| {
        let meta = &mut s.metadata;
        if let Some(v) = edit.report_number {
            meta.report_number = v;
        }
        if let Some(v) = edit.project {
            meta.project_name = v;
        }
        if let Some(v) = edit.client {
            meta.client_name = v;
        }
        if let Some(v) = edit.client_ruc {
            meta.client_tax_id = v;
        }
        if let Some(v) = edit.plate {
            meta.unit_plate = v;
        }
        if let Some(v) = edit.unit {
            meta.unit_description = v;
        }
        if let Some(v) = edit.year {
            meta.unit_year = Some(v).filter(|y| !y.is_empty());
        }
        Ok(())
    })?;

    let meta = &session.metadata;
    let rows = vec![
        FieldRow { field: "Report number", value: meta.report_number.clone() },
        FieldRow { field: "Project", value: meta.project_name.clone() },
        FieldRow { field: "Client", value: meta.client_name.clone() },
        FieldRow { field: "Client RUC", value: meta.client_tax_id.clone() },
        FieldRow { field: "Plate", value: meta.unit_plate.clone() },
        FieldRow { field: "Unit", value: meta.unit_description.clone() },
        FieldRow { field: "Year", value: meta.unit_year.clone().unwrap_or_default() },
    ];

    if changed {
        println!("Updated report details");
    }
    let table = Table::new(rows).with(Style::rounded()).to_string();
    println!("{table}");

    Ok(())
}

/// Toggle days
fn cmd_toggle(cfg_dir: &Path, inputs: &[String]) -> Result<()> {
    let dates = inputs
        .iter()
        .map(|s| parse_day_key(s))
        .collect::<Result<Vec<_>>>()?;

    let (session, states) = update_session(cfg_dir, |s| {
        dates
            .iter()
            .map(|d| s.toggle_day(*d).map(|worked| (*d, worked)))
            .collect::<Result<Vec<_>>>()
    })?;

    for (date, worked) in states {
        let status = if worked { "worked" } else { "not worked" };
        println!("{} -> {}", format_date(date), status);
    }
    println!("Worked days: {}", session.worked_days());

    Ok(())
}

/// Select every non-Sunday
fn cmd_select_all(cfg_dir: &Path) -> Result<()> {
    let (session, _) = update_session(cfg_dir, |s| {
        s.select_all_non_rest();
        Ok(())
    })?;
    println!(
        "Selected Monday to Saturday: {} worked days",
        session.worked_days()
    );
    Ok(())
}

/// Clear the selection
fn cmd_clear(cfg_dir: &Path) -> Result<()> {
    update_session(cfg_dir, |s| {
        s.clear_selection();
        Ok(())
    })?;
    println!("Cleared selection: 0 worked days");
    Ok(())
}

/// Show the period as a Sunday-first calendar
fn cmd_days(cfg_dir: &Path) -> Result<()> {
    ensure_initialized(cfg_dir)?;
    let session = load_session(cfg_dir)?;
    let days = session.period.days();

    let mut builder = Builder::default();
    builder.push_record(["D", "L", "M", "M", "J", "V", "S"].map(String::from));

    let mut week: Vec<String> = Vec::with_capacity(7);
    if let Some(first) = days.first() {
        for _ in 0..first.weekday().num_days_from_sunday() {
            week.push(String::new());
        }
    }
    for day in &days {
        let cell = if session.selection.is_worked(*day) {
            format!("[{:>2}]", day.day())
        } else if is_rest_day(*day) {
            format!("({:>2})", day.day())
        } else {
            format!(" {:>2} ", day.day())
        };
        week.push(cell);
        if week.len() == 7 {
            builder.push_record(std::mem::take(&mut week));
        }
    }
    if !week.is_empty() {
        week.resize(7, String::new());
        builder.push_record(week);
    }

    let table = builder.build().with(Style::rounded()).to_string();
    println!(
        "{} - {}",
        format_date(session.period.start),
        format_date(session.period.end)
    );
    println!("{table}");
    println!("[dd] worked   (dd) Sunday   dd not worked");
    println!(
        "Worked days: {} of {}",
        session.worked_days(),
        session.period.day_count()
    );

    Ok(())
}

#[derive(Tabled)]
struct SummaryTableRow {
    #[tabled(rename = "PLACA")]
    plate: String,
    #[tabled(rename = "UNIDAD")]
    unit: String,
    #[tabled(rename = "AÑO")]
    year: String,
    #[tabled(rename = "FECHA INICIO")]
    start: String,
    #[tabled(rename = "FECHA FINAL")]
    end: String,
    #[tabled(rename = "TOTAL DÍAS")]
    days: String,
    #[tabled(rename = "TARIFA DIARIA")]
    rate: String,
    #[tabled(rename = "IGV")]
    tax: String,
    #[tabled(rename = "TOTAL A PAGAR")]
    total: String,
}

#[derive(Tabled)]
struct DetailTableRow {
    #[tabled(rename = "FECHA")]
    date: String,
    #[tabled(rename = "EQUIPO / DESCRIPCIÓN")]
    description: String,
    #[tabled(rename = "TURNOS/DÍAS")]
    shifts: String,
    #[tabled(rename = "TARIFA DIARIA")]
    rate: String,
    #[tabled(rename = "TOTAL")]
    total: String,
    #[tabled(rename = "DETALLE")]
    detail: String,
}

fn summary_rows(report: &ReportModel, fmt: &NumberFormat) -> Vec<SummaryTableRow> {
    let meta = &report.metadata;
    let s = &report.summary;
    vec![
        SummaryTableRow {
            plate: meta.unit_plate.clone(),
            unit: meta.unit_description.to_uppercase(),
            year: meta.unit_year.clone().unwrap_or_else(|| "-".to_string()),
            start: format_date(report.period.start),
            end: format_date(report.period.end),
            days: s.total_worked_days.to_string(),
            rate: format_currency(s.unit_subtotal, fmt),
            tax: format_currency(s.unit_tax, fmt),
            total: format_currency(s.unit_total, fmt),
        },
        SummaryTableRow {
            plate: "TOTAL GENERAL".to_string(),
            unit: String::new(),
            year: String::new(),
            start: String::new(),
            end: String::new(),
            days: String::new(),
            rate: format_currency(s.period_subtotal, fmt),
            tax: format_currency(s.period_tax, fmt),
            total: format_currency(s.period_total, fmt),
        },
    ]
}

fn detail_rows(page: &DetailPage, report: &ReportModel, fmt: &NumberFormat) -> Vec<DetailTableRow> {
    let meta = &report.metadata;
    let mut rows: Vec<DetailTableRow> = page
        .entries
        .iter()
        .map(|entry| {
            if entry.is_worked {
                DetailTableRow {
                    date: format_date_short(entry.date),
                    description: format!("{} ({})", meta.unit_description.to_uppercase(), meta.unit_plate),
                    shifts: WORKED_SHIFTS.to_string(),
                    rate: format_currency(report.summary.unit_subtotal, fmt),
                    total: format_currency(report.summary.unit_total, fmt),
                    detail: detail_label(entry).to_string(),
                }
            } else {
                DetailTableRow {
                    date: format_date_short(entry.date),
                    description: String::new(),
                    shifts: String::new(),
                    rate: String::new(),
                    total: String::new(),
                    detail: detail_label(entry).to_string(),
                }
            }
        })
        .collect();

    if let Some(totals) = page.totals {
        rows.push(DetailTableRow {
            date: "TOTAL ACUMULADO".to_string(),
            description: String::new(),
            shifts: format!("{} días", totals.total_worked_days),
            rate: format_currency(totals.period_subtotal, fmt),
            total: format_currency(totals.period_total, fmt),
            detail: String::new(),
        });
    }
    rows
}

/// Print the report
fn cmd_preview(cfg_dir: &Path, json: bool) -> Result<()> {
    ensure_initialized(cfg_dir)?;
    let config = load_config(cfg_dir)?;
    let session = load_session(cfg_dir)?;
    let report = session.build_report();

    if json {
        println!("{}", serde_json::to_string_pretty(&report)?);
        return Ok(());
    }

    let fmt = &config.format;
    let meta = &report.metadata;
    let total_pages = report.total_pages();

    println!("{}", config.issuer.name);
    println!("RUC: {}", config.issuer.tax_id);
    println!();
    println!("INFORME DE VALORIZACIÓN DE ALQUILER");
    println!(
        "DE VEHÍCULO Nº {} - {}",
        meta.report_number,
        month_year_label(report.period.start)
    );
    println!();
    println!("Proyecto:     {}", meta.project_name);
    println!("Cliente:      {}", meta.client_name);
    println!("RUC Cliente:  {}", meta.client_tax_id);
    println!(
        "Unidad:       {} (Placa {})",
        meta.unit_description, meta.unit_plate
    );
    println!();
    println!("RESUMEN GENERAL");
    let table = Table::new(summary_rows(&report, fmt))
        .with(Style::rounded())
        .to_string();
    println!("{table}");
    println!("Página 1 de {total_pages}");

    for page in &report.detail_pages {
        println!();
        println!(
            "VALORIZACION Nº {}: {}    {}    PLACA: {}",
            meta.report_number,
            report.period.start.year(),
            meta.unit_description,
            meta.unit_plate
        );
        let table = Table::new(detail_rows(page, &report, fmt))
            .with(Style::rounded())
            .to_string();
        println!("{table}");
        println!("Página {} de {}", page.number(), total_pages);
    }

    Ok(())
}

/// Export the report as PDF
fn cmd_export(cfg_dir: &Path, output: Option<PathBuf>, open: bool) -> Result<()> {
    ensure_initialized(cfg_dir)?;
    let config = load_config(cfg_dir)?;
    let session = load_session(cfg_dir)?;
    let report = session.build_report();

    let output_dir = resolve_output_dir(&config.pdf.output_dir, cfg_dir);
    let renderer = TypstRenderer::new(config.issuer.clone(), config.format.clone());

    println!("Exporting {} pages...", report.total_pages());
    let pdf_path = export_report(&renderer, &report, cfg_dir, &output_dir, output)?;

    println!("Exported {}", report.file_name());
    println!("  Pages:  {}", report.total_pages());
    println!(
        "  Total:  {}",
        format_currency(report.summary.period_total, &config.format)
    );
    println!("  Saved:  {}", pdf_path.display());

    if open {
        open_path(&pdf_path)?;
    }

    Ok(())
}

fn open_path(pdf_path: &Path) -> Result<()> {
    // Open with system default viewer
    #[cfg(target_os = "macos")]
    {
        std::process::Command::new("open").arg(pdf_path).spawn()?;
    }

    #[cfg(target_os = "linux")]
    {
        std::process::Command::new("xdg-open").arg(pdf_path).spawn()?;
    }

    #[cfg(target_os = "windows")]
    {
        std::process::Command::new("cmd")
            .arg("/C")
            .arg("start")
            .arg("")
            .arg(pdf_path)
            .spawn()?;
    }
    Ok(())
}
