use chrono::Datelike;
use serde::Serialize;
use std::path::{Path, PathBuf};
use std::process::Command;

use super::Renderer;
use crate::config::Issuer;
use crate::error::{ReportError, Result};
use crate::report::{
    detail_label, format_currency, format_date, format_date_short, month_year_label,
    DetailPage, NumberFormat, ReportMetadata, ReportModel, SummaryRow, WORKED_SHIFTS,
};

/// Summary sheet table, every value already formatted
#[derive(Debug, Serialize)]
struct SummaryView {
    plate: String,
    unit: String,
    year: String,
    start_date: String,
    end_date: String,
    worked_days: String,
    daily_rate: String,
    unit_tax: String,
    unit_total: String,
    period_subtotal: String,
    period_tax: String,
    period_total: String,
}

#[derive(Debug, Serialize)]
struct RowView {
    date: String,
    worked: bool,
    rest: bool,
    description: String,
    plate: String,
    shifts: String,
    rate: String,
    total: String,
    detail: String,
}

#[derive(Debug, Serialize)]
struct TotalsView {
    worked_days: String,
    subtotal: String,
    total: String,
}

#[derive(Debug, Serialize)]
struct PageView {
    number: String,
    rows: Vec<RowView>,
    totals: Option<TotalsView>,
}

/// Complete data handed to the Typst template
#[derive(Debug, Serialize)]
struct RenderData {
    issuer: Issuer,
    title: String,
    subtitle: String,
    detail_header: String,
    metadata: ReportMetadata,
    summary: SummaryView,
    total_pages: String,
    pages: Vec<PageView>,
}

impl RenderData {
    fn new(report: &ReportModel, issuer: &Issuer, fmt: &NumberFormat) -> Self {
        let meta = &report.metadata;
        let summary = &report.summary;
        let money = |amount| format_currency(amount, fmt);

        Self {
            issuer: issuer.clone(),
            title: "INFORME DE VALORIZACIÓN DE ALQUILER".to_string(),
            subtitle: format!(
                "DE VEHÍCULO Nº {} - {}",
                meta.report_number,
                month_year_label(report.period.start)
            ),
            detail_header: format!(
                "VALORIZACION Nº {}: {}",
                meta.report_number,
                report.period.start.year()
            ),
            metadata: meta.clone(),
            summary: SummaryView {
                plate: meta.unit_plate.clone(),
                unit: meta.unit_description.clone(),
                year: meta.unit_year.clone().unwrap_or_else(|| "-".to_string()),
                start_date: format_date(report.period.start),
                end_date: format_date(report.period.end),
                worked_days: summary.total_worked_days.to_string(),
                daily_rate: money(summary.unit_subtotal),
                unit_tax: money(summary.unit_tax),
                unit_total: money(summary.unit_total),
                period_subtotal: money(summary.period_subtotal),
                period_tax: money(summary.period_tax),
                period_total: money(summary.period_total),
            },
            total_pages: report.total_pages().to_string(),
            pages: report
                .detail_pages
                .iter()
                .map(|page| page_view(page, meta, summary, fmt))
                .collect(),
        }
    }
}

fn page_view(
    page: &DetailPage,
    meta: &ReportMetadata,
    summary: &SummaryRow,
    fmt: &NumberFormat,
) -> PageView {
    let rows = page
        .entries
        .iter()
        .map(|entry| RowView {
            date: format_date_short(entry.date),
            worked: entry.is_worked,
            rest: entry.is_rest_day,
            description: meta.unit_description.clone(),
            plate: meta.unit_plate.clone(),
            shifts: WORKED_SHIFTS.to_string(),
            rate: format_currency(summary.unit_subtotal, fmt),
            total: format_currency(summary.unit_total, fmt),
            detail: detail_label(entry).to_string(),
        })
        .collect();

    PageView {
        number: page.number().to_string(),
        rows,
        totals: page.totals.map(|totals| TotalsView {
            worked_days: format!("{} días", totals.total_worked_days),
            subtotal: format_currency(totals.period_subtotal, fmt),
            total: format_currency(totals.period_total, fmt),
        }),
    }
}

/// Embedded Typst template for the report.
/// Uses a placeholder that gets replaced with the actual JSON file path.
const REPORT_TEMPLATE: &str = r##"// Rental valuation report
// Data is loaded from JSON file

#let data = json("DATA_JSON_PATH")

#set page(
  paper: "a4",
  flipped: true,
  margin: (x: 14mm, y: 12mm),
)

#set text(font: "Helvetica", size: 9pt)

#let navy = rgb("#002060")
#let cell-stroke = 0.5pt + black
#let head(body) = table.cell(fill: navy)[#text(fill: white, weight: "bold")[#body]]
#let shaded(body) = table.cell(fill: luma(220))[#body]
#let page-footer(number) = align(right)[
  #text(size: 7pt, fill: gray)[Página #number de #data.total_pages]
]

// Summary sheet: issuer header
#align(right)[
  #text(size: 13pt, weight: "bold", fill: navy)[#data.issuer.name] \
  RUC: #data.issuer.tax_id
  #if data.issuer.phone != none [ \ Teléfono: #data.issuer.phone ]
  #if data.issuer.email != none [ \ E-mail: #data.issuer.email ]
]

#v(1.5em)
#align(center)[
  #text(size: 16pt, weight: "bold", fill: navy)[#data.title] \
  #text(size: 14pt, weight: "bold", fill: navy)[#data.subtitle]
]
#v(1.5em)

#table(
  columns: (110pt, 1fr),
  stroke: none,
  inset: 4pt,
  [*Proyecto:*], [#data.metadata.project_name],
  [*Cliente:*], [#data.metadata.client_name],
  [*RUC Cliente:*], [#data.metadata.client_tax_id],
  [*Unidad:*], [#data.metadata.unit_description (Placa #data.metadata.unit_plate)],
)

#v(1.5em)
#text(weight: "bold", fill: navy)[RESUMEN GENERAL]
#v(0.5em)

#table(
  columns: (auto, 1fr, auto, auto, auto, auto, auto, auto, auto),
  align: center + horizon,
  stroke: cell-stroke,
  inset: 6pt,

  head[Placa], head[Unidad], head[Año], head[Fecha inicio], head[Fecha final],
  head[Total días], head[Tarifa diaria], head[Igv.], head[Total a pagar],

  data.summary.plate, upper(data.summary.unit), data.summary.year,
  data.summary.start_date, data.summary.end_date, data.summary.worked_days,
  data.summary.daily_rate, data.summary.unit_tax, [*#data.summary.unit_total*],

  table.cell(colspan: 6, align: right)[*TOTAL GENERAL*],
  [*#data.summary.period_subtotal*], [*#data.summary.period_tax*], [*#data.summary.period_total*],
)

#v(1fr)
#if data.issuer.footer_note != none [
  #line(length: 100%, stroke: 0.5pt + gray)
  #text(size: 8pt, style: "italic", fill: gray)[#data.issuer.footer_note]
]
#page-footer(1)

// Detail sheets, one table per page
#for page in data.pages [
  #pagebreak()
  #table(
    columns: (auto, 1fr, auto, auto, auto, auto),
    align: center + horizon,
    stroke: cell-stroke,
    inset: 5pt,

    table.cell(colspan: 2, fill: navy)[#text(fill: white, weight: "bold")[#data.detail_header]],
    table.cell(colspan: 3, fill: navy)[#text(fill: white, weight: "bold")[#data.metadata.unit_description]],
    table.cell(fill: navy)[#text(fill: white, weight: "bold")[PLACA: #data.metadata.unit_plate]],

    head[Fecha], head[Equipo / Descripción], head[Turnos/ días],
    head[Tarifa diaria], head[Total], head[Detalle],

    ..page.rows.map(row => {
      let detail = shaded[#text(size: 7pt, weight: "bold", fill: gray)[#row.detail]]
      if row.worked {
        (
          row.date,
          align(left)[#upper(row.description) \ #text(size: 7pt, fill: gray)[#row.plate]],
          row.shifts,
          row.rate,
          [*#row.total*],
          detail,
        )
      } else {
        (row.date, shaded[], shaded[], shaded[], shaded[], detail)
      }
    }).flatten(),

    ..if page.totals != none {
      (
        table.cell(colspan: 2, align: right)[*TOTAL ACUMULADO*],
        [*#page.totals.worked_days*],
        [*#page.totals.subtotal*],
        [*#text(fill: navy)[#page.totals.total]*],
        shaded[],
      )
    } else {
      ()
    },
  )
  #v(1fr)
  #page-footer(page.number)
]
"##;

/// Renders reports as A4 landscape PDFs through the Typst CLI
#[derive(Debug, Clone)]
pub struct TypstRenderer {
    issuer: Issuer,
    format: NumberFormat,
}

impl TypstRenderer {
    pub fn new(issuer: Issuer, format: NumberFormat) -> Self {
        Self { issuer, format }
    }

    fn work_dir() -> PathBuf {
        std::env::temp_dir().join(format!("valorizacion-{}", std::process::id()))
    }
}

impl Renderer for TypstRenderer {
    fn render(&self, report: &ReportModel, output_path: &Path) -> Result<()> {
        // Check if typst is available
        if Command::new("typst").arg("--version").output().is_err() {
            return Err(ReportError::TypstNotFound);
        }

        let temp_dir = Self::work_dir();
        std::fs::create_dir_all(&temp_dir)?;

        let data = RenderData::new(report, &self.issuer, &self.format);
        let json_data = serde_json::to_string(&data)?;

        let json_path = temp_dir.join("data.json");
        std::fs::write(&json_path, &json_data)?;

        // data.json is in the same directory as the template
        let template_content = REPORT_TEMPLATE.replace("DATA_JSON_PATH", "data.json");
        let template_path = temp_dir.join("report.typ");
        std::fs::write(&template_path, &template_content)?;

        tracing::debug!(work_dir = %temp_dir.display(), "running typst compile");
        let output = Command::new("typst")
            .arg("compile")
            .arg("--format")
            .arg("pdf")
            .arg("--root")
            .arg(&temp_dir)
            .arg(&template_path)
            .arg(output_path)
            .output();

        let _ = std::fs::remove_dir_all(&temp_dir);
        let output = output?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(ReportError::PdfGeneration(stderr.to_string()));
        }

        Ok(())
    }
}
