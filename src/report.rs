use std::fmt::Write as _;
use std::fs::File;
use std::io::Write as _;
use std::path::PathBuf;

use anyhow::Context;
use chrono::NaiveDate;

use crate::markdown::{self, RenderStyle};
use crate::models::ViolationRecord;

pub const ROLE_LABEL: &str = "Duty Teacher";

/// Where the composed report document ends up. Mirrors the print-window
/// contract: if `open` fails the whole operation aborts before any document
/// is composed, so a blocked surface never produces partial output.
pub trait PrintSurface {
    fn open(&mut self) -> anyhow::Result<()>;
    fn write_document(&mut self, html: &str) -> anyhow::Result<()>;
    fn print(&mut self) -> anyhow::Result<()>;
}

/// Writes the report to a file; "printing" amounts to flushing and telling
/// the operator where to find it.
pub struct FileSurface {
    path: PathBuf,
    file: Option<File>,
}

impl FileSurface {
    pub fn new(path: PathBuf) -> Self {
        Self { path, file: None }
    }
}

impl PrintSurface for FileSurface {
    fn open(&mut self) -> anyhow::Result<()> {
        let file = File::create(&self.path)
            .with_context(|| format!("unable to create report file {}", self.path.display()))?;
        self.file = Some(file);
        Ok(())
    }

    fn write_document(&mut self, html: &str) -> anyhow::Result<()> {
        let file = self.file.as_mut().context("print surface is not open")?;
        file.write_all(html.as_bytes())
            .with_context(|| format!("failed writing report to {}", self.path.display()))?;
        Ok(())
    }

    fn print(&mut self) -> anyhow::Result<()> {
        if let Some(file) = self.file.as_mut() {
            file.flush()?;
        }
        println!(
            "Report written to {}. Open it in a browser to print.",
            self.path.display()
        );
        Ok(())
    }
}

/// Composes and prints the analysis report. Aborts with no output at all if
/// the surface cannot be opened; the caller surfaces that as a warning and
/// the invocation is over (no retry).
pub fn print_report(
    surface: &mut dyn PrintSurface,
    analysis_markdown: &str,
    operator_name: &str,
    records: &[ViolationRecord],
    report_date: NaiveDate,
) -> anyhow::Result<()> {
    surface.open()?;
    let document = compose_document(analysis_markdown, operator_name, records, report_date);
    surface.write_document(&document)?;
    surface.print()?;
    Ok(())
}

/// Builds the complete standalone report document: dated header, the record
/// table sorted by date descending, the rendered analysis, and the signature
/// footer.
pub fn compose_document(
    analysis_markdown: &str,
    operator_name: &str,
    records: &[ViolationRecord],
    report_date: NaiveDate,
) -> String {
    let records_table = compose_records_table(records);
    let analysis_html = markdown::render(analysis_markdown, &RenderStyle::print());
    let date_label = report_date.format("%-d %B %Y");

    format!(
        r#"<html><head><title>Violation Analysis Report</title>
<style>
  body {{ font-family: ui-sans-serif, system-ui, sans-serif; margin: 2rem; color: #111827; }}
  @media print {{
      body {{ -webkit-print-color-adjust: exact; print-color-adjust: exact; }}
  }}
</style>
</head><body>
    <header style="text-align: center; margin-bottom: 2rem; border-bottom: 1px solid #D1D5DB; padding-bottom: 1rem;">
      <h1 style="font-size: 1.5rem; font-weight: bold;">Student Violation and Analysis Report</h1>
      <p style="font-size: 0.875rem; color: #4B5563;">Discipline data as of {date_label}</p>
    </header>
    <main>
      {records_table}
      <div>{analysis_html}</div>
    </main>
    <footer style="margin-top: 5rem; text-align: right; font-size: 0.875rem;">
        <p>Acknowledged by,</p>
        <p style="margin-top: 4rem; font-weight: bold; text-decoration: underline;">{operator_name}</p>
        <p>{ROLE_LABEL}</p>
    </footer>
</body></html>"#
    )
}

fn compose_records_table(records: &[ViolationRecord]) -> String {
    if records.is_empty() {
        return "<p>No violation records to display.</p>".to_string();
    }

    let mut sorted: Vec<&ViolationRecord> = records.iter().collect();
    sorted.sort_by(|a, b| b.date.cmp(&a.date));

    let mut rows = String::new();
    for record in sorted {
        let violations = record
            .violations
            .iter()
            .map(|v| v.label())
            .collect::<Vec<_>>()
            .join(", ");
        let _ = write!(
            rows,
            r#"
      <tr style="border-bottom: 1px solid #E5E7EB;">
        <td style="padding: 0.75rem; text-align: left;">{}</td>
        <td style="padding: 0.75rem; text-align: left;">{}</td>
        <td style="padding: 0.75rem; text-align: left;">{}</td>
        <td style="padding: 0.75rem; text-align: left;">{}</td>
        <td style="padding: 0.75rem; text-align: left;">{}</td>
        <td style="padding: 0.75rem; text-align: center;">{}</td>
      </tr>"#,
            record.date.format("%d/%m/%Y"),
            record.student_name,
            record.student_class,
            record.gender,
            violations,
            record.violations.len()
        );
    }

    format!(
        r#"<h2 style="font-size: 1.5rem; font-weight: 700; margin-bottom: 1rem; margin-top: 2rem; border-bottom: 2px solid #D1D5DB; padding-bottom: 0.5rem;">Violation Record Details</h2>
    <table style="width: 100%; border-collapse: collapse; font-size: 0.875rem;">
      <thead>
        <tr style="background-color: #F3F4F6; font-weight: 600;">
          <th style="padding: 0.75rem; text-align: left;">Date</th>
          <th style="padding: 0.75rem; text-align: left;">Student Name</th>
          <th style="padding: 0.75rem; text-align: left;">Class</th>
          <th style="padding: 0.75rem; text-align: left;">Gender</th>
          <th style="padding: 0.75rem; text-align: left;">Violation Types</th>
          <th style="padding: 0.75rem; text-align: center;">Count</th>
        </tr>
      </thead>
      <tbody>{rows}
      </tbody>
    </table>"#
    )
}
