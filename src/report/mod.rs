//! Report rendering for analysis runs.
//!
//! Supports three output formats:
//! - PDF: paginated report with a summary table and per-language details
//! - JSON: the full run, including every issue, for programmatic use
//! - Pretty: colored terminal summary

mod document;
mod json;
mod pdf;
mod pretty;

pub use document::{Block, ReportDocument};
pub use json::{build_json, write_json, JsonReport};
pub use pdf::write_pdf;
pub use pretty::write_pretty;

use chrono::{DateTime, TimeZone};
use std::fmt::Display;

use crate::analysis::{AnalysisRun, Metric};
use crate::score;

/// Issues rendered per metric before the list is cut short.
pub const DEFAULT_ISSUE_LIMIT: usize = 20;

/// Timestamp format used in the report body.
pub const GENERATED_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Timestamp format used in report file names.
pub const FILE_STAMP_FORMAT: &str = "%Y%m%d_%H%M%S";

/// One row of the summary table.
#[derive(Debug, Clone, PartialEq)]
pub struct SummaryRow {
    pub label: String,
    pub files: usize,
    /// Style, quality, complexity and security, in that order.
    pub scores: [f64; 4],
    pub overall: f64,
}

impl SummaryRow {
    /// Cells as rendered: scores with one decimal.
    pub fn cells(&self) -> Vec<String> {
        let mut cells = vec![self.label.clone(), self.files.to_string()];
        cells.extend(self.scores.iter().map(|s| score::display(*s)));
        cells.push(score::display(self.overall));
        cells
    }
}

/// Summary table rows: one per language, plus an "Overall" row of
/// column-wise means when more than one language is present.
pub fn summary_rows(run: &AnalysisRun) -> Vec<SummaryRow> {
    let mut rows: Vec<SummaryRow> = run
        .reports()
        .map(|r| SummaryRow {
            label: r.language.label().to_string(),
            files: r.file_count(),
            scores: Metric::ALL.map(|m| r.metric(m).score),
            overall: r.overall(),
        })
        .collect();

    if rows.len() > 1 {
        let mut scores = [0.0; 4];
        for (i, slot) in scores.iter_mut().enumerate() {
            let column: Vec<f64> = rows.iter().map(|r| r.scores[i]).collect();
            *slot = score::mean(&column);
        }
        let overalls: Vec<f64> = rows.iter().map(|r| r.overall).collect();
        let overall = SummaryRow {
            label: "Overall".to_string(),
            files: rows.iter().map(|r| r.files).sum(),
            scores,
            overall: score::mean(&overalls),
        };
        rows.push(overall);
    }

    rows
}

/// Split an issue list into the rendered prefix and the number left out.
pub fn visible_issues(issues: &[String], limit: usize) -> (&[String], usize) {
    if issues.len() <= limit {
        (issues, 0)
    } else {
        (&issues[..limit], issues.len() - limit)
    }
}

/// `code_quality_report_<YYYYmmdd_HHMMSS>.pdf`
pub fn report_file_name<Tz: TimeZone>(now: &DateTime<Tz>) -> String
where
    Tz::Offset: Display,
{
    format!("code_quality_report_{}.pdf", now.format(FILE_STAMP_FORMAT))
}

/// `code_quality_report_PR_<owner>_<repo>_<n>_<YYYYmmdd_HHMMSS>.pdf`
pub fn pr_report_file_name<Tz: TimeZone>(
    owner: &str,
    repo: &str,
    number: u64,
    now: &DateTime<Tz>,
) -> String
where
    Tz::Offset: Display,
{
    format!(
        "code_quality_report_PR_{}_{}_{}_{}.pdf",
        owner,
        repo,
        number,
        now.format(FILE_STAMP_FORMAT)
    )
}
