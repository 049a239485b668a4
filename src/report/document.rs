//! Backend-independent report layout.
//!
//! The report is assembled as a flat list of blocks; the PDF writer lays the
//! blocks out onto pages. Keeping the structure separate from the drawing
//! code lets the content be checked without parsing a PDF.

use chrono::{DateTime, TimeZone};
use std::fmt::Display;

use super::{summary_rows, visible_issues, GENERATED_FORMAT};
use crate::analysis::{AnalysisRun, LanguageReport, Metric};
use crate::score::{self, Rating};

/// Header of the summary table.
pub const SUMMARY_HEADER: [&str; 7] = [
    "Language",
    "Files",
    "Style",
    "Quality",
    "Complexity",
    "Security",
    "Overall",
];

/// Header of the per-language metric table.
pub const METRIC_HEADER: [&str; 3] = ["Metric", "Score (0-10)", "Rating"];

/// A unit of report content.
#[derive(Debug, Clone, PartialEq)]
pub enum Block {
    Title(String),
    /// 1 for sections, 2 for metrics, 3 for sub-headings.
    Heading {
        level: u8,
        text: String,
    },
    Text(String),
    Bullet(String),
    Table {
        header: Vec<String>,
        rows: Vec<Vec<String>>,
        /// Shade the last row (an "Overall" row).
        shade_last: bool,
        /// Relative column widths.
        widths: Vec<f32>,
    },
    /// Vertical gap, in points.
    Spacer(f32),
}

/// Ordered blocks of one report.
#[derive(Debug, Clone, Default)]
pub struct ReportDocument {
    pub blocks: Vec<Block>,
}

impl ReportDocument {
    /// Lay out the report for `run`.
    pub fn build<Tz: TimeZone>(
        run: &AnalysisRun,
        issue_limit: usize,
        generated_at: &DateTime<Tz>,
    ) -> Self
    where
        Tz::Offset: Display,
    {
        let mut doc = ReportDocument::default();

        doc.push(Block::Title(format!("Code Quality Report: {}", run.title)));
        doc.push(Block::Spacer(18.0));
        doc.push(Block::Text(format!(
            "Generated on: {}",
            generated_at.format(GENERATED_FORMAT)
        )));
        doc.push(Block::Spacer(18.0));

        doc.heading(1, "Summary");
        let rows = summary_rows(run);
        doc.push(Block::Table {
            header: SUMMARY_HEADER.iter().map(|s| s.to_string()).collect(),
            rows: rows.iter().map(|r| r.cells()).collect(),
            shade_last: rows.len() > 1,
            widths: vec![1.2, 0.6, 0.8, 0.8, 0.8, 0.8, 0.8],
        });
        doc.push(Block::Spacer(36.0));

        for report in run.reports() {
            doc.language_section(report, issue_limit);
        }

        doc
    }

    fn push(&mut self, block: Block) {
        self.blocks.push(block);
    }

    fn heading(&mut self, level: u8, text: &str) {
        self.push(Block::Heading {
            level,
            text: text.to_string(),
        });
        self.push(Block::Spacer(7.0));
    }

    fn language_section(&mut self, report: &LanguageReport, issue_limit: usize) {
        self.heading(1, &format!("{} Analysis", report.language.label()));
        self.push(Block::Text(format!("Files analyzed: {}", report.file_count())));
        self.push(Block::Spacer(7.0));

        let mut rows: Vec<Vec<String>> = Metric::ALL
            .iter()
            .map(|m| score_row(m.table_label(), report.metric(*m).score))
            .collect();
        rows.push(score_row("Overall", report.overall()));
        self.push(Block::Table {
            header: METRIC_HEADER.iter().map(|s| s.to_string()).collect(),
            rows,
            shade_last: true,
            widths: vec![2.0, 1.0, 1.5],
        });
        self.push(Block::Spacer(18.0));

        for metric in Metric::ALL {
            let result = report.metric(metric);
            self.heading(2, &format!("{} Analysis", metric.title()));
            self.push(Block::Text(format!(
                "Score: {}/10 ({})",
                score::display(result.score),
                result.rating()
            )));
            self.push(Block::Spacer(7.0));

            self.push(Block::Heading {
                level: 3,
                text: "Issues:".to_string(),
            });
            if result.issues.is_empty() {
                self.push(Block::Text("No issues found.".to_string()));
            } else {
                let (shown, more) = visible_issues(&result.issues, issue_limit);
                for issue in shown {
                    self.push(Block::Bullet(issue.clone()));
                }
                if more > 0 {
                    self.push(Block::Text(format!("... and {} more issues", more)));
                }
            }
            self.push(Block::Spacer(18.0));
        }
    }

    /// All blocks that carry text, flattened to strings, in order.
    pub fn text_lines(&self) -> Vec<String> {
        let mut lines = Vec::new();
        for block in &self.blocks {
            match block {
                Block::Title(t) | Block::Text(t) | Block::Bullet(t) => lines.push(t.clone()),
                Block::Heading { text, .. } => lines.push(text.clone()),
                Block::Table { header, rows, .. } => {
                    lines.push(header.join(" | "));
                    lines.extend(rows.iter().map(|r| r.join(" | ")));
                }
                Block::Spacer(_) => {}
            }
        }
        lines
    }

    pub fn bullet_count(&self) -> usize {
        self.blocks
            .iter()
            .filter(|b| matches!(b, Block::Bullet(_)))
            .count()
    }

    /// Tables in document order.
    pub fn tables(&self) -> impl Iterator<Item = (&Vec<String>, &Vec<Vec<String>>, bool)> {
        self.blocks.iter().filter_map(|b| match b {
            Block::Table {
                header,
                rows,
                shade_last,
                ..
            } => Some((header, rows, *shade_last)),
            _ => None,
        })
    }
}

fn score_row(label: &str, value: f64) -> Vec<String> {
    vec![
        label.to_string(),
        score::display(value),
        Rating::from_score(value).to_string(),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::MetricResult;
    use crate::language::Language;
    use chrono::Utc;
    use std::path::PathBuf;

    fn run_with_issues(n: usize) -> AnalysisRun {
        let mut report = LanguageReport::new(Language::Python, vec![PathBuf::from("a.py")]);
        let issues = (0..n).map(|i| format!("a.py:{}:1: E501 line too long", i)).collect();
        report.set_metric(Metric::Style, MetricResult::new(6.0, issues));
        report.set_metric(Metric::Quality, MetricResult::new(9.0, vec![]));
        report.set_metric(Metric::Complexity, MetricResult::new(10.0, vec![]));
        report.set_metric(Metric::Security, MetricResult::new(2.99, vec![]));
        let mut run = AnalysisRun::new("upload.zip", "/tmp");
        run.insert(report);
        run
    }

    fn build(run: &AnalysisRun) -> ReportDocument {
        let at = Utc.with_ymd_and_hms(2024, 1, 2, 3, 4, 5).unwrap();
        ReportDocument::build(run, 20, &at)
    }

    #[test]
    fn test_header_blocks() {
        let doc = build(&run_with_issues(0));
        let lines = doc.text_lines();
        assert_eq!(lines[0], "Code Quality Report: upload.zip");
        assert_eq!(lines[1], "Generated on: 2024-01-02 03:04:05");
        assert_eq!(lines[2], "Summary");
        assert_eq!(
            lines[3],
            "Language | Files | Style | Quality | Complexity | Security | Overall"
        );
    }

    #[test]
    fn test_truncates_long_issue_lists() {
        let doc = build(&run_with_issues(27));
        assert_eq!(doc.bullet_count(), 20);
        assert!(doc
            .text_lines()
            .contains(&"... and 7 more issues".to_string()));
    }

    #[test]
    fn test_exactly_limit_issues_not_truncated() {
        let doc = build(&run_with_issues(20));
        assert_eq!(doc.bullet_count(), 20);
        assert!(!doc.text_lines().iter().any(|l| l.starts_with("... and")));
    }

    #[test]
    fn test_empty_issue_list() {
        let doc = build(&run_with_issues(0));
        let lines = doc.text_lines();
        assert_eq!(
            lines.iter().filter(|l| *l == "No issues found.").count(),
            4
        );
    }

    #[test]
    fn test_metric_table_and_ratings() {
        let doc = build(&run_with_issues(1));
        let tables: Vec<_> = doc.tables().collect();
        assert_eq!(tables.len(), 2);

        let (_, summary, shaded) = tables[0];
        assert_eq!(summary.len(), 1);
        assert!(!shaded);

        let (header, rows, shaded) = tables[1];
        assert_eq!(header, &vec!["Metric", "Score (0-10)", "Rating"]);
        assert!(shaded);
        assert_eq!(rows[0], vec!["Code Style", "6.0", "Average"]);
        assert_eq!(rows[1], vec!["Code Quality", "9.0", "Excellent"]);
        assert_eq!(rows[3], vec!["Security", "3.0", "Very Poor"]);
        assert_eq!(rows[4][0], "Overall");

        let lines = doc.text_lines();
        assert!(lines.contains(&"Python Analysis".to_string()));
        assert!(lines.contains(&"Files analyzed: 1".to_string()));
        assert!(lines.contains(&"Score: 6.0/10 (Average)".to_string()));
        assert!(lines.contains(&"Security Analysis".to_string()));
    }
}
