//! Colored terminal output.

use colored::*;

use super::{summary_rows, visible_issues};
use crate::analysis::{AnalysisRun, Metric};
use crate::score::{self, Rating};

/// Print a human-readable summary of `run` to stdout.
pub fn write_pretty(run: &AnalysisRun, issue_limit: usize) {
    // Header
    println!();
    print!("  ");
    print!("{}", "lintreport".cyan().bold());
    println!(" v{}", env!("CARGO_PKG_VERSION"));
    println!();

    print!("  {}", "Report: ".dimmed());
    println!("{}", run.title);
    print!("  {}", "Files:  ".dimmed());
    println!("{}", run.total_files());
    println!();

    // Summary
    println!(
        "  {:<22} {:>5} {:>7} {:>8} {:>11} {:>9} {:>8}",
        "Language".bold(),
        "Files".bold(),
        "Style".bold(),
        "Quality".bold(),
        "Complexity".bold(),
        "Security".bold(),
        "Overall".bold()
    );
    for row in summary_rows(run) {
        print!("  {:<22} {:>5}", row.label, row.files);
        for (s, width) in row.scores.iter().zip([7, 8, 11, 9]) {
            print!(" {}", colored_score(*s, width));
        }
        println!(" {}", colored_score(row.overall, 8));
    }
    println!();

    // Details
    for report in run.reports() {
        println!(
            "  {} ({} files)",
            report.language.label().bold(),
            report.file_count()
        );
        for metric in Metric::ALL {
            let result = report.metric(metric);
            println!(
                "    {:<14} {}  {}",
                metric.table_label(),
                colored_score(result.score, 4),
                colored_rating(result.rating())
            );
            let (shown, more) = visible_issues(&result.issues, issue_limit);
            for issue in shown {
                println!("      {} {}", "-".dimmed(), issue);
            }
            if more > 0 {
                println!("      {}", format!("... and {} more issues", more).dimmed());
            }
        }
        println!();
    }
}

fn colored_score(s: f64, width: usize) -> ColoredString {
    let text = format!("{:>width$}", score::display(s), width = width);
    match Rating::from_score(s) {
        Rating::Excellent => text.green().bold(),
        Rating::Good => text.green(),
        Rating::Average => text.yellow(),
        Rating::Poor => text.yellow().bold(),
        Rating::VeryPoor => text.red(),
    }
}

fn colored_rating(rating: Rating) -> ColoredString {
    match rating {
        Rating::Excellent | Rating::Good => rating.as_str().green(),
        Rating::Average => rating.as_str().yellow(),
        Rating::Poor | Rating::VeryPoor => rating.as_str().red(),
    }
}
