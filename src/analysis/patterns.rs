//! Regex vulnerability-pattern scan.
//!
//! Used as the security fallback when the real scanner (bandit, SpotBugs) is
//! not available. Each pattern is counted over the whole file content and
//! reported once per file with its occurrence count.

use regex::Regex;
use std::fs;
use std::path::{Path, PathBuf};

use super::MetricResult;
use crate::score;

/// A compiled pattern with the warning it raises.
pub struct SecurityPattern {
    pub regex: Regex,
    pub warning: &'static str,
}

impl SecurityPattern {
    /// Compile a table of `(pattern, warning)` pairs.
    ///
    /// The tables are compile-time constants, so an invalid entry is a bug.
    pub fn table(entries: &[(&str, &'static str)]) -> Vec<SecurityPattern> {
        entries
            .iter()
            .map(|(pattern, warning)| SecurityPattern {
                regex: Regex::new(pattern).unwrap(),
                warning,
            })
            .collect()
    }
}

/// Outcome of scanning a set of files.
#[derive(Debug, Default)]
pub struct PatternScan {
    pub issues: Vec<String>,
    /// Total number of matches across all files and patterns.
    pub matches: usize,
}

impl PatternScan {
    /// Convert into a metric: `max(0, 10 - min(10, matches / 2))`, or 10 with
    /// "No security issues found" when nothing matched. `preamble` issues are
    /// listed first.
    pub fn into_metric(self, preamble: Vec<String>) -> MetricResult {
        let mut issues = preamble;
        issues.extend(self.issues);
        if self.matches == 0 {
            issues.push("No security issues found".to_string());
            return MetricResult::new(score::MAX_SCORE, issues);
        }
        MetricResult::new(score::penalty_score(self.matches as f64 / 2.0), issues)
    }
}

/// Scan each file for every pattern.
///
/// Unreadable files are recorded as issues and skipped.
pub fn scan_files(files: &[PathBuf], patterns: &[SecurityPattern]) -> PatternScan {
    let mut scan = PatternScan::default();

    for file in files {
        match fs::read(file) {
            Ok(bytes) => {
                let content = String::from_utf8_lossy(&bytes);
                scan_content(file, &content, patterns, &mut scan);
            }
            Err(e) => scan.issues.push(format!(
                "Error analyzing security for {}: {}",
                file.display(),
                e
            )),
        }
    }

    scan
}

fn scan_content(file: &Path, content: &str, patterns: &[SecurityPattern], scan: &mut PatternScan) {
    for p in patterns {
        let count = p.regex.find_iter(content).count();
        if count > 0 {
            scan.issues.push(format!(
                "{}: {} ({} occurrences)",
                file.display(),
                p.warning,
                count
            ));
            scan.matches += count;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn patterns() -> Vec<SecurityPattern> {
        SecurityPattern::table(&[
            (r"\bos\.system\s*\(", "Potential command injection"),
            (r"\beval\s*\(", "Potential code injection"),
        ])
    }

    #[test]
    fn test_scan_counts_occurrences() {
        let temp = TempDir::new().unwrap();
        let file = temp.path().join("a.py");
        fs::write(&file, "os.system(a)\nos.system (b)\neval(c)\n").unwrap();

        let scan = scan_files(&[file.clone()], &patterns());
        assert_eq!(scan.matches, 3);
        assert_eq!(scan.issues.len(), 2);
        assert!(scan.issues[0].ends_with("Potential command injection (2 occurrences)"));

        let metric = scan.into_metric(vec!["fallback".to_string()]);
        assert_eq!(metric.score, 8.5);
        assert_eq!(metric.issues[0], "fallback");
    }

    #[test]
    fn test_clean_file_scores_ten() {
        let temp = TempDir::new().unwrap();
        let file = temp.path().join("a.py");
        fs::write(&file, "print('hi')\n").unwrap();

        let metric = scan_files(&[file], &patterns()).into_metric(Vec::new());
        assert_eq!(metric.score, 10.0);
        assert_eq!(metric.issues, vec!["No security issues found"]);
    }

    #[test]
    fn test_many_matches_clamp_to_zero() {
        let temp = TempDir::new().unwrap();
        let file = temp.path().join("a.py");
        fs::write(&file, "eval(x)\n".repeat(500)).unwrap();

        let metric = scan_files(&[file], &patterns()).into_metric(Vec::new());
        assert_eq!(metric.score, 0.0);
    }

    #[test]
    fn test_unreadable_file_becomes_issue() {
        let metric = scan_files(&[PathBuf::from("/nonexistent/zzz.py")], &patterns())
            .into_metric(Vec::new());
        assert!(metric.issues[0].starts_with("Error analyzing security for"));
        assert_eq!(metric.score, 10.0);
    }
}
