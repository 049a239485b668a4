//! Python analyzer: flake8, pylint, radon and bandit.

use lazy_static::lazy_static;
use regex::Regex;
use std::path::{Path, PathBuf};

use super::output_lines;
use crate::analysis::patterns::{scan_files, SecurityPattern};
use crate::analysis::{AnalyzerSettings, LanguageAnalyzer, Metric, MetricResult};
use crate::score;
use crate::tools::Tool;

lazy_static! {
    static ref PYLINT_RATING: Regex =
        Regex::new(r"Your code has been rated at ([-\d.]+)/10").unwrap();
    static ref RADON_RANK: Regex = Regex::new(r"[A-F] \((\d+)\)").unwrap();
    static ref SECURITY_PATTERNS: Vec<SecurityPattern> = SecurityPattern::table(&[
        (r"\bos\.system\s*\(", "Potential command injection"),
        (r"\bos\.popen\s*\(", "Potential command injection"),
        (
            r"\bsubprocess\.\w+\s*\([^)]*shell\s*=\s*True",
            "Potential command injection",
        ),
        (r"\beval\s*\(", "Potential code injection"),
        (r"\bexec\s*\(", "Potential code injection"),
        (r"\bpickle\.loads?\s*\(", "Potential unsafe deserialization"),
        (r"\byaml\.load\s*\(", "Potential unsafe deserialization"),
        (
            r#"\.execute\s*\(\s*(?:f["']|["'][^"'\n]*["']\s*(?:%|\+))"#,
            "Potential SQL injection",
        ),
        (
            r#"(?i)\b(?:password|passwd|secret|api_key|token)\s*=\s*["'][^"'\n]+["']"#,
            "Hard-coded credential",
        ),
        (r"\bverify\s*=\s*False\b", "TLS verification disabled"),
    ]);
}

pub struct PythonAnalyzer {
    settings: AnalyzerSettings,
}

impl PythonAnalyzer {
    pub fn new(settings: AnalyzerSettings) -> Self {
        Self { settings }
    }

    fn tool(&self, program: &str) -> Tool {
        Tool::new(program, self.settings.timeout)
    }
}

impl LanguageAnalyzer for PythonAnalyzer {
    fn name(&self) -> &'static str {
        "Python"
    }

    fn extensions(&self) -> &'static [&'static str] {
        &["py"]
    }

    fn settings(&self) -> &AnalyzerSettings {
        &self.settings
    }

    fn tool_for(&self, metric: Metric) -> &'static str {
        match metric {
            Metric::Style => "flake8",
            Metric::Quality => "pylint",
            Metric::Complexity => "radon",
            Metric::Security => "bandit",
        }
    }

    fn check_style(&self, _dir: &Path, files: &[PathBuf]) -> anyhow::Result<MetricResult> {
        let mut issues = Vec::new();

        for file in files {
            let output = run_or_skip!(self.tool("flake8").path_arg(file), Metric::Style);
            issues.extend(output_lines(&output.combined()).map(String::from));
        }

        let avg = score::per_item(issues.len() as f64, files.len());
        Ok(MetricResult::new(score::penalty_score(avg), issues))
    }

    fn check_quality(&self, _dir: &Path, files: &[PathBuf]) -> anyhow::Result<MetricResult> {
        let mut issues = Vec::new();
        let mut total = 0.0;

        for file in files {
            let output = run_or_skip!(
                self.tool("pylint")
                    .arg("--output-format=text")
                    .path_arg(file),
                Metric::Quality
            );
            let parsed = parse_pylint(&output.combined());
            total += parsed.rating.unwrap_or(0.0);
            issues.extend(parsed.issues);
        }

        Ok(MetricResult::new(score::per_item(total, files.len()), issues))
    }

    fn check_complexity(&self, _dir: &Path, files: &[PathBuf]) -> anyhow::Result<MetricResult> {
        let mut radon = RadonSummary::default();

        for file in files {
            let output = run_or_skip!(
                self.tool("radon").arg("cc").path_arg(file).arg("--no-assert"),
                Metric::Complexity
            );
            radon.add(&output.combined());
        }

        Ok(radon.into_metric())
    }

    fn check_security(&self, dir: &Path, files: &[PathBuf]) -> anyhow::Result<MetricResult> {
        match self.tool("bandit").arg("-r").path_arg(dir).run() {
            Ok(output) => Ok(parse_bandit(&output.combined())),
            Err(e) if e.is_unavailable() => {
                log::info!("{}, falling back to pattern scan", e);
                let preamble = format!("{}, using pattern-based security analysis", e);
                Ok(pattern_security(files, preamble))
            }
            Err(e) => Err(e.into()),
        }
    }
}

/// Parsed pylint output for one file.
#[derive(Debug, Default, PartialEq)]
pub struct PylintOutput {
    /// Rating from the summary line, floored at 0.
    pub rating: Option<f64>,
    pub issues: Vec<String>,
}

pub fn parse_pylint(output: &str) -> PylintOutput {
    let rating = PYLINT_RATING
        .captures(output)
        .and_then(|c| c[1].parse::<f64>().ok())
        .map(|r| r.max(0.0));

    let issues = output
        .trim()
        .lines()
        .filter(|l| l.contains(':') && !l.starts_with("Your code"))
        .map(String::from)
        .collect();

    PylintOutput { rating, issues }
}

/// Running totals over radon `cc` outputs.
#[derive(Debug, Default)]
pub struct RadonSummary {
    pub issues: Vec<String>,
    pub complexity_sum: u64,
    pub blocks: usize,
}

impl RadonSummary {
    pub fn add(&mut self, output: &str) {
        for line in output_lines(output) {
            self.issues.push(line.to_string());
            if let Some(n) = RADON_RANK
                .captures(line)
                .and_then(|c| c[1].parse::<u64>().ok())
            {
                self.complexity_sum += n;
                self.blocks += 1;
            }
        }
    }

    /// `max(0, 10 - min(10, mean block complexity))`, 10 with no blocks.
    pub fn into_metric(self) -> MetricResult {
        let avg = score::per_item(self.complexity_sum as f64, self.blocks);
        MetricResult::new(score::penalty_score(avg), self.issues)
    }
}

pub fn parse_bandit(output: &str) -> MetricResult {
    let issues: Vec<String> = output
        .trim()
        .lines()
        .filter(|l| l.contains("Issue:") || l.contains("Location:") || l.contains("Severity:"))
        .map(String::from)
        .collect();

    if issues.is_empty() {
        return MetricResult::new(
            score::MAX_SCORE,
            vec!["No security issues found".to_string()],
        );
    }

    let count = issues.iter().filter(|l| l.contains("Issue:")).count();
    MetricResult::new(score::penalty_score(count as f64), issues)
}

/// Regex scan used when bandit cannot run.
pub fn pattern_security(files: &[PathBuf], preamble: String) -> MetricResult {
    scan_files(files, &SECURITY_PATTERNS).into_metric(vec![preamble])
}
