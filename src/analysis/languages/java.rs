//! Java analyzer: Checkstyle, PMD, a branch-count heuristic and SpotBugs.

use lazy_static::lazy_static;
use regex::Regex;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use tempfile::{NamedTempFile, TempDir};

use super::output_lines;
use crate::analysis::patterns::{scan_files, SecurityPattern};
use crate::analysis::{AnalyzerSettings, LanguageAnalyzer, Metric, MetricResult};
use crate::score;
use crate::tools::{self, Tool};

/// Checkstyle configuration written for every style run.
const CHECKSTYLE_CONFIG: &str = r#"<?xml version="1.0"?>
<!DOCTYPE module PUBLIC "-//Checkstyle//DTD Checkstyle Configuration 1.3//EN" "https://checkstyle.org/dtds/configuration_1_3.dtd">
<module name="Checker">
  <module name="TreeWalker">
    <module name="MissingSwitchDefault"/>
    <module name="FallThrough"/>
    <module name="VisibilityModifier"/>
    <module name="EmptyBlock"/>
    <module name="EmptyCatchBlock"/>
    <module name="AvoidStarImport"/>
    <module name="UnusedImports"/>
    <module name="OneStatementPerLine"/>
    <module name="OverloadMethodsDeclarationOrder"/>
    <module name="PackageDeclaration"/>
    <module name="MemberName"/>
    <module name="CyclomaticComplexity"/>
  </module>
</module>
"#;

lazy_static! {
    static ref BRANCH_KEYWORDS: Regex = Regex::new(r"\b(?:if|for|while|switch|catch)\s*\(").unwrap();
    static ref SECURITY_PATTERNS: Vec<SecurityPattern> = SecurityPattern::table(&[
        (r"\.exec\s*\(", "Potential command injection"),
        (r"\.executeQuery\s*\(.*\+", "Potential SQL injection"),
        (r"\.executeUpdate\s*\(.*\+", "Potential SQL injection"),
        (r"\.createStatement\s*\(.*\+", "Potential SQL injection"),
        (r"\.prepareStatement\s*\(.*\+", "Potential SQL injection"),
        (r"\.createQuery\s*\(.*\+", "Potential HQL/JPQL injection"),
        (r"\.eval\s*\(", "Potential code injection"),
        (r"\.deserialize\s*\(", "Potential deserialization vulnerability"),
        (r"\.readObject\s*\(", "Potential deserialization vulnerability"),
        (r"\.readUnshared\s*\(", "Potential deserialization vulnerability"),
        (r"\.readExternal\s*\(", "Potential deserialization vulnerability"),
        (r"\.readResolve\s*\(", "Potential deserialization vulnerability"),
        (r"\.readObjectNoData\s*\(", "Potential deserialization vulnerability"),
        (r"\.load\s*\(.*\.class\.getResource", "Potential unsafe resource loading"),
        (r"\.printStackTrace\s*\(", "Information leakage through stack traces"),
        (r"System\.out\.print", "Debug information leakage"),
        (r"\.getParameter\s*\(.*\)", "Unvalidated input"),
        (r"\.getHeader\s*\(.*\)", "Unvalidated header"),
        (r"\.getCookie\s*\(.*\)", "Unvalidated cookie"),
        (r"\.getAttribute\s*\(.*\)", "Unvalidated attribute"),
    ]);
}

pub struct JavaAnalyzer {
    settings: AnalyzerSettings,
}

impl JavaAnalyzer {
    pub fn new(settings: AnalyzerSettings) -> Self {
        Self { settings }
    }

    fn tool(&self, program: &str) -> Tool {
        Tool::new(program, self.settings.timeout)
    }

    /// Compile `files` into `classes` and run SpotBugs over the result.
    fn run_spotbugs(&self, jar: &Path, files: &[PathBuf]) -> anyhow::Result<MetricResult> {
        let classes = TempDir::new()?;

        for file in files {
            let output = run_or_skip!(
                self.tool("javac").arg("-d").path_arg(classes.path()).path_arg(file),
                Metric::Security
            );
            if !output.success() {
                log::debug!("javac failed for {}, continuing", file.display());
            }
        }

        let output = run_or_skip!(
            self.tool("java")
                .arg("-jar")
                .path_arg(jar)
                .args(["-textui", "-effort:max", "-low"])
                .path_arg(classes.path()),
            Metric::Security
        );

        Ok(parse_spotbugs(&output.combined()))
    }
}

impl LanguageAnalyzer for JavaAnalyzer {
    fn name(&self) -> &'static str {
        "Java"
    }

    fn extensions(&self) -> &'static [&'static str] {
        &["java"]
    }

    fn settings(&self) -> &AnalyzerSettings {
        &self.settings
    }

    fn tool_for(&self, metric: Metric) -> &'static str {
        match metric {
            Metric::Style => "Checkstyle",
            Metric::Quality => "PMD",
            Metric::Complexity => "complexity analysis",
            Metric::Security => "SpotBugs",
        }
    }

    fn check_style(&self, _dir: &Path, files: &[PathBuf]) -> anyhow::Result<MetricResult> {
        let jar = &self.settings.checkstyle_jar;
        if !jar.exists() {
            return Ok(MetricResult::neutral(format!(
                "Checkstyle JAR not found at {}, skipping style analysis",
                jar.display()
            )));
        }

        let mut config = tempfile::Builder::new().suffix(".xml").tempfile()?;
        config.write_all(CHECKSTYLE_CONFIG.as_bytes())?;
        config.flush()?;

        let mut issues = Vec::new();
        for file in files {
            let output = run_or_skip!(
                self.tool("java")
                    .arg("-jar")
                    .path_arg(jar)
                    .arg("-c")
                    .path_arg(config.path())
                    .path_arg(file),
                Metric::Style
            );
            issues.extend(checkstyle_errors(&output.combined()));
        }

        let avg = score::per_item(issues.len() as f64, files.len());
        Ok(MetricResult::new(score::penalty_score(avg), issues))
    }

    fn check_quality(&self, _dir: &Path, files: &[PathBuf]) -> anyhow::Result<MetricResult> {
        if !tools::is_available("pmd", &["--version"], self.settings.timeout) {
            return Ok(MetricResult::neutral(
                "PMD not found, skipping quality analysis",
            ));
        }

        let mut list = NamedTempFile::new()?;
        for file in files {
            writeln!(list, "{}", file.display())?;
        }
        list.flush()?;

        let output = run_or_skip!(
            self.tool("pmd")
                .args(["check", "-f", "text", "-R"])
                .arg(&self.settings.pmd_ruleset)
                .arg("--file-list")
                .path_arg(list.path()),
            Metric::Quality
        );

        let issues = pmd_issues(&output.combined());
        let avg = score::per_item(issues.len() as f64, files.len());
        Ok(MetricResult::new(score::penalty_score(avg), issues))
    }

    fn check_complexity(&self, _dir: &Path, files: &[PathBuf]) -> anyhow::Result<MetricResult> {
        let mut issues = Vec::new();
        let mut total = 0.0;
        let mut counted = 0;

        for file in files {
            match fs::read(file) {
                Ok(bytes) => {
                    let content = String::from_utf8_lossy(&bytes);
                    let branches = count_branches(&content);
                    if branches > 0 {
                        issues.push(format!(
                            "{}: Estimated complexity: {} statements",
                            file.display(),
                            branches
                        ));
                        total += branch_density(branches, &content);
                        counted += 1;
                    }
                }
                Err(e) => issues.push(format!(
                    "Error analyzing complexity for {}: {}",
                    file.display(),
                    e
                )),
            }
        }

        if counted == 0 {
            issues.push("No complexity issues found".to_string());
            return Ok(MetricResult::new(score::MAX_SCORE, issues));
        }

        let avg = score::per_item(total, counted);
        Ok(MetricResult::new(score::penalty_score(avg / 2.0), issues))
    }

    fn check_security(&self, _dir: &Path, files: &[PathBuf]) -> anyhow::Result<MetricResult> {
        let jar = &self.settings.spotbugs_jar;
        if jar.exists() {
            return self.run_spotbugs(jar, files);
        }

        let preamble = format!(
            "SpotBugs JAR not found at {}, using alternative security analysis",
            jar.display()
        );
        Ok(pattern_security(files, preamble))
    }
}

/// `[ERROR]` lines of Checkstyle output.
pub fn checkstyle_errors(output: &str) -> Vec<String> {
    output
        .lines()
        .filter(|l| l.starts_with("[ERROR]"))
        .map(String::from)
        .collect()
}

/// PMD findings: every non-empty line that is not part of a usage message.
pub fn pmd_issues(output: &str) -> Vec<String> {
    output_lines(output)
        .filter(|l| !l.starts_with("Usage:") && !l.starts_with("Options:"))
        .map(String::from)
        .collect()
}

/// Number of `if`, `for`, `while`, `switch` and `catch` statements.
pub fn count_branches(content: &str) -> usize {
    BRANCH_KEYWORDS.find_iter(content).count()
}

/// Branches per hundred lines.
pub fn branch_density(branches: usize, content: &str) -> f64 {
    let lines = content.split('\n').count() as f64;
    branches as f64 / (lines / 100.0)
}

/// SpotBugs text UI: every non-empty line after `Warnings generated:`.
pub fn parse_spotbugs(output: &str) -> MetricResult {
    let mut in_warnings = false;
    let mut issues = Vec::new();

    for line in output.trim().lines() {
        if line.contains("Warnings generated:") {
            in_warnings = true;
        }
        if in_warnings && !line.trim().is_empty() && !line.starts_with("Warnings generated:") {
            issues.push(line.to_string());
        }
    }

    if issues.is_empty() {
        return MetricResult::new(
            score::MAX_SCORE,
            vec!["No security issues found".to_string()],
        );
    }

    let n = issues.len() as f64;
    MetricResult::new(score::penalty_score(n / 2.0), issues)
}

/// Regex scan used when SpotBugs is not installed.
pub fn pattern_security(files: &[PathBuf], preamble: String) -> MetricResult {
    scan_files(files, &SECURITY_PATTERNS).into_metric(vec![preamble])
}
