//! JavaScript/TypeScript analyzer: ESLint, JSHint and npm audit.
//!
//! ESLint and JSHint are invoked through `npx` once per file and their JSON
//! reporters are parsed. npm audit runs once against the analyzed directory
//! and needs a `package.json` there.

use lazy_static::lazy_static;
use regex::Regex;
use serde::Deserialize;
use serde_json::{json, Value};
use std::collections::BTreeMap;
use std::fmt::Display;
use std::path::{Path, PathBuf};

use super::ScopedConfig;
use crate::analysis::{AnalyzerSettings, LanguageAnalyzer, Metric, MetricResult};
use crate::score;
use crate::tools::Tool;

const ESLINT_CONFIG_NAME: &str = ".eslintrc.json";

/// Complexity rule passed to ESLint on the command line.
const COMPLEXITY_RULE: &str = r#"complexity: ["error", 10]"#;

lazy_static! {
    static ref COMPLEXITY_VALUE: Regex = Regex::new(r"has a complexity of (\d+)").unwrap();
}

pub struct JavaScriptAnalyzer {
    settings: AnalyzerSettings,
}

impl JavaScriptAnalyzer {
    pub fn new(settings: AnalyzerSettings) -> Self {
        Self { settings }
    }

    fn npx(&self, tool: &str) -> Tool {
        Tool::new("npx", self.settings.timeout).arg(tool)
    }
}

impl LanguageAnalyzer for JavaScriptAnalyzer {
    fn name(&self) -> &'static str {
        "JavaScript/TypeScript"
    }

    fn extensions(&self) -> &'static [&'static str] {
        &["js", "jsx", "ts", "tsx"]
    }

    fn settings(&self) -> &AnalyzerSettings {
        &self.settings
    }

    fn tool_for(&self, metric: Metric) -> &'static str {
        match metric {
            Metric::Style => "ESLint",
            Metric::Quality => "JSHint",
            Metric::Complexity => "ESLint complexity",
            Metric::Security => "npm audit",
        }
    }

    fn check_style(&self, dir: &Path, files: &[PathBuf]) -> anyhow::Result<MetricResult> {
        let config = ScopedConfig::write_if_absent(
            dir,
            ESLINT_CONFIG_NAME,
            &serde_json::to_string_pretty(&recommended_config())?,
        )?;
        if config.created() {
            log::debug!("using temporary {} in {}", ESLINT_CONFIG_NAME, dir.display());
        }
        let mut issues = Vec::new();
        let mut total = 0usize;

        for file in files {
            let output = run_or_skip!(
                self.npx("eslint").arg("--format=json").path_arg(file),
                Metric::Style
            );
            let file_name = file.display();
            match parse_eslint(&output.stdout) {
                Ok(results) => {
                    for message in results.iter().flat_map(|r| &r.messages) {
                        issues.push(message.describe(&file_name, true));
                        total += 1;
                    }
                }
                Err(_) => issues.push(format!(
                    "Error parsing ESLint output for {}: {}",
                    file_name,
                    output.combined().trim()
                )),
            }
        }

        let avg = score::per_item(total as f64, files.len());
        Ok(MetricResult::new(score::penalty_score(avg), issues))
    }

    fn check_quality(&self, _dir: &Path, files: &[PathBuf]) -> anyhow::Result<MetricResult> {
        let mut issues = Vec::new();
        let mut total = 0usize;

        for file in files {
            let output = run_or_skip!(
                self.npx("jshint").arg("--reporter=json").path_arg(file),
                Metric::Quality
            );
            let file_name = file.display();
            match parse_jshint(&output.stdout) {
                Ok(entries) => {
                    for entry in entries {
                        issues.push(entry.describe(&file_name));
                        total += 1;
                    }
                }
                Err(_) => issues.push(format!("Error parsing JSHint output for {}", file_name)),
            }
        }

        let avg = score::per_item(total as f64, files.len());
        Ok(MetricResult::new(score::penalty_score(avg * 2.0), issues))
    }

    fn check_complexity(&self, dir: &Path, files: &[PathBuf]) -> anyhow::Result<MetricResult> {
        let config = ScopedConfig::write_if_absent(
            dir,
            ESLINT_CONFIG_NAME,
            &serde_json::to_string_pretty(&complexity_config())?,
        )?;
        if config.created() {
            log::debug!("using temporary {} in {}", ESLINT_CONFIG_NAME, dir.display());
        }
        let mut summary = ComplexitySummary::default();

        for file in files {
            let output = run_or_skip!(
                self.npx("eslint")
                    .args(["--rule", COMPLEXITY_RULE, "--format=json"])
                    .path_arg(file),
                Metric::Complexity
            );
            let file_name = file.display();
            let outcome = parse_eslint(&output.stdout)
                .map_err(anyhow::Error::from)
                .and_then(|results| summary.add(&file_name, &results));
            if let Err(e) = outcome {
                summary.issues.push(format!(
                    "Error analyzing complexity for {}: {}",
                    file_name, e
                ));
            }
        }

        Ok(summary.into_metric())
    }

    fn check_security(&self, dir: &Path, _files: &[PathBuf]) -> anyhow::Result<MetricResult> {
        if !dir.join("package.json").exists() {
            return Ok(MetricResult::neutral(
                "No package.json found, skipping security audit",
            ));
        }

        let output = run_or_skip!(
            Tool::new("npm", self.settings.timeout)
                .args(["audit", "--json"])
                .current_dir(dir),
            Metric::Security
        );

        Ok(match parse_npm_audit(&output.stdout) {
            Ok(audit) => audit.into_metric(),
            Err(e) => MetricResult::new(0.0, vec![format!("Error running npm audit: {}", e)]),
        })
    }
}

/// `.eslintrc.json` used for style checks when the project has none.
pub fn recommended_config() -> Value {
    json!({
        "extends": "eslint:recommended",
        "parserOptions": {
            "ecmaVersion": 2020,
            "sourceType": "module"
        },
        "env": {
            "browser": true,
            "node": true,
            "es6": true
        }
    })
}

/// `.eslintrc.json` used for complexity checks when the project has none.
pub fn complexity_config() -> Value {
    json!({
        "parserOptions": {
            "ecmaVersion": 2020,
            "sourceType": "module"
        },
        "rules": {
            "complexity": ["error", 10]
        }
    })
}

/// One file entry of ESLint's JSON formatter.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EslintFileResult {
    #[serde(default)]
    pub file_path: String,
    #[serde(default)]
    pub messages: Vec<EslintMessage>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EslintMessage {
    pub rule_id: Option<String>,
    #[serde(default)]
    pub message: String,
    pub line: Option<u64>,
    pub column: Option<u64>,
}

impl EslintMessage {
    /// `<file>:<line>:<col> - <message>`, optionally followed by ` (<ruleId>)`.
    pub fn describe(&self, file: &dyn Display, with_rule: bool) -> String {
        let mut s = format!(
            "{}:{}:{} - {}",
            file,
            or_dash(self.line),
            or_dash(self.column),
            self.message
        );
        if with_rule {
            s.push_str(&format!(" ({})", self.rule_id.as_deref().unwrap_or("-")));
        }
        s
    }
}

fn or_dash(value: Option<u64>) -> String {
    value.map_or_else(|| "-".to_string(), |v| v.to_string())
}

pub fn parse_eslint(output: &str) -> serde_json::Result<Vec<EslintFileResult>> {
    serde_json::from_str(output.trim())
}

/// Complexity totals over ESLint results.
#[derive(Debug, Default)]
pub struct ComplexitySummary {
    pub issues: Vec<String>,
    pub total: u64,
    /// Files with at least one complexity message.
    pub files: usize,
}

impl ComplexitySummary {
    pub fn add(&mut self, file: &dyn Display, results: &[EslintFileResult]) -> anyhow::Result<()> {
        let mut found = 0;
        for message in results.iter().flat_map(|r| &r.messages) {
            if message.rule_id.as_deref() != Some("complexity") {
                continue;
            }
            let value: u64 = COMPLEXITY_VALUE
                .captures(&message.message)
                .and_then(|c| c[1].parse().ok())
                .ok_or_else(|| {
                    anyhow::anyhow!("no complexity value in {:?}", message.message)
                })?;
            self.issues.push(message.describe(file, false));
            self.total += value;
            found += 1;
        }
        if found > 0 {
            self.files += 1;
        }
        Ok(())
    }

    /// `max(0, 10 - min(10, mean / 2))`, 10 when no file had a finding.
    pub fn into_metric(self) -> MetricResult {
        let avg = score::per_item(self.total as f64, self.files);
        MetricResult::new(score::penalty_score(avg / 2.0), self.issues)
    }
}

/// One JSHint finding.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct JshintEntry {
    pub line: Option<u64>,
    #[serde(alias = "character")]
    pub col: Option<u64>,
    #[serde(default)]
    pub reason: String,
}

impl JshintEntry {
    pub fn describe(&self, file: &dyn Display) -> String {
        format!(
            "{}:{}:{} - {}",
            file,
            or_dash(self.line),
            or_dash(self.col),
            self.reason
        )
    }
}

/// Parse JSHint JSON output.
///
/// Accepts a bare array of findings, an array of `{"error": {...}}` wrappers,
/// or an object holding such a list under `result` or `errors`. Empty output
/// means no findings.
pub fn parse_jshint(output: &str) -> serde_json::Result<Vec<JshintEntry>> {
    let trimmed = output.trim();
    if trimmed.is_empty() {
        return Ok(Vec::new());
    }

    let value: Value = serde_json::from_str(trimmed)?;
    let list = match value {
        Value::Array(items) => items,
        Value::Object(mut map) => match map.remove("result").or_else(|| map.remove("errors")) {
            Some(Value::Array(items)) => items,
            Some(other) => vec![other],
            None => Vec::new(),
        },
        other => vec![other],
    };

    list.into_iter()
        .map(|item| {
            let inner = match item {
                Value::Object(mut map) if map.contains_key("error") => {
                    map.remove("error").unwrap_or(Value::Null)
                }
                other => other,
            };
            serde_json::from_value(inner)
        })
        .collect()
}

/// `npm audit --json` report.
#[derive(Debug, Default, Deserialize)]
pub struct AuditReport {
    #[serde(default)]
    pub vulnerabilities: BTreeMap<String, AuditEntry>,
    /// Present when npm could not run the audit (e.g. `ENOLOCK`).
    #[serde(default)]
    pub error: Option<AuditError>,
}

#[derive(Debug, Default, Deserialize)]
pub struct AuditError {
    #[serde(default)]
    pub code: Option<String>,
    #[serde(default)]
    pub summary: Option<String>,
}

impl std::fmt::Display for AuditError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match (&self.code, &self.summary) {
            (Some(code), Some(summary)) => write!(f, "{}: {}", code, summary),
            (None, Some(summary)) => write!(f, "{}", summary),
            (Some(code), None) => write!(f, "{}", code),
            (None, None) => write!(f, "unknown error"),
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct AuditEntry {
    #[serde(default = "unknown_severity")]
    pub severity: String,
    /// Missing in npm 7+ reports, where each entry is one vulnerable package.
    pub count: Option<u64>,
}

fn unknown_severity() -> String {
    "unknown".to_string()
}

impl AuditEntry {
    pub fn count(&self) -> u64 {
        self.count.unwrap_or(1)
    }
}

impl AuditReport {
    pub fn into_metric(self) -> MetricResult {
        if let Some(error) = &self.error {
            return MetricResult::failed("npm audit", error);
        }

        let mut issues = Vec::new();
        let mut total = 0;
        let mut weighted = 0.0;

        for (name, entry) in &self.vulnerabilities {
            let count = entry.count();
            issues.push(format!(
                "Found {} {} severity vulnerability(ies) in {}",
                count, entry.severity, name
            ));
            total += count;
            weighted += count as f64 * score::severity_weight(&entry.severity);
        }

        if total == 0 {
            issues.push("No security vulnerabilities found".to_string());
            return MetricResult::new(score::MAX_SCORE, issues);
        }

        MetricResult::new(score::penalty_score(weighted / 2.0), issues)
    }
}

pub fn parse_npm_audit(output: &str) -> serde_json::Result<AuditReport> {
    serde_json::from_str(output.trim())
}

#[cfg(test)]
mod tests {
    use super::*;

    const ESLINT_OUTPUT: &str = r#"[
        {"filePath": "/w/app.js", "messages": [
            {"ruleId": "no-unused-vars", "severity": 2, "message": "'x' is defined but never used.", "line": 3, "column": 7},
            {"ruleId": null, "fatal": true, "severity": 2, "message": "Parsing error: Unexpected token", "line": 9, "column": 1}
        ], "errorCount": 2}
    ]"#;

    #[test]
    fn test_parse_eslint_messages() {
        let results = parse_eslint(ESLINT_OUTPUT).unwrap();
        assert_eq!(results.len(), 1);
        assert_eq!(results[0].file_path, "/w/app.js");
        let described: Vec<_> = results[0]
            .messages
            .iter()
            .map(|m| m.describe(&"app.js", true))
            .collect();
        assert_eq!(
            described[0],
            "app.js:3:7 - 'x' is defined but never used. (no-unused-vars)"
        );
        assert_eq!(described[1], "app.js:9:1 - Parsing error: Unexpected token (-)");
    }

    #[test]
    fn test_parse_eslint_garbage_is_error() {
        assert!(parse_eslint("Oops! Something went wrong!").is_err());
    }

    #[test]
    fn test_complexity_summary() {
        let output = r#"[{"filePath": "a.js", "messages": [
            {"ruleId": "complexity", "message": "Function 'f' has a complexity of 14. Maximum allowed is 10.", "line": 1, "column": 1},
            {"ruleId": "complexity", "message": "Arrow function has a complexity of 12. Maximum allowed is 10.", "line": 20, "column": 5},
            {"ruleId": "no-undef", "message": "'x' is not defined.", "line": 2, "column": 3}
        ]}]"#;
        let mut summary = ComplexitySummary::default();
        summary.add(&"a.js", &parse_eslint(output).unwrap()).unwrap();
        summary.add(&"b.js", &parse_eslint("[]").unwrap()).unwrap();

        assert_eq!(summary.total, 26);
        assert_eq!(summary.files, 1);
        assert_eq!(summary.issues.len(), 2);
        assert!(summary.issues[0].starts_with("a.js:1:1 - Function 'f'"));

        let metric = summary.into_metric();
        assert_eq!(metric.score, 0.0);
    }

    #[test]
    fn test_complexity_without_findings_scores_ten() {
        assert_eq!(ComplexitySummary::default().into_metric().score, 10.0);
    }

    #[test]
    fn test_complexity_message_without_value_is_error() {
        let output = r#"[{"messages": [{"ruleId": "complexity", "message": "weird"}]}]"#;
        let mut summary = ComplexitySummary::default();
        assert!(summary.add(&"a.js", &parse_eslint(output).unwrap()).is_err());
    }

    #[test]
    fn test_parse_jshint_forms() {
        let bare = r#"[{"line": 4, "character": 10, "reason": "Missing semicolon."}]"#;
        let wrapped = r#"{"result": [{"file": "a.js", "error": {"line": 4, "character": 10, "reason": "Missing semicolon."}}]}"#;
        let errors = r#"{"errors": [{"error": {"line": 4, "col": 10, "reason": "Missing semicolon."}}]}"#;

        for raw in [bare, wrapped, errors] {
            let entries = parse_jshint(raw).unwrap();
            assert_eq!(entries.len(), 1, "{}", raw);
            assert_eq!(entries[0].describe(&"a.js"), "a.js:4:10 - Missing semicolon.");
        }
    }

    #[test]
    fn test_parse_jshint_empty_and_garbage() {
        assert!(parse_jshint("  \n").unwrap().is_empty());
        assert!(parse_jshint("not json").is_err());
    }

    #[test]
    fn test_npm_audit_weighted_score() {
        let output = r#"{"auditReportVersion": 2, "vulnerabilities": {
            "lodash": {"name": "lodash", "severity": "high", "via": []},
            "minimist": {"name": "minimist", "severity": "critical", "count": 2},
            "tar": {"severity": "moderate"}
        }}"#;
        let metric = parse_npm_audit(output).unwrap().into_metric();
        assert_eq!(
            metric.issues,
            vec![
                "Found 1 high severity vulnerability(ies) in lodash",
                "Found 2 critical severity vulnerability(ies) in minimist",
                "Found 1 moderate severity vulnerability(ies) in tar",
            ]
        );
        // weighted = 3 + 8 + 2 = 13
        assert_eq!(metric.score, 3.5);
    }

    #[test]
    fn test_npm_audit_error_is_failure() {
        let output = r#"{"error": {"code": "ENOLOCK", "summary": "This command requires an existing lockfile.", "detail": "Try creating one first with: npm i --package-lock-only"}}"#;
        let metric = parse_npm_audit(output).unwrap().into_metric();
        assert_eq!(metric.score, 0.0);
        assert_eq!(
            metric.issues,
            vec!["Error running npm audit: ENOLOCK: This command requires an existing lockfile."]
        );
    }

    #[test]
    fn test_npm_audit_clean() {
        let metric = parse_npm_audit(r#"{"vulnerabilities": {}}"#)
            .unwrap()
            .into_metric();
        assert_eq!(metric.score, 10.0);
        assert_eq!(metric.issues, vec!["No security vulnerabilities found"]);
    }

    #[test]
    fn test_npm_audit_large_count_clamps() {
        let metric = parse_npm_audit(r#"{"vulnerabilities": {"x": {"severity": "critical", "count": 50}}}"#)
            .unwrap()
            .into_metric();
        assert_eq!(metric.score, 0.0);
    }

    #[test]
    fn test_security_without_package_json_is_neutral() {
        let temp = tempfile::TempDir::new().unwrap();
        let file = temp.path().join("app.js");
        std::fs::write(&file, "console.log(1);\n").unwrap();

        let analyzer = JavaScriptAnalyzer::new(AnalyzerSettings::default());
        let metric = analyzer.analyze_security(temp.path());
        assert_eq!(metric.score, 5.0);
        assert_eq!(
            metric.issues,
            vec!["No package.json found, skipping security audit"]
        );
    }

    #[test]
    fn test_generated_configs() {
        assert_eq!(recommended_config()["extends"], "eslint:recommended");
        assert_eq!(complexity_config()["rules"]["complexity"][1], 10);
    }
}
