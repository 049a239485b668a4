//! Result types produced by an analysis run.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use crate::language::Language;
use crate::score::{self, Rating};

/// The four metrics, in invocation order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Metric {
    Style,
    Quality,
    Complexity,
    Security,
}

impl Metric {
    pub const ALL: [Metric; 4] = [
        Metric::Style,
        Metric::Quality,
        Metric::Complexity,
        Metric::Security,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Metric::Style => "style",
            Metric::Quality => "quality",
            Metric::Complexity => "complexity",
            Metric::Security => "security",
        }
    }

    /// Capitalized name used in section headings ("Style Analysis").
    pub fn title(&self) -> &'static str {
        match self {
            Metric::Style => "Style",
            Metric::Quality => "Quality",
            Metric::Complexity => "Complexity",
            Metric::Security => "Security",
        }
    }

    /// Row label used in the per-language metric table.
    pub fn table_label(&self) -> &'static str {
        match self {
            Metric::Style => "Code Style",
            Metric::Quality => "Code Quality",
            Metric::Complexity => "Complexity",
            Metric::Security => "Security",
        }
    }
}

impl std::fmt::Display for Metric {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Score and issues for one metric of one language.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MetricResult {
    /// 0-10, higher is better
    pub score: f64,
    pub issues: Vec<String>,
}

impl MetricResult {
    /// Create a result, clamping the score into [0, 10].
    pub fn new(score: f64, issues: Vec<String>) -> Self {
        Self {
            score: score::clamp(score),
            issues,
        }
    }

    /// Result for an analyzer that found no files of its language.
    pub fn no_files(language: &str) -> Self {
        Self::new(score::MAX_SCORE, vec![format!("No {} files found", language)])
    }

    /// Neutral result for a tool or configuration that is unavailable.
    pub fn neutral<S: Into<String>>(issue: S) -> Self {
        Self::new(score::NEUTRAL_SCORE, vec![issue.into()])
    }

    /// Result for a metric whose analysis failed.
    pub fn failed(tool: &str, err: &dyn std::fmt::Display) -> Self {
        Self::new(0.0, vec![format!("Error running {}: {}", tool, err)])
    }

    pub fn rating(&self) -> Rating {
        Rating::from_score(self.score)
    }

    /// Re-apply the [0, 10] clamp.
    pub fn clamped(mut self) -> Self {
        self.score = score::clamp(self.score);
        self
    }
}

/// All metrics for one detected language.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LanguageReport {
    pub language: Language,
    pub files: Vec<PathBuf>,
    pub style: MetricResult,
    pub quality: MetricResult,
    pub complexity: MetricResult,
    pub security: MetricResult,
}

impl LanguageReport {
    /// A report with no metrics computed yet (all scores 0).
    pub fn new(language: Language, files: Vec<PathBuf>) -> Self {
        Self {
            language,
            files,
            style: MetricResult::default(),
            quality: MetricResult::default(),
            complexity: MetricResult::default(),
            security: MetricResult::default(),
        }
    }

    pub fn metric(&self, metric: Metric) -> &MetricResult {
        match metric {
            Metric::Style => &self.style,
            Metric::Quality => &self.quality,
            Metric::Complexity => &self.complexity,
            Metric::Security => &self.security,
        }
    }

    pub fn set_metric(&mut self, metric: Metric, result: MetricResult) {
        match metric {
            Metric::Style => self.style = result,
            Metric::Quality => self.quality = result,
            Metric::Complexity => self.complexity = result,
            Metric::Security => self.security = result,
        }
    }

    /// Unweighted mean of the four metric scores.
    pub fn overall(&self) -> f64 {
        score::mean(&Metric::ALL.map(|m| self.metric(m).score))
    }

    pub fn file_count(&self) -> usize {
        self.files.len()
    }
}

/// Per-language results for one input.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalysisRun {
    pub title: String,
    pub root: PathBuf,
    pub languages: BTreeMap<Language, LanguageReport>,
}

impl AnalysisRun {
    pub fn new<P: AsRef<Path>>(title: &str, root: P) -> Self {
        Self {
            title: title.to_string(),
            root: root.as_ref().to_path_buf(),
            languages: BTreeMap::new(),
        }
    }

    pub fn insert(&mut self, report: LanguageReport) {
        self.languages.insert(report.language, report);
    }

    pub fn get(&self, language: Language) -> Option<&LanguageReport> {
        self.languages.get(&language)
    }

    /// Reports in language-table order.
    pub fn reports(&self) -> impl Iterator<Item = &LanguageReport> {
        self.languages.values()
    }

    pub fn is_empty(&self) -> bool {
        self.languages.is_empty()
    }

    pub fn len(&self) -> usize {
        self.languages.len()
    }

    pub fn total_files(&self) -> usize {
        self.reports().map(|r| r.file_count()).sum()
    }
}
