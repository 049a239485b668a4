//! Core trait for per-language analyzers.

use std::path::{Path, PathBuf};
use std::time::Duration;

use super::{Metric, MetricResult};
use crate::config::Config;
use crate::files::{collect_files, FileFilter};

/// Settings shared by every analyzer in a run.
#[derive(Debug, Clone)]
pub struct AnalyzerSettings {
    /// Timeout for each external tool invocation.
    pub timeout: Duration,
    /// Directory and path exclusions applied while collecting files.
    pub filter: FileFilter,
    pub checkstyle_jar: PathBuf,
    pub spotbugs_jar: PathBuf,
    pub pmd_ruleset: String,
}

impl AnalyzerSettings {
    pub fn from_config(config: &Config) -> anyhow::Result<Self> {
        Ok(Self {
            timeout: config.tool_timeout(),
            filter: config.file_filter()?,
            checkstyle_jar: config.checkstyle_jar(),
            spotbugs_jar: config.spotbugs_jar(),
            pmd_ruleset: config.tools.pmd_ruleset.clone(),
        })
    }
}

impl Default for AnalyzerSettings {
    fn default() -> Self {
        let config = Config::default();
        Self {
            timeout: config.tool_timeout(),
            filter: FileFilter::default(),
            checkstyle_jar: config.checkstyle_jar(),
            spotbugs_jar: config.spotbugs_jar(),
            pmd_ruleset: config.tools.pmd_ruleset,
        }
    }
}

/// Language-specific analyzer trait.
///
/// Implementations provide the four `check_*` operations, which receive the
/// analyzed directory and the non-empty list of files of their language.
/// Callers use the `analyze_*` methods, which handle file discovery, the
/// "no files" short-circuit and failure containment.
pub trait LanguageAnalyzer {
    /// Language name used in messages ("Python", "JavaScript/TypeScript").
    fn name(&self) -> &'static str;

    /// File extensions this analyzer handles (lowercase, without dot).
    fn extensions(&self) -> &'static [&'static str];

    fn settings(&self) -> &AnalyzerSettings;

    /// Name of the tool behind a metric, used in failure messages.
    fn tool_for(&self, metric: Metric) -> &'static str;

    fn check_style(&self, dir: &Path, files: &[PathBuf]) -> anyhow::Result<MetricResult>;

    fn check_quality(&self, dir: &Path, files: &[PathBuf]) -> anyhow::Result<MetricResult>;

    fn check_complexity(&self, dir: &Path, files: &[PathBuf]) -> anyhow::Result<MetricResult>;

    fn check_security(&self, dir: &Path, files: &[PathBuf]) -> anyhow::Result<MetricResult>;

    fn analyze_style(&self, dir: &Path) -> MetricResult {
        self.analyze(Metric::Style, dir)
    }

    fn analyze_quality(&self, dir: &Path) -> MetricResult {
        self.analyze(Metric::Quality, dir)
    }

    fn analyze_complexity(&self, dir: &Path) -> MetricResult {
        self.analyze(Metric::Complexity, dir)
    }

    fn analyze_security(&self, dir: &Path) -> MetricResult {
        self.analyze(Metric::Security, dir)
    }

    /// Run one metric over `dir`.
    ///
    /// Never fails: a directory without matching files scores 10, and any
    /// error raised by the metric becomes a single issue with score 0.
    fn analyze(&self, metric: Metric, dir: &Path) -> MetricResult {
        let tool = self.tool_for(metric);
        let files = match collect_files(dir, self.extensions(), &self.settings().filter) {
            Ok(files) => files,
            Err(e) => return MetricResult::failed(tool, &e),
        };

        if files.is_empty() {
            return MetricResult::no_files(self.name());
        }

        let outcome = match metric {
            Metric::Style => self.check_style(dir, &files),
            Metric::Quality => self.check_quality(dir, &files),
            Metric::Complexity => self.check_complexity(dir, &files),
            Metric::Security => self.check_security(dir, &files),
        };

        match outcome {
            Ok(result) => result.clamped(),
            Err(e) => {
                log::warn!("{} {} analysis failed: {:#}", self.name(), metric, e);
                MetricResult::failed(tool, &e)
            }
        }
    }

    /// Check if this analyzer handles the given file extension.
    fn handles_extension(&self, ext: &str) -> bool {
        self.extensions().contains(&ext)
    }
}
