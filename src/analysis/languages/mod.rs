//! Language-specific analyzer implementations.
//!
//! The analyzer set is closed: Python, JavaScript/TypeScript and Java. Other
//! recognized languages are reported without analysis.

/// Run a [`Tool`](crate::tools::Tool), returning early from the enclosing
/// `check_*` with a neutral result when the tool is missing or timed out.
macro_rules! run_or_skip {
    ($tool:expr, $metric:expr) => {
        match $tool.run() {
            Ok(output) => output,
            Err(e) if e.is_unavailable() => return Ok($crate::analysis::languages::skipped(&e, $metric)),
            Err(e) => return Err(e.into()),
        }
    };
}

mod java;
mod javascript;
mod python;

pub use java::JavaAnalyzer;
pub use javascript::JavaScriptAnalyzer;
pub use python::PythonAnalyzer;

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use super::{AnalyzerSettings, LanguageAnalyzer, Metric, MetricResult};
use crate::language::Language;
use crate::tools::ToolError;

/// Get an analyzer for the given file extension (lowercase, without dot).
///
/// Returns None if no analyzer handles the extension.
pub fn analyzer_for_extension(
    ext: &str,
    settings: &AnalyzerSettings,
) -> Option<Box<dyn LanguageAnalyzer>> {
    match ext {
        // Python
        "py" => Some(Box::new(PythonAnalyzer::new(settings.clone()))),
        // JavaScript and TypeScript share one analyzer
        "js" | "jsx" | "ts" | "tsx" => Some(Box::new(JavaScriptAnalyzer::new(settings.clone()))),
        // Java
        "java" => Some(Box::new(JavaAnalyzer::new(settings.clone()))),
        _ => None,
    }
}

/// Get the analyzer for a language, if it has one.
pub fn analyzer_for(
    language: Language,
    settings: &AnalyzerSettings,
) -> Option<Box<dyn LanguageAnalyzer>> {
    language
        .extensions()
        .first()
        .and_then(|ext| analyzer_for_extension(ext, settings))
}

/// Neutral result for a metric whose tool is missing or hung.
pub(crate) fn skipped(err: &ToolError, metric: Metric) -> MetricResult {
    log::info!("{}, skipping {} analysis", err, metric);
    MetricResult::neutral(format!("{}, skipping {} analysis", err, metric))
}

/// Non-empty lines of tool output.
pub(crate) fn output_lines(output: &str) -> impl Iterator<Item = &str> {
    output.lines().filter(|l| !l.trim().is_empty())
}

/// A tool configuration file written into the analyzed directory for the
/// duration of a metric. Removed on drop, but only if this guard created it.
pub(crate) struct ScopedConfig {
    path: Option<PathBuf>,
}

impl ScopedConfig {
    /// Write `contents` to `dir/name` unless a file with that name exists.
    pub fn write_if_absent(dir: &Path, name: &str, contents: &str) -> io::Result<Self> {
        let path = dir.join(name);
        if path.exists() {
            return Ok(Self { path: None });
        }
        fs::write(&path, contents)?;
        Ok(Self { path: Some(path) })
    }

    pub fn created(&self) -> bool {
        self.path.is_some()
    }
}

impl Drop for ScopedConfig {
    fn drop(&mut self) {
        if let Some(path) = &self.path {
            if let Err(e) = fs::remove_file(path) {
                log::warn!("failed to remove {}: {}", path.display(), e);
            }
        }
    }
}
