//! JSON output: the full run with every issue.

use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::analysis::{AnalysisRun, Metric, MetricResult};
use crate::score::Rating;

#[derive(Serialize, Deserialize)]
pub struct JsonReport {
    pub version: String,
    pub title: String,
    pub generated_at: String,
    pub files_analyzed: usize,
    pub languages: Vec<JsonLanguage>,
}

#[derive(Serialize, Deserialize)]
pub struct JsonLanguage {
    pub language: String,
    pub files: Vec<String>,
    pub style: JsonMetric,
    pub quality: JsonMetric,
    pub complexity: JsonMetric,
    pub security: JsonMetric,
    pub overall: f64,
    pub rating: Rating,
}

#[derive(Serialize, Deserialize)]
pub struct JsonMetric {
    pub score: f64,
    pub rating: Rating,
    pub issues: Vec<String>,
}

impl From<&MetricResult> for JsonMetric {
    fn from(m: &MetricResult) -> Self {
        Self {
            score: m.score,
            rating: m.rating(),
            issues: m.issues.clone(),
        }
    }
}

/// Build the JSON view of a run. File paths are made relative to the root.
pub fn build_json(run: &AnalysisRun, generated_at: &str) -> JsonReport {
    let languages = run
        .reports()
        .map(|r| JsonLanguage {
            language: r.language.label().to_string(),
            files: r
                .files
                .iter()
                .map(|f| relative(f, &run.root))
                .collect(),
            style: r.metric(Metric::Style).into(),
            quality: r.metric(Metric::Quality).into(),
            complexity: r.metric(Metric::Complexity).into(),
            security: r.metric(Metric::Security).into(),
            overall: r.overall(),
            rating: Rating::from_score(r.overall()),
        })
        .collect();

    JsonReport {
        version: env!("CARGO_PKG_VERSION").to_string(),
        title: run.title.clone(),
        generated_at: generated_at.to_string(),
        files_analyzed: run.total_files(),
        languages,
    }
}

fn relative(file: &Path, root: &Path) -> String {
    file.strip_prefix(root)
        .unwrap_or(file)
        .to_string_lossy()
        .into_owned()
}

/// Write the JSON report to `path`.
pub fn write_json(run: &AnalysisRun, generated_at: &str, path: &Path) -> anyhow::Result<()> {
    let json = serde_json::to_string_pretty(&build_json(run, generated_at))?;
    std::fs::write(path, json)?;
    log::info!("wrote {}", path.display());
    Ok(())
}
