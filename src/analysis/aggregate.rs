//! Groups an input's files by language and runs the analyzers.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::time::Instant;

use super::{analyzer_for_extension, AnalysisRun, AnalyzerSettings, LanguageReport, Metric};
use crate::files;
use crate::language::{self, Language};

/// Runs every applicable analyzer over a directory.
pub struct Aggregator {
    settings: AnalyzerSettings,
}

impl Aggregator {
    pub fn new(settings: AnalyzerSettings) -> Self {
        Self { settings }
    }

    pub fn settings(&self) -> &AnalyzerSettings {
        &self.settings
    }

    /// Recognized files under `root`, grouped by language.
    pub fn group_files(&self, root: &Path) -> anyhow::Result<BTreeMap<Language, Vec<PathBuf>>> {
        let mut groups: BTreeMap<Language, Vec<PathBuf>> = BTreeMap::new();

        for path in files::walk(root, &self.settings.filter)? {
            match Language::from_path(&path) {
                Some(lang) => groups.entry(lang).or_default().push(path),
                None => log::debug!("skipping unrecognized file {}", path.display()),
            }
        }

        Ok(groups)
    }

    /// Analyze `root`.
    ///
    /// Languages run one after another; each analyzer is asked for style,
    /// quality, complexity and security in that order. A language without an
    /// analyzer is still listed, with all-zero metrics.
    pub fn run(&self, root: &Path, title: &str) -> anyhow::Result<AnalysisRun> {
        let mut run = AnalysisRun::new(title, root);

        for (lang, files) in self.group_files(root)? {
            log::info!("{}: {} file(s)", lang, files.len());
            let ext = files
                .first()
                .and_then(|f| language::extension_of(f))
                .unwrap_or_default();
            let mut report = LanguageReport::new(lang, files);

            match analyzer_for_extension(&ext, &self.settings) {
                Some(analyzer) => {
                    for metric in Metric::ALL {
                        let started = Instant::now();
                        let result = analyzer.analyze(metric, root);
                        log::info!(
                            "{} {}: {:.1} ({} issue(s), {:.2}s)",
                            lang,
                            metric,
                            result.score,
                            result.issues.len(),
                            started.elapsed().as_secs_f64()
                        );
                        report.set_metric(metric, result);
                    }
                }
                None => log::info!("no analyzer for {}, metrics left at zero", lang),
            }

            run.insert(report);
        }

        Ok(run)
    }
}
