//! Lint aggregation.
//!
//! Each supported language has an analyzer that shells out to third-party
//! tools and turns their output into four scored metrics. The aggregator
//! groups an input's files by language and runs the matching analyzer.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────┐     ┌──────────────┐     ┌───────────────┐
//! │ Input directory │────▶│ Aggregator   │────▶│ AnalysisRun   │
//! └─────────────────┘     │ (by language)│     │ (per-language │
//!                         └──────┬───────┘     │  metrics)     │
//!                                │             └───────────────┘
//!                                ▼
//!                         ┌──────────────┐
//!                         │ Analyzers    │──▶ flake8, pylint, ESLint, PMD...
//!                         └──────────────┘
//! ```
//!
//! # Adding a New Analyzer
//!
//! 1. Create a new module in `src/analysis/languages/`
//! 2. Implement the `LanguageAnalyzer` trait
//! 3. Register its extensions in `languages::analyzer_for_extension`

mod aggregate;
mod languages;
pub(crate) mod patterns;
mod results;
mod traits;

pub use aggregate::Aggregator;
pub use languages::{
    analyzer_for, analyzer_for_extension, JavaAnalyzer, JavaScriptAnalyzer, PythonAnalyzer,
};
pub use results::{AnalysisRun, LanguageReport, Metric, MetricResult};
pub use traits::{AnalyzerSettings, LanguageAnalyzer};
