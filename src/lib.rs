//! lintreport - multi-language lint aggregation and quality reports.
//!
//! lintreport runs established linters, quality checkers, complexity
//! analyzers and security scanners over Python, JavaScript and Java sources,
//! normalizes each tool's findings to a 0-10 score and renders the result as
//! a PDF (or JSON, or a terminal summary).
//!
//! # Architecture
//!
//! - `analysis`: per-language analyzers behind one trait, and the aggregator
//! - `tools`: subprocess execution with timeouts
//! - `workspace`: scoped temporary directories and zip extraction
//! - `github`: pull request file download
//! - `report`: document model and PDF, JSON and terminal renderers
//! - `score`: score arithmetic and rating bands
//! - `config`: YAML configuration
//!
//! # Adding a New Language
//!
//! See `src/analysis/languages/` for examples. Implement the
//! `LanguageAnalyzer` trait and register it in `languages/mod.rs`.

pub mod analysis;
pub mod cli;
pub mod config;
pub mod files;
pub mod github;
pub mod language;
pub mod report;
pub mod score;
pub mod tools;
pub mod workspace;

pub use analysis::{
    analyzer_for, Aggregator, AnalysisRun, AnalyzerSettings, LanguageAnalyzer, LanguageReport,
    Metric, MetricResult,
};
pub use config::Config;
pub use github::{GitHubClient, GitHubError, PullRequestRef};
pub use language::Language;
pub use report::ReportDocument;
pub use score::Rating;
pub use tools::{Tool, ToolError};
pub use workspace::{PreparedInput, Workspace, WorkspaceError};
