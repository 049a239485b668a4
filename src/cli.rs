//! Command-line interface for lintreport.

use chrono::{DateTime, Local};
use clap::{ArgAction, Parser, Subcommand};
use indicatif::{ProgressBar, ProgressStyle};
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::analysis::{Aggregator, AnalysisRun, AnalyzerSettings};
use crate::config::{self, Config};
use crate::github::{self, GitHubClient, PullRequestRef};
use crate::report::{self, ReportDocument};
use crate::workspace::{self, Workspace};

/// Exit codes.
pub const EXIT_SUCCESS: i32 = 0;
pub const EXIT_ERROR: i32 = 2;

const FORMATS: &[&str] = &["pdf", "json", "pretty"];

/// Multi-language code quality reports.
///
/// Runs the usual linters, quality checkers, complexity analyzers and
/// security scanners for Python, JavaScript and Java sources, normalizes
/// their findings to 0-10 scores and renders a PDF report.
#[derive(Parser)]
#[command(name = "lintreport")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Increase log verbosity (-v info, -vv debug)
    #[arg(short, long, action = ArgAction::Count, global = true)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Analyze a directory, a source file or a .zip archive
    Analyze(AnalyzeArgs),
    /// Analyze the files changed by a GitHub pull request
    Pr(PrArgs),
    /// Create a lintreport configuration file
    Init(InitArgs),
}

/// Report destination and format, shared by `analyze` and `pr`.
#[derive(Parser)]
pub struct OutputArgs {
    /// Output format: pdf, json, or pretty
    #[arg(short, long, default_value = "pdf")]
    pub format: String,

    /// Report file path (default: generated name in --output-dir)
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Directory for generated report names
    #[arg(long, default_value = ".")]
    pub output_dir: PathBuf,

    /// Path to configuration YAML file (default: auto-discover)
    #[arg(short, long)]
    pub config: Option<PathBuf>,
}

/// Arguments for the analyze command.
#[derive(Parser)]
pub struct AnalyzeArgs {
    /// Directory, source file or .zip archive to analyze
    pub path: PathBuf,

    /// Report title (default: the input's file name)
    #[arg(short, long)]
    pub title: Option<String>,

    #[command(flatten)]
    pub out: OutputArgs,
}

/// Arguments for the pr command.
#[derive(Parser)]
pub struct PrArgs {
    /// Pull request URL: https://github.com/<owner>/<repo>/pull/<number>
    pub url: String,

    /// GitHub access token (default: the variable named by github.token_env)
    #[arg(long)]
    pub token: Option<String>,

    #[command(flatten)]
    pub out: OutputArgs,
}

/// Arguments for the init command.
#[derive(Parser)]
pub struct InitArgs {
    /// Output file path
    #[arg(short, long, default_value = "lintreport.yaml")]
    pub output: PathBuf,

    /// Overwrite an existing file
    #[arg(long)]
    pub force: bool,
}

fn check_format(format: &str) -> bool {
    if FORMATS.contains(&format) {
        return true;
    }
    eprintln!(
        "Error: invalid format {:?}, must be 'pdf', 'json', or 'pretty'",
        format
    );
    false
}

/// Run the aggregator behind a spinner. The spinner only draws on a terminal.
fn analyze_with_progress(
    aggregator: &Aggregator,
    root: &Path,
    title: &str,
) -> anyhow::Result<AnalysisRun> {
    let spinner = ProgressBar::new_spinner();
    spinner.set_style(
        ProgressStyle::default_spinner().template("{spinner:.cyan} {msg} [{elapsed_precise}]")?,
    );
    spinner.set_message(format!("Analyzing {}...", title));
    spinner.enable_steady_tick(Duration::from_millis(100));

    let run = aggregator.run(root, title);
    spinner.finish_and_clear();
    run
}

/// Render `run` in the requested format.
///
/// File formats are written to `--output` or to `default_name` inside
/// `--output-dir`; the written path is printed on stdout.
fn emit(
    run: &AnalysisRun,
    out: &OutputArgs,
    default_name: &str,
    issue_limit: usize,
    now: &DateTime<Local>,
) -> anyhow::Result<()> {
    let target = |ext: &str| -> PathBuf {
        out.output.clone().unwrap_or_else(|| {
            out.output_dir
                .join(Path::new(default_name).with_extension(ext))
        })
    };

    match out.format.as_str() {
        "json" => {
            let path = target("json");
            create_parent(&path)?;
            let generated = now.format(report::GENERATED_FORMAT).to_string();
            report::write_json(run, &generated, &path)?;
            println!("{}", path.display());
        }
        "pretty" => {
            report::write_pretty(run, issue_limit);
        }
        _ => {
            let path = target("pdf");
            create_parent(&path)?;
            let doc = ReportDocument::build(run, issue_limit, now);
            report::write_pdf(&doc, &run.title, &path)?;
            println!("{}", path.display());
        }
    }

    Ok(())
}

fn create_parent(path: &Path) -> anyhow::Result<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)?;
        }
    }
    Ok(())
}

/// Run the analyze command.
pub fn run_analyze(args: &AnalyzeArgs) -> anyhow::Result<i32> {
    if !check_format(&args.out.format) {
        return Ok(EXIT_ERROR);
    }

    let config = Config::load(args.out.config.as_deref())?;
    let prepared = workspace::prepare(&args.path, config.max_upload_bytes)?;
    let title = args.title.clone().unwrap_or_else(|| prepared.title.clone());

    let aggregator = Aggregator::new(AnalyzerSettings::from_config(&config)?);
    let run = analyze_with_progress(&aggregator, &prepared.root, &title)?;
    if run.is_empty() {
        eprintln!("Error: No supported code files found in the upload.");
        return Ok(EXIT_ERROR);
    }

    let now = Local::now();
    emit(
        &run,
        &args.out,
        &report::report_file_name(&now),
        config.issue_limit,
        &now,
    )?;

    Ok(EXIT_SUCCESS)
}

/// Run the pr command.
pub fn run_pr(args: &PrArgs) -> anyhow::Result<i32> {
    if !check_format(&args.out.format) {
        return Ok(EXIT_ERROR);
    }

    let pr = PullRequestRef::parse(&args.url)?;
    let config = Config::load(args.out.config.as_deref())?;
    let token = args
        .token
        .clone()
        .or_else(|| std::env::var(&config.github.token_env).ok());
    if token.is_none() {
        log::info!(
            "{} not set, using unauthenticated GitHub requests",
            config.github.token_env
        );
    }

    let workspace = Workspace::new()?;
    let client = GitHubClient::new(&config.github, token)?;
    let summary = github::fetch_pull_request(&client, &pr, workspace.path())?;
    if summary.downloaded.is_empty() {
        eprintln!("Error: No supported code files found in the PR.");
        return Ok(EXIT_ERROR);
    }

    let aggregator = Aggregator::new(AnalyzerSettings::from_config(&config)?);
    let run = analyze_with_progress(&aggregator, workspace.path(), &pr.title())?;

    let now = Local::now();
    emit(
        &run,
        &args.out,
        &report::pr_report_file_name(&pr.owner, &pr.repo, pr.number, &now),
        config.issue_limit,
        &now,
    )?;

    Ok(EXIT_SUCCESS)
}

/// Run the init command.
pub fn run_init(args: &InitArgs) -> anyhow::Result<i32> {
    // Check if output already exists
    if args.output.exists() && !args.force {
        eprintln!("Error: file already exists: {}", args.output.display());
        eprintln!("Remove it or use --force to overwrite");
        return Ok(EXIT_ERROR);
    }

    // Create output directory if needed
    if let Some(parent) = args.output.parent() {
        if !parent.as_os_str().is_empty() && parent != Path::new(".") {
            if let Err(e) = std::fs::create_dir_all(parent) {
                eprintln!("Error: failed to create directory: {}", e);
                return Ok(EXIT_ERROR);
            }
        }
    }

    if let Err(e) = std::fs::write(&args.output, config::DEFAULT_TEMPLATE) {
        eprintln!("Error: failed to write config: {}", e);
        return Ok(EXIT_ERROR);
    }

    println!("Created {}", args.output.display());
    println!();
    println!("Next steps:");
    println!("  1. Edit {} to point at your Checkstyle and SpotBugs jars", args.output.display());
    println!("  2. Run: lintreport analyze <path> --config {}", args.output.display());

    Ok(EXIT_SUCCESS)
}
