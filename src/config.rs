//! Configuration schema for lintreport.
//!
//! Configuration is optional. When no file is given or discovered the
//! defaults below apply, which match the behavior of the hosted service:
//! 16 MiB upload limit, 20 issues per metric on the rendered page and the
//! Java tool jars in the user's home directory.

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::files::FileFilter;

/// Default configuration file names to search for.
pub const DEFAULT_CONFIG_NAMES: &[&str] = &["lintreport.yaml", ".lintreport.yaml"];

/// Default configuration template written by `lintreport init`.
pub const DEFAULT_TEMPLATE: &str = include_str!("templates/default.yaml");

/// Top-level configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Config {
    #[serde(default)]
    pub version: String,
    /// Timeout for each external tool invocation in seconds (default: 120)
    #[serde(default = "default_tool_timeout")]
    pub tool_timeout_secs: u64,
    /// Maximum size of an uploaded archive or file in bytes (default: 16 MiB)
    #[serde(default = "default_max_upload")]
    pub max_upload_bytes: u64,
    /// Issues shown per metric in the rendered report (default: 20)
    #[serde(default = "default_issue_limit")]
    pub issue_limit: usize,
    /// Directory names skipped while walking (default: .git, node_modules)
    #[serde(default = "default_excluded_dirs")]
    pub excluded_dirs: Vec<String>,
    /// Glob patterns for paths to exclude from analysis
    #[serde(default)]
    pub excluded_paths: Vec<String>,
    #[serde(default)]
    pub tools: ToolsConfig,
    #[serde(default)]
    pub github: GitHubConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            version: String::new(),
            tool_timeout_secs: default_tool_timeout(),
            max_upload_bytes: default_max_upload(),
            issue_limit: default_issue_limit(),
            excluded_dirs: default_excluded_dirs(),
            excluded_paths: Vec::new(),
            tools: ToolsConfig::default(),
            github: GitHubConfig::default(),
        }
    }
}

fn default_tool_timeout() -> u64 {
    120
}

fn default_max_upload() -> u64 {
    16 * 1024 * 1024
}

fn default_issue_limit() -> usize {
    20
}

fn default_excluded_dirs() -> Vec<String> {
    vec![".git".to_string(), "node_modules".to_string()]
}

/// Locations and options for the external tools that are not on PATH.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ToolsConfig {
    /// Checkstyle jar (default: ~/checkstyle.jar)
    #[serde(default)]
    pub checkstyle_jar: Option<PathBuf>,
    /// SpotBugs jar (default: ~/spotbugs/lib/spotbugs.jar)
    #[serde(default)]
    pub spotbugs_jar: Option<PathBuf>,
    /// PMD ruleset passed to `pmd check -R`
    #[serde(default = "default_pmd_ruleset")]
    pub pmd_ruleset: String,
}

impl Default for ToolsConfig {
    fn default() -> Self {
        Self {
            checkstyle_jar: None,
            spotbugs_jar: None,
            pmd_ruleset: default_pmd_ruleset(),
        }
    }
}

fn default_pmd_ruleset() -> String {
    "rulesets/java/quickstart.xml".to_string()
}

/// GitHub API access for the `pr` command.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct GitHubConfig {
    /// API base URL (default: https://api.github.com)
    #[serde(default = "default_api_url")]
    pub api_url: String,
    /// Environment variable holding the access token (default: GITHUB_TOKEN)
    #[serde(default = "default_token_env")]
    pub token_env: String,
    /// Request timeout in seconds (default: 30)
    #[serde(default = "default_request_timeout")]
    pub timeout_secs: u64,
}

impl Default for GitHubConfig {
    fn default() -> Self {
        Self {
            api_url: default_api_url(),
            token_env: default_token_env(),
            timeout_secs: default_request_timeout(),
        }
    }
}

fn default_api_url() -> String {
    "https://api.github.com".to_string()
}

fn default_token_env() -> String {
    "GITHUB_TOKEN".to_string()
}

fn default_request_timeout() -> u64 {
    30
}

impl Config {
    /// Parse a configuration from a YAML file.
    pub fn parse_file<P: AsRef<Path>>(path: P) -> anyhow::Result<Self> {
        let content = fs::read_to_string(path.as_ref())?;
        Self::parse_str(&content)
    }

    /// Parse a configuration from YAML text. An empty document yields defaults.
    pub fn parse_str(content: &str) -> anyhow::Result<Self> {
        if content.trim().is_empty() {
            return Ok(Self::default());
        }
        let config: Config = serde_yaml::from_str(content)?;
        Ok(config)
    }

    /// Load the configuration at `path`, or discover one, or fall back to defaults.
    pub fn load(path: Option<&Path>) -> anyhow::Result<Self> {
        let config = match path {
            Some(p) => Self::parse_file(p)
                .map_err(|e| anyhow::anyhow!("parsing config {}: {}", p.display(), e))?,
            None => match discover() {
                Some(p) => {
                    log::debug!("using config {}", p.display());
                    Self::parse_file(&p)
                        .map_err(|e| anyhow::anyhow!("parsing config {}: {}", p.display(), e))?
                }
                None => Self::default(),
            },
        };
        validate(&config)?;
        Ok(config)
    }

    /// Timeout applied to every external tool invocation.
    pub fn tool_timeout(&self) -> Duration {
        Duration::from_secs(self.tool_timeout_secs)
    }

    /// Resolved Checkstyle jar location.
    pub fn checkstyle_jar(&self) -> PathBuf {
        self.tools
            .checkstyle_jar
            .as_deref()
            .map(expand_home)
            .unwrap_or_else(|| home_dir().join("checkstyle.jar"))
    }

    /// Resolved SpotBugs jar location.
    pub fn spotbugs_jar(&self) -> PathBuf {
        self.tools
            .spotbugs_jar
            .as_deref()
            .map(expand_home)
            .unwrap_or_else(|| home_dir().join("spotbugs").join("lib").join("spotbugs.jar"))
    }

    /// Build the file filter used while walking input directories.
    pub fn file_filter(&self) -> anyhow::Result<FileFilter> {
        FileFilter::new(&self.excluded_dirs, &self.excluded_paths)
    }
}

/// Look for a configuration file in the working directory, then in the
/// user configuration directory.
pub fn discover() -> Option<PathBuf> {
    for name in DEFAULT_CONFIG_NAMES {
        let path = PathBuf::from(name);
        if path.exists() {
            return Some(path);
        }
    }
    let dirs = directories::ProjectDirs::from("", "", "lintreport")?;
    let path = dirs.config_dir().join("config.yaml");
    path.exists().then_some(path)
}

/// Validate a configuration.
pub fn validate(config: &Config) -> anyhow::Result<()> {
    if config.tool_timeout_secs == 0 {
        anyhow::bail!("tool_timeout_secs must be greater than zero");
    }
    if config.max_upload_bytes == 0 {
        anyhow::bail!("max_upload_bytes must be greater than zero");
    }
    if config.github.timeout_secs == 0 {
        anyhow::bail!("github.timeout_secs must be greater than zero");
    }
    if !config.github.api_url.starts_with("http://") && !config.github.api_url.starts_with("https://") {
        anyhow::bail!("github.api_url {:?} must be an http(s) URL", config.github.api_url);
    }

    // Validate excluded_paths glob patterns compile
    for pattern in &config.excluded_paths {
        globset::Glob::new(pattern)
            .map_err(|e| anyhow::anyhow!("invalid excluded_paths pattern {:?}: {}", pattern, e))?;
    }

    Ok(())
}

fn home_dir() -> PathBuf {
    directories::BaseDirs::new()
        .map(|d| d.home_dir().to_path_buf())
        .unwrap_or_else(|| PathBuf::from("."))
}

/// Expand a leading `~/` to the home directory.
fn expand_home(path: &Path) -> PathBuf {
    match path.strip_prefix("~") {
        Ok(rest) => home_dir().join(rest),
        Err(_) => path.to_path_buf(),
    }
}
