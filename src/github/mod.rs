//! GitHub pull request client.
//!
//! Lists the files changed by a pull request and downloads the ones in a
//! recognized language into a workspace, preserving their repository paths.
//!
//! Uses: GET {api}/repos/{owner}/{repo}/pulls/{number}/files

mod pulls;

pub use pulls::{fallback_raw_url, PullFile};

use lazy_static::lazy_static;
use regex::Regex;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;

use crate::config::GitHubConfig;
use crate::language::Language;
use crate::workspace::safe_join;

lazy_static! {
    static ref PR_URL: Regex = Regex::new(r"^https?://github\.com/([^/]+)/([^/]+)/pull/(\d+)").unwrap();
}

/// Errors that can occur while talking to GitHub.
#[derive(Error, Debug)]
pub enum GitHubError {
    #[error("Invalid GitHub PR URL format. Expected: https://github.com/owner/repo/pull/number")]
    InvalidUrl(String),
    #[error("Network error accessing GitHub API: {0}")]
    Network(#[from] reqwest::Error),
    #[error("Failed to fetch PR files: {status} {body}")]
    Status { status: u16, body: String },
    #[error("Invalid response from GitHub API. Please check your access token if you're using one.")]
    InvalidResponse(#[source] serde_json::Error),
    #[error("failed to store downloaded file: {0}")]
    Io(#[from] std::io::Error),
}

/// A pull request identified by owner, repository and number.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PullRequestRef {
    pub owner: String,
    pub repo: String,
    pub number: u64,
}

impl PullRequestRef {
    /// Parse `https://github.com/<owner>/<repo>/pull/<number>`.
    pub fn parse(url: &str) -> Result<Self, GitHubError> {
        let caps = PR_URL
            .captures(url.trim())
            .ok_or_else(|| GitHubError::InvalidUrl(url.to_string()))?;
        let number = caps[3]
            .parse()
            .map_err(|_| GitHubError::InvalidUrl(url.to_string()))?;
        Ok(Self {
            owner: caps[1].to_string(),
            repo: caps[2].to_string(),
            number,
        })
    }

    /// Report title: `<owner>/<repo> PR #<n>`.
    pub fn title(&self) -> String {
        format!("{}/{} PR #{}", self.owner, self.repo, self.number)
    }
}

impl std::fmt::Display for PullRequestRef {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}/{}#{}", self.owner, self.repo, self.number)
    }
}

/// Outcome of downloading a pull request's files.
#[derive(Debug, Default)]
pub struct FetchSummary {
    pub downloaded: Vec<PathBuf>,
    /// Repository paths that were not downloaded.
    pub skipped: Vec<String>,
    /// Recognized files per language.
    pub languages: BTreeMap<Language, usize>,
}

/// Async GitHub API client.
pub struct GitHubClient {
    http: reqwest::Client,
    api_url: String,
    token: Option<String>,
    timeout: Duration,
}

impl GitHubClient {
    pub fn new(config: &GitHubConfig, token: Option<String>) -> Result<Self, GitHubError> {
        let http = reqwest::Client::builder()
            .user_agent(concat!("lintreport/", env!("CARGO_PKG_VERSION")))
            .build()?;

        Ok(Self {
            http,
            api_url: config.api_url.trim_end_matches('/').to_string(),
            token: token.filter(|t| !t.is_empty()),
            timeout: Duration::from_secs(config.timeout_secs),
        })
    }

    fn get(&self, url: &str) -> reqwest::RequestBuilder {
        let request = self.http.get(url).timeout(self.timeout);
        match &self.token {
            Some(token) => request.header("Authorization", format!("token {}", token)),
            None => request,
        }
    }

    /// Download every recognized file of `pr` under `dest`.
    pub async fn fetch_into(
        &self,
        pr: &PullRequestRef,
        dest: &Path,
    ) -> Result<FetchSummary, GitHubError> {
        let files = self.list_files(pr).await?;
        let mut summary = FetchSummary::default();

        for file in files {
            let name = file.filename.clone();
            let lang = match Language::from_path(Path::new(&name)) {
                Some(lang) => lang,
                None => {
                    summary.skipped.push(name);
                    continue;
                }
            };
            *summary.languages.entry(lang).or_default() += 1;

            let (url, target) = match (file.download_url(), safe_join(dest, &name)) {
                (Some(url), Some(target)) => (url, target),
                _ => {
                    summary.skipped.push(name);
                    continue;
                }
            };

            match self.download(&url).await? {
                Some(bytes) => {
                    if let Some(parent) = target.parent() {
                        tokio::fs::create_dir_all(parent).await?;
                    }
                    tokio::fs::write(&target, bytes).await?;
                    summary.downloaded.push(target);
                }
                None => summary.skipped.push(name),
            }
        }

        log::info!(
            "downloaded {} file(s) from PR {}",
            summary.downloaded.len(),
            pr
        );
        for (lang, count) in &summary.languages {
            log::info!("  - {}: {} file(s)", lang, count);
        }
        if !summary.skipped.is_empty() {
            log::info!("skipped {} file(s)", summary.skipped.len());
        }

        Ok(summary)
    }
}

/// Blocking wrapper around [`GitHubClient::fetch_into`].
pub fn fetch_pull_request(
    client: &GitHubClient,
    pr: &PullRequestRef,
    dest: &Path,
) -> anyhow::Result<FetchSummary> {
    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()?;
    Ok(runtime.block_on(client.fetch_into(pr, dest))?)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_pr_url() {
        let pr = PullRequestRef::parse("https://github.com/octo/demo/pull/42").unwrap();
        assert_eq!(pr.owner, "octo");
        assert_eq!(pr.repo, "demo");
        assert_eq!(pr.number, 42);
        assert_eq!(pr.title(), "octo/demo PR #42");

        let pr = PullRequestRef::parse("http://github.com/a/b/pull/7/files").unwrap();
        assert_eq!(pr.number, 7);
    }

    #[test]
    fn test_parse_pr_url_rejects_other_urls() {
        for url in [
            "https://gitlab.com/a/b/pull/1",
            "https://github.com/a/b/issues/1",
            "https://github.com/a/pull/1",
            "github.com/a/b/pull/1",
            "",
        ] {
            let err = PullRequestRef::parse(url).unwrap_err();
            assert!(matches!(err, GitHubError::InvalidUrl(_)), "{}", url);
        }
    }

    #[test]
    fn test_error_messages() {
        let err = GitHubError::Status {
            status: 404,
            body: "Not Found".to_string(),
        };
        assert_eq!(err.to_string(), "Failed to fetch PR files: 404 Not Found");

        let json_err = serde_json::from_str::<Vec<PullFile>>("<html>").unwrap_err();
        assert_eq!(
            GitHubError::InvalidResponse(json_err).to_string(),
            "Invalid response from GitHub API. Please check your access token if you're using one."
        );
    }

    #[test]
    fn test_unreachable_api_is_network_error() {
        let config = GitHubConfig {
            api_url: "http://127.0.0.1:9".to_string(),
            timeout_secs: 5,
            ..GitHubConfig::default()
        };
        let client = GitHubClient::new(&config, None).unwrap();
        let pr = PullRequestRef::parse("https://github.com/octo/demo/pull/1").unwrap();
        let temp = tempfile::TempDir::new().unwrap();

        let err = fetch_pull_request(&client, &pr, temp.path()).unwrap_err();
        let err = err.downcast::<GitHubError>().unwrap();
        assert!(matches!(err, GitHubError::Network(_)));
        assert!(err.to_string().starts_with("Network error accessing GitHub API"));
    }
}
