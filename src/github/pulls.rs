//! Pull request file listing and raw downloads.

use serde::Deserialize;

use super::{GitHubClient, GitHubError, PullRequestRef};

/// Page size requested from the files endpoint (the API maximum).
const PER_PAGE: usize = 100;

/// The files endpoint stops at 3000 files.
const MAX_PAGES: usize = 30;

/// One entry of `GET /repos/{owner}/{repo}/pulls/{n}/files`.
#[derive(Debug, Clone, Deserialize)]
pub struct PullFile {
    pub filename: String,
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub raw_url: Option<String>,
    #[serde(default)]
    pub contents_url: Option<String>,
}

impl PullFile {
    /// URL serving the file's raw content at the PR head.
    pub fn download_url(&self) -> Option<String> {
        self.raw_url
            .clone()
            .filter(|u| !u.is_empty())
            .or_else(|| self.contents_url.as_deref().and_then(fallback_raw_url))
    }
}

/// Rewrite an API `contents_url` to raw.githubusercontent.com.
pub fn fallback_raw_url(contents_url: &str) -> Option<String> {
    if contents_url.is_empty() {
        return None;
    }
    Some(
        contents_url
            .replace("api.github.com/repos", "raw.githubusercontent.com")
            .replace("/contents/", "/"),
    )
}

impl GitHubClient {
    /// List every file changed by `pr`, following pagination.
    pub async fn list_files(&self, pr: &PullRequestRef) -> Result<Vec<PullFile>, GitHubError> {
        let base = format!(
            "{}/repos/{}/{}/pulls/{}/files",
            self.api_url, pr.owner, pr.repo, pr.number
        );
        let mut files = Vec::new();

        for page in 1..=MAX_PAGES {
            let url = format!("{}?per_page={}&page={}", base, PER_PAGE, page);
            log::debug!("GET {}", url);

            let response = self.get(&url).send().await?;
            let status = response.status();
            let body = response.text().await?;
            if !status.is_success() {
                return Err(GitHubError::Status {
                    status: status.as_u16(),
                    body,
                });
            }

            let batch: Vec<PullFile> =
                serde_json::from_str(&body).map_err(GitHubError::InvalidResponse)?;
            let last = batch.len() < PER_PAGE;
            files.extend(batch);
            if last {
                break;
            }
        }

        Ok(files)
    }

    /// Fetch a raw file. Non-200 responses yield None.
    pub async fn download(&self, url: &str) -> Result<Option<Vec<u8>>, GitHubError> {
        let response = self.get(url).send().await?;
        if response.status().as_u16() != 200 {
            log::debug!("GET {} returned {}", url, response.status());
            return Ok(None);
        }
        Ok(Some(response.bytes().await?.to_vec()))
    }
}
