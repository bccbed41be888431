//! GitHub REST client used by the remote source provider.

use crate::types::{GithubError, RepoResponse, TreeResponse};
use anyhow::{anyhow, bail, Context, Result};
use reqwest::{Client, Response, StatusCode};
use thiserror::Error;

pub const API_BASE: &str = "https://api.github.com";
pub const RAW_BASE: &str = "https://raw.githubusercontent.com";

/// GitHub refused the request for quota reasons; retrying without a token won't help.
#[derive(Debug, Error)]
#[error("GitHub API rate limit exceeded; set GITHUB_TOKEN or run `stackprobe config set-token`")]
pub struct RateLimited;

fn is_rate_limited(res: &Response) -> bool {
    let status = res.status();
    (status == StatusCode::FORBIDDEN || status == StatusCode::TOO_MANY_REQUESTS)
        && res
            .headers()
            .get("x-ratelimit-remaining")
            .and_then(|v| v.to_str().ok())
            .map_or(status == StatusCode::TOO_MANY_REQUESTS, |v| v.trim() == "0")
}

async fn handle_response<T: serde::de::DeserializeOwned>(res: Response) -> Result<T> {
    let status = res.status();
    if status.is_success() {
        return res.json::<T>().await.context("Failed to parse GitHub response");
    }
    if is_rate_limited(&res) {
        return Err(RateLimited.into());
    }
    let error_text = res.text().await.unwrap_or_else(|_| format!("HTTP Error: {}", status));
    match serde_json::from_str::<GithubError>(&error_text) {
        Ok(parsed) => Err(anyhow!("GitHub {}: {}", status, parsed.message)),
        Err(_) => Err(anyhow!("GitHub {}: {}", status, error_text)),
    }
}

pub struct GithubClient {
    http: Client,
    api_base: String,
    raw_base: String,
    token: Option<String>,
}

impl GithubClient {
    pub fn new(token: Option<String>) -> Result<Self> {
        Self::with_bases(API_BASE, RAW_BASE, token)
    }

    pub fn with_bases(api_base: &str, raw_base: &str, token: Option<String>) -> Result<Self> {
        let http = Client::builder()
            .user_agent(concat!("stackprobe/", env!("CARGO_PKG_VERSION")))
            .build()
            .context("Failed to build HTTP client")?;
        Ok(GithubClient {
            http,
            api_base: api_base.trim_end_matches('/').to_string(),
            raw_base: raw_base.trim_end_matches('/').to_string(),
            token,
        })
    }

    fn get(&self, url: String) -> reqwest::RequestBuilder {
        let req = self
            .http
            .get(url)
            .header("Accept", "application/vnd.github+json");
        match self.token {
            Some(ref t) => req.bearer_auth(t),
            None => req,
        }
    }

    pub async fn default_branch(&self, owner: &str, repo: &str) -> Result<String> {
        let res = self
            .get(format!("{}/repos/{}/{}", self.api_base, owner, repo))
            .send()
            .await
            .context("Failed to reach GitHub")?;
        let repo: RepoResponse = handle_response(res).await?;
        Ok(repo.default_branch)
    }

    pub async fn tree(&self, owner: &str, repo: &str, branch: &str) -> Result<TreeResponse> {
        let res = self
            .get(format!(
                "{}/repos/{}/{}/git/trees/{}?recursive=1",
                self.api_base, owner, repo, branch
            ))
            .send()
            .await
            .context("Failed to reach GitHub")?;
        handle_response(res).await
    }

    /// Raw file bytes at `branch`.
    pub async fn raw(&self, owner: &str, repo: &str, branch: &str, path: &str) -> Result<Vec<u8>> {
        let res = self
            .get(format!("{}/{}/{}/{}/{}", self.raw_base, owner, repo, branch, path))
            .send()
            .await
            .with_context(|| format!("Failed to download {}", path))?;
        let status = res.status();
        if is_rate_limited(&res) {
            return Err(RateLimited.into());
        }
        if !status.is_success() {
            bail!("GitHub {} for {}", status, path);
        }
        Ok(res.bytes().await?.to_vec())
    }
}
