//! GitHub provider client.
//!
//! Two concerns at the code-host boundary:
//! - fetch a pull request's unified diff (`.diff` media type),
//! - publish review output (inline-annotated review, or a plain issue
//!   comment on the PR thread).
//!
//! Request/response bodies are module-local serde structs; non-2xx
//! responses map onto the provider error taxonomy in `errors`.

use std::time::Duration;

use reqwest::header::{ACCEPT, AUTHORIZATION, HeaderMap, HeaderValue};
use serde::Serialize;
use tracing::{debug, info, warn};

use crate::errors::{ConfigError, Error, PrResult, ProviderError};
use crate::publish::InlineComment;

/// Media type that makes the pulls endpoint return a unified diff body.
const DIFF_MEDIA_TYPE: &str = "application/vnd.github.v3.diff";
const JSON_MEDIA_TYPE: &str = "application/vnd.github.v3+json";
const SERVICE_USER_AGENT: &str = "pr-review-backend/0.1";

/// Runtime configuration for the GitHub client.
#[derive(Debug, Clone)]
pub struct GithubConfig {
    /// API base, e.g. "https://api.github.com".
    pub base_api: String,
    /// Access token (PAT or app token); anonymous requests work for public
    /// repos but hit much lower rate limits.
    pub token: Option<String>,
}

impl GithubConfig {
    pub fn from_env() -> Self {
        Self {
            base_api: std::env::var("GITHUB_API_BASE")
                .unwrap_or_else(|_| "https://api.github.com".to_string()),
            token: std::env::var("GITHUB_TOKEN").ok().filter(|t| !t.is_empty()),
        }
    }
}

/// Thin async client over the GitHub REST API.
#[derive(Debug, Clone)]
pub struct GitHubClient {
    http: reqwest::Client,
    base_api: String,
    token: Option<String>,
}

impl GitHubClient {
    pub fn new(cfg: &GithubConfig) -> PrResult<Self> {
        let base = cfg.base_api.trim();
        if !(base.starts_with("http://") || base.starts_with("https://")) {
            return Err(ConfigError::InvalidBaseUrl(cfg.base_api.clone()).into());
        }

        let http = reqwest::Client::builder()
            .user_agent(SERVICE_USER_AGENT)
            .connect_timeout(Duration::from_secs(10))
            .timeout(Duration::from_secs(30))
            .build()?;

        Ok(Self {
            http,
            base_api: base.trim_end_matches('/').to_string(),
            token: cfg.token.clone(),
        })
    }

    fn headers(&self, accept: &'static str) -> PrResult<HeaderMap> {
        let mut headers = HeaderMap::new();
        headers.insert(ACCEPT, HeaderValue::from_static(accept));
        if let Some(token) = &self.token {
            let value = HeaderValue::from_str(&format!("Bearer {token}"))
                .map_err(|e| ConfigError::InvalidToken(e.to_string()))?;
            headers.insert(AUTHORIZATION, value);
        }
        Ok(headers)
    }

    /// Fetch the unified diff for a pull request.
    ///
    /// # Errors
    /// Any non-200 response maps onto [`ProviderError`]; transport failures
    /// arrive as timeout/network variants.
    pub async fn fetch_pr_diff(&self, repo: &str, pr_number: u64) -> PrResult<String> {
        let url = format!("{}/repos/{}/pulls/{}", self.base_api, repo, pr_number);
        debug!(repo, pr = pr_number, "GET pull request diff");

        let resp = self
            .http
            .get(&url)
            .headers(self.headers(DIFF_MEDIA_TYPE)?)
            .send()
            .await?;

        let status = resp.status();
        if status.as_u16() != 200 {
            let body = resp.text().await.unwrap_or_default();
            return Err(status_error(status.as_u16(), &body));
        }
        Ok(resp.text().await?)
    }

    /// Submit a review carrying inline comments. Returns whether GitHub
    /// accepted it; a rejected submission is logged, not raised, so the
    /// caller can fall back to a plain comment.
    pub async fn post_review(
        &self,
        repo: &str,
        pr_number: u64,
        body: &str,
        inline: &[InlineComment],
    ) -> PrResult<bool> {
        #[derive(Serialize)]
        struct Req<'a> {
            event: &'a str,
            body: &'a str,
            comments: &'a [InlineComment],
        }

        let url = format!("{}/repos/{}/pulls/{}/reviews", self.base_api, repo, pr_number);
        let payload = Req {
            event: "COMMENT",
            body: if body.is_empty() { "Automated review" } else { body },
            comments: inline,
        };

        let resp = self
            .http
            .post(&url)
            .headers(self.headers(JSON_MEDIA_TYPE)?)
            .json(&payload)
            .send()
            .await?;

        let status = resp.status();
        if status.as_u16() >= 300 {
            let text = resp.text().await.unwrap_or_default();
            warn!(
                repo,
                pr = pr_number,
                status = status.as_u16(),
                body = %snippet(&text),
                "inline review submission rejected"
            );
            return Ok(false);
        }

        info!(repo, pr = pr_number, inline = inline.len(), "submitted inline review");
        Ok(true)
    }

    /// Post a plain comment on the PR conversation thread.
    pub async fn post_issue_comment(&self, repo: &str, pr_number: u64, body: &str) -> PrResult<()> {
        if body.is_empty() {
            return Ok(());
        }

        #[derive(Serialize)]
        struct Req<'a> {
            body: &'a str,
        }

        let url = format!(
            "{}/repos/{}/issues/{}/comments",
            self.base_api, repo, pr_number
        );
        let resp = self
            .http
            .post(&url)
            .headers(self.headers(JSON_MEDIA_TYPE)?)
            .json(&Req { body })
            .send()
            .await?;

        let status = resp.status();
        if status.as_u16() >= 300 {
            let text = resp.text().await.unwrap_or_default();
            return Err(status_error(status.as_u16(), &text));
        }
        info!(repo, pr = pr_number, "posted issue comment");
        Ok(())
    }
}

fn status_error(status: u16, body: &str) -> Error {
    let err = match status {
        401 => ProviderError::Unauthorized,
        403 => ProviderError::Forbidden,
        404 => ProviderError::NotFound,
        429 => ProviderError::RateLimited {
            retry_after_secs: None,
        },
        500..=599 => ProviderError::Server(status),
        _ => ProviderError::HttpStatus {
            status,
            message: snippet(body),
        },
    };
    err.into()
}

fn snippet(text: &str) -> String {
    const MAX: usize = 200;
    let trimmed = text.trim();
    if trimmed.len() <= MAX {
        return trimmed.to_string();
    }
    let mut end = MAX;
    while !trimmed.is_char_boundary(end) {
        end -= 1;
    }
    format!("{}...", &trimmed[..end])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_non_http_base_url() {
        let cfg = GithubConfig {
            base_api: "ftp://example.com".into(),
            token: None,
        };
        assert!(GitHubClient::new(&cfg).is_err());
    }

    #[test]
    fn trims_trailing_slash_from_base() {
        let cfg = GithubConfig {
            base_api: "https://api.github.com/".into(),
            token: Some("token".into()),
        };
        let client = GitHubClient::new(&cfg).unwrap();
        assert_eq!(client.base_api, "https://api.github.com");
    }

    #[test]
    fn status_mapping_follows_taxonomy() {
        assert!(matches!(
            status_error(401, ""),
            Error::Provider(ProviderError::Unauthorized)
        ));
        assert!(matches!(
            status_error(429, ""),
            Error::Provider(ProviderError::RateLimited { .. })
        ));
        assert!(matches!(
            status_error(503, ""),
            Error::Provider(ProviderError::Server(503))
        ));
        assert!(matches!(
            status_error(302, ""),
            Error::Provider(ProviderError::HttpStatus { status: 302, .. })
        ));
    }
}
