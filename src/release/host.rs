//! Release host (GitHub releases API)

use std::path::Path;
use std::thread;
use std::time::Duration;

use reqwest::blocking::{Client, RequestBuilder};
use serde::Deserialize;
use serde_json::json;
use thiserror::Error;
use tracing::{info, warn};

use crate::config::ReleaseSettings;
use crate::error::{Error, Result};

const USER_AGENT: &str = concat!("display-schemas/", env!("CARGO_PKG_VERSION"));

/// A failed call to the release host
#[derive(Error, Debug)]
pub enum HostError {
    #[error("HTTP {status}: {body}")]
    Status { status: u16, body: String },

    #[error("request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("{0}")]
    Other(String),
}

impl HostError {
    /// Client errors other than rate limiting fail the same way on every try
    pub fn is_retryable(&self) -> bool {
        match self {
            HostError::Status { status, .. } => *status == 429 || *status >= 500,
            HostError::Request(_) | HostError::Other(_) => true,
        }
    }
}

pub type HostResult<T> = std::result::Result<T, HostError>;

/// Release to create on the host
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReleaseRequest {
    pub tag: String,
    pub name: String,
    pub body: String,
    pub target: String,
}

/// Release created on the host
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PublishedRelease {
    pub id: u64,
    pub url: String,
    pub upload_url: String,
}

/// Operations the pipeline needs from the release host
pub trait ReleaseHost {
    fn create_release(&self, request: &ReleaseRequest) -> HostResult<PublishedRelease>;

    /// Release already published under `tag`, if any
    fn find_release(&self, tag: &str) -> HostResult<Option<PublishedRelease>>;

    fn upload_asset(
        &self,
        release: &PublishedRelease,
        name: &str,
        label: &str,
        content: &[u8],
    ) -> HostResult<()>;

    fn comment_on_issue(&self, issue: u64, body: &str) -> HostResult<()>;

    fn open_issue(&self, title: &str, body: &str) -> HostResult<()>;
}

/// Retry `call` up to `attempts` times with a fixed delay between tries
///
/// Errors that are not retryable end the loop on the spot.
pub fn with_retry<T>(
    attempts: u32,
    delay: Duration,
    action: &str,
    mut call: impl FnMut() -> HostResult<T>,
) -> Result<T> {
    let attempts = attempts.max(1);
    let mut attempt = 1;
    loop {
        match call() {
            Ok(value) => return Ok(value),
            Err(e) if attempt < attempts && e.is_retryable() => {
                warn!("{} failed (attempt {}/{}): {}", action, attempt, attempts, e);
                thread::sleep(delay);
                attempt += 1;
            }
            Err(e) => {
                return Err(Error::Publish {
                    attempts: attempt,
                    reason: format!("{}: {}", action, e),
                })
            }
        }
    }
}

#[derive(Deserialize)]
struct GitHubRelease {
    id: u64,
    html_url: String,
    upload_url: String,
}

impl From<GitHubRelease> for PublishedRelease {
    fn from(release: GitHubRelease) -> Self {
        Self {
            id: release.id,
            url: release.html_url,
            upload_url: release.upload_url,
        }
    }
}

/// `ReleaseHost` backed by the GitHub REST API
pub struct GitHubHost {
    client: Client,
    api_url: String,
    repository: String,
    token: String,
}

impl GitHubHost {
    pub fn new(api_url: &str, repository: &str, token: &str) -> Result<Self> {
        let client = Client::builder()
            .user_agent(USER_AGENT)
            .timeout(Duration::from_secs(60))
            .build()
            .map_err(|e| Error::Configuration(format!("Failed to create HTTP client: {}", e)))?;
        Ok(Self {
            client,
            api_url: api_url.trim_end_matches('/').to_string(),
            repository: repository.to_string(),
            token: token.to_string(),
        })
    }

    /// Build from settings, reading the token from the configured variable
    pub fn from_settings(settings: &ReleaseSettings) -> Result<Self> {
        let repository = settings.repository.as_deref().ok_or_else(|| {
            Error::Configuration("release.repository is required to publish".to_string())
        })?;
        let token = std::env::var(&settings.token_env).map_err(|_| {
            Error::Configuration(format!(
                "environment variable {} with the release token is not set",
                settings.token_env
            ))
        })?;
        Self::new(&settings.api_url, repository, &token)
    }

    fn repo_url(&self, path: &str) -> String {
        format!("{}/repos/{}/{}", self.api_url, self.repository, path)
    }

    fn send(&self, request: RequestBuilder) -> HostResult<reqwest::blocking::Response> {
        let response = request
            .bearer_auth(&self.token)
            .header("Accept", "application/vnd.github+json")
            .send()?;
        if !response.status().is_success() {
            let status = response.status().as_u16();
            let body = response.text().unwrap_or_default();
            return Err(HostError::Status { status, body });
        }
        Ok(response)
    }
}

impl ReleaseHost for GitHubHost {
    fn create_release(&self, request: &ReleaseRequest) -> HostResult<PublishedRelease> {
        let response = self.send(self.client.post(self.repo_url("releases")).json(&json!({
            "tag_name": request.tag,
            "target_commitish": request.target,
            "name": request.name,
            "body": request.body,
            "draft": false,
            "prerelease": false,
        })))?;
        let release: GitHubRelease = response.json()?;
        info!("Created release {}", release.html_url);
        Ok(release.into())
    }

    fn find_release(&self, tag: &str) -> HostResult<Option<PublishedRelease>> {
        let url = self.repo_url(&format!("releases/tags/{}", tag));
        match self.send(self.client.get(url)) {
            Ok(response) => {
                let release: GitHubRelease = response.json()?;
                Ok(Some(release.into()))
            }
            Err(HostError::Status { status: 404, .. }) => Ok(None),
            Err(e) => Err(e),
        }
    }

    fn upload_asset(
        &self,
        release: &PublishedRelease,
        name: &str,
        label: &str,
        content: &[u8],
    ) -> HostResult<()> {
        // upload_url is a URI template: ".../assets{?name,label}"
        let url = match release.upload_url.split_once('{') {
            Some((url, _)) => url.to_string(),
            None => release.upload_url.clone(),
        };
        let content_type = match Path::new(name).extension().and_then(|e| e.to_str()) {
            Some("json") => "application/json",
            Some("html") => "text/html",
            _ => "application/octet-stream",
        };
        self.send(
            self.client
                .post(url)
                .query(&[("name", name), ("label", label)])
                .header("Content-Type", content_type)
                .body(content.to_vec()),
        )?;
        info!("Uploaded {} ({})", name, label);
        Ok(())
    }

    fn comment_on_issue(&self, issue: u64, body: &str) -> HostResult<()> {
        self.send(
            self.client
                .post(self.repo_url(&format!("issues/{}/comments", issue)))
                .json(&json!({ "body": body })),
        )?;
        Ok(())
    }

    fn open_issue(&self, title: &str, body: &str) -> HostResult<()> {
        self.send(
            self.client
                .post(self.repo_url("issues"))
                .json(&json!({ "title": title, "body": body, "labels": ["semantic-release"] })),
        )?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;

    #[test]
    fn test_retry_succeeds_after_transient_failures() {
        let calls = Cell::new(0);
        let value = with_retry(3, Duration::ZERO, "create release", || {
            calls.set(calls.get() + 1);
            if calls.get() < 3 {
                Err(HostError::Other("502".to_string()))
            } else {
                Ok(7)
            }
        })
        .unwrap();
        assert_eq!(value, 7);
        assert_eq!(calls.get(), 3);
    }

    #[test]
    fn test_retry_gives_up_with_publish_error() {
        let calls = Cell::new(0);
        let result: Result<()> = with_retry(2, Duration::ZERO, "upload asset", || {
            calls.set(calls.get() + 1);
            Err(HostError::Status { status: 502, body: "Bad gateway".to_string() })
        });
        match result {
            Err(Error::Publish { attempts, reason }) => {
                assert_eq!(attempts, 2);
                assert!(reason.contains("Bad gateway"));
            }
            other => panic!("expected publish error, got {:?}", other),
        }
        assert_eq!(calls.get(), 2);
    }

    #[test]
    fn test_client_errors_are_not_retried() {
        let calls = Cell::new(0);
        let result: Result<()> = with_retry(4, Duration::ZERO, "create release", || {
            calls.set(calls.get() + 1);
            Err(HostError::Status { status: 401, body: "Bad credentials".to_string() })
        });
        match result {
            Err(Error::Publish { attempts, reason }) => {
                assert_eq!(attempts, 1);
                assert!(reason.contains("Bad credentials"));
            }
            other => panic!("expected publish error, got {:?}", other),
        }
        assert_eq!(calls.get(), 1);

        assert!(HostError::Status { status: 429, body: String::new() }.is_retryable());
        assert!(!HostError::Status { status: 422, body: String::new() }.is_retryable());
    }

    #[test]
    fn test_from_settings_requires_repository_and_token() {
        let mut settings = ReleaseSettings::default();
        assert!(matches!(
            GitHubHost::from_settings(&settings),
            Err(Error::Configuration(_))
        ));

        settings.repository = Some("ladybug-tools/ladybug-display-schema".to_string());
        settings.token_env = "DISPLAY_SCHEMAS_TEST_TOKEN_UNSET".to_string();
        assert!(matches!(
            GitHubHost::from_settings(&settings),
            Err(Error::Configuration(_))
        ));
    }
}
