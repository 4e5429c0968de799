//! REST client for the repository forge.
//!
//! Covers the two calls a publish needs: create a repository under the
//! configured account, and enable Pages on it. Credentials are checked per
//! call rather than at startup, so the service can run (and report a clean
//! per-request error) without forge credentials.

use std::time::Duration;

use reqwest::{header, Method, RequestBuilder, StatusCode};
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};

use super::PublishError;
use crate::config::ForgeConfig;

const GITHUB_ACCEPT: &str = "application/vnd.github+json";
const GITHUB_API_VERSION: &str = "2022-11-28";

/// Client for the forge REST API.
#[derive(Debug, Clone)]
pub struct ForgeApiClient {
    client: reqwest::Client,
    api_url: String,
    owner: Option<String>,
    token: Option<SecretString>,
}

/// Borrowed view of the configured credentials.
#[derive(Debug)]
pub struct ForgeCredentials<'a> {
    pub owner: &'a str,
    pub token: &'a SecretString,
}

/// Repository metadata returned by a successful create call.
#[derive(Debug, Clone, Deserialize)]
pub struct CreatedRepo {
    pub name: String,
    pub clone_url: String,
    pub html_url: String,
}

#[derive(Debug, Serialize)]
struct CreateRepoRequest<'a> {
    name: &'a str,
    description: &'a str,
    homepage: &'a str,
    private: bool,
    has_issues: bool,
    has_wiki: bool,
    has_downloads: bool,
    auto_init: bool,
}

#[derive(Debug, Serialize)]
struct PagesRequest<'a> {
    source: PagesSource<'a>,
}

#[derive(Debug, Serialize)]
struct PagesSource<'a> {
    branch: &'a str,
    path: &'a str,
}

impl ForgeApiClient {
    pub fn new(config: &ForgeConfig) -> Result<Self, PublishError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| PublishError::Config(format!("failed to build forge client: {e}")))?;

        Ok(Self {
            client,
            api_url: config.api_url.trim_end_matches('/').to_owned(),
            owner: config.owner.clone(),
            token: config.token.clone(),
        })
    }

    /// Configured credentials, or a config error naming what is missing.
    pub fn credentials(&self) -> Result<ForgeCredentials<'_>, PublishError> {
        let owner = match self.owner.as_deref() {
            Some(owner) if !owner.is_empty() => owner,
            _ => {
                return Err(PublishError::Config(
                    "forge owner is not configured".to_owned(),
                ))
            }
        };
        let token = match &self.token {
            Some(token) if !token.expose_secret().is_empty() => token,
            _ => {
                return Err(PublishError::Config(
                    "forge token is not configured".to_owned(),
                ))
            }
        };
        Ok(ForgeCredentials { owner, token })
    }

    /// Create a repository under the configured account.
    pub async fn create_repository(
        &self,
        name: &str,
        description: &str,
    ) -> Result<CreatedRepo, PublishError> {
        let credentials = self.credentials()?;
        let url = format!("{}/user/repos", self.api_url);
        let body = CreateRepoRequest {
            name,
            description,
            homepage: "",
            private: false,
            has_issues: true,
            has_wiki: false,
            has_downloads: true,
            auto_init: false,
        };

        let response = self
            .request(Method::POST, &url, credentials.token)
            .json(&body)
            .send()
            .await?;

        let status = response.status();
        if status != StatusCode::CREATED {
            return Err(PublishError::UnexpectedStatus {
                operation: "create repository",
                status,
                body: response.text().await.unwrap_or_default(),
            });
        }
        Ok(response.json().await?)
    }

    /// Enable Pages on a repository, serving `branch` from the root.
    ///
    /// A conflict means Pages is already enabled and counts as success.
    pub async fn enable_pages(&self, repo: &str, branch: &str) -> Result<(), PublishError> {
        let credentials = self.credentials()?;
        let url = format!("{}/repos/{}/{repo}/pages", self.api_url, credentials.owner);
        let body = PagesRequest {
            source: PagesSource { branch, path: "/" },
        };

        let response = self
            .request(Method::POST, &url, credentials.token)
            .json(&body)
            .send()
            .await?;

        match response.status() {
            StatusCode::CREATED | StatusCode::NO_CONTENT | StatusCode::CONFLICT => Ok(()),
            status => Err(PublishError::UnexpectedStatus {
                operation: "enable pages",
                status,
                body: response.text().await.unwrap_or_default(),
            }),
        }
    }

    /// Canonical Pages URL for a repository.
    #[must_use]
    pub fn pages_url(&self, owner: &str, repo: &str) -> String {
        format!("https://{owner}.github.io/{repo}/")
    }

    fn request(&self, method: Method, url: &str, token: &SecretString) -> RequestBuilder {
        self.client
            .request(method, url)
            .header(
                header::AUTHORIZATION,
                format!("token {}", token.expose_secret()),
            )
            .header(header::ACCEPT, GITHUB_ACCEPT)
            .header("X-GitHub-Api-Version", GITHUB_API_VERSION)
            .header(header::USER_AGENT, "meridian-control")
    }
}
