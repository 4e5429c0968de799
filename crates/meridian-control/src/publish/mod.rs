//! Site publishing.
//!
//! A [`SitePublisher`] takes a generated artifact and makes it live: create
//! a repository on the forge, push the site files, enable Pages. The
//! [`MockPublisher`] records publishes instead, for tests and dry runs.

pub mod content;
pub mod forge;
pub mod names;
pub mod worktree;

use std::sync::Arc;

use async_trait::async_trait;
use reqwest::StatusCode;
use tokio::sync::Mutex;
use tracing::{info, warn};

use crate::config::{ForgeConfig, PublisherType};
use crate::error::DeployError;
use crate::types::{DeployRequest, PublishedSite, SiteArtifact};

use self::forge::ForgeApiClient;
use self::worktree::{authenticated_clone_url, GitError, Worktree};

/// Commit message for every published site.
pub const COMMIT_MESSAGE: &str = "Initial commit: Deploy generated application";

/// Errors raised while publishing a site.
#[derive(Debug, thiserror::Error)]
pub enum PublishError {
    /// Publisher configuration is missing or unusable.
    #[error("publisher configuration error: {0}")]
    Config(String),

    /// A forge API request could not be sent.
    #[error("forge api request failed: {0}")]
    Api(#[from] reqwest::Error),

    /// The forge API answered with an unexpected status.
    #[error("forge api returned {status} during {operation}: {body}")]
    UnexpectedStatus {
        operation: &'static str,
        status: StatusCode,
        body: String,
    },

    /// A git command failed.
    #[error(transparent)]
    Git(#[from] GitError),
}

impl From<PublishError> for DeployError {
    fn from(error: PublishError) -> Self {
        match error {
            PublishError::Config(message) => Self::Config(message),
            other => Self::Publish(other.to_string()),
        }
    }
}

/// Publishes a generated site somewhere reachable.
#[async_trait]
pub trait SitePublisher: Send + Sync {
    async fn publish(
        &self,
        request: &DeployRequest,
        artifact: &SiteArtifact,
    ) -> Result<PublishedSite, PublishError>;
}

/// Build the publisher selected by configuration.
pub fn create_publisher(config: &ForgeConfig) -> Result<Arc<dyn SitePublisher>, PublishError> {
    match config.publisher_type {
        PublisherType::Forge => Ok(Arc::new(ForgePublisher::new(config.clone())?)),
        PublisherType::Mock => {
            warn!("using mock publisher, no repositories will be created");
            Ok(Arc::new(MockPublisher::new()))
        }
    }
}

/// Real publisher: forge REST API plus git push over HTTPS.
pub struct ForgePublisher {
    api: ForgeApiClient,
    config: ForgeConfig,
}

impl ForgePublisher {
    pub fn new(config: ForgeConfig) -> Result<Self, PublishError> {
        Ok(Self {
            api: ForgeApiClient::new(&config)?,
            config,
        })
    }
}

#[async_trait]
impl SitePublisher for ForgePublisher {
    async fn publish(
        &self,
        request: &DeployRequest,
        artifact: &SiteArtifact,
    ) -> Result<PublishedSite, PublishError> {
        let repo_name = names::sanitise_repo_name(&request.task);
        let description = names::build_description(&request.brief);

        info!(repo = %repo_name, "creating repository");
        let repo = self.api.create_repository(&repo_name, &description).await?;
        info!(url = %repo.html_url, "repository created");

        let credentials = self.api.credentials()?;
        let owner = credentials.owner.to_owned();
        let token = credentials.token.clone();

        let branch = &self.config.default_branch;
        let clone_url = authenticated_clone_url(&repo.clone_url, &token);
        let worktree = Worktree::clone(&clone_url, branch, Some(token)).await?;
        worktree
            .configure_identity(&self.config.committer_name, &self.config.committer_email)
            .await?;

        for (path, contents) in content::site_files(request, artifact) {
            worktree.write_file(path, &contents).await?;
        }
        worktree.commit_all(COMMIT_MESSAGE).await?;
        worktree.push(branch).await?;
        let commit_sha = worktree.head_sha().await?;
        info!(%commit_sha, "site files pushed");

        // Pages frequently enables itself on the first push; an API failure
        // here must not fail the deployment.
        if let Err(error) = self.api.enable_pages(&repo.name, branch).await {
            warn!(%error, "failed to enable pages, returning canonical url anyway");
        }

        Ok(PublishedSite {
            repo_url: repo.html_url,
            commit_sha,
            pages_url: self.api.pages_url(&owner, &repo.name),
        })
    }
}

/// A publish recorded by [`MockPublisher`].
#[derive(Debug, Clone)]
pub struct RecordedPublish {
    pub repo_name: String,
    pub files: Vec<(&'static str, String)>,
}

/// In-memory publisher for tests and credential-free dry runs.
#[derive(Debug, Default)]
pub struct MockPublisher {
    publishes: Mutex<Vec<RecordedPublish>>,
    fail_with: Option<String>,
}

impl MockPublisher {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// A mock whose every publish fails with the given git error text.
    #[must_use]
    pub fn failing(message: impl Into<String>) -> Self {
        Self {
            publishes: Mutex::new(Vec::new()),
            fail_with: Some(message.into()),
        }
    }

    /// Everything published so far.
    pub async fn published(&self) -> Vec<RecordedPublish> {
        self.publishes.lock().await.clone()
    }
}

#[async_trait]
impl SitePublisher for MockPublisher {
    async fn publish(
        &self,
        request: &DeployRequest,
        artifact: &SiteArtifact,
    ) -> Result<PublishedSite, PublishError> {
        if let Some(message) = &self.fail_with {
            return Err(PublishError::Git(GitError::CommandFailed {
                command: "push".to_owned(),
                stderr: message.clone(),
            }));
        }

        let repo_name = names::sanitise_repo_name(&request.task);
        let files = content::site_files(request, artifact);
        self.publishes.lock().await.push(RecordedPublish {
            repo_name: repo_name.clone(),
            files,
        });

        Ok(PublishedSite {
            repo_url: format!("https://github.example/mock/{repo_name}"),
            commit_sha: "0000000000000000000000000000000000000000".to_owned(),
            pages_url: format!("https://mock.github.io/{repo_name}/"),
        })
    }
}
