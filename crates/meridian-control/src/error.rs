//! Error types for meridian-control.

use serde::{Deserialize, Serialize};

/// Result type alias using [`DeployError`].
pub type DeployResult<T> = Result<T, DeployError>;

/// Pipeline stage for error context and log correlation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Stage {
    /// Payload validation and authentication.
    Validate,
    /// Site generation.
    Generate,
    /// Repository provisioning and push.
    Publish,
    /// Completion notification.
    Notify,
}

impl std::fmt::Display for Stage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Validate => write!(f, "validate"),
            Self::Generate => write!(f, "generate"),
            Self::Publish => write!(f, "publish"),
            Self::Notify => write!(f, "notify"),
        }
    }
}

/// Errors that terminate a deployment pipeline run.
///
/// Notification failures never appear here; a failed notification after a
/// successful publish degrades the run to partial success instead.
#[derive(Debug, thiserror::Error)]
pub enum DeployError {
    /// The request payload failed structural validation.
    #[error("{0}")]
    Validation(String),

    /// Secret verification failed, or no secret is configured.
    #[error("Invalid secret")]
    Unauthorised,

    /// The service is missing configuration required to proceed.
    #[error("configuration error: {0}")]
    Config(String),

    /// Repository provisioning or push failed.
    #[error("publish failed: {0}")]
    Publish(String),

    /// Internal error.
    #[error("internal error: {0}")]
    Internal(String),
}

impl DeployError {
    /// Create a validation error.
    #[must_use]
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    /// Create a configuration error.
    #[must_use]
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    /// Create a publish error.
    #[must_use]
    pub fn publish(msg: impl Into<String>) -> Self {
        Self::Publish(msg.into())
    }

    /// Create an internal error.
    #[must_use]
    pub fn internal(msg: impl Into<String>) -> Self {
        Self::Internal(msg.into())
    }

    /// The pipeline stage this error is attributed to.
    #[must_use]
    pub fn stage(&self) -> Stage {
        match self {
            Self::Validation(_) | Self::Unauthorised => Stage::Validate,
            Self::Config(_) | Self::Publish(_) | Self::Internal(_) => Stage::Publish,
        }
    }
}
