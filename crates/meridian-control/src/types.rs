//! Core types for meridian-control.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Unique identifier for a deployment request.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DeployId(String);

impl DeployId {
    /// Create a deploy ID from an existing string.
    #[must_use]
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Generate a new unique deploy ID using ULID.
    #[must_use]
    pub fn generate() -> Self {
        Self(ulid::Ulid::new().to_string().to_lowercase())
    }

    /// Get the ID as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for DeployId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl AsRef<str> for DeployId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// A validated deployment request.
///
/// Built by [`crate::validate::parse_request`] from the raw JSON payload.
/// The shared secret is deliberately not carried here; authentication
/// reads it straight from the payload and drops it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DeployRequest {
    /// Requester email address.
    pub email: String,
    /// Task identifier; also seeds the repository name.
    pub task: String,
    /// Evaluation round, 1-based.
    pub round: u64,
    /// Opaque nonce echoed back in the completion notification.
    pub nonce: String,
    /// Natural-language description of the application to build.
    pub brief: String,
    /// Acceptance checks the application should satisfy.
    #[serde(default)]
    pub checks: Vec<String>,
    /// Endpoint notified when the pipeline completes.
    pub evaluation_url: String,
    /// Supporting files supplied as data URIs.
    #[serde(default)]
    pub attachments: Vec<Attachment>,
}

/// A request attachment carried inline as a `data:` URI.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Attachment {
    /// File name as supplied by the requester.
    pub name: String,
    /// `data:<mime>;base64,<content>` URI.
    pub url: String,
}

/// Decoded attachment content.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AttachmentContent {
    /// Textual content (UTF-8) for text-like MIME types.
    Text(String),
    /// Raw bytes for everything else.
    Binary(Vec<u8>),
}

/// An attachment after base64 decoding.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecodedAttachment {
    /// Original file name.
    pub name: String,
    /// MIME type parsed from the data URI.
    pub mime_type: String,
    /// Decoded content.
    pub content: AttachmentContent,
}

impl DecodedAttachment {
    /// Textual content, if this attachment decoded as text.
    #[must_use]
    pub fn as_text(&self) -> Option<&str> {
        match &self.content {
            AttachmentContent::Text(text) => Some(text),
            AttachmentContent::Binary(_) => None,
        }
    }
}

/// The generated site, ready for publishing.
///
/// Either member may be empty, meaning the generator did not produce that
/// file; the publisher substitutes a non-empty default in that case.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SiteArtifact {
    /// Contents of `index.html`.
    pub index_html: String,
    /// Contents of `README.md`.
    pub readme: String,
}

impl SiteArtifact {
    /// An artifact with both members empty.
    #[must_use]
    pub fn empty() -> Self {
        Self::default()
    }
}

/// Where a published site lives.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PublishedSite {
    /// Browser URL of the repository.
    pub repo_url: String,
    /// Commit SHA of the published tree.
    pub commit_sha: String,
    /// Public hosting URL for the site.
    pub pages_url: String,
}

/// Completion payload sent to the evaluation endpoint.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NotifyPayload {
    /// Requester email, echoed from the request.
    pub email: String,
    /// Task identifier, echoed from the request.
    pub task: String,
    /// Evaluation round, echoed from the request.
    pub round: u64,
    /// Nonce, echoed from the request.
    pub nonce: String,
    /// Repository URL of the published site.
    pub repo_url: String,
    /// Commit SHA of the published tree.
    pub commit_sha: String,
    /// Public hosting URL.
    pub pages_url: String,
}

impl NotifyPayload {
    /// Assemble the payload from a request and its published site.
    #[must_use]
    pub fn new(request: &DeployRequest, site: &PublishedSite) -> Self {
        Self {
            email: request.email.clone(),
            task: request.task.clone(),
            round: request.round,
            nonce: request.nonce.clone(),
            repo_url: site.repo_url.clone(),
            commit_sha: site.commit_sha.clone(),
            pages_url: site.pages_url.clone(),
        }
    }
}

/// Result of the notification stage.
///
/// `error` is `Some` exactly when `success` is false.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NotifyOutcome {
    /// Whether the evaluation endpoint acknowledged with HTTP 200.
    pub success: bool,
    /// Last attempt's failure description, when unsuccessful.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl NotifyOutcome {
    /// A successful notification.
    #[must_use]
    pub fn delivered() -> Self {
        Self {
            success: true,
            error: None,
        }
    }

    /// A failed notification carrying the last attempt's error.
    #[must_use]
    pub fn failed(error: impl Into<String>) -> Self {
        Self {
            success: false,
            error: Some(error.into()),
        }
    }
}

/// Terminal result of a deployment pipeline run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DeployOutcome {
    /// Published and the evaluation endpoint acknowledged.
    Deployed {
        /// The published site.
        site: PublishedSite,
    },
    /// Published, but every notification attempt failed. The site is live;
    /// callers treat this as partial success, not failure.
    NotificationFailed {
        /// The published site.
        site: PublishedSite,
        /// Last notification attempt's error.
        error: String,
    },
}

impl DeployOutcome {
    /// The published site, present in every terminal outcome.
    #[must_use]
    pub fn site(&self) -> &PublishedSite {
        match self {
            Self::Deployed { site } | Self::NotificationFailed { site, .. } => site,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_deploy_id_generate_is_lowercase_and_unique() {
        let a = DeployId::generate();
        let b = DeployId::generate();
        assert_eq!(a.as_str(), a.as_str().to_lowercase());
        assert_ne!(a, b);
    }

    #[test]
    fn test_notify_outcome_constructors() {
        let ok = NotifyOutcome::delivered();
        assert!(ok.success);
        assert!(ok.error.is_none());

        let failed = NotifyOutcome::failed("status 500: boom");
        assert!(!failed.success);
        assert_eq!(failed.error.as_deref(), Some("status 500: boom"));
    }

    #[test]
    fn test_notify_payload_echoes_request_fields() {
        let request = DeployRequest {
            email: "dev@example.com".to_owned(),
            task: "clock".to_owned(),
            round: 2,
            nonce: "n-1".to_owned(),
            brief: "a digital clock".to_owned(),
            checks: vec![],
            evaluation_url: "https://eval.example.com/hook".to_owned(),
            attachments: vec![],
        };
        let site = PublishedSite {
            repo_url: "https://github.com/o/clock".to_owned(),
            commit_sha: "abc123".to_owned(),
            pages_url: "https://o.github.io/clock/".to_owned(),
        };

        let payload = NotifyPayload::new(&request, &site);
        assert_eq!(payload.email, "dev@example.com");
        assert_eq!(payload.round, 2);
        assert_eq!(payload.commit_sha, "abc123");
        assert_eq!(payload.pages_url, "https://o.github.io/clock/");
    }

    #[test]
    fn test_deploy_outcome_site_accessor() {
        let site = PublishedSite {
            repo_url: "https://github.com/o/r".to_owned(),
            commit_sha: "deadbeef".to_owned(),
            pages_url: "https://o.github.io/r/".to_owned(),
        };
        let partial = DeployOutcome::NotificationFailed {
            site: site.clone(),
            error: "timed out".to_owned(),
        };
        assert_eq!(partial.site(), &site);
    }
}
