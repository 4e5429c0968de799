//! Site generation.
//!
//! A prioritized chain of chat-completions backends produces the site
//! artifact; any backend failure falls through to the next backend, and the
//! chain terminates in a deterministic template renderer. Generation as a
//! whole therefore never fails, though it may produce empty files for the
//! publisher to fill in.

pub mod attachments;
pub mod backend;
pub mod parse;
pub mod prompt;
pub mod template;

use async_trait::async_trait;
use tracing::{info, warn};

use crate::config::GeneratorConfig;
use crate::error::{DeployError, DeployResult};
use crate::types::{DeployRequest, SiteArtifact};

pub use backend::ChatCompletionsBackend;

/// Errors from a single generation backend attempt.
///
/// Always recoverable: the generator logs the failure and tries the next
/// backend in the chain.
#[derive(Debug, thiserror::Error)]
pub enum BackendError {
    /// Transport-level failure, including timeouts.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// The endpoint answered with an unexpected status.
    #[error("unexpected status {status}: {body}")]
    UnexpectedStatus {
        /// HTTP status returned.
        status: reqwest::StatusCode,
        /// Response body, for the log.
        body: String,
    },

    /// The response decoded but carried no completion.
    #[error("malformed response: {0}")]
    Malformed(String),
}

/// A single source of raw completions.
#[async_trait]
pub trait GenerationBackend: Send + Sync {
    /// Backend name for logs.
    fn name(&self) -> &str;

    /// Produce a raw completion for the prompt.
    async fn complete(&self, prompt: &str) -> Result<String, BackendError>;
}

/// The generation pipeline: backend chain plus template fallback.
pub struct Generator {
    backends: Vec<Box<dyn GenerationBackend>>,
}

impl Generator {
    /// Build the generator from configuration.
    ///
    /// Backends without an API key are skipped with a warning; a backend
    /// whose HTTP client cannot be constructed is a configuration error.
    pub fn from_config(config: &GeneratorConfig) -> DeployResult<Self> {
        let mut backends: Vec<Box<dyn GenerationBackend>> = Vec::new();
        for entry in &config.backends {
            let Some(api_key) = entry.api_key.clone() else {
                warn!(backend = %entry.name, "skipping generation backend without an API key");
                continue;
            };
            let backend = ChatCompletionsBackend::new(entry, config, api_key)
                .map_err(|e| DeployError::config(format!("backend {}: {e}", entry.name)))?;
            backends.push(Box::new(backend));
        }
        Ok(Self { backends })
    }

    /// A generator with explicit backends, bypassing configuration.
    #[must_use]
    pub fn with_backends(backends: Vec<Box<dyn GenerationBackend>>) -> Self {
        Self { backends }
    }

    /// A generator that always renders the template.
    #[must_use]
    pub fn template_only() -> Self {
        Self {
            backends: Vec::new(),
        }
    }

    /// Generate the site artifact for a request. Never fails.
    pub async fn generate(&self, request: &DeployRequest) -> SiteArtifact {
        let decoded = attachments::decode_all(&request.attachments);
        let prompt = prompt::build_prompt(&request.brief, &request.checks, &decoded);

        for backend in &self.backends {
            match backend.complete(&prompt).await {
                Ok(text) => {
                    info!(backend = backend.name(), "generation backend produced a completion");
                    return parse::parse_response(&text);
                }
                Err(e) => {
                    warn!(backend = backend.name(), error = %e, "generation backend failed");
                }
            }
        }

        if self.backends.is_empty() {
            info!("no generation backends configured; rendering template");
        } else {
            info!("all generation backends failed; rendering template");
        }
        template::render(&request.brief, &request.checks)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    struct ScriptedBackend {
        name: &'static str,
        response: Option<String>,
    }

    impl ScriptedBackend {
        fn succeeding(name: &'static str, response: &str) -> Box<dyn GenerationBackend> {
            Box::new(Self {
                name,
                response: Some(response.to_owned()),
            })
        }

        fn failing(name: &'static str) -> Box<dyn GenerationBackend> {
            Box::new(Self {
                name,
                response: None,
            })
        }
    }

    #[async_trait]
    impl GenerationBackend for ScriptedBackend {
        fn name(&self) -> &str {
            self.name
        }

        async fn complete(&self, _prompt: &str) -> Result<String, BackendError> {
            match &self.response {
                Some(text) => Ok(text.clone()),
                None => Err(BackendError::Malformed("scripted failure".to_owned())),
            }
        }
    }

    fn request() -> DeployRequest {
        DeployRequest {
            email: "dev@example.com".to_owned(),
            task: "clock-app".to_owned(),
            round: 1,
            nonce: "n".to_owned(),
            brief: "a digital clock".to_owned(),
            checks: vec!["has title".to_owned()],
            evaluation_url: "https://eval.example.com".to_owned(),
            attachments: vec![],
        }
    }

    #[tokio::test]
    async fn test_template_fallback_when_no_backends() {
        let generator = Generator::template_only();
        let artifact = generator.generate(&request()).await;
        assert!(artifact.index_html.contains("a digital clock"));
        assert!(artifact.readme.contains("- has title"));
    }

    #[tokio::test]
    async fn test_chain_falls_through_to_next_backend() {
        let page = "```html\n<!DOCTYPE html><html><body>clock</body></html>\n```";
        let generator = Generator::with_backends(vec![
            ScriptedBackend::failing("first"),
            ScriptedBackend::succeeding("second", page),
        ]);
        let artifact = generator.generate(&request()).await;
        assert_eq!(
            artifact.index_html,
            "<!DOCTYPE html><html><body>clock</body></html>"
        );
    }

    #[tokio::test]
    async fn test_all_backends_failing_renders_template() {
        let generator = Generator::with_backends(vec![
            ScriptedBackend::failing("first"),
            ScriptedBackend::failing("second"),
        ]);
        let artifact = generator.generate(&request()).await;
        assert!(artifact.index_html.contains("a digital clock"));
    }

    #[tokio::test]
    async fn test_unparseable_completion_yields_empty_artifact() {
        // A backend that answers with prose is a successful completion;
        // the empty extraction is for the publisher to fill in, not a
        // reason to fall through to the template.
        let generator = Generator::with_backends(vec![ScriptedBackend::succeeding(
            "chatty",
            "I am unable to produce the application today.",
        )]);
        let artifact = generator.generate(&request()).await;
        assert!(artifact.index_html.is_empty());
        assert!(artifact.readme.is_empty());
    }
}
