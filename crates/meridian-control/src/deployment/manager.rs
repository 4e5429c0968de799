//! Core deployment orchestration logic.

use std::sync::Arc;

use secrecy::SecretString;
use serde_json::Value;
use tracing::{error, info, warn};

use crate::config::ControlConfig;
use crate::error::{DeployError, DeployResult, Stage};
use crate::generate::Generator;
use crate::notify::Notifier;
use crate::publish::{create_publisher, SitePublisher};
use crate::state::Deployment;
use crate::types::{DeployId, DeployOutcome, NotifyPayload};
use crate::validate::{parse_request, provided_secret, verify_secret};

/// Orchestrates the deployment pipeline.
///
/// One call to [`DeploymentManager::deploy`] runs a request start-to-finish:
/// validate, authenticate, generate, publish, notify. The pipeline is
/// single-flow; concurrent requests share only this manager's read-only
/// components.
pub struct DeploymentManager {
    shared_secret: Option<SecretString>,
    generator: Generator,
    publisher: Arc<dyn SitePublisher>,
    notifier: Notifier,
}

impl DeploymentManager {
    /// Wire the pipeline from configuration.
    pub fn from_config(config: &ControlConfig) -> DeployResult<Self> {
        Ok(Self::new(
            config.auth.shared_secret.clone(),
            Generator::from_config(&config.generator)?,
            create_publisher(&config.forge)?,
            Notifier::from_config(&config.notifier)?,
        ))
    }

    /// Wire the pipeline from explicit components.
    #[must_use]
    pub fn new(
        shared_secret: Option<SecretString>,
        generator: Generator,
        publisher: Arc<dyn SitePublisher>,
        notifier: Notifier,
    ) -> Self {
        Self {
            shared_secret,
            generator,
            publisher,
            notifier,
        }
    }

    /// Run the pipeline for one raw request payload.
    ///
    /// Returns `Ok` for both full success and partial success (published but
    /// the evaluation endpoint never acknowledged); publish failure is the
    /// only `Err` after authentication passes.
    pub async fn deploy(&self, payload: &Value) -> DeployResult<DeployOutcome> {
        let request = parse_request(payload)?;
        if !verify_secret(provided_secret(payload), self.shared_secret.as_ref()) {
            warn!(task = %request.task, "rejecting request with invalid secret");
            return Err(DeployError::Unauthorised);
        }

        let id = DeployId::generate();
        info!(
            deploy_id = %id,
            task = %request.task,
            round = request.round,
            "deployment accepted"
        );
        let accepted = Deployment::accept(id.clone(), request);

        // Generation never fails; at worst the template renders the site.
        let artifact = self.generator.generate(accepted.request()).await;
        let generated = accepted.generated(artifact);

        let site = match self
            .publisher
            .publish(generated.request(), generated.artifact())
            .await
        {
            Ok(site) => site,
            Err(e) => {
                error!(
                    deploy_id = %id,
                    stage = %Stage::Publish,
                    error = %e,
                    "publish failed"
                );
                return Err(e.into());
            }
        };
        info!(
            deploy_id = %id,
            repo_url = %site.repo_url,
            pages_url = %site.pages_url,
            "site published"
        );
        let published = generated.published(site);

        let payload = NotifyPayload::new(published.request(), published.site());
        let outcome = self
            .notifier
            .notify(&published.request().evaluation_url, &payload)
            .await;

        if outcome.success {
            info!(deploy_id = %id, "deployment complete");
            return Ok(DeployOutcome::Deployed {
                site: published.into_site(),
            });
        }

        // The repository is live; losing the webhook must not lose the
        // deployment. Degrade to partial success.
        let error = outcome.error.unwrap_or_else(|| "notification failed".to_owned());
        warn!(
            deploy_id = %id,
            stage = %Stage::Notify,
            error = %error,
            "deployment published but notification failed"
        );
        Ok(DeployOutcome::NotificationFailed {
            site: published.into_site(),
            error,
        })
    }
}
