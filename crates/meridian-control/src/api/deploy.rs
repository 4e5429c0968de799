//! Deployment endpoint.

use axum::{extract::State, http::StatusCode, Json};
use serde::Serialize;
use serde_json::Value;
use tracing::error;

use crate::error::DeployError;
use crate::types::DeployOutcome;

use super::AppState;

/// Terminal response for a published deployment, full or partial.
#[derive(Debug, Serialize)]
pub struct DeployResponse {
    /// `"success"` or `"partial_success"`.
    pub status: &'static str,
    /// Human-readable summary.
    pub message: String,
    /// Repository URL of the published site.
    pub repo_url: String,
    /// Public hosting URL.
    pub pages_url: String,
    /// Commit SHA of the published tree.
    pub commit_sha: String,
    /// Notification failure, present only for partial success.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// Error response.
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    /// Error message.
    pub error: String,
}

/// Map a pipeline error to its HTTP status.
pub fn error_to_status(error: &DeployError) -> StatusCode {
    match error {
        DeployError::Validation(_) => StatusCode::BAD_REQUEST,
        DeployError::Unauthorised => StatusCode::FORBIDDEN,
        DeployError::Config(_) | DeployError::Publish(_) | DeployError::Internal(_) => {
            StatusCode::INTERNAL_SERVER_ERROR
        }
    }
}

/// Run the deployment pipeline for one request.
///
/// Both full and partial success answer 200 with an explicit `status`
/// field; partial success means the site is live but the evaluation
/// endpoint never acknowledged the notification.
pub async fn deploy(
    State(state): State<AppState>,
    Json(payload): Json<Value>,
) -> Result<Json<DeployResponse>, (StatusCode, Json<ErrorResponse>)> {
    match state.manager.deploy(&payload).await {
        Ok(DeployOutcome::Deployed { site }) => Ok(Json(DeployResponse {
            status: "success",
            message: "Application deployed and evaluation notified".to_owned(),
            repo_url: site.repo_url,
            pages_url: site.pages_url,
            commit_sha: site.commit_sha,
            error: None,
        })),
        Ok(DeployOutcome::NotificationFailed { site, error }) => Ok(Json(DeployResponse {
            status: "partial_success",
            message: "Application deployed but evaluation notification failed".to_owned(),
            repo_url: site.repo_url,
            pages_url: site.pages_url,
            commit_sha: site.commit_sha,
            error: Some(error),
        })),
        Err(e) => {
            if error_to_status(&e) == StatusCode::INTERNAL_SERVER_ERROR {
                error!(error = %e, "deployment failed");
            }
            Err((
                error_to_status(&e),
                Json(ErrorResponse {
                    error: e.to_string(),
                }),
            ))
        }
    }
}
