//! Meridian Control
//!
//! This crate runs the deployment pipeline for generated static web apps.
//! A deployment request carries a natural-language brief; the service turns
//! it into a published site and reports back to the caller's evaluation
//! endpoint.
//!
//! # Pipeline
//!
//! Each request runs four stages in order:
//!
//! - **Validate**: structural validation of the raw JSON payload, then
//!   shared-secret authentication (constant-time, hard-deny when no secret
//!   is configured)
//! - **Generate**: a prioritized chain of chat-completions backends with a
//!   deterministic template fallback; this stage never fails
//! - **Publish**: provision a repository on the forge, push the site from a
//!   transient worktree, enable Pages hosting
//! - **Notify**: POST the completion payload to the evaluation URL with
//!   bounded retries and fixed exponential backoff
//!
//! # State Machine
//!
//! Stage progression is enforced at compile time using the typestate
//! pattern:
//!
//! ```text
//! Accepted ──▶ Generated ──▶ Published
//! ```
//!
//! A publish failure is fatal for the request; a notification failure is
//! not. The repository is an expensive side effect that must not be lost
//! just because a downstream webhook is unreachable, so exhausted
//! notification retries degrade the result to partial success with the
//! site URLs intact.

#![forbid(unsafe_code)]

pub mod api;
pub mod config;
pub mod deployment;
pub mod error;
pub mod generate;
pub mod notify;
pub mod publish;
pub mod state;
pub mod types;
pub mod validate;

// Re-export commonly used types at the crate root
pub use api::{router, AppState};
pub use config::ControlConfig;
pub use deployment::DeploymentManager;
pub use error::{DeployError, DeployResult, Stage};
pub use generate::Generator;
pub use notify::Notifier;
pub use publish::{create_publisher, SitePublisher};
pub use state::{Accepted, Deployment, Generated, PipelineStage, Published};
pub use types::{
    Attachment, DecodedAttachment, DeployId, DeployOutcome, DeployRequest, NotifyOutcome,
    NotifyPayload, PublishedSite, SiteArtifact,
};
