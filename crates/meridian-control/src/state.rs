//! Typestate pattern for the deployment pipeline.
//!
//! Pipeline progression is encoded in the type system: a deployment can only
//! be published after it has been generated, and only an accepted (validated
//! and authenticated) request enters the pipeline at all. Each stage carries
//! exactly the data produced so far, so there are no partially-filled
//! options to check at runtime.
//!
//! ```text
//! Accepted ──▶ Generated ──▶ Published
//! ```
//!
//! Failure is not a state here; a failed stage surfaces as a
//! [`crate::error::DeployError`] and the deployment value is dropped.

use crate::types::{DeployId, DeployRequest, PublishedSite, SiteArtifact};

/// Marker trait for pipeline stages.
///
/// Stages carry the data their stage has produced, so they are not
/// zero-sized like classic typestate markers.
pub trait PipelineStage: private::Sealed + Send + Sync {
    /// Stage name for logs.
    fn name(&self) -> &'static str;
}

mod private {
    pub trait Sealed {}
}

/// Request validated and authenticated; nothing produced yet.
#[derive(Debug)]
pub struct Accepted;

/// Site artifact generated, not yet published.
#[derive(Debug)]
pub struct Generated {
    artifact: SiteArtifact,
}

/// Site pushed to the forge and live.
#[derive(Debug)]
pub struct Published {
    artifact: SiteArtifact,
    site: PublishedSite,
}

impl private::Sealed for Accepted {}
impl private::Sealed for Generated {}
impl private::Sealed for Published {}

impl PipelineStage for Accepted {
    fn name(&self) -> &'static str {
        "accepted"
    }
}

impl PipelineStage for Generated {
    fn name(&self) -> &'static str {
        "generated"
    }
}

impl PipelineStage for Published {
    fn name(&self) -> &'static str {
        "published"
    }
}

/// A deployment at a specific pipeline stage.
///
/// The stage parameter `S` determines which transitions and accessors are
/// available; skipping a stage is a compile-time error.
#[derive(Debug)]
pub struct Deployment<S: PipelineStage> {
    id: DeployId,
    request: DeployRequest,
    stage: S,
}

impl<S: PipelineStage> Deployment<S> {
    /// The deployment's correlation ID.
    #[must_use]
    pub const fn id(&self) -> &DeployId {
        &self.id
    }

    /// The accepted request.
    #[must_use]
    pub const fn request(&self) -> &DeployRequest {
        &self.request
    }

    /// Stage name for logs.
    #[must_use]
    pub fn stage_name(&self) -> &'static str {
        self.stage.name()
    }
}

impl Deployment<Accepted> {
    /// Enter the pipeline with a validated, authenticated request.
    #[must_use]
    pub const fn accept(id: DeployId, request: DeployRequest) -> Self {
        Self {
            id,
            request,
            stage: Accepted,
        }
    }

    /// Attach the generated artifact.
    #[must_use]
    pub fn generated(self, artifact: SiteArtifact) -> Deployment<Generated> {
        Deployment {
            id: self.id,
            request: self.request,
            stage: Generated { artifact },
        }
    }
}

impl Deployment<Generated> {
    /// The generated artifact.
    #[must_use]
    pub const fn artifact(&self) -> &SiteArtifact {
        &self.stage.artifact
    }

    /// Attach the published site.
    #[must_use]
    pub fn published(self, site: PublishedSite) -> Deployment<Published> {
        Deployment {
            id: self.id,
            request: self.request,
            stage: Published {
                artifact: self.stage.artifact,
                site,
            },
        }
    }
}

impl Deployment<Published> {
    /// The artifact that was published.
    #[must_use]
    pub const fn artifact(&self) -> &SiteArtifact {
        &self.stage.artifact
    }

    /// Where the site lives.
    #[must_use]
    pub const fn site(&self) -> &PublishedSite {
        &self.stage.site
    }

    /// Consume the deployment, keeping only the published site.
    #[must_use]
    pub fn into_site(self) -> PublishedSite {
        self.stage.site
    }
}
