//! Deployment pipeline orchestration.

mod manager;

pub use manager::DeploymentManager;
