//! Configuration for meridian-control.

use std::net::{IpAddr, Ipv4Addr, SocketAddr};

use figment::providers::{Env, Format, Toml};
use figment::Figment;
use secrecy::SecretString;
use serde::Deserialize;

use crate::error::{DeployError, DeployResult};

/// Top-level configuration for the control service.
#[derive(Debug, Clone, Deserialize, Default)]
pub struct ControlConfig {
    /// HTTP server configuration.
    #[serde(default)]
    pub server: ServerConfig,

    /// Request authentication configuration.
    #[serde(default)]
    pub auth: AuthConfig,

    /// Site generator configuration.
    #[serde(default)]
    pub generator: GeneratorConfig,

    /// Forge (repository host) configuration.
    #[serde(default)]
    pub forge: ForgeConfig,

    /// Completion notifier configuration.
    #[serde(default)]
    pub notifier: NotifierConfig,
}

impl ControlConfig {
    /// Load configuration from the default sources.
    ///
    /// Configuration is loaded in the following order (later sources override earlier):
    /// 1. Default values
    /// 2. `control.toml` in the current directory (if present)
    /// 3. Environment variables with `MERIDIAN_CONTROL_` prefix
    pub fn load() -> DeployResult<Self> {
        Figment::new()
            .merge(Toml::file("control.toml"))
            .merge(Env::prefixed("MERIDIAN_CONTROL_").split("__"))
            .extract()
            .map_err(|e| DeployError::Config(e.to_string()))
    }

    /// Load configuration from a specific TOML file.
    pub fn from_file(path: impl AsRef<std::path::Path>) -> DeployResult<Self> {
        Figment::new()
            .merge(Toml::file(path.as_ref()))
            .merge(Env::prefixed("MERIDIAN_CONTROL_").split("__"))
            .extract()
            .map_err(|e| DeployError::Config(e.to_string()))
    }
}

/// HTTP server configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    /// Socket address to listen on.
    #[serde(default = "default_listen")]
    pub listen: SocketAddr,
}

fn default_listen() -> SocketAddr {
    SocketAddr::new(IpAddr::V4(Ipv4Addr::UNSPECIFIED), 8080)
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            listen: default_listen(),
        }
    }
}

/// Request authentication configuration.
#[derive(Debug, Clone, Deserialize, Default)]
pub struct AuthConfig {
    /// Shared secret required on every deployment request.
    ///
    /// When unset (or empty), all requests are denied; the service never
    /// falls open.
    pub shared_secret: Option<SecretString>,
}

/// Site generator configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct GeneratorConfig {
    /// Generation backends, tried in order; first success wins. When the
    /// list is empty or every backend fails, the deterministic template
    /// renderer produces the site.
    #[serde(default)]
    pub backends: Vec<BackendConfig>,

    /// Per-request timeout for backend calls in seconds.
    #[serde(default = "default_generation_timeout_secs")]
    pub timeout_secs: u64,

    /// Token budget for a backend completion.
    #[serde(default = "default_max_tokens")]
    pub max_tokens: u32,

    /// Sampling temperature for backend completions.
    #[serde(default = "default_temperature")]
    pub temperature: f64,
}

const fn default_generation_timeout_secs() -> u64 {
    120
}

const fn default_max_tokens() -> u32 {
    4096
}

const fn default_temperature() -> f64 {
    0.7
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self {
            backends: Vec::new(),
            timeout_secs: default_generation_timeout_secs(),
            max_tokens: default_max_tokens(),
            temperature: default_temperature(),
        }
    }
}

/// A single chat-completions generation backend.
#[derive(Debug, Clone, Deserialize)]
pub struct BackendConfig {
    /// Human-readable backend name, used in logs.
    pub name: String,

    /// Full URL of the chat-completions endpoint.
    pub api_url: String,

    /// Model identifier sent with each request.
    pub model: String,

    /// Bearer token for the endpoint.
    pub api_key: Option<SecretString>,
}

/// Forge (repository host) configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct ForgeConfig {
    /// Which publisher implementation to use.
    #[serde(default)]
    pub publisher_type: PublisherType,

    /// Base URL of the forge REST API.
    #[serde(default = "default_forge_api_url")]
    pub api_url: String,

    /// Account that owns created repositories.
    pub owner: Option<String>,

    /// API token with repository-creation rights.
    pub token: Option<SecretString>,

    /// Branch that Pages serves from.
    #[serde(default = "default_branch")]
    pub default_branch: String,

    /// Committer name for published commits.
    #[serde(default = "default_committer_name")]
    pub committer_name: String,

    /// Committer email for published commits.
    #[serde(default = "default_committer_email")]
    pub committer_email: String,

    /// Timeout for forge REST calls in seconds.
    #[serde(default = "default_forge_timeout_secs")]
    pub timeout_secs: u64,
}

fn default_forge_api_url() -> String {
    "https://api.github.com".to_owned()
}

fn default_branch() -> String {
    "main".to_owned()
}

fn default_committer_name() -> String {
    "Meridian Deploy Bot".to_owned()
}

fn default_committer_email() -> String {
    "deploy-bot@meridian.invalid".to_owned()
}

const fn default_forge_timeout_secs() -> u64 {
    30
}

impl Default for ForgeConfig {
    fn default() -> Self {
        Self {
            publisher_type: PublisherType::default(),
            api_url: default_forge_api_url(),
            owner: None,
            token: None,
            default_branch: default_branch(),
            committer_name: default_committer_name(),
            committer_email: default_committer_email(),
            timeout_secs: default_forge_timeout_secs(),
        }
    }
}

/// Type of site publisher.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PublisherType {
    /// Real forge publisher (REST API + git push).
    #[default]
    Forge,

    /// Mock publisher for testing.
    Mock,
}

/// Completion notifier configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct NotifierConfig {
    /// Per-attempt timeout in seconds.
    #[serde(default = "default_notify_timeout_secs")]
    pub timeout_secs: u64,
}

const fn default_notify_timeout_secs() -> u64 {
    30
}

impl Default for NotifierConfig {
    fn default() -> Self {
        Self {
            timeout_secs: default_notify_timeout_secs(),
        }
    }
}
