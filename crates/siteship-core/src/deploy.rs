//! Deploy configuration, artifacts and result types.
//!
//! A tenant's deploy configuration describes where generated site files are
//! pushed (a GitHub repository or a remote server). The orchestrator in
//! `siteship-deploy` consumes these types and always answers with a
//! [`DeployResult`], never a raw lower-layer error.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::{ResourceId, Result};

/// Deployment target kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DeployTarget {
    Github,
    Server,
}

impl std::fmt::Display for DeployTarget {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DeployTarget::Github => write!(f, "github"),
            DeployTarget::Server => write!(f, "server"),
        }
    }
}

impl std::str::FromStr for DeployTarget {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "github" => Ok(DeployTarget::Github),
            "server" => Ok(DeployTarget::Server),
            _ => Err(format!("unknown deployment target: {}", s)),
        }
    }
}

impl DeployTarget {
    /// Human-readable label used in result messages.
    pub fn label(&self) -> &'static str {
        match self {
            DeployTarget::Github => "GitHub",
            DeployTarget::Server => "Server",
        }
    }
}

/// A tenant-owned deployment target configuration.
///
/// Owned by tenant configuration management; this core only ever reads it.
/// The `target` field is kept as the stored string so that unknown values
/// surface as a validation failure instead of being rejected at the wire.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DeployConfig {
    pub id: ResourceId,
    pub name: String,
    #[serde(rename = "type")]
    pub target: String,
    #[serde(default)]
    pub github_repo: Option<String>,
    #[serde(default)]
    pub server_ip: Option<String>,
    #[serde(default)]
    pub server_username: Option<String>,
    #[serde(default)]
    pub server_port: Option<u16>,
    #[serde(default)]
    pub deploy_path: Option<String>,
    #[serde(default)]
    pub ssh_key_id: Option<ResourceId>,
}

/// One generated site artifact to publish.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GeneratedFile {
    pub name: String,
    pub content: String,
}

impl GeneratedFile {
    pub fn new(name: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            content: content.into(),
        }
    }
}

/// Alternatives offered when no push transport is available.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TransportAlternatives {
    /// Recommended deployment approaches, most preferred first.
    pub recommended: Vec<String>,
    /// Example CI workflow snippet the operator can adopt.
    pub workflow_example: String,
    /// Manual steps to get the files onto the server.
    pub manual_steps: Vec<String>,
}

/// Echo of the parameters a server deploy was asked to use, for operator
/// debugging when the transport is unavailable.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerParams {
    pub server_ip: String,
    pub username: String,
    pub port: u16,
    pub deploy_path: String,
    pub file_count: usize,
}

/// Outcome of one deploy orchestration attempt.
///
/// Exactly one of the success-path fields or `error` is populated. A partial
/// GitHub push reports `success: false` together with the exact
/// `deployed_files` that did land.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DeployResult {
    pub success: bool,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pages_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub deploy_path: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub deployed_files: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub commit_sha: Option<String>,
    pub timestamp: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub alternatives: Option<TransportAlternatives>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub received: Option<ServerParams>,
}

impl DeployResult {
    /// A bare success result; callers fill in target-specific fields with
    /// struct update syntax.
    pub fn success(message: impl Into<String>) -> Self {
        Self {
            success: true,
            message: message.into(),
            url: None,
            pages_url: None,
            deploy_path: None,
            deployed_files: None,
            commit_sha: None,
            timestamp: Utc::now(),
            error: None,
            alternatives: None,
            received: None,
        }
    }

    /// A failure result in the orchestrator's normalized shape: a short
    /// human-readable message plus the underlying cause.
    pub fn failure(message: impl Into<String>, error: impl std::fmt::Display) -> Self {
        Self {
            success: false,
            message: message.into(),
            url: None,
            pages_url: None,
            deploy_path: None,
            deployed_files: None,
            commit_sha: None,
            timestamp: Utc::now(),
            error: Some(error.to_string()),
            alternatives: None,
            received: None,
        }
    }

    /// Attach the list of files that did land before the failure.
    pub fn with_deployed_files(mut self, files: Vec<String>) -> Self {
        self.deployed_files = Some(files);
        self
    }
}

/// Source of a subscription's generated site artifacts.
///
/// The site generator (an external collaborator) writes artifacts; the
/// background sync reads them back through this seam.
#[async_trait]
pub trait SiteSource: Send + Sync {
    /// Load the generated files for a subscription, in stable order.
    async fn generated_files(&self, subscription_id: ResourceId) -> Result<Vec<GeneratedFile>>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_target_round_trip() {
        assert_eq!("github".parse::<DeployTarget>(), Ok(DeployTarget::Github));
        assert_eq!("Server".parse::<DeployTarget>(), Ok(DeployTarget::Server));
        assert!("ftp".parse::<DeployTarget>().is_err());
        assert_eq!(DeployTarget::Github.to_string(), "github");
    }

    #[test]
    fn test_failure_shape() {
        let result = DeployResult::failure("GitHub deployment failed", "boom");
        assert!(!result.success);
        assert_eq!(result.message, "GitHub deployment failed");
        assert_eq!(result.error.as_deref(), Some("boom"));
        assert!(result.deployed_files.is_none());
    }

    #[test]
    fn test_config_wire_type_field() {
        let json = r#"{
            "id": "0192d7a0-0000-7000-8000-000000000001",
            "name": "prod",
            "type": "github",
            "github_repo": "acme/site"
        }"#;
        let config: DeployConfig = serde_json::from_str(json).unwrap();
        assert_eq!(config.target, "github");
        assert_eq!(config.github_repo.as_deref(), Some("acme/site"));
        assert!(config.ssh_key_id.is_none());
    }
}
