//! Deploy orchestration.
//!
//! Validates up front, loads credentials, resolves the target, then hands
//! off to the matching strategy. Callers always get a [`DeployResult`];
//! nothing below this layer leaks a raw error out of `deploy`.

use std::sync::Arc;

use tracing::{info, warn};

use siteship_core::credential::CredentialStore;
use siteship_core::deploy::{DeployConfig, DeployResult, DeployTarget, GeneratedFile};
use siteship_core::{Error, Result};

use crate::github::{GithubContents, GithubStrategy};
use crate::resolver::{self, ResolvedTarget};
use crate::server::{ServerPush, ServerStrategy, ServerTransport};

/// Entry point for deploying generated site files.
pub struct SiteDeployer {
    credentials: Arc<dyn CredentialStore>,
    github: GithubStrategy,
    server: ServerStrategy,
}

impl SiteDeployer {
    pub fn new(
        credentials: Arc<dyn CredentialStore>,
        contents: Arc<dyn GithubContents>,
        transport: Arc<dyn ServerTransport>,
    ) -> Self {
        Self {
            credentials,
            github: GithubStrategy::new(contents),
            server: ServerStrategy::new(transport),
        }
    }

    /// Deploy `files` according to `config`.
    ///
    /// Pre-flight checks run in a fixed order: empty input, credentials,
    /// target resolution. A failure at any point is normalized into a
    /// failure result; no strategy runs after a failed check.
    pub async fn deploy(&self, config: &DeployConfig, files: &[GeneratedFile]) -> DeployResult {
        match self.try_deploy(config, files).await {
            Ok(result) => result,
            Err(e) => {
                warn!(config_id = %config.id, error = %e, "deploy rejected");
                let message = match config.target.parse::<DeployTarget>() {
                    Ok(target) => format!("{} deployment failed", target.label()),
                    Err(_) => "Deployment failed".to_string(),
                };
                DeployResult::failure(message, e)
            }
        }
    }

    async fn try_deploy(
        &self,
        config: &DeployConfig,
        files: &[GeneratedFile],
    ) -> Result<DeployResult> {
        if files.is_empty() {
            return Err(Error::NoFiles);
        }

        // Credentials load before target resolution so a misconfigured key
        // fails the same way for every target type.
        let key_id = config.ssh_key_id.ok_or_else(|| {
            Error::CredentialNotFound(format!("deploy config {} has no ssh key", config.id))
        })?;
        let key = self.credentials.get(key_id).await?;

        let target = resolver::resolve(config)?;
        info!(
            config_id = %config.id,
            target = %target.target(),
            files = files.len(),
            "deploying"
        );

        let result = match target {
            ResolvedTarget::Github { repo } => self.github.deploy(&repo, files).await,
            ResolvedTarget::Server {
                ip,
                username,
                port,
                deploy_path,
            } => {
                self.server
                    .deploy(ServerPush {
                        ip: &ip,
                        username: &username,
                        port,
                        deploy_path: &deploy_path,
                        key: &key,
                        files,
                    })
                    .await
            }
        };
        Ok(result)
    }
}
