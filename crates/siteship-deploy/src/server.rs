//! Server deployment strategy.
//!
//! Pushing over SSH needs a transport the runtime environment may not
//! have. When none is available the strategy degrades to a diagnostic
//! result that echoes the requested parameters and offers working
//! alternatives, instead of pretending to deploy.

use std::sync::Arc;

use async_trait::async_trait;
use tracing::{info, warn};

use siteship_core::credential::SshKey;
use siteship_core::deploy::{DeployResult, GeneratedFile, ServerParams, TransportAlternatives};
use siteship_core::{Error, Result};

/// One requested server push.
pub struct ServerPush<'a> {
    pub ip: &'a str,
    pub username: &'a str,
    pub port: u16,
    pub deploy_path: &'a str,
    pub key: &'a SshKey,
    pub files: &'a [GeneratedFile],
}

impl ServerPush<'_> {
    fn params(&self) -> ServerParams {
        ServerParams {
            server_ip: self.ip.to_string(),
            username: self.username.to_string(),
            port: self.port,
            deploy_path: self.deploy_path.to_string(),
            file_count: self.files.len(),
        }
    }
}

/// Transport capable of placing files on a remote server.
#[async_trait]
pub trait ServerTransport: Send + Sync {
    /// Name of this transport, for logging and diagnostics.
    fn name(&self) -> &'static str;

    /// Whether this transport can actually push in this environment.
    fn is_available(&self) -> bool;

    async fn push(&self, request: &ServerPush<'_>) -> Result<()>;
}

/// The stock transport: reports unavailable and refuses to push.
///
/// Environments with a real SSH path plug in their own implementation.
pub struct NoPushTransport;

#[async_trait]
impl ServerTransport for NoPushTransport {
    fn name(&self) -> &'static str {
        "none"
    }

    fn is_available(&self) -> bool {
        false
    }

    async fn push(&self, _request: &ServerPush<'_>) -> Result<()> {
        Err(Error::TransportUnsupported)
    }
}

/// Server deployment with diagnostic degradation.
pub struct ServerStrategy {
    transport: Arc<dyn ServerTransport>,
}

impl ServerStrategy {
    pub fn new(transport: Arc<dyn ServerTransport>) -> Self {
        Self { transport }
    }

    pub async fn deploy(&self, push: ServerPush<'_>) -> DeployResult {
        if !self.transport.is_available() {
            warn!(
                transport = self.transport.name(),
                server_ip = push.ip,
                "no push transport available, answering with alternatives"
            );
            return DeployResult {
                alternatives: Some(alternatives(&push)),
                received: Some(push.params()),
                ..DeployResult::failure(
                    "Server deployment is not available from this environment",
                    Error::TransportUnsupported,
                )
            };
        }

        match self.transport.push(&push).await {
            Ok(()) => {
                info!(
                    transport = self.transport.name(),
                    server_ip = push.ip,
                    files = push.files.len(),
                    "server deploy complete"
                );
                DeployResult {
                    deploy_path: Some(push.deploy_path.to_string()),
                    deployed_files: Some(push.files.iter().map(|f| f.name.clone()).collect()),
                    ..DeployResult::success(format!(
                        "Successfully deployed {} files to {}@{}:{}",
                        push.files.len(),
                        push.username,
                        push.ip,
                        push.deploy_path
                    ))
                }
            }
            Err(e) => {
                warn!(
                    transport = self.transport.name(),
                    server_ip = push.ip,
                    error = %e,
                    "server deploy failed"
                );
                DeployResult::failure("Server deployment failed", e)
            }
        }
    }
}

/// Working alternatives for getting files onto a server when this service
/// cannot push them itself.
fn alternatives(push: &ServerPush<'_>) -> TransportAlternatives {
    TransportAlternatives {
        recommended: vec![
            "Switch the deploy configuration to a github target and serve through GitHub Pages"
                .to_string(),
            "Run a CI workflow that pushes over SSH from a runner with key access".to_string(),
            "Upload the generated files manually with scp or sftp".to_string(),
        ],
        workflow_example: format!(
            "name: deploy\non:\n  push:\n    branches: [main]\njobs:\n  deploy:\n    runs-on: ubuntu-latest\n    steps:\n      - uses: actions/checkout@v4\n      - uses: appleboy/scp-action@v0.1.7\n        with:\n          host: {}\n          username: {}\n          port: {}\n          key: ${{{{ secrets.DEPLOY_KEY }}}}\n          source: \"./*\"\n          target: {}\n",
            push.ip, push.username, push.port, push.deploy_path
        ),
        manual_steps: vec![
            "Download the generated site files".to_string(),
            format!(
                "scp -P {} -r ./site/* {}@{}:{}",
                push.port, push.username, push.ip, push.deploy_path
            ),
            format!("Verify the files are readable by the web server under {}", push.deploy_path),
        ],
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use siteship_core::ResourceId;

    struct AlwaysPush;

    #[async_trait]
    impl ServerTransport for AlwaysPush {
        fn name(&self) -> &'static str {
            "test"
        }

        fn is_available(&self) -> bool {
            true
        }

        async fn push(&self, _request: &ServerPush<'_>) -> Result<()> {
            Ok(())
        }
    }

    struct FailingPush;

    #[async_trait]
    impl ServerTransport for FailingPush {
        fn name(&self) -> &'static str {
            "test"
        }

        fn is_available(&self) -> bool {
            true
        }

        async fn push(&self, _request: &ServerPush<'_>) -> Result<()> {
            Err(Error::Upstream("connection reset".to_string()))
        }
    }

    fn key() -> SshKey {
        SshKey {
            id: ResourceId::new(),
            name: "deploy".to_string(),
            public_key: "ssh-ed25519 AAAA".to_string(),
            private_key: "secret".to_string(),
        }
    }

    fn sample_files() -> Vec<GeneratedFile> {
        vec![
            GeneratedFile::new("index.html", "<html></html>"),
            GeneratedFile::new("style.css", "body {}"),
        ]
    }

    #[tokio::test]
    async fn test_unavailable_transport_answers_with_alternatives() {
        let strategy = ServerStrategy::new(Arc::new(NoPushTransport));
        let key = key();
        let files = sample_files();
        let result = strategy
            .deploy(ServerPush {
                ip: "203.0.113.9",
                username: "deploy",
                port: 2222,
                deploy_path: "/srv/site",
                key: &key,
                files: &files,
            })
            .await;

        assert!(!result.success);
        assert_eq!(
            result.error.as_deref(),
            Some("transport unsupported in this environment")
        );

        let alternatives = result.alternatives.unwrap();
        assert!(!alternatives.recommended.is_empty());
        assert!(alternatives.workflow_example.contains("203.0.113.9"));
        assert!(alternatives.manual_steps.iter().any(|s| s.contains("scp -P 2222")));

        let received = result.received.unwrap();
        assert_eq!(received.server_ip, "203.0.113.9");
        assert_eq!(received.port, 2222);
        assert_eq!(received.file_count, 2);
    }

    #[tokio::test]
    async fn test_available_transport_deploys() {
        let strategy = ServerStrategy::new(Arc::new(AlwaysPush));
        let key = key();
        let files = sample_files();
        let result = strategy
            .deploy(ServerPush {
                ip: "203.0.113.9",
                username: "deploy",
                port: 22,
                deploy_path: "/var/www/html",
                key: &key,
                files: &files,
            })
            .await;

        assert!(result.success);
        assert_eq!(result.deploy_path.as_deref(), Some("/var/www/html"));
        assert_eq!(
            result.message,
            "Successfully deployed 2 files to deploy@203.0.113.9:/var/www/html"
        );
        assert!(result.alternatives.is_none());
    }

    #[tokio::test]
    async fn test_push_failure_is_normalized() {
        let strategy = ServerStrategy::new(Arc::new(FailingPush));
        let key = key();
        let files = sample_files();
        let result = strategy
            .deploy(ServerPush {
                ip: "203.0.113.9",
                username: "deploy",
                port: 22,
                deploy_path: "/var/www/html",
                key: &key,
                files: &files,
            })
            .await;

        assert!(!result.success);
        assert_eq!(result.message, "Server deployment failed");
        assert!(result.error.unwrap().contains("connection reset"));
    }
}
