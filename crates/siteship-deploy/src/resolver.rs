//! Deploy configuration resolution.
//!
//! Validates a stored [`DeployConfig`] and fills in defaults, producing a
//! [`ResolvedTarget`] the strategies can act on without re-checking fields.

use siteship_core::deploy::{DeployConfig, DeployTarget};
use siteship_core::{Error, Result};

pub const DEFAULT_SSH_PORT: u16 = 22;
pub const DEFAULT_DEPLOY_PATH: &str = "/var/www/html";

/// A validated deployment target with all defaults applied.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResolvedTarget {
    Github {
        repo: String,
    },
    Server {
        ip: String,
        username: String,
        port: u16,
        deploy_path: String,
    },
}

impl ResolvedTarget {
    pub fn target(&self) -> DeployTarget {
        match self {
            ResolvedTarget::Github { .. } => DeployTarget::Github,
            ResolvedTarget::Server { .. } => DeployTarget::Server,
        }
    }
}

fn required(value: Option<&str>, missing: &str) -> Result<String> {
    value
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_string)
        .ok_or_else(|| Error::ConfigInvalid(missing.to_string()))
}

/// Resolve a stored deploy configuration into an actionable target.
///
/// Resolution is pure: the same configuration always resolves to the same
/// target. Unknown target strings and missing required fields surface as
/// [`Error::ConfigInvalid`] before any strategy runs.
pub fn resolve(config: &DeployConfig) -> Result<ResolvedTarget> {
    let target: DeployTarget = config
        .target
        .parse()
        .map_err(|_| Error::ConfigInvalid(format!("invalid deployment type: {}", config.target)))?;

    match target {
        DeployTarget::Github => {
            let repo = required(config.github_repo.as_deref(), "github repository not specified")?;
            Ok(ResolvedTarget::Github { repo })
        }
        DeployTarget::Server => {
            let ip = required(config.server_ip.as_deref(), "server ip not specified")?;
            let username = required(
                config.server_username.as_deref(),
                "server username not specified",
            )?;
            let deploy_path = config
                .deploy_path
                .as_deref()
                .map(str::trim)
                .filter(|p| !p.is_empty())
                .unwrap_or(DEFAULT_DEPLOY_PATH)
                .to_string();
            Ok(ResolvedTarget::Server {
                ip,
                username,
                port: config.server_port.unwrap_or(DEFAULT_SSH_PORT),
                deploy_path,
            })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use siteship_core::ResourceId;

    fn config(target: &str) -> DeployConfig {
        DeployConfig {
            id: ResourceId::new(),
            name: "prod".to_string(),
            target: target.to_string(),
            github_repo: None,
            server_ip: None,
            server_username: None,
            server_port: None,
            deploy_path: None,
            ssh_key_id: Some(ResourceId::new()),
        }
    }

    #[test]
    fn test_resolve_github() {
        let mut cfg = config("github");
        cfg.github_repo = Some("acme/site".to_string());
        assert_eq!(
            resolve(&cfg).unwrap(),
            ResolvedTarget::Github {
                repo: "acme/site".to_string()
            }
        );
    }

    #[test]
    fn test_resolve_github_missing_repo() {
        let err = resolve(&config("github")).unwrap_err();
        assert!(matches!(err, Error::ConfigInvalid(_)));
        assert_eq!(
            err.to_string(),
            "invalid deploy configuration: github repository not specified"
        );
    }

    #[test]
    fn test_resolve_github_blank_repo() {
        let mut cfg = config("github");
        cfg.github_repo = Some("   ".to_string());
        assert!(resolve(&cfg).is_err());
    }

    #[test]
    fn test_resolve_unknown_type() {
        let err = resolve(&config("ftp")).unwrap_err();
        assert_eq!(
            err.to_string(),
            "invalid deploy configuration: invalid deployment type: ftp"
        );
    }

    #[test]
    fn test_resolve_server_defaults() {
        let mut cfg = config("server");
        cfg.server_ip = Some("203.0.113.9".to_string());
        cfg.server_username = Some("deploy".to_string());
        assert_eq!(
            resolve(&cfg).unwrap(),
            ResolvedTarget::Server {
                ip: "203.0.113.9".to_string(),
                username: "deploy".to_string(),
                port: 22,
                deploy_path: "/var/www/html".to_string(),
            }
        );
    }

    #[test]
    fn test_resolve_server_explicit_fields() {
        let mut cfg = config("server");
        cfg.server_ip = Some("203.0.113.9".to_string());
        cfg.server_username = Some("deploy".to_string());
        cfg.server_port = Some(2222);
        cfg.deploy_path = Some("/srv/site".to_string());
        match resolve(&cfg).unwrap() {
            ResolvedTarget::Server {
                port, deploy_path, ..
            } => {
                assert_eq!(port, 2222);
                assert_eq!(deploy_path, "/srv/site");
            }
            other => panic!("unexpected target: {:?}", other),
        }
    }

    #[test]
    fn test_resolve_server_missing_ip() {
        let mut cfg = config("server");
        cfg.server_username = Some("deploy".to_string());
        let err = resolve(&cfg).unwrap_err();
        assert_eq!(
            err.to_string(),
            "invalid deploy configuration: server ip not specified"
        );
    }

    #[test]
    fn test_resolve_is_stable() {
        let mut cfg = config("github");
        cfg.github_repo = Some("acme/site".to_string());
        assert_eq!(resolve(&cfg).unwrap(), resolve(&cfg).unwrap());
    }
}
