//! Error types for Siteship.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error("not found: {0}")]
    NotFound(String),

    #[error("invalid deploy configuration: {0}")]
    ConfigInvalid(String),

    #[error("credential not found: {0}")]
    CredentialNotFound(String),

    #[error("no files to deploy")]
    NoFiles,

    #[error("transport unsupported in this environment")]
    TransportUnsupported,

    #[error("partial deploy: {deployed} of {total} files uploaded, failed at {file}: {cause}")]
    PartialDeploy {
        deployed: usize,
        total: usize,
        file: String,
        cause: String,
    },

    #[error("subdomain space exhausted after {0} attempts")]
    SubdomainExhausted(u32),

    #[error("invalid status transition: {from} -> {to}")]
    InvalidTransition { from: String, to: String },

    #[error("upstream error: {0}")]
    Upstream(String),

    #[error("internal error: {0}")]
    Internal(String),
}

pub type Result<T> = std::result::Result<T, Error>;
