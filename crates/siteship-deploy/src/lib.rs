//! Deployment strategies for Siteship publishing.
//!
//! Takes a tenant's deploy configuration plus generated site files and
//! pushes them to the configured destination. Every entry point answers
//! with a [`siteship_core::deploy::DeployResult`]; lower-layer errors are
//! normalized before they reach a caller.

pub mod github;
pub mod orchestrator;
pub mod resolver;
pub mod server;

pub use github::{GithubContents, GithubStrategy, HttpGithubContents, PutFile};
pub use orchestrator::SiteDeployer;
pub use resolver::{ResolvedTarget, resolve};
pub use server::{NoPushTransport, ServerPush, ServerStrategy, ServerTransport};
