//! Background synchronization of a published site.

use std::sync::Arc;

use async_trait::async_trait;
use tracing::info;

use siteship_core::deploy::SiteSource;
use siteship_core::{Error, ResourceId, Result};
use siteship_db::{DeployConfigRepo, SubscriptionRepo};
use siteship_deploy::SiteDeployer;

use crate::queue::PublishJob;

/// The long-running half of a publish attempt.
#[async_trait]
pub trait SyncAction: Send + Sync {
    async fn run(&self, job: &PublishJob) -> Result<()>;
}

/// Deploys the subscription's generated site.
///
/// A subscription without a deploy configuration is record-only: its
/// subdomain is live once provisioned and there is nothing to push.
pub struct DeploySync {
    subscriptions: Arc<dyn SubscriptionRepo>,
    configs: Arc<dyn DeployConfigRepo>,
    source: Arc<dyn SiteSource>,
    deployer: Arc<SiteDeployer>,
}

impl DeploySync {
    pub fn new(
        subscriptions: Arc<dyn SubscriptionRepo>,
        configs: Arc<dyn DeployConfigRepo>,
        source: Arc<dyn SiteSource>,
        deployer: Arc<SiteDeployer>,
    ) -> Self {
        Self {
            subscriptions,
            configs,
            source,
            deployer,
        }
    }
}

#[async_trait]
impl SyncAction for DeploySync {
    async fn run(&self, job: &PublishJob) -> Result<()> {
        let subscription_id = ResourceId::from_uuid(job.subscription_id);
        let subscription = self.subscriptions.get_by_id(subscription_id).await?;

        let Some(config_id) = subscription.deploy_config_id else {
            info!(
                subscription_id = %subscription_id,
                "no deploy configuration, record-only publish"
            );
            return Ok(());
        };

        let config = self.configs.get(ResourceId::from_uuid(config_id)).await?;
        let files = self.source.generated_files(subscription_id).await?;
        let result = self.deployer.deploy(&config, &files).await;

        if !result.success {
            let cause = result
                .error
                .clone()
                .unwrap_or_else(|| result.message.clone());
            return Err(Error::Upstream(cause));
        }

        info!(
            subscription_id = %subscription_id,
            files = result.deployed_files.as_ref().map_or(0, Vec::len),
            "site deployed"
        );
        Ok(())
    }
}
