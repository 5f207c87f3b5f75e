//! Application state.

use std::sync::Arc;

use sqlx::PgPool;

use siteship_core::notify::Notifier;
use siteship_db::{
    PgCategoryRepo, PgDeployConfigRepo, PgSshKeyStore, PgStatusRepo, PgSubscriptionRepo,
};
use siteship_deploy::{HttpGithubContents, NoPushTransport, SiteDeployer};
use siteship_publisher::{
    DeploySync, FsSiteSource, PgPublishQueue, PublishService, PublishWorker, SubdomainProvisioner,
};

use crate::config::Settings;
use crate::services::HttpNotifier;

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    pub pool: PgPool,
    pub subscriptions: Arc<PgSubscriptionRepo>,
    pub statuses: Arc<PgStatusRepo>,
    pub configs: Arc<PgDeployConfigRepo>,
    pub queue: Arc<PgPublishQueue>,
    pub deployer: Arc<SiteDeployer>,
    pub source: Arc<FsSiteSource>,
    pub publish: Arc<PublishService>,
}

impl AppState {
    pub fn new(pool: PgPool, settings: &Settings) -> Self {
        let subscriptions = Arc::new(PgSubscriptionRepo::new(pool.clone()));
        let statuses = Arc::new(PgStatusRepo::new(pool.clone()));
        let categories = Arc::new(PgCategoryRepo::new(pool.clone()));
        let configs = Arc::new(PgDeployConfigRepo::new(pool.clone()));
        let keys = Arc::new(PgSshKeyStore::new(pool.clone()));
        let queue = Arc::new(PgPublishQueue::new(pool.clone()));

        let contents = Arc::new(HttpGithubContents::new(settings.github_token.clone()));
        let deployer = Arc::new(SiteDeployer::new(
            keys,
            contents,
            Arc::new(NoPushTransport),
        ));

        let provisioner = Arc::new(SubdomainProvisioner::new(
            subscriptions.clone(),
            categories,
            settings.base_domain.clone(),
        ));
        let notifier: Arc<dyn Notifier> =
            Arc::new(HttpNotifier::new(settings.mail_endpoint.clone()));
        let publish = Arc::new(PublishService::new(
            subscriptions.clone(),
            statuses.clone(),
            queue.clone(),
            provisioner,
            notifier,
        ));

        Self {
            pool,
            subscriptions,
            statuses,
            configs,
            queue,
            deployer,
            source: Arc::new(FsSiteSource::new(settings.site_root.clone())),
            publish,
        }
    }

    /// Build a worker that drains the publish queue.
    pub fn publish_worker(&self, id: impl Into<String>) -> PublishWorker {
        let action = Arc::new(DeploySync::new(
            self.subscriptions.clone(),
            self.configs.clone(),
            self.source.clone(),
            self.deployer.clone(),
        ));
        PublishWorker::new(id, self.queue.clone(), self.statuses.clone(), action)
    }
}
