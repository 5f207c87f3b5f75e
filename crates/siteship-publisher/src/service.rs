//! Publish workflow entry point.

use std::sync::Arc;

use serde::Serialize;
use tracing::{info, warn};

use siteship_core::notify::{Notification, Notifier};
use siteship_core::{ResourceId, Result};
use siteship_db::{StatusRepo, SubscriptionRepo};

use crate::provisioner::SubdomainProvisioner;
use crate::queue::PublishQueue;

/// Estimated readiness window quoted to customers.
const READY_WINDOW: &str = "approximately 5 minutes";

/// Answer to a publish request. The slow work is still running when the
/// caller sees this.
#[derive(Debug, Clone, Serialize)]
pub struct PublishReceipt {
    pub subscription_id: ResourceId,
    pub subdomain: String,
    pub full_domain: String,
    pub status_id: ResourceId,
    pub message: String,
}

pub struct PublishService {
    subscriptions: Arc<dyn SubscriptionRepo>,
    statuses: Arc<dyn StatusRepo>,
    queue: Arc<dyn PublishQueue>,
    provisioner: Arc<SubdomainProvisioner>,
    notifier: Arc<dyn Notifier>,
}

impl PublishService {
    pub fn new(
        subscriptions: Arc<dyn SubscriptionRepo>,
        statuses: Arc<dyn StatusRepo>,
        queue: Arc<dyn PublishQueue>,
        provisioner: Arc<SubdomainProvisioner>,
        notifier: Arc<dyn Notifier>,
    ) -> Self {
        Self {
            subscriptions,
            statuses,
            queue,
            provisioner,
            notifier,
        }
    }

    /// Provision a subdomain and schedule the publish.
    ///
    /// The status row is written before the job is enqueued, so a caller
    /// polling right after this returns always observes at least
    /// `preparing`, never "not found". Notification delivery is
    /// best-effort and cannot fail the publish.
    pub async fn publish(&self, subscription_id: ResourceId) -> Result<PublishReceipt> {
        let subscription = self.subscriptions.get_by_id(subscription_id).await?;
        let provisioned = self.provisioner.provision(&subscription).await?;

        let status = self
            .statuses
            .create(subscription_id, &provisioned.subdomain)
            .await?;
        let status_id = ResourceId::from_uuid(status.id);

        let job = self
            .queue
            .enqueue(subscription_id, status_id, &provisioned.subdomain)
            .await?;
        info!(
            subscription_id = %subscription_id,
            subdomain = %provisioned.subdomain,
            job_id = %job.id,
            "Publish scheduled"
        );

        let notification = Notification {
            to: subscription.customer_email.clone(),
            subject: format!("Your site {} is being prepared", provisioned.full_domain),
            message: format!(
                "Hi {}, your site is being prepared and will be available at https://{} within {}.",
                subscription.customer_name, provisioned.full_domain, READY_WINDOW
            ),
            customer_name: subscription.customer_name.clone(),
        };
        if let Err(e) = self.notifier.send(&notification).await {
            warn!(subscription_id = %subscription_id, error = %e, "Notification failed");
        }

        Ok(PublishReceipt {
            subscription_id,
            subdomain: provisioned.subdomain,
            full_domain: provisioned.full_domain.clone(),
            status_id,
            message: format!(
                "Site will be available at https://{} within {}",
                provisioned.full_domain, READY_WINDOW
            ),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use async_trait::async_trait;
    use chrono::Utc;
    use tokio::sync::Mutex;

    use siteship_core::Error;
    use siteship_db::{
        MemoryCategoryRepo, MemoryStatusRepo, MemorySubscriptionRepo, Subscription,
    };

    use crate::queue::MemoryPublishQueue;

    #[derive(Default)]
    struct RecordingNotifier {
        sent: Mutex<Vec<Notification>>,
    }

    #[async_trait]
    impl Notifier for RecordingNotifier {
        async fn send(&self, notification: &Notification) -> Result<()> {
            self.sent.lock().await.push(notification.clone());
            Ok(())
        }
    }

    struct FailingNotifier;

    #[async_trait]
    impl Notifier for FailingNotifier {
        async fn send(&self, _notification: &Notification) -> Result<()> {
            Err(Error::Upstream("smtp relay down".to_string()))
        }
    }

    struct Fixture {
        subscriptions: Arc<MemorySubscriptionRepo>,
        statuses: Arc<MemoryStatusRepo>,
        queue: Arc<MemoryPublishQueue>,
        categories: Arc<MemoryCategoryRepo>,
    }

    impl Fixture {
        fn new() -> Self {
            Self {
                subscriptions: Arc::new(MemorySubscriptionRepo::new()),
                statuses: Arc::new(MemoryStatusRepo::new()),
                queue: Arc::new(MemoryPublishQueue::new()),
                categories: Arc::new(MemoryCategoryRepo::new()),
            }
        }

        fn service(&self, notifier: Arc<dyn Notifier>) -> PublishService {
            let provisioner = Arc::new(SubdomainProvisioner::new(
                self.subscriptions.clone(),
                self.categories.clone(),
                "appsku.my.id",
            ));
            PublishService::new(
                self.subscriptions.clone(),
                self.statuses.clone(),
                self.queue.clone(),
                provisioner,
                notifier,
            )
        }

        async fn subscription(&self) -> ResourceId {
            let now = Utc::now();
            let subscription = Subscription {
                id: uuid::Uuid::now_v7(),
                customer_name: "Ada".to_string(),
                customer_email: "ada@example.com".to_string(),
                product_name: "Shop Starter".to_string(),
                category: "shop".to_string(),
                subdomain: None,
                deploy_config_id: None,
                created_at: now,
                updated_at: now,
            };
            let id = ResourceId::from_uuid(subscription.id);
            self.subscriptions.insert(subscription).await;
            id
        }
    }

    #[tokio::test]
    async fn test_publish_provisions_and_schedules() {
        let fixture = Fixture::new();
        let notifier = Arc::new(RecordingNotifier::default());
        let service = fixture.service(notifier.clone());
        let subscription_id = fixture.subscription().await;

        let receipt = service.publish(subscription_id).await.unwrap();

        assert_eq!(receipt.subscription_id, subscription_id);
        assert_eq!(receipt.subdomain.len(), 7);
        assert_eq!(
            receipt.full_domain,
            format!("{}.appsku.my.id", receipt.subdomain)
        );
        assert!(receipt.message.contains(&receipt.full_domain));

        // Status row exists in preparing before anyone polls.
        let status = fixture.statuses.get(receipt.status_id).await.unwrap();
        assert_eq!(status.status, "preparing");
        assert_eq!(status.subdomain, receipt.subdomain);

        // Exactly one pending job for the worker.
        let job = fixture.queue.claim("w-test").await.unwrap().unwrap();
        assert_eq!(job.status_id, *receipt.status_id.as_uuid());
        assert_eq!(job.subdomain, receipt.subdomain);

        let sent = notifier.sent.lock().await;
        assert_eq!(sent.len(), 1);
        assert_eq!(sent[0].to, "ada@example.com");
        assert!(sent[0].message.contains(&receipt.full_domain));
    }

    #[tokio::test]
    async fn test_notification_failure_does_not_fail_publish() {
        let fixture = Fixture::new();
        let service = fixture.service(Arc::new(FailingNotifier));
        let subscription_id = fixture.subscription().await;

        let receipt = service.publish(subscription_id).await.unwrap();
        let status = fixture.statuses.get(receipt.status_id).await.unwrap();
        assert_eq!(status.status, "preparing");
    }

    #[tokio::test]
    async fn test_unknown_subscription_fails() {
        let fixture = Fixture::new();
        let service = fixture.service(Arc::new(RecordingNotifier::default()));

        let err = service.publish(ResourceId::new()).await.unwrap_err();
        assert!(matches!(err, Error::NotFound(_)));
    }
}
