//! Subdomain provisioning.
//!
//! Allocates a random subdomain and binds it to the subscription. The
//! uniqueness space is shared across all tenants; binding goes through the
//! store's atomic claim so two concurrent provisions can never end up
//! holding the same name.

use std::sync::Arc;

use rand::Rng;
use tracing::{debug, warn};

use siteship_core::{Error, ResourceId, Result};
use siteship_db::{CategoryRepo, Subscription, SubscriptionRepo};

pub const SUBDOMAIN_LENGTH: usize = 7;
pub const MAX_CLAIM_ATTEMPTS: u32 = 10;

const SUBDOMAIN_CHARSET: &[u8] = b"abcdefghijklmnopqrstuvwxyz0123456789";

/// An allocated subdomain together with the site's public domain.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Provisioned {
    pub subdomain: String,
    pub full_domain: String,
}

pub struct SubdomainProvisioner {
    subscriptions: Arc<dyn SubscriptionRepo>,
    categories: Arc<dyn CategoryRepo>,
    base_domain: String,
}

impl SubdomainProvisioner {
    pub fn new(
        subscriptions: Arc<dyn SubscriptionRepo>,
        categories: Arc<dyn CategoryRepo>,
        base_domain: impl Into<String>,
    ) -> Self {
        Self {
            subscriptions,
            categories,
            base_domain: base_domain.into(),
        }
    }

    /// Allocate and bind a fresh subdomain for the subscription.
    ///
    /// A lost claim race counts as a collision and consumes one attempt.
    /// Re-provisioning allocates a new name; it never resumes an earlier
    /// attempt.
    pub async fn provision(&self, subscription: &Subscription) -> Result<Provisioned> {
        let id = ResourceId::from_uuid(subscription.id);

        for attempt in 1..=MAX_CLAIM_ATTEMPTS {
            let candidate = generate_subdomain();
            if self
                .subscriptions
                .try_claim_subdomain(id, &candidate)
                .await?
            {
                debug!(subscription_id = %id, subdomain = %candidate, attempt, "subdomain bound");
                let full_domain = self
                    .full_domain(&subscription.category, &candidate)
                    .await?;
                return Ok(Provisioned {
                    subdomain: candidate,
                    full_domain,
                });
            }
            warn!(subscription_id = %id, subdomain = %candidate, attempt, "subdomain collision");
        }

        Err(Error::SubdomainExhausted(MAX_CLAIM_ATTEMPTS))
    }

    /// Public domain for a subdomain under the subscription's category.
    pub async fn full_domain(&self, category: &str, subdomain: &str) -> Result<String> {
        let template = self.categories.domain_template(category).await?;
        Ok(resolve_full_domain(
            template.as_deref(),
            subdomain,
            &self.base_domain,
        ))
    }
}

fn generate_subdomain() -> String {
    let mut rng = rand::thread_rng();
    (0..SUBDOMAIN_LENGTH)
        .map(|_| SUBDOMAIN_CHARSET[rng.gen_range(0..SUBDOMAIN_CHARSET.len())] as char)
        .collect()
}

/// A template containing a dot is a full domain used verbatim; a bare
/// template is a prefix on the base domain; no template falls back to the
/// generated subdomain on the base domain.
fn resolve_full_domain(template: Option<&str>, subdomain: &str, base_domain: &str) -> String {
    match template {
        Some(t) if t.contains('.') => t.to_string(),
        Some(t) => format!("{}.{}", t, base_domain),
        None => format!("{}.{}", subdomain, base_domain),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicU32, Ordering};

    use async_trait::async_trait;
    use chrono::Utc;

    use siteship_db::{DbResult, MemoryCategoryRepo, MemorySubscriptionRepo};

    fn subscription(category: &str) -> Subscription {
        let now = Utc::now();
        Subscription {
            id: uuid::Uuid::now_v7(),
            customer_name: "Ada".to_string(),
            customer_email: "ada@example.com".to_string(),
            product_name: "Shop Starter".to_string(),
            category: category.to_string(),
            subdomain: None,
            deploy_config_id: None,
            created_at: now,
            updated_at: now,
        }
    }

    fn provisioner(
        subscriptions: Arc<MemorySubscriptionRepo>,
        categories: Arc<MemoryCategoryRepo>,
    ) -> SubdomainProvisioner {
        SubdomainProvisioner::new(subscriptions, categories, "appsku.my.id")
    }

    #[test]
    fn test_generated_shape() {
        for _ in 0..100 {
            let subdomain = generate_subdomain();
            assert_eq!(subdomain.len(), SUBDOMAIN_LENGTH);
            assert!(
                subdomain
                    .bytes()
                    .all(|b| b.is_ascii_lowercase() || b.is_ascii_digit()),
                "bad subdomain: {}",
                subdomain
            );
        }
    }

    #[test]
    fn test_full_domain_rules() {
        assert_eq!(
            resolve_full_domain(Some("shop"), "a1b2c3d", "appsku.my.id"),
            "shop.appsku.my.id"
        );
        assert_eq!(
            resolve_full_domain(Some("custom.example.com"), "a1b2c3d", "appsku.my.id"),
            "custom.example.com"
        );
        assert_eq!(
            resolve_full_domain(None, "a1b2c3d", "appsku.my.id"),
            "a1b2c3d.appsku.my.id"
        );
    }

    #[tokio::test]
    async fn test_provision_binds_distinct_subdomains() {
        let subscriptions = Arc::new(MemorySubscriptionRepo::new());
        let categories = Arc::new(MemoryCategoryRepo::new());
        let provisioner = provisioner(subscriptions.clone(), categories);

        let first = subscription("shop");
        let second = subscription("shop");
        subscriptions.insert(first.clone()).await;
        subscriptions.insert(second.clone()).await;

        let a = provisioner.provision(&first).await.unwrap();
        let b = provisioner.provision(&second).await.unwrap();
        assert_ne!(a.subdomain, b.subdomain);

        let stored = subscriptions
            .get(ResourceId::from_uuid(first.id))
            .await
            .unwrap();
        assert_eq!(stored.subdomain.as_deref(), Some(a.subdomain.as_str()));
    }

    #[tokio::test]
    async fn test_reprovision_allocates_new_name() {
        let subscriptions = Arc::new(MemorySubscriptionRepo::new());
        let categories = Arc::new(MemoryCategoryRepo::new());
        let provisioner = provisioner(subscriptions.clone(), categories);

        let sub = subscription("shop");
        subscriptions.insert(sub.clone()).await;

        let first = provisioner.provision(&sub).await.unwrap();
        let second = provisioner.provision(&sub).await.unwrap();
        assert_ne!(first.subdomain, second.subdomain);

        let stored = subscriptions
            .get(ResourceId::from_uuid(sub.id))
            .await
            .unwrap();
        assert_eq!(stored.subdomain.as_deref(), Some(second.subdomain.as_str()));
    }

    #[tokio::test]
    async fn test_template_drives_full_domain() {
        let subscriptions = Arc::new(MemorySubscriptionRepo::new());
        let categories = Arc::new(MemoryCategoryRepo::new());
        categories.insert("shop", Some("shop")).await;
        categories.insert("vanity", Some("custom.example.com")).await;
        let provisioner = provisioner(subscriptions.clone(), categories);

        let shop = subscription("shop");
        subscriptions.insert(shop.clone()).await;
        let provisioned = provisioner.provision(&shop).await.unwrap();
        assert_eq!(provisioned.full_domain, "shop.appsku.my.id");

        let vanity = subscription("vanity");
        subscriptions.insert(vanity.clone()).await;
        let provisioned = provisioner.provision(&vanity).await.unwrap();
        assert_eq!(provisioned.full_domain, "custom.example.com");

        let plain = subscription("blog");
        subscriptions.insert(plain.clone()).await;
        let provisioned = provisioner.provision(&plain).await.unwrap();
        assert_eq!(
            provisioned.full_domain,
            format!("{}.appsku.my.id", provisioned.subdomain)
        );
    }

    struct SaturatedRepo {
        attempts: AtomicU32,
    }

    #[async_trait]
    impl SubscriptionRepo for SaturatedRepo {
        async fn get_by_id(&self, id: ResourceId) -> DbResult<Subscription> {
            Err(siteship_db::DbError::NotFound(format!("subscription {}", id)))
        }

        async fn try_claim_subdomain(&self, _id: ResourceId, _subdomain: &str) -> DbResult<bool> {
            self.attempts.fetch_add(1, Ordering::SeqCst);
            Ok(false)
        }
    }

    #[tokio::test]
    async fn test_exhausted_after_bounded_attempts() {
        let repo = Arc::new(SaturatedRepo {
            attempts: AtomicU32::new(0),
        });
        let categories = Arc::new(MemoryCategoryRepo::new());
        let provisioner = SubdomainProvisioner::new(repo.clone(), categories, "appsku.my.id");

        let err = provisioner
            .provision(&subscription("shop"))
            .await
            .unwrap_err();
        assert!(matches!(err, Error::SubdomainExhausted(10)));
        assert_eq!(repo.attempts.load(Ordering::SeqCst), 10);
    }
}
