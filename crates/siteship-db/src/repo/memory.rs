//! In-memory repository implementations.
//!
//! Back the same traits as the PostgreSQL repositories, for tests and for
//! running the service without a database.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::RwLock;

use siteship_core::credential::{CredentialStore, SshKey};
use siteship_core::deploy::DeployConfig;
use siteship_core::status::PublishStatus;
use siteship_core::{Error, ResourceId};

use crate::repo::category::CategoryRepo;
use crate::repo::deploy_config::DeployConfigRepo;
use crate::repo::status::{DeploymentStatus, StatusRepo};
use crate::repo::subscription::{Subscription, SubscriptionRepo};
use crate::{DbError, DbResult};

#[derive(Debug, Clone, Default)]
pub struct MemorySubscriptionRepo {
    data: Arc<RwLock<HashMap<uuid::Uuid, Subscription>>>,
}

impl MemorySubscriptionRepo {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn insert(&self, subscription: Subscription) {
        let mut data = self.data.write().await;
        data.insert(subscription.id, subscription);
    }

    pub async fn get(&self, id: ResourceId) -> Option<Subscription> {
        let data = self.data.read().await;
        data.get(id.as_uuid()).cloned()
    }
}

#[async_trait]
impl SubscriptionRepo for MemorySubscriptionRepo {
    async fn get_by_id(&self, id: ResourceId) -> DbResult<Subscription> {
        let data = self.data.read().await;
        data.get(id.as_uuid())
            .cloned()
            .ok_or_else(|| DbError::NotFound(format!("subscription {}", id)))
    }

    async fn try_claim_subdomain(&self, id: ResourceId, subdomain: &str) -> DbResult<bool> {
        let mut data = self.data.write().await;
        let taken = data
            .values()
            .any(|s| s.subdomain.as_deref() == Some(subdomain));
        if taken {
            return Ok(false);
        }
        match data.get_mut(id.as_uuid()) {
            Some(subscription) => {
                subscription.subdomain = Some(subdomain.to_string());
                subscription.updated_at = Utc::now();
                Ok(true)
            }
            None => Ok(false),
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct MemoryStatusRepo {
    data: Arc<RwLock<HashMap<uuid::Uuid, DeploymentStatus>>>,
}

impl MemoryStatusRepo {
    pub fn new() -> Self {
        Self::default()
    }

    async fn transition(
        &self,
        id: ResourceId,
        to: PublishStatus,
        error: Option<&str>,
    ) -> DbResult<()> {
        let mut data = self.data.write().await;
        let row = data
            .get_mut(id.as_uuid())
            .ok_or_else(|| DbError::NotFound(format!("deployment status {}", id)))?;
        if row.status != PublishStatus::Preparing.as_str() {
            return Err(DbError::InvalidTransition(format!(
                "{} -> {} for status {}",
                row.status, to, id
            )));
        }
        row.status = to.as_str().to_string();
        row.error = error.map(str::to_string);
        row.updated_at = Utc::now();
        Ok(())
    }
}

#[async_trait]
impl StatusRepo for MemoryStatusRepo {
    async fn create(
        &self,
        subscription_id: ResourceId,
        subdomain: &str,
    ) -> DbResult<DeploymentStatus> {
        let now = Utc::now();
        let row = DeploymentStatus {
            id: uuid::Uuid::now_v7(),
            subscription_id: *subscription_id.as_uuid(),
            subdomain: subdomain.to_string(),
            status: PublishStatus::Preparing.as_str().to_string(),
            error: None,
            created_at: now,
            updated_at: now,
        };
        let mut data = self.data.write().await;
        data.insert(row.id, row.clone());
        Ok(row)
    }

    async fn mark_completed(&self, id: ResourceId) -> DbResult<()> {
        self.transition(id, PublishStatus::Completed, None).await
    }

    async fn mark_failed(&self, id: ResourceId, error: &str) -> DbResult<()> {
        self.transition(id, PublishStatus::Failed, Some(error)).await
    }

    async fn get(&self, id: ResourceId) -> DbResult<DeploymentStatus> {
        let data = self.data.read().await;
        data.get(id.as_uuid())
            .cloned()
            .ok_or_else(|| DbError::NotFound(format!("deployment status {}", id)))
    }

    async fn latest_for_subscription(
        &self,
        subscription_id: ResourceId,
    ) -> DbResult<DeploymentStatus> {
        let data = self.data.read().await;
        data.values()
            .filter(|s| s.subscription_id == *subscription_id.as_uuid())
            .max_by_key(|s| s.created_at)
            .cloned()
            .ok_or_else(|| {
                DbError::NotFound(format!(
                    "deployment status for subscription {}",
                    subscription_id
                ))
            })
    }
}

#[derive(Debug, Clone, Default)]
pub struct MemoryCategoryRepo {
    data: Arc<RwLock<HashMap<String, Option<String>>>>,
}

impl MemoryCategoryRepo {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn insert(&self, category: &str, domain_template: Option<&str>) {
        let mut data = self.data.write().await;
        data.insert(category.to_string(), domain_template.map(str::to_string));
    }
}

#[async_trait]
impl CategoryRepo for MemoryCategoryRepo {
    async fn domain_template(&self, category: &str) -> DbResult<Option<String>> {
        let data = self.data.read().await;
        Ok(data.get(category).cloned().flatten())
    }
}

#[derive(Debug, Clone, Default)]
pub struct MemoryDeployConfigRepo {
    data: Arc<RwLock<HashMap<uuid::Uuid, DeployConfig>>>,
}

impl MemoryDeployConfigRepo {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn insert(&self, config: DeployConfig) {
        let mut data = self.data.write().await;
        data.insert(*config.id.as_uuid(), config);
    }
}

#[async_trait]
impl DeployConfigRepo for MemoryDeployConfigRepo {
    async fn get(&self, id: ResourceId) -> DbResult<DeployConfig> {
        let data = self.data.read().await;
        data.get(id.as_uuid())
            .cloned()
            .ok_or_else(|| DbError::NotFound(format!("deploy config {}", id)))
    }
}

#[derive(Debug, Clone, Default)]
pub struct MemorySshKeyStore {
    data: Arc<RwLock<HashMap<uuid::Uuid, SshKey>>>,
}

impl MemorySshKeyStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn insert(&self, key: SshKey) {
        let mut data = self.data.write().await;
        data.insert(*key.id.as_uuid(), key);
    }
}

#[async_trait]
impl CredentialStore for MemorySshKeyStore {
    async fn get(&self, id: ResourceId) -> siteship_core::Result<SshKey> {
        let data = self.data.read().await;
        data.get(id.as_uuid())
            .cloned()
            .ok_or_else(|| Error::CredentialNotFound(id.to_string()))
    }
}
