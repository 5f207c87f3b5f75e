//! Deployment status repository.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::PgPool;

use siteship_core::ResourceId;
use siteship_core::status::PublishStatus;

use crate::{DbError, DbResult};

/// One publishing attempt's status record.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct DeploymentStatus {
    pub id: uuid::Uuid,
    pub subscription_id: uuid::Uuid,
    pub subdomain: String,
    pub status: String,
    pub error: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl DeploymentStatus {
    pub fn publish_status(&self) -> Option<PublishStatus> {
        self.status.parse().ok()
    }
}

#[async_trait]
pub trait StatusRepo: Send + Sync {
    /// Create a status record in `preparing` state.
    ///
    /// Callers create the record before any detached work is scheduled so a
    /// status poll never races an in-flight publish.
    async fn create(
        &self,
        subscription_id: ResourceId,
        subdomain: &str,
    ) -> DbResult<DeploymentStatus>;

    /// Transition `preparing -> completed`.
    async fn mark_completed(&self, id: ResourceId) -> DbResult<()>;

    /// Transition `preparing -> failed`, recording the error.
    async fn mark_failed(&self, id: ResourceId, error: &str) -> DbResult<()>;

    async fn get(&self, id: ResourceId) -> DbResult<DeploymentStatus>;

    /// Most recent status record for a subscription.
    async fn latest_for_subscription(
        &self,
        subscription_id: ResourceId,
    ) -> DbResult<DeploymentStatus>;
}

/// PostgreSQL implementation of StatusRepo.
pub struct PgStatusRepo {
    pool: PgPool,
}

impl PgStatusRepo {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Distinguish "row missing" from "row already terminal" after a guarded
    /// update touched nothing.
    async fn transition_conflict(&self, id: ResourceId, to: PublishStatus) -> DbError {
        let current =
            sqlx::query_scalar::<_, String>("SELECT status FROM deployment_status WHERE id = $1")
                .bind(id.as_uuid())
                .fetch_optional(&self.pool)
                .await;
        match current {
            Ok(Some(status)) => {
                DbError::InvalidTransition(format!("{} -> {} for status {}", status, to, id))
            }
            Ok(None) => DbError::NotFound(format!("deployment status {}", id)),
            Err(e) => e.into(),
        }
    }
}

#[async_trait]
impl StatusRepo for PgStatusRepo {
    async fn create(
        &self,
        subscription_id: ResourceId,
        subdomain: &str,
    ) -> DbResult<DeploymentStatus> {
        let status = sqlx::query_as::<_, DeploymentStatus>(
            r#"
            INSERT INTO deployment_status (id, subscription_id, subdomain, status, created_at, updated_at)
            VALUES ($1, $2, $3, 'preparing', NOW(), NOW())
            RETURNING *
            "#,
        )
        .bind(uuid::Uuid::now_v7())
        .bind(subscription_id.as_uuid())
        .bind(subdomain)
        .fetch_one(&self.pool)
        .await?;
        Ok(status)
    }

    async fn mark_completed(&self, id: ResourceId) -> DbResult<()> {
        let done = sqlx::query(
            r#"
            UPDATE deployment_status
            SET status = 'completed', updated_at = NOW()
            WHERE id = $1 AND status = 'preparing'
            "#,
        )
        .bind(id.as_uuid())
        .execute(&self.pool)
        .await?;
        if done.rows_affected() == 0 {
            return Err(self.transition_conflict(id, PublishStatus::Completed).await);
        }
        Ok(())
    }

    async fn mark_failed(&self, id: ResourceId, error: &str) -> DbResult<()> {
        let done = sqlx::query(
            r#"
            UPDATE deployment_status
            SET status = 'failed', error = $2, updated_at = NOW()
            WHERE id = $1 AND status = 'preparing'
            "#,
        )
        .bind(id.as_uuid())
        .bind(error)
        .execute(&self.pool)
        .await?;
        if done.rows_affected() == 0 {
            return Err(self.transition_conflict(id, PublishStatus::Failed).await);
        }
        Ok(())
    }

    async fn get(&self, id: ResourceId) -> DbResult<DeploymentStatus> {
        let status =
            sqlx::query_as::<_, DeploymentStatus>("SELECT * FROM deployment_status WHERE id = $1")
                .bind(id.as_uuid())
                .fetch_optional(&self.pool)
                .await?
                .ok_or_else(|| DbError::NotFound(format!("deployment status {}", id)))?;
        Ok(status)
    }

    async fn latest_for_subscription(
        &self,
        subscription_id: ResourceId,
    ) -> DbResult<DeploymentStatus> {
        let status = sqlx::query_as::<_, DeploymentStatus>(
            r#"
            SELECT * FROM deployment_status
            WHERE subscription_id = $1
            ORDER BY created_at DESC
            LIMIT 1
            "#,
        )
        .bind(subscription_id.as_uuid())
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| {
            DbError::NotFound(format!("deployment status for subscription {}", subscription_id))
        })?;
        Ok(status)
    }
}
