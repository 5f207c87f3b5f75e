//! Publish job queue.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use tokio::sync::Mutex;

use siteship_core::ResourceId;
use siteship_db::DbResult;

/// A queued publish job.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct PublishJob {
    pub id: uuid::Uuid,
    pub subscription_id: uuid::Uuid,
    pub status_id: uuid::Uuid,
    pub subdomain: String,
    pub status: String,
    pub claimed_by: Option<String>,
    pub claimed_at: Option<DateTime<Utc>>,
    pub error: Option<String>,
    pub created_at: DateTime<Utc>,
}

#[async_trait]
pub trait PublishQueue: Send + Sync {
    /// Enqueue a publish job. The status row behind `status_id` must
    /// already exist when this is called.
    async fn enqueue(
        &self,
        subscription_id: ResourceId,
        status_id: ResourceId,
        subdomain: &str,
    ) -> DbResult<PublishJob>;

    /// Claim the next pending job for a worker.
    async fn claim(&self, worker_id: &str) -> DbResult<Option<PublishJob>>;

    async fn complete(&self, job_id: uuid::Uuid) -> DbResult<()>;

    async fn fail(&self, job_id: uuid::Uuid, error: &str) -> DbResult<()>;
}

/// Publish queue backed by PostgreSQL.
pub struct PgPublishQueue {
    pool: PgPool,
}

impl PgPublishQueue {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl PublishQueue for PgPublishQueue {
    async fn enqueue(
        &self,
        subscription_id: ResourceId,
        status_id: ResourceId,
        subdomain: &str,
    ) -> DbResult<PublishJob> {
        let job = sqlx::query_as::<_, PublishJob>(
            r#"
            INSERT INTO publish_queue (id, subscription_id, status_id, subdomain, status, created_at)
            VALUES ($1, $2, $3, $4, 'pending', NOW())
            RETURNING *
            "#,
        )
        .bind(uuid::Uuid::now_v7())
        .bind(subscription_id.as_uuid())
        .bind(status_id.as_uuid())
        .bind(subdomain)
        .fetch_one(&self.pool)
        .await?;
        Ok(job)
    }

    /// Uses SKIP LOCKED so concurrent workers never contend on one job.
    async fn claim(&self, worker_id: &str) -> DbResult<Option<PublishJob>> {
        let job = sqlx::query_as::<_, PublishJob>(
            r#"
            UPDATE publish_queue
            SET status = 'claimed', claimed_by = $1, claimed_at = NOW()
            WHERE id = (
                SELECT id FROM publish_queue
                WHERE status = 'pending'
                ORDER BY created_at ASC
                FOR UPDATE SKIP LOCKED
                LIMIT 1
            )
            RETURNING *
            "#,
        )
        .bind(worker_id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(job)
    }

    async fn complete(&self, job_id: uuid::Uuid) -> DbResult<()> {
        sqlx::query("UPDATE publish_queue SET status = 'completed' WHERE id = $1")
            .bind(job_id)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    async fn fail(&self, job_id: uuid::Uuid, error: &str) -> DbResult<()> {
        sqlx::query("UPDATE publish_queue SET status = 'failed', error = $2 WHERE id = $1")
            .bind(job_id)
            .bind(error)
            .execute(&self.pool)
            .await?;
        Ok(())
    }
}

/// In-memory publish queue for tests and database-less development.
#[derive(Debug, Clone, Default)]
pub struct MemoryPublishQueue {
    jobs: Arc<Mutex<Vec<PublishJob>>>,
}

impl MemoryPublishQueue {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn get(&self, job_id: uuid::Uuid) -> Option<PublishJob> {
        let jobs = self.jobs.lock().await;
        jobs.iter().find(|j| j.id == job_id).cloned()
    }
}

#[async_trait]
impl PublishQueue for MemoryPublishQueue {
    async fn enqueue(
        &self,
        subscription_id: ResourceId,
        status_id: ResourceId,
        subdomain: &str,
    ) -> DbResult<PublishJob> {
        let job = PublishJob {
            id: uuid::Uuid::now_v7(),
            subscription_id: *subscription_id.as_uuid(),
            status_id: *status_id.as_uuid(),
            subdomain: subdomain.to_string(),
            status: "pending".to_string(),
            claimed_by: None,
            claimed_at: None,
            error: None,
            created_at: Utc::now(),
        };
        let mut jobs = self.jobs.lock().await;
        jobs.push(job.clone());
        Ok(job)
    }

    async fn claim(&self, worker_id: &str) -> DbResult<Option<PublishJob>> {
        let mut jobs = self.jobs.lock().await;
        match jobs.iter_mut().find(|j| j.status == "pending") {
            Some(job) => {
                job.status = "claimed".to_string();
                job.claimed_by = Some(worker_id.to_string());
                job.claimed_at = Some(Utc::now());
                Ok(Some(job.clone()))
            }
            None => Ok(None),
        }
    }

    async fn complete(&self, job_id: uuid::Uuid) -> DbResult<()> {
        let mut jobs = self.jobs.lock().await;
        if let Some(job) = jobs.iter_mut().find(|j| j.id == job_id) {
            job.status = "completed".to_string();
        }
        Ok(())
    }

    async fn fail(&self, job_id: uuid::Uuid, error: &str) -> DbResult<()> {
        let mut jobs = self.jobs.lock().await;
        if let Some(job) = jobs.iter_mut().find(|j| j.id == job_id) {
            job.status = "failed".to_string();
            job.error = Some(error.to_string());
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_claim_order_and_terminal_states() {
        let queue = MemoryPublishQueue::new();
        let first = queue
            .enqueue(ResourceId::new(), ResourceId::new(), "first00")
            .await
            .unwrap();
        let second = queue
            .enqueue(ResourceId::new(), ResourceId::new(), "second0")
            .await
            .unwrap();

        let claimed = queue.claim("w-1").await.unwrap().unwrap();
        assert_eq!(claimed.id, first.id);
        assert_eq!(claimed.claimed_by.as_deref(), Some("w-1"));

        queue.complete(claimed.id).await.unwrap();
        assert_eq!(queue.get(first.id).await.unwrap().status, "completed");

        let claimed = queue.claim("w-2").await.unwrap().unwrap();
        assert_eq!(claimed.id, second.id);
        queue.fail(claimed.id, "boom").await.unwrap();
        let failed = queue.get(second.id).await.unwrap();
        assert_eq!(failed.status, "failed");
        assert_eq!(failed.error.as_deref(), Some("boom"));

        assert!(queue.claim("w-1").await.unwrap().is_none());
    }
}
