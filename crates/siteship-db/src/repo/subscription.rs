//! Subscription repository.
//!
//! Subscriptions are created by the commerce side of the platform; the
//! publishing pipeline only reads them and claims subdomains on them.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::PgPool;

use siteship_core::ResourceId;

use crate::{DbError, DbResult};

/// A customer subscription.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Subscription {
    pub id: uuid::Uuid,
    pub customer_name: String,
    pub customer_email: String,
    pub product_name: String,
    pub category: String,
    pub subdomain: Option<String>,
    pub deploy_config_id: Option<uuid::Uuid>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[async_trait]
pub trait SubscriptionRepo: Send + Sync {
    async fn get_by_id(&self, id: ResourceId) -> DbResult<Subscription>;

    /// Atomically claim `subdomain` for the subscription.
    ///
    /// Returns `Ok(false)` when another subscription already holds the
    /// subdomain, including the case where a concurrent claim wins the
    /// unique index race. The caller retries with a fresh candidate.
    async fn try_claim_subdomain(&self, id: ResourceId, subdomain: &str) -> DbResult<bool>;
}

/// PostgreSQL implementation of SubscriptionRepo.
pub struct PgSubscriptionRepo {
    pool: PgPool,
}

impl PgSubscriptionRepo {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl SubscriptionRepo for PgSubscriptionRepo {
    async fn get_by_id(&self, id: ResourceId) -> DbResult<Subscription> {
        let subscription =
            sqlx::query_as::<_, Subscription>("SELECT * FROM subscriptions WHERE id = $1")
                .bind(id.as_uuid())
                .fetch_optional(&self.pool)
                .await?
                .ok_or_else(|| DbError::NotFound(format!("subscription {}", id)))?;
        Ok(subscription)
    }

    async fn try_claim_subdomain(&self, id: ResourceId, subdomain: &str) -> DbResult<bool> {
        let result = sqlx::query(
            r#"
            UPDATE subscriptions
            SET subdomain = $2, updated_at = NOW()
            WHERE id = $1
              AND NOT EXISTS (SELECT 1 FROM subscriptions WHERE subdomain = $2)
            "#,
        )
        .bind(id.as_uuid())
        .bind(subdomain)
        .execute(&self.pool)
        .await;

        match result {
            Ok(done) => Ok(done.rows_affected() == 1),
            // Unique index race: another claim landed between the NOT EXISTS
            // check and the write.
            Err(sqlx::Error::Database(e)) if e.code().as_deref() == Some("23505") => Ok(false),
            Err(e) => Err(e.into()),
        }
    }
}
