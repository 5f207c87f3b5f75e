//! Deploy configuration repository.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;

use siteship_core::ResourceId;
use siteship_core::deploy::DeployConfig;

use crate::{DbError, DbResult};

#[derive(Debug, sqlx::FromRow)]
struct DeployConfigRow {
    id: uuid::Uuid,
    name: String,
    deploy_type: String,
    github_repo: Option<String>,
    server_ip: Option<String>,
    server_username: Option<String>,
    server_port: Option<i32>,
    deploy_path: Option<String>,
    ssh_key_id: Option<uuid::Uuid>,
    #[allow(dead_code)]
    created_at: DateTime<Utc>,
    #[allow(dead_code)]
    updated_at: DateTime<Utc>,
}

impl From<DeployConfigRow> for DeployConfig {
    fn from(row: DeployConfigRow) -> Self {
        DeployConfig {
            id: ResourceId::from_uuid(row.id),
            name: row.name,
            target: row.deploy_type,
            github_repo: row.github_repo,
            server_ip: row.server_ip,
            server_username: row.server_username,
            server_port: row.server_port.and_then(|p| u16::try_from(p).ok()),
            deploy_path: row.deploy_path,
            ssh_key_id: row.ssh_key_id.map(ResourceId::from_uuid),
        }
    }
}

#[async_trait]
pub trait DeployConfigRepo: Send + Sync {
    async fn get(&self, id: ResourceId) -> DbResult<DeployConfig>;
}

/// PostgreSQL implementation of DeployConfigRepo.
pub struct PgDeployConfigRepo {
    pool: PgPool,
}

impl PgDeployConfigRepo {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl DeployConfigRepo for PgDeployConfigRepo {
    async fn get(&self, id: ResourceId) -> DbResult<DeployConfig> {
        let row =
            sqlx::query_as::<_, DeployConfigRow>("SELECT * FROM deploy_configs WHERE id = $1")
                .bind(id.as_uuid())
                .fetch_optional(&self.pool)
                .await?
                .ok_or_else(|| DbError::NotFound(format!("deploy config {}", id)))?;
        Ok(row.into())
    }
}
