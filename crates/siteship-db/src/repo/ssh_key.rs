//! SSH key storage.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;

use siteship_core::credential::{CredentialStore, SshKey};
use siteship_core::{Error, ResourceId, Result};

#[derive(Debug, sqlx::FromRow)]
struct SshKeyRow {
    id: uuid::Uuid,
    name: String,
    public_key: String,
    private_key: String,
    #[allow(dead_code)]
    created_at: DateTime<Utc>,
}

impl From<SshKeyRow> for SshKey {
    fn from(row: SshKeyRow) -> Self {
        SshKey {
            id: ResourceId::from_uuid(row.id),
            name: row.name,
            public_key: row.public_key,
            private_key: row.private_key,
        }
    }
}

/// PostgreSQL-backed credential store.
pub struct PgSshKeyStore {
    pool: PgPool,
}

impl PgSshKeyStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl CredentialStore for PgSshKeyStore {
    async fn get(&self, id: ResourceId) -> Result<SshKey> {
        let row = sqlx::query_as::<_, SshKeyRow>("SELECT * FROM ssh_keys WHERE id = $1")
            .bind(id.as_uuid())
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| Error::CredentialNotFound(format!("{}: {}", id, e)))?
            .ok_or_else(|| Error::CredentialNotFound(id.to_string()))?;
        Ok(row.into())
    }
}
