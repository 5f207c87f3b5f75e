//! Product category repository.

use async_trait::async_trait;
use sqlx::PgPool;

use crate::DbResult;

#[async_trait]
pub trait CategoryRepo: Send + Sync {
    /// Domain template for a category, if one is configured.
    ///
    /// An unknown category and a category without a template both answer
    /// `None`; callers fall back to the default domain shape.
    async fn domain_template(&self, category: &str) -> DbResult<Option<String>>;
}

/// PostgreSQL implementation of CategoryRepo.
pub struct PgCategoryRepo {
    pool: PgPool,
}

impl PgCategoryRepo {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl CategoryRepo for PgCategoryRepo {
    async fn domain_template(&self, category: &str) -> DbResult<Option<String>> {
        let template = sqlx::query_scalar::<_, Option<String>>(
            "SELECT domain_template FROM product_categories WHERE category = $1",
        )
        .bind(category)
        .fetch_optional(&self.pool)
        .await?;
        Ok(template.flatten())
    }
}
