//! Category record store

use anyhow::Context;
use async_trait::async_trait;
use common::{Error, Result};
use sqlx::PgPool;
use tracing::info;

use crate::models::Category;

/// Keyed category storage consumed by the category service
#[async_trait]
pub trait CategoryRepository: Send + Sync {
    async fn list(&self) -> Result<Vec<Category>>;

    /// Unconditional upsert keyed on `uuid`
    async fn put(&self, category: Category) -> Result<Category>;

    /// Delete an existing category and hand back its last state
    async fn delete(&self, uuid: &str) -> Result<Category>;
}

/// PostgreSQL implementation over the `categories` table
#[derive(Clone)]
pub struct PgCategoryRepository {
    pool: PgPool,
}

impl PgCategoryRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Create the `categories` table when it does not exist yet
    pub async fn ensure_schema(&self) -> Result<()> {
        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS categories (
                uuid TEXT PRIMARY KEY,
                name TEXT NOT NULL,
                image TEXT NOT NULL,
                created_at TEXT NOT NULL,
                updated_at TEXT NOT NULL
            )
            "#,
        )
        .execute(&self.pool)
        .await
        .context("error creating categories table")?;

        Ok(())
    }
}

#[async_trait]
impl CategoryRepository for PgCategoryRepository {
    async fn list(&self) -> Result<Vec<Category>> {
        let categories = sqlx::query_as::<_, Category>(
            r#"
            SELECT uuid, name, image, created_at, updated_at
            FROM categories
            ORDER BY created_at
            "#,
        )
        .fetch_all(&self.pool)
        .await
        .context("error executing query")?;

        Ok(categories)
    }

    async fn put(&self, category: Category) -> Result<Category> {
        info!("Saving category: {}", category.uuid);

        sqlx::query(
            r#"
            INSERT INTO categories (uuid, name, image, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5)
            ON CONFLICT (uuid) DO UPDATE SET
            name = EXCLUDED.name,
            image = EXCLUDED.image,
            created_at = EXCLUDED.created_at,
            updated_at = EXCLUDED.updated_at
            "#,
        )
        .bind(&category.uuid)
        .bind(&category.name)
        .bind(&category.image)
        .bind(&category.created_at)
        .bind(&category.updated_at)
        .execute(&self.pool)
        .await
        .context("error adding item")?;

        Ok(category)
    }

    async fn delete(&self, uuid: &str) -> Result<Category> {
        info!("Deleting category: {}", uuid);

        sqlx::query_as::<_, Category>(
            r#"
            DELETE FROM categories
            WHERE uuid = $1
            RETURNING uuid, name, image, created_at, updated_at
            "#,
        )
        .bind(uuid)
        .fetch_optional(&self.pool)
        .await
        .context("error deleting item")?
        .ok_or_else(Error::not_found)
    }
}


/// Tests against the PostgreSQL adapter; skipped when `DATABASE_URL` is not set
#[cfg(test)]
mod tests {
    use super::*;
    use common::{
        ErrorCode,
        database::{DatabaseConfig, init_pool},
    };
    use serial_test::serial;
    use uuid::Uuid;

    async fn pg_repository() -> Option<PgCategoryRepository> {
        if std::env::var("DATABASE_URL").is_err() {
            eprintln!("DATABASE_URL not set, skipping");
            return None;
        }

        let pool = init_pool(&DatabaseConfig::from_env().unwrap())
            .await
            .unwrap();
        let repository = PgCategoryRepository::new(pool);
        repository.ensure_schema().await.unwrap();
        Some(repository)
    }

    #[tokio::test]
    #[serial]
    async fn put_list_delete() {
        let Some(repository) = pg_repository().await else {
            return;
        };
        let category = Category {
            uuid: Uuid::new_v4().to_string(),
            name: "Drinks".to_string(),
            image: "loc-1".to_string(),
            created_at: "2024-01-01 00:00:00".to_string(),
            updated_at: "2024-01-01 00:00:00".to_string(),
        };
        repository.put(category.clone()).await.unwrap();

        let listed = repository.list().await.unwrap();
        assert!(listed.contains(&category));

        assert_eq!(repository.delete(&category.uuid).await.unwrap(), category);
    }

    #[tokio::test]
    #[serial]
    async fn delete_of_missing_key_is_not_found() {
        let Some(repository) = pg_repository().await else {
            return;
        };

        let err = repository
            .delete(&Uuid::new_v4().to_string())
            .await
            .unwrap_err();

        assert_eq!(err.code(), Some(ErrorCode::NotFound));
    }
}
