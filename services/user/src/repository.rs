//! User record store

use anyhow::Context;
use async_trait::async_trait;
use common::{Error, Result};
use sqlx::PgPool;
use tracing::info;

use crate::models::User;

/// Keyed user storage; the email is the identity
#[async_trait]
pub trait UserRepository: Send + Sync {
    /// Unconditional upsert keyed on `email`
    async fn put(&self, user: User) -> Result<User>;

    async fn delete(&self, email: &str) -> Result<()>;

    async fn get(&self, email: &str) -> Result<User>;
}

/// PostgreSQL implementation over the `users` table
#[derive(Clone)]
pub struct PgUserRepository {
    pool: PgPool,
}

impl PgUserRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn ensure_schema(&self) -> Result<()> {
        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS users (
                email TEXT PRIMARY KEY,
                password TEXT NOT NULL,
                created_at TEXT NOT NULL,
                updated_at TEXT NOT NULL
            )
            "#,
        )
        .execute(&self.pool)
        .await
        .context("error creating users table")?;

        Ok(())
    }
}

#[async_trait]
impl UserRepository for PgUserRepository {
    async fn put(&self, user: User) -> Result<User> {
        info!("Saving user: {}", user.email);

        sqlx::query(
            r#"
            INSERT INTO users (email, password, created_at, updated_at)
            VALUES ($1, $2, $3, $4)
            ON CONFLICT (email) DO UPDATE SET
            password = EXCLUDED.password,
            created_at = EXCLUDED.created_at,
            updated_at = EXCLUDED.updated_at
            "#,
        )
        .bind(&user.email)
        .bind(&user.password)
        .bind(&user.created_at)
        .bind(&user.updated_at)
        .execute(&self.pool)
        .await
        .context("error adding item")?;

        Ok(user)
    }

    async fn delete(&self, email: &str) -> Result<()> {
        info!("Deleting user: {}", email);

        let result = sqlx::query("DELETE FROM users WHERE email = $1")
            .bind(email)
            .execute(&self.pool)
            .await
            .context("error deleting item")?;

        if result.rows_affected() == 0 {
            return Err(Error::not_found());
        }

        Ok(())
    }

    async fn get(&self, email: &str) -> Result<User> {
        sqlx::query_as::<_, User>(
            r#"
            SELECT email, password, created_at, updated_at
            FROM users
            WHERE email = $1
            "#,
        )
        .bind(email)
        .fetch_optional(&self.pool)
        .await
        .context("error getting item")?
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

    const EMAIL: &str = "repository-test@example.com";

    async fn pg_repository() -> Option<PgUserRepository> {
        if std::env::var("DATABASE_URL").is_err() {
            eprintln!("DATABASE_URL not set, skipping");
            return None;
        }

        let pool = init_pool(&DatabaseConfig::from_env().unwrap())
            .await
            .unwrap();
        let repository = PgUserRepository::new(pool);
        repository.ensure_schema().await.unwrap();
        Some(repository)
    }

    fn user(password: &str) -> User {
        User {
            email: EMAIL.to_string(),
            password: password.to_string(),
            created_at: "2024-01-01 00:00:00".to_string(),
            updated_at: "2024-01-01 00:00:00".to_string(),
        }
    }

    #[tokio::test]
    #[serial]
    async fn put_upserts_and_delete_removes() {
        let Some(repository) = pg_repository().await else {
            return;
        };

        repository.put(user("hash-1")).await.unwrap();
        repository.put(user("hash-2")).await.unwrap();
        assert_eq!(repository.get(EMAIL).await.unwrap().password, "hash-2");

        repository.delete(EMAIL).await.unwrap();

        let err = repository.get(EMAIL).await.unwrap_err();
        assert_eq!(err.code(), Some(ErrorCode::NotFound));
    }

    #[tokio::test]
    #[serial]
    async fn delete_of_missing_email_is_not_found() {
        let Some(repository) = pg_repository().await else {
            return;
        };

        let err = repository
            .delete("never-registered@example.com")
            .await
            .unwrap_err();

        assert_eq!(err.code(), Some(ErrorCode::NotFound));
    }
}
