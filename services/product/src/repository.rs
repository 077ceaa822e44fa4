//! Product record store

use anyhow::Context;
use async_trait::async_trait;
use common::{Error, Result};
use sqlx::PgPool;
use tracing::info;

use crate::models::{Product, ProductChanges, ProductRow};

const PRODUCT_COLUMNS: &str = "uuid, name, price, image, qrcode, is_top, \
     category_uuid, category_name, created_at, updated_at";

/// Keyed product storage with the secondary lookups used by search
#[async_trait]
pub trait ProductRepository: Send + Sync {
    async fn query_by_category(&self, category_uuid: &str) -> Result<Vec<Product>>;

    async fn query_by_qrcode(&self, qrcode: &str) -> Result<Vec<Product>>;

    /// Products whose name starts with `prefix`
    async fn scan_by_name_prefix(&self, prefix: &str) -> Result<Vec<Product>>;

    /// Products flagged `is_top`
    async fn scan_top(&self) -> Result<Vec<Product>>;

    async fn put(&self, product: Product) -> Result<Product>;

    /// Conditional update; fails with `NotFound` when `uuid` is absent
    async fn update(&self, changes: ProductChanges) -> Result<Product>;

    /// Delete an existing product and hand back its last state
    async fn delete(&self, uuid: &str) -> Result<Product>;
}

/// PostgreSQL implementation over the `products` table
#[derive(Clone)]
pub struct PgProductRepository {
    pool: PgPool,
}

impl PgProductRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Create the `products` table and its lookup indexes
    pub async fn ensure_schema(&self) -> Result<()> {
        let statements = [
            r#"
            CREATE TABLE IF NOT EXISTS products (
                uuid TEXT PRIMARY KEY,
                name TEXT NOT NULL,
                price DOUBLE PRECISION NOT NULL,
                image TEXT NOT NULL,
                qrcode TEXT,
                is_top BOOLEAN NOT NULL DEFAULT FALSE,
                category_uuid TEXT NOT NULL,
                category_name TEXT NOT NULL,
                created_at TEXT NOT NULL,
                updated_at TEXT NOT NULL
            )
            "#,
            "CREATE INDEX IF NOT EXISTS products_category_uuid_idx ON products (category_uuid)",
            "CREATE INDEX IF NOT EXISTS products_qrcode_idx ON products (qrcode)",
        ];

        for statement in statements {
            sqlx::query(statement)
                .execute(&self.pool)
                .await
                .context("error creating products table")?;
        }

        Ok(())
    }

    async fn select_where(&self, condition: &str, value: Option<&str>) -> Result<Vec<Product>> {
        let sql = format!(
            "SELECT {} FROM products WHERE {} ORDER BY created_at",
            PRODUCT_COLUMNS, condition
        );

        let mut query = sqlx::query_as::<_, ProductRow>(&sql);
        if let Some(value) = value {
            query = query.bind(value);
        }

        let rows = query
            .fetch_all(&self.pool)
            .await
            .context("error executing query")?;

        Ok(rows.into_iter().map(Product::from).collect())
    }
}

#[async_trait]
impl ProductRepository for PgProductRepository {
    async fn query_by_category(&self, category_uuid: &str) -> Result<Vec<Product>> {
        self.select_where("category_uuid = $1", Some(category_uuid))
            .await
    }

    async fn query_by_qrcode(&self, qrcode: &str) -> Result<Vec<Product>> {
        self.select_where("qrcode = $1", Some(qrcode)).await
    }

    async fn scan_by_name_prefix(&self, prefix: &str) -> Result<Vec<Product>> {
        self.select_where("starts_with(name, $1)", Some(prefix))
            .await
    }

    async fn scan_top(&self) -> Result<Vec<Product>> {
        self.select_where("is_top", None).await
    }

    async fn put(&self, product: Product) -> Result<Product> {
        info!("Saving product: {}", product.uuid);

        sqlx::query(
            r#"
            INSERT INTO products (uuid, name, price, image, qrcode, is_top,
                                  category_uuid, category_name, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
            ON CONFLICT (uuid) DO UPDATE SET
            name = EXCLUDED.name,
            price = EXCLUDED.price,
            image = EXCLUDED.image,
            qrcode = EXCLUDED.qrcode,
            is_top = EXCLUDED.is_top,
            category_uuid = EXCLUDED.category_uuid,
            category_name = EXCLUDED.category_name,
            created_at = EXCLUDED.created_at,
            updated_at = EXCLUDED.updated_at
            "#,
        )
        .bind(&product.uuid)
        .bind(&product.name)
        .bind(product.price)
        .bind(&product.image)
        .bind(&product.qrcode)
        .bind(product.is_top)
        .bind(&product.category.uuid)
        .bind(&product.category.name)
        .bind(&product.created_at)
        .bind(&product.updated_at)
        .execute(&self.pool)
        .await
        .context("error adding item")?;

        Ok(product)
    }

    async fn update(&self, changes: ProductChanges) -> Result<Product> {
        info!("Updating product: {}", changes.uuid);

        let image_clause = if changes.image.is_some() {
            ", image = $9"
        } else {
            ""
        };
        let sql = format!(
            r#"
            UPDATE products SET
            name = $2,
            price = $3,
            qrcode = $4,
            is_top = $5,
            category_uuid = $6,
            category_name = $7,
            updated_at = $8{}
            WHERE uuid = $1
            RETURNING {}
            "#,
            image_clause, PRODUCT_COLUMNS
        );

        let mut query = sqlx::query_as::<_, ProductRow>(&sql)
            .bind(&changes.uuid)
            .bind(&changes.name)
            .bind(changes.price)
            .bind(&changes.qrcode)
            .bind(changes.is_top)
            .bind(&changes.category.uuid)
            .bind(&changes.category.name)
            .bind(&changes.updated_at);
        if let Some(image) = &changes.image {
            query = query.bind(image);
        }

        query
            .fetch_optional(&self.pool)
            .await
            .context("error updating item")?
            .map(Product::from)
            .ok_or_else(Error::not_found)
    }

    async fn delete(&self, uuid: &str) -> Result<Product> {
        info!("Deleting product: {}", uuid);

        let sql = format!(
            "DELETE FROM products WHERE uuid = $1 RETURNING {}",
            PRODUCT_COLUMNS
        );

        sqlx::query_as::<_, ProductRow>(&sql)
            .bind(uuid)
            .fetch_optional(&self.pool)
            .await
            .context("error deleting item")?
            .map(Product::from)
            .ok_or_else(Error::not_found)
    }
}
