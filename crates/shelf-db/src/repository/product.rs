//! # Product Repository
//!
//! Catalog queries used by barcode scanning.
//!
//! ## Barcode Resolution
//! ```text
//! "4005808521175"
//!       │
//!       ▼
//! products WHERE barcode = ?  AND product_status IN ProductStatus::LIVE
//!       │
//!       ├── row found   → Some(ProductId)
//!       └── no row      → None   (drafts and archived rows are invisible)
//! ```
//!
//! Matching is exact. When several live products share a barcode the
//! lowest product_id wins, so repeated scans are stable.

use shelf_core::{CatalogProduct, ProductId, ProductStatus};
use sqlx::SqlitePool;
use tracing::debug;

use crate::error::{DbError, DbResult};

/// Repository for product catalog operations.
///
/// ## Usage
/// ```rust,ignore
/// let repo = ProductRepository::new(pool);
/// let id = repo.find_published_id_by_barcode("4005808521175").await?;
/// ```
#[derive(Debug, Clone)]
pub struct ProductRepository {
    pool: SqlitePool,
}

impl ProductRepository {
    pub fn new(pool: SqlitePool) -> Self {
        ProductRepository { pool }
    }

    /// Resolves a barcode to the id of a live product.
    pub async fn find_published_id_by_barcode(&self, barcode: &str) -> DbResult<Option<ProductId>> {
        let id: Option<i64> = sqlx::query_scalar(
            r#"
            SELECT product_id
            FROM products
            WHERE barcode = ?1
              AND product_status IN (?2, ?3)
            ORDER BY product_id
            LIMIT 1
            "#,
        )
        .bind(barcode)
        .bind(ProductStatus::LIVE[0])
        .bind(ProductStatus::LIVE[1])
        .fetch_optional(&self.pool)
        .await?;

        debug!(barcode = %barcode, found = id.is_some(), "Barcode lookup");
        Ok(id.map(ProductId::new))
    }

    /// Gets a product by id, whatever its status.
    pub async fn get_by_id(&self, id: ProductId) -> DbResult<Option<CatalogProduct>> {
        let product = sqlx::query_as::<_, CatalogProduct>(
            r#"
            SELECT product_id, name, barcode, product_status
            FROM products
            WHERE product_id = ?1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(product)
    }

    /// Inserts a product with a caller-chosen id.
    pub async fn insert(&self, product: &CatalogProduct) -> DbResult<()> {
        let result = sqlx::query(
            r#"
            INSERT INTO products (product_id, name, barcode, product_status)
            VALUES (?1, ?2, ?3, ?4)
            "#,
        )
        .bind(product.product_id)
        .bind(&product.name)
        .bind(&product.barcode)
        .bind(product.product_status)
        .execute(&self.pool)
        .await;

        match result {
            Ok(_) => {
                debug!(product_id = %product.product_id, "Product inserted");
                Ok(())
            }
            Err(e) => match DbError::from(e) {
                DbError::UniqueViolation { field, .. } => Err(DbError::UniqueViolation {
                    field,
                    value: product.product_id.to_string(),
                }),
                other => Err(other),
            },
        }
    }

    /// Counts all products (for diagnostics and the seeder).
    pub async fn count(&self) -> DbResult<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM products")
            .fetch_one(&self.pool)
            .await?;
        Ok(count)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pool::{Database, DbConfig};
    use shelf_core::ProductStatus;

    fn product(id: i64, barcode: Option<&str>, status: ProductStatus) -> CatalogProduct {
        CatalogProduct {
            product_id: ProductId::new(id),
            name: format!("Product {id}"),
            barcode: barcode.map(str::to_string),
            product_status: status,
        }
    }

    async fn catalog() -> ProductRepository {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let repo = db.products();
        repo.insert(&product(42, Some("4005808521175"), ProductStatus::Published))
            .await
            .unwrap();
        repo.insert(&product(7, Some("96385074"), ProductStatus::Publish))
            .await
            .unwrap();
        repo.insert(&product(8, Some("036000291452"), ProductStatus::Draft))
            .await
            .unwrap();
        repo.insert(&product(9, None, ProductStatus::Published))
            .await
            .unwrap();
        repo
    }

    #[tokio::test]
    async fn test_find_published() {
        let repo = catalog().await;
        assert_eq!(
            repo.find_published_id_by_barcode("4005808521175").await.unwrap(),
            Some(ProductId::new(42))
        );
        assert_eq!(
            repo.find_published_id_by_barcode("96385074").await.unwrap(),
            Some(ProductId::new(7))
        );
    }

    #[tokio::test]
    async fn test_draft_is_invisible() {
        let repo = catalog().await;
        assert_eq!(
            repo.find_published_id_by_barcode("036000291452").await.unwrap(),
            None
        );
    }

    #[tokio::test]
    async fn test_unknown_barcode() {
        let repo = catalog().await;
        assert_eq!(
            repo.find_published_id_by_barcode("0000000000000").await.unwrap(),
            None
        );
    }

    #[tokio::test]
    async fn test_lowest_id_wins_on_shared_barcode() {
        let repo = catalog().await;
        repo.insert(&product(3, Some("4005808521175"), ProductStatus::Publish))
            .await
            .unwrap();
        assert_eq!(
            repo.find_published_id_by_barcode("4005808521175").await.unwrap(),
            Some(ProductId::new(3))
        );
    }

    #[tokio::test]
    async fn test_get_by_id_and_count() {
        let repo = catalog().await;
        let p = repo.get_by_id(ProductId::new(8)).await.unwrap().unwrap();
        assert_eq!(p.product_status, ProductStatus::Draft);
        assert_eq!(p.barcode.as_deref(), Some("036000291452"));
        assert!(repo.get_by_id(ProductId::new(999)).await.unwrap().is_none());
        assert_eq!(repo.count().await.unwrap(), 4);
    }

    #[tokio::test]
    async fn test_duplicate_id_rejected() {
        let repo = catalog().await;
        let err = repo
            .insert(&product(42, Some("1"), ProductStatus::Draft))
            .await
            .unwrap_err();
        assert!(matches!(err, DbError::UniqueViolation { value, .. } if value == "42"));
    }
}
