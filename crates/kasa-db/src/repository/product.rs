//! # Product Repository
//!
//! Database operations for products.
//!
//! ## Key Operations
//! - Name/barcode search for the till screen
//! - CRUD operations
//! - Atomic stock adjustments
//!
//! ## Stock Update Strategy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  ❌ WRONG: read-modify-write (races under concurrent tills)            │
//! │     let s = SELECT stock_quantity ...;                                  │
//! │     UPDATE products SET stock_quantity = {s - 3}                        │
//! │                                                                         │
//! │  ✅ CORRECT: single-statement delta                                    │
//! │     UPDATE products SET stock_quantity = MAX(0, stock_quantity - 3)     │
//! │                                                                         │
//! │  Two tills selling the same product can never interleave between       │
//! │  the read and the write, because there is no separate read.            │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use chrono::Utc;
use sqlx::SqlitePool;
use tracing::debug;
use uuid::Uuid;

use crate::error::{DbError, DbResult};
use kasa_core::Product;

/// Columns selected for [`Product`] rows.
const PRODUCT_COLUMNS: &str = "id, barcode, name, price_kurus, cost_kurus, vat_rate_bps, \
     vat_included, stock_quantity, is_active, created_at, updated_at";

/// Repository for product database operations.
#[derive(Debug, Clone)]
pub struct ProductRepository {
    pool: SqlitePool,
}

impl ProductRepository {
    /// Creates a new ProductRepository.
    pub fn new(pool: SqlitePool) -> Self {
        ProductRepository { pool }
    }

    /// Searches products by name or barcode.
    ///
    /// An empty query lists active products sorted by name; the till
    /// shows those as the default grid.
    pub async fn search(&self, query: &str, limit: u32) -> DbResult<Vec<Product>> {
        let query = query.trim();

        debug!(query = %query, limit = %limit, "Searching products");

        if query.is_empty() {
            return self.list_active(limit).await;
        }

        let pattern = format!("%{}%", query);
        let sql = format!(
            "SELECT {PRODUCT_COLUMNS}
             FROM products
             WHERE is_active = 1 AND (name LIKE ?1 OR barcode LIKE ?1)
             ORDER BY name
             LIMIT ?2"
        );

        let products = sqlx::query_as::<_, Product>(&sql)
            .bind(&pattern)
            .bind(limit)
            .fetch_all(&self.pool)
            .await?;

        debug!(count = products.len(), "Search returned products");
        Ok(products)
    }

    /// Lists active products (no search filter).
    async fn list_active(&self, limit: u32) -> DbResult<Vec<Product>> {
        let sql = format!(
            "SELECT {PRODUCT_COLUMNS}
             FROM products
             WHERE is_active = 1
             ORDER BY name
             LIMIT ?1"
        );

        let products = sqlx::query_as::<_, Product>(&sql)
            .bind(limit)
            .fetch_all(&self.pool)
            .await?;

        Ok(products)
    }

    /// Gets a product by its ID.
    pub async fn get_by_id(&self, id: &str) -> DbResult<Option<Product>> {
        let sql = format!("SELECT {PRODUCT_COLUMNS} FROM products WHERE id = ?1");

        let product = sqlx::query_as::<_, Product>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(product)
    }

    /// Gets a product by its barcode.
    pub async fn get_by_barcode(&self, barcode: &str) -> DbResult<Option<Product>> {
        let sql = format!("SELECT {PRODUCT_COLUMNS} FROM products WHERE barcode = ?1");

        let product = sqlx::query_as::<_, Product>(&sql)
            .bind(barcode)
            .fetch_optional(&self.pool)
            .await?;

        Ok(product)
    }

    /// Inserts a new product.
    ///
    /// ## Returns
    /// * `Err(DbError::UniqueViolation)` - barcode already exists
    pub async fn insert(&self, product: &Product) -> DbResult<Product> {
        debug!(name = %product.name, "Inserting product");

        sqlx::query(
            "INSERT INTO products (
                id, barcode, name, price_kurus, cost_kurus,
                vat_rate_bps, vat_included, stock_quantity,
                is_active, created_at, updated_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11)",
        )
        .bind(&product.id)
        .bind(&product.barcode)
        .bind(&product.name)
        .bind(product.price_kurus)
        .bind(product.cost_kurus)
        .bind(product.vat_rate_bps)
        .bind(product.vat_included)
        .bind(product.stock_quantity)
        .bind(product.is_active)
        .bind(product.created_at)
        .bind(product.updated_at)
        .execute(&self.pool)
        .await?;

        Ok(product.clone())
    }

    /// Updates an existing product's editable fields.
    pub async fn update(&self, product: &Product) -> DbResult<()> {
        debug!(id = %product.id, "Updating product");

        let now = Utc::now();

        let result = sqlx::query(
            "UPDATE products SET
                barcode = ?2,
                name = ?3,
                price_kurus = ?4,
                cost_kurus = ?5,
                vat_rate_bps = ?6,
                vat_included = ?7,
                is_active = ?8,
                updated_at = ?9
             WHERE id = ?1",
        )
        .bind(&product.id)
        .bind(&product.barcode)
        .bind(&product.name)
        .bind(product.price_kurus)
        .bind(product.cost_kurus)
        .bind(product.vat_rate_bps)
        .bind(product.vat_included)
        .bind(product.is_active)
        .bind(now)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Product", &product.id));
        }

        Ok(())
    }

    /// Adds received goods to stock (purchase intake).
    ///
    /// Atomic single-statement increment.
    pub async fn receive_stock(&self, id: &str, quantity: i64) -> DbResult<()> {
        debug!(id = %id, quantity = %quantity, "Receiving stock");

        let now = Utc::now();

        let result = sqlx::query(
            "UPDATE products SET
                stock_quantity = stock_quantity + ?2,
                updated_at = ?3
             WHERE id = ?1",
        )
        .bind(id)
        .bind(quantity)
        .bind(now)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Product", id));
        }

        Ok(())
    }

    /// Soft-deletes a product by setting is_active = false.
    ///
    /// ## Why Soft Delete?
    /// Historical sale items still reference this product.
    pub async fn soft_delete(&self, id: &str) -> DbResult<()> {
        debug!(id = %id, "Soft-deleting product");

        let now = Utc::now();

        let result = sqlx::query(
            "UPDATE products SET is_active = 0, updated_at = ?2 WHERE id = ?1",
        )
        .bind(id)
        .bind(now)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Product", id));
        }

        Ok(())
    }

    /// Counts active products (for diagnostics).
    pub async fn count(&self) -> DbResult<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM products WHERE is_active = 1")
            .fetch_one(&self.pool)
            .await?;

        Ok(count)
    }
}

/// Helper to generate a new product ID.
pub fn generate_product_id() -> String {
    Uuid::new_v4().to_string()
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pool::{Database, DbConfig};
    use chrono::Utc;

    fn product(name: &str, barcode: &str, price_kurus: i64) -> Product {
        let now = Utc::now();
        Product {
            id: generate_product_id(),
            barcode: Some(barcode.to_string()),
            name: name.to_string(),
            price_kurus,
            cost_kurus: None,
            vat_rate_bps: 2000,
            vat_included: false,
            stock_quantity: 10,
            is_active: true,
            created_at: now,
            updated_at: now,
        }
    }

    async fn test_db() -> Database {
        Database::new(DbConfig::in_memory()).await.unwrap()
    }

    #[tokio::test]
    async fn test_insert_and_get() {
        let db = test_db().await;
        let repo = db.products();

        let p = product("Çay 500g", "8690637700013", 4500);
        repo.insert(&p).await.unwrap();

        let fetched = repo.get_by_id(&p.id).await.unwrap().unwrap();
        assert_eq!(fetched.name, "Çay 500g");
        assert_eq!(fetched.price_kurus, 4500);
        assert!(!fetched.vat_included);

        let by_barcode = repo.get_by_barcode("8690637700013").await.unwrap();
        assert!(by_barcode.is_some());
    }

    #[tokio::test]
    async fn test_duplicate_barcode_rejected() {
        let db = test_db().await;
        let repo = db.products();

        repo.insert(&product("A", "1111", 100)).await.unwrap();
        let err = repo.insert(&product("B", "1111", 200)).await.unwrap_err();
        assert!(err.is_unique_violation());
    }

    #[tokio::test]
    async fn test_search_by_name_and_barcode() {
        let db = test_db().await;
        let repo = db.products();

        repo.insert(&product("Çay 500g", "1111", 4500)).await.unwrap();
        repo.insert(&product("Şeker 1kg", "2222", 3000)).await.unwrap();

        // SQLite LIKE is case-insensitive for ASCII only, so match the
        // Turkish capital directly
        let hits = repo.search("Çay", 20).await.unwrap();
        assert_eq!(hits.len(), 1);

        let hits = repo.search("22", 20).await.unwrap();
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].name, "Şeker 1kg");

        // Empty query lists everything active
        let hits = repo.search("", 20).await.unwrap();
        assert_eq!(hits.len(), 2);
    }

    #[tokio::test]
    async fn test_receive_stock() {
        let db = test_db().await;
        let repo = db.products();

        let p = product("Makarna", "3333", 1500);
        repo.insert(&p).await.unwrap();

        repo.receive_stock(&p.id, 24).await.unwrap();

        let fetched = repo.get_by_id(&p.id).await.unwrap().unwrap();
        assert_eq!(fetched.stock_quantity, 34);
    }

    #[tokio::test]
    async fn test_soft_delete_hides_from_search() {
        let db = test_db().await;
        let repo = db.products();

        let p = product("Eski Ürün", "4444", 900);
        repo.insert(&p).await.unwrap();
        repo.soft_delete(&p.id).await.unwrap();

        assert_eq!(repo.search("eski", 20).await.unwrap().len(), 0);
        assert_eq!(repo.count().await.unwrap(), 0);
        // Still reachable by ID for historical references
        assert!(repo.get_by_id(&p.id).await.unwrap().is_some());
    }
}
