//! Product catalog service
//!
//! Products carry no stock column. Listings join a grouped ledger aggregate
//! to report the current stock and the low-stock flag.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::Deserialize;
use shared::{
    is_low_stock, validate_product_pricing, validate_reorder_level, validate_sku, Product,
    DEFAULT_REORDER_LEVEL,
};
use sqlx::{FromRow, PgConnection, PgPool};
use uuid::Uuid;
use validator::Validate;

use crate::error::{AppError, AppResult};

/// Product service for catalog management
#[derive(Clone)]
pub struct ProductService {
    db: PgPool,
}

/// Minimal view of an active product used when building orders
#[derive(Debug, Clone, FromRow)]
pub struct ProductRef {
    pub id: Uuid,
    pub name: String,
    pub sku: String,
}

/// Input for creating a product
#[derive(Debug, Deserialize, Validate)]
pub struct CreateProductInput {
    #[validate(length(min = 1, max = 200))]
    pub name: String,
    pub sku: String,
    #[validate(length(max = 1000))]
    pub description: Option<String>,
    pub cost_price: Decimal,
    pub selling_price: Decimal,
    pub reorder_level: Option<i32>,
    pub category_id: Uuid,
    pub unit_id: Uuid,
}

/// Input for updating a product. The SKU cannot change.
#[derive(Debug, Deserialize, Validate)]
pub struct UpdateProductInput {
    #[validate(length(min = 1, max = 200))]
    pub name: String,
    #[validate(length(max = 1000))]
    pub description: Option<String>,
    pub cost_price: Decimal,
    pub selling_price: Decimal,
    pub reorder_level: i32,
    pub category_id: Uuid,
    pub unit_id: Uuid,
}

/// Row for product queries
#[derive(Debug, FromRow)]
struct ProductRow {
    id: Uuid,
    name: String,
    sku: String,
    description: Option<String>,
    cost_price: Decimal,
    selling_price: Decimal,
    reorder_level: i32,
    category_id: Uuid,
    category_name: String,
    unit_id: Uuid,
    unit_name: String,
    unit_symbol: String,
    current_stock: Decimal,
    is_active: bool,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl From<ProductRow> for Product {
    fn from(row: ProductRow) -> Self {
        Product {
            is_low_stock: is_low_stock(row.current_stock, row.reorder_level),
            id: row.id,
            name: row.name,
            sku: row.sku,
            description: row.description,
            cost_price: row.cost_price,
            selling_price: row.selling_price,
            reorder_level: row.reorder_level,
            category_id: row.category_id,
            category_name: row.category_name,
            unit_id: row.unit_id,
            unit_name: row.unit_name,
            unit_symbol: row.unit_symbol,
            current_stock: row.current_stock,
            is_active: row.is_active,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

const PRODUCT_SELECT: &str = r#"
    SELECT p.id, p.name, p.sku, p.description, p.cost_price, p.selling_price, p.reorder_level,
           p.category_id, c.name AS category_name, p.unit_id, u.name AS unit_name,
           u.symbol AS unit_symbol, COALESCE(s.balance, 0) AS current_stock,
           p.is_active, p.created_at, p.updated_at
    FROM products p
    JOIN categories c ON c.id = p.category_id
    JOIN units u ON u.id = p.unit_id
    LEFT JOIN (
        SELECT product_id,
               SUM(CASE WHEN kind = 'out' THEN -quantity ELSE quantity END) AS balance
        FROM stock_movements
        GROUP BY product_id
    ) s ON s.product_id = p.id
"#;

impl ProductService {
    /// Create a new ProductService instance
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }

    /// List active products with their current stock
    pub async fn list_products(&self) -> AppResult<Vec<Product>> {
        let rows = sqlx::query_as::<_, ProductRow>(&format!(
            "{PRODUCT_SELECT} WHERE p.is_active = true ORDER BY p.name"
        ))
        .fetch_all(&self.db)
        .await?;

        Ok(rows.into_iter().map(Product::from).collect())
    }

    /// Get a product by id, active or not
    pub async fn get_product(&self, product_id: Uuid) -> AppResult<Product> {
        let row = sqlx::query_as::<_, ProductRow>(&format!("{PRODUCT_SELECT} WHERE p.id = $1"))
            .bind(product_id)
            .fetch_optional(&self.db)
            .await?
            .ok_or_else(|| AppError::not_found(format!("Product {}", product_id)))?;

        Ok(row.into())
    }

    /// Active products at or below their reorder level
    pub async fn list_low_stock(&self) -> AppResult<Vec<Product>> {
        let products = self.list_products().await?;
        Ok(products.into_iter().filter(|p| p.is_low_stock).collect())
    }

    /// Create a product
    pub async fn create_product(&self, input: CreateProductInput) -> AppResult<Product> {
        input.validate()?;
        validate_sku(&input.sku)?;
        validate_product_pricing(input.cost_price, input.selling_price)?;
        let reorder_level = input.reorder_level.unwrap_or(DEFAULT_REORDER_LEVEL);
        validate_reorder_level(reorder_level)?;

        let mut conn = self.db.acquire().await?;

        if product_exists_with_sku(&mut conn, &input.sku).await? {
            return Err(AppError::Conflict {
                resource: "sku".to_string(),
                message: format!("SKU '{}' already exists.", input.sku),
            });
        }
        ensure_catalog_refs(&mut conn, input.category_id, input.unit_id).await?;

        let product_id = sqlx::query_scalar::<_, Uuid>(
            r#"
            INSERT INTO products (name, sku, description, cost_price, selling_price,
                                  reorder_level, category_id, unit_id)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            RETURNING id
            "#,
        )
        .bind(&input.name)
        .bind(&input.sku)
        .bind(&input.description)
        .bind(input.cost_price)
        .bind(input.selling_price)
        .bind(reorder_level)
        .bind(input.category_id)
        .bind(input.unit_id)
        .fetch_one(&mut *conn)
        .await?;

        tracing::info!(product_id = %product_id, sku = %input.sku, "Product created");

        self.get_product(product_id).await
    }

    /// Update an active product
    pub async fn update_product(
        &self,
        product_id: Uuid,
        input: UpdateProductInput,
    ) -> AppResult<Product> {
        input.validate()?;
        validate_product_pricing(input.cost_price, input.selling_price)?;
        validate_reorder_level(input.reorder_level)?;

        let mut conn = self.db.acquire().await?;

        let existing = get_active_product(&mut conn, product_id).await?;
        ensure_catalog_refs(&mut conn, input.category_id, input.unit_id).await?;

        sqlx::query(
            r#"
            UPDATE products
            SET name = $1, description = $2, cost_price = $3, selling_price = $4,
                reorder_level = $5, category_id = $6, unit_id = $7, updated_at = NOW()
            WHERE id = $8
            "#,
        )
        .bind(&input.name)
        .bind(&input.description)
        .bind(input.cost_price)
        .bind(input.selling_price)
        .bind(input.reorder_level)
        .bind(input.category_id)
        .bind(input.unit_id)
        .bind(product_id)
        .execute(&mut *conn)
        .await?;

        tracing::info!(
            product_id = %product_id,
            sku = %existing.sku,
            previous_name = %existing.name,
            "Product updated"
        );

        self.get_product(product_id).await
    }

    /// Delete a product
    ///
    /// Products with ledger history (or referenced by order lines) are
    /// deactivated; products with no history are removed outright.
    pub async fn delete_product(&self, product_id: Uuid) -> AppResult<()> {
        let mut tx = self.db.begin().await?;

        let exists = sqlx::query_scalar::<_, bool>(
            "SELECT EXISTS(SELECT 1 FROM products WHERE id = $1)",
        )
        .bind(product_id)
        .fetch_one(&mut *tx)
        .await?;

        if !exists {
            return Err(AppError::not_found(format!("Product {}", product_id)));
        }

        let has_history = sqlx::query_scalar::<_, bool>(
            r#"
            SELECT EXISTS(SELECT 1 FROM stock_movements WHERE product_id = $1)
                OR EXISTS(SELECT 1 FROM order_lines WHERE product_id = $1)
            "#,
        )
        .bind(product_id)
        .fetch_one(&mut *tx)
        .await?;

        if has_history {
            sqlx::query("UPDATE products SET is_active = false, updated_at = NOW() WHERE id = $1")
                .bind(product_id)
                .execute(&mut *tx)
                .await?;
            tracing::info!(product_id = %product_id, "Product deactivated");
        } else {
            sqlx::query("DELETE FROM products WHERE id = $1")
                .bind(product_id)
                .execute(&mut *tx)
                .await?;
            tracing::info!(product_id = %product_id, "Product removed");
        }

        tx.commit().await?;
        Ok(())
    }
}

// ============================================================================
// Catalog lookups shared with the order orchestrator
// ============================================================================

/// An active product by id
pub(crate) async fn get_active_product(
    conn: &mut PgConnection,
    product_id: Uuid,
) -> AppResult<ProductRef> {
    sqlx::query_as::<_, ProductRef>(
        "SELECT id, name, sku FROM products WHERE id = $1 AND is_active = true",
    )
    .bind(product_id)
    .fetch_optional(&mut *conn)
    .await?
    .ok_or_else(|| AppError::not_found(format!("Product {}", product_id)))
}

/// Every active product among `product_ids`. Missing or inactive ids are
/// simply absent from the result.
pub(crate) async fn batch_get_active_products(
    conn: &mut PgConnection,
    product_ids: &[Uuid],
) -> AppResult<Vec<ProductRef>> {
    let products = sqlx::query_as::<_, ProductRef>(
        "SELECT id, name, sku FROM products WHERE id = ANY($1) AND is_active = true",
    )
    .bind(product_ids)
    .fetch_all(&mut *conn)
    .await?;

    Ok(products)
}

/// SKU uniqueness spans every product ever created, active or not
pub(crate) async fn product_exists_with_sku(conn: &mut PgConnection, sku: &str) -> AppResult<bool> {
    let exists = sqlx::query_scalar::<_, bool>("SELECT EXISTS(SELECT 1 FROM products WHERE sku = $1)")
        .bind(sku)
        .fetch_one(&mut *conn)
        .await?;

    Ok(exists)
}

/// Category must be active and the unit must exist
async fn ensure_catalog_refs(
    conn: &mut PgConnection,
    category_id: Uuid,
    unit_id: Uuid,
) -> AppResult<()> {
    let category_ok = sqlx::query_scalar::<_, bool>(
        "SELECT EXISTS(SELECT 1 FROM categories WHERE id = $1 AND is_active = true)",
    )
    .bind(category_id)
    .fetch_one(&mut *conn)
    .await?;

    if !category_ok {
        return Err(AppError::not_found(format!("Category {}", category_id)));
    }

    let unit_ok = sqlx::query_scalar::<_, bool>("SELECT EXISTS(SELECT 1 FROM units WHERE id = $1)")
        .bind(unit_id)
        .fetch_one(&mut *conn)
        .await?;

    if !unit_ok {
        return Err(AppError::not_found(format!("Unit {}", unit_id)));
    }

    Ok(())
}
