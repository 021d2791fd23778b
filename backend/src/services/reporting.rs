//! Reporting service for stock and sales summaries
//! Report data is returned as rows; handlers render it as JSON or CSV

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::Serialize;
use shared::{is_low_stock, stock_value};
use sqlx::PgPool;
use uuid::Uuid;

use crate::error::{AppError, AppResult};

/// Reporting service
#[derive(Clone)]
pub struct ReportingService {
    db: PgPool,
}

/// A report with its attribution
#[derive(Debug, Serialize)]
pub struct Report<T> {
    pub title: String,
    pub generated_by: String,
    pub generated_at: DateTime<Utc>,
    pub rows: Vec<T>,
}

/// Stock summary row, one per active product
#[derive(Debug, Serialize)]
pub struct StockSummaryRow {
    pub product_id: Uuid,
    pub name: String,
    pub sku: String,
    pub category: String,
    pub current_stock: Decimal,
    pub unit_symbol: String,
    pub cost_price: Decimal,
    pub stock_value: Decimal,
    pub is_low_stock: bool,
}

#[derive(Debug, sqlx::FromRow)]
struct StockSummaryRecord {
    product_id: Uuid,
    name: String,
    sku: String,
    category: String,
    current_stock: Decimal,
    unit_symbol: String,
    cost_price: Decimal,
    reorder_level: i32,
}

/// Sales summary row, one per sale order
#[derive(Debug, Serialize, sqlx::FromRow)]
pub struct SalesSummaryRow {
    pub order_number: String,
    pub customer: String,
    pub order_date: DateTime<Utc>,
    pub status: String,
    pub line_count: i64,
    pub total_amount: Decimal,
}

impl ReportingService {
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }

    /// Current stock and valuation of every active product
    pub async fn stock_summary(&self, generated_by: &str) -> AppResult<Report<StockSummaryRow>> {
        let records = sqlx::query_as::<_, StockSummaryRecord>(
            r#"
            SELECT p.id AS product_id, p.name, p.sku, c.name AS category,
                   COALESCE(s.balance, 0) AS current_stock, u.symbol AS unit_symbol,
                   p.cost_price, p.reorder_level
            FROM products p
            JOIN categories c ON c.id = p.category_id
            JOIN units u ON u.id = p.unit_id
            LEFT JOIN (
                SELECT product_id,
                       SUM(CASE WHEN kind = 'out' THEN -quantity ELSE quantity END) AS balance
                FROM stock_movements
                GROUP BY product_id
            ) s ON s.product_id = p.id
            WHERE p.is_active = true
            ORDER BY c.name, p.name
            "#,
        )
        .fetch_all(&self.db)
        .await?;

        let rows = records
            .into_iter()
            .map(|r| StockSummaryRow {
                stock_value: stock_value(r.current_stock, r.cost_price),
                is_low_stock: is_low_stock(r.current_stock, r.reorder_level),
                product_id: r.product_id,
                name: r.name,
                sku: r.sku,
                category: r.category,
                current_stock: r.current_stock,
                unit_symbol: r.unit_symbol,
                cost_price: r.cost_price,
            })
            .collect();

        Ok(Report::new("Stock Summary", generated_by, rows))
    }

    /// Every sale order with its line count and total
    pub async fn sales_summary(&self, generated_by: &str) -> AppResult<Report<SalesSummaryRow>> {
        let rows = sqlx::query_as::<_, SalesSummaryRow>(
            r#"
            SELECT o.order_number, c.name AS customer, o.order_date, o.status,
                   (SELECT COUNT(*) FROM order_lines l WHERE l.order_id = o.id) AS line_count,
                   o.total_amount
            FROM orders o
            JOIN customers c ON c.id = o.customer_id
            WHERE o.kind = 'sale'
            ORDER BY o.order_date DESC
            "#,
        )
        .fetch_all(&self.db)
        .await?;

        Ok(Report::new("Sales Summary", generated_by, rows))
    }

    /// Export report rows to CSV format
    pub fn export_to_csv<T: Serialize>(data: &[T]) -> AppResult<String> {
        let mut wtr = csv::Writer::from_writer(vec![]);
        for record in data {
            wtr.serialize(record)
                .map_err(|e| AppError::Internal(format!("CSV serialization error: {}", e)))?;
        }
        let bytes = wtr
            .into_inner()
            .map_err(|e| AppError::Internal(format!("CSV writer error: {}", e)))?;
        String::from_utf8(bytes)
            .map_err(|e| AppError::Internal(format!("UTF-8 conversion error: {}", e)))
    }
}

impl<T> Report<T> {
    fn new(title: &str, generated_by: &str, rows: Vec<T>) -> Self {
        Self {
            title: title.to_string(),
            generated_by: generated_by.to_string(),
            generated_at: Utc::now(),
            rows,
        }
    }
}
