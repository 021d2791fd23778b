//! Product catalog models

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Reorder level used when a product is created without one
pub const DEFAULT_REORDER_LEVEL: i32 = 10;

/// A product with its ledger-derived stock level
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Product {
    pub id: Uuid,
    pub name: String,
    pub sku: String,
    pub description: Option<String>,
    pub cost_price: Decimal,
    pub selling_price: Decimal,
    pub reorder_level: i32,
    pub category_id: Uuid,
    pub category_name: String,
    pub unit_id: Uuid,
    pub unit_name: String,
    pub unit_symbol: String,
    pub current_stock: Decimal,
    pub is_low_stock: bool,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// A product is low on stock once its balance reaches the reorder level
pub fn is_low_stock(current_stock: Decimal, reorder_level: i32) -> bool {
    current_stock <= Decimal::from(reorder_level)
}

/// Value of the on-hand quantity at cost
pub fn stock_value(current_stock: Decimal, cost_price: Decimal) -> Decimal {
    current_stock * cost_price
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_low_stock_threshold_is_inclusive() {
        assert!(is_low_stock(Decimal::from(10), 10));
        assert!(is_low_stock(Decimal::ZERO, 0));
        assert!(!is_low_stock(Decimal::new(105, 1), 10));
    }

    #[test]
    fn test_stock_value() {
        assert_eq!(
            stock_value(Decimal::new(25, 1), Decimal::from(4)),
            Decimal::from(10)
        );
    }
}
