//! Validation utilities for StockHub
//!
//! These checks run before anything touches the store.

use rust_decimal::Decimal;
use uuid::Uuid;

use crate::error::DomainError;
use crate::models::OrderLineInput;

/// Quantities, prices and amounts are stored as NUMERIC(18, 4)
pub const MAX_DECIMAL_PLACES: u32 = 4;

/// Reject values the store would have to round. Trailing zeros do not count.
pub fn validate_decimal_places(field: &str, value: Decimal) -> Result<(), DomainError> {
    if value.normalize().scale() > MAX_DECIMAL_PLACES {
        return Err(DomainError::Validation {
            field: field.to_string(),
            message: format!("At most {} decimal places are allowed.", MAX_DECIMAL_PLACES),
        });
    }
    Ok(())
}

// ============================================================================
// Order Validations
// ============================================================================

/// An order needs at least one line, each with positive quantity and price
pub fn validate_order_lines(lines: &[OrderLineInput]) -> Result<(), DomainError> {
    if lines.is_empty() {
        return Err(DomainError::validation(
            "lines",
            "Order must have at least one item.",
        ));
    }

    for (i, line) in lines.iter().enumerate() {
        if line.quantity <= Decimal::ZERO {
            return Err(DomainError::Validation {
                field: format!("lines[{}].quantity", i),
                message: "Quantity must be greater than 0.".to_string(),
            });
        }
        if line.unit_price <= Decimal::ZERO {
            return Err(DomainError::Validation {
                field: format!("lines[{}].unit_price", i),
                message: "Unit price must be greater than 0.".to_string(),
            });
        }
        validate_decimal_places(&format!("lines[{}].quantity", i), line.quantity)?;
        validate_decimal_places(&format!("lines[{}].unit_price", i), line.unit_price)?;
    }
    Ok(())
}

/// Ids from `requested` that are not in `found`, deduplicated, request order kept
pub fn missing_ids(requested: &[Uuid], found: &[Uuid]) -> Vec<Uuid> {
    let mut missing: Vec<Uuid> = Vec::new();
    for id in requested {
        if !found.contains(id) && !missing.contains(id) {
            missing.push(*id);
        }
    }
    missing
}

// ============================================================================
// Stock Validations
// ============================================================================

/// Movement quantities are always positive; direction lives in the kind
pub fn validate_movement_quantity(quantity: Decimal) -> Result<(), DomainError> {
    if quantity <= Decimal::ZERO {
        return Err(DomainError::validation(
            "quantity",
            "Quantity must be positive.",
        ));
    }
    validate_decimal_places("quantity", quantity)
}

// ============================================================================
// Catalog Validations
// ============================================================================

/// Cost must be positive and the selling price must not undercut it
pub fn validate_product_pricing(
    cost_price: Decimal,
    selling_price: Decimal,
) -> Result<(), DomainError> {
    if cost_price <= Decimal::ZERO {
        return Err(DomainError::validation(
            "cost_price",
            "Cost price must be greater than 0.",
        ));
    }
    if selling_price <= Decimal::ZERO || selling_price < cost_price {
        return Err(DomainError::validation(
            "selling_price",
            "Selling price must be >= cost price.",
        ));
    }
    validate_decimal_places("cost_price", cost_price)?;
    validate_decimal_places("selling_price", selling_price)
}

pub fn validate_reorder_level(reorder_level: i32) -> Result<(), DomainError> {
    if reorder_level < 0 {
        return Err(DomainError::validation(
            "reorder_level",
            "Reorder level cannot be negative.",
        ));
    }
    Ok(())
}

/// SKU must be non-blank, at most 50 characters and free of whitespace
pub fn validate_sku(sku: &str) -> Result<(), DomainError> {
    if sku.trim().is_empty() {
        return Err(DomainError::validation("sku", "SKU is required."));
    }
    if sku.chars().count() > 50 {
        return Err(DomainError::validation(
            "sku",
            "SKU must be at most 50 characters.",
        ));
    }
    if sku.chars().any(char::is_whitespace) {
        return Err(DomainError::validation(
            "sku",
            "SKU cannot contain whitespace.",
        ));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn line(quantity: i64, unit_price: i64) -> OrderLineInput {
        OrderLineInput {
            product_id: Uuid::new_v4(),
            quantity: Decimal::from(quantity),
            unit_price: Decimal::from(unit_price),
        }
    }

    #[test]
    fn test_empty_order_rejected() {
        let err = validate_order_lines(&[]).unwrap_err();
        assert!(matches!(err, DomainError::Validation { ref field, .. } if field == "lines"));
    }

    #[test]
    fn test_non_positive_line_values_rejected() {
        assert!(validate_order_lines(&[line(0, 5)]).is_err());
        assert!(validate_order_lines(&[line(3, 0)]).is_err());
        assert!(validate_order_lines(&[line(3, -1)]).is_err());
        assert!(validate_order_lines(&[line(3, 5), line(1, 1)]).is_ok());
    }

    #[test]
    fn test_bad_line_names_its_index() {
        let err = validate_order_lines(&[line(1, 1), line(-2, 1)]).unwrap_err();
        assert_eq!(
            err,
            DomainError::validation("lines[1].quantity", "Quantity must be greater than 0.")
        );
    }

    #[test]
    fn test_missing_ids_reports_all_once() {
        let a = Uuid::new_v4();
        let b = Uuid::new_v4();
        let c = Uuid::new_v4();
        let missing = missing_ids(&[a, b, c, b], &[a]);
        assert_eq!(missing, vec![b, c]);
        assert!(missing_ids(&[a], &[a]).is_empty());
    }

    #[test]
    fn test_movement_quantity() {
        assert!(validate_movement_quantity(Decimal::new(1, 2)).is_ok());
        assert!(validate_movement_quantity(Decimal::ZERO).is_err());
        assert!(validate_movement_quantity(Decimal::from(-5)).is_err());
    }

    #[test]
    fn test_decimal_places_capped_at_four() {
        assert!(validate_decimal_places("quantity", Decimal::new(1, 4)).is_ok());
        assert!(validate_decimal_places("quantity", Decimal::new(4, 4)).is_ok());
        // 0.00040 normalizes to 0.0004
        assert!(validate_decimal_places("quantity", Decimal::new(40, 5)).is_ok());

        let err = validate_decimal_places("quantity", Decimal::new(4, 5)).unwrap_err();
        assert!(matches!(err, DomainError::Validation { ref field, .. } if field == "quantity"));
    }

    #[test]
    fn test_sub_precision_values_rejected_before_store() {
        // 0.00004 is positive but would be stored as 0.0000
        let tiny = Decimal::new(4, 5);
        assert!(validate_movement_quantity(tiny).is_err());

        let lines = [OrderLineInput {
            product_id: Uuid::new_v4(),
            quantity: Decimal::new(15, 1),
            unit_price: Decimal::new(33333, 5),
        }];
        let err = validate_order_lines(&lines).unwrap_err();
        assert!(
            matches!(err, DomainError::Validation { ref field, .. } if field == "lines[0].unit_price")
        );

        assert!(validate_product_pricing(Decimal::new(12345, 5), Decimal::from(1)).is_err());
    }

    #[test]
    fn test_product_pricing() {
        assert!(validate_product_pricing(Decimal::from(5), Decimal::from(8)).is_ok());
        assert!(validate_product_pricing(Decimal::from(5), Decimal::from(5)).is_ok());
        assert!(validate_product_pricing(Decimal::from(5), Decimal::from(4)).is_err());
        assert!(validate_product_pricing(Decimal::ZERO, Decimal::from(4)).is_err());
    }

    #[test]
    fn test_sku_rules() {
        assert!(validate_sku("WID-001").is_ok());
        assert!(validate_sku("  ").is_err());
        assert!(validate_sku("WID 001").is_err());
        assert!(validate_sku(&"X".repeat(51)).is_err());
    }

    #[test]
    fn test_reorder_level() {
        assert!(validate_reorder_level(0).is_ok());
        assert!(validate_reorder_level(-1).is_err());
    }
}
