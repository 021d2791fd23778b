//! Stock ledger tests
//!
//! Balance derivation, low-stock thresholds and input validation.

use proptest::prelude::*;
use rust_decimal::Decimal;
use shared::{
    is_low_stock, ledger_balance, missing_ids, stock_value, validate_movement_quantity,
    validate_order_lines, validate_product_pricing, MovementKind, OrderLineInput,
};
use std::str::FromStr;
use uuid::Uuid;

// Helper to create Decimal from string
fn dec(s: &str) -> Decimal {
    Decimal::from_str(s).unwrap()
}

// ============================================================================
// Unit Tests
// ============================================================================

#[cfg(test)]
mod unit_tests {
    use super::*;

    #[test]
    fn test_no_movements_means_zero() {
        assert_eq!(ledger_balance(Vec::new()), Decimal::ZERO);
    }

    #[test]
    fn test_mixed_history() {
        let entries = vec![
            (MovementKind::In, dec("50.5")),
            (MovementKind::Out, dec("20")),
            (MovementKind::Adjustment, dec("4.5")),
            (MovementKind::Out, dec("15")),
        ];
        // 50.5 - 20 + 4.5 - 15
        assert_eq!(ledger_balance(entries), dec("20.0"));
    }

    #[test]
    fn test_low_stock_is_inclusive() {
        assert!(is_low_stock(dec("10"), 10));
        assert!(is_low_stock(Decimal::ZERO, 0));
        assert!(!is_low_stock(dec("10.001"), 10));
    }

    #[test]
    fn test_stock_value() {
        assert_eq!(stock_value(dec("12"), dec("2.50")), dec("30.00"));
    }

    #[test]
    fn test_movement_quantity_must_be_positive() {
        assert!(validate_movement_quantity(dec("0.001")).is_ok());
        assert!(validate_movement_quantity(Decimal::ZERO).is_err());
        assert!(validate_movement_quantity(dec("-1")).is_err());
    }

    #[test]
    fn test_quantities_finer_than_storage_rejected() {
        assert!(validate_movement_quantity(dec("0.0004")).is_ok());
        assert!(validate_movement_quantity(dec("0.00004")).is_err());
        assert!(validate_movement_quantity(dec("2.50000")).is_ok());
    }

    #[test]
    fn test_order_lines_validation() {
        assert!(validate_order_lines(&[]).is_err());

        let line = |qty: &str, price: &str| OrderLineInput {
            product_id: Uuid::new_v4(),
            quantity: dec(qty),
            unit_price: dec(price),
        };
        assert!(validate_order_lines(&[line("1", "1")]).is_ok());
        assert!(validate_order_lines(&[line("1", "1"), line("0", "1")]).is_err());
        assert!(validate_order_lines(&[line("1", "-2")]).is_err());
    }

    #[test]
    fn test_missing_ids_lists_every_gap_once() {
        let a = Uuid::new_v4();
        let b = Uuid::new_v4();
        let c = Uuid::new_v4();
        assert_eq!(missing_ids(&[a, b, c, b], &[a]), vec![b, c]);
        assert!(missing_ids(&[a], &[a]).is_empty());
    }

    #[test]
    fn test_selling_price_not_below_cost() {
        assert!(validate_product_pricing(dec("5"), dec("5")).is_ok());
        assert!(validate_product_pricing(dec("5"), dec("4.99")).is_err());
    }
}

// ============================================================================
// Property Tests
// ============================================================================

#[cfg(test)]
mod property_tests {
    use super::*;

    fn movement_strategy() -> impl Strategy<Value = (MovementKind, Decimal)> {
        (
            prop_oneof![
                Just(MovementKind::In),
                Just(MovementKind::Out),
                Just(MovementKind::Adjustment),
            ],
            1i64..100_000,
        )
            .prop_map(|(kind, cents)| (kind, Decimal::new(cents, 2)))
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(100))]

        /// Balance = sum(In) - sum(Out) + sum(Adjustment)
        #[test]
        fn prop_balance_formula(entries in prop::collection::vec(movement_strategy(), 0..40)) {
            let sum_of = |kind: MovementKind| -> Decimal {
                entries.iter().filter(|(k, _)| *k == kind).map(|(_, q)| *q).sum()
            };
            let expected = sum_of(MovementKind::In) - sum_of(MovementKind::Out)
                + sum_of(MovementKind::Adjustment);
            prop_assert_eq!(ledger_balance(entries.clone()), expected);
        }

        /// Insertion order does not matter
        #[test]
        fn prop_balance_order_independent(entries in prop::collection::vec(movement_strategy(), 0..40)) {
            let mut reversed = entries.clone();
            reversed.reverse();
            prop_assert_eq!(ledger_balance(entries), ledger_balance(reversed));
        }
    }
}
