//! Stock ledger models
//!
//! The ledger is append-only. A product's stock level is never stored, it is
//! always folded from its movements.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Reference tag for movements posted by a completed purchase order
pub const REFERENCE_PURCHASE: &str = "Purchase";
/// Reference tag for movements posted by a completed sale order
pub const REFERENCE_SALE: &str = "Sale";
/// Reference tag for manual stock adjustments
pub const REFERENCE_ADJUSTMENT: &str = "Adjustment";

/// Kind of a stock movement. Direction is carried here, never by the sign of
/// the quantity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MovementKind {
    In,
    Out,
    /// Always adds to the balance. Downward corrections are posted as `Out`.
    Adjustment,
}

impl MovementKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            MovementKind::In => "in",
            MovementKind::Out => "out",
            MovementKind::Adjustment => "adjustment",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "in" => Some(MovementKind::In),
            "out" => Some(MovementKind::Out),
            "adjustment" => Some(MovementKind::Adjustment),
            _ => None,
        }
    }

    /// Contribution of a movement of this kind to the product balance
    pub fn signed(&self, quantity: Decimal) -> Decimal {
        match self {
            MovementKind::Out => -quantity,
            MovementKind::In | MovementKind::Adjustment => quantity,
        }
    }

    /// Whether posting this kind can lower the balance
    pub fn is_outbound(&self) -> bool {
        matches!(self, MovementKind::Out)
    }
}

impl std::fmt::Display for MovementKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            MovementKind::In => write!(f, "In"),
            MovementKind::Out => write!(f, "Out"),
            MovementKind::Adjustment => write!(f, "Adjustment"),
        }
    }
}

/// A single immutable ledger entry
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StockMovement {
    pub id: Uuid,
    pub product_id: Uuid,
    pub product_name: String,
    pub product_sku: String,
    pub kind: MovementKind,
    pub quantity: Decimal,
    pub notes: Option<String>,
    pub reference_id: Option<Uuid>,
    pub reference_type: Option<String>,
    pub movement_date: DateTime<Utc>,
}

/// A movement that has not been appended yet
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewStockMovement {
    pub product_id: Uuid,
    pub kind: MovementKind,
    pub quantity: Decimal,
    pub notes: Option<String>,
    pub reference_id: Option<Uuid>,
    pub reference_type: Option<String>,
}

/// Balance = sum(In) - sum(Out) + sum(Adjustment). An empty history is zero.
pub fn ledger_balance<I>(movements: I) -> Decimal
where
    I: IntoIterator<Item = (MovementKind, Decimal)>,
{
    movements
        .into_iter()
        .fold(Decimal::ZERO, |acc, (kind, qty)| acc + kind.signed(qty))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_ledger_is_zero() {
        assert_eq!(ledger_balance(std::iter::empty()), Decimal::ZERO);
    }

    #[test]
    fn test_adjustment_adds() {
        let entries = [
            (MovementKind::In, Decimal::from(10)),
            (MovementKind::Adjustment, Decimal::from(5)),
            (MovementKind::Out, Decimal::from(3)),
        ];
        let balance = ledger_balance(entries);
        assert_eq!(balance, Decimal::from(12));
    }

    #[test]
    fn test_kind_round_trips_through_db_text() {
        for kind in [MovementKind::In, MovementKind::Out, MovementKind::Adjustment] {
            assert_eq!(MovementKind::from_str(kind.as_str()), Some(kind));
        }
        assert_eq!(MovementKind::from_str("sideways"), None);
    }

    #[test]
    fn test_only_out_is_outbound() {
        assert!(MovementKind::Out.is_outbound());
        assert!(!MovementKind::In.is_outbound());
        assert!(!MovementKind::Adjustment.is_outbound());
    }

    mod properties {
        use super::*;
        use proptest::prelude::*;

        fn movement_strategy() -> impl Strategy<Value = (MovementKind, Decimal)> {
            (
                prop_oneof![
                    Just(MovementKind::In),
                    Just(MovementKind::Out),
                    Just(MovementKind::Adjustment),
                ],
                (1i64..=100_000i64).prop_map(|n| Decimal::new(n, 2)),
            )
        }

        proptest! {
            /// Insertion order never changes the balance
            #[test]
            fn prop_balance_is_order_independent(
                movements in prop::collection::vec(movement_strategy(), 0..30)
            ) {
                let forward = ledger_balance(movements.iter().copied());
                let backward = ledger_balance(movements.iter().rev().copied());
                prop_assert_eq!(forward, backward);
            }
        }
    }
}
