//! Purchase and sale order models
//!
//! Both order kinds share one shape and one state machine. The kind decides
//! the counterparty type, the order number prefix and which ledger movement
//! is posted on completion.

use std::collections::HashMap;

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

use super::{CounterpartyKind, MovementKind, NewStockMovement, REFERENCE_PURCHASE, REFERENCE_SALE};
use crate::error::DomainError;
use crate::validation::MAX_DECIMAL_PLACES;

/// Kind of order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OrderKind {
    Purchase,
    Sale,
}

impl OrderKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            OrderKind::Purchase => "purchase",
            OrderKind::Sale => "sale",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "purchase" => Some(OrderKind::Purchase),
            "sale" => Some(OrderKind::Sale),
            _ => None,
        }
    }

    /// Order number prefix
    pub fn prefix(&self) -> &'static str {
        match self {
            OrderKind::Purchase => "PO",
            OrderKind::Sale => "SO",
        }
    }

    pub fn counterparty(&self) -> CounterpartyKind {
        match self {
            OrderKind::Purchase => CounterpartyKind::Supplier,
            OrderKind::Sale => CounterpartyKind::Customer,
        }
    }

    /// Ledger movement posted for each line when the order completes
    pub fn movement_kind(&self) -> MovementKind {
        match self {
            OrderKind::Purchase => MovementKind::In,
            OrderKind::Sale => MovementKind::Out,
        }
    }

    pub fn reference_type(&self) -> &'static str {
        match self {
            OrderKind::Purchase => REFERENCE_PURCHASE,
            OrderKind::Sale => REFERENCE_SALE,
        }
    }

    /// Sales draw stock down and must be covered by the current balance
    pub fn requires_stock_check(&self) -> bool {
        self.movement_kind().is_outbound()
    }

    pub fn label(&self) -> &'static str {
        match self {
            OrderKind::Purchase => "Purchase Order",
            OrderKind::Sale => "Sale Order",
        }
    }
}

/// Order status
///
/// Draft -> Confirmed -> Completed, and Draft | Confirmed -> Cancelled.
/// Completed and Cancelled are terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OrderStatus {
    Draft,
    Confirmed,
    Completed,
    Cancelled,
}

/// Commands that move an order between statuses
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OrderAction {
    Confirm,
    Complete,
    Cancel,
}

impl OrderStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            OrderStatus::Draft => "draft",
            OrderStatus::Confirmed => "confirmed",
            OrderStatus::Completed => "completed",
            OrderStatus::Cancelled => "cancelled",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "draft" => Some(OrderStatus::Draft),
            "confirmed" => Some(OrderStatus::Confirmed),
            "completed" => Some(OrderStatus::Completed),
            "cancelled" => Some(OrderStatus::Cancelled),
            _ => None,
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, OrderStatus::Completed | OrderStatus::Cancelled)
    }

    /// Apply an action, returning the next status or the rejection
    pub fn apply(self, action: OrderAction) -> Result<OrderStatus, DomainError> {
        let next = match (self, action) {
            (OrderStatus::Draft, OrderAction::Confirm) => OrderStatus::Confirmed,
            (OrderStatus::Confirmed, OrderAction::Complete) => OrderStatus::Completed,
            (OrderStatus::Draft | OrderStatus::Confirmed, OrderAction::Cancel) => {
                OrderStatus::Cancelled
            }
            (status, action) => return Err(DomainError::InvalidTransition { action, status }),
        };
        Ok(next)
    }
}

impl std::fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            OrderStatus::Draft => write!(f, "Draft"),
            OrderStatus::Confirmed => write!(f, "Confirmed"),
            OrderStatus::Completed => write!(f, "Completed"),
            OrderStatus::Cancelled => write!(f, "Cancelled"),
        }
    }
}

impl OrderAction {
    pub fn as_str(&self) -> &'static str {
        match self {
            OrderAction::Confirm => "confirm",
            OrderAction::Complete => "complete",
            OrderAction::Cancel => "cancel",
        }
    }
}

impl std::fmt::Display for OrderAction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A purchase or sale order with its lines
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Order {
    pub id: Uuid,
    pub kind: OrderKind,
    pub order_number: String,
    pub counterparty_id: Uuid,
    pub counterparty_name: String,
    pub order_date: DateTime<Utc>,
    pub status: OrderStatus,
    /// Sum of line totals, fixed at creation
    pub total_amount: Decimal,
    pub notes: Option<String>,
    pub lines: Vec<OrderLine>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Order {
    /// Distinct product ids referenced by the lines, sorted
    pub fn product_ids(&self) -> Vec<Uuid> {
        let mut ids: Vec<Uuid> = self.lines.iter().map(|l| l.product_id).collect();
        ids.sort();
        ids.dedup();
        ids
    }
}

/// An order line. For purchases `unit_price` is the unit cost.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrderLine {
    pub id: Uuid,
    pub product_id: Uuid,
    pub product_name: String,
    pub product_sku: String,
    pub quantity: Decimal,
    pub unit_price: Decimal,
    pub line_total: Decimal,
}

impl OrderLine {
    pub fn new(
        id: Uuid,
        product_id: Uuid,
        product_name: String,
        product_sku: String,
        quantity: Decimal,
        unit_price: Decimal,
    ) -> Self {
        Self {
            id,
            product_id,
            product_name,
            product_sku,
            quantity,
            unit_price,
            line_total: line_extension(quantity, unit_price),
        }
    }
}

/// Input for one line of a new order
#[derive(Debug, Clone, Deserialize)]
pub struct OrderLineInput {
    pub product_id: Uuid,
    pub quantity: Decimal,
    #[serde(alias = "unit_cost")]
    pub unit_price: Decimal,
}

/// Input for creating an order
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct CreateOrderInput {
    #[serde(alias = "supplier_id", alias = "customer_id")]
    pub counterparty_id: Uuid,
    #[validate(length(max = 1000))]
    pub notes: Option<String>,
    pub lines: Vec<OrderLineInput>,
}

/// Quantity x unit price, rounded to the stored scale
pub fn line_extension(quantity: Decimal, unit_price: Decimal) -> Decimal {
    (quantity * unit_price).round_dp(MAX_DECIMAL_PLACES)
}

/// Sum of line extensions. Equal to the sum of `line_total` over the lines
/// read back from the store.
pub fn order_total(lines: &[OrderLineInput]) -> Decimal {
    lines
        .iter()
        .map(|l| line_extension(l.quantity, l.unit_price))
        .sum()
}

/// Generate an order number: `{PREFIX}-{yyyyMMdd}-{6 uppercase alphanumerics}`
pub fn generate_order_number(kind: OrderKind, date: NaiveDate) -> String {
    let suffix: String = Uuid::new_v4()
        .simple()
        .to_string()
        .chars()
        .take(6)
        .collect::<String>()
        .to_uppercase();
    format!("{}-{}-{}", kind.prefix(), date.format("%Y%m%d"), suffix)
}

/// Check an order number against `^(PO|SO)-\d{8}-[A-Z0-9]{6}$`
pub fn is_valid_order_number(number: &str) -> bool {
    let parts: Vec<&str> = number.split('-').collect();
    if parts.len() != 3 {
        return false;
    }
    let prefix_ok = parts[0] == "PO" || parts[0] == "SO";
    let date_ok = parts[1].len() == 8 && parts[1].chars().all(|c| c.is_ascii_digit());
    let suffix_ok = parts[2].len() == 6
        && parts[2]
            .chars()
            .all(|c| c.is_ascii_uppercase() || c.is_ascii_digit());
    prefix_ok && date_ok && suffix_ok
}

/// Work out the ledger movements that completing `order` posts.
///
/// Fails if the order is not Confirmed, or, for sales, if any product's
/// balance does not cover the quantity its lines require. Quantities of lines
/// sharing a product are summed before the check, so the `required` quantity
/// in a [`DomainError::InsufficientStock`] is that per-product sum and may
/// not match any single line. On failure nothing is planned for any line.
/// Products absent from `balances` have a zero balance.
pub fn plan_completion(
    order: &Order,
    balances: &HashMap<Uuid, Decimal>,
) -> Result<Vec<NewStockMovement>, DomainError> {
    order.status.apply(OrderAction::Complete)?;

    if order.kind.requires_stock_check() {
        let mut required: Vec<(&OrderLine, Decimal)> = Vec::new();
        for line in &order.lines {
            match required.iter_mut().find(|(l, _)| l.product_id == line.product_id) {
                Some((_, qty)) => *qty += line.quantity,
                None => required.push((line, line.quantity)),
            }
        }

        for (line, qty) in required {
            let available = balances
                .get(&line.product_id)
                .copied()
                .unwrap_or(Decimal::ZERO);
            if available < qty {
                return Err(DomainError::InsufficientStock {
                    product_id: line.product_id,
                    product_name: line.product_name.clone(),
                    available,
                    required: qty,
                });
            }
        }
    }

    let notes = format!("{} #{}", order.kind.label(), order.order_number);
    Ok(order
        .lines
        .iter()
        .map(|line| NewStockMovement {
            product_id: line.product_id,
            kind: order.kind.movement_kind(),
            quantity: line.quantity,
            notes: Some(notes.clone()),
            reference_id: Some(order.id),
            reference_type: Some(order.kind.reference_type().to_string()),
        })
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn order(kind: OrderKind, status: OrderStatus, lines: Vec<OrderLine>) -> Order {
        let now = Utc::now();
        Order {
            id: Uuid::new_v4(),
            kind,
            order_number: generate_order_number(kind, now.date_naive()),
            counterparty_id: Uuid::new_v4(),
            counterparty_name: "Acme".to_string(),
            order_date: now,
            status,
            total_amount: lines.iter().map(|l| l.line_total).sum(),
            notes: None,
            lines,
            created_at: now,
            updated_at: now,
        }
    }

    fn line(product_id: Uuid, qty: i64) -> OrderLine {
        OrderLine::new(
            Uuid::new_v4(),
            product_id,
            "Widget".to_string(),
            "WID-1".to_string(),
            Decimal::from(qty),
            Decimal::from(10),
        )
    }

    #[test]
    fn test_transitions_from_draft() {
        assert_eq!(
            OrderStatus::Draft.apply(OrderAction::Confirm),
            Ok(OrderStatus::Confirmed)
        );
        assert_eq!(
            OrderStatus::Draft.apply(OrderAction::Cancel),
            Ok(OrderStatus::Cancelled)
        );
        assert!(OrderStatus::Draft.apply(OrderAction::Complete).is_err());
    }

    #[test]
    fn test_terminal_states_reject_everything() {
        for status in [OrderStatus::Completed, OrderStatus::Cancelled] {
            assert!(status.is_terminal());
            for action in [OrderAction::Confirm, OrderAction::Complete, OrderAction::Cancel] {
                assert!(status.apply(action).is_err());
            }
        }
    }

    #[test]
    fn test_rejection_messages() {
        let err = OrderStatus::Completed.apply(OrderAction::Cancel).unwrap_err();
        assert_eq!(err.to_string(), "Cannot cancel a completed order.");

        let err = OrderStatus::Confirmed.apply(OrderAction::Confirm).unwrap_err();
        assert!(err.to_string().contains("Current status: Confirmed"));
    }

    #[test]
    fn test_order_number_format() {
        let date = NaiveDate::from_ymd_opt(2024, 3, 9).unwrap();
        let number = generate_order_number(OrderKind::Sale, date);
        assert!(number.starts_with("SO-20240309-"));
        assert!(is_valid_order_number(&number));
        assert!(!is_valid_order_number("SO-2024039-ABC123"));
        assert!(!is_valid_order_number("XO-20240309-ABC123"));
        assert!(!is_valid_order_number("PO-20240309-abc123"));
    }

    #[test]
    fn test_purchase_completion_needs_no_stock() {
        let p = Uuid::new_v4();
        let o = order(OrderKind::Purchase, OrderStatus::Confirmed, vec![line(p, 40)]);
        let planned = plan_completion(&o, &HashMap::new()).unwrap();
        assert_eq!(planned.len(), 1);
        assert_eq!(planned[0].kind, MovementKind::In);
        assert_eq!(planned[0].reference_type.as_deref(), Some("Purchase"));
    }

    #[test]
    fn test_sale_lines_for_same_product_are_summed() {
        let p = Uuid::new_v4();
        let o = order(
            OrderKind::Sale,
            OrderStatus::Confirmed,
            vec![line(p, 6), line(p, 6)],
        );
        let balances = HashMap::from([(p, Decimal::from(10))]);
        match plan_completion(&o, &balances) {
            Err(DomainError::InsufficientStock { required, .. }) => {
                assert_eq!(required, Decimal::from(12))
            }
            other => panic!("expected insufficient stock, got {:?}", other),
        }
    }

    #[test]
    fn test_status_serializes_snake_case() {
        assert_eq!(
            serde_json::to_string(&OrderStatus::Confirmed).unwrap(),
            "\"confirmed\""
        );
        for status in [
            OrderStatus::Draft,
            OrderStatus::Confirmed,
            OrderStatus::Completed,
            OrderStatus::Cancelled,
        ] {
            assert_eq!(OrderStatus::from_str(status.as_str()), Some(status));
        }
    }

    #[test]
    fn test_create_input_accepts_kind_specific_field_names() {
        let json = r#"{
            "supplier_id": "6f1c1a4e-8f7e-4f43-9d7e-2a7c7b1f9a10",
            "lines": [{"product_id": "0b6f7f34-51a6-4d0e-8f7b-8d5f0a1b2c3d", "quantity": "3", "unit_cost": "2.50"}]
        }"#;
        let input: CreateOrderInput = serde_json::from_str(json).unwrap();
        assert_eq!(input.lines[0].unit_price, Decimal::new(250, 2));
        assert_eq!(order_total(&input.lines), Decimal::new(750, 2));
        assert!(input.notes.is_none());
    }

    #[test]
    fn test_total_matches_line_totals_read_back() {
        let p = Uuid::new_v4();
        let inputs = vec![
            OrderLineInput {
                product_id: p,
                quantity: Decimal::new(15, 1),
                unit_price: Decimal::new(333, 3),
            },
            OrderLineInput {
                product_id: p,
                quantity: Decimal::new(1, 4),
                unit_price: Decimal::new(1, 4),
            },
        ];
        let lines: Vec<OrderLine> = inputs
            .iter()
            .map(|i| {
                OrderLine::new(
                    Uuid::new_v4(),
                    i.product_id,
                    "Widget".to_string(),
                    "WID-1".to_string(),
                    i.quantity,
                    i.unit_price,
                )
            })
            .collect();

        let total = order_total(&inputs);
        assert_eq!(total, Decimal::new(4995, 4));
        assert!(total.scale() <= MAX_DECIMAL_PLACES);
        assert_eq!(total, lines.iter().map(|l| l.line_total).sum::<Decimal>());
    }

    #[test]
    fn test_product_ids_are_distinct_and_sorted() {
        let a = Uuid::new_v4();
        let b = Uuid::new_v4();
        let o = order(
            OrderKind::Sale,
            OrderStatus::Draft,
            vec![line(b, 1), line(a, 1), line(b, 2)],
        );
        let ids = o.product_ids();
        assert_eq!(ids.len(), 2);
        assert!(ids[0] < ids[1]);
    }
}
