//! Order orchestrator for purchase and sale orders
//!
//! One service drives both kinds. Each lifecycle command runs in a single
//! transaction with the order row locked, so status changes and the ledger
//! movements posted on completion commit or roll back together.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use shared::{
    generate_order_number, missing_ids, order_total, plan_completion, validate_order_lines,
    CreateOrderInput, CounterpartyKind, Order, OrderAction, OrderKind, OrderLine, OrderStatus,
};
use sqlx::{FromRow, PgConnection, PgPool};
use uuid::Uuid;
use validator::Validate;

use crate::error::{AppError, AppResult};
use crate::services::product::batch_get_active_products;
use crate::services::stock::{balances_of, lock_products, record_movement};

/// Order service, bound to one order kind
#[derive(Clone)]
pub struct OrderService {
    db: PgPool,
    kind: OrderKind,
}

/// Row for order header queries
#[derive(Debug, FromRow)]
struct OrderRow {
    id: Uuid,
    kind: String,
    order_number: String,
    counterparty_id: Uuid,
    counterparty_name: String,
    order_date: DateTime<Utc>,
    status: String,
    total_amount: Decimal,
    notes: Option<String>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

/// Row for order line queries
#[derive(Debug, FromRow)]
struct OrderLineRow {
    id: Uuid,
    order_id: Uuid,
    product_id: Uuid,
    product_name: String,
    product_sku: String,
    quantity: Decimal,
    unit_price: Decimal,
}

impl From<OrderLineRow> for OrderLine {
    fn from(row: OrderLineRow) -> Self {
        OrderLine::new(
            row.id,
            row.product_id,
            row.product_name,
            row.product_sku,
            row.quantity,
            row.unit_price,
        )
    }
}

impl OrderRow {
    fn into_order(self, lines: Vec<OrderLine>) -> AppResult<Order> {
        let kind = OrderKind::from_str(&self.kind)
            .ok_or_else(|| AppError::Internal(format!("Unknown order kind '{}'", self.kind)))?;
        let status = OrderStatus::from_str(&self.status)
            .ok_or_else(|| AppError::Internal(format!("Unknown order status '{}'", self.status)))?;

        Ok(Order {
            id: self.id,
            kind,
            order_number: self.order_number,
            counterparty_id: self.counterparty_id,
            counterparty_name: self.counterparty_name,
            order_date: self.order_date,
            status,
            total_amount: self.total_amount,
            notes: self.notes,
            lines,
            created_at: self.created_at,
            updated_at: self.updated_at,
        })
    }
}

const ORDER_SELECT: &str = r#"
    SELECT o.id, o.kind, o.order_number,
           COALESCE(o.supplier_id, o.customer_id) AS counterparty_id,
           COALESCE(s.name, c.name) AS counterparty_name,
           o.order_date, o.status, o.total_amount, o.notes, o.created_at, o.updated_at
    FROM orders o
    LEFT JOIN suppliers s ON s.id = o.supplier_id
    LEFT JOIN customers c ON c.id = o.customer_id
"#;

const LINE_SELECT: &str = r#"
    SELECT l.id, l.order_id, l.product_id, p.name AS product_name, p.sku AS product_sku,
           l.quantity, l.unit_price
    FROM order_lines l
    JOIN products p ON p.id = l.product_id
"#;

impl OrderService {
    /// Create a new OrderService instance for the given kind
    pub fn new(db: PgPool, kind: OrderKind) -> Self {
        Self { db, kind }
    }

    /// Create a Draft order
    ///
    /// Input is validated before anything is read. The counterparty and every
    /// referenced product must exist and be active.
    pub async fn create(&self, input: CreateOrderInput) -> AppResult<Order> {
        input.validate()?;
        validate_order_lines(&input.lines)?;

        let mut tx = self.db.begin().await?;

        let counterparty = self.kind.counterparty();
        let counterparty_active = sqlx::query_scalar::<_, bool>(&format!(
            "SELECT EXISTS(SELECT 1 FROM {} WHERE id = $1 AND is_active = true)",
            counterparty.table()
        ))
        .bind(input.counterparty_id)
        .fetch_one(&mut *tx)
        .await?;

        if !counterparty_active {
            return Err(AppError::not_found(format!(
                "{} {}",
                counterparty.label(),
                input.counterparty_id
            )));
        }

        let requested: Vec<Uuid> = input.lines.iter().map(|l| l.product_id).collect();
        let found: Vec<Uuid> = batch_get_active_products(&mut tx, &requested)
            .await?
            .into_iter()
            .map(|p| p.id)
            .collect();
        let missing = missing_ids(&requested, &found);
        if !missing.is_empty() {
            let ids: Vec<String> = missing.iter().map(Uuid::to_string).collect();
            return Err(AppError::not_found(format!("Products {}", ids.join(", "))));
        }

        let (supplier_id, customer_id) = match counterparty {
            CounterpartyKind::Supplier => (Some(input.counterparty_id), None),
            CounterpartyKind::Customer => (None, Some(input.counterparty_id)),
        };
        let order_number = generate_order_number(self.kind, Utc::now().date_naive());

        let order_id = sqlx::query_scalar::<_, Uuid>(
            r#"
            INSERT INTO orders (kind, order_number, supplier_id, customer_id, status,
                                total_amount, notes)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            RETURNING id
            "#,
        )
        .bind(self.kind.as_str())
        .bind(&order_number)
        .bind(supplier_id)
        .bind(customer_id)
        .bind(OrderStatus::Draft.as_str())
        .bind(order_total(&input.lines))
        .bind(&input.notes)
        .fetch_one(&mut *tx)
        .await?;

        for (position, line) in input.lines.iter().enumerate() {
            sqlx::query(
                r#"
                INSERT INTO order_lines (order_id, position, product_id, quantity, unit_price)
                VALUES ($1, $2, $3, $4, $5)
                "#,
            )
            .bind(order_id)
            .bind(position as i32)
            .bind(line.product_id)
            .bind(line.quantity)
            .bind(line.unit_price)
            .execute(&mut *tx)
            .await?;
        }

        let order = load_order(&mut tx, self.kind, order_id, false).await?;
        tx.commit().await?;

        tracing::info!(
            order_id = %order.id,
            order_number = %order.order_number,
            kind = self.kind.as_str(),
            lines = order.lines.len(),
            "Order created"
        );

        Ok(order)
    }

    /// Draft -> Confirmed
    pub async fn confirm(&self, order_id: Uuid) -> AppResult<Order> {
        let mut tx = self.db.begin().await?;

        let order = load_order(&mut tx, self.kind, order_id, true).await?;
        let next = order.status.apply(OrderAction::Confirm)?;
        set_status(&mut tx, order_id, next).await?;

        let order = load_order(&mut tx, self.kind, order_id, false).await?;
        tx.commit().await?;

        tracing::info!(order_id = %order_id, kind = self.kind.as_str(), "Order confirmed");
        Ok(order)
    }

    /// Confirmed -> Completed, posting one ledger movement per line
    ///
    /// Sales lock their products before reading balances, so two sales
    /// competing for the same stock cannot both pass the check.
    pub async fn complete(&self, order_id: Uuid) -> AppResult<Order> {
        let mut tx = self.db.begin().await?;

        let order = load_order(&mut tx, self.kind, order_id, true).await?;

        let balances = if self.kind.requires_stock_check() {
            let product_ids = order.product_ids();
            lock_products(&mut tx, &product_ids).await?;
            balances_of(&mut tx, &product_ids).await?
        } else {
            HashMap::new()
        };

        let movements = plan_completion(&order, &balances)?;
        for movement in &movements {
            record_movement(&mut tx, movement).await?;
        }
        set_status(&mut tx, order_id, OrderStatus::Completed).await?;

        let order = load_order(&mut tx, self.kind, order_id, false).await?;
        tx.commit().await?;

        tracing::info!(
            order_id = %order_id,
            order_number = %order.order_number,
            movements = movements.len(),
            "Order completed"
        );

        Ok(order)
    }

    /// Draft | Confirmed -> Cancelled. No ledger effect.
    pub async fn cancel(&self, order_id: Uuid) -> AppResult<()> {
        let mut tx = self.db.begin().await?;

        let order = load_order(&mut tx, self.kind, order_id, true).await?;
        let next = order.status.apply(OrderAction::Cancel)?;
        set_status(&mut tx, order_id, next).await?;

        tx.commit().await?;

        tracing::info!(order_id = %order_id, kind = self.kind.as_str(), "Order cancelled");
        Ok(())
    }

    /// All orders of this kind, newest first
    pub async fn list(&self) -> AppResult<Vec<Order>> {
        let rows = sqlx::query_as::<_, OrderRow>(&format!(
            "{ORDER_SELECT} WHERE o.kind = $1 ORDER BY o.order_date DESC, o.order_number"
        ))
        .bind(self.kind.as_str())
        .fetch_all(&self.db)
        .await?;

        let order_ids: Vec<Uuid> = rows.iter().map(|r| r.id).collect();
        let line_rows = sqlx::query_as::<_, OrderLineRow>(&format!(
            "{LINE_SELECT} WHERE l.order_id = ANY($1) ORDER BY l.order_id, l.position"
        ))
        .bind(&order_ids)
        .fetch_all(&self.db)
        .await?;

        let mut lines_by_order: HashMap<Uuid, Vec<OrderLine>> = HashMap::new();
        for row in line_rows {
            lines_by_order.entry(row.order_id).or_default().push(row.into());
        }

        rows.into_iter()
            .map(|row| {
                let lines = lines_by_order.remove(&row.id).unwrap_or_default();
                row.into_order(lines)
            })
            .collect()
    }

    /// One order with its lines
    pub async fn get_by_id(&self, order_id: Uuid) -> AppResult<Order> {
        let mut conn = self.db.acquire().await?;
        load_order(&mut conn, self.kind, order_id, false).await
    }
}

/// Load an order of `kind` with its lines, optionally row-locking the header
async fn load_order(
    conn: &mut PgConnection,
    kind: OrderKind,
    order_id: Uuid,
    for_update: bool,
) -> AppResult<Order> {
    let lock = if for_update { "FOR UPDATE OF o" } else { "" };
    let row = sqlx::query_as::<_, OrderRow>(&format!(
        "{ORDER_SELECT} WHERE o.id = $1 AND o.kind = $2 {lock}"
    ))
    .bind(order_id)
    .bind(kind.as_str())
    .fetch_optional(&mut *conn)
    .await?
    .ok_or_else(|| AppError::not_found(format!("{} {}", kind.label(), order_id)))?;

    let lines = sqlx::query_as::<_, OrderLineRow>(&format!(
        "{LINE_SELECT} WHERE l.order_id = $1 ORDER BY l.position"
    ))
    .bind(order_id)
    .fetch_all(&mut *conn)
    .await?
    .into_iter()
    .map(OrderLine::from)
    .collect();

    row.into_order(lines)
}

async fn set_status(conn: &mut PgConnection, order_id: Uuid, status: OrderStatus) -> AppResult<()> {
    sqlx::query("UPDATE orders SET status = $1, updated_at = NOW() WHERE id = $2")
        .bind(status.as_str())
        .bind(order_id)
        .execute(&mut *conn)
        .await?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn header(kind: &str, status: &str) -> OrderRow {
        OrderRow {
            id: Uuid::new_v4(),
            kind: kind.into(),
            order_number: "SO-20240309-ABC123".into(),
            counterparty_id: Uuid::new_v4(),
            counterparty_name: "Acme".into(),
            order_date: Utc::now(),
            status: status.into(),
            total_amount: Decimal::from(30),
            notes: None,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn test_header_conversion() {
        let order = header("sale", "confirmed").into_order(Vec::new()).unwrap();
        assert_eq!(order.kind, OrderKind::Sale);
        assert_eq!(order.status, OrderStatus::Confirmed);
    }

    #[test]
    fn test_unknown_status_is_internal_error() {
        let err = header("sale", "shipped").into_order(Vec::new()).unwrap_err();
        assert!(matches!(err, AppError::Internal(_)));
    }

    #[test]
    fn test_line_row_computes_total() {
        let line: OrderLine = OrderLineRow {
            id: Uuid::new_v4(),
            order_id: Uuid::new_v4(),
            product_id: Uuid::new_v4(),
            product_name: "Widget".into(),
            product_sku: "WID-1".into(),
            quantity: Decimal::from(3),
            unit_price: Decimal::new(250, 2),
        }
        .into();
        assert_eq!(line.line_total, Decimal::new(750, 2));
    }
}
