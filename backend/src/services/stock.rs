//! Stock ledger service: append movements, derive balances, list history
//!
//! Balances are never stored. Every read folds the movement table with
//! sum(in) - sum(out) + sum(adjustment).

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::Deserialize;
use shared::{
    validate_movement_quantity, MovementKind, NewStockMovement, StockMovement,
    REFERENCE_ADJUSTMENT,
};
use sqlx::{FromRow, PgConnection, PgPool};
use uuid::Uuid;
use validator::Validate;

use crate::error::{AppError, AppResult};

/// Stock service for reading the ledger and posting manual adjustments
#[derive(Clone)]
pub struct StockService {
    db: PgPool,
    recent_limit: i64,
}

/// Input for a manual stock adjustment
#[derive(Debug, Deserialize, Validate)]
pub struct AdjustStockInput {
    pub product_id: Uuid,
    pub kind: MovementKind,
    pub quantity: Decimal,
    #[validate(length(max = 500))]
    pub notes: Option<String>,
}

/// Row for movement queries
#[derive(Debug, FromRow)]
struct MovementRow {
    id: Uuid,
    product_id: Uuid,
    product_name: String,
    product_sku: String,
    kind: String,
    quantity: Decimal,
    notes: Option<String>,
    reference_id: Option<Uuid>,
    reference_type: Option<String>,
    movement_date: DateTime<Utc>,
}

impl TryFrom<MovementRow> for StockMovement {
    type Error = AppError;

    fn try_from(row: MovementRow) -> Result<Self, Self::Error> {
        let kind = MovementKind::from_str(&row.kind)
            .ok_or_else(|| AppError::Internal(format!("Unknown movement kind '{}'", row.kind)))?;
        Ok(StockMovement {
            id: row.id,
            product_id: row.product_id,
            product_name: row.product_name,
            product_sku: row.product_sku,
            kind,
            quantity: row.quantity,
            notes: row.notes,
            reference_id: row.reference_id,
            reference_type: row.reference_type,
            movement_date: row.movement_date,
        })
    }
}

const MOVEMENT_COLUMNS: &str = r#"
    m.id, m.product_id, p.name AS product_name, p.sku AS product_sku, m.kind, m.quantity,
    m.notes, m.reference_id, m.reference_type, m.movement_date
"#;

impl StockService {
    /// Create a new StockService instance
    pub fn new(db: PgPool, recent_limit: i64) -> Self {
        Self { db, recent_limit }
    }

    /// Post a manual movement against an active product
    ///
    /// Outbound adjustments must be covered by the current balance.
    pub async fn adjust(&self, input: AdjustStockInput) -> AppResult<StockMovement> {
        input.validate()?;
        validate_movement_quantity(input.quantity)?;

        let mut tx = self.db.begin().await?;

        let locked = lock_active_products(&mut tx, &[input.product_id]).await?;
        if locked.is_empty() {
            return Err(AppError::not_found(format!("Product {}", input.product_id)));
        }

        if input.kind.is_outbound() {
            let current = balance_of(&mut tx, input.product_id).await?;
            if current < input.quantity {
                return Err(AppError::InsufficientStock(format!(
                    "Insufficient stock. Current: {}, Requested: {}",
                    current, input.quantity
                )));
            }
        }

        let movement_id = record_movement(
            &mut tx,
            &NewStockMovement {
                product_id: input.product_id,
                kind: input.kind,
                quantity: input.quantity,
                notes: input.notes,
                reference_id: None,
                reference_type: Some(REFERENCE_ADJUSTMENT.to_string()),
            },
        )
        .await?;

        let movement = fetch_movement(&mut tx, movement_id).await?;
        tx.commit().await?;

        tracing::info!(
            movement_id = %movement.id,
            product_id = %movement.product_id,
            kind = movement.kind.as_str(),
            quantity = %movement.quantity,
            "Stock adjusted"
        );

        Ok(movement)
    }

    /// Current balance of a product; zero when it has no movements
    pub async fn get_balance(&self, product_id: Uuid) -> AppResult<Decimal> {
        let mut conn = self.db.acquire().await?;
        balance_of(&mut conn, product_id).await
    }

    /// All movements of one product, or the most recent ones across all products
    pub async fn list_movements(&self, product_id: Option<Uuid>) -> AppResult<Vec<StockMovement>> {
        let rows = match product_id {
            Some(product_id) => {
                sqlx::query_as::<_, MovementRow>(&format!(
                    r#"
                    SELECT {MOVEMENT_COLUMNS}
                    FROM stock_movements m
                    JOIN products p ON p.id = m.product_id
                    WHERE m.product_id = $1
                    ORDER BY m.movement_date DESC, m.id
                    "#
                ))
                .bind(product_id)
                .fetch_all(&self.db)
                .await?
            }
            None => {
                sqlx::query_as::<_, MovementRow>(&format!(
                    r#"
                    SELECT {MOVEMENT_COLUMNS}
                    FROM stock_movements m
                    JOIN products p ON p.id = m.product_id
                    ORDER BY m.movement_date DESC, m.id
                    LIMIT $1
                    "#
                ))
                .bind(self.recent_limit)
                .fetch_all(&self.db)
                .await?
            }
        };

        rows.into_iter().map(StockMovement::try_from).collect()
    }
}

// ============================================================================
// Transaction-scoped ledger primitives
// ============================================================================

/// Append one immutable movement. The ledger itself enforces no lower bound
/// on the resulting balance; callers posting `Out` check sufficiency first.
pub(crate) async fn record_movement(
    conn: &mut PgConnection,
    movement: &NewStockMovement,
) -> AppResult<Uuid> {
    validate_movement_quantity(movement.quantity)?;

    let id = sqlx::query_scalar::<_, Uuid>(
        r#"
        INSERT INTO stock_movements (product_id, kind, quantity, notes, reference_id, reference_type)
        VALUES ($1, $2, $3, $4, $5, $6)
        RETURNING id
        "#,
    )
    .bind(movement.product_id)
    .bind(movement.kind.as_str())
    .bind(movement.quantity)
    .bind(&movement.notes)
    .bind(movement.reference_id)
    .bind(&movement.reference_type)
    .fetch_one(&mut *conn)
    .await?;

    Ok(id)
}

/// Balance of one product as seen by this connection
pub(crate) async fn balance_of(conn: &mut PgConnection, product_id: Uuid) -> AppResult<Decimal> {
    let balance = sqlx::query_scalar::<_, Decimal>(
        r#"
        SELECT COALESCE(SUM(CASE WHEN kind = 'out' THEN -quantity ELSE quantity END), 0)
        FROM stock_movements
        WHERE product_id = $1
        "#,
    )
    .bind(product_id)
    .fetch_one(&mut *conn)
    .await?;

    Ok(balance)
}

/// Balances for several products in one round-trip. Products without
/// movements are absent from the map.
pub(crate) async fn balances_of(
    conn: &mut PgConnection,
    product_ids: &[Uuid],
) -> AppResult<HashMap<Uuid, Decimal>> {
    let rows = sqlx::query_as::<_, (Uuid, Decimal)>(
        r#"
        SELECT product_id,
               COALESCE(SUM(CASE WHEN kind = 'out' THEN -quantity ELSE quantity END), 0)
        FROM stock_movements
        WHERE product_id = ANY($1)
        GROUP BY product_id
        "#,
    )
    .bind(product_ids)
    .fetch_all(&mut *conn)
    .await?;

    Ok(rows.into_iter().collect())
}

/// Row-lock the given active products for the rest of the transaction.
/// Returns the ids that were found and locked.
pub(crate) async fn lock_active_products(
    conn: &mut PgConnection,
    product_ids: &[Uuid],
) -> AppResult<Vec<Uuid>> {
    lock_rows(conn, product_ids, true).await
}

/// Row-lock the given products whether active or not. Order completion
/// posts movements for products deactivated after the order was created,
/// so those rows must be locked too.
pub(crate) async fn lock_products(
    conn: &mut PgConnection,
    product_ids: &[Uuid],
) -> AppResult<Vec<Uuid>> {
    lock_rows(conn, product_ids, false).await
}

/// Locks are taken in id order so concurrent callers cannot deadlock
async fn lock_rows(
    conn: &mut PgConnection,
    product_ids: &[Uuid],
    active_only: bool,
) -> AppResult<Vec<Uuid>> {
    let mut ids = product_ids.to_vec();
    ids.sort();
    ids.dedup();

    let locked = sqlx::query_scalar::<_, Uuid>(&lock_statement(active_only))
        .bind(&ids)
        .fetch_all(&mut *conn)
        .await?;

    Ok(locked)
}

fn lock_statement(active_only: bool) -> String {
    let filter = if active_only { " AND is_active = true" } else { "" };
    format!("SELECT id FROM products WHERE id = ANY($1){filter} ORDER BY id FOR UPDATE")
}

async fn fetch_movement(conn: &mut PgConnection, movement_id: Uuid) -> AppResult<StockMovement> {
    sqlx::query_as::<_, MovementRow>(&format!(
        r#"
        SELECT {MOVEMENT_COLUMNS}
        FROM stock_movements m
        JOIN products p ON p.id = m.product_id
        WHERE m.id = $1
        "#
    ))
    .bind(movement_id)
    .fetch_optional(&mut *conn)
    .await?
    .ok_or_else(|| AppError::not_found("Stock movement"))?
    .try_into()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(kind: &str) -> MovementRow {
        MovementRow {
            id: Uuid::new_v4(),
            product_id: Uuid::new_v4(),
            product_name: "Widget".into(),
            product_sku: "WID-1".into(),
            kind: kind.into(),
            quantity: Decimal::from(3),
            notes: None,
            reference_id: None,
            reference_type: Some("Adjustment".into()),
            movement_date: Utc::now(),
        }
    }

    #[test]
    fn test_row_conversion() {
        let movement = StockMovement::try_from(row("out")).unwrap();
        assert_eq!(movement.kind, MovementKind::Out);
        assert_eq!(movement.reference_type.as_deref(), Some("Adjustment"));
    }

    #[test]
    fn test_unknown_kind_is_internal_error() {
        let err = StockMovement::try_from(row("teleport")).unwrap_err();
        assert!(matches!(err, AppError::Internal(_)));
    }

    #[test]
    fn test_completion_lock_covers_inactive_products() {
        let all = lock_statement(false);
        assert!(!all.contains("is_active"));
        assert!(all.ends_with("ORDER BY id FOR UPDATE"));

        let active = lock_statement(true);
        assert!(active.contains("AND is_active = true"));
        assert!(active.ends_with("ORDER BY id FOR UPDATE"));
    }

    #[test]
    fn test_adjust_input_rejects_long_notes() {
        let input = AdjustStockInput {
            product_id: Uuid::new_v4(),
            kind: MovementKind::In,
            quantity: Decimal::ONE,
            notes: Some("x".repeat(501)),
        };
        assert!(input.validate().is_err());
    }
}
