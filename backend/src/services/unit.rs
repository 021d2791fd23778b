//! Unit-of-measure service

use chrono::{DateTime, Utc};
use serde::Deserialize;
use shared::Unit;
use sqlx::{FromRow, PgPool};
use uuid::Uuid;
use validator::Validate;

use crate::error::{AppError, AppResult};

#[derive(Clone)]
pub struct UnitService {
    db: PgPool,
}

#[derive(Debug, Deserialize, Validate)]
pub struct CreateUnitInput {
    #[validate(length(min = 1, max = 50))]
    pub name: String,
    #[validate(length(min = 1, max = 10))]
    pub symbol: String,
}

#[derive(Debug, FromRow)]
struct UnitRow {
    id: Uuid,
    name: String,
    symbol: String,
    created_at: DateTime<Utc>,
}

impl From<UnitRow> for Unit {
    fn from(row: UnitRow) -> Self {
        Unit {
            id: row.id,
            name: row.name,
            symbol: row.symbol,
            created_at: row.created_at,
        }
    }
}

impl UnitService {
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }

    pub async fn list_units(&self) -> AppResult<Vec<Unit>> {
        let rows = sqlx::query_as::<_, UnitRow>(
            "SELECT id, name, symbol, created_at FROM units ORDER BY name",
        )
        .fetch_all(&self.db)
        .await?;

        Ok(rows.into_iter().map(Unit::from).collect())
    }

    pub async fn create_unit(&self, input: CreateUnitInput) -> AppResult<Unit> {
        input.validate()?;

        let taken = sqlx::query_scalar::<_, bool>("SELECT EXISTS(SELECT 1 FROM units WHERE symbol = $1)")
            .bind(&input.symbol)
            .fetch_one(&self.db)
            .await?;

        if taken {
            return Err(AppError::Conflict {
                resource: "symbol".to_string(),
                message: format!("Unit symbol '{}' already exists.", input.symbol),
            });
        }

        let row = sqlx::query_as::<_, UnitRow>(
            r#"
            INSERT INTO units (name, symbol)
            VALUES ($1, $2)
            RETURNING id, name, symbol, created_at
            "#,
        )
        .bind(&input.name)
        .bind(&input.symbol)
        .fetch_one(&self.db)
        .await?;

        tracing::info!(unit_id = %row.id, symbol = %row.symbol, "Unit created");
        Ok(row.into())
    }

    /// Hard delete. Refused while any product, active or not, uses the unit.
    pub async fn delete_unit(&self, unit_id: Uuid) -> AppResult<()> {
        let in_use = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM products WHERE unit_id = $1")
            .bind(unit_id)
            .fetch_one(&self.db)
            .await?;

        if in_use > 0 {
            return Err(AppError::BusinessRule(format!(
                "Cannot delete unit because {} product(s) use it.",
                in_use
            )));
        }

        let result = sqlx::query("DELETE FROM units WHERE id = $1")
            .bind(unit_id)
            .execute(&self.db)
            .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::not_found(format!("Unit {}", unit_id)));
        }

        tracing::info!(unit_id = %unit_id, "Unit deleted");
        Ok(())
    }
}
