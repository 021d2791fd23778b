//! Supplier and customer service
//!
//! Suppliers and customers have identical shape; one service handles both,
//! bound to a [`CounterpartyKind`] that selects the backing table.

use chrono::{DateTime, Utc};
use serde::Deserialize;
use shared::{Counterparty, CounterpartyKind};
use sqlx::{FromRow, PgPool};
use uuid::Uuid;
use validator::Validate;

use crate::error::{AppError, AppResult};

#[derive(Clone)]
pub struct CounterpartyService {
    db: PgPool,
    kind: CounterpartyKind,
}

/// Input for creating or updating a supplier or customer
#[derive(Debug, Deserialize, Validate)]
pub struct CounterpartyInput {
    #[validate(length(min = 1, max = 200))]
    pub name: String,
    #[validate(length(max = 200))]
    pub contact_person: Option<String>,
    #[validate(length(max = 50))]
    pub phone: Option<String>,
    #[validate(email)]
    pub email: Option<String>,
    #[validate(length(max = 500))]
    pub address: Option<String>,
}

#[derive(Debug, FromRow)]
struct CounterpartyRow {
    id: Uuid,
    name: String,
    contact_person: Option<String>,
    phone: Option<String>,
    email: Option<String>,
    address: Option<String>,
    is_active: bool,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl From<CounterpartyRow> for Counterparty {
    fn from(row: CounterpartyRow) -> Self {
        Counterparty {
            id: row.id,
            name: row.name,
            contact_person: row.contact_person,
            phone: row.phone,
            email: row.email,
            address: row.address,
            is_active: row.is_active,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

const COLUMNS: &str =
    "id, name, contact_person, phone, email, address, is_active, created_at, updated_at";

impl CounterpartyService {
    pub fn new(db: PgPool, kind: CounterpartyKind) -> Self {
        Self { db, kind }
    }

    fn not_found(&self, id: Uuid) -> AppError {
        AppError::not_found(format!("{} {}", self.kind.label(), id))
    }

    /// Active records ordered by name
    pub async fn list(&self) -> AppResult<Vec<Counterparty>> {
        let rows = sqlx::query_as::<_, CounterpartyRow>(&format!(
            "SELECT {COLUMNS} FROM {} WHERE is_active = true ORDER BY name",
            self.kind.table()
        ))
        .fetch_all(&self.db)
        .await?;

        Ok(rows.into_iter().map(Counterparty::from).collect())
    }

    pub async fn get(&self, id: Uuid) -> AppResult<Counterparty> {
        let row = sqlx::query_as::<_, CounterpartyRow>(&format!(
            "SELECT {COLUMNS} FROM {} WHERE id = $1",
            self.kind.table()
        ))
        .bind(id)
        .fetch_optional(&self.db)
        .await?
        .ok_or_else(|| self.not_found(id))?;

        Ok(row.into())
    }

    pub async fn create(&self, input: CounterpartyInput) -> AppResult<Counterparty> {
        input.validate()?;

        let row = sqlx::query_as::<_, CounterpartyRow>(&format!(
            r#"
            INSERT INTO {} (name, contact_person, phone, email, address)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING {COLUMNS}
            "#,
            self.kind.table()
        ))
        .bind(&input.name)
        .bind(&input.contact_person)
        .bind(&input.phone)
        .bind(&input.email)
        .bind(&input.address)
        .fetch_one(&self.db)
        .await?;

        tracing::info!(id = %row.id, kind = self.kind.label(), "Counterparty created");
        Ok(row.into())
    }

    pub async fn update(&self, id: Uuid, input: CounterpartyInput) -> AppResult<Counterparty> {
        input.validate()?;

        let row = sqlx::query_as::<_, CounterpartyRow>(&format!(
            r#"
            UPDATE {}
            SET name = $1, contact_person = $2, phone = $3, email = $4, address = $5,
                updated_at = NOW()
            WHERE id = $6 AND is_active = true
            RETURNING {COLUMNS}
            "#,
            self.kind.table()
        ))
        .bind(&input.name)
        .bind(&input.contact_person)
        .bind(&input.phone)
        .bind(&input.email)
        .bind(&input.address)
        .bind(id)
        .fetch_optional(&self.db)
        .await?
        .ok_or_else(|| self.not_found(id))?;

        Ok(row.into())
    }

    /// Soft delete; existing orders keep pointing at the record
    pub async fn delete(&self, id: Uuid) -> AppResult<()> {
        let result = sqlx::query(&format!(
            "UPDATE {} SET is_active = false, updated_at = NOW() WHERE id = $1 AND is_active = true",
            self.kind.table()
        ))
        .bind(id)
        .execute(&self.db)
        .await?;

        if result.rows_affected() == 0 {
            return Err(self.not_found(id));
        }

        tracing::info!(id = %id, kind = self.kind.label(), "Counterparty deactivated");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_input_rejects_bad_email() {
        let input = CounterpartyInput {
            name: "Acme Supply".into(),
            contact_person: None,
            phone: None,
            email: Some("not-an-email".into()),
            address: None,
        };
        assert!(input.validate().is_err());
    }

    #[test]
    fn test_input_requires_name() {
        let input = CounterpartyInput {
            name: String::new(),
            contact_person: Some("Jo".into()),
            phone: None,
            email: None,
            address: None,
        };
        assert!(input.validate().is_err());
    }
}
