//! Counterparty models (suppliers and customers)

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// The two kinds of external parties an order can reference
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CounterpartyKind {
    Supplier,
    Customer,
}

impl CounterpartyKind {
    /// Backing table name. Only ever one of two static identifiers.
    pub fn table(&self) -> &'static str {
        match self {
            CounterpartyKind::Supplier => "suppliers",
            CounterpartyKind::Customer => "customers",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            CounterpartyKind::Supplier => "Supplier",
            CounterpartyKind::Customer => "Customer",
        }
    }
}

/// A supplier or customer record
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Counterparty {
    pub id: Uuid,
    pub name: String,
    pub contact_person: Option<String>,
    pub phone: Option<String>,
    pub email: Option<String>,
    pub address: Option<String>,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}
