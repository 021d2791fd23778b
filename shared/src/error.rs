//! Domain errors raised by the pure order and ledger rules

use rust_decimal::Decimal;
use thiserror::Error;
use uuid::Uuid;

use crate::models::{OrderAction, OrderStatus};

/// Errors produced by domain rules before anything is persisted
#[derive(Error, Debug, Clone, PartialEq)]
pub enum DomainError {
    #[error("{}", transition_rejection(.action, .status))]
    InvalidTransition {
        action: OrderAction,
        status: OrderStatus,
    },

    #[error("Insufficient stock for '{product_name}'. Available: {available}, Required: {required}")]
    InsufficientStock {
        product_id: Uuid,
        product_name: String,
        available: Decimal,
        required: Decimal,
    },

    #[error("{field}: {message}")]
    Validation { field: String, message: String },
}

impl DomainError {
    pub fn validation(field: &str, message: &str) -> Self {
        DomainError::Validation {
            field: field.to_string(),
            message: message.to_string(),
        }
    }
}

fn transition_rejection(action: &OrderAction, status: &OrderStatus) -> String {
    match (action, status) {
        (OrderAction::Cancel, OrderStatus::Completed) => "Cannot cancel a completed order.".to_string(),
        (OrderAction::Cancel, OrderStatus::Cancelled) => "Order is already cancelled.".to_string(),
        (OrderAction::Confirm, _) => format!(
            "Only Draft orders can be confirmed. Current status: {}",
            status
        ),
        (OrderAction::Complete, _) => format!(
            "Only Confirmed orders can be completed. Current status: {}",
            status
        ),
        (OrderAction::Cancel, _) => format!("Cannot cancel an order in {} status", status),
    }
}
