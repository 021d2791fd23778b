//! Error handling for the StockHub server
//!
//! Every error carries a machine-checkable `kind` so clients can tell
//! not-found, conflict, business-rule and validation failures apart.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use shared::DomainError;
use thiserror::Error;

/// Application error types
#[derive(Error, Debug)]
pub enum AppError {
    // Validation errors
    #[error("Validation error: {message}")]
    Validation { field: String, message: String },

    #[error("Validation error: {0}")]
    ValidationError(String),

    #[error("Resource not found: {0}")]
    NotFound(String),

    #[error("Conflict: {message}")]
    Conflict { resource: String, message: String },

    // Business logic errors
    #[error("Business rule violation: {0}")]
    BusinessRule(String),

    #[error("Invalid state transition: {0}")]
    InvalidStateTransition(String),

    #[error("Insufficient stock: {0}")]
    InsufficientStock(String),

    #[error("Configuration error: {0}")]
    Configuration(String),

    // Database errors
    #[error("Database error: {0}")]
    DatabaseError(#[from] sqlx::Error),

    // Internal errors
    #[error("Internal server error: {0}")]
    Internal(String),

    #[error("Internal server error")]
    InternalError(#[from] anyhow::Error),
}

/// Coarse classification of an error, stable across message changes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    Validation,
    NotFound,
    Conflict,
    BusinessRule,
    Internal,
}

/// Error response structure
#[derive(Serialize)]
pub struct ErrorResponse {
    pub error: ErrorDetail,
}

#[derive(Serialize)]
pub struct ErrorDetail {
    pub code: String,
    pub kind: ErrorKind,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub field: Option<String>,
}

impl AppError {
    pub fn not_found(resource: impl std::fmt::Display) -> Self {
        AppError::NotFound(resource.to_string())
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            AppError::Validation { .. } | AppError::ValidationError(_) => ErrorKind::Validation,
            AppError::NotFound(_) => ErrorKind::NotFound,
            AppError::Conflict { .. } => ErrorKind::Conflict,
            AppError::BusinessRule(_)
            | AppError::InvalidStateTransition(_)
            | AppError::InsufficientStock(_) => ErrorKind::BusinessRule,
            AppError::Configuration(_)
            | AppError::DatabaseError(_)
            | AppError::Internal(_)
            | AppError::InternalError(_) => ErrorKind::Internal,
        }
    }

    pub fn status_code(&self) -> StatusCode {
        match self.kind() {
            ErrorKind::Validation => StatusCode::BAD_REQUEST,
            ErrorKind::NotFound => StatusCode::NOT_FOUND,
            ErrorKind::Conflict => StatusCode::CONFLICT,
            ErrorKind::BusinessRule => StatusCode::UNPROCESSABLE_ENTITY,
            ErrorKind::Internal => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn detail(&self) -> ErrorDetail {
        let (code, message, field) = match self {
            AppError::Validation { field, message } => {
                ("VALIDATION_ERROR", message.clone(), Some(field.clone()))
            }
            AppError::ValidationError(msg) => ("VALIDATION_ERROR", msg.clone(), None),
            AppError::NotFound(resource) => ("NOT_FOUND", format!("{} not found", resource), None),
            AppError::Conflict { resource, message } => {
                ("CONFLICT", message.clone(), Some(resource.clone()))
            }
            AppError::BusinessRule(msg) => ("BUSINESS_RULE_VIOLATION", msg.clone(), None),
            AppError::InvalidStateTransition(msg) => {
                ("INVALID_STATE_TRANSITION", msg.clone(), None)
            }
            AppError::InsufficientStock(msg) => ("INSUFFICIENT_STOCK", msg.clone(), None),
            AppError::Configuration(msg) => (
                "CONFIGURATION_ERROR",
                format!("Configuration error: {}", msg),
                None,
            ),
            AppError::DatabaseError(_) => {
                ("DATABASE_ERROR", "A database error occurred".to_string(), None)
            }
            AppError::Internal(msg) => ("INTERNAL_ERROR", msg.clone(), None),
            AppError::InternalError(_) => (
                "INTERNAL_ERROR",
                "An internal server error occurred".to_string(),
                None,
            ),
        };

        ErrorDetail {
            code: code.to_string(),
            kind: self.kind(),
            message,
            field,
        }
    }
}

impl From<DomainError> for AppError {
    fn from(err: DomainError) -> Self {
        match err {
            DomainError::InvalidTransition { .. } => AppError::InvalidStateTransition(err.to_string()),
            DomainError::InsufficientStock { .. } => AppError::InsufficientStock(err.to_string()),
            DomainError::Validation { field, message } => AppError::Validation { field, message },
        }
    }
}

impl From<validator::ValidationErrors> for AppError {
    fn from(err: validator::ValidationErrors) -> Self {
        AppError::ValidationError(err.to_string())
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status_code();

        if status.is_server_error() {
            tracing::error!("Error: {:?}", self);
        } else {
            tracing::warn!(kind = ?self.kind(), "Request rejected: {}", self);
        }

        (status, Json(ErrorResponse { error: self.detail() })).into_response()
    }
}

/// Result type alias for handlers
pub type AppResult<T> = Result<T, AppError>;

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal::Decimal;
    use shared::{OrderAction, OrderStatus};
    use uuid::Uuid;

    #[test]
    fn test_taxonomy_maps_to_distinct_statuses() {
        assert_eq!(
            AppError::not_found("Product").status_code(),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            AppError::Conflict {
                resource: "sku".into(),
                message: "taken".into()
            }
            .status_code(),
            StatusCode::CONFLICT
        );
        assert_eq!(
            AppError::BusinessRule("nope".into()).status_code(),
            StatusCode::UNPROCESSABLE_ENTITY
        );
        assert_eq!(
            AppError::ValidationError("bad".into()).status_code(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            AppError::Internal("boom".into()).status_code(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn test_domain_transition_error_is_business_rule() {
        let err: AppError = DomainError::InvalidTransition {
            action: OrderAction::Confirm,
            status: OrderStatus::Completed,
        }
        .into();
        assert_eq!(err.kind(), ErrorKind::BusinessRule);
        assert!(err.detail().message.contains("Current status: Completed"));
    }

    #[test]
    fn test_insufficient_stock_message_cites_quantities() {
        let err: AppError = DomainError::InsufficientStock {
            product_id: Uuid::new_v4(),
            product_name: "Q".into(),
            available: Decimal::from(5),
            required: Decimal::from(10),
        }
        .into();
        let detail = err.detail();
        assert_eq!(detail.code, "INSUFFICIENT_STOCK");
        assert_eq!(
            detail.message,
            "Insufficient stock for 'Q'. Available: 5, Required: 10"
        );
    }

    #[test]
    fn test_domain_validation_keeps_field() {
        let err: AppError = DomainError::validation("lines", "empty").into();
        let detail = err.detail();
        assert_eq!(detail.kind, ErrorKind::Validation);
        assert_eq!(detail.field.as_deref(), Some("lines"));
    }

    #[test]
    fn test_response_status() {
        let response = AppError::not_found("Sale Order").into_response();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[test]
    fn test_response_body_shape() {
        let response = AppError::Conflict {
            resource: "sku".into(),
            message: "SKU 'A-1' already exists.".into(),
        }
        .into_response();

        let bytes = tokio_test::block_on(axum::body::to_bytes(response.into_body(), usize::MAX))
            .unwrap();
        let body: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(body["error"]["code"], "CONFLICT");
        assert_eq!(body["error"]["kind"], "conflict");
        assert_eq!(body["error"]["field"], "sku");
    }
}
