//! HTTP handlers for purchase and sale orders
//!
//! The same handlers serve both `/purchase-orders` and `/sale-orders`; the
//! router attaches the [`OrderKind`] as an extension.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    Extension, Json,
};
use shared::{CreateOrderInput, Order, OrderKind};
use uuid::Uuid;

use crate::{error::AppResult, services::OrderService, AppState};

/// List orders, newest first
pub async fn list_orders(
    State(state): State<AppState>,
    Extension(kind): Extension<OrderKind>,
) -> AppResult<Json<Vec<Order>>> {
    let orders = OrderService::new(state.db, kind).list().await?;
    Ok(Json(orders))
}

/// Create a Draft order
pub async fn create_order(
    State(state): State<AppState>,
    Extension(kind): Extension<OrderKind>,
    Json(input): Json<CreateOrderInput>,
) -> AppResult<impl IntoResponse> {
    let order = OrderService::new(state.db, kind).create(input).await?;
    Ok((StatusCode::CREATED, Json(order)))
}

/// Get one order with its lines
pub async fn get_order(
    State(state): State<AppState>,
    Extension(kind): Extension<OrderKind>,
    Path(order_id): Path<Uuid>,
) -> AppResult<Json<Order>> {
    let order = OrderService::new(state.db, kind).get_by_id(order_id).await?;
    Ok(Json(order))
}

pub async fn confirm_order(
    State(state): State<AppState>,
    Extension(kind): Extension<OrderKind>,
    Path(order_id): Path<Uuid>,
) -> AppResult<Json<Order>> {
    let order = OrderService::new(state.db, kind).confirm(order_id).await?;
    Ok(Json(order))
}

/// Complete an order and post its stock movements
pub async fn complete_order(
    State(state): State<AppState>,
    Extension(kind): Extension<OrderKind>,
    Path(order_id): Path<Uuid>,
) -> AppResult<Json<Order>> {
    let order = OrderService::new(state.db, kind).complete(order_id).await?;
    Ok(Json(order))
}

pub async fn cancel_order(
    State(state): State<AppState>,
    Extension(kind): Extension<OrderKind>,
    Path(order_id): Path<Uuid>,
) -> AppResult<StatusCode> {
    OrderService::new(state.db, kind).cancel(order_id).await?;
    Ok(StatusCode::NO_CONTENT)
}
