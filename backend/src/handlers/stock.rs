//! HTTP handlers for the stock ledger

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use shared::StockMovement;
use uuid::Uuid;

use crate::{
    error::AppResult,
    services::{stock::AdjustStockInput, StockService},
    AppState,
};

#[derive(Debug, Deserialize)]
pub struct MovementQuery {
    pub product_id: Option<Uuid>,
}

#[derive(Debug, Serialize)]
pub struct CurrentStockResponse {
    pub product_id: Uuid,
    pub current_stock: Decimal,
}

fn stock_service(state: AppState) -> StockService {
    StockService::new(state.db, state.config.stock.recent_movements_limit)
}

/// Movements for one product, or the most recent ones overall
pub async fn list_movements(
    State(state): State<AppState>,
    Query(query): Query<MovementQuery>,
) -> AppResult<Json<Vec<StockMovement>>> {
    let movements = stock_service(state).list_movements(query.product_id).await?;
    Ok(Json(movements))
}

pub async fn get_current_stock(
    State(state): State<AppState>,
    Path(product_id): Path<Uuid>,
) -> AppResult<Json<CurrentStockResponse>> {
    let current_stock = stock_service(state).get_balance(product_id).await?;
    Ok(Json(CurrentStockResponse {
        product_id,
        current_stock,
    }))
}

/// Post a manual adjustment
pub async fn adjust_stock(
    State(state): State<AppState>,
    Json(input): Json<AdjustStockInput>,
) -> AppResult<impl IntoResponse> {
    let movement = stock_service(state).adjust(input).await?;
    Ok((StatusCode::CREATED, Json(movement)))
}
