//! HTTP handlers for suppliers and customers
//!
//! Mounted twice; the router attaches the [`CounterpartyKind`] as an extension.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    Extension, Json,
};
use shared::{Counterparty, CounterpartyKind};
use uuid::Uuid;

use crate::{
    error::AppResult,
    services::{counterparty::CounterpartyInput, CounterpartyService},
    AppState,
};

pub async fn list_counterparties(
    State(state): State<AppState>,
    Extension(kind): Extension<CounterpartyKind>,
) -> AppResult<Json<Vec<Counterparty>>> {
    let records = CounterpartyService::new(state.db, kind).list().await?;
    Ok(Json(records))
}

pub async fn get_counterparty(
    State(state): State<AppState>,
    Extension(kind): Extension<CounterpartyKind>,
    Path(id): Path<Uuid>,
) -> AppResult<Json<Counterparty>> {
    let record = CounterpartyService::new(state.db, kind).get(id).await?;
    Ok(Json(record))
}

pub async fn create_counterparty(
    State(state): State<AppState>,
    Extension(kind): Extension<CounterpartyKind>,
    Json(input): Json<CounterpartyInput>,
) -> AppResult<impl IntoResponse> {
    let record = CounterpartyService::new(state.db, kind).create(input).await?;
    Ok((StatusCode::CREATED, Json(record)))
}

pub async fn update_counterparty(
    State(state): State<AppState>,
    Extension(kind): Extension<CounterpartyKind>,
    Path(id): Path<Uuid>,
    Json(input): Json<CounterpartyInput>,
) -> AppResult<Json<Counterparty>> {
    let record = CounterpartyService::new(state.db, kind)
        .update(id, input)
        .await?;
    Ok(Json(record))
}

pub async fn delete_counterparty(
    State(state): State<AppState>,
    Extension(kind): Extension<CounterpartyKind>,
    Path(id): Path<Uuid>,
) -> AppResult<StatusCode> {
    CounterpartyService::new(state.db, kind).delete(id).await?;
    Ok(StatusCode::NO_CONTENT)
}
