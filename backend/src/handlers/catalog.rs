//! HTTP handlers for categories and units

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use shared::{Category, Unit};
use uuid::Uuid;

use crate::{
    error::AppResult,
    services::{category::CategoryInput, unit::CreateUnitInput, CategoryService, UnitService},
    AppState,
};

pub async fn list_categories(State(state): State<AppState>) -> AppResult<Json<Vec<Category>>> {
    let categories = CategoryService::new(state.db).list_categories().await?;
    Ok(Json(categories))
}

pub async fn get_category(
    State(state): State<AppState>,
    Path(category_id): Path<Uuid>,
) -> AppResult<Json<Category>> {
    let category = CategoryService::new(state.db).get_category(category_id).await?;
    Ok(Json(category))
}

pub async fn create_category(
    State(state): State<AppState>,
    Json(input): Json<CategoryInput>,
) -> AppResult<impl IntoResponse> {
    let category = CategoryService::new(state.db).create_category(input).await?;
    Ok((StatusCode::CREATED, Json(category)))
}

pub async fn update_category(
    State(state): State<AppState>,
    Path(category_id): Path<Uuid>,
    Json(input): Json<CategoryInput>,
) -> AppResult<Json<Category>> {
    let category = CategoryService::new(state.db)
        .update_category(category_id, input)
        .await?;
    Ok(Json(category))
}

pub async fn delete_category(
    State(state): State<AppState>,
    Path(category_id): Path<Uuid>,
) -> AppResult<StatusCode> {
    CategoryService::new(state.db).delete_category(category_id).await?;
    Ok(StatusCode::NO_CONTENT)
}

pub async fn list_units(State(state): State<AppState>) -> AppResult<Json<Vec<Unit>>> {
    let units = UnitService::new(state.db).list_units().await?;
    Ok(Json(units))
}

pub async fn create_unit(
    State(state): State<AppState>,
    Json(input): Json<CreateUnitInput>,
) -> AppResult<impl IntoResponse> {
    let unit = UnitService::new(state.db).create_unit(input).await?;
    Ok((StatusCode::CREATED, Json(unit)))
}

pub async fn delete_unit(
    State(state): State<AppState>,
    Path(unit_id): Path<Uuid>,
) -> AppResult<StatusCode> {
    UnitService::new(state.db).delete_unit(unit_id).await?;
    Ok(StatusCode::NO_CONTENT)
}
