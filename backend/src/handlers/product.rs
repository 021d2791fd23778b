//! HTTP handlers for the product catalog

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use shared::Product;
use uuid::Uuid;

use crate::{
    error::AppResult,
    services::{
        product::{CreateProductInput, UpdateProductInput},
        ProductService,
    },
    AppState,
};

pub async fn list_products(State(state): State<AppState>) -> AppResult<Json<Vec<Product>>> {
    let products = ProductService::new(state.db).list_products().await?;
    Ok(Json(products))
}

/// Active products at or below their reorder level
pub async fn list_low_stock(State(state): State<AppState>) -> AppResult<Json<Vec<Product>>> {
    let products = ProductService::new(state.db).list_low_stock().await?;
    Ok(Json(products))
}

pub async fn get_product(
    State(state): State<AppState>,
    Path(product_id): Path<Uuid>,
) -> AppResult<Json<Product>> {
    let product = ProductService::new(state.db).get_product(product_id).await?;
    Ok(Json(product))
}

pub async fn create_product(
    State(state): State<AppState>,
    Json(input): Json<CreateProductInput>,
) -> AppResult<impl IntoResponse> {
    let product = ProductService::new(state.db).create_product(input).await?;
    Ok((StatusCode::CREATED, Json(product)))
}

pub async fn update_product(
    State(state): State<AppState>,
    Path(product_id): Path<Uuid>,
    Json(input): Json<UpdateProductInput>,
) -> AppResult<Json<Product>> {
    let product = ProductService::new(state.db)
        .update_product(product_id, input)
        .await?;
    Ok(Json(product))
}

pub async fn delete_product(
    State(state): State<AppState>,
    Path(product_id): Path<Uuid>,
) -> AppResult<StatusCode> {
    ProductService::new(state.db).delete_product(product_id).await?;
    Ok(StatusCode::NO_CONTENT)
}
