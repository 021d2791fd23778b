//! Route definitions for the StockHub API

use axum::{
    routing::{delete, get, post},
    Extension, Router,
};
use shared::{CounterpartyKind, OrderKind};

use crate::{handlers, AppState};

/// Create API routes
pub fn api_routes() -> Router<AppState> {
    Router::new()
        .route("/health", get(handlers::health_check))
        .nest("/purchase-orders", order_routes(OrderKind::Purchase))
        .nest("/sale-orders", order_routes(OrderKind::Sale))
        .nest("/stock", stock_routes())
        .nest("/products", product_routes())
        .nest("/categories", category_routes())
        .nest("/units", unit_routes())
        .nest("/suppliers", counterparty_routes(CounterpartyKind::Supplier))
        .nest("/customers", counterparty_routes(CounterpartyKind::Customer))
        .nest("/reports", report_routes())
}

/// Order lifecycle routes, shared by both order kinds
fn order_routes(kind: OrderKind) -> Router<AppState> {
    Router::new()
        .route("/", get(handlers::list_orders).post(handlers::create_order))
        .route("/:order_id", get(handlers::get_order))
        .route("/:order_id/confirm", post(handlers::confirm_order))
        .route("/:order_id/complete", post(handlers::complete_order))
        .route("/:order_id/cancel", post(handlers::cancel_order))
        .layer(Extension(kind))
}

/// Stock ledger routes
fn stock_routes() -> Router<AppState> {
    Router::new()
        .route("/movements", get(handlers::list_movements))
        .route("/adjust", post(handlers::adjust_stock))
        .route("/:product_id/current", get(handlers::get_current_stock))
}

/// Product catalog routes
fn product_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(handlers::list_products).post(handlers::create_product))
        .route("/low-stock", get(handlers::list_low_stock))
        .route(
            "/:product_id",
            get(handlers::get_product)
                .put(handlers::update_product)
                .delete(handlers::delete_product),
        )
}

fn category_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(handlers::list_categories).post(handlers::create_category))
        .route(
            "/:category_id",
            get(handlers::get_category)
                .put(handlers::update_category)
                .delete(handlers::delete_category),
        )
}

fn unit_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(handlers::list_units).post(handlers::create_unit))
        .route("/:unit_id", delete(handlers::delete_unit))
}

/// Supplier or customer routes
fn counterparty_routes(kind: CounterpartyKind) -> Router<AppState> {
    Router::new()
        .route(
            "/",
            get(handlers::list_counterparties).post(handlers::create_counterparty),
        )
        .route(
            "/:id",
            get(handlers::get_counterparty)
                .put(handlers::update_counterparty)
                .delete(handlers::delete_counterparty),
        )
        .layer(Extension(kind))
}

/// Report routes
fn report_routes() -> Router<AppState> {
    Router::new()
        .route("/stock-summary", get(handlers::get_stock_summary))
        .route("/sales-summary", get(handlers::get_sales_summary))
}
