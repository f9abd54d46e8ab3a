pub mod categories;
pub mod health;
pub mod import;
pub mod markets;
pub mod products;
pub mod suppliers;

use axum::{
    Json, Router,
    http::StatusCode,
    routing::{get, post, put},
};
use serde_json::{Value, json};

use crate::domain::DomainError;
use crate::state::AppState;

pub fn api_router(state: AppState) -> Router {
    Router::new()
        // Health check
        .route("/health", get(health::health_check))
        // Products
        .route(
            "/products",
            get(products::list_products).post(products::create_product),
        )
        .route(
            "/products/:id",
            put(products::update_product).delete(products::delete_product),
        )
        .route(
            "/products/:id/status",
            axum::routing::patch(products::update_product_status),
        )
        // Suppliers
        .route(
            "/suppliers",
            get(suppliers::list_suppliers).post(suppliers::create_supplier),
        )
        .route(
            "/suppliers/:id",
            put(suppliers::update_supplier).delete(suppliers::delete_supplier),
        )
        .route(
            "/suppliers/:id/restock-share",
            get(suppliers::restock_share),
        )
        .route(
            "/suppliers/:id/purchase-order",
            get(suppliers::purchase_order),
        )
        // Markets
        .route(
            "/markets",
            get(markets::list_markets).post(markets::create_market),
        )
        .route(
            "/markets/:id",
            put(markets::update_market).delete(markets::delete_market),
        )
        // Categories
        .route(
            "/categories",
            get(categories::list_categories).post(categories::create_category),
        )
        .route(
            "/categories/:id",
            put(categories::update_category).delete(categories::delete_category),
        )
        // Bulk import
        .route("/import/products", post(import::import_products_file))
        .with_state(state)
}

/// Map a domain error onto the wire. Handlers return this from their
/// error arms so the taxonomy stays in one place.
pub(crate) fn error_response(err: DomainError) -> (StatusCode, Json<Value>) {
    let status = match &err {
        DomainError::NotFound => StatusCode::NOT_FOUND,
        DomainError::Validation(_) => StatusCode::BAD_REQUEST,
        DomainError::Conflict(_) => StatusCode::CONFLICT,
        DomainError::Database(_) => StatusCode::INTERNAL_SERVER_ERROR,
    };
    (status, Json(json!({ "error": err.to_string() })))
}
