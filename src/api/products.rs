use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
};
use serde::Deserialize;
use serde_json::json;
use utoipa::IntoParams;

use crate::api::error_response;
use crate::cache::Collection;
use crate::catalog::{self, CategoryFilter, MarketFilter, StatusFilter};
use crate::models::StockStatus;
use crate::services::product_service::{self, NewProduct, ProductSync, ProductUpdate};
use crate::state::AppState;

#[derive(Debug, Default, Deserialize, IntoParams)]
pub struct ProductListQuery {
    /// Market id, or the `all` sentinel; absent means every market.
    pub market: Option<String>,
    /// `low` or `out`; anything else passes all statuses.
    pub status: Option<String>,
    /// Free text matched against name and code.
    pub q: Option<String>,
    pub category: Option<i32>,
}

fn market_filter(param: Option<&str>) -> MarketFilter {
    // "all", empty and unparseable values all mean no market filter
    match param {
        Some(raw) => raw.parse().map(MarketFilter::Only).unwrap_or_default(),
        None => MarketFilter::Any,
    }
}

fn status_filter(param: Option<&str>) -> StatusFilter {
    match param {
        Some("low") => StatusFilter::Low,
        Some("out") => StatusFilter::Out,
        _ => StatusFilter::All,
    }
}

#[utoipa::path(
    get,
    path = "/api/products",
    responses(
        (status = 200, description = "Products with market links, filtered, in catalogue order")
    )
)]
pub async fn list_products(
    State(state): State<AppState>,
    Query(query): Query<ProductListQuery>,
) -> impl IntoResponse {
    let products = match state.cache.products(state.db()).await {
        Ok(products) => products,
        Err(e) => return error_response(e).into_response(),
    };

    let market = market_filter(query.market.as_deref());
    let status = status_filter(query.status.as_deref());
    let category = query.category.map(CategoryFilter::Only).unwrap_or_default();
    let q = query.q.unwrap_or_default();

    let mut filtered: Vec<_> = products
        .into_iter()
        .filter(|p| market.matches(p))
        .filter(|p| category.matches(p))
        .filter(|p| status.matches(p))
        .filter(|p| catalog::name_matches(p, &q) || catalog::code_matches(p, &q))
        .collect();
    catalog::catalogue_order(&mut filtered);

    (
        StatusCode::OK,
        Json(json!({
            "products": filtered,
            "total": filtered.len()
        })),
    )
        .into_response()
}

#[utoipa::path(
    post,
    path = "/api/products",
    responses(
        (status = 201, description = "Product created; a failed market link is logged, not fatal"),
        (status = 400, description = "Missing product name")
    )
)]
pub async fn create_product(
    State(state): State<AppState>,
    Json(input): Json<NewProduct>,
) -> impl IntoResponse {
    let result = product_service::create_product(state.db(), input).await;
    state.cache.invalidate(Collection::Products);

    match result {
        Ok(product) => (
            StatusCode::CREATED,
            Json(json!({
                "message": "Product created successfully",
                "product": product
            })),
        )
            .into_response(),
        Err(e) => error_response(e).into_response(),
    }
}

#[utoipa::path(
    put,
    path = "/api/products/{id}",
    params(("id" = i32, Path, description = "Product id")),
    responses(
        (status = 200, description = "Scalars updated and market links replaced"),
        (status = 404, description = "Product not found"),
        (status = 409, description = "Scalars updated but the previous link set was kept"),
        (status = 500, description = "Link state undefined after a failed restore")
    )
)]
pub async fn update_product(
    State(state): State<AppState>,
    Path(id): Path<i32>,
    Json(input): Json<ProductUpdate>,
) -> impl IntoResponse {
    let result = product_service::update_product(state.db(), id, input).await;
    state.cache.invalidate(Collection::Products);

    match result {
        Ok(sync) => {
            let (status_code, message) = match &sync {
                ProductSync::Replaced => (StatusCode::OK, "Product updated successfully"),
                ProductSync::KeptPrevious { .. } => (
                    StatusCode::CONFLICT,
                    "Market links could not be replaced, previous set kept",
                ),
                ProductSync::Inconsistent { .. } => (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Market links are in an undefined state",
                ),
            };
            let product = product_service::get_product(state.db(), id).await.ok();
            (
                status_code,
                Json(json!({
                    "message": message,
                    "product": product,
                    "sync": sync
                })),
            )
                .into_response()
        }
        Err(e) => error_response(e).into_response(),
    }
}

#[derive(Debug, Deserialize)]
pub struct StatusUpdate {
    pub status: StockStatus,
}

pub async fn update_product_status(
    State(state): State<AppState>,
    Path(id): Path<i32>,
    Json(payload): Json<StatusUpdate>,
) -> impl IntoResponse {
    let result = product_service::update_product_status(state.db(), id, payload.status).await;
    state.cache.invalidate(Collection::Products);

    match result {
        Ok(product) => (
            StatusCode::OK,
            Json(json!({
                "message": "Status updated successfully",
                "product": product
            })),
        )
            .into_response(),
        Err(e) => error_response(e).into_response(),
    }
}

#[utoipa::path(
    delete,
    path = "/api/products/{id}",
    params(("id" = i32, Path, description = "Product id")),
    responses(
        (status = 200, description = "Product deleted; market links cascade")
    )
)]
pub async fn delete_product(
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> impl IntoResponse {
    let result = product_service::delete_product(state.db(), id).await;
    state.cache.invalidate(Collection::Products);

    match result {
        Ok(()) => (
            StatusCode::OK,
            Json(json!({ "message": "Product deleted successfully" })),
        )
            .into_response(),
        Err(e) => error_response(e).into_response(),
    }
}
