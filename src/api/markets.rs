use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
};
use serde::{Deserialize, Serialize};
use serde_json::json;

use crate::api::error_response;
use crate::cache::Collection;
use crate::catalog;
use crate::models::market;
use crate::services::market_service;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct MarketInput {
    pub name: String,
}

/// Market plus the number of distinct products sold there.
#[derive(Debug, Serialize)]
pub struct MarketListEntry {
    #[serde(flatten)]
    pub market: market::Model,
    pub product_count: usize,
}

#[utoipa::path(
    get,
    path = "/api/markets",
    responses(
        (status = 200, description = "Markets with the number of products linked to each")
    )
)]
pub async fn list_markets(State(state): State<AppState>) -> impl IntoResponse {
    let markets = match state.cache.markets(state.db()).await {
        Ok(markets) => markets,
        Err(e) => return error_response(e).into_response(),
    };
    let products = match state.cache.products(state.db()).await {
        Ok(products) => products,
        Err(e) => return error_response(e).into_response(),
    };

    let entries: Vec<MarketListEntry> = markets
        .into_iter()
        .map(|m| {
            let product_count = catalog::market_product_count(&products, m.id);
            MarketListEntry {
                market: m,
                product_count,
            }
        })
        .collect();

    (
        StatusCode::OK,
        Json(json!({
            "markets": entries,
            "total": entries.len()
        })),
    )
        .into_response()
}

pub async fn create_market(
    State(state): State<AppState>,
    Json(input): Json<MarketInput>,
) -> impl IntoResponse {
    let result = market_service::create_market(state.db(), &input.name).await;
    state.cache.invalidate(Collection::Markets);

    match result {
        Ok(market) => (
            StatusCode::CREATED,
            Json(json!({
                "message": "Market created successfully",
                "market": market
            })),
        )
            .into_response(),
        Err(e) => error_response(e).into_response(),
    }
}

pub async fn update_market(
    State(state): State<AppState>,
    Path(id): Path<i32>,
    Json(input): Json<MarketInput>,
) -> impl IntoResponse {
    let result = market_service::update_market(state.db(), id, &input.name).await;
    state.cache.invalidate(Collection::Markets);

    match result {
        Ok(market) => (
            StatusCode::OK,
            Json(json!({
                "message": "Market updated successfully",
                "market": market
            })),
        )
            .into_response(),
        Err(e) => error_response(e).into_response(),
    }
}

#[utoipa::path(
    delete,
    path = "/api/markets/{id}",
    params(("id" = i32, Path, description = "Market id")),
    responses(
        (status = 200, description = "Market deleted"),
        (status = 409, description = "Refused while products are still linked to the market")
    )
)]
pub async fn delete_market(
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> impl IntoResponse {
    let result = market_service::delete_market(state.db(), id).await;
    state.cache.invalidate(Collection::Markets);

    match result {
        Ok(()) => (
            StatusCode::OK,
            Json(json!({ "message": "Market deleted successfully" })),
        )
            .into_response(),
        Err(e) => error_response(e).into_response(),
    }
}
