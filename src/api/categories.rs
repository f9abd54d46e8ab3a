use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
};
use serde::Deserialize;
use serde_json::json;

use crate::api::error_response;
use crate::cache::Collection;
use crate::services::category_service;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct CategoryInput {
    pub name: String,
}

pub async fn list_categories(State(state): State<AppState>) -> impl IntoResponse {
    match state.cache.categories(state.db()).await {
        Ok(categories) => (
            StatusCode::OK,
            Json(json!({
                "categories": categories,
                "total": categories.len()
            })),
        )
            .into_response(),
        Err(e) => error_response(e).into_response(),
    }
}

pub async fn create_category(
    State(state): State<AppState>,
    Json(input): Json<CategoryInput>,
) -> impl IntoResponse {
    let result = category_service::create_category(state.db(), &input.name).await;
    state.cache.invalidate(Collection::Categories);

    match result {
        Ok(category) => (
            StatusCode::CREATED,
            Json(json!({
                "message": "Category created successfully",
                "category": category
            })),
        )
            .into_response(),
        Err(e) => error_response(e).into_response(),
    }
}

pub async fn update_category(
    State(state): State<AppState>,
    Path(id): Path<i32>,
    Json(input): Json<CategoryInput>,
) -> impl IntoResponse {
    let result = category_service::update_category(state.db(), id, &input.name).await;
    state.cache.invalidate(Collection::Categories);

    match result {
        Ok(category) => (
            StatusCode::OK,
            Json(json!({
                "message": "Category updated successfully",
                "category": category
            })),
        )
            .into_response(),
        Err(e) => error_response(e).into_response(),
    }
}

/// Products referencing the category keep their rows; the schema clears
/// the foreign key, so the product cache is refreshed as well.
pub async fn delete_category(
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> impl IntoResponse {
    let result = category_service::delete_category(state.db(), id).await;
    state.cache.invalidate(Collection::Categories);
    state.cache.invalidate(Collection::Products);

    match result {
        Ok(()) => (
            StatusCode::OK,
            Json(json!({ "message": "Category deleted successfully" })),
        )
            .into_response(),
        Err(e) => error_response(e).into_response(),
    }
}
