use axum::{
    Json,
    extract::{Multipart, State},
    http::StatusCode,
    response::IntoResponse,
};
use serde_json::json;

use crate::api::error_response;
use crate::cache::Collection;
use crate::import;
use crate::state::AppState;

#[utoipa::path(
    post,
    path = "/api/import/products",
    responses(
        (status = 200, description = "Import report: total, imported, skipped, failed"),
        (status = 400, description = "No file field, or the CSV could not be parsed")
    )
)]
pub async fn import_products_file(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> impl IntoResponse {
    while let Some(field) = multipart.next_field().await.unwrap_or(None) {
        if field.name() == Some("file") {
            let data = field.bytes().await.unwrap_or_default();
            let result = import::import_products(state.db(), &data).await;
            // Even a failed import may have written some rows
            state.cache.invalidate(Collection::Products);

            return match result {
                Ok(report) => (
                    StatusCode::OK,
                    Json(json!({
                        "message": "Import finished",
                        "report": report
                    })),
                )
                    .into_response(),
                Err(e) => error_response(e).into_response(),
            };
        }
    }
    (StatusCode::BAD_REQUEST, "No file uploaded").into_response()
}
