use axum::{
    Json,
    extract::{Path, Query, State},
    http::{HeaderMap, StatusCode, header},
    response::IntoResponse,
};
use serde::{Deserialize, Serialize};
use serde_json::json;
use utoipa::IntoParams;

use crate::api::error_response;
use crate::cache::Collection;
use crate::catalog::{self, AlertScope};
use crate::models::supplier;
use crate::orders;
use crate::services::supplier_service::{self, SupplierInput};
use crate::state::AppState;

#[derive(Debug, Default, Deserialize, IntoParams)]
pub struct SupplierQuery {
    /// Market id restricting which alerts count; absent or unparseable means all markets.
    pub market: Option<String>,
}

fn alert_scope(param: Option<&str>) -> AlertScope {
    match param.and_then(|raw| raw.parse().ok()) {
        Some(id) => AlertScope::Market(id),
        None => AlertScope::All,
    }
}

/// Supplier plus the number of its products needing a reorder.
#[derive(Debug, Serialize)]
pub struct SupplierListEntry {
    #[serde(flatten)]
    pub supplier: supplier::Model,
    pub alert_count: usize,
}

#[utoipa::path(
    get,
    path = "/api/suppliers",
    responses(
        (status = 200, description = "Suppliers with per-supplier reorder alert counts")
    )
)]
pub async fn list_suppliers(
    State(state): State<AppState>,
    Query(query): Query<SupplierQuery>,
) -> impl IntoResponse {
    let suppliers = match state.cache.suppliers(state.db()).await {
        Ok(suppliers) => suppliers,
        Err(e) => return error_response(e).into_response(),
    };
    let products = match state.cache.products(state.db()).await {
        Ok(products) => products,
        Err(e) => return error_response(e).into_response(),
    };

    let scope = alert_scope(query.market.as_deref());
    let entries: Vec<SupplierListEntry> = suppliers
        .into_iter()
        .map(|s| {
            let alert_count = catalog::supplier_alert_count(&products, s.id, scope);
            SupplierListEntry {
                supplier: s,
                alert_count,
            }
        })
        .collect();

    (
        StatusCode::OK,
        Json(json!({
            "suppliers": entries,
            "total": entries.len()
        })),
    )
        .into_response()
}

#[utoipa::path(
    post,
    path = "/api/suppliers",
    responses(
        (status = 201, description = "Supplier created"),
        (status = 400, description = "Missing supplier name")
    )
)]
pub async fn create_supplier(
    State(state): State<AppState>,
    Json(input): Json<SupplierInput>,
) -> impl IntoResponse {
    let result = supplier_service::create_supplier(state.db(), input).await;
    state.cache.invalidate(Collection::Suppliers);

    match result {
        Ok(supplier) => (
            StatusCode::CREATED,
            Json(json!({
                "message": "Supplier created successfully",
                "supplier": supplier
            })),
        )
            .into_response(),
        Err(e) => error_response(e).into_response(),
    }
}

pub async fn update_supplier(
    State(state): State<AppState>,
    Path(id): Path<i32>,
    Json(input): Json<SupplierInput>,
) -> impl IntoResponse {
    let result = supplier_service::update_supplier(state.db(), id, input).await;
    state.cache.invalidate(Collection::Suppliers);

    match result {
        Ok(supplier) => (
            StatusCode::OK,
            Json(json!({
                "message": "Supplier updated successfully",
                "supplier": supplier
            })),
        )
            .into_response(),
        Err(e) => error_response(e).into_response(),
    }
}

/// Products keep their rows when a supplier goes; the foreign key is
/// cleared by the schema, so the product cache goes stale too.
pub async fn delete_supplier(
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> impl IntoResponse {
    let result = supplier_service::delete_supplier(state.db(), id).await;
    state.cache.invalidate(Collection::Suppliers);
    state.cache.invalidate(Collection::Products);

    match result {
        Ok(()) => (
            StatusCode::OK,
            Json(json!({ "message": "Supplier deleted successfully" })),
        )
            .into_response(),
        Err(e) => error_response(e).into_response(),
    }
}

/// Restock list for one supplier with ready-to-send share links.
pub async fn restock_share(
    State(state): State<AppState>,
    Path(id): Path<i32>,
    Query(query): Query<SupplierQuery>,
) -> impl IntoResponse {
    let supplier = match supplier_service::get_supplier(state.db(), id).await {
        Ok(supplier) => supplier,
        Err(e) => return error_response(e).into_response(),
    };
    let products = match state.cache.products(state.db()).await {
        Ok(products) => products,
        Err(e) => return error_response(e).into_response(),
    };

    let scope = alert_scope(query.market.as_deref());
    let scoped = catalog::supplier_products(&products, id, scope);
    let critical = orders::critical_products(&scoped);
    let message = orders::restock_message(&supplier, &critical);

    let tel_url = supplier.phone_number.as_deref().map(orders::dial_link);
    let whatsapp_url = supplier
        .phone_number
        .as_deref()
        .map(|phone| orders::whatsapp_link(phone, &message));

    (
        StatusCode::OK,
        Json(json!({
            "supplier": supplier,
            "products": critical,
            "message": message,
            "tel_url": tel_url,
            "whatsapp_url": whatsapp_url
        })),
    )
        .into_response()
}

/// Purchase order for one supplier as a plain-text download.
pub async fn purchase_order(
    State(state): State<AppState>,
    Path(id): Path<i32>,
    Query(query): Query<SupplierQuery>,
) -> impl IntoResponse {
    let supplier = match supplier_service::get_supplier(state.db(), id).await {
        Ok(supplier) => supplier,
        Err(e) => return error_response(e).into_response(),
    };
    let products = match state.cache.products(state.db()).await {
        Ok(products) => products,
        Err(e) => return error_response(e).into_response(),
    };
    let categories = match state.cache.categories(state.db()).await {
        Ok(categories) => categories,
        Err(e) => return error_response(e).into_response(),
    };

    let scope = alert_scope(query.market.as_deref());
    let scoped = catalog::supplier_products(&products, id, scope);
    let critical = orders::critical_products(&scoped);

    let order = orders::build_purchase_order(&supplier, &critical, &categories);
    let document = order.render_text();

    // Supplier names may carry accents; the order number is always ASCII
    let filename = format!("Bon-de-Commande-{}.txt", order.order_number);

    let mut headers = HeaderMap::new();
    headers.insert(
        header::CONTENT_TYPE,
        "text/plain; charset=utf-8".parse().unwrap(),
    );
    headers.insert(
        header::CONTENT_DISPOSITION,
        format!("attachment; filename=\"{}\"", filename)
            .parse()
            .unwrap(),
    );

    (StatusCode::OK, headers, document).into_response()
}
