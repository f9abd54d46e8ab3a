//! Bulk product import from CSV.
//!
//! The file is parsed in one pass, rows are resolved against the existing
//! collections by name, and every surviving row becomes an independent
//! product insert. There is no transaction around the batch: rows that
//! fail are logged and counted, the rest go through.

use std::collections::HashMap;

use sea_orm::DatabaseConnection;
use serde::{Deserialize, Serialize};

use crate::domain::DomainError;
use crate::models::{category, market, supplier};
use crate::services::product_service::{self, NewProduct};
use crate::services::{category_service, market_service, supplier_service};

/// One CSV line, keyed by the header row. References are plain names,
/// resolved later; prices stay text until parsed so a stray value does
/// not fail the whole file.
#[derive(Debug, Deserialize)]
pub struct CsvProductRow {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub code: Option<String>,
    #[serde(default)]
    pub category: String,
    #[serde(default)]
    pub supplier: Option<String>,
    #[serde(default)]
    pub market: Option<String>,
    #[serde(default)]
    pub purchase_price: Option<String>,
    #[serde(default)]
    pub sale_price: Option<String>,
    #[serde(default)]
    pub status: Option<String>,
}

/// Outcome counters for one import run. `imported` is rows actually
/// created, never the file's row count.
#[derive(Debug, Clone, Serialize)]
pub struct ImportReport {
    pub total_rows: usize,
    pub imported: usize,
    pub skipped: usize,
    pub failed: usize,
}

pub fn parse_products_csv(content: &[u8]) -> Result<Vec<CsvProductRow>, String> {
    let mut rdr = csv::ReaderBuilder::new()
        .has_headers(true)
        .from_reader(content);

    let mut rows = Vec::new();

    for result in rdr.deserialize() {
        let record: CsvProductRow = result.map_err(|e| format!("CSV parse error: {}", e))?;
        rows.push(record);
    }

    Ok(rows)
}

fn parse_price(raw: &Option<String>) -> Option<f64> {
    raw.as_deref().and_then(|s| s.trim().parse().ok())
}

/// Turn parsed rows into create inputs.
///
/// Name and category are mandatory; a row missing either, or naming a
/// category that does not exist, is dropped with a log line. Supplier and
/// market names that do not resolve degrade to no reference. All name
/// matching is case-insensitive and trimmed.
pub fn resolve_rows(
    rows: Vec<CsvProductRow>,
    categories: &[category::Model],
    suppliers: &[supplier::Model],
    markets: &[market::Model],
) -> Vec<NewProduct> {
    let categories_by_name: HashMap<String, i32> = categories
        .iter()
        .map(|c| (c.name.trim().to_lowercase(), c.id))
        .collect();
    let suppliers_by_name: HashMap<String, i32> = suppliers
        .iter()
        .map(|s| (s.name.trim().to_lowercase(), s.id))
        .collect();
    let markets_by_name: HashMap<String, i32> = markets
        .iter()
        .map(|m| (m.name.trim().to_lowercase(), m.id))
        .collect();

    let mut resolved = Vec::new();

    for row in rows {
        let name = row.name.trim().to_string();
        let category_name = row.category.trim().to_lowercase();
        if name.is_empty() || category_name.is_empty() {
            tracing::warn!("import row skipped: name and category are required");
            continue;
        }

        let Some(category_id) = categories_by_name.get(&category_name).copied() else {
            tracing::warn!(
                "import row '{}' skipped: unknown category '{}'",
                name,
                row.category.trim()
            );
            continue;
        };

        let supplier_id = row
            .supplier
            .as_deref()
            .map(|s| s.trim().to_lowercase())
            .and_then(|s| suppliers_by_name.get(&s).copied());
        let market_id = row
            .market
            .as_deref()
            .map(|m| m.trim().to_lowercase())
            .and_then(|m| markets_by_name.get(&m).copied());

        let status = row
            .status
            .as_deref()
            .map(str::trim)
            .and_then(crate::models::StockStatus::parse)
            .unwrap_or_default();

        resolved.push(NewProduct {
            name,
            code: row.code,
            status,
            supplier_id,
            category_id: Some(category_id),
            market_id,
            purchase_price: parse_price(&row.purchase_price),
            sale_price: parse_price(&row.sale_price),
        });
    }

    resolved
}

/// Run a full import: parse, resolve, create all rows concurrently.
pub async fn import_products(
    db: &DatabaseConnection,
    content: &[u8],
) -> Result<ImportReport, DomainError> {
    let rows = parse_products_csv(content).map_err(DomainError::Validation)?;
    let total_rows = rows.len();

    // Resolve against fresh collections, not cached ones: the file may
    // reference entities created since the last invalidation.
    let categories = category_service::fetch_categories(db).await?;
    let suppliers = supplier_service::fetch_suppliers(db).await?;
    let markets = market_service::fetch_markets(db).await?;

    let candidates = resolve_rows(rows, &categories, &suppliers, &markets);
    let skipped = total_rows - candidates.len();

    let results = futures::future::join_all(
        candidates
            .into_iter()
            .map(|input| product_service::create_product(db, input)),
    )
    .await;

    let mut imported = 0;
    let mut failed = 0;
    for result in results {
        match result {
            Ok(_) => imported += 1,
            Err(e) => {
                failed += 1;
                tracing::warn!("import row failed: {}", e);
            }
        }
    }

    tracing::info!(
        "CSV import done: {} rows, {} imported, {} skipped, {} failed",
        total_rows,
        imported,
        skipped,
        failed
    );

    Ok(ImportReport {
        total_rows,
        imported,
        skipped,
        failed,
    })
}
