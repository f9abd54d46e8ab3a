//! Product Service - stock rows and their market links
//!
//! Products and their market links live in separate tables and are written
//! in separate steps, never under one transaction. The functions here keep
//! the two-step semantics explicit: a product row is always preserved, the
//! link set degrades or rolls back on its own.
#![allow(clippy::needless_update)] // SeaORM ActiveModels require ..Default::default()

use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, Set,
};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::domain::DomainError;
use crate::models::product::{
    ActiveModel as ProductActiveModel, Entity as ProductEntity, ProductWithMarkets, StockStatus,
};
use crate::models::product_market;
use crate::models::product_market::{ActiveModel as LinkActiveModel, Entity as LinkEntity};

/// Input for creating a product, from the form or a CSV row.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct NewProduct {
    pub name: String,
    pub code: Option<String>,
    #[serde(default)]
    pub status: StockStatus,
    pub supplier_id: Option<i32>,
    pub category_id: Option<i32>,
    /// Single market picked in the create form, if any.
    pub market_id: Option<i32>,
    pub purchase_price: Option<f64>,
    pub sale_price: Option<f64>,
}

/// Full edited record for an update, including the desired market link set.
#[derive(Debug, Clone, Deserialize)]
pub struct ProductUpdate {
    pub name: String,
    pub code: Option<String>,
    #[serde(default)]
    pub status: StockStatus,
    pub supplier_id: Option<i32>,
    pub category_id: Option<i32>,
    #[serde(default)]
    pub market_ids: Vec<i32>,
    pub purchase_price: Option<f64>,
    pub sale_price: Option<f64>,
}

/// Terminal state of the market-link replacement inside a product update.
/// The scalar row update has already succeeded in every variant.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "links", rename_all = "snake_case")]
pub enum ProductSync {
    /// The persisted link set now equals the submitted one.
    Replaced,
    /// Replacement failed but the previous link set is still in place.
    KeptPrevious { reason: String },
    /// Replacement failed and the previous set could not be restored.
    /// The link set is undefined and needs manual reconciliation.
    Inconsistent { reason: String },
}

fn normalize_code(code: Option<String>) -> Option<String> {
    code.map(|c| c.trim().to_string()).filter(|c| !c.is_empty())
}

/// List all products with their market ids merged in.
///
/// The two tables are read in separate queries. A failed link query must
/// not take down the stock screen: it logs and every product comes back
/// with an empty market list instead.
pub async fn fetch_products(
    db: &DatabaseConnection,
) -> Result<Vec<ProductWithMarkets>, DomainError> {
    let products = ProductEntity::find().all(db).await?;
    if products.is_empty() {
        return Ok(Vec::new());
    }

    let ids: Vec<i32> = products.iter().map(|p| p.id).collect();
    let links = match LinkEntity::find()
        .filter(product_market::Column::ProductId.is_in(ids))
        .all(db)
        .await
    {
        Ok(links) => links,
        Err(e) => {
            tracing::warn!("market link fetch failed, serving products without links: {}", e);
            return Ok(products
                .into_iter()
                .map(|p| ProductWithMarkets::from_model(p, Vec::new()))
                .collect());
        }
    };

    let mut links_by_product: HashMap<i32, Vec<i32>> = HashMap::new();
    for link in links {
        links_by_product
            .entry(link.product_id)
            .or_default()
            .push(link.market_id);
    }

    Ok(products
        .into_iter()
        .map(|p| {
            let market_ids = links_by_product.remove(&p.id).unwrap_or_default();
            ProductWithMarkets::from_model(p, market_ids)
        })
        .collect())
}

/// Get a single product with its market ids.
pub async fn get_product(
    db: &DatabaseConnection,
    id: i32,
) -> Result<ProductWithMarkets, DomainError> {
    let model = ProductEntity::find_by_id(id)
        .one(db)
        .await?
        .ok_or(DomainError::NotFound)?;

    let market_ids = match LinkEntity::find()
        .filter(product_market::Column::ProductId.eq(id))
        .all(db)
        .await
    {
        Ok(links) => links.into_iter().map(|l| l.market_id).collect(),
        Err(e) => {
            tracing::warn!("market link fetch failed for product {}: {}", id, e);
            Vec::new()
        }
    };

    Ok(ProductWithMarkets::from_model(model, market_ids))
}

/// Create a product, then its optional market link.
///
/// The two inserts are sequential and independent: if the link insert
/// fails the product row stays, the failure is logged, and the product
/// comes back without the link.
pub async fn create_product(
    db: &DatabaseConnection,
    input: NewProduct,
) -> Result<ProductWithMarkets, DomainError> {
    let name = input.name.trim().to_string();
    if name.is_empty() {
        return Err(DomainError::Validation("product name is required".to_string()));
    }

    let now = chrono::Utc::now();

    let new_product = ProductActiveModel {
        name: Set(name),
        code: Set(normalize_code(input.code)),
        status: Set(input.status.as_str().to_string()),
        supplier_id: Set(input.supplier_id),
        category_id: Set(input.category_id),
        purchase_price: Set(input.purchase_price),
        sale_price: Set(input.sale_price),
        created_at: Set(now.to_rfc3339()),
        updated_at: Set(now.to_rfc3339()),
        ..Default::default()
    };

    let model = new_product.insert(db).await?;

    let mut market_ids = Vec::new();
    if let Some(market_id) = input.market_id {
        let link = LinkActiveModel {
            product_id: Set(model.id),
            market_id: Set(market_id),
            ..Default::default()
        };
        match link.insert(db).await {
            Ok(_) => market_ids.push(market_id),
            Err(e) => {
                tracing::warn!("product {} created without market link: {}", model.id, e);
            }
        }
    }

    Ok(ProductWithMarkets::from_model(model, market_ids))
}

/// Update a product's scalar fields, then replace its market links.
///
/// Scalars first, links second. Once the scalar update has gone through it
/// is never rolled back; the link replacement reports its own terminal
/// state as [`ProductSync`].
pub async fn update_product(
    db: &DatabaseConnection,
    id: i32,
    input: ProductUpdate,
) -> Result<ProductSync, DomainError> {
    let name = input.name.trim().to_string();
    if name.is_empty() {
        return Err(DomainError::Validation("product name is required".to_string()));
    }

    let model = ProductEntity::find_by_id(id)
        .one(db)
        .await?
        .ok_or(DomainError::NotFound)?;

    let mut product: ProductActiveModel = model.into();
    product.name = Set(name);
    product.code = Set(normalize_code(input.code));
    product.status = Set(input.status.as_str().to_string());
    product.supplier_id = Set(input.supplier_id);
    product.category_id = Set(input.category_id);
    product.purchase_price = Set(input.purchase_price);
    product.sale_price = Set(input.sale_price);
    product.updated_at = Set(chrono::Utc::now().to_rfc3339());
    product.update(db).await?;

    Ok(replace_market_links(db, id, &input.market_ids).await)
}

/// Quick status change from the stock card, no other fields touched.
pub async fn update_product_status(
    db: &DatabaseConnection,
    id: i32,
    status: StockStatus,
) -> Result<ProductWithMarkets, DomainError> {
    let model = ProductEntity::find_by_id(id)
        .one(db)
        .await?
        .ok_or(DomainError::NotFound)?;

    let mut product: ProductActiveModel = model.into();
    product.status = Set(status.as_str().to_string());
    product.updated_at = Set(chrono::Utc::now().to_rfc3339());
    product.update(db).await?;

    get_product(db, id).await
}

/// Delete a product. Market links go with it (ON DELETE CASCADE).
pub async fn delete_product(db: &DatabaseConnection, id: i32) -> Result<(), DomainError> {
    ProductEntity::delete_by_id(id).exec(db).await?;
    Ok(())
}

/// Replace a product's market links with `desired`.
///
/// Snapshot, delete, reinsert. When the insert fails the snapshot goes
/// back in, so the worst ordinary outcome is keeping the previous set;
/// only a failed restore leaves the links undefined.
async fn replace_market_links(
    db: &DatabaseConnection,
    product_id: i32,
    desired: &[i32],
) -> ProductSync {
    let previous = match LinkEntity::find()
        .filter(product_market::Column::ProductId.eq(product_id))
        .all(db)
        .await
    {
        Ok(links) => links,
        Err(e) => {
            tracing::warn!("link snapshot failed for product {}: {}", product_id, e);
            return ProductSync::KeptPrevious {
                reason: e.to_string(),
            };
        }
    };

    if let Err(e) = LinkEntity::delete_many()
        .filter(product_market::Column::ProductId.eq(product_id))
        .exec(db)
        .await
    {
        tracing::warn!("link delete failed for product {}: {}", product_id, e);
        return ProductSync::KeptPrevious {
            reason: e.to_string(),
        };
    }

    if desired.is_empty() {
        return ProductSync::Replaced;
    }

    let rows: Vec<LinkActiveModel> = desired
        .iter()
        .map(|market_id| LinkActiveModel {
            product_id: Set(product_id),
            market_id: Set(*market_id),
            ..Default::default()
        })
        .collect();

    let insert_err = match LinkEntity::insert_many(rows).exec(db).await {
        Ok(_) => return ProductSync::Replaced,
        Err(e) => e,
    };
    tracing::warn!("link insert failed for product {}: {}", product_id, insert_err);

    // Put the snapshot back so the product does not silently lose its links.
    if previous.is_empty() {
        return ProductSync::KeptPrevious {
            reason: insert_err.to_string(),
        };
    }

    let restore: Vec<LinkActiveModel> = previous
        .iter()
        .map(|link| LinkActiveModel {
            product_id: Set(link.product_id),
            market_id: Set(link.market_id),
            ..Default::default()
        })
        .collect();

    match LinkEntity::insert_many(restore).exec(db).await {
        Ok(_) => ProductSync::KeptPrevious {
            reason: insert_err.to_string(),
        },
        Err(restore_err) => {
            tracing::error!(
                "link restore failed for product {}, links undefined: {}",
                product_id,
                restore_err
            );
            ProductSync::Inconsistent {
                reason: format!("{} (restore failed: {})", insert_err, restore_err),
            }
        }
    }
}
