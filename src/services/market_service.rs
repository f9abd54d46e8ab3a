//! Market Service - the points of sale products get linked to
#![allow(clippy::needless_update)] // SeaORM ActiveModels require ..Default::default()

use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder, Set,
};
use std::collections::HashSet;

use crate::domain::DomainError;
use crate::models::market::{self as market_model, Entity as Market};
use crate::models::product_market::{self, Entity as LinkEntity};

/// List all markets, alphabetical.
pub async fn fetch_markets(
    db: &DatabaseConnection,
) -> Result<Vec<market_model::Model>, DomainError> {
    let markets = Market::find()
        .order_by_asc(market_model::Column::Name)
        .all(db)
        .await?;
    Ok(markets)
}

pub async fn create_market(
    db: &DatabaseConnection,
    name: &str,
) -> Result<market_model::Model, DomainError> {
    let name = name.trim().to_string();
    if name.is_empty() {
        return Err(DomainError::Validation("market name is required".to_string()));
    }

    let now = chrono::Utc::now().to_rfc3339();
    let new_market = market_model::ActiveModel {
        name: Set(name),
        created_at: Set(now.clone()),
        updated_at: Set(now),
        ..Default::default()
    };

    let model = new_market.insert(db).await?;
    Ok(model)
}

pub async fn update_market(
    db: &DatabaseConnection,
    id: i32,
    name: &str,
) -> Result<market_model::Model, DomainError> {
    let name = name.trim().to_string();
    if name.is_empty() {
        return Err(DomainError::Validation("market name is required".to_string()));
    }

    let model = Market::find_by_id(id)
        .one(db)
        .await?
        .ok_or(DomainError::NotFound)?;

    let mut market: market_model::ActiveModel = model.into();
    market.name = Set(name);
    market.updated_at = Set(chrono::Utc::now().to_rfc3339());

    let model = market.update(db).await?;
    Ok(model)
}

/// Delete a market, unless any product is still sold on it.
///
/// The guard counts distinct products, not link rows, so the refusal
/// message matches what the market screen shows.
pub async fn delete_market(db: &DatabaseConnection, id: i32) -> Result<(), DomainError> {
    let links = LinkEntity::find()
        .filter(product_market::Column::MarketId.eq(id))
        .all(db)
        .await?;

    let product_count = links
        .iter()
        .map(|link| link.product_id)
        .collect::<HashSet<_>>()
        .len();

    if product_count > 0 {
        return Err(DomainError::Conflict(format!(
            "Impossible de supprimer ce marché car {} produit(s) y sont associé(s).",
            product_count
        )));
    }

    Market::delete_by_id(id).exec(db).await?;
    Ok(())
}
