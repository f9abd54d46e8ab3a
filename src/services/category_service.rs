//! Category Service - product families used by the catalogue filters
#![allow(clippy::needless_update)] // SeaORM ActiveModels require ..Default::default()

use sea_orm::{ActiveModelTrait, DatabaseConnection, EntityTrait, QueryOrder, Set};

use crate::domain::DomainError;
use crate::models::category::{self as category_model, Entity as Category};

/// List all categories, alphabetical.
pub async fn fetch_categories(
    db: &DatabaseConnection,
) -> Result<Vec<category_model::Model>, DomainError> {
    let categories = Category::find()
        .order_by_asc(category_model::Column::Name)
        .all(db)
        .await?;
    Ok(categories)
}

pub async fn create_category(
    db: &DatabaseConnection,
    name: &str,
) -> Result<category_model::Model, DomainError> {
    let name = name.trim().to_string();
    if name.is_empty() {
        return Err(DomainError::Validation("category name is required".to_string()));
    }

    let now = chrono::Utc::now().to_rfc3339();
    let new_category = category_model::ActiveModel {
        name: Set(name),
        created_at: Set(now.clone()),
        updated_at: Set(now),
        ..Default::default()
    };

    let model = new_category.insert(db).await?;
    Ok(model)
}

pub async fn update_category(
    db: &DatabaseConnection,
    id: i32,
    name: &str,
) -> Result<category_model::Model, DomainError> {
    let name = name.trim().to_string();
    if name.is_empty() {
        return Err(DomainError::Validation("category name is required".to_string()));
    }

    let model = Category::find_by_id(id)
        .one(db)
        .await?
        .ok_or(DomainError::NotFound)?;

    let mut category: category_model::ActiveModel = model.into();
    category.name = Set(name);
    category.updated_at = Set(chrono::Utc::now().to_rfc3339());

    let model = category.update(db).await?;
    Ok(model)
}

/// Delete a category. Products keep their rows with the reference cleared
/// (ON DELETE SET NULL); there is no guard like the one on markets.
pub async fn delete_category(db: &DatabaseConnection, id: i32) -> Result<(), DomainError> {
    Category::delete_by_id(id).exec(db).await?;
    Ok(())
}
