//! Supplier Service - the supplier directory behind the reorder screens
#![allow(clippy::needless_update)] // SeaORM ActiveModels require ..Default::default()

use sea_orm::{ActiveModelTrait, DatabaseConnection, EntityTrait, QueryOrder, Set};
use serde::Deserialize;

use crate::domain::DomainError;
use crate::models::supplier::{self as supplier_model, Entity as Supplier};

/// Create/update payload for a supplier.
#[derive(Debug, Clone, Deserialize)]
pub struct SupplierInput {
    pub name: String,
    pub phone_number: Option<String>,
}

/// List all suppliers, alphabetical.
pub async fn fetch_suppliers(
    db: &DatabaseConnection,
) -> Result<Vec<supplier_model::Model>, DomainError> {
    let suppliers = Supplier::find()
        .order_by_asc(supplier_model::Column::Name)
        .all(db)
        .await?;
    Ok(suppliers)
}

pub async fn get_supplier(
    db: &DatabaseConnection,
    id: i32,
) -> Result<supplier_model::Model, DomainError> {
    Supplier::find_by_id(id)
        .one(db)
        .await?
        .ok_or(DomainError::NotFound)
}

pub async fn create_supplier(
    db: &DatabaseConnection,
    input: SupplierInput,
) -> Result<supplier_model::Model, DomainError> {
    let name = input.name.trim().to_string();
    if name.is_empty() {
        return Err(DomainError::Validation("supplier name is required".to_string()));
    }

    let now = chrono::Utc::now().to_rfc3339();
    let new_supplier = supplier_model::ActiveModel {
        name: Set(name),
        phone_number: Set(input.phone_number),
        created_at: Set(now.clone()),
        updated_at: Set(now),
        ..Default::default()
    };

    let model = new_supplier.insert(db).await?;
    Ok(model)
}

pub async fn update_supplier(
    db: &DatabaseConnection,
    id: i32,
    input: SupplierInput,
) -> Result<supplier_model::Model, DomainError> {
    let name = input.name.trim().to_string();
    if name.is_empty() {
        return Err(DomainError::Validation("supplier name is required".to_string()));
    }

    let model = Supplier::find_by_id(id)
        .one(db)
        .await?
        .ok_or(DomainError::NotFound)?;

    let mut supplier: supplier_model::ActiveModel = model.into();
    supplier.name = Set(name);
    supplier.phone_number = Set(input.phone_number);
    supplier.updated_at = Set(chrono::Utc::now().to_rfc3339());

    let model = supplier.update(db).await?;
    Ok(model)
}

/// Delete a supplier. Products that referenced it stay in stock with the
/// reference cleared (ON DELETE SET NULL).
pub async fn delete_supplier(db: &DatabaseConnection, id: i32) -> Result<(), DomainError> {
    Supplier::delete_by_id(id).exec(db).await?;
    Ok(())
}
