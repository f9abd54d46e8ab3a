use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "products")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    pub name: String,
    pub code: Option<String>,
    /// Stored as text. Valid values:
    /// - `available`: in stock
    /// - `low`: running low, shows up in reorder lists
    /// - `out`: sold out
    #[sea_orm(default_value = "available")]
    pub status: String,
    pub supplier_id: Option<i32>,
    pub category_id: Option<i32>,
    pub purchase_price: Option<f64>,
    pub sale_price: Option<f64>,
    pub created_at: String,
    pub updated_at: String,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::supplier::Entity",
        from = "Column::SupplierId",
        to = "super::supplier::Column::Id",
        on_update = "Cascade",
        on_delete = "SetNull"
    )]
    Supplier,
    #[sea_orm(
        belongs_to = "super::category::Entity",
        from = "Column::CategoryId",
        to = "super::category::Column::Id",
        on_update = "Cascade",
        on_delete = "SetNull"
    )]
    Category,
}

impl Related<super::supplier::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Supplier.def()
    }
}

impl Related<super::category::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Category.def()
    }
}

impl Related<super::market::Entity> for Entity {
    fn to() -> RelationDef {
        super::product_market::Relation::Market.def()
    }

    fn via() -> Option<RelationDef> {
        Some(super::product_market::Relation::Product.def().rev())
    }
}

impl ActiveModelBehavior for ActiveModel {}

/// Stock level of a product.
///
/// The database keeps the status as free text; anything it does not
/// recognize reads back as `Available` rather than failing the row.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StockStatus {
    #[default]
    Available,
    Low,
    Out,
}

impl StockStatus {
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "available" => Some(StockStatus::Available),
            "low" => Some(StockStatus::Low),
            "out" => Some(StockStatus::Out),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            StockStatus::Available => "available",
            StockStatus::Low => "low",
            StockStatus::Out => "out",
        }
    }

    /// `low` and `out` products appear in reorder lists and supplier alerts.
    pub fn needs_reorder(&self) -> bool {
        matches!(self, StockStatus::Low | StockStatus::Out)
    }
}

// DTO for API responses: a product with its market links merged in
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProductWithMarkets {
    pub id: i32,
    pub name: String,
    pub code: Option<String>,
    pub status: StockStatus,
    pub supplier_id: Option<i32>,
    pub category_id: Option<i32>,
    pub purchase_price: Option<f64>,
    pub sale_price: Option<f64>,
    /// Ids of the markets this product is sold on. Empty when the product
    /// has no links, or when the link lookup was skipped after a failure.
    #[serde(default)]
    pub market_ids: Vec<i32>,
}

impl ProductWithMarkets {
    pub fn from_model(model: Model, market_ids: Vec<i32>) -> Self {
        Self {
            id: model.id,
            name: model.name,
            code: model.code,
            status: StockStatus::parse(&model.status).unwrap_or_default(),
            supplier_id: model.supplier_id,
            category_id: model.category_id,
            purchase_price: model.purchase_price,
            sale_price: model.sale_price,
            market_ids,
        }
    }
}
