use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Junction row linking a product to a market it is sold on.
///
/// Rows carry their own id instead of a composite key: nothing in the
/// schema forbids the same pair twice, and link replacement relies on
/// deleting and reinserting whole sets.
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "product_markets")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    pub product_id: i32,
    pub market_id: i32,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::product::Entity",
        from = "Column::ProductId",
        to = "super::product::Column::Id",
        on_update = "Cascade",
        on_delete = "Cascade"
    )]
    Product,
    #[sea_orm(
        belongs_to = "super::market::Entity",
        from = "Column::MarketId",
        to = "super::market::Column::Id",
        on_update = "Cascade",
        on_delete = "Cascade"
    )]
    Market,
}

impl ActiveModelBehavior for ActiveModel {}
