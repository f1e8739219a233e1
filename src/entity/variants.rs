use sea_orm::entity::prelude::*;

use super::types::{Attributes, Images};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "variants")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub product_id: Uuid,
    #[sea_orm(unique)]
    pub sku: String,
    pub name: String,
    #[sea_orm(column_type = "JsonBinary")]
    pub attributes: Attributes,
    #[sea_orm(column_type = "Decimal(Some((12, 2)))")]
    pub price_difference: Decimal,
    pub active: bool,
    #[sea_orm(column_type = "JsonBinary")]
    pub images: Images,
    pub created_at: DateTimeWithTimeZone,
    pub updated_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::products::Entity",
        from = "Column::ProductId",
        to = "super::products::Column::Id"
    )]
    Products,
    #[sea_orm(has_one = "super::inventories::Entity")]
    Inventories,
}

impl Related<super::products::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Products.def()
    }
}

impl Related<super::inventories::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Inventories.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl Model {
    /// Price of this variant given its product's base price.
    pub fn unit_price(&self, base_price: Decimal) -> Decimal {
        base_price + self.price_difference
    }
}
