use sea_orm::entity::prelude::*;

use super::types::{Attributes, Images, Tags};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "products")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub name: String,
    pub description: String,
    #[sea_orm(unique)]
    pub slug: String,
    #[sea_orm(unique)]
    pub sku: String,
    #[sea_orm(column_type = "Decimal(Some((12, 2)))")]
    pub base_price: Decimal,
    #[sea_orm(column_type = "Decimal(Some((5, 2)))")]
    pub discount_percent: Decimal,
    #[sea_orm(column_type = "JsonBinary")]
    pub tags: Tags,
    #[sea_orm(column_type = "JsonBinary")]
    pub attributes: Attributes,
    #[sea_orm(column_type = "JsonBinary")]
    pub images: Images,
    pub active: bool,
    pub featured: bool,
    pub created_at: DateTimeWithTimeZone,
    pub updated_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::variants::Entity")]
    Variants,
    #[sea_orm(has_many = "super::product_categories::Entity")]
    ProductCategories,
}

impl Related<super::variants::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Variants.def()
    }
}

impl Related<super::product_categories::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::ProductCategories.def()
    }
}

impl Related<super::categories::Entity> for Entity {
    fn to() -> RelationDef {
        super::product_categories::Relation::Categories.def()
    }

    fn via() -> Option<RelationDef> {
        Some(super::product_categories::Relation::Products.def().rev())
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl Model {
    /// `base_price` with `discount_percent` taken off.
    pub fn sale_price(&self) -> Decimal {
        self.base_price * (Decimal::ONE_HUNDRED - self.discount_percent) / Decimal::ONE_HUNDRED
    }
}
