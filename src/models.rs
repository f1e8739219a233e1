use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::entity::{
    categories, inventories, products,
    types::{AdjustmentEntry, Image, ReservationEntry},
    variants,
};

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct CategoryRef {
    pub id: Uuid,
    pub name: String,
    pub slug: String,
}

impl From<&categories::Model> for CategoryRef {
    fn from(model: &categories::Model) -> Self {
        Self {
            id: model.id,
            name: model.name.clone(),
            slug: model.slug.clone(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct Category {
    pub id: Uuid,
    pub name: String,
    pub description: Option<String>,
    pub slug: String,
    pub parent_id: Option<Uuid>,
    pub active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<categories::Model> for Category {
    fn from(model: categories::Model) -> Self {
        Self {
            id: model.id,
            name: model.name,
            description: model.description,
            slug: model.slug,
            parent_id: model.parent_id,
            active: model.active,
            created_at: model.created_at.with_timezone(&Utc),
            updated_at: model.updated_at.with_timezone(&Utc),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct Product {
    pub id: Uuid,
    pub name: String,
    pub description: String,
    pub slug: String,
    pub sku: String,
    pub base_price: Decimal,
    pub discount_percent: Decimal,
    pub sale_price: Decimal,
    pub tags: Vec<String>,
    pub attributes: BTreeMap<String, String>,
    pub images: Vec<Image>,
    pub active: bool,
    pub featured: bool,
    pub categories: Vec<CategoryRef>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Product {
    pub fn from_entity(model: products::Model, categories: &[categories::Model]) -> Self {
        Self {
            sale_price: model.sale_price(),
            id: model.id,
            name: model.name,
            description: model.description,
            slug: model.slug,
            sku: model.sku,
            base_price: model.base_price,
            discount_percent: model.discount_percent,
            tags: model.tags.0,
            attributes: model.attributes.0,
            images: model.images.0,
            active: model.active,
            featured: model.featured,
            categories: categories.iter().map(CategoryRef::from).collect(),
            created_at: model.created_at.with_timezone(&Utc),
            updated_at: model.updated_at.with_timezone(&Utc),
        }
    }
}

/// Inventory record with its derived stock indicators.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct Inventory {
    pub id: Uuid,
    pub variant_id: Uuid,
    pub quantity: i32,
    pub reserved: i32,
    pub available: i32,
    pub low_stock_threshold: i32,
    pub reorder_point: i32,
    pub reorder_quantity: i32,
    pub warehouse_location: String,
    pub is_low_stock: bool,
    pub needs_reorder: bool,
    pub adjustment_log: Vec<AdjustmentEntry>,
    pub reservation_log: Vec<ReservationEntry>,
    pub release_log: Vec<ReservationEntry>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<inventories::Model> for Inventory {
    fn from(model: inventories::Model) -> Self {
        Self {
            available: model.available(),
            is_low_stock: model.is_low_stock(),
            needs_reorder: model.needs_reorder(),
            id: model.id,
            variant_id: model.variant_id,
            quantity: model.quantity,
            reserved: model.reserved,
            low_stock_threshold: model.low_stock_threshold,
            reorder_point: model.reorder_point,
            reorder_quantity: model.reorder_quantity,
            warehouse_location: model.warehouse_location,
            adjustment_log: model.adjustment_log.0,
            reservation_log: model.reservation_log.0,
            release_log: model.release_log.0,
            created_at: model.created_at.with_timezone(&Utc),
            updated_at: model.updated_at.with_timezone(&Utc),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct Variant {
    pub id: Uuid,
    pub product_id: Uuid,
    pub sku: String,
    pub name: String,
    pub attributes: BTreeMap<String, String>,
    pub price_difference: Decimal,
    pub active: bool,
    pub images: Vec<Image>,
    pub inventory: Option<Inventory>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Variant {
    pub fn from_entity(model: variants::Model, inventory: Option<inventories::Model>) -> Self {
        Self {
            id: model.id,
            product_id: model.product_id,
            sku: model.sku,
            name: model.name,
            attributes: model.attributes.0,
            price_difference: model.price_difference,
            active: model.active,
            images: model.images.0,
            inventory: inventory.map(Inventory::from),
            created_at: model.created_at.with_timezone(&Utc),
            updated_at: model.updated_at.with_timezone(&Utc),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entity::types::{AdjustmentLog, Attributes, Images, ReservationLog, Tags};
    use rust_decimal_macros::dec;

    fn product(base_price: Decimal, discount_percent: Decimal) -> products::Model {
        let now = Utc::now().into();
        products::Model {
            id: Uuid::new_v4(),
            name: "Trail Shoe".into(),
            description: "Grippy".into(),
            slug: "trail-shoe".into(),
            sku: "TS-1".into(),
            base_price,
            discount_percent,
            tags: Tags(vec!["outdoor".into()]),
            attributes: Attributes::default(),
            images: Images::default(),
            active: true,
            featured: false,
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn sale_price_applies_discount() {
        let view = Product::from_entity(product(dec!(80.00), dec!(25)), &[]);
        assert_eq!(view.sale_price, dec!(60));
        let view = Product::from_entity(product(dec!(19.99), dec!(0)), &[]);
        assert_eq!(view.sale_price, dec!(19.99));
        let view = Product::from_entity(product(dec!(10), dec!(100)), &[]);
        assert_eq!(view.sale_price, dec!(0));
    }

    #[test]
    fn inventory_view_reports_derived_flags() {
        let now = Utc::now().into();
        let model = inventories::Model {
            id: Uuid::new_v4(),
            variant_id: Uuid::new_v4(),
            quantity: 12,
            reserved: 4,
            low_stock_threshold: 8,
            reorder_point: 7,
            reorder_quantity: 20,
            warehouse_location: "North".into(),
            adjustment_log: AdjustmentLog::default(),
            reservation_log: ReservationLog::default(),
            release_log: ReservationLog::default(),
            created_at: now,
            updated_at: now,
        };
        let view = Inventory::from(model);
        assert_eq!(view.available, 8);
        assert!(view.is_low_stock);
        assert!(!view.needs_reorder);
    }
}
