use std::collections::BTreeMap;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::{dto::inventory::UpdateInventoryRequest, entity::types::Image, models::Variant};

#[derive(Debug, Deserialize, ToSchema)]
pub struct CreateVariantRequest {
    pub sku: String,
    pub name: String,
    pub attributes: BTreeMap<String, String>,
    pub price_difference: Option<Decimal>,
    pub active: Option<bool>,
    #[serde(default)]
    pub images: Vec<Image>,
    /// Stock levels to open the variant's inventory with.
    pub initial_inventory: Option<UpdateInventoryRequest>,
}

#[derive(Debug, Default, Deserialize, ToSchema)]
pub struct UpdateVariantRequest {
    pub sku: Option<String>,
    pub name: Option<String>,
    pub attributes: Option<BTreeMap<String, String>>,
    pub price_difference: Option<Decimal>,
    pub active: Option<bool>,
    pub images: Option<Vec<Image>>,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct VariantProduct {
    pub id: Uuid,
    pub name: String,
    pub sku: String,
    pub base_price: Decimal,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct VariantDetail {
    pub variant: Variant,
    pub product: VariantProduct,
    /// Product base price plus the variant's price difference.
    pub unit_price: Decimal,
}

#[derive(Serialize, ToSchema)]
#[serde(transparent)]
pub struct VariantList {
    #[schema(value_type = Vec<Variant>)]
    pub items: Vec<Variant>,
}
