use std::collections::BTreeMap;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::{
    entity::types::Image,
    models::{Product, Variant},
};

#[derive(Debug, Deserialize, ToSchema)]
pub struct CreateProductRequest {
    pub name: String,
    pub description: String,
    pub sku: String,
    pub base_price: Decimal,
    pub discount_percent: Option<Decimal>,
    #[serde(default)]
    pub categories: Vec<Uuid>,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub attributes: BTreeMap<String, String>,
    #[serde(default)]
    pub images: Vec<Image>,
    pub active: Option<bool>,
    pub featured: Option<bool>,
}

#[derive(Debug, Default, Deserialize, ToSchema)]
pub struct UpdateProductRequest {
    pub name: Option<String>,
    pub description: Option<String>,
    pub sku: Option<String>,
    pub base_price: Option<Decimal>,
    pub discount_percent: Option<Decimal>,
    /// Replaces the full set of categories when present.
    pub categories: Option<Vec<Uuid>>,
    pub tags: Option<Vec<String>>,
    pub attributes: Option<BTreeMap<String, String>>,
    pub images: Option<Vec<Image>>,
    pub active: Option<bool>,
    pub featured: Option<bool>,
}

#[derive(Serialize, ToSchema)]
#[serde(transparent)]
pub struct ProductList {
    #[schema(value_type = Vec<Product>)]
    pub items: Vec<Product>,
}

/// Product with its variants, each carrying its inventory.
#[derive(Debug, Serialize, ToSchema)]
pub struct ProductDetail {
    pub product: Product,
    pub variants: Vec<Variant>,
}
