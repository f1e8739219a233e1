use std::collections::BTreeMap;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

#[derive(Debug, Default, Deserialize, ToSchema)]
pub struct LowStockQuery {
    /// Compared against available stock instead of each record's own threshold.
    pub threshold: Option<i32>,
}

#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
pub struct ProductSummary {
    pub id: Uuid,
    pub name: String,
    pub sku: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
pub struct VariantSummary {
    pub id: Uuid,
    pub name: String,
    pub sku: String,
    pub attributes: BTreeMap<String, String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
pub struct StockLevels {
    pub quantity: i32,
    pub reserved: i32,
    pub available: i32,
    pub low_stock_threshold: i32,
    pub reorder_point: i32,
    pub reorder_quantity: i32,
    pub warehouse_location: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
pub struct ReorderAdvice {
    pub recommended: i32,
}

#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
pub struct StockReportItem {
    pub product: ProductSummary,
    pub variant: VariantSummary,
    pub inventory: StockLevels,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reorder: Option<ReorderAdvice>,
}

/// Low-stock and reorder reports share this shape.
#[derive(Debug, Serialize, ToSchema)]
pub struct StockReport {
    pub count: usize,
    pub items: Vec<StockReportItem>,
}

#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
pub struct ValuationLevels {
    pub quantity: i32,
    pub reserved: i32,
    pub available: i32,
}

#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
pub struct Valuation {
    pub unit_price: Decimal,
    pub total_value: Decimal,
}

#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
pub struct ValuationItem {
    pub product: ProductSummary,
    pub variant: VariantSummary,
    pub inventory: ValuationLevels,
    pub valuation: Valuation,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct ValuationReport {
    pub total_value: Decimal,
    pub count: usize,
    pub items: Vec<ValuationItem>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, ToSchema)]
pub struct InventorySummary {
    pub total_items: i64,
    pub total_quantity: i64,
    pub total_reserved: i64,
    pub total_available: i64,
    pub low_stock_items: i64,
    pub out_of_stock_items: i64,
    pub needs_reorder_items: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
pub struct WarehouseStock {
    pub location: String,
    pub count: i64,
    pub total_quantity: i64,
    pub total_reserved: i64,
    pub available: i64,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct InventorySummaryReport {
    pub summary: InventorySummary,
    pub warehouse_distribution: Vec<WarehouseStock>,
}
