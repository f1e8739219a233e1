use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::models::Inventory;

/// Partial overwrite of an inventory record; absent fields keep their value.
#[derive(Debug, Default, Clone, Deserialize, ToSchema)]
pub struct UpdateInventoryRequest {
    pub quantity: Option<i32>,
    pub reserved: Option<i32>,
    pub low_stock_threshold: Option<i32>,
    pub reorder_point: Option<i32>,
    pub reorder_quantity: Option<i32>,
    pub warehouse_location: Option<String>,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct AdjustInventoryRequest {
    /// Signed change to the on-hand quantity.
    #[serde(alias = "delta")]
    pub adjustment: i32,
    pub reason: Option<String>,
}

/// Body for both reserve and release.
#[derive(Debug, Deserialize, ToSchema)]
pub struct StockMovementRequest {
    pub quantity: i32,
    pub reference: Option<String>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct AdjustmentSummary {
    pub previous: i32,
    pub current: i32,
    pub difference: i32,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct AdjustmentResult {
    pub inventory: Inventory,
    pub adjustment: AdjustmentSummary,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct MovementSummary {
    pub quantity: i32,
    pub reference: String,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct ReservationResult {
    pub inventory: Inventory,
    pub reservation: MovementSummary,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct ReleaseResult {
    pub inventory: Inventory,
    pub release: MovementSummary,
}
