use axum::{
    Json, Router,
    extract::{Query, State},
    routing::get,
};

use crate::{
    dto::reports::{InventorySummaryReport, LowStockQuery, StockReport, ValuationReport},
    error::AppResult,
    response::ApiResponse,
    services::report_service,
    state::AppState,
};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/low-stock", get(low_stock))
        .route("/reorder", get(reorder))
        .route("/inventory-valuation", get(inventory_valuation))
        .route("/inventory-summary", get(inventory_summary))
}

#[utoipa::path(
    get,
    path = "/api/reports/low-stock",
    params(
        ("threshold" = Option<i32>, Query, description = "Fixed cutoff for available stock; defaults to each record's low stock threshold")
    ),
    responses(
        (status = 200, description = "Inventories at or below their low stock threshold", body = ApiResponse<StockReport>)
    ),
    tag = "Reports"
)]
pub async fn low_stock(
    State(state): State<AppState>,
    Query(query): Query<LowStockQuery>,
) -> AppResult<Json<ApiResponse<StockReport>>> {
    let resp = report_service::low_stock_report(&state, query).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    get,
    path = "/api/reports/reorder",
    responses(
        (status = 200, description = "Inventories at or below their reorder point", body = ApiResponse<StockReport>)
    ),
    tag = "Reports"
)]
pub async fn reorder(State(state): State<AppState>) -> AppResult<Json<ApiResponse<StockReport>>> {
    let resp = report_service::reorder_report(&state).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    get,
    path = "/api/reports/inventory-valuation",
    responses(
        (status = 200, description = "Stock value per variant and in total", body = ApiResponse<ValuationReport>)
    ),
    tag = "Reports"
)]
pub async fn inventory_valuation(
    State(state): State<AppState>,
) -> AppResult<Json<ApiResponse<ValuationReport>>> {
    let resp = report_service::valuation_report(&state).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    get,
    path = "/api/reports/inventory-summary",
    responses(
        (status = 200, description = "Stock totals with per-warehouse breakdown", body = ApiResponse<InventorySummaryReport>)
    ),
    tag = "Reports"
)]
pub async fn inventory_summary(
    State(state): State<AppState>,
) -> AppResult<Json<ApiResponse<InventorySummaryReport>>> {
    let resp = report_service::inventory_summary(&state).await?;
    Ok(Json(resp))
}
