use axum::{
    Json, Router,
    extract::{Path, State},
    routing::{get, patch},
};
use uuid::Uuid;

use crate::{
    dto::{
        inventory::{
            AdjustInventoryRequest, AdjustmentResult, ReleaseResult, ReservationResult,
            StockMovementRequest, UpdateInventoryRequest,
        },
        variants::{UpdateVariantRequest, VariantDetail},
    },
    error::AppResult,
    models::{Inventory, Variant},
    response::ApiResponse,
    services::{inventory_service, variant_service},
    state::AppState,
};

pub fn router() -> Router<AppState> {
    Router::new()
        .route(
            "/{id}",
            get(get_variant).put(update_variant).delete(delete_variant),
        )
        .route("/{id}/inventory", get(get_inventory).put(set_inventory))
        .route("/{id}/inventory/adjust", patch(adjust_inventory))
        .route("/{id}/inventory/reserve", patch(reserve_inventory))
        .route("/{id}/inventory/release", patch(release_inventory))
}

#[utoipa::path(
    get,
    path = "/api/variants/{id}",
    params(
        ("id" = Uuid, Path, description = "Variant ID")
    ),
    responses(
        (status = 200, description = "Variant with product and inventory", body = ApiResponse<VariantDetail>),
        (status = 404, description = "Not Found")
    ),
    tag = "Variants"
)]
pub async fn get_variant(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> AppResult<Json<ApiResponse<VariantDetail>>> {
    let resp = variant_service::get_variant(&state, id).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    put,
    path = "/api/variants/{id}",
    params(
        ("id" = Uuid, Path, description = "Variant ID")
    ),
    request_body = UpdateVariantRequest,
    responses(
        (status = 200, description = "Update variant", body = ApiResponse<Variant>),
        (status = 404, description = "Not Found"),
        (status = 409, description = "Duplicate SKU")
    ),
    tag = "Variants"
)]
pub async fn update_variant(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(payload): Json<UpdateVariantRequest>,
) -> AppResult<Json<ApiResponse<Variant>>> {
    let resp = variant_service::update_variant(&state, id, payload).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    delete,
    path = "/api/variants/{id}",
    params(
        ("id" = Uuid, Path, description = "Variant ID")
    ),
    responses(
        (status = 200, description = "Delete variant and its inventory"),
        (status = 404, description = "Not Found")
    ),
    tag = "Variants"
)]
pub async fn delete_variant(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> AppResult<Json<ApiResponse<serde_json::Value>>> {
    let resp = variant_service::delete_variant(&state, id).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    get,
    path = "/api/variants/{id}/inventory",
    params(
        ("id" = Uuid, Path, description = "Variant ID")
    ),
    responses(
        (status = 200, description = "Inventory of the variant, created on first access", body = ApiResponse<Inventory>),
        (status = 404, description = "Not Found")
    ),
    tag = "Inventory"
)]
pub async fn get_inventory(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> AppResult<Json<ApiResponse<Inventory>>> {
    let resp = inventory_service::get_inventory(&state, id).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    put,
    path = "/api/variants/{id}/inventory",
    params(
        ("id" = Uuid, Path, description = "Variant ID")
    ),
    request_body = UpdateInventoryRequest,
    responses(
        (status = 200, description = "Set inventory levels", body = ApiResponse<Inventory>),
        (status = 400, description = "Validation error"),
        (status = 404, description = "Not Found"),
        (status = 409, description = "Concurrent modification")
    ),
    tag = "Inventory"
)]
pub async fn set_inventory(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(payload): Json<UpdateInventoryRequest>,
) -> AppResult<Json<ApiResponse<Inventory>>> {
    let resp = inventory_service::set_inventory(&state, id, payload).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    patch,
    path = "/api/variants/{id}/inventory/adjust",
    params(
        ("id" = Uuid, Path, description = "Variant ID")
    ),
    request_body = AdjustInventoryRequest,
    responses(
        (status = 200, description = "Adjust on-hand quantity", body = ApiResponse<AdjustmentResult>),
        (status = 400, description = "Invalid adjustment"),
        (status = 404, description = "Not Found"),
        (status = 409, description = "Concurrent modification")
    ),
    tag = "Inventory"
)]
pub async fn adjust_inventory(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(payload): Json<AdjustInventoryRequest>,
) -> AppResult<Json<ApiResponse<AdjustmentResult>>> {
    let resp = inventory_service::adjust_inventory(&state, id, payload).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    patch,
    path = "/api/variants/{id}/inventory/reserve",
    params(
        ("id" = Uuid, Path, description = "Variant ID")
    ),
    request_body = StockMovementRequest,
    responses(
        (status = 200, description = "Reserve available stock", body = ApiResponse<ReservationResult>),
        (status = 400, description = "Insufficient available stock"),
        (status = 404, description = "Not Found"),
        (status = 409, description = "Concurrent modification")
    ),
    tag = "Inventory"
)]
pub async fn reserve_inventory(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(payload): Json<StockMovementRequest>,
) -> AppResult<Json<ApiResponse<ReservationResult>>> {
    let resp = inventory_service::reserve_inventory(&state, id, payload).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    patch,
    path = "/api/variants/{id}/inventory/release",
    params(
        ("id" = Uuid, Path, description = "Variant ID")
    ),
    request_body = StockMovementRequest,
    responses(
        (status = 200, description = "Release reserved stock", body = ApiResponse<ReleaseResult>),
        (status = 400, description = "Release exceeds reserved"),
        (status = 404, description = "Not Found"),
        (status = 409, description = "Concurrent modification")
    ),
    tag = "Inventory"
)]
pub async fn release_inventory(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(payload): Json<StockMovementRequest>,
) -> AppResult<Json<ApiResponse<ReleaseResult>>> {
    let resp = inventory_service::release_inventory(&state, id, payload).await?;
    Ok(Json(resp))
}
