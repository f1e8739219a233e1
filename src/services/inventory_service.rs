use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, EntityTrait, QueryFilter, Set, SqlErr,
};
use uuid::Uuid;

use crate::{
    dto::inventory::{
        AdjustInventoryRequest, AdjustmentResult, AdjustmentSummary, MovementSummary,
        ReleaseResult, ReservationResult, StockMovementRequest, UpdateInventoryRequest,
    },
    entity::{
        Inventories, Variants,
        inventories::{ActiveModel, Column, Model as InventoryModel},
    },
    error::{AppError, AppResult},
    ledger,
    models::Inventory,
    response::{ApiResponse, Meta},
    state::AppState,
};

pub async fn get_inventory(
    state: &AppState,
    variant_id: Uuid,
) -> AppResult<ApiResponse<Inventory>> {
    ensure_variant(&state.orm, variant_id).await?;
    let record = get_or_create(&state.orm, variant_id).await?;

    Ok(ApiResponse::success(
        "Inventory retrieved successfully",
        Inventory::from(record),
        None,
    ))
}

pub async fn set_inventory(
    state: &AppState,
    variant_id: Uuid,
    payload: UpdateInventoryRequest,
) -> AppResult<ApiResponse<Inventory>> {
    ensure_variant(&state.orm, variant_id).await?;
    let current = get_or_create(&state.orm, variant_id).await?;
    let next = ledger::apply_update(&current, &payload, Utc::now())
        .inspect_err(|err| rejected(variant_id, "set", err))?;
    persist(&state.orm, &current, &next).await?;

    tracing::info!(
        %variant_id,
        quantity = next.quantity,
        reserved = next.reserved,
        "inventory updated"
    );

    Ok(ApiResponse::success(
        "Inventory updated successfully",
        Inventory::from(next),
        Some(Meta::empty()),
    ))
}

pub async fn adjust_inventory(
    state: &AppState,
    variant_id: Uuid,
    payload: AdjustInventoryRequest,
) -> AppResult<ApiResponse<AdjustmentResult>> {
    ensure_variant(&state.orm, variant_id).await?;
    let current = get_or_create(&state.orm, variant_id).await?;
    let next = ledger::adjust(
        &current,
        payload.adjustment,
        payload.reason.as_deref(),
        Utc::now(),
    )
    .inspect_err(|err| rejected(variant_id, "adjust", err))?;
    persist(&state.orm, &current, &next).await?;

    tracing::info!(
        %variant_id,
        adjustment = payload.adjustment,
        quantity = next.quantity,
        "inventory adjusted"
    );

    let adjustment = AdjustmentSummary {
        previous: current.quantity,
        current: next.quantity,
        difference: payload.adjustment,
    };
    Ok(ApiResponse::success(
        "Inventory adjusted successfully",
        AdjustmentResult {
            inventory: Inventory::from(next),
            adjustment,
        },
        Some(Meta::empty()),
    ))
}

pub async fn reserve_inventory(
    state: &AppState,
    variant_id: Uuid,
    payload: StockMovementRequest,
) -> AppResult<ApiResponse<ReservationResult>> {
    ensure_variant(&state.orm, variant_id).await?;
    let current = get_or_create(&state.orm, variant_id).await?;
    let next = ledger::reserve(
        &current,
        payload.quantity,
        payload.reference.as_deref(),
        Utc::now(),
    )
    .inspect_err(|err| rejected(variant_id, "reserve", err))?;
    persist(&state.orm, &current, &next).await?;

    let reference = last_reference(next.reservation_log.0.last());
    tracing::info!(%variant_id, quantity = payload.quantity, %reference, "inventory reserved");

    Ok(ApiResponse::success(
        "Inventory reserved successfully",
        ReservationResult {
            inventory: Inventory::from(next),
            reservation: MovementSummary {
                quantity: payload.quantity,
                reference,
            },
        },
        Some(Meta::empty()),
    ))
}

pub async fn release_inventory(
    state: &AppState,
    variant_id: Uuid,
    payload: StockMovementRequest,
) -> AppResult<ApiResponse<ReleaseResult>> {
    ensure_variant(&state.orm, variant_id).await?;
    let current = get_or_create(&state.orm, variant_id).await?;
    let next = ledger::release(
        &current,
        payload.quantity,
        payload.reference.as_deref(),
        Utc::now(),
    )
    .inspect_err(|err| rejected(variant_id, "release", err))?;
    persist(&state.orm, &current, &next).await?;

    let reference = last_reference(next.release_log.0.last());
    tracing::info!(%variant_id, quantity = payload.quantity, %reference, "inventory released");

    Ok(ApiResponse::success(
        "Inventory released successfully",
        ReleaseResult {
            inventory: Inventory::from(next),
            release: MovementSummary {
                quantity: payload.quantity,
                reference,
            },
        },
        Some(Meta::empty()),
    ))
}

/// Returns the variant's inventory record, creating a default one on first use.
pub async fn get_or_create<C: ConnectionTrait>(
    db: &C,
    variant_id: Uuid,
) -> AppResult<InventoryModel> {
    if let Some(record) = find_for_variant(db, variant_id).await? {
        return Ok(record);
    }

    let record = ledger::new_record(variant_id, Utc::now());
    match to_active(&record).insert(db).await {
        Ok(created) => {
            tracing::debug!(%variant_id, "inventory record created");
            Ok(created)
        }
        // another request created it between our read and insert
        Err(err) if matches!(err.sql_err(), Some(SqlErr::UniqueConstraintViolation(_))) => {
            find_for_variant(db, variant_id)
                .await?
                .ok_or_else(|| AppError::not_found("Inventory", variant_id))
        }
        Err(err) => Err(err.into()),
    }
}

/// Writes `next` only if the stored row still matches `current`.
pub async fn persist<C: ConnectionTrait>(
    db: &C,
    current: &InventoryModel,
    next: &InventoryModel,
) -> AppResult<()> {
    let result = Inventories::update_many()
        .set(to_active(next))
        .filter(Column::Id.eq(current.id))
        .filter(Column::Quantity.eq(current.quantity))
        .filter(Column::Reserved.eq(current.reserved))
        .filter(Column::UpdatedAt.eq(current.updated_at))
        .exec(db)
        .await?;

    if result.rows_affected == 0 {
        tracing::warn!(
            variant_id = %current.variant_id,
            "inventory changed concurrently, update rejected"
        );
        return Err(AppError::Conflict(
            "Inventory was modified by another request, please retry".into(),
        ));
    }
    Ok(())
}

pub(crate) async fn ensure_variant<C: ConnectionTrait>(db: &C, variant_id: Uuid) -> AppResult<()> {
    if Variants::find_by_id(variant_id).one(db).await?.is_none() {
        return Err(AppError::not_found("Variant", variant_id));
    }
    Ok(())
}

async fn find_for_variant<C: ConnectionTrait>(
    db: &C,
    variant_id: Uuid,
) -> AppResult<Option<InventoryModel>> {
    Ok(Inventories::find()
        .filter(Column::VariantId.eq(variant_id))
        .one(db)
        .await?)
}

pub(crate) fn to_active(record: &InventoryModel) -> ActiveModel {
    ActiveModel {
        id: Set(record.id),
        variant_id: Set(record.variant_id),
        quantity: Set(record.quantity),
        reserved: Set(record.reserved),
        low_stock_threshold: Set(record.low_stock_threshold),
        reorder_point: Set(record.reorder_point),
        reorder_quantity: Set(record.reorder_quantity),
        warehouse_location: Set(record.warehouse_location.clone()),
        adjustment_log: Set(record.adjustment_log.clone()),
        reservation_log: Set(record.reservation_log.clone()),
        release_log: Set(record.release_log.clone()),
        created_at: Set(record.created_at),
        updated_at: Set(record.updated_at),
    }
}

fn rejected(variant_id: Uuid, operation: &str, err: &AppError) {
    tracing::warn!(
        %variant_id,
        operation,
        kind = err.kind(),
        error = %err,
        "inventory operation rejected"
    );
}

fn last_reference(entry: Option<&crate::entity::types::ReservationEntry>) -> String {
    entry.map(|e| e.reference.clone()).unwrap_or_default()
}
