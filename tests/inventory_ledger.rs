use chrono::Utc;
use catalog_api::{
    dto::inventory::{AdjustInventoryRequest, StockMovementRequest, UpdateInventoryRequest},
    entity::{
        inventories, variants,
        types::{Attributes, Images},
    },
    error::AppError,
    ledger,
    services::inventory_service,
    state::AppState,
};
use rust_decimal_macros::dec;
use sea_orm::{DatabaseBackend, MockDatabase, MockExecResult};
use uuid::Uuid;

fn variant() -> variants::Model {
    let now = Utc::now();
    variants::Model {
        id: Uuid::new_v4(),
        product_id: Uuid::new_v4(),
        sku: "TEE-RED-M".into(),
        name: "Red / M".into(),
        attributes: Attributes::default(),
        price_difference: dec!(0),
        active: true,
        images: Images::default(),
        created_at: now.into(),
        updated_at: now.into(),
    }
}

fn stocked(variant_id: Uuid, quantity: i32, reserved: i32) -> inventories::Model {
    let mut record = ledger::new_record(variant_id, Utc::now());
    record.quantity = quantity;
    record.reserved = reserved;
    record
}

fn updated(rows_affected: u64) -> MockExecResult {
    MockExecResult {
        last_insert_id: 0,
        rows_affected,
    }
}

/// Mock store holding `variant` and its inventory, followed by one update result.
fn state_with(
    variant: &variants::Model,
    inventory: &inventories::Model,
    rows_affected: Option<u64>,
) -> AppState {
    let mut db = MockDatabase::new(DatabaseBackend::Postgres)
        .append_query_results([vec![variant.clone()]])
        .append_query_results([vec![inventory.clone()]]);
    if let Some(rows) = rows_affected {
        db = db.append_exec_results([updated(rows)]);
    }
    AppState::new(db.into_connection())
}

#[tokio::test]
async fn reserve_moves_stock_into_reserved() {
    let variant = variant();
    let inventory = stocked(variant.id, 10, 2);
    let state = state_with(&variant, &inventory, Some(1));

    let resp = inventory_service::reserve_inventory(
        &state,
        variant.id,
        StockMovementRequest {
            quantity: 5,
            reference: Some("order-1".into()),
        },
    )
    .await
    .unwrap();

    let data = resp.data.unwrap();
    assert_eq!(data.inventory.reserved, 7);
    assert_eq!(data.inventory.available, 3);
    assert_eq!(data.reservation.quantity, 5);
    assert_eq!(data.reservation.reference, "order-1");
    assert_eq!(data.inventory.reservation_log.len(), 1);

    let log = state.orm.into_transaction_log();
    assert_eq!(log.len(), 3);
    let update = format!("{:?}", log[2]);
    assert!(update.contains("UPDATE") && update.contains("inventories"));
}

#[tokio::test]
async fn reserve_beyond_available_leaves_store_untouched() {
    let variant = variant();
    let inventory = stocked(variant.id, 10, 7);
    let state = state_with(&variant, &inventory, None);

    let err = inventory_service::reserve_inventory(
        &state,
        variant.id,
        StockMovementRequest {
            quantity: 5,
            reference: None,
        },
    )
    .await
    .unwrap_err();

    assert!(matches!(err, AppError::InsufficientAvailable(_)));
    assert_eq!(state.orm.into_transaction_log().len(), 2);
}

#[tokio::test]
async fn release_more_than_reserved_is_rejected() {
    let variant = variant();
    let inventory = stocked(variant.id, 10, 3);
    let state = state_with(&variant, &inventory, None);

    let err = inventory_service::release_inventory(
        &state,
        variant.id,
        StockMovementRequest {
            quantity: 4,
            reference: None,
        },
    )
    .await
    .unwrap_err();

    assert!(matches!(err, AppError::OverRelease(_)));
}

#[tokio::test]
async fn adjust_reports_previous_and_current_quantity() {
    let variant = variant();
    let inventory = stocked(variant.id, 10, 0);
    let state = state_with(&variant, &inventory, Some(1));

    let resp = inventory_service::adjust_inventory(
        &state,
        variant.id,
        AdjustInventoryRequest {
            adjustment: -4,
            reason: Some("damaged".into()),
        },
    )
    .await
    .unwrap();

    let data = resp.data.unwrap();
    assert_eq!(data.adjustment.previous, 10);
    assert_eq!(data.adjustment.current, 6);
    assert_eq!(data.adjustment.difference, -4);
    assert_eq!(data.inventory.adjustment_log[0].reason, "damaged");
}

#[tokio::test]
async fn adjust_below_zero_is_invalid() {
    let variant = variant();
    let inventory = stocked(variant.id, 10, 0);
    let state = state_with(&variant, &inventory, None);

    let err = inventory_service::adjust_inventory(
        &state,
        variant.id,
        AdjustInventoryRequest {
            adjustment: -15,
            reason: None,
        },
    )
    .await
    .unwrap_err();

    assert!(matches!(err, AppError::InvalidAdjustment(_)));
    assert_eq!(err.status_code(), axum::http::StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn lost_update_surfaces_as_conflict() {
    let variant = variant();
    let inventory = stocked(variant.id, 10, 0);
    let state = state_with(&variant, &inventory, Some(0));

    let err = inventory_service::adjust_inventory(
        &state,
        variant.id,
        AdjustInventoryRequest {
            adjustment: 5,
            reason: None,
        },
    )
    .await
    .unwrap_err();

    assert!(matches!(err, AppError::Conflict(_)));
    assert_eq!(err.status_code(), axum::http::StatusCode::CONFLICT);
}

#[tokio::test]
async fn set_rejects_reserved_above_quantity() {
    let variant = variant();
    let inventory = stocked(variant.id, 10, 2);
    let state = state_with(&variant, &inventory, None);

    let err = inventory_service::set_inventory(
        &state,
        variant.id,
        UpdateInventoryRequest {
            quantity: Some(3),
            reserved: Some(4),
            ..Default::default()
        },
    )
    .await
    .unwrap_err();

    assert!(matches!(err, AppError::Validation(_)));
}

#[tokio::test]
async fn unknown_variant_is_not_found() {
    let state = AppState::new(
        MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([Vec::<variants::Model>::new()])
            .into_connection(),
    );

    let err = inventory_service::get_inventory(&state, Uuid::new_v4())
        .await
        .unwrap_err();

    assert!(matches!(err, AppError::NotFound(_)));
}

#[tokio::test]
async fn first_read_creates_default_record() {
    let variant = variant();
    let created = ledger::new_record(variant.id, Utc::now());
    let state = AppState::new(
        MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([vec![variant.clone()]])
            .append_query_results([Vec::<inventories::Model>::new()])
            .append_query_results([vec![created.clone()]])
            .into_connection(),
    );

    let resp = inventory_service::get_inventory(&state, variant.id)
        .await
        .unwrap();

    let data = resp.data.unwrap();
    assert_eq!(data.variant_id, variant.id);
    assert_eq!(data.quantity, 0);
    assert_eq!(data.warehouse_location, "Main Warehouse");
    assert!(data.is_low_stock);
    assert!(data.needs_reorder);

    let log = state.orm.into_transaction_log();
    let insert = format!("{:?}", log[2]);
    assert!(insert.contains("INSERT INTO") && insert.contains("inventories"));
}
