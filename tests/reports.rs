use std::collections::BTreeMap;

use chrono::Utc;
use catalog_api::{
    dto::reports::LowStockQuery,
    entity::{
        inventories, products, variants,
        types::{Attributes, Images, Tags},
    },
    error::AppError,
    ledger,
    services::report_service,
    state::AppState,
};
use rust_decimal_macros::dec;
use sea_orm::{DatabaseBackend, MockDatabase, Value};
use uuid::Uuid;

fn product() -> products::Model {
    let now = Utc::now();
    products::Model {
        id: Uuid::new_v4(),
        name: "Desk Lamp".into(),
        description: "Adjustable".into(),
        slug: "desk-lamp".into(),
        sku: "LAMP".into(),
        base_price: dec!(40.00),
        discount_percent: dec!(0),
        tags: Tags(vec!["lamp".into(), "desk".into()]),
        attributes: Attributes::default(),
        images: Images::default(),
        active: true,
        featured: false,
        created_at: now.into(),
        updated_at: now.into(),
    }
}

fn variant(product_id: Uuid) -> variants::Model {
    let now = Utc::now();
    variants::Model {
        id: Uuid::new_v4(),
        product_id,
        sku: "LAMP-BLK".into(),
        name: "Black".into(),
        attributes: Attributes::default(),
        price_difference: dec!(0),
        active: true,
        images: Images::default(),
        created_at: now.into(),
        updated_at: now.into(),
    }
}

fn no_inventories() -> AppState {
    AppState::new(
        MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([Vec::<inventories::Model>::new()])
            .into_connection(),
    )
}

/// SQL and bound values of every statement the connection saw.
fn statements(state: AppState) -> Vec<(String, Vec<Value>)> {
    state
        .orm
        .into_transaction_log()
        .iter()
        .flat_map(|txn| txn.statements().to_vec())
        .map(|stmt| {
            let values = stmt.values.map(|v| v.0).unwrap_or_default();
            (stmt.sql, values)
        })
        .collect()
}

#[tokio::test]
async fn low_stock_compares_available_with_each_record_threshold() {
    let product = product();
    let variant = variant(product.id);
    let mut at_threshold = ledger::new_record(variant.id, Utc::now());
    at_threshold.quantity = 7;
    at_threshold.reserved = 2;

    let state = AppState::new(
        MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([vec![at_threshold.clone()]])
            .append_query_results([vec![variant.clone()]])
            .append_query_results([vec![product.clone()]])
            .into_connection(),
    );

    let report = report_service::low_stock_report(&state, LowStockQuery::default())
        .await
        .unwrap()
        .data
        .unwrap();
    assert_eq!(report.count, 1);
    assert_eq!(report.items[0].inventory.available, 5);
    assert_eq!(report.items[0].inventory.low_stock_threshold, 5);
    assert_eq!(report.items[0].product.id, product.id);
    assert!(report.items[0].reorder.is_none());

    let stmts = statements(state);
    assert_eq!(stmts.len(), 3);
    let (sql, _) = &stmts[0];
    assert!(
        sql.contains(r#""quantity" - "reserved" <= "low_stock_threshold""#),
        "{sql}"
    );
    assert!(sql.contains("ORDER BY"), "{sql}");
}

#[tokio::test]
async fn explicit_threshold_replaces_record_threshold() {
    let state = no_inventories();

    let report = report_service::low_stock_report(&state, LowStockQuery { threshold: Some(3) })
        .await
        .unwrap()
        .data
        .unwrap();
    assert_eq!(report.count, 0);

    let stmts = statements(state);
    let (sql, values) = &stmts[0];
    assert!(sql.contains(r#""quantity" - "reserved" <= $1"#), "{sql}");
    assert!(!sql.contains(r#"<= "low_stock_threshold""#), "{sql}");
    assert_eq!(values, &vec![Value::Int(Some(3))]);
}

#[tokio::test]
async fn negative_threshold_is_rejected_before_querying() {
    let state = no_inventories();

    let err = report_service::low_stock_report(&state, LowStockQuery { threshold: Some(-1) })
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::Validation(_)));
    assert!(statements(state).is_empty());
}

#[tokio::test]
async fn reorder_uses_reorder_point() {
    let state = no_inventories();

    let report = report_service::reorder_report(&state)
        .await
        .unwrap()
        .data
        .unwrap();
    assert_eq!(report.count, 0);

    let stmts = statements(state);
    let (sql, _) = &stmts[0];
    assert!(sql.contains(r#""quantity" - "reserved" <= "reorder_point""#), "{sql}");
}

#[tokio::test]
async fn summary_counts_each_condition_in_sql() {
    let summary_row = BTreeMap::from([
        ("total_items", Value::BigInt(Some(3))),
        ("total_quantity", Value::BigInt(Some(30))),
        ("total_reserved", Value::BigInt(Some(12))),
        ("low_stock_items", Value::BigInt(Some(1))),
        ("out_of_stock_items", Value::BigInt(Some(1))),
        ("needs_reorder_items", Value::BigInt(Some(2))),
    ]);
    let warehouse_row = BTreeMap::from([
        ("location", Value::from("Main Warehouse")),
        ("count", Value::BigInt(Some(3))),
        ("total_quantity", Value::BigInt(Some(30))),
        ("total_reserved", Value::BigInt(Some(12))),
    ]);
    let state = AppState::new(
        MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([vec![summary_row]])
            .append_query_results([vec![warehouse_row]])
            .into_connection(),
    );

    let report = report_service::inventory_summary(&state)
        .await
        .unwrap()
        .data
        .unwrap();
    assert_eq!(report.summary.total_items, 3);
    assert_eq!(report.summary.total_available, 18);
    assert_eq!(report.summary.out_of_stock_items, 1);
    assert_eq!(report.warehouse_distribution.len(), 1);
    assert_eq!(report.warehouse_distribution[0].available, 18);

    let stmts = statements(state);
    let (summary_sql, _) = &stmts[0];
    assert_eq!(summary_sql.matches("CASE WHEN").count(), 3, "{summary_sql}");
    assert!(summary_sql.contains(r#"<= "low_stock_threshold""#), "{summary_sql}");
    assert!(summary_sql.contains(r#"<= "reorder_point""#), "{summary_sql}");
    assert!(summary_sql.contains(r#"COUNT("id")"#), "{summary_sql}");

    let (warehouse_sql, _) = &stmts[1];
    assert!(
        warehouse_sql.contains(r#"GROUP BY "warehouse_location""#),
        "{warehouse_sql}"
    );
}
