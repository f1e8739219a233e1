use catalog_api::{entity::products, services::search_service, state::AppState};
use sea_orm::{DatabaseBackend, MockDatabase, Value};

fn empty_catalog() -> AppState {
    AppState::new(
        MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([Vec::<products::Model>::new()])
            .into_connection(),
    )
}

fn single_sql(state: AppState) -> (String, Vec<Value>) {
    let log = state.orm.into_transaction_log();
    assert_eq!(log.len(), 1);
    let stmt = &log[0].statements()[0];
    let values = stmt.values.as_ref().map(|v| v.0.clone()).unwrap_or_default();
    (stmt.sql.clone(), values)
}

#[tokio::test]
async fn tags_are_matched_element_by_element() {
    let state = empty_catalog();

    let resp = search_service::search_products(&state, Some("lamp".into()))
        .await
        .unwrap();
    assert_eq!(resp.data.unwrap().count, 0);

    let (sql, values) = single_sql(state);
    assert!(sql.contains(r#"jsonb_array_elements_text("products"."tags")"#), "{sql}");
    assert!(sql.contains("tag ILIKE"), "{sql}");
    assert!(!sql.contains("CAST"), "{sql}");
    assert_eq!(
        values
            .iter()
            .filter(|v| **v == Value::from("%lamp%"))
            .count(),
        3
    );
}

#[tokio::test]
async fn json_punctuation_is_searched_literally() {
    let state = empty_catalog();

    search_service::search_products(&state, Some(r#"lamp", "desk"#.into()))
        .await
        .unwrap();

    let (_, values) = single_sql(state);
    assert!(values.contains(&Value::from(r#"%lamp", "desk%"#)));
}
