use axum::{
    Json, Router,
    extract::{Query, State},
    routing::get,
};

use crate::{
    dto::search::{
        CategorySearchResult, ProductSearchResult, SearchQuery, SuggestionQuery, Suggestions,
    },
    error::AppResult,
    response::ApiResponse,
    services::search_service,
    state::AppState,
};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/products", get(search_products))
        .route("/categories", get(search_categories))
        .route("/suggestions", get(suggestions))
}

#[utoipa::path(
    get,
    path = "/api/search/products",
    params(
        ("q" = String, Query, description = "Text matched against name, description and tags")
    ),
    responses(
        (status = 200, description = "Matching products", body = ApiResponse<ProductSearchResult>),
        (status = 400, description = "Missing query")
    ),
    tag = "Search"
)]
pub async fn search_products(
    State(state): State<AppState>,
    Query(query): Query<SearchQuery>,
) -> AppResult<Json<ApiResponse<ProductSearchResult>>> {
    let resp = search_service::search_products(&state, query.q).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    get,
    path = "/api/search/categories",
    params(
        ("q" = String, Query, description = "Text matched against category names")
    ),
    responses(
        (status = 200, description = "Matching categories", body = ApiResponse<CategorySearchResult>),
        (status = 400, description = "Missing query")
    ),
    tag = "Search"
)]
pub async fn search_categories(
    State(state): State<AppState>,
    Query(query): Query<SearchQuery>,
) -> AppResult<Json<ApiResponse<CategorySearchResult>>> {
    let resp = search_service::search_categories(&state, query.q).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    get,
    path = "/api/search/suggestions",
    params(
        ("prefix" = String, Query, description = "Start of a product name")
    ),
    responses(
        (status = 200, description = "Up to five product names", body = ApiResponse<Suggestions>),
        (status = 400, description = "Missing prefix")
    ),
    tag = "Search"
)]
pub async fn suggestions(
    State(state): State<AppState>,
    Query(query): Query<SuggestionQuery>,
) -> AppResult<Json<ApiResponse<Suggestions>>> {
    let resp = search_service::suggestions(&state, query.prefix).await?;
    Ok(Json(resp))
}
