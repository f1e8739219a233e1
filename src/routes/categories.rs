use axum::{
    Json, Router,
    extract::{Path, Query, State},
    http::StatusCode,
    routing::get,
};
use uuid::Uuid;

use crate::{
    dto::{
        categories::{CategoryDetail, CategoryList, CreateCategoryRequest, UpdateCategoryRequest},
        products::ProductList,
    },
    error::AppResult,
    models::Category,
    response::ApiResponse,
    routes::params::{CategoryFilter, Pagination},
    services::category_service,
    state::AppState,
};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(list_categories).post(create_category))
        .route(
            "/{id}",
            get(get_category).put(update_category).delete(delete_category),
        )
        .route("/{id}/products", get(list_category_products))
}

#[utoipa::path(
    get,
    path = "/api/categories",
    params(
        ("page" = Option<i64>, Query, description = "Page number, default 1"),
        ("per_page" = Option<i64>, Query, description = "Items per page, default 20, max 100"),
        ("active" = Option<bool>, Query, description = "Filter by active flag"),
        ("parent" = Option<String>, Query, description = "Parent category ID, or `null` for top-level"),
        ("sort_by" = Option<String>, Query, description = "Sort by: name, created_at"),
        ("sort_order" = Option<String>, Query, description = "Sort order: asc, desc")
    ),
    responses(
        (status = 200, description = "List categories", body = ApiResponse<CategoryList>)
    ),
    tag = "Categories"
)]
pub async fn list_categories(
    State(state): State<AppState>,
    Query(pagination): Query<Pagination>,
    Query(filter): Query<CategoryFilter>,
) -> AppResult<Json<ApiResponse<CategoryList>>> {
    let resp = category_service::list_categories(&state, pagination, filter).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    get,
    path = "/api/categories/{id}",
    params(
        ("id" = String, Path, description = "Category ID or slug")
    ),
    responses(
        (status = 200, description = "Category with parent and subcategories", body = ApiResponse<CategoryDetail>),
        (status = 404, description = "Not Found")
    ),
    tag = "Categories"
)]
pub async fn get_category(
    State(state): State<AppState>,
    Path(key): Path<String>,
) -> AppResult<Json<ApiResponse<CategoryDetail>>> {
    let resp = category_service::get_category(&state, &key).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    post,
    path = "/api/categories",
    request_body = CreateCategoryRequest,
    responses(
        (status = 201, description = "Create category", body = ApiResponse<Category>),
        (status = 400, description = "Validation error"),
        (status = 404, description = "Parent not found"),
        (status = 409, description = "Duplicate slug")
    ),
    tag = "Categories"
)]
pub async fn create_category(
    State(state): State<AppState>,
    Json(payload): Json<CreateCategoryRequest>,
) -> AppResult<(StatusCode, Json<ApiResponse<Category>>)> {
    let resp = category_service::create_category(&state, payload).await?;
    Ok((StatusCode::CREATED, Json(resp)))
}

#[utoipa::path(
    put,
    path = "/api/categories/{id}",
    params(
        ("id" = Uuid, Path, description = "Category ID")
    ),
    request_body = UpdateCategoryRequest,
    responses(
        (status = 200, description = "Update category", body = ApiResponse<Category>),
        (status = 400, description = "Self parent or cycle"),
        (status = 404, description = "Not Found"),
        (status = 409, description = "Duplicate slug")
    ),
    tag = "Categories"
)]
pub async fn update_category(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(payload): Json<UpdateCategoryRequest>,
) -> AppResult<Json<ApiResponse<Category>>> {
    let resp = category_service::update_category(&state, id, payload).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    delete,
    path = "/api/categories/{id}",
    params(
        ("id" = Uuid, Path, description = "Category ID")
    ),
    responses(
        (status = 200, description = "Delete category"),
        (status = 404, description = "Not Found"),
        (status = 409, description = "Category has subcategories")
    ),
    tag = "Categories"
)]
pub async fn delete_category(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> AppResult<Json<ApiResponse<serde_json::Value>>> {
    let resp = category_service::delete_category(&state, id).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    get,
    path = "/api/categories/{id}/products",
    params(
        ("id" = String, Path, description = "Category ID or slug"),
        ("page" = Option<i64>, Query, description = "Page number, default 1"),
        ("per_page" = Option<i64>, Query, description = "Items per page, default 20, max 100")
    ),
    responses(
        (status = 200, description = "Products in the category", body = ApiResponse<ProductList>),
        (status = 404, description = "Not Found")
    ),
    tag = "Categories"
)]
pub async fn list_category_products(
    State(state): State<AppState>,
    Path(key): Path<String>,
    Query(pagination): Query<Pagination>,
) -> AppResult<Json<ApiResponse<ProductList>>> {
    let resp = category_service::list_category_products(&state, &key, pagination).await?;
    Ok(Json(resp))
}
