use axum::{
    Json, Router,
    extract::{Path, Query, State},
    http::StatusCode,
    routing::get,
};
use uuid::Uuid;

use crate::{
    dto::{
        products::{CreateProductRequest, ProductDetail, ProductList, UpdateProductRequest},
        variants::{CreateVariantRequest, VariantList},
    },
    error::AppResult,
    models::{Product, Variant},
    response::ApiResponse,
    routes::params::{Pagination, ProductFilter},
    services::{product_service, variant_service},
    state::AppState,
};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(list_products).post(create_product))
        .route(
            "/{id}",
            get(get_product).put(update_product).delete(delete_product),
        )
        .route("/{id}/variants", get(list_variants).post(create_variant))
}

#[utoipa::path(
    get,
    path = "/api/products",
    params(
        ("page" = Option<i64>, Query, description = "Page number, default 1"),
        ("per_page" = Option<i64>, Query, description = "Items per page, default 20, max 100"),
        ("category" = Option<Uuid>, Query, description = "Only products in this category"),
        ("featured" = Option<bool>, Query, description = "Filter by featured flag"),
        ("active" = Option<bool>, Query, description = "Filter by active flag"),
        ("min_price" = Option<String>, Query, description = "Minimum base price"),
        ("max_price" = Option<String>, Query, description = "Maximum base price"),
        ("sort_by" = Option<String>, Query, description = "Sort by: created_at, name, base_price, sku"),
        ("sort_order" = Option<String>, Query, description = "Sort order: asc, desc")
    ),
    responses(
        (status = 200, description = "List products", body = ApiResponse<ProductList>)
    ),
    tag = "Products"
)]
pub async fn list_products(
    State(state): State<AppState>,
    Query(pagination): Query<Pagination>,
    Query(filter): Query<ProductFilter>,
) -> AppResult<Json<ApiResponse<ProductList>>> {
    let resp = product_service::list_products(&state, pagination, filter).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    get,
    path = "/api/products/{id}",
    params(
        ("id" = String, Path, description = "Product ID or slug")
    ),
    responses(
        (status = 200, description = "Product with categories and variants", body = ApiResponse<ProductDetail>),
        (status = 404, description = "Not Found")
    ),
    tag = "Products"
)]
pub async fn get_product(
    State(state): State<AppState>,
    Path(key): Path<String>,
) -> AppResult<Json<ApiResponse<ProductDetail>>> {
    let resp = product_service::get_product(&state, &key).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    post,
    path = "/api/products",
    request_body = CreateProductRequest,
    responses(
        (status = 201, description = "Create product", body = ApiResponse<Product>),
        (status = 400, description = "Validation error"),
        (status = 409, description = "Duplicate SKU or slug")
    ),
    tag = "Products"
)]
pub async fn create_product(
    State(state): State<AppState>,
    Json(payload): Json<CreateProductRequest>,
) -> AppResult<(StatusCode, Json<ApiResponse<Product>>)> {
    let resp = product_service::create_product(&state, payload).await?;
    Ok((StatusCode::CREATED, Json(resp)))
}

#[utoipa::path(
    put,
    path = "/api/products/{id}",
    params(
        ("id" = Uuid, Path, description = "Product ID")
    ),
    request_body = UpdateProductRequest,
    responses(
        (status = 200, description = "Update product", body = ApiResponse<Product>),
        (status = 400, description = "Validation error"),
        (status = 404, description = "Not Found"),
        (status = 409, description = "Duplicate SKU or slug")
    ),
    tag = "Products"
)]
pub async fn update_product(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(payload): Json<UpdateProductRequest>,
) -> AppResult<Json<ApiResponse<Product>>> {
    let resp = product_service::update_product(&state, id, payload).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    delete,
    path = "/api/products/{id}",
    params(
        ("id" = Uuid, Path, description = "Product ID")
    ),
    responses(
        (status = 200, description = "Delete product"),
        (status = 404, description = "Not Found"),
        (status = 409, description = "Product still has variants")
    ),
    tag = "Products"
)]
pub async fn delete_product(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> AppResult<Json<ApiResponse<serde_json::Value>>> {
    let resp = product_service::delete_product(&state, id).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    get,
    path = "/api/products/{id}/variants",
    params(
        ("id" = Uuid, Path, description = "Product ID")
    ),
    responses(
        (status = 200, description = "Variants of the product with inventory", body = ApiResponse<VariantList>),
        (status = 404, description = "Not Found")
    ),
    tag = "Variants"
)]
pub async fn list_variants(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> AppResult<Json<ApiResponse<VariantList>>> {
    let resp = variant_service::list_variants(&state, id).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    post,
    path = "/api/products/{id}/variants",
    params(
        ("id" = Uuid, Path, description = "Product ID")
    ),
    request_body = CreateVariantRequest,
    responses(
        (status = 201, description = "Create variant", body = ApiResponse<Variant>),
        (status = 400, description = "Validation error"),
        (status = 404, description = "Not Found"),
        (status = 409, description = "Duplicate SKU")
    ),
    tag = "Variants"
)]
pub async fn create_variant(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(payload): Json<CreateVariantRequest>,
) -> AppResult<(StatusCode, Json<ApiResponse<Variant>>)> {
    let resp = variant_service::create_variant(&state, id, payload).await?;
    Ok((StatusCode::CREATED, Json(resp)))
}
