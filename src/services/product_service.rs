use std::collections::HashSet;

use chrono::Utc;
use rust_decimal::Decimal;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, Condition, ConnectionTrait, EntityTrait, LoaderTrait,
    ModelTrait, PaginatorTrait, QueryFilter, QueryOrder, QuerySelect, Set, TransactionTrait,
    sea_query::Query,
};
use uuid::Uuid;

use crate::{
    dto::products::{CreateProductRequest, ProductDetail, ProductList, UpdateProductRequest},
    entity::{
        Categories, Inventories, ProductCategories, Products, Variants, categories,
        product_categories,
        products::{ActiveModel, Column, Model as ProductModel},
        types::{Attributes, Images, Tags},
        variants,
    },
    error::{AppError, AppResult},
    models::{Product, Variant},
    response::{ApiResponse, Meta},
    routes::params::{Pagination, ProductFilter, ProductSortBy, SortOrder},
    slug::{IdOrSlug, slugify},
    state::AppState,
};

const MAX_NAME_LEN: usize = 100;

pub async fn list_products(
    state: &AppState,
    pagination: Pagination,
    filter: ProductFilter,
) -> AppResult<ApiResponse<ProductList>> {
    let (page, limit, offset) = pagination.normalize();
    let mut condition = Condition::all();

    if let Some(category_id) = filter.category {
        condition = condition.add(
            Column::Id.in_subquery(
                Query::select()
                    .column(product_categories::Column::ProductId)
                    .from(ProductCategories)
                    .and_where(product_categories::Column::CategoryId.eq(category_id))
                    .to_owned(),
            ),
        );
    }

    if let Some(featured) = filter.featured {
        condition = condition.add(Column::Featured.eq(featured));
    }

    if let Some(active) = filter.active {
        condition = condition.add(Column::Active.eq(active));
    }

    if let Some(min_price) = filter.min_price {
        condition = condition.add(Column::BasePrice.gte(min_price));
    }

    if let Some(max_price) = filter.max_price {
        condition = condition.add(Column::BasePrice.lte(max_price));
    }

    let sort_by = filter.sort_by.unwrap_or(ProductSortBy::CreatedAt);
    let sort_order = filter.sort_order.unwrap_or(SortOrder::Desc);
    let sort_col = match sort_by {
        ProductSortBy::CreatedAt => Column::CreatedAt,
        ProductSortBy::Name => Column::Name,
        ProductSortBy::BasePrice => Column::BasePrice,
        ProductSortBy::Sku => Column::Sku,
    };

    let mut finder = Products::find().filter(condition);
    finder = match sort_order {
        SortOrder::Asc => finder.order_by_asc(sort_col),
        SortOrder::Desc => finder.order_by_desc(sort_col),
    };

    let total = finder.clone().count(&state.orm).await? as i64;

    let models = finder
        .limit(limit as u64)
        .offset(offset as u64)
        .all(&state.orm)
        .await?;
    let items = with_categories(&state.orm, models).await?;

    let meta = Meta::new(page, limit, total);
    Ok(ApiResponse::success(
        "Products retrieved successfully",
        ProductList { items },
        Some(meta),
    ))
}

/// Looks a product up by id or slug, with categories and stocked variants.
pub async fn get_product(state: &AppState, key: &str) -> AppResult<ApiResponse<ProductDetail>> {
    let model = find_by_key(&state.orm, key).await?;

    let categories = model.find_related(Categories).all(&state.orm).await?;
    let variants = model
        .find_related(Variants)
        .order_by_asc(variants::Column::CreatedAt)
        .all(&state.orm)
        .await?;
    let inventories = variants.load_one(Inventories, &state.orm).await?;
    let variants = variants
        .into_iter()
        .zip(inventories)
        .map(|(variant, inventory)| Variant::from_entity(variant, inventory))
        .collect();

    Ok(ApiResponse::success(
        "Product retrieved successfully",
        ProductDetail {
            product: Product::from_entity(model, &categories),
            variants,
        },
        None,
    ))
}

pub async fn create_product(
    state: &AppState,
    payload: CreateProductRequest,
) -> AppResult<ApiResponse<Product>> {
    let name = validate_name(&payload.name)?;
    let sku = validate_sku(&payload.sku)?;
    let description = payload.description.trim().to_string();
    if description.is_empty() {
        return Err(AppError::Validation("Product description is required".into()));
    }
    validate_price(payload.base_price)?;
    let discount_percent = payload.discount_percent.unwrap_or(Decimal::ZERO);
    validate_discount(discount_percent)?;

    let txn = state.orm.begin().await?;
    let category_ids = ensure_categories_exist(&txn, &payload.categories).await?;

    let now = Utc::now();
    let product = ActiveModel {
        id: Set(Uuid::new_v4()),
        slug: Set(slugify(&name)),
        name: Set(name),
        description: Set(description),
        sku: Set(sku),
        base_price: Set(payload.base_price),
        discount_percent: Set(discount_percent),
        tags: Set(Tags(clean_tags(payload.tags))),
        attributes: Set(Attributes(payload.attributes)),
        images: Set(Images(payload.images)),
        active: Set(payload.active.unwrap_or(true)),
        featured: Set(payload.featured.unwrap_or(false)),
        created_at: Set(now.into()),
        updated_at: Set(now.into()),
    }
    .insert(&txn)
    .await?;

    link_categories(&txn, product.id, &category_ids).await?;
    let categories = load_categories(&txn, &category_ids).await?;
    txn.commit().await?;

    tracing::info!(product_id = %product.id, sku = %product.sku, "product created");

    Ok(ApiResponse::success(
        "Product created successfully",
        Product::from_entity(product, &categories),
        Some(Meta::empty()),
    ))
}

pub async fn update_product(
    state: &AppState,
    id: Uuid,
    payload: UpdateProductRequest,
) -> AppResult<ApiResponse<Product>> {
    let txn = state.orm.begin().await?;
    let existing = Products::find_by_id(id).one(&txn).await?;
    let existing = match existing {
        Some(p) => p,
        None => return Err(AppError::not_found("Product", id)),
    };

    let mut active: ActiveModel = existing.into();
    if let Some(name) = payload.name {
        let name = validate_name(&name)?;
        active.slug = Set(slugify(&name));
        active.name = Set(name);
    }
    if let Some(description) = payload.description {
        active.description = Set(description.trim().to_string());
    }
    if let Some(sku) = payload.sku {
        active.sku = Set(validate_sku(&sku)?);
    }
    if let Some(base_price) = payload.base_price {
        validate_price(base_price)?;
        active.base_price = Set(base_price);
    }
    if let Some(discount) = payload.discount_percent {
        validate_discount(discount)?;
        active.discount_percent = Set(discount);
    }
    if let Some(tags) = payload.tags {
        active.tags = Set(Tags(clean_tags(tags)));
    }
    if let Some(attributes) = payload.attributes {
        active.attributes = Set(Attributes(attributes));
    }
    if let Some(images) = payload.images {
        active.images = Set(Images(images));
    }
    if let Some(flag) = payload.active {
        active.active = Set(flag);
    }
    if let Some(featured) = payload.featured {
        active.featured = Set(featured);
    }
    active.updated_at = Set(Utc::now().into());

    let product = active.update(&txn).await?;

    if let Some(ids) = payload.categories {
        let ids = ensure_categories_exist(&txn, &ids).await?;
        ProductCategories::delete_many()
            .filter(product_categories::Column::ProductId.eq(product.id))
            .exec(&txn)
            .await?;
        link_categories(&txn, product.id, &ids).await?;
    }
    let categories = product.find_related(Categories).all(&txn).await?;
    txn.commit().await?;

    tracing::info!(product_id = %product.id, "product updated");

    Ok(ApiResponse::success(
        "Product updated successfully",
        Product::from_entity(product, &categories),
        Some(Meta::empty()),
    ))
}

/// Deletes a product with no variants left; its category links go with it.
pub async fn delete_product(
    state: &AppState,
    id: Uuid,
) -> AppResult<ApiResponse<serde_json::Value>> {
    let txn = state.orm.begin().await?;
    if Products::find_by_id(id).one(&txn).await?.is_none() {
        return Err(AppError::not_found("Product", id));
    }

    let variant_count = Variants::find()
        .filter(variants::Column::ProductId.eq(id))
        .count(&txn)
        .await?;
    if variant_count > 0 {
        return Err(AppError::ReferentialConflict(format!(
            "Cannot delete product with {variant_count} variant(s)"
        )));
    }

    ProductCategories::delete_many()
        .filter(product_categories::Column::ProductId.eq(id))
        .exec(&txn)
        .await?;
    Products::delete_by_id(id).exec(&txn).await?;
    txn.commit().await?;

    tracing::info!(product_id = %id, "product deleted");

    Ok(ApiResponse::success(
        "Product deleted successfully",
        serde_json::json!({}),
        Some(Meta::empty()),
    ))
}

pub(crate) async fn find_by_key<C: ConnectionTrait>(db: &C, key: &str) -> AppResult<ProductModel> {
    let condition = match IdOrSlug::parse(key) {
        IdOrSlug::Id(id) => Column::Id.eq(id),
        IdOrSlug::Slug(slug) => Column::Slug.eq(slug),
    };
    Products::find()
        .filter(condition)
        .one(db)
        .await?
        .ok_or_else(|| AppError::not_found("Product", key))
}

/// Pairs each product with the categories it belongs to.
pub(crate) async fn with_categories<C: ConnectionTrait>(
    db: &C,
    models: Vec<ProductModel>,
) -> AppResult<Vec<Product>> {
    if models.is_empty() {
        return Ok(Vec::new());
    }
    let categories = models
        .load_many_to_many(Categories, ProductCategories, db)
        .await?;
    Ok(models
        .into_iter()
        .zip(categories)
        .map(|(model, categories)| Product::from_entity(model, &categories))
        .collect())
}

/// Dedupes `ids` and fails when any of them is unknown.
async fn ensure_categories_exist<C: ConnectionTrait>(db: &C, ids: &[Uuid]) -> AppResult<Vec<Uuid>> {
    let mut seen = HashSet::new();
    let ids: Vec<Uuid> = ids.iter().copied().filter(|id| seen.insert(*id)).collect();
    if ids.is_empty() {
        return Ok(ids);
    }

    let found: HashSet<Uuid> = Categories::find()
        .filter(categories::Column::Id.is_in(ids.clone()))
        .all(db)
        .await?
        .into_iter()
        .map(|c| c.id)
        .collect();
    let missing: Vec<String> = ids
        .iter()
        .filter(|id| !found.contains(id))
        .map(Uuid::to_string)
        .collect();
    if !missing.is_empty() {
        return Err(AppError::Validation(format!(
            "Unknown category id(s): {}",
            missing.join(", ")
        )));
    }
    Ok(ids)
}

async fn link_categories<C: ConnectionTrait>(
    db: &C,
    product_id: Uuid,
    ids: &[Uuid],
) -> AppResult<()> {
    if ids.is_empty() {
        return Ok(());
    }
    let links = ids.iter().map(|category_id| product_categories::ActiveModel {
        product_id: Set(product_id),
        category_id: Set(*category_id),
    });
    ProductCategories::insert_many(links)
        .exec_without_returning(db)
        .await?;
    Ok(())
}

async fn load_categories<C: ConnectionTrait>(
    db: &C,
    ids: &[Uuid],
) -> AppResult<Vec<categories::Model>> {
    if ids.is_empty() {
        return Ok(Vec::new());
    }
    Ok(Categories::find()
        .filter(categories::Column::Id.is_in(ids.to_vec()))
        .order_by_asc(categories::Column::Name)
        .all(db)
        .await?)
}

fn validate_name(name: &str) -> AppResult<String> {
    let name = name.trim();
    if name.is_empty() {
        return Err(AppError::Validation("Product name is required".into()));
    }
    if name.chars().count() > MAX_NAME_LEN {
        return Err(AppError::Validation(format!(
            "Product name cannot be more than {MAX_NAME_LEN} characters"
        )));
    }
    Ok(name.to_string())
}

fn validate_sku(sku: &str) -> AppResult<String> {
    let sku = sku.trim();
    if sku.is_empty() {
        return Err(AppError::Validation("SKU is required".into()));
    }
    Ok(sku.to_string())
}

fn validate_price(price: Decimal) -> AppResult<()> {
    if price.is_sign_negative() && !price.is_zero() {
        return Err(AppError::Validation("Price cannot be negative".into()));
    }
    Ok(())
}

fn validate_discount(discount: Decimal) -> AppResult<()> {
    if discount < Decimal::ZERO || discount > Decimal::ONE_HUNDRED {
        return Err(AppError::Validation(
            "Discount must be between 0 and 100".into(),
        ));
    }
    Ok(())
}

fn clean_tags(tags: Vec<String>) -> Vec<String> {
    tags.into_iter()
        .map(|t| t.trim().to_string())
        .filter(|t| !t.is_empty())
        .collect()
}
