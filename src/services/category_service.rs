use std::collections::HashSet;

use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, Condition, ConnectionTrait, EntityTrait, PaginatorTrait,
    QueryFilter, QueryOrder, QuerySelect, Set, TransactionTrait,
};
use uuid::Uuid;

use crate::{
    dto::{
        categories::{CategoryDetail, CategoryList, CreateCategoryRequest, UpdateCategoryRequest},
        products::ProductList,
    },
    entity::{
        Categories, ProductCategories,
        categories::{ActiveModel, Column, Model as CategoryModel},
        product_categories,
    },
    error::{AppError, AppResult},
    models::{Category, CategoryRef},
    response::{ApiResponse, Meta},
    routes::params::{CategoryFilter, CategorySortBy, Pagination, ProductFilter, SortOrder},
    services::product_service,
    slug::{IdOrSlug, slugify},
    state::AppState,
};

const MAX_NAME_LEN: usize = 50;
const MAX_DESCRIPTION_LEN: usize = 500;

pub async fn list_categories(
    state: &AppState,
    pagination: Pagination,
    filter: CategoryFilter,
) -> AppResult<ApiResponse<CategoryList>> {
    let (page, limit, offset) = pagination.normalize();
    let mut condition = Condition::all();

    if let Some(active) = filter.active {
        condition = condition.add(Column::Active.eq(active));
    }

    match filter.parent.as_deref() {
        None => {}
        Some("null") | Some("") => condition = condition.add(Column::ParentId.is_null()),
        Some(raw) => {
            let parent_id = Uuid::parse_str(raw)
                .map_err(|_| AppError::Validation(format!("Invalid parent id: {raw}")))?;
            condition = condition.add(Column::ParentId.eq(parent_id));
        }
    }

    let sort_col = match filter.sort_by.unwrap_or(CategorySortBy::Name) {
        CategorySortBy::Name => Column::Name,
        CategorySortBy::CreatedAt => Column::CreatedAt,
    };
    let mut finder = Categories::find().filter(condition);
    finder = match filter.sort_order.unwrap_or(SortOrder::Asc) {
        SortOrder::Asc => finder.order_by_asc(sort_col),
        SortOrder::Desc => finder.order_by_desc(sort_col),
    };

    let total = finder.clone().count(&state.orm).await? as i64;
    let items = finder
        .limit(limit as u64)
        .offset(offset as u64)
        .all(&state.orm)
        .await?
        .into_iter()
        .map(Category::from)
        .collect();

    Ok(ApiResponse::success(
        "Categories retrieved successfully",
        CategoryList { items },
        Some(Meta::new(page, limit, total)),
    ))
}

pub async fn get_category(state: &AppState, key: &str) -> AppResult<ApiResponse<CategoryDetail>> {
    let model = find_by_key(&state.orm, key).await?;

    let parent = match model.parent_id {
        Some(parent_id) => Categories::find_by_id(parent_id).one(&state.orm).await?,
        None => None,
    };
    let subcategories = Categories::find()
        .filter(Column::ParentId.eq(model.id))
        .order_by_asc(Column::Name)
        .all(&state.orm)
        .await?;

    Ok(ApiResponse::success(
        "Category retrieved successfully",
        CategoryDetail {
            parent: parent.as_ref().map(CategoryRef::from),
            subcategories: subcategories.iter().map(CategoryRef::from).collect(),
            category: Category::from(model),
        },
        None,
    ))
}

pub async fn create_category(
    state: &AppState,
    payload: CreateCategoryRequest,
) -> AppResult<ApiResponse<Category>> {
    let name = validate_name(&payload.name)?;
    let description = validate_description(payload.description)?;

    if let Some(parent_id) = payload.parent_id {
        ensure_exists(&state.orm, parent_id).await?;
    }

    let now = Utc::now();
    let category = ActiveModel {
        id: Set(Uuid::new_v4()),
        slug: Set(slugify(&name)),
        name: Set(name),
        description: Set(description),
        parent_id: Set(payload.parent_id),
        active: Set(payload.active.unwrap_or(true)),
        created_at: Set(now.into()),
        updated_at: Set(now.into()),
    }
    .insert(&state.orm)
    .await?;

    tracing::info!(category_id = %category.id, slug = %category.slug, "category created");

    Ok(ApiResponse::success(
        "Category created successfully",
        Category::from(category),
        Some(Meta::empty()),
    ))
}

pub async fn update_category(
    state: &AppState,
    id: Uuid,
    payload: UpdateCategoryRequest,
) -> AppResult<ApiResponse<Category>> {
    let txn = state.orm.begin().await?;
    let existing = Categories::find_by_id(id)
        .one(&txn)
        .await?
        .ok_or_else(|| AppError::not_found("Category", id))?;

    let mut active: ActiveModel = existing.into();
    if let Some(name) = payload.name {
        let name = validate_name(&name)?;
        active.slug = Set(slugify(&name));
        active.name = Set(name);
    }
    if payload.description.is_some() {
        active.description = Set(validate_description(payload.description)?);
    }
    match payload.parent_id {
        None => {}
        Some(None) => active.parent_id = Set(None),
        Some(Some(parent_id)) => {
            if parent_id == id {
                return Err(AppError::Validation(
                    "Category cannot be its own parent".into(),
                ));
            }
            ensure_exists(&txn, parent_id).await?;
            if has_ancestor(&txn, parent_id, id).await? {
                return Err(AppError::Validation(
                    "Circular reference detected in category hierarchy".into(),
                ));
            }
            active.parent_id = Set(Some(parent_id));
        }
    }
    if let Some(flag) = payload.active {
        active.active = Set(flag);
    }
    active.updated_at = Set(Utc::now().into());

    let category = active.update(&txn).await?;
    txn.commit().await?;

    tracing::info!(category_id = %category.id, "category updated");

    Ok(ApiResponse::success(
        "Category updated successfully",
        Category::from(category),
        Some(Meta::empty()),
    ))
}

pub async fn delete_category(
    state: &AppState,
    id: Uuid,
) -> AppResult<ApiResponse<serde_json::Value>> {
    let txn = state.orm.begin().await?;
    ensure_exists(&txn, id).await?;

    let children = Categories::find()
        .filter(Column::ParentId.eq(id))
        .count(&txn)
        .await?;
    if children > 0 {
        tracing::warn!(category_id = %id, children, "category delete blocked by subcategories");
        return Err(AppError::ReferentialConflict(
            "Cannot delete category with subcategories. Please delete or reassign subcategories first."
                .into(),
        ));
    }

    ProductCategories::delete_many()
        .filter(product_categories::Column::CategoryId.eq(id))
        .exec(&txn)
        .await?;
    Categories::delete_by_id(id).exec(&txn).await?;
    txn.commit().await?;

    tracing::info!(category_id = %id, "category deleted");

    Ok(ApiResponse::success(
        "Category deleted successfully",
        serde_json::json!({}),
        Some(Meta::empty()),
    ))
}

/// Products that belong to the category named by id or slug.
pub async fn list_category_products(
    state: &AppState,
    key: &str,
    pagination: Pagination,
) -> AppResult<ApiResponse<ProductList>> {
    let category = find_by_key(&state.orm, key).await?;
    let filter = ProductFilter {
        category: Some(category.id),
        ..Default::default()
    };
    product_service::list_products(state, pagination, filter).await
}

async fn find_by_key<C: ConnectionTrait>(db: &C, key: &str) -> AppResult<CategoryModel> {
    let condition = match IdOrSlug::parse(key) {
        IdOrSlug::Id(id) => Column::Id.eq(id),
        IdOrSlug::Slug(slug) => Column::Slug.eq(slug),
    };
    Categories::find()
        .filter(condition)
        .one(db)
        .await?
        .ok_or_else(|| AppError::not_found("Category", key))
}

async fn ensure_exists<C: ConnectionTrait>(db: &C, id: Uuid) -> AppResult<()> {
    if Categories::find_by_id(id).one(db).await?.is_none() {
        return Err(AppError::not_found("Category", id));
    }
    Ok(())
}

/// Walks up from `start` and reports whether `target` is on the way to the root.
async fn has_ancestor<C: ConnectionTrait>(db: &C, start: Uuid, target: Uuid) -> AppResult<bool> {
    let mut seen = HashSet::new();
    let mut current = Some(start);
    while let Some(id) = current {
        if id == target {
            return Ok(true);
        }
        if !seen.insert(id) {
            break;
        }
        current = Categories::find_by_id(id)
            .one(db)
            .await?
            .and_then(|c| c.parent_id);
    }
    Ok(false)
}

fn validate_name(name: &str) -> AppResult<String> {
    let name = name.trim();
    if name.is_empty() {
        return Err(AppError::Validation("Category name is required".into()));
    }
    if name.chars().count() > MAX_NAME_LEN {
        return Err(AppError::Validation(format!(
            "Category name cannot be more than {MAX_NAME_LEN} characters"
        )));
    }
    Ok(name.to_string())
}

fn validate_description(description: Option<String>) -> AppResult<Option<String>> {
    let description = description
        .map(|d| d.trim().to_string())
        .filter(|d| !d.is_empty());
    if let Some(d) = &description {
        if d.chars().count() > MAX_DESCRIPTION_LEN {
            return Err(AppError::Validation(format!(
                "Description cannot be more than {MAX_DESCRIPTION_LEN} characters"
            )));
        }
    }
    Ok(description)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn name_length_is_bounded() {
        assert_eq!(validate_name(" Shoes ").unwrap(), "Shoes");
        assert!(validate_name("").is_err());
        assert!(validate_name(&"a".repeat(51)).is_err());
    }

    #[test]
    fn blank_description_is_dropped() {
        assert_eq!(validate_description(Some("  ".into())).unwrap(), None);
        assert_eq!(
            validate_description(Some(" Footwear ".into())).unwrap(),
            Some("Footwear".into())
        );
        assert!(validate_description(Some("x".repeat(501))).is_err());
    }
}
