use chrono::Utc;
use rust_decimal::Decimal;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, EntityTrait, LoaderTrait, ModelTrait, QueryFilter, QueryOrder,
    Set, TransactionTrait,
};
use uuid::Uuid;

use crate::{
    dto::variants::{
        CreateVariantRequest, UpdateVariantRequest, VariantDetail, VariantList, VariantProduct,
    },
    entity::{
        Inventories, Products, Variants, inventories,
        types::{Attributes, Images},
        variants::{ActiveModel, Column},
    },
    error::{AppError, AppResult},
    ledger,
    models::Variant,
    response::{ApiResponse, Meta},
    services::inventory_service,
    state::AppState,
};

pub async fn list_variants(
    state: &AppState,
    product_id: Uuid,
) -> AppResult<ApiResponse<VariantList>> {
    if Products::find_by_id(product_id).one(&state.orm).await?.is_none() {
        return Err(AppError::not_found("Product", product_id));
    }

    let variants = Variants::find()
        .filter(Column::ProductId.eq(product_id))
        .order_by_asc(Column::CreatedAt)
        .all(&state.orm)
        .await?;
    let inventories = variants.load_one(Inventories, &state.orm).await?;
    let items: Vec<Variant> = variants
        .into_iter()
        .zip(inventories)
        .map(|(variant, inventory)| Variant::from_entity(variant, inventory))
        .collect();

    Ok(ApiResponse::success(
        "Variants retrieved successfully",
        VariantList { items },
        None,
    ))
}

pub async fn get_variant(state: &AppState, id: Uuid) -> AppResult<ApiResponse<VariantDetail>> {
    let variant = Variants::find_by_id(id)
        .one(&state.orm)
        .await?
        .ok_or_else(|| AppError::not_found("Variant", id))?;
    let product = variant
        .find_related(Products)
        .one(&state.orm)
        .await?
        .ok_or_else(|| AppError::not_found("Product", variant.product_id))?;
    let inventory = variant.find_related(Inventories).one(&state.orm).await?;

    let unit_price = variant.unit_price(product.base_price);
    Ok(ApiResponse::success(
        "Variant retrieved successfully",
        VariantDetail {
            variant: Variant::from_entity(variant, inventory),
            product: VariantProduct {
                id: product.id,
                name: product.name,
                sku: product.sku,
                base_price: product.base_price,
            },
            unit_price,
        },
        None,
    ))
}

/// Creates a variant under `product_id`, opening its inventory when
/// `initial_inventory` is given.
pub async fn create_variant(
    state: &AppState,
    product_id: Uuid,
    payload: CreateVariantRequest,
) -> AppResult<ApiResponse<Variant>> {
    let sku = required(&payload.sku, "SKU")?;
    let name = required(&payload.name, "Variant name")?;

    let txn = state.orm.begin().await?;
    if Products::find_by_id(product_id).one(&txn).await?.is_none() {
        return Err(AppError::not_found("Product", product_id));
    }

    let now = Utc::now();
    let variant = ActiveModel {
        id: Set(Uuid::new_v4()),
        product_id: Set(product_id),
        sku: Set(sku),
        name: Set(name),
        attributes: Set(Attributes(payload.attributes)),
        price_difference: Set(payload.price_difference.unwrap_or(Decimal::ZERO)),
        active: Set(payload.active.unwrap_or(true)),
        images: Set(Images(payload.images)),
        created_at: Set(now.into()),
        updated_at: Set(now.into()),
    }
    .insert(&txn)
    .await?;

    let inventory = match payload.initial_inventory {
        Some(initial) => {
            let record = ledger::apply_update(&ledger::new_record(variant.id, now), &initial, now)?;
            Some(inventory_service::to_active(&record).insert(&txn).await?)
        }
        None => None,
    };
    txn.commit().await?;

    tracing::info!(
        variant_id = %variant.id,
        %product_id,
        sku = %variant.sku,
        stocked = inventory.is_some(),
        "variant created"
    );

    Ok(ApiResponse::success(
        "Variant created successfully",
        Variant::from_entity(variant, inventory),
        Some(Meta::empty()),
    ))
}

pub async fn update_variant(
    state: &AppState,
    id: Uuid,
    payload: UpdateVariantRequest,
) -> AppResult<ApiResponse<Variant>> {
    let existing = Variants::find_by_id(id)
        .one(&state.orm)
        .await?
        .ok_or_else(|| AppError::not_found("Variant", id))?;

    let mut active: ActiveModel = existing.into();
    if let Some(sku) = payload.sku {
        active.sku = Set(required(&sku, "SKU")?);
    }
    if let Some(name) = payload.name {
        active.name = Set(required(&name, "Variant name")?);
    }
    if let Some(attributes) = payload.attributes {
        active.attributes = Set(Attributes(attributes));
    }
    if let Some(price_difference) = payload.price_difference {
        active.price_difference = Set(price_difference);
    }
    if let Some(flag) = payload.active {
        active.active = Set(flag);
    }
    if let Some(images) = payload.images {
        active.images = Set(Images(images));
    }
    active.updated_at = Set(Utc::now().into());

    let variant = active.update(&state.orm).await?;
    let inventory = variant.find_related(Inventories).one(&state.orm).await?;

    tracing::info!(variant_id = %variant.id, "variant updated");

    Ok(ApiResponse::success(
        "Variant updated successfully",
        Variant::from_entity(variant, inventory),
        Some(Meta::empty()),
    ))
}

/// Deletes the variant together with its inventory record.
pub async fn delete_variant(
    state: &AppState,
    id: Uuid,
) -> AppResult<ApiResponse<serde_json::Value>> {
    let txn = state.orm.begin().await?;
    if Variants::find_by_id(id).one(&txn).await?.is_none() {
        return Err(AppError::not_found("Variant", id));
    }

    Inventories::delete_many()
        .filter(inventories::Column::VariantId.eq(id))
        .exec(&txn)
        .await?;
    Variants::delete_by_id(id).exec(&txn).await?;
    txn.commit().await?;

    tracing::info!(variant_id = %id, "variant deleted");

    Ok(ApiResponse::success(
        "Variant deleted successfully",
        serde_json::json!({}),
        Some(Meta::empty()),
    ))
}

fn required(value: &str, field: &str) -> AppResult<String> {
    let value = value.trim();
    if value.is_empty() {
        return Err(AppError::Validation(format!("{field} is required")));
    }
    Ok(value.to_string())
}
