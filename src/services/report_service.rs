use std::collections::HashMap;

use rust_decimal::Decimal;
use sea_orm::{
    ColumnTrait, ConnectionTrait, EntityTrait, FromQueryResult, LoaderTrait, QueryFilter,
    QueryOrder, QuerySelect,
    sea_query::{Expr, Func, SimpleExpr},
};

use crate::{
    dto::reports::{
        InventorySummary, InventorySummaryReport, LowStockQuery, ProductSummary, ReorderAdvice,
        StockLevels, StockReport, StockReportItem, Valuation, ValuationItem, ValuationLevels,
        ValuationReport, VariantSummary, WarehouseStock,
    },
    entity::{
        Inventories, Products, Variants,
        inventories::{Column, Model as InventoryModel},
        products, variants,
    },
    error::{AppError, AppResult},
    response::ApiResponse,
    state::AppState,
};

/// An inventory record with the variant and product it belongs to.
struct StockRow {
    inventory: InventoryModel,
    variant: variants::Model,
    product: products::Model,
}

#[derive(Debug, Default, FromQueryResult)]
struct SummaryRow {
    total_items: i64,
    total_quantity: Option<i64>,
    total_reserved: Option<i64>,
    low_stock_items: Option<i64>,
    out_of_stock_items: Option<i64>,
    needs_reorder_items: Option<i64>,
}

#[derive(Debug, FromQueryResult)]
struct WarehouseRow {
    location: String,
    count: i64,
    total_quantity: Option<i64>,
    total_reserved: Option<i64>,
}

pub async fn low_stock_report(
    state: &AppState,
    query: LowStockQuery,
) -> AppResult<ApiResponse<StockReport>> {
    let cutoff: SimpleExpr = match query.threshold {
        Some(t) if t < 0 => {
            return Err(AppError::Validation("Threshold cannot be negative".into()));
        }
        Some(t) => Expr::val(t).into(),
        None => Expr::col(Column::LowStockThreshold).into(),
    };
    let rows = stock_rows(&state.orm, Expr::expr(available()).lte(cutoff)).await?;
    let items: Vec<StockReportItem> = rows.iter().map(|row| stock_item(row, false)).collect();

    tracing::debug!(count = items.len(), threshold = ?query.threshold, "low stock report built");

    Ok(ApiResponse::success(
        "Low stock report generated successfully",
        StockReport {
            count: items.len(),
            items,
        },
        None,
    ))
}

pub async fn reorder_report(state: &AppState) -> AppResult<ApiResponse<StockReport>> {
    let rows = stock_rows(
        &state.orm,
        Expr::expr(available()).lte(Expr::col(Column::ReorderPoint)),
    )
    .await?;
    let items: Vec<StockReportItem> = rows.iter().map(|row| stock_item(row, true)).collect();

    Ok(ApiResponse::success(
        "Reorder report generated successfully",
        StockReport {
            count: items.len(),
            items,
        },
        None,
    ))
}

pub async fn valuation_report(state: &AppState) -> AppResult<ApiResponse<ValuationReport>> {
    let inventories = Inventories::find()
        .order_by_asc(Column::WarehouseLocation)
        .order_by_asc(Column::CreatedAt)
        .all(&state.orm)
        .await?;
    let rows = with_owners(&state.orm, inventories).await?;
    let items: Vec<ValuationItem> = rows.iter().map(valuation_item).collect();
    let total_value = total_value(&items);

    Ok(ApiResponse::success(
        "Inventory valuation report generated successfully",
        ValuationReport {
            total_value,
            count: items.len(),
            items,
        },
        None,
    ))
}

pub async fn inventory_summary(
    state: &AppState,
) -> AppResult<ApiResponse<InventorySummaryReport>> {
    let row = Inventories::find()
        .select_only()
        .column_as(Expr::col(Column::Id).count(), "total_items")
        .column_as(Expr::col(Column::Quantity).sum(), "total_quantity")
        .column_as(Expr::col(Column::Reserved).sum(), "total_reserved")
        .column_as(
            count_where(Expr::expr(available()).lte(Expr::col(Column::LowStockThreshold))),
            "low_stock_items",
        )
        .column_as(count_where(Expr::expr(available()).lte(0)), "out_of_stock_items")
        .column_as(
            count_where(Expr::expr(available()).lte(Expr::col(Column::ReorderPoint))),
            "needs_reorder_items",
        )
        .into_model::<SummaryRow>()
        .one(&state.orm)
        .await?
        .unwrap_or_default();

    let warehouses = Inventories::find()
        .select_only()
        .column_as(Column::WarehouseLocation, "location")
        .column_as(Expr::col(Column::Id).count(), "count")
        .column_as(Expr::col(Column::Quantity).sum(), "total_quantity")
        .column_as(Expr::col(Column::Reserved).sum(), "total_reserved")
        .group_by(Column::WarehouseLocation)
        .order_by_asc(Column::WarehouseLocation)
        .into_model::<WarehouseRow>()
        .all(&state.orm)
        .await?;

    Ok(ApiResponse::success(
        "Inventory summary generated successfully",
        InventorySummaryReport {
            summary: summarize(row),
            warehouse_distribution: warehouses.into_iter().map(warehouse_stock).collect(),
        },
        None,
    ))
}

fn available() -> SimpleExpr {
    Expr::col(Column::Quantity).sub(Expr::col(Column::Reserved))
}

/// `SUM(CASE WHEN cond THEN 1 ELSE 0 END)`
fn count_where(cond: SimpleExpr) -> SimpleExpr {
    Func::sum(Expr::case(cond, 1).finally(0)).into()
}

/// Inventories matching `cond`, lowest available first.
async fn stock_rows<C: ConnectionTrait>(db: &C, cond: SimpleExpr) -> AppResult<Vec<StockRow>> {
    let inventories = Inventories::find()
        .filter(cond)
        .order_by_asc(available())
        .order_by_asc(Column::Id)
        .all(db)
        .await?;
    with_owners(db, inventories).await
}

async fn with_owners<C: ConnectionTrait>(
    db: &C,
    inventories: Vec<InventoryModel>,
) -> AppResult<Vec<StockRow>> {
    if inventories.is_empty() {
        return Ok(Vec::new());
    }

    let variants = inventories.load_one(Variants, db).await?;
    let product_ids: Vec<_> = variants.iter().flatten().map(|v| v.product_id).collect();
    let products: HashMap<_, _> = Products::find()
        .filter(products::Column::Id.is_in(product_ids))
        .all(db)
        .await?
        .into_iter()
        .map(|p| (p.id, p))
        .collect();

    Ok(inventories
        .into_iter()
        .zip(variants)
        .filter_map(|(inventory, variant)| {
            let variant = variant?;
            let product = products.get(&variant.product_id)?.clone();
            Some(StockRow {
                inventory,
                variant,
                product,
            })
        })
        .collect())
}

fn product_summary(product: &products::Model) -> ProductSummary {
    ProductSummary {
        id: product.id,
        name: product.name.clone(),
        sku: product.sku.clone(),
    }
}

fn variant_summary(variant: &variants::Model) -> VariantSummary {
    VariantSummary {
        id: variant.id,
        name: variant.name.clone(),
        sku: variant.sku.clone(),
        attributes: variant.attributes.0.clone(),
    }
}

fn stock_item(row: &StockRow, with_reorder: bool) -> StockReportItem {
    let inventory = &row.inventory;
    StockReportItem {
        product: product_summary(&row.product),
        variant: variant_summary(&row.variant),
        inventory: StockLevels {
            quantity: inventory.quantity,
            reserved: inventory.reserved,
            available: inventory.available(),
            low_stock_threshold: inventory.low_stock_threshold,
            reorder_point: inventory.reorder_point,
            reorder_quantity: inventory.reorder_quantity,
            warehouse_location: inventory.warehouse_location.clone(),
        },
        reorder: with_reorder.then(|| ReorderAdvice {
            recommended: inventory.reorder_quantity,
        }),
    }
}

fn valuation_item(row: &StockRow) -> ValuationItem {
    let unit_price = row.variant.unit_price(row.product.base_price);
    ValuationItem {
        product: product_summary(&row.product),
        variant: variant_summary(&row.variant),
        inventory: ValuationLevels {
            quantity: row.inventory.quantity,
            reserved: row.inventory.reserved,
            available: row.inventory.available(),
        },
        valuation: Valuation {
            unit_price,
            total_value: unit_price * Decimal::from(row.inventory.quantity),
        },
    }
}

fn total_value(items: &[ValuationItem]) -> Decimal {
    items.iter().map(|i| i.valuation.total_value).sum()
}

fn summarize(row: SummaryRow) -> InventorySummary {
    let total_quantity = row.total_quantity.unwrap_or(0);
    let total_reserved = row.total_reserved.unwrap_or(0);
    InventorySummary {
        total_items: row.total_items,
        total_quantity,
        total_reserved,
        total_available: total_quantity - total_reserved,
        low_stock_items: row.low_stock_items.unwrap_or(0),
        out_of_stock_items: row.out_of_stock_items.unwrap_or(0),
        needs_reorder_items: row.needs_reorder_items.unwrap_or(0),
    }
}

fn warehouse_stock(row: WarehouseRow) -> WarehouseStock {
    let total_quantity = row.total_quantity.unwrap_or(0);
    let total_reserved = row.total_reserved.unwrap_or(0);
    WarehouseStock {
        location: row.location,
        count: row.count,
        total_quantity,
        total_reserved,
        available: total_quantity - total_reserved,
    }
}
