use utoipa::{OpenApi, openapi::OpenApi as OpenApiSpec};
use utoipa_scalar::{Scalar, Servable};

use crate::{
    dto::{categories, inventory, products, reports, search, variants},
    entity::types::{AdjustmentEntry, Image, ReservationEntry},
    error::ErrorData,
    models::{Category, CategoryRef, Inventory, Product, Variant},
    response::{ApiResponse, Meta},
    routes::{
        categories as category_routes, health, params, products as product_routes,
        reports as report_routes, search as search_routes, variants as variant_routes,
    },
};

#[derive(OpenApi)]
#[openapi(
    paths(
        health::health_check,
        product_routes::list_products,
        product_routes::create_product,
        product_routes::get_product,
        product_routes::update_product,
        product_routes::delete_product,
        product_routes::list_variants,
        product_routes::create_variant,
        variant_routes::get_variant,
        variant_routes::update_variant,
        variant_routes::delete_variant,
        variant_routes::get_inventory,
        variant_routes::set_inventory,
        variant_routes::adjust_inventory,
        variant_routes::reserve_inventory,
        variant_routes::release_inventory,
        category_routes::list_categories,
        category_routes::create_category,
        category_routes::get_category,
        category_routes::update_category,
        category_routes::delete_category,
        category_routes::list_category_products,
        search_routes::search_products,
        search_routes::search_categories,
        search_routes::suggestions,
        report_routes::low_stock,
        report_routes::reorder,
        report_routes::inventory_valuation,
        report_routes::inventory_summary
    ),
    components(
        schemas(
            Product,
            Category,
            CategoryRef,
            Variant,
            Inventory,
            Image,
            AdjustmentEntry,
            ReservationEntry,
            ErrorData,
            Meta,
            params::Pagination,
            params::ProductFilter,
            params::CategoryFilter,
            params::ProductSortBy,
            params::CategorySortBy,
            params::SortOrder,
            products::CreateProductRequest,
            products::UpdateProductRequest,
            products::ProductList,
            products::ProductDetail,
            categories::CreateCategoryRequest,
            categories::UpdateCategoryRequest,
            categories::CategoryList,
            categories::CategoryDetail,
            variants::CreateVariantRequest,
            variants::UpdateVariantRequest,
            variants::VariantDetail,
            variants::VariantList,
            inventory::UpdateInventoryRequest,
            inventory::AdjustInventoryRequest,
            inventory::StockMovementRequest,
            inventory::AdjustmentResult,
            inventory::ReservationResult,
            inventory::ReleaseResult,
            reports::StockReport,
            reports::ValuationReport,
            reports::InventorySummaryReport,
            search::ProductSearchResult,
            search::CategorySearchResult,
            search::Suggestions,
            ApiResponse<Product>,
            ApiResponse<products::ProductList>,
            ApiResponse<Inventory>,
            ApiResponse<ErrorData>
        )
    ),
    tags(
        (name = "Health", description = "Health check endpoint"),
        (name = "Products", description = "Product endpoints"),
        (name = "Variants", description = "Variant endpoints"),
        (name = "Inventory", description = "Variant stock levels and movements"),
        (name = "Categories", description = "Category tree endpoints"),
        (name = "Search", description = "Text search over the catalog"),
        (name = "Reports", description = "Inventory reports"),
    )
)]
pub struct ApiDoc;

pub fn scalar_docs() -> Scalar<OpenApiSpec> {
    Scalar::with_url("/docs", ApiDoc::openapi())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_route_is_documented() {
        let doc = ApiDoc::openapi();
        let paths = &doc.paths.paths;
        for path in [
            "/health",
            "/api/products/{id}/variants",
            "/api/variants/{id}/inventory/reserve",
            "/api/categories/{id}/products",
            "/api/search/suggestions",
            "/api/reports/inventory-summary",
        ] {
            assert!(paths.contains_key(path), "missing {path}");
        }
    }
}
