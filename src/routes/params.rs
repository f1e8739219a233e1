use rust_decimal::Decimal;
use serde::Deserialize;
use utoipa::ToSchema;
use uuid::Uuid;

#[derive(Debug, Default, Clone, Deserialize, ToSchema)]
pub struct Pagination {
    pub page: Option<i64>,
    #[serde(alias = "limit")]
    pub per_page: Option<i64>,
}

impl Pagination {
    pub fn normalize(&self) -> (i64, i64, i64) {
        let page = self.page.unwrap_or(1).max(1);
        let per_page = self.per_page.unwrap_or(20).clamp(1, 100);
        let offset = (page - 1) * per_page;
        (page, per_page, offset)
    }
}

#[derive(Debug, Clone, Copy, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum SortOrder {
    Asc,
    Desc,
}

#[derive(Debug, Clone, Copy, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum ProductSortBy {
    #[serde(alias = "createdAt")]
    CreatedAt,
    Name,
    #[serde(alias = "price", alias = "basePrice")]
    BasePrice,
    Sku,
}

#[derive(Debug, Default, Deserialize, ToSchema)]
pub struct ProductFilter {
    pub category: Option<Uuid>,
    pub featured: Option<bool>,
    pub active: Option<bool>,
    #[serde(alias = "minPrice")]
    pub min_price: Option<Decimal>,
    #[serde(alias = "maxPrice")]
    pub max_price: Option<Decimal>,
    #[serde(alias = "sort")]
    pub sort_by: Option<ProductSortBy>,
    #[serde(alias = "order")]
    pub sort_order: Option<SortOrder>,
}

#[derive(Debug, Clone, Copy, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum CategorySortBy {
    Name,
    #[serde(alias = "createdAt")]
    CreatedAt,
}

#[derive(Debug, Default, Deserialize, ToSchema)]
pub struct CategoryFilter {
    pub active: Option<bool>,
    /// Parent category id, or `null` for top-level categories.
    pub parent: Option<String>,
    #[serde(alias = "sort")]
    pub sort_by: Option<CategorySortBy>,
    #[serde(alias = "order")]
    pub sort_order: Option<SortOrder>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pagination_defaults_and_clamps() {
        assert_eq!(Pagination::default().normalize(), (1, 20, 0));
        let p = Pagination {
            page: Some(3),
            per_page: Some(10),
        };
        assert_eq!(p.normalize(), (3, 10, 20));
        let p = Pagination {
            page: Some(0),
            per_page: Some(500),
        };
        assert_eq!(p.normalize(), (1, 100, 0));
    }

    #[test]
    fn sort_aliases_deserialize() {
        let by: ProductSortBy = serde_json::from_str(r#""price""#).unwrap();
        assert!(matches!(by, ProductSortBy::BasePrice));
        let by: ProductSortBy = serde_json::from_str(r#""created_at""#).unwrap();
        assert!(matches!(by, ProductSortBy::CreatedAt));
        let order: SortOrder = serde_json::from_str(r#""asc""#).unwrap();
        assert!(matches!(order, SortOrder::Asc));
    }
}
