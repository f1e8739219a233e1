use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::models::{Category, Product};

#[derive(Debug, Deserialize, ToSchema)]
pub struct SearchQuery {
    #[serde(alias = "query")]
    pub q: Option<String>,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct SuggestionQuery {
    #[serde(alias = "q")]
    pub prefix: Option<String>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct ProductSearchResult {
    pub count: usize,
    pub items: Vec<Product>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct CategorySearchResult {
    pub count: usize,
    pub items: Vec<Category>,
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(transparent)]
pub struct Suggestions {
    #[schema(value_type = Vec<String>)]
    pub names: Vec<String>,
}
