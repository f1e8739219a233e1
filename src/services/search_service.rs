use sea_orm::{
    Condition, EntityTrait, QueryFilter, QueryOrder, QuerySelect,
    sea_query::{Expr, SimpleExpr, extension::postgres::PgExpr},
};

use crate::{
    dto::search::{CategorySearchResult, ProductSearchResult, Suggestions},
    entity::{Categories, Products, categories, products::Column},
    error::{AppError, AppResult},
    models::Category,
    response::ApiResponse,
    services::product_service,
    state::AppState,
};

const SUGGESTION_LIMIT: u64 = 5;

/// Case-insensitive match on product name, description or tags.
pub async fn search_products(
    state: &AppState,
    q: Option<String>,
) -> AppResult<ApiResponse<ProductSearchResult>> {
    let term = required_term(q)?;
    let pattern = format!("%{}%", escape_like(&term));

    let models = Products::find()
        .filter(
            Condition::any()
                .add(Expr::col(Column::Name).ilike(pattern.clone()))
                .add(Expr::col(Column::Description).ilike(pattern.clone()))
                .add(any_tag_matches(pattern)),
        )
        .order_by_asc(Column::Name)
        .all(&state.orm)
        .await?;
    let items = product_service::with_categories(&state.orm, models).await?;

    tracing::debug!(%term, count = items.len(), "product search");

    Ok(ApiResponse::success(
        "Products found",
        ProductSearchResult {
            count: items.len(),
            items,
        },
        None,
    ))
}

pub async fn search_categories(
    state: &AppState,
    q: Option<String>,
) -> AppResult<ApiResponse<CategorySearchResult>> {
    let term = required_term(q)?;
    let pattern = format!("%{}%", escape_like(&term));

    let items: Vec<Category> = Categories::find()
        .filter(Expr::col(categories::Column::Name).ilike(pattern))
        .order_by_asc(categories::Column::Name)
        .all(&state.orm)
        .await?
        .into_iter()
        .map(Category::from)
        .collect();

    Ok(ApiResponse::success(
        "Categories found",
        CategorySearchResult {
            count: items.len(),
            items,
        },
        None,
    ))
}

/// Up to five product names starting with `prefix`.
pub async fn suggestions(
    state: &AppState,
    prefix: Option<String>,
) -> AppResult<ApiResponse<Suggestions>> {
    let term = required_term(prefix)?;
    let pattern = format!("{}%", escape_like(&term));

    let names: Vec<String> = Products::find()
        .select_only()
        .column(Column::Name)
        .filter(Expr::col(Column::Name).ilike(pattern))
        .order_by_asc(Column::Name)
        .limit(SUGGESTION_LIMIT)
        .into_tuple()
        .all(&state.orm)
        .await?;

    Ok(ApiResponse::success(
        "Suggestions",
        Suggestions { names },
        None,
    ))
}

/// Matches `pattern` against each element of the JSONB `tags` array on its own.
fn any_tag_matches(pattern: String) -> SimpleExpr {
    Expr::cust_with_values(
        r#"EXISTS (SELECT 1 FROM jsonb_array_elements_text("products"."tags") AS tag WHERE tag ILIKE $1)"#,
        [pattern],
    )
}

fn required_term(q: Option<String>) -> AppResult<String> {
    q.map(|q| q.trim().to_string())
        .filter(|q| !q.is_empty())
        .ok_or_else(|| AppError::Validation("Search query is required".into()))
}

/// Escapes `%`, `_` and `\` so user input matches literally inside LIKE.
fn escape_like(term: &str) -> String {
    let mut out = String::with_capacity(term.len());
    for c in term.chars() {
        if matches!(c, '%' | '_' | '\\') {
            out.push('\\');
        }
        out.push(c);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn blank_query_is_rejected() {
        assert!(matches!(required_term(None), Err(AppError::Validation(_))));
        assert!(matches!(
            required_term(Some("   ".into())),
            Err(AppError::Validation(_))
        ));
        assert_eq!(required_term(Some(" lamp ".into())).unwrap(), "lamp");
    }

    #[test]
    fn like_wildcards_are_escaped() {
        assert_eq!(escape_like("50%_off"), "50\\%\\_off");
        assert_eq!(escape_like("a\\b"), "a\\\\b");
        assert_eq!(escape_like("plain"), "plain");
    }
}
