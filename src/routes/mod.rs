use axum::Router;

use crate::state::AppState;

pub mod categories;
pub mod doc;
pub mod health;
pub mod params;
pub mod products;
pub mod reports;
pub mod search;
pub mod variants;

// Build the API router without binding state; it will be provided at the top level.
pub fn create_api_router() -> Router<AppState> {
    Router::new()
        .nest("/products", products::router())
        .nest("/variants", variants::router())
        .nest("/categories", categories::router())
        .nest("/search", search::router())
        .nest("/reports", reports::router())
}
