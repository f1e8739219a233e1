use sea_orm::DatabaseConnection;

/// Shared handle passed to every service call.
#[derive(Clone)]
pub struct AppState {
    pub orm: DatabaseConnection,
}

impl AppState {
    pub fn new(orm: DatabaseConnection) -> Self {
        Self { orm }
    }
}
