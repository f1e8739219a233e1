pub mod categories;
pub mod inventory;
pub mod products;
pub mod reports;
pub mod search;
pub mod variants;
