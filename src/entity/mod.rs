pub mod categories;
pub mod inventories;
pub mod product_categories;
pub mod products;
pub mod types;
pub mod variants;

pub use categories::Entity as Categories;
pub use inventories::Entity as Inventories;
pub use product_categories::Entity as ProductCategories;
pub use products::Entity as Products;
pub use variants::Entity as Variants;
