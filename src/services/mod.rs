pub mod category_service;
pub mod inventory_service;
pub mod product_service;
pub mod report_service;
pub mod search_service;
pub mod variant_service;
