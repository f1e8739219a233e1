use std::collections::BTreeMap;

use catalog_api::{
    config::AppConfig,
    db::{create_orm_conn, run_migrations},
    dto::{
        categories::CreateCategoryRequest, inventory::UpdateInventoryRequest,
        products::CreateProductRequest, variants::CreateVariantRequest,
    },
    entity::{Categories, Products, categories, products},
    services::{category_service, product_service, variant_service},
    slug::slugify,
    state::AppState,
};
use rust_decimal::Decimal;
use sea_orm::{ColumnTrait, EntityTrait, QueryFilter};
use uuid::Uuid;

struct SeedVariant {
    sku: &'static str,
    name: &'static str,
    attributes: &'static [(&'static str, &'static str)],
    price_difference: i64,
    quantity: i32,
    warehouse: &'static str,
}

struct SeedProduct {
    name: &'static str,
    description: &'static str,
    sku: &'static str,
    base_price: i64,
    category: &'static str,
    tags: &'static [&'static str],
    featured: bool,
    variants: &'static [SeedVariant],
}

const PRODUCTS: &[SeedProduct] = &[
    SeedProduct {
        name: "Ferris Hoodie",
        description: "Warm hoodie for Rustaceans",
        sku: "HOODIE-FERRIS",
        base_price: 55,
        category: "Apparel",
        tags: &["hoodie", "rust"],
        featured: true,
        variants: &[
            SeedVariant {
                sku: "HOODIE-FERRIS-M",
                name: "Medium",
                attributes: &[("size", "M")],
                price_difference: 0,
                quantity: 40,
                warehouse: "Main Warehouse",
            },
            SeedVariant {
                sku: "HOODIE-FERRIS-XL",
                name: "Extra Large",
                attributes: &[("size", "XL")],
                price_difference: 5,
                quantity: 4,
                warehouse: "East Warehouse",
            },
        ],
    },
    SeedProduct {
        name: "Trail Runner",
        description: "Lightweight shoe with a grippy sole",
        sku: "SHOE-TRAIL",
        base_price: 120,
        category: "Footwear",
        tags: &["shoe", "outdoor"],
        featured: false,
        variants: &[
            SeedVariant {
                sku: "SHOE-TRAIL-42",
                name: "EU 42",
                attributes: &[("size", "42"), ("color", "black")],
                price_difference: 0,
                quantity: 8,
                warehouse: "Main Warehouse",
            },
            SeedVariant {
                sku: "SHOE-TRAIL-44",
                name: "EU 44",
                attributes: &[("size", "44"), ("color", "black")],
                price_difference: 0,
                quantity: 0,
                warehouse: "Main Warehouse",
            },
        ],
    },
    SeedProduct {
        name: "Ferris Mug",
        description: "Coffee tastes better with Ferris",
        sku: "MUG-FERRIS",
        base_price: 12,
        category: "Home",
        tags: &["mug", "kitchen"],
        featured: false,
        variants: &[SeedVariant {
            sku: "MUG-FERRIS-STD",
            name: "Standard",
            attributes: &[("capacity", "350ml")],
            price_difference: 0,
            quantity: 120,
            warehouse: "East Warehouse",
        }],
    },
];

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,catalog_api=debug".into()),
        )
        .init();

    let config = AppConfig::from_env()?;
    let orm = create_orm_conn(&config.database_url).await?;
    run_migrations(&orm).await?;
    let state = AppState::new(orm);

    let apparel = ensure_category(&state, "Apparel", None).await?;
    ensure_category(&state, "Footwear", Some(apparel)).await?;
    ensure_category(&state, "Home", None).await?;

    for product in PRODUCTS {
        seed_product(&state, product).await?;
    }

    tracing::info!("seed completed");
    Ok(())
}

async fn ensure_category(
    state: &AppState,
    name: &str,
    parent_id: Option<Uuid>,
) -> anyhow::Result<Uuid> {
    let existing = Categories::find()
        .filter(categories::Column::Slug.eq(slugify(name)))
        .one(&state.orm)
        .await?;
    if let Some(category) = existing {
        return Ok(category.id);
    }

    let resp = category_service::create_category(
        state,
        CreateCategoryRequest {
            name: name.to_string(),
            description: None,
            parent_id,
            active: Some(true),
        },
    )
    .await?;
    let category = resp
        .data
        .ok_or_else(|| anyhow::anyhow!("category {name} was not returned"))?;
    tracing::info!(%name, id = %category.id, "seeded category");
    Ok(category.id)
}

async fn seed_product(state: &AppState, seed: &SeedProduct) -> anyhow::Result<()> {
    let exists = Products::find()
        .filter(products::Column::Sku.eq(seed.sku))
        .one(&state.orm)
        .await?
        .is_some();
    if exists {
        tracing::info!(sku = seed.sku, "product already seeded");
        return Ok(());
    }

    let category_id = ensure_category(state, seed.category, None).await?;
    let product = product_service::create_product(
        state,
        CreateProductRequest {
            name: seed.name.to_string(),
            description: seed.description.to_string(),
            sku: seed.sku.to_string(),
            base_price: Decimal::from(seed.base_price),
            discount_percent: None,
            categories: vec![category_id],
            tags: seed.tags.iter().map(|t| t.to_string()).collect(),
            attributes: BTreeMap::new(),
            images: Vec::new(),
            active: Some(true),
            featured: Some(seed.featured),
        },
    )
    .await?
    .data
    .ok_or_else(|| anyhow::anyhow!("product {} was not returned", seed.sku))?;

    for variant in seed.variants {
        variant_service::create_variant(
            state,
            product.id,
            CreateVariantRequest {
                sku: variant.sku.to_string(),
                name: variant.name.to_string(),
                attributes: variant
                    .attributes
                    .iter()
                    .map(|(k, v)| (k.to_string(), v.to_string()))
                    .collect(),
                price_difference: Some(Decimal::from(variant.price_difference)),
                active: Some(true),
                images: Vec::new(),
                initial_inventory: Some(UpdateInventoryRequest {
                    quantity: Some(variant.quantity),
                    warehouse_location: Some(variant.warehouse.to_string()),
                    ..Default::default()
                }),
            },
        )
        .await?;
    }

    tracing::info!(sku = seed.sku, variants = seed.variants.len(), "seeded product");
    Ok(())
}
