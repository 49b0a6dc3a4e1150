//! # Seed Data Generator
//!
//! Populates the database with a demo store for development.
//!
//! ## Usage
//! ```bash
//! # Seed ./storefront_dev.db (or $DATABASE_PATH)
//! cargo run -p storefront-db --bin seed
//!
//! # Specify database path and order history length
//! cargo run -p storefront-db --bin seed -- --db ./data/storefront.db --orders 400
//! ```
//!
//! ## Generated Data
//! - One active tenant (`demo-store`) on the default plan
//! - Products with size variants, up to the plan's product limit
//! - Two shipping classes (inside / outside the city)
//! - Orders spread over the last ~120 days with mixed statuses, so every
//!   analytics period has something to show

use chrono::{Duration, Utc};
use std::env;
use storefront_core::order::{price_order, resolve_unit_price, CustomerDetails};
use storefront_core::plan::PlanGovernor;
use storefront_core::{Order, OrderStatus, Product, ProductStatus};
use storefront_db::{Database, DbConfig, NewProduct, NewShippingClass, NewTenant, NewVariant};

const DEMO_SLUG: &str = "demo-store";

/// (name, slug, price in cents)
const PRODUCTS: &[(&str, &str, i64)] = &[
    ("Cotton Saree", "cotton-saree", 185_000),
    ("Silk Panjabi", "silk-panjabi", 250_000),
    ("Printed Kurti", "printed-kurti", 95_000),
    ("Leather Sandals", "leather-sandals", 120_000),
    ("Jute Tote Bag", "jute-tote-bag", 45_000),
    ("Nakshi Kantha", "nakshi-kantha", 320_000),
];

/// Size variants with a price override (None = product price).
const SIZES: &[(&str, Option<i64>)] = &[("M", None), ("L", None), ("XL", Some(10_000))];

const CUSTOMERS: &[(&str, &str, &str)] = &[
    ("Karim Uddin", "01712345678", "House 12, Road 5, Dhanmondi, Dhaka"),
    ("Nusrat Jahan", "01812345679", "Flat 3B, Lake View, Gulshan 1, Dhaka"),
    ("Tanvir Ahmed", "01912345670", "Station Road, Agrabad, Chattogram"),
    ("Farhana Akter", "01512345671", "Zindabazar Point, Sylhet Sadar"),
    ("Rafiq Islam", "01612345672", "Shaheb Bazar, Boalia, Rajshahi"),
];

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Parse command line arguments
    let args: Vec<String> = env::args().collect();

    let mut order_count: usize = 250;
    let mut db_path = env::var("DATABASE_PATH").unwrap_or_else(|_| String::from("./storefront_dev.db"));

    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "--orders" | "-o" => {
                if i + 1 < args.len() {
                    order_count = args[i + 1].parse().unwrap_or(250);
                    i += 1;
                }
            }
            "--db" | "-d" => {
                if i + 1 < args.len() {
                    db_path = args[i + 1].clone();
                    i += 1;
                }
            }
            "--help" | "-h" => {
                println!("Storefront Seed Data Generator");
                println!();
                println!("Usage: seed [OPTIONS]");
                println!();
                println!("Options:");
                println!("  -o, --orders <N>   Number of historical orders (default: 250)");
                println!("  -d, --db <PATH>    Database file path (default: $DATABASE_PATH or ./storefront_dev.db)");
                println!("  -h, --help         Show this help message");
                return Ok(());
            }
            _ => {}
        }
        i += 1;
    }

    println!("Storefront Seed Data Generator");
    println!("==============================");
    println!("Database: {}", db_path);
    println!("Orders:   {}", order_count);
    println!();

    let db = Database::new(DbConfig::new(&db_path)).await?;
    println!("✓ Connected to database");
    println!("✓ Migrations applied");

    if db.tenants().get_by_slug(DEMO_SLUG).await?.is_some() {
        println!("⚠ Store '{}' already exists", DEMO_SLUG);
        println!("  Skipping seed to avoid duplicates.");
        println!("  Delete the database file to regenerate.");
        return Ok(());
    }

    let (tenant, plan) = db
        .tenants()
        .register(&NewTenant {
            name: "Demo Store".to_string(),
            slug: DEMO_SLUG.to_string(),
            owner_email: "owner@demo-store.test".to_string(),
            password_hash: "seeded-account".to_string(),
        })
        .await?;
    println!("✓ Registered '{}' on plan '{}'", tenant.slug, plan.name);

    // Catalog, capped by the plan
    let governor = PlanGovernor::new(&plan);
    let mut products: Vec<Product> = Vec::new();
    for (name, slug, price_cents) in PRODUCTS {
        if !governor.can_create_product(products.len() as i64) {
            println!("  Product limit ({}) reached, stopping catalog", plan.product_limit);
            break;
        }

        let product = db
            .products()
            .create_within_limit(
                &tenant.id,
                &plan,
                &NewProduct {
                    name: name.to_string(),
                    slug: slug.to_string(),
                    description: Some(format!("{name}, handmade.")),
                    price_cents: *price_cents,
                    status: ProductStatus::Active,
                    images: vec![format!("https://cdn.example.com/{slug}.jpg")],
                },
            )
            .await?;

        for (idx, (size, override_cents)) in SIZES.iter().enumerate() {
            let mut attributes = serde_json::Map::new();
            attributes.insert("size".to_string(), serde_json::Value::from(*size));
            db.products()
                .insert_variant(
                    &product.id,
                    &NewVariant {
                        name: size.to_string(),
                        sku: Some(format!("{}-{}", slug.to_uppercase(), size)),
                        price_cents: *override_cents,
                        stock: 20,
                        attributes,
                        is_default: idx == 0,
                    },
                )
                .await?;
        }

        products.push(db.products().with_variants(product).await?);
    }
    println!("✓ Created {} products", products.len());

    let inside = db
        .shipping()
        .insert(
            &tenant.id,
            &NewShippingClass {
                name: "Inside Dhaka".to_string(),
                fee_cents: 6_000,
                is_default: true,
            },
        )
        .await?;
    let outside = db
        .shipping()
        .insert(
            &tenant.id,
            &NewShippingClass {
                name: "Outside Dhaka".to_string(),
                fee_cents: 12_000,
                is_default: false,
            },
        )
        .await?;
    println!("✓ Created 2 shipping classes");

    if products.is_empty() {
        println!("⚠ No products, skipping orders");
        return Ok(());
    }

    println!();
    println!("Generating orders...");
    let now = Utc::now();
    let start = std::time::Instant::now();

    for n in 0..order_count {
        let product = &products[n % products.len()];
        let variant = product.variants.get(n % SIZES.len().max(1));
        let shipping = if n % 3 == 0 { &outside } else { &inside };
        let (name, phone, address) = CUSTOMERS[n % CUSTOMERS.len()];
        let quantity = (n % 3) as i64 + 1;

        let (unit_price, variant_id) = resolve_unit_price(product, variant);
        let pricing = price_order(unit_price, quantity, shipping.fee())?;
        let customer = CustomerDetails {
            customer_name: name.to_string(),
            phone: phone.to_string(),
            address: address.to_string(),
            quantity,
        };

        // Spread over ~120 days, denser towards today.
        let days_ago = ((n * n) % 121) as i64 * (n % 4 + 1) as i64 / 4;
        let hours_ago = (n % 24) as i64;
        let placed_at = now - Duration::days(days_ago) - Duration::hours(hours_ago);

        let mut order = Order::place(product, variant_id, shipping, customer, pricing, placed_at);
        order.status = historical_status(n, days_ago);
        order.updated_at = placed_at;

        db.orders().insert(&order).await?;

        if (n + 1) % 100 == 0 {
            println!("  Generated {} orders...", n + 1);
        }
    }

    println!();
    println!("✓ Generated {} orders in {:?}", order_count, start.elapsed());
    println!();
    println!("Storefront: /store/{}", DEMO_SLUG);
    println!("Tenant id:  {}", tenant.id);

    db.close().await;
    Ok(())
}

/// Older orders have mostly settled; recent ones are still in flight.
fn historical_status(n: usize, days_ago: i64) -> OrderStatus {
    match (days_ago, n % 10) {
        (_, 0) => OrderStatus::Cancelled,
        (0..=2, 1..=4) => OrderStatus::New,
        (0..=2, _) => OrderStatus::Confirmed,
        (3..=7, 1..=2) => OrderStatus::Confirmed,
        (3..=7, 3..=5) => OrderStatus::Shipped,
        _ => OrderStatus::Delivered,
    }
}
