//! # Seed Data Generator
//!
//! Fills a development database with a kiosk/almacén catalog, a few loyalty
//! customers and default pricing settings.
//!
//! ## Usage
//! ```bash
//! # Generate 2,000 products (default)
//! cargo run -p mostrador-db --bin seed
//!
//! # Generate custom amount
//! cargo run -p mostrador-db --bin seed -- --count 500
//!
//! # Specify database path
//! cargo run -p mostrador-db --bin seed -- --db ./data/mostrador.db
//! ```
//!
//! ## Generated Data
//! - Products: `{CATEGORY}-{NAME}-{INDEX}` SKUs, EAN-like barcodes (779
//!   prefix, checksum not valid), prices $250.00 - $4,249.00 plus size
//!   addon, stock 0 - 60. Every seventh product is untracked.
//! - Customers: one per loyalty tier, plus one with an account credit limit
//! - Settings: IVA 21%, card surcharge 5% per installment, default tiers

use chrono::Utc;
use std::env;
use uuid::Uuid;

use mostrador_core::checkout::PricingSettings;
use mostrador_core::{Customer, Percentage, Product, DEFAULT_TENANT_ID};
use mostrador_db::repository::product::generate_product_id;
use mostrador_db::{Database, DbConfig};

/// Product categories for realistic test data
const CATEGORIES: &[(&str, &[&str])] = &[
    (
        "ALM",
        &[
            "Yerba Mate",
            "Azucar",
            "Harina 000",
            "Fideos Tirabuzon",
            "Arroz Largo Fino",
            "Aceite Girasol",
            "Pure de Tomate",
            "Lentejas",
            "Dulce de Leche",
            "Mermelada Durazno",
            "Cafe Molido",
            "Te en Saquitos",
        ],
    ),
    (
        "BEB",
        &[
            "Gaseosa Cola",
            "Agua Mineral",
            "Soda",
            "Jugo en Polvo",
            "Cerveza Rubia",
            "Vino Tinto",
            "Fernet",
            "Agua Saborizada",
        ],
    ),
    (
        "GAL",
        &[
            "Galletitas de Agua",
            "Galletitas Dulces",
            "Alfajor Triple",
            "Alfajor de Maicena",
            "Bizcochos de Grasa",
            "Turron",
            "Chocolate con Leche",
            "Caramelos Masticables",
        ],
    ),
    (
        "LAC",
        &[
            "Leche Entera",
            "Leche Descremada",
            "Yogur Bebible",
            "Queso Cremoso",
            "Queso Rallado",
            "Manteca",
            "Crema de Leche",
        ],
    ),
    (
        "LIM",
        &[
            "Lavandina",
            "Detergente",
            "Jabon en Polvo",
            "Papel Higienico",
            "Esponja",
            "Limpiador de Piso",
        ],
    ),
];

/// Size variants and the price added for each
const SIZES: &[(&str, i64)] = &[
    ("250g", 0),
    ("500g", 40_000),
    ("1kg", 90_000),
    ("500ml", 0),
    ("1L", 35_000),
    ("1.5L", 60_000),
    ("2.25L", 95_000),
    ("Pack x6", 180_000),
];

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args: Vec<String> = env::args().collect();

    let mut count: usize = 2000;
    let mut db_path = String::from("./mostrador_dev.db");

    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "--count" | "-c" => {
                if i + 1 < args.len() {
                    count = args[i + 1].parse().unwrap_or(2000);
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
                println!("Mostrador POS Seed Data Generator");
                println!();
                println!("Usage: seed [OPTIONS]");
                println!();
                println!("Options:");
                println!("  -c, --count <N>    Number of products to generate (default: 2000)");
                println!("  -d, --db <PATH>    Database file path (default: ./mostrador_dev.db)");
                println!("  -h, --help         Show this help message");
                return Ok(());
            }
            other => eprintln!("Ignoring unknown argument: {other}"),
        }
        i += 1;
    }

    println!("🌱 Mostrador POS Seed Data Generator");
    println!("====================================");
    println!("Database: {db_path}");
    println!("Products: {count}");
    println!();

    let db = Database::new(DbConfig::new(&db_path)).await?;
    println!("✓ Connected, migrations applied");

    let existing = db.products().count(DEFAULT_TENANT_ID).await?;
    if existing > 0 {
        println!("⚠ Database already has {existing} products");
        println!("  Skipping seed to avoid duplicates.");
        println!("  Delete the database file to regenerate.");
        return Ok(());
    }

    // Settings first so the register starts with IVA and card surcharge set
    let settings = PricingSettings {
        tax_rate: Percentage::from_bps(2100),
        card_surcharge_rate: Percentage::from_bps(500),
        ..PricingSettings::default()
    };
    db.settings().upsert(DEFAULT_TENANT_ID, &settings).await?;
    println!("✓ Pricing settings: IVA {}, card {} per installment", settings.tax_rate, settings.card_surcharge_rate);

    println!();
    println!("Generating products...");

    let mut generated = 0;
    let start = std::time::Instant::now();

    'outer: for (category_idx, (category_code, names)) in CATEGORIES.iter().enumerate() {
        for (name_idx, name) in names.iter().enumerate() {
            for (size_idx, (size, price_addon)) in SIZES.iter().enumerate() {
                if generated >= count {
                    break 'outer;
                }

                let seed = category_idx * 1000 + name_idx * 20 + size_idx;
                let product = generate_product(category_code, name, size, *price_addon, seed);

                if let Err(e) = db.products().insert(&product).await {
                    eprintln!("Failed to insert {}: {}", product.sku, e);
                    continue;
                }

                generated += 1;
                if generated % 250 == 0 {
                    println!("  Generated {generated} products...");
                }
            }
        }
    }

    let elapsed = start.elapsed();
    println!();
    println!("✓ Generated {generated} products in {elapsed:?}");

    let mut customers = 0;
    for customer in generate_customers() {
        match db.customers().insert(&customer).await {
            Ok(_) => customers += 1,
            Err(e) => eprintln!("Failed to insert customer {}: {}", customer.name, e),
        }
    }
    println!("✓ Generated {customers} customers");

    println!();
    println!("Verifying search...");
    let results = db.products().search(DEFAULT_TENANT_ID, "yerba", 10).await?;
    println!("  Search 'yerba': {} results", results.len());
    let results = db.products().search(DEFAULT_TENANT_ID, "BEB", 10).await?;
    println!("  Search 'BEB': {} results", results.len());

    println!();
    println!("✓ Seed complete!");

    Ok(())
}

/// Generates a single product with realistic data.
fn generate_product(category: &str, name: &str, size: &str, price_addon: i64, seed: usize) -> Product {
    let now = Utc::now();

    let short: String = name
        .chars()
        .filter(|c| c.is_ascii_alphabetic())
        .take(3)
        .collect::<String>()
        .to_uppercase();
    let sku = format!("{category}-{short}-{seed:04}");

    let barcode = Some(format!("779{seed:010}"));

    // $250.00 - $4,249.00 + size addon
    let price_cents = 25_000 + ((seed * 173) % 400_000) as i64 + price_addon;

    // Cost 55-75% of price
    let cost_cents = Some(price_cents * (55 + (seed % 21) as i64) / 100);

    let track_inventory = seed % 7 != 0;
    let current_stock = track_inventory.then(|| (seed % 61) as i64);

    Product {
        id: generate_product_id(),
        tenant_id: DEFAULT_TENANT_ID.to_string(),
        sku,
        barcode,
        name: format!("{name} {size}"),
        description: None,
        price_cents,
        cost_cents,
        track_inventory,
        allow_negative_stock: false,
        current_stock,
        is_active: true,
        created_at: now,
        updated_at: now,
        sync_version: 0,
    }
}

/// One customer per default loyalty tier plus an account customer.
fn generate_customers() -> Vec<Customer> {
    // (name, document, points, lifetime spend, credit limit)
    let rows: &[(&str, &str, i64, i64, Option<i64>)] = &[
        ("Consumidor Habitual", "20111222", 150, 1_200_000, None),
        ("María Fernández", "27333444", 800, 6_500_000, None),
        ("Carlos Rodríguez", "20555666", 2_400, 25_000_000, None),
        ("Almacén Don José", "30777888", 0, 3_000_000, Some(5_000_000)),
    ];

    let now = Utc::now();
    rows.iter()
        .map(|(name, document, points, spend, limit)| Customer {
            id: Uuid::new_v4().to_string(),
            tenant_id: DEFAULT_TENANT_ID.to_string(),
            name: name.to_string(),
            document_id: Some(document.to_string()),
            email: None,
            phone: None,
            loyalty_points: *points,
            lifetime_spend_cents: *spend,
            credit_limit_cents: *limit,
            credit_balance_cents: 0,
            is_active: true,
            created_at: now,
            updated_at: now,
            sync_version: 0,
        })
        .collect()
}
