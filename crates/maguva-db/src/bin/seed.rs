//! # Seed Data Generator
//!
//! Creates the first admin account and, optionally, a small catalogue for
//! development.
//!
//! ## Usage
//! ```bash
//! # Admin only (credentials from flags or ADMIN_EMAIL / ADMIN_PASSWORD)
//! cargo run -p maguva-db --bin seed -- --email owner@maguva.in --password 'change-me-now'
//!
//! # Admin plus sample vendors, products and stock
//! cargo run -p maguva-db --bin seed -- --sample
//!
//! # Specify database path (default: DATABASE_PATH or ./maguva.db)
//! cargo run -p maguva-db --bin seed -- --db ./data/maguva.db
//! ```
//!
//! ## Generated Catalogue
//! - 3 vendors
//! - one product per (vendor, product type) pair below
//! - one stock batch per product with S/M/L units (dupattas are unsized)

use std::env;

use anyhow::{bail, Context};
use maguva_core::requests::{ProductInput, StockReceipt, StockReceiptLine, VendorInput};
use maguva_core::{FabricType, MarkupType, ProductType, Size};
use maguva_db::repository::user::NewUserFlags;
use maguva_db::{Database, DbConfig};
use tracing_subscriber::EnvFilter;

/// (vendor, city, contact)
const VENDORS: &[(&str, &str, &str)] = &[
    ("Anand Silks", "Kanchipuram", "Anand R"),
    ("Banaras Weaves", "Varanasi", "Meera S"),
    ("Jaipur Prints", "Jaipur", "Karan M"),
];

/// (product type, fabric, base price in rupees, colour)
const PRODUCTS: &[(ProductType, FabricType, i64, &str)] = &[
    (ProductType::Saree, FabricType::Silk, 4_500, "#8B0000"),
    (ProductType::Kurti, FabricType::Cotton, 650, "#FF5733"),
    (ProductType::Dupatta, FabricType::Chiffon, 350, "#FFD700"),
    (ProductType::Lehenga, FabricType::Georgette, 7_800, "#800080"),
];

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .init();

    let mut db_path = env::var("DATABASE_PATH").unwrap_or_else(|_| "./maguva.db".to_string());
    let mut email = env::var("ADMIN_EMAIL").unwrap_or_else(|_| "admin@maguva.in".to_string());
    let mut password = env::var("ADMIN_PASSWORD").ok();
    let mut sample = false;

    let args: Vec<String> = env::args().collect();
    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "--db" | "-d" if i + 1 < args.len() => {
                db_path = args[i + 1].clone();
                i += 1;
            }
            "--email" | "-e" if i + 1 < args.len() => {
                email = args[i + 1].clone();
                i += 1;
            }
            "--password" | "-p" if i + 1 < args.len() => {
                password = Some(args[i + 1].clone());
                i += 1;
            }
            "--sample" | "-s" => sample = true,
            "--help" | "-h" => {
                println!("Maguva Seed Data Generator");
                println!();
                println!("Usage: seed [OPTIONS]");
                println!();
                println!("Options:");
                println!("  -d, --db <PATH>          Database file (default: ./maguva.db)");
                println!("  -e, --email <EMAIL>      Admin email (default: admin@maguva.in)");
                println!("  -p, --password <PASS>    Admin password (or ADMIN_PASSWORD)");
                println!("  -s, --sample             Also create sample vendors, products and stock");
                println!("  -h, --help               Show this help message");
                return Ok(());
            }
            other => bail!("Unknown argument: {other}"),
        }
        i += 1;
    }

    println!("🌱 Maguva Seed Data Generator");
    println!("============================");
    println!("Database: {}", db_path);
    println!();

    let db = Database::new(DbConfig::new(&db_path))
        .await
        .context("opening database")?;
    println!("✓ Connected to database");
    println!("✓ Migrations applied");

    seed_admin(&db, &email, password.as_deref()).await?;

    if sample {
        seed_catalogue(&db).await?;
    }

    println!();
    println!("✓ Seed complete!");
    db.close().await;
    Ok(())
}

async fn seed_admin(db: &Database, email: &str, password: Option<&str>) -> anyhow::Result<()> {
    if db.users().find_by_email(email).await?.is_some() {
        println!("⚠ Admin {} already exists, skipping", email);
        return Ok(());
    }

    let Some(password) = password else {
        bail!("No admin password: pass --password or set ADMIN_PASSWORD");
    };

    db.users()
        .create(
            email,
            "Administrator",
            password,
            NewUserFlags {
                is_staff: true,
                is_superuser: true,
            },
        )
        .await
        .context("creating admin account")?;

    println!("✓ Admin account {} created", email);
    Ok(())
}

async fn seed_catalogue(db: &Database) -> anyhow::Result<()> {
    if !db.products().list().await?.is_empty() {
        println!("⚠ Database already has products");
        println!("  Skipping sample data to avoid duplicates.");
        return Ok(());
    }

    println!();
    println!("Generating sample catalogue...");

    let mut units = 0;
    for (vendor_name, city, contact) in VENDORS {
        let vendor = db
            .vendors()
            .create(&VendorInput {
                vendor_name: vendor_name.to_string(),
                contact_person_name: contact.to_string(),
                phone: "9876543210".to_string(),
                email: format!(
                    "{}@example.com",
                    vendor_name.to_lowercase().replace(' ', ".")
                ),
                street: "Main Bazaar".to_string(),
                city: city.to_string(),
                state: String::new(),
                zip_code: String::new(),
                country: "India".to_string(),
            })
            .await?;

        for (product_type, fabric_type, rupees, color) in PRODUCTS {
            let product = db
                .products()
                .create(&ProductInput {
                    vendor_id: Some(vendor.id.clone()),
                    product_type: *product_type,
                    fabric_type: *fabric_type,
                    sub_category: None,
                    color_code: color.to_string(),
                    base_price_paise: rupees * 100,
                    markup_type: MarkupType::Percent,
                    markup_value: 4_000,
                    discount_bps: 0,
                })
                .await?;

            let sizes: &[(Size, i64)] = if *product_type == ProductType::Dupatta {
                &[(Size::NoSize, 6)]
            } else {
                &[(Size::Small, 2), (Size::Medium, 3), (Size::Large, 2)]
            };

            let receipt = StockReceipt::from_lines(
                sizes
                    .iter()
                    .map(|(size, quantity)| StockReceiptLine {
                        product: product.id.clone(),
                        size: *size,
                        quantity: *quantity,
                        batch_id: None,
                    })
                    .collect(),
            )?;
            units += db.inventory().receive_stock(&receipt).await?.total_quantity;
        }

        println!("  ✓ {} with {} products", vendor_name, PRODUCTS.len());
    }

    println!("✓ Received {} units", units);
    Ok(())
}
