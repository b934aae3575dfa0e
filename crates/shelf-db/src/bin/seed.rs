//! # Seed Data Generator
//!
//! Fills a catalog with demo products so the scanner has something to find.
//!
//! ## Usage
//! ```bash
//! cargo run --bin seed -- --db ./shelf_dev.db
//! cargo run --bin seed -- --db ./shelf_dev.db --count 200
//! ```
//!
//! ## What Gets Created
//! - A fixed set of well-known retail barcodes (EAN-13, UPC-A, EAN-8),
//!   including `4005808521175 → 42`
//! - `--count` generated EAN-13 products with valid check digits, a share
//!   of them left as drafts so unpublished lookups can be tried

use std::env;

use shelf_core::{CatalogProduct, ProductId, ProductStatus};
use shelf_db::{Database, DbConfig};

/// Known products: (id, name, barcode, status)
const FIXTURES: &[(i64, &str, &str, ProductStatus)] = &[
    (42, "Nivea Creme 150ml", "4005808521175", ProductStatus::Published),
    (43, "Coca-Cola 330ml", "5449000000996", ProductStatus::Publish),
    (44, "Campbell's Tomato Soup", "051000012616", ProductStatus::Published),
    (45, "Sample EAN-8 Item", "96385074", ProductStatus::Published),
    (46, "Discontinued Crisps", "5000159484695", ProductStatus::Archived),
    (47, "Upcoming Granola", "4006381333931", ProductStatus::Draft),
];

const FIRST_GENERATED_ID: i64 = 1_000;

/// EAN-13 check digit for a 12-digit body.
fn ean13_check_digit(body: &str) -> u32 {
    let sum: u32 = body
        .chars()
        .filter_map(|c| c.to_digit(10))
        .enumerate()
        .map(|(i, d)| if i % 2 == 0 { d } else { d * 3 })
        .sum();
    (10 - sum % 10) % 10
}

fn generated_product(index: usize) -> CatalogProduct {
    // 200-299 is the in-store prefix range, safe from real products
    let body = format!("2{:011}", index + 1);
    let barcode = format!("{}{}", body, ean13_check_digit(&body));
    let status = if index % 5 == 4 {
        ProductStatus::Draft
    } else {
        ProductStatus::Published
    };

    CatalogProduct {
        product_id: ProductId::new(FIRST_GENERATED_ID + index as i64),
        name: format!("Store Item {:04}", index + 1),
        barcode: Some(barcode),
        product_status: status,
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args: Vec<String> = env::args().collect();

    let mut count: usize = 100;
    let mut db_path = String::from("./shelf_dev.db");

    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "--count" | "-c" => {
                if let Some(value) = args.get(i + 1) {
                    count = value.parse().unwrap_or(100);
                    i += 1;
                }
            }
            "--db" | "-d" => {
                if let Some(value) = args.get(i + 1) {
                    db_path = value.clone();
                    i += 1;
                }
            }
            "--help" | "-h" => {
                println!("Shelf Scanner Seed Data Generator");
                println!();
                println!("Usage: seed [OPTIONS]");
                println!();
                println!("Options:");
                println!("  -c, --count <N>    Generated products on top of fixtures (default: 100)");
                println!("  -d, --db <PATH>    Database file path (default: ./shelf_dev.db)");
                println!("  -h, --help         Show this help message");
                return Ok(());
            }
            _ => {}
        }
        i += 1;
    }

    println!("Shelf Scanner Seed Data Generator");
    println!("=================================");
    println!("Database: {}", db_path);
    println!();

    let db = Database::new(DbConfig::new(&db_path)).await?;
    let products = db.products();

    let existing = products.count().await?;
    if existing > 0 {
        println!("Database already has {} products, skipping.", existing);
        println!("Delete the database file to regenerate.");
        return Ok(());
    }

    let fixtures = FIXTURES
        .iter()
        .map(|(id, name, barcode, status)| CatalogProduct {
            product_id: ProductId::new(*id),
            name: (*name).to_string(),
            barcode: Some((*barcode).to_string()),
            product_status: *status,
        });
    let generated = (0..count).map(generated_product);

    let mut inserted = 0;
    for product in fixtures.chain(generated) {
        if let Err(e) = products.insert(&product).await {
            eprintln!("Failed to insert {}: {}", product.product_id, e);
            continue;
        }
        inserted += 1;
    }

    println!("Inserted {} products", inserted);
    println!();
    println!("Try scanning:");
    for (id, name, barcode, status) in FIXTURES {
        println!("  {:<15} → {:>3}  {} ({:?})", barcode, id, name, status);
    }

    db.close().await;
    Ok(())
}
