//! # Seed Data Generator
//!
//! Populates a development database with categories and dummy stock.
//!
//! ## Usage
//! ```bash
//! # 100 products (default)
//! cargo run -p smartpos-db --bin seed
//!
//! # Custom amount and database
//! cargo run -p smartpos-db --bin seed -- --count 500 --db ./data/smartpos.db
//! ```
//!
//! ## Generated Data
//! - Categories: `GENERAL` plus a few demo aisles
//! - Products `dummy item {n}` with:
//!   - price 10.00 - 100.00
//!   - cost 50% - 80% of price
//!   - quantity 10 - 200
//!   - arrival date up to a year back
//!   - every seventh product on a 10% sale for the coming week
//!
//! Values are derived from the item index, so two runs produce the same
//! data. Seeding is skipped when the database already holds products.

use chrono::{Duration, Utc};
use smartpos_core::validation::normalize_product_name;
use smartpos_core::ProductInput;
use smartpos_db::{Database, DbConfig};
use std::env;

const CATEGORIES: &[&str] = &["GENERAL", "BEVERAGES", "SNACKS", "HOUSEHOLD", "PERSONAL CARE"];

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args: Vec<String> = env::args().collect();

    let mut count: usize = 100;
    let mut db_path = String::from("./smartpos_dev.db");

    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "--count" | "-c" => {
                if i + 1 < args.len() {
                    count = args[i + 1].parse().unwrap_or(100);
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
                println!("Smart POS Seed Data Generator");
                println!();
                println!("Usage: seed [OPTIONS]");
                println!();
                println!("Options:");
                println!("  -c, --count <N>    Number of products to generate (default: 100)");
                println!("  -d, --db <PATH>    Database file path (default: ./smartpos_dev.db)");
                println!("  -h, --help         Show this help message");
                return Ok(());
            }
            _ => {}
        }
        i += 1;
    }

    println!("Smart POS Seed Data Generator");
    println!("=============================");
    println!("Database: {}", db_path);
    println!("Products: {}", count);
    println!();

    let db = Database::new(DbConfig::new(&db_path)).await?;
    println!("✓ Connected, migrations applied");

    let existing = db.products().count().await?;
    if existing > 0 {
        println!("⚠ Database already has {} products", existing);
        println!("  Skipping seed to avoid duplicates.");
        return Ok(());
    }

    let mut category_ids = Vec::with_capacity(CATEGORIES.len());
    for name in CATEGORIES {
        let category = match db.categories().find_by_name(name).await? {
            Some(found) => found,
            None => db.categories().insert(name).await?,
        };
        category_ids.push(category.id);
    }
    println!("✓ {} categories ready", category_ids.len());

    let start = std::time::Instant::now();
    let mut generated = 0;

    for index in 1..=count {
        let input = generate_product(index, category_ids[index % category_ids.len()])?;

        if let Err(e) = db.products().insert(&input, Utc::now()).await {
            eprintln!("Failed to insert {}: {}", input.name, e);
            continue;
        }

        generated += 1;
        if generated % 50 == 0 {
            println!("  Generated {} products...", generated);
        }
    }

    println!();
    println!("✓ Generated {} products in {:?}", generated, start.elapsed());

    Ok(())
}

/// Builds the `index`-th dummy product.
fn generate_product(index: usize, category_id: i64) -> Result<ProductInput, Box<dyn std::error::Error>> {
    let now = Utc::now();
    let seed = index as i64;

    let price_cents = 1_000 + (seed * 7_919) % 9_001;
    let cost_pct = 50 + (seed * 31) % 31;
    let quantity = 10 + (seed * 37) % 191;
    let arrival_days = 1 + (seed * 53) % 365;

    let on_sale = index % 7 == 0;

    Ok(ProductInput {
        name: normalize_product_name(&format!("Dummy Item {index}"))?,
        description: Some(format!("Description for dummy item {index}")),
        category_id: Some(category_id),
        price_cents,
        cost_price_cents: Some(price_cents * cost_pct / 100),
        quantity,
        discount_percent_bps: if on_sale { 1_000 } else { 0 },
        discount_start: on_sale.then_some(now),
        discount_end: on_sale.then(|| now + Duration::days(7)),
        arrival_date: Some(now - Duration::days(arrival_days)),
    })
}
