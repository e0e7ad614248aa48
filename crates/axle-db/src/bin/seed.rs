//! # Seed Data Generator
//!
//! Populates the database with workshop reference data and a parts catalog
//! for development.
//!
//! ## Usage
//! ```bash
//! # Seed with defaults
//! cargo run -p axle-db --bin seed
//!
//! # Specify database path
//! cargo run -p axle-db --bin seed -- --db ./data/axle.db
//!
//! # Generate a larger catalog
//! cargo run -p axle-db --bin seed -- --materials 500
//! ```
//!
//! ## Generated Data
//! - Job types (oil change, brake service, ...)
//! - Customers, each with one or two vehicles
//! - A parts catalog built from part × variant combinations, priced
//!   deterministically from the seed index
//! - One demo invoice created through the reconciler, so a fresh database
//!   already exercises the full create path

use std::env;

use axle_core::DiscountKind;
use axle_db::{CreateRequest, Database, DbConfig, DocumentKind};

/// Base parts with their price floor in cents.
const PARTS: &[(&str, i64)] = &[
    ("Engine oil", 3_500),
    ("Oil filter", 900),
    ("Air filter", 1_200),
    ("Cabin filter", 1_500),
    ("Spark plug", 700),
    ("Brake pad set", 4_500),
    ("Brake disc", 6_000),
    ("Wiper blade", 1_100),
    ("Coolant", 1_800),
    ("Battery", 12_000),
    ("Serpentine belt", 2_400),
    ("Headlight bulb", 800),
];

/// Variants appended to part names, with a price addon in cents.
const VARIANTS: &[(&str, i64)] = &[
    ("standard", 0),
    ("premium", 1_500),
    ("OEM", 3_000),
    ("heavy duty", 2_200),
];

const JOB_TYPES: &[&str] = &[
    "Oil change",
    "Brake service",
    "Full service",
    "Tire rotation",
    "Diagnostics",
];

const CUSTOMERS: &[(&str, &str, &[&str])] = &[
    ("Nadia", "Rahman", &["Corolla 2018", "Vitz 2015"]),
    ("Omar", "Siddiqui", &["Civic 2020"]),
    ("Sara", "Khan", &["Alto 2019"]),
    ("Bilal", "Ahmed", &["Hilux 2017", "Mehran 2010"]),
];

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .init();

    // Parse command line arguments
    let args: Vec<String> = env::args().collect();

    let mut material_count: usize = PARTS.len() * VARIANTS.len();
    let mut db_path = String::from("./axle_dev.db");

    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "--materials" | "-m" => {
                if i + 1 < args.len() {
                    material_count = args[i + 1].parse().unwrap_or(material_count);
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
                println!("Axle Seed Data Generator");
                println!();
                println!("Usage: seed [OPTIONS]");
                println!();
                println!("Options:");
                println!("  -m, --materials <N>  Catalog size (default: {})", PARTS.len() * VARIANTS.len());
                println!("  -d, --db <PATH>      Database file path (default: ./axle_dev.db)");
                println!("  -h, --help           Show this help message");
                return Ok(());
            }
            _ => {}
        }
        i += 1;
    }

    println!("🌱 Axle Seed Data Generator");
    println!("===========================");
    println!("Database:  {}", db_path);
    println!("Materials: {}", material_count);
    println!();

    let db = Database::new(DbConfig::new(&db_path)).await?;

    println!("✓ Connected to database");
    println!("✓ Migrations applied");

    // Refuse to double-seed
    let existing = db.materials().list_active().await?;
    if !existing.is_empty() {
        println!("⚠ Database already has {} materials", existing.len());
        println!("  Skipping seed to avoid duplicates.");
        println!("  Delete the database file to regenerate.");
        return Ok(());
    }

    let refs = db.references();

    println!();
    println!("Seeding job types...");
    let mut job_type_ids = Vec::new();
    for name in JOB_TYPES {
        job_type_ids.push(refs.insert_job_type(name).await?);
    }
    println!("  {} job types", job_type_ids.len());

    println!("Seeding customers and vehicles...");
    let mut first_pair = None;
    for (first, last, vehicles) in CUSTOMERS {
        let customer_id = refs.insert_customer(first, last).await?;
        for model in *vehicles {
            let vehicle_id = refs.insert_vehicle(customer_id, model).await?;
            first_pair.get_or_insert((customer_id, vehicle_id));
        }
    }
    println!("  {} customers", CUSTOMERS.len());

    println!("Seeding catalog...");
    let materials = db.materials();
    let mut generated = 0;
    let start = std::time::Instant::now();

    'outer: for (part_idx, (part, base)) in PARTS.iter().cycle().enumerate() {
        for (variant, addon) in VARIANTS {
            if generated >= material_count {
                break 'outer;
            }
            let name = if part_idx < PARTS.len() {
                format!("{part} ({variant})")
            } else {
                // Catalog sizes past one full pass get numbered duplicates
                format!("{part} ({variant}) #{}", part_idx / PARTS.len() + 1)
            };
            // Deterministic price jitter from the index
            let price = base + addon + ((generated * 37) % 400) as i64;
            materials.insert(&name, price).await?;
            generated += 1;

            if generated % 100 == 0 {
                println!("  Generated {} materials...", generated);
            }
        }
    }

    let elapsed = start.elapsed();
    println!("  Generated {} materials in {:?}", generated, elapsed);

    // One demo invoice through the real entry point
    println!();
    println!("Creating demo invoice...");
    let (customer_id, vehicle_id) = first_pair.ok_or("customer seed produced no vehicle")?;
    let created = db
        .reconciler()
        .create(
            DocumentKind::Invoice,
            &CreateRequest {
                customer_id: Some(customer_id),
                vehicle_id: Some(vehicle_id),
                job_type_id: job_type_ids.first().copied(),
                description: Some("Seeded demo invoice".into()),
                materials: Some("1:1,2:1,5:4".into()),
                service_charge_cents: Some(5_000),
                discount_value: Some(500),
                discount_kind: Some(DiscountKind::Percentage),
                vat_bps: Some(1_700),
                ..CreateRequest::default()
            },
        )
        .await?;
    println!(
        "  Invoice #{} total {}",
        created.header.invoice_no,
        created.header.amount()
    );

    println!();
    println!("✓ Seed complete!");

    Ok(())
}
