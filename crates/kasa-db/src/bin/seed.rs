//! # Seed Data Generator
//!
//! Populates the database with demo data for development.
//!
//! ## Usage
//! ```bash
//! # Seed into the default ./kasa.db
//! cargo run -p kasa-db --bin seed
//!
//! # Specify database path
//! cargo run -p kasa-db --bin seed -- --db ./data/kasa.db
//! ```
//!
//! ## Generated Data
//! - An admin, a manager and a cashier account (password hashes are
//!   placeholders; use the server's register flow for real accounts)
//! - A shelf of typical Turkish corner-shop products with mixed
//!   inclusive/exclusive VAT
//! - A couple of customers with credit limits
//! - One employee

use chrono::Utc;
use std::env;
use uuid::Uuid;

use kasa_core::{Customer, Personnel, Product, Role, User, DEFAULT_BRANCH_ID};
use kasa_db::{Database, DbConfig};

/// (name, barcode, price_kurus, vat_bps, vat_included, stock)
const PRODUCTS: &[(&str, &str, i64, u32, bool, i64)] = &[
    ("Çay 500g", "8690637700013", 4500, 100, true, 40),
    ("Şeker 1kg", "8690637700020", 3250, 100, true, 60),
    ("Süt 1L", "8690637700037", 1950, 100, true, 24),
    ("Makarna 500g", "8690637700044", 1250, 100, true, 80),
    ("Ayçiçek Yağı 1L", "8690637700051", 8900, 1000, true, 18),
    ("Deterjan 4kg", "8690637700068", 18900, 2000, false, 12),
    ("Pil AA 4'lü", "8690637700075", 6500, 2000, false, 30),
    ("Kontör 100TL", "8690637700082", 10000, 2000, false, 999),
];

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let db_path = parse_db_path();
    println!("Seeding {}", db_path);

    let db = Database::new(DbConfig::new(&db_path)).await?;
    let now = Utc::now();

    // Users
    for (email, name, role) in [
        ("patron@kasa.dev", "Patron", Role::Admin),
        ("mudur@kasa.dev", "Müdür", Role::Manager),
        ("kasiyer@kasa.dev", "Kasiyer", Role::Cashier),
    ] {
        let user = User {
            id: Uuid::new_v4().to_string(),
            branch_id: DEFAULT_BRANCH_ID.to_string(),
            email: email.to_string(),
            // Placeholder hash: these accounts cannot log in until a
            // real password is set through the server.
            password_hash: "!seed-no-login".to_string(),
            display_name: name.to_string(),
            role,
            is_active: true,
            created_at: now,
            updated_at: now,
        };
        match db.users().insert(&user).await {
            Ok(_) => println!("  user {email}"),
            Err(e) if e.is_unique_violation() => println!("  user {email} (exists)"),
            Err(e) => return Err(e.into()),
        }
    }

    // Products
    for (name, barcode, price, vat_bps, vat_included, stock) in PRODUCTS {
        let product = Product {
            id: Uuid::new_v4().to_string(),
            barcode: Some((*barcode).to_string()),
            name: (*name).to_string(),
            price_kurus: *price,
            cost_kurus: Some(*price * 8 / 10),
            vat_rate_bps: *vat_bps,
            vat_included: *vat_included,
            stock_quantity: *stock,
            is_active: true,
            created_at: now,
            updated_at: now,
        };
        match db.products().insert(&product).await {
            Ok(_) => println!("  product {name}"),
            Err(e) if e.is_unique_violation() => println!("  product {name} (exists)"),
            Err(e) => return Err(e.into()),
        }
    }

    // Customers
    for (name, phone, limit) in [
        ("Ahmet Yılmaz", "05551112233", 200_000i64),
        ("Zeynep Kaya", "05554445566", 100_000),
    ] {
        let customer = Customer {
            id: Uuid::new_v4().to_string(),
            branch_id: DEFAULT_BRANCH_ID.to_string(),
            name: name.to_string(),
            phone: Some(phone.to_string()),
            current_balance_kurus: 0,
            credit_limit_kurus: limit,
            is_active: true,
            created_at: now,
            updated_at: now,
        };
        db.customers().insert(&customer).await?;
        println!("  customer {name}");
    }

    // Personnel
    let employee = Personnel {
        id: Uuid::new_v4().to_string(),
        branch_id: DEFAULT_BRANCH_ID.to_string(),
        name: "Fatma Demir".to_string(),
        title: Some("Tezgahtar".to_string()),
        salary_kurus: 2_500_000,
        current_balance_kurus: 0,
        is_active: true,
        created_at: now,
        updated_at: now,
    };
    db.personnel().insert(&employee).await?;
    println!("  personnel {}", employee.name);

    println!("Done.");
    Ok(())
}

fn parse_db_path() -> String {
    let args: Vec<String> = env::args().collect();
    args.iter()
        .position(|a| a == "--db")
        .and_then(|i| args.get(i + 1))
        .cloned()
        .unwrap_or_else(|| "./kasa.db".to_string())
}
