//! # Seed Data Generator
//!
//! Fills a store with demo items and a few open checkouts for development.
//!
//! ## Usage
//! ```bash
//! # JSON files in ./data (default)
//! cargo run -p lending-store --bin seed
//!
//! # SQLite database
//! cargo run -p lending-store --bin seed -- --store sqlite --path ./data/lending.db
//! ```
//!
//! Everything goes through `InventoryService`, so seeded data obeys the same
//! merge and stock rules as the HTTP API.

use std::env;
use std::sync::Arc;

use anyhow::{bail, Context};
use chrono::{Days, Local};
use lending_core::{CheckoutRequest, NewItem};
use lending_store::{InventoryService, JsonFileStore, RecordStore, SqliteConfig, SqliteStore};

/// Demo inventory: (category, [(name, quantity)]).
const CATALOG: &[(&str, &[(&str, i64)])] = &[
    (
        "Tools",
        &[
            ("Cordless Drill", 3),
            ("Circular Saw", 1),
            ("Stud Finder", 2),
            ("Socket Set", 2),
            ("Step Ladder", 1),
        ],
    ),
    (
        "Garden",
        &[
            ("Hedge Trimmer", 1),
            ("Wheelbarrow", 2),
            ("Leaf Blower", 1),
            ("Pruning Shears", 4),
        ],
    ),
    (
        "Camping",
        &[
            ("Four Person Tent", 2),
            ("Sleeping Bag", 6),
            ("Camp Stove", 2),
            ("Lantern", 3),
        ],
    ),
    (
        "Electronics",
        &[
            ("Projector", 1),
            ("Extension Reel", 3),
            ("Portable Speaker", 2),
        ],
    ),
];

/// Demo borrowers: (borrower, item name, days until due).
const LOANS: &[(&str, &str, u64)] = &[
    ("Alice", "Cordless Drill", 7),
    ("Bob", "Four Person Tent", 14),
    ("Carol", "Projector", 3),
];

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args: Vec<String> = env::args().collect();

    let mut backend = String::from("json");
    let mut path: Option<String> = None;

    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "--store" | "-s" => {
                if i + 1 < args.len() {
                    backend = args[i + 1].clone();
                    i += 1;
                }
            }
            "--path" | "-p" => {
                if i + 1 < args.len() {
                    path = Some(args[i + 1].clone());
                    i += 1;
                }
            }
            "--help" | "-h" => {
                println!("Lending Tracker Seed Data Generator");
                println!();
                println!("Usage: seed [OPTIONS]");
                println!();
                println!("Options:");
                println!("  -s, --store <json|sqlite>  Backend to seed (default: json)");
                println!("  -p, --path <PATH>          Data directory or database file");
                println!("                             (default: ./data or ./data/lending.db)");
                println!("  -h, --help                 Show this help message");
                return Ok(());
            }
            _ => {}
        }
        i += 1;
    }

    let store: Arc<dyn RecordStore> = match backend.as_str() {
        "json" => {
            let dir = path.unwrap_or_else(|| "./data".to_string());
            println!("Store: JSON files in {dir}");
            Arc::new(JsonFileStore::open(&dir).context("opening JSON store")?)
        }
        "sqlite" => {
            let file = path.unwrap_or_else(|| "./data/lending.db".to_string());
            println!("Store: SQLite database {file}");
            Arc::new(
                SqliteStore::connect(SqliteConfig::new(&file))
                    .await
                    .context("opening SQLite store")?,
            )
        }
        other => bail!("unknown store '{other}', expected json or sqlite"),
    };

    let service = InventoryService::new(store);

    let existing = service.list_items().await?.len();
    if existing > 0 {
        println!("Store already has {existing} items");
        println!("  Skipping seed to avoid merging into real data.");
        return Ok(());
    }

    println!();
    println!("Adding items...");

    let mut added = 0;
    for (category, items) in CATALOG {
        for (name, quantity) in items.iter() {
            service
                .add_item(NewItem::new(*name, *category, *quantity))
                .await
                .with_context(|| format!("adding {name}"))?;
            added += 1;
        }
    }
    println!("  Added {added} items");

    println!("Lending a few...");

    let today = Local::now().date_naive();
    let items = service.list_items().await?;
    for (borrower, item_name, due_in) in LOANS {
        let Some(item) = items.iter().find(|item| item.name == *item_name) else {
            continue;
        };

        let mut request = CheckoutRequest::new(item.id, *borrower, today);
        if let Some(due) = today.checked_add_days(Days::new(*due_in)) {
            request = request.due(due);
        }

        let checkout = service.checkout(request).await?;
        println!("  {borrower} borrowed {item_name} (checkout {})", checkout.id);
    }

    println!();
    println!("Seed complete!");

    Ok(())
}
