//! Schema creation and demo seed data.
//!
//! Run by `shop-cli init-db` and by tests. The service never calls this.

use std::path::Path;

use rusqlite::{params, Connection};

use crate::store::error::{StoreError, StoreResult};

const SCHEMA: &str = "
CREATE TABLE IF NOT EXISTS products (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    name TEXT NOT NULL,
    price REAL NOT NULL,
    description TEXT
);
CREATE TABLE IF NOT EXISTS orders (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    product_id INTEGER NOT NULL,
    quantity INTEGER NOT NULL,
    total REAL NOT NULL,
    FOREIGN KEY (product_id) REFERENCES products (id)
);
";

/// Seed catalogue: (name, price, description).
pub const SEED_PRODUCTS: &[(&str, f64, &str)] = &[
    ("Laptop", 999.99, "High-performance laptop for work and gaming"),
    ("Mouse", 29.99, "Ergonomic wireless mouse"),
    ("Keyboard", 79.99, "Mechanical keyboard with RGB lighting"),
    ("Monitor", 299.99, "27-inch 4K UHD monitor"),
    ("Headphones", 149.99, "Wireless noise-cancelling headphones"),
];

/// Seed orders: (product_id, quantity, total).
pub const SEED_ORDERS: &[(i64, i64, f64)] = &[
    (1, 1, 999.99),
    (2, 2, 59.98),
    (3, 1, 79.99),
    (4, 1, 299.99),
    (5, 1, 149.99),
];

/// What `initialize` did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SetupOutcome {
    /// Tables were empty and the seed rows were inserted.
    Seeded,
    /// Products already existed; nothing was inserted.
    AlreadySeeded,
}

/// Create the schema at `path` (creating the file if needed) and seed it once.
pub fn initialize(path: &Path) -> StoreResult<SetupOutcome> {
    let mut conn = Connection::open(path).map_err(|source| StoreError::Open {
        path: path.to_path_buf(),
        source,
    })?;
    conn.execute_batch(SCHEMA)?;

    let existing: i64 = conn.query_row("SELECT COUNT(*) FROM products", [], |row| row.get(0))?;
    if existing > 0 {
        tracing::info!(path = %path.display(), products = existing, "Database already seeded");
        return Ok(SetupOutcome::AlreadySeeded);
    }

    let tx = conn.transaction()?;
    {
        let mut insert = tx.prepare(
            "INSERT INTO products (name, price, description) VALUES (?, ?, ?)",
        )?;
        for (name, price, description) in SEED_PRODUCTS {
            insert.execute(params![name, price, description])?;
        }

        let mut insert = tx.prepare(
            "INSERT INTO orders (product_id, quantity, total) VALUES (?, ?, ?)",
        )?;
        for (product_id, quantity, total) in SEED_ORDERS {
            insert.execute(params![product_id, quantity, total])?;
        }
    }
    tx.commit()?;

    tracing::info!(
        path = %path.display(),
        products = SEED_PRODUCTS.len(),
        orders = SEED_ORDERS.len(),
        "Database created and seeded"
    );
    Ok(SetupOutcome::Seeded)
}
