//! SQLite persistence gateway.
//!
//! Owns pool construction, the schema DDL, and startup seeding of the
//! catalog. Menu management lives outside this service, so a fresh database
//! gets the sample catalog; an existing one is never touched.
//!
//! Money columns are canonical decimal TEXT written from and parsed into
//! [`Decimal`], so totals survive round trips without float drift.

use std::str::FromStr;

use chrono::Utc;
use rust_decimal::Decimal;
use sqlx::{
    SqlitePool,
    sqlite::{SqliteConnectOptions, SqlitePoolOptions},
};
use tracing::info;

use crate::error::AppError;

pub const CREATE_MENU_ITEMS_TABLE: &str = r#"
CREATE TABLE IF NOT EXISTS menu_items (
    item_id INTEGER PRIMARY KEY AUTOINCREMENT,
    item_name TEXT NOT NULL,
    description TEXT NOT NULL DEFAULT '',
    price TEXT NOT NULL,
    category TEXT NOT NULL,
    image_path TEXT NOT NULL DEFAULT '',
    is_available INTEGER NOT NULL DEFAULT 1,
    created_at TEXT NOT NULL,
    updated_at TEXT NOT NULL
);

CREATE INDEX IF NOT EXISTS idx_menu_category ON menu_items(category);
CREATE INDEX IF NOT EXISTS idx_menu_available ON menu_items(is_available);
"#;

pub const CREATE_ORDERS_TABLE: &str = r#"
CREATE TABLE IF NOT EXISTS orders (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    customer_name TEXT NOT NULL,
    customer_email TEXT NOT NULL DEFAULT '',
    customer_phone TEXT NOT NULL,
    delivery_address TEXT NOT NULL DEFAULT '',
    total_amount TEXT NOT NULL,
    status TEXT NOT NULL DEFAULT 'pending',
    notes TEXT NOT NULL DEFAULT '',
    created_at TEXT NOT NULL,
    updated_at TEXT NOT NULL
);

CREATE INDEX IF NOT EXISTS idx_orders_status ON orders(status);
CREATE INDEX IF NOT EXISTS idx_orders_created ON orders(created_at);
"#;

pub const CREATE_ORDER_ITEMS_TABLE: &str = r#"
CREATE TABLE IF NOT EXISTS order_items (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    order_id INTEGER NOT NULL REFERENCES orders(id) ON DELETE CASCADE,
    menu_item_id INTEGER NOT NULL REFERENCES menu_items(item_id),
    quantity INTEGER NOT NULL CHECK (quantity > 0),
    unit_price TEXT NOT NULL,
    total_price TEXT NOT NULL
);

CREATE INDEX IF NOT EXISTS idx_order_items_order ON order_items(order_id);
CREATE INDEX IF NOT EXISTS idx_order_items_menu_item ON order_items(menu_item_id);
"#;

pub const CREATE_REVIEWS_TABLE: &str = r#"
CREATE TABLE IF NOT EXISTS reviews (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    customer_name TEXT NOT NULL,
    rating INTEGER NOT NULL CHECK (rating >= 1 AND rating <= 5),
    comment TEXT NOT NULL DEFAULT '',
    item_id INTEGER REFERENCES menu_items(item_id),
    created_at TEXT NOT NULL,
    is_approved INTEGER NOT NULL DEFAULT 1
);

CREATE INDEX IF NOT EXISTS idx_reviews_approved ON reviews(is_approved);
CREATE INDEX IF NOT EXISTS idx_reviews_created ON reviews(created_at);
"#;

pub const CREATE_CONTACT_MESSAGES_TABLE: &str = r#"
CREATE TABLE IF NOT EXISTS contact_messages (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    name TEXT NOT NULL,
    email TEXT NOT NULL,
    subject TEXT NOT NULL,
    message TEXT NOT NULL,
    created_at TEXT NOT NULL,
    is_read INTEGER NOT NULL DEFAULT 0
);

CREATE INDEX IF NOT EXISTS idx_contact_read ON contact_messages(is_read);
CREATE INDEX IF NOT EXISTS idx_contact_created ON contact_messages(created_at);
"#;

/// The original site's sample catalog: (name, description, price, category,
/// image).
const SAMPLE_MENU: &[(&str, &str, &str, &str, &str)] = &[
    (
        "Grilled Chicken Salad",
        "Fresh mixed greens with grilled chicken breast, cherry tomatoes, and balsamic vinaigrette",
        "12.99",
        "Salads",
        "grilled-chicken-salad.png",
    ),
    (
        "Beef Burger",
        "Juicy beef patty with lettuce, tomato, cheese, and special sauce on a brioche bun",
        "15.99",
        "Burgers",
        "beef-burger.png",
    ),
    (
        "Grilled Fish",
        "Fresh grilled fish served with seasonal vegetables and lemon butter sauce",
        "18.99",
        "Main Course",
        "grilled-fish.png",
    ),
    (
        "Pasta Primavera",
        "Al dente pasta with fresh vegetables in a light cream sauce",
        "14.99",
        "Pasta",
        "pasta-primavera.png",
    ),
    (
        "Chicken Rice Bowl",
        "Steamed rice topped with grilled chicken and vegetables",
        "13.99",
        "Rice Dishes",
        "chicken-rice-bowl.png",
    ),
    (
        "Calamari",
        "Crispy fried calamari served with marinara sauce",
        "9.99",
        "Appetizers",
        "calamari.png",
    ),
    (
        "Shrimp Scampi",
        "Succulent shrimp in garlic butter sauce with pasta",
        "16.99",
        "Seafood",
        "shrimp-scampi.png",
    ),
    (
        "Vegetable Salad",
        "Fresh garden vegetables with house dressing",
        "8.99",
        "Salads",
        "vegetable-salad.png",
    ),
];

pub async fn connect(database_url: &str) -> Result<SqlitePool, sqlx::Error> {
    let options = SqliteConnectOptions::from_str(database_url)?
        .create_if_missing(true)
        .foreign_keys(true);

    SqlitePoolOptions::new()
        .max_connections(5)
        .connect_with(options)
        .await
}

pub async fn init_schema(pool: &SqlitePool) -> Result<(), sqlx::Error> {
    sqlx::query(CREATE_MENU_ITEMS_TABLE).execute(pool).await?;
    sqlx::query(CREATE_ORDERS_TABLE).execute(pool).await?;
    sqlx::query(CREATE_ORDER_ITEMS_TABLE).execute(pool).await?;
    sqlx::query(CREATE_REVIEWS_TABLE).execute(pool).await?;
    sqlx::query(CREATE_CONTACT_MESSAGES_TABLE)
        .execute(pool)
        .await?;

    Ok(())
}

/// Inserts the sample catalog when `menu_items` is empty.
pub async fn seed_menu(pool: &SqlitePool) -> Result<(), sqlx::Error> {
    let (count,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM menu_items")
        .fetch_one(pool)
        .await?;

    if count > 0 {
        return Ok(());
    }

    let now = Utc::now().to_rfc3339();

    for (name, description, price, category, image) in SAMPLE_MENU {
        sqlx::query(
            "INSERT INTO menu_items \
             (item_name, description, price, category, image_path, created_at, updated_at) \
             VALUES (?, ?, ?, ?, ?, ?, ?)",
        )
        .bind(name)
        .bind(description)
        .bind(price)
        .bind(category)
        .bind(image)
        .bind(&now)
        .bind(&now)
        .execute(pool)
        .await?;
    }

    info!("Seeded {} sample menu items", SAMPLE_MENU.len());

    Ok(())
}

/// Parses a stored money column back into an exact decimal.
pub(crate) fn decode_money(raw: &str) -> Result<Decimal, AppError> {
    Decimal::from_str(raw).map_err(|e| AppError::Database(format!("Bad money value {raw:?}: {e}")))
}
