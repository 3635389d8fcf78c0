//! Catalog reads: the public menu listing and the order workflow's
//! authoritative item lookup.

use sqlx::{Row, SqliteConnection, SqlitePool, sqlite::SqliteRow};

use crate::{
    database::decode_money,
    error::AppError,
    models::{MenuItem, ResolvedItem},
};

const LIST_ITEMS_SQL: &str = "\
    SELECT \
        m.item_id, m.item_name, m.description, m.price, m.category, \
        m.image_path, m.is_available, \
        COALESCE(AVG(r.rating), 0.0) AS avg_rating, \
        COUNT(r.id) AS review_count \
    FROM menu_items m \
    LEFT JOIN reviews r ON m.item_id = r.item_id AND r.is_approved = 1 \
    WHERE m.is_available = 1 \
    GROUP BY m.item_id \
    ORDER BY m.item_id";

/// Returns every available catalog item with its approved-review rating.
pub async fn list_items(pool: &SqlitePool) -> Result<Vec<MenuItem>, AppError> {
    let rows = sqlx::query(LIST_ITEMS_SQL).fetch_all(pool).await?;

    rows.into_iter().map(item_from_row).collect()
}

/// Resolves an item identifier to its canonical name and price iff the item
/// exists and is currently available.
///
/// Takes the order transaction's connection, so the lookup can never run
/// earlier than transaction start.
pub async fn resolve_item(
    conn: &mut SqliteConnection,
    item_id: i64,
) -> Result<ResolvedItem, AppError> {
    let row = sqlx::query(
        "SELECT item_name, price FROM menu_items WHERE item_id = ? AND is_available = 1",
    )
    .bind(item_id)
    .fetch_optional(&mut *conn)
    .await?
    .ok_or(AppError::ItemNotFound(item_id))?;

    Ok(ResolvedItem {
        name: row.get("item_name"),
        price: decode_money(&row.get::<String, _>("price"))?,
    })
}

fn item_from_row(row: SqliteRow) -> Result<MenuItem, AppError> {
    Ok(MenuItem {
        item_id: row.get("item_id"),
        item_name: row.get("item_name"),
        description: row.get("description"),
        price: decode_money(&row.get::<String, _>("price"))?,
        category: row.get("category"),
        image_path: row.get("image_path"),
        is_available: row.get::<i64, _>("is_available") != 0,
        avg_rating: row.get("avg_rating"),
        review_count: row.get("review_count"),
    })
}
