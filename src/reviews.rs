//! Customer reviews: approved listing and submission.

use chrono::Utc;
use sqlx::{Row, SqlitePool, sqlite::SqliteRow};

use crate::{
    error::AppError,
    models::{Review, ReviewPayload},
    utils::sanitize,
};

const REVIEW_COLUMNS_SQL: &str = "\
    SELECT \
        r.id, r.customer_name, r.rating, r.comment, r.created_at, \
        r.is_approved, r.item_id, m.item_name \
    FROM reviews r \
    LEFT JOIN menu_items m ON r.item_id = m.item_id";

/// Returns approved reviews, newest first, joined to the reviewed item's
/// name when the review targets one.
pub async fn list_reviews(pool: &SqlitePool) -> Result<Vec<Review>, AppError> {
    let sql = format!("{REVIEW_COLUMNS_SQL} WHERE r.is_approved = 1 ORDER BY r.created_at DESC");
    let rows = sqlx::query(&sql).fetch_all(pool).await?;

    Ok(rows.into_iter().map(review_from_row).collect())
}

/// Validates and stores a review, then re-reads the committed row.
pub async fn create_review(pool: &SqlitePool, payload: ReviewPayload) -> Result<Review, AppError> {
    let customer_name = sanitize(payload.customer_name.as_deref().unwrap_or(""));
    if customer_name.is_empty() {
        return Err(AppError::Validation(
            "Missing required field: customer_name".to_string(),
        ));
    }

    let rating = payload
        .rating
        .ok_or_else(|| AppError::Validation("Missing required field: rating".to_string()))?;
    if !(1..=5).contains(&rating) {
        return Err(AppError::Validation(
            "Rating must be between 1 and 5".to_string(),
        ));
    }

    let comment = sanitize(payload.comment.as_deref().unwrap_or(""));
    if comment.is_empty() {
        return Err(AppError::Validation(
            "Missing required field: comment".to_string(),
        ));
    }

    if let Some(item_id) = payload.item_id {
        let exists = sqlx::query(
            "SELECT item_id FROM menu_items WHERE item_id = ? AND is_available = 1",
        )
        .bind(item_id)
        .fetch_optional(pool)
        .await?;

        if exists.is_none() {
            return Err(AppError::ItemNotFound(item_id));
        }
    }

    let review_id = sqlx::query(
        "INSERT INTO reviews (customer_name, rating, comment, item_id, created_at) \
         VALUES (?, ?, ?, ?, ?)",
    )
    .bind(&customer_name)
    .bind(rating)
    .bind(&comment)
    .bind(payload.item_id)
    .bind(Utc::now().to_rfc3339())
    .execute(pool)
    .await?
    .last_insert_rowid();

    let sql = format!("{REVIEW_COLUMNS_SQL} WHERE r.id = ?");
    let row = sqlx::query(&sql).bind(review_id).fetch_one(pool).await?;

    Ok(review_from_row(row))
}

fn review_from_row(row: SqliteRow) -> Review {
    Review {
        id: row.get("id"),
        customer_name: row.get("customer_name"),
        rating: row.get("rating"),
        comment: row.get("comment"),
        created_at: row.get("created_at"),
        is_approved: row.get::<i64, _>("is_approved") != 0,
        item_id: row.get("item_id"),
        item_name: row.get("item_name"),
    }
}
