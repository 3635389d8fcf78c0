//! Contact form submissions and the message listing.

use chrono::Utc;
use sqlx::{Row, SqlitePool, sqlite::SqliteRow};

use crate::{
    error::AppError,
    models::{ContactMessage, ContactPayload},
    utils::{is_valid_email, sanitize},
};

/// Validates and stores a contact message, then re-reads the committed row.
pub async fn create_message(
    pool: &SqlitePool,
    payload: ContactPayload,
) -> Result<ContactMessage, AppError> {
    let name = require(payload.name.as_deref(), "name")?;
    let email = require(payload.email.as_deref(), "email")?;
    let subject = require(payload.subject.as_deref(), "subject")?;
    let message = require(payload.message.as_deref(), "message")?;

    if !is_valid_email(&email) {
        return Err(AppError::Validation("Invalid email address".to_string()));
    }

    if message.len() < 5 {
        return Err(AppError::Validation(
            "Message must be at least 5 characters long".to_string(),
        ));
    }

    let message_id = sqlx::query(
        "INSERT INTO contact_messages (name, email, subject, message, created_at) \
         VALUES (?, ?, ?, ?, ?)",
    )
    .bind(&name)
    .bind(&email)
    .bind(&subject)
    .bind(&message)
    .bind(Utc::now().to_rfc3339())
    .execute(pool)
    .await?
    .last_insert_rowid();

    let row = sqlx::query(
        "SELECT id, name, email, subject, message, created_at, is_read \
         FROM contact_messages WHERE id = ?",
    )
    .bind(message_id)
    .fetch_one(pool)
    .await?;

    Ok(message_from_row(row))
}

/// Returns every contact message, newest first.
pub async fn list_messages(pool: &SqlitePool) -> Result<Vec<ContactMessage>, AppError> {
    let rows = sqlx::query(
        "SELECT id, name, email, subject, message, created_at, is_read \
         FROM contact_messages ORDER BY created_at DESC",
    )
    .fetch_all(pool)
    .await?;

    Ok(rows.into_iter().map(message_from_row).collect())
}

fn require(raw: Option<&str>, field: &str) -> Result<String, AppError> {
    let value = sanitize(raw.unwrap_or(""));
    if value.is_empty() {
        return Err(AppError::Validation(format!(
            "Missing required field: {field}"
        )));
    }
    Ok(value)
}

fn message_from_row(row: SqliteRow) -> ContactMessage {
    ContactMessage {
        id: row.get("id"),
        name: row.get("name"),
        email: row.get("email"),
        subject: row.get("subject"),
        message: row.get("message"),
        created_at: row.get("created_at"),
        is_read: row.get::<i64, _>("is_read") != 0,
    }
}
