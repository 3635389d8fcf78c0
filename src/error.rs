use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;
use thiserror::Error;
use tracing::{error, warn};

/// Everything that can fail while serving a request.
///
/// All variants collapse to the same `{success: false, error}` envelope with
/// a 400 status, which is the one response contract clients parse. Storage
/// detail stays in the server log.
#[derive(Error, Debug)]
pub enum AppError {
    #[error("Invalid JSON input")]
    MalformedPayload,

    #[error("{0}")]
    Validation(String),

    #[error("Menu item with ID {0} not found or not available")]
    ItemNotFound(i64),

    #[error("Order total must be greater than 0")]
    InvalidTotal,

    #[error("A storage error occurred, please try again later")]
    Database(String),
}

impl From<sqlx::Error> for AppError {
    fn from(e: sqlx::Error) -> Self {
        AppError::Database(e.to_string())
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        match &self {
            AppError::Database(detail) => error!("Storage failure: {detail}"),
            other => warn!("Request rejected: {other}"),
        }

        let body = json!({
            "success": false,
            "error": self.to_string(),
        });

        (StatusCode::BAD_REQUEST, Json(body)).into_response()
    }
}
