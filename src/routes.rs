//! HTTP handlers: one thin function per endpoint and method.
//!
//! Bodies arrive as raw [`Bytes`] and are parsed by hand, so malformed JSON
//! collapses into the same error envelope as every other failure instead of
//! an extractor rejection.

use std::sync::Arc;

use axum::{
    Json,
    body::Bytes,
    extract::State,
    http::StatusCode,
    response::IntoResponse,
};

use crate::{
    contact,
    error::AppError,
    menu,
    models::{
        ContactCreatedResponse, ContactListResponse, ContactPayload, MenuResponse,
        OrderCreatedResponse, OrderListResponse, OrderPayload, ReviewCreatedResponse,
        ReviewListResponse, ReviewPayload,
    },
    orders, reviews,
    state::AppState,
};

fn parse_body<T: serde::de::DeserializeOwned>(body: &Bytes) -> Result<T, AppError> {
    serde_json::from_slice(body).map_err(|_| AppError::MalformedPayload)
}

pub async fn menu_handler(
    State(state): State<Arc<AppState>>,
) -> Result<impl IntoResponse, AppError> {
    let menu_items = menu::list_items(&state.pool).await?;

    Ok(Json(MenuResponse {
        success: true,
        message: "Menu items retrieved successfully",
        total_items: menu_items.len(),
        menu_items,
    }))
}

pub async fn create_order_handler(
    State(state): State<Arc<AppState>>,
    body: Bytes,
) -> Result<impl IntoResponse, AppError> {
    let payload: OrderPayload = parse_body(&body)?;
    let order = orders::validate(payload)?;
    let order = orders::place_order(&state.pool, order).await?;

    Ok((
        StatusCode::CREATED,
        Json(OrderCreatedResponse {
            success: true,
            message: "Order placed successfully!",
            order,
        }),
    ))
}

pub async fn list_orders_handler(
    State(state): State<Arc<AppState>>,
) -> Result<impl IntoResponse, AppError> {
    let orders = orders::list_orders(&state.pool).await?;

    Ok(Json(OrderListResponse {
        success: true,
        message: "Orders retrieved successfully",
        total_orders: orders.len(),
        orders,
    }))
}

pub async fn list_reviews_handler(
    State(state): State<Arc<AppState>>,
) -> Result<impl IntoResponse, AppError> {
    let reviews = reviews::list_reviews(&state.pool).await?;

    Ok(Json(ReviewListResponse {
        success: true,
        message: "Reviews retrieved successfully",
        total_reviews: reviews.len(),
        reviews,
    }))
}

pub async fn create_review_handler(
    State(state): State<Arc<AppState>>,
    body: Bytes,
) -> Result<impl IntoResponse, AppError> {
    let payload: ReviewPayload = parse_body(&body)?;
    let review = reviews::create_review(&state.pool, payload).await?;

    Ok((
        StatusCode::CREATED,
        Json(ReviewCreatedResponse {
            success: true,
            message: "Review submitted successfully",
            review,
        }),
    ))
}

pub async fn create_contact_handler(
    State(state): State<Arc<AppState>>,
    body: Bytes,
) -> Result<impl IntoResponse, AppError> {
    let payload: ContactPayload = parse_body(&body)?;
    let message = contact::create_message(&state.pool, payload).await?;

    Ok((
        StatusCode::CREATED,
        Json(ContactCreatedResponse {
            success: true,
            message: "Thank you for your message! We will get back to you soon.",
            contact_id: message.id,
        }),
    ))
}

pub async fn list_contact_handler(
    State(state): State<Arc<AppState>>,
) -> Result<impl IntoResponse, AppError> {
    let messages = contact::list_messages(&state.pool).await?;

    Ok(Json(ContactListResponse {
        success: true,
        message: "Contact messages retrieved successfully",
        total_messages: messages.len(),
        messages,
    }))
}
